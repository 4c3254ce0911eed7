// cg_syscalls.rs — engine services imported by the client game
// Converted from: myjk-original/codemp/cgame/cg_syscalls.c

use myjk_common::q_shared::{FxHandle, QHandle, RefEntity, SfxHandle, Trace, Vec3};

/// Engine services the client game calls out to: collision queries, scene
/// submission, sound, and the FX system. The running client wires these to
/// the engine; tests substitute recording stubs.
pub trait CgameImport {
    /// Sweep a box through the world. A point trace passes None for the
    /// bounds; `pass_entity_num` is skipped during the sweep.
    fn trace(
        &self,
        start: &Vec3,
        mins: Option<&Vec3>,
        maxs: Option<&Vec3>,
        end: &Vec3,
        pass_entity_num: i32,
        content_mask: i32,
    ) -> Trace;

    /// Content flags of the volume containing a point.
    fn point_contents(&self, point: &Vec3, pass_entity_num: i32) -> i32;

    /// Submit one renderable for the current frame.
    fn add_ref_entity_to_scene(&mut self, ent: &RefEntity);

    /// Submit a dynamic point light for the current frame.
    fn add_light_to_scene(&mut self, origin: &Vec3, intensity: f32, r: f32, g: f32, b: f32);

    /// Start a sound at a position.
    fn start_sound(&mut self, origin: &Vec3, entity_num: i32, channel: i32, sfx: SfxHandle);

    /// Play a registered effect at a position, oriented along `dir`.
    fn play_effect_id(&mut self, effect: FxHandle, origin: &Vec3, dir: &Vec3);

    /// Project an impact decal onto the surfaces around an impact point.
    fn impact_mark(
        &mut self,
        shader: QHandle,
        origin: &Vec3,
        dir: &Vec3,
        orientation: f32,
        radius: f32,
    );

    /// Whether two points can potentially see each other.
    fn in_pvs(&self, p1: &Vec3, p2: &Vec3) -> bool;
}
