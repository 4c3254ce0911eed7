// cg_local.rs — local definitions for the client game: local entity and
// strafe trail records, media handles, cvar mirror, per-frame state
// Converted from: myjk-original/codemp/cgame/cg_local.h

use myjk_common::cvar::CvarContext;
use myjk_common::q_shared::*;

// ============================================================
// Local entities
// ============================================================

/// Null link index for the intrusive pool lists.
pub const LE_NONE: usize = usize::MAX;

/// leType_t
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum LeType {
    #[default]
    Mark = 0,
    SpriteExplosion = 1,
    Explosion = 2,
    FadeScaleModel = 3,
    Fragment = 4,
    Puff = 5,
    MoveScaleFade = 6,
    FadeRgb = 7,
    FallScaleFade = 8,
    ScaleFade = 9,
    ScorePlum = 10,
    OLine = 11,
    Line = 12,
    ShowRefEntity = 13,
    Missile = 14,
}

// leFlags
pub const LEF_PUFF_DONT_SCALE: i32 = 0x0001; // do not scale size over time
pub const LEF_TUMBLE: i32 = 0x0002; // tumble over time, used for ejecting shells
pub const LEF_FADE_RGB: i32 = 0x0004; // fade color too, not just alpha
pub const LEF_NO_RANDOM_ROTATE: i32 = 0x0008;

/// leMarkType_t — decal left on a surface by a settling fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum LeMarkType {
    #[default]
    None = 0,
    Burn = 1,
    Blood = 2,
}

/// leBounceSoundType_t
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum LeBounceSoundType {
    #[default]
    None = 0,
    Blood = 1,
    Rock = 2,
    Metal = 3,
}

/// localEntity_t — a self-contained effect the client simulates without any
/// further input from the server. Pool slots double as list links: an entry
/// on the active list has a valid prev, an entry on the free list has
/// prev == LE_NONE and chains through next.
#[derive(Debug, Clone)]
pub struct LocalEntity {
    pub prev: usize,
    pub next: usize,

    pub le_type: LeType,
    pub le_flags: i32,

    pub start_time: i32,
    pub end_time: i32,
    pub fade_in_time: i32,

    pub life_rate: f32, // 1.0 / (end_time - start_time)

    pub pos: Trajectory,
    pub angles: Trajectory,

    pub bounce_factor: f32, // 0.0 = no bounce, 1.0 = perfect
    pub bounce_sound: SfxHandle, // explicit sound to play on impact

    pub alpha: f32,
    pub dalpha: f32,

    pub force_alpha: u8,

    pub color: [f32; 4],

    pub radius: f32,

    pub light: f32,
    pub light_color: Vec3,

    pub le_mark_type: LeMarkType,
    pub le_bounce_sound_type: LeBounceSoundType,

    pub line_width: f32,
    pub line_dwidth: f32,

    pub ref_entity: RefEntity,
}

impl Default for LocalEntity {
    fn default() -> Self {
        Self {
            prev: LE_NONE,
            next: LE_NONE,
            le_type: LeType::Mark,
            le_flags: 0,
            start_time: 0,
            end_time: 0,
            fade_in_time: 0,
            life_rate: 0.0,
            pos: Trajectory::default(),
            angles: Trajectory::default(),
            bounce_factor: 0.0,
            bounce_sound: 0,
            alpha: 0.0,
            dalpha: 0.0,
            force_alpha: 0,
            color: [0.0; 4],
            radius: 0.0,
            light: 0.0,
            light_color: [0.0; 3],
            le_mark_type: LeMarkType::None,
            le_bounce_sound_type: LeBounceSoundType::None,
            line_width: 0.0,
            line_dwidth: 0.0,
            ref_entity: RefEntity::default(),
        }
    }
}

// ============================================================
// Strafe trails
// ============================================================

/// strafeTrail_t — one ribbon segment of a player movement trail.
#[derive(Debug, Clone)]
pub struct StrafeTrail {
    pub prev: usize,
    pub next: usize,

    pub start: Vec3,
    pub end: Vec3,
    pub color: u32, // packed 0xBBGGRR

    /// Owning client number plus one; zero marks a slot never handed out.
    pub client_num: i32,

    pub end_time: i32,
}

impl Default for StrafeTrail {
    fn default() -> Self {
        Self {
            prev: LE_NONE,
            next: LE_NONE,
            start: [0.0; 3],
            end: [0.0; 3],
            color: 0,
            client_num: 0,
            end_time: 0,
        }
    }
}

// ============================================================
// Server feature bits (jaPRO)
// ============================================================

// mirrored from the server's jcinfo / jcinfo2 config strings
pub const JAPRO_CINFO_PROJSNIPER: i32 = 1 << 12;
pub const JAPRO_CINFO2_WTTRIBES: i32 = 1 << 6;

// ============================================================
// Media and registered effects
// ============================================================

/// Handles to shaders and sounds the effects code references. Registered
/// during level load by the main client game setup.
#[derive(Debug, Clone, Default)]
pub struct CgMedia {
    pub white_shader: QHandle,

    pub blood_trail_shader: QHandle,
    pub blood_mark_shader: QHandle,
    pub burn_mark_shader: QHandle,

    pub number_shaders: [QHandle; 11], // 0-9 plus the minus sign

    pub team_red_shader: QHandle,
    pub team_blue_shader: QHandle,

    pub rock_bounce_sound: [SfxHandle; 2],
    pub metal_bounce_sound: [SfxHandle; 2],
    pub gib_bounce1_sound: SfxHandle,
    pub gib_bounce2_sound: SfxHandle,
    pub gib_bounce3_sound: SfxHandle,
}

/// FX system effects used for simulated projectiles.
#[derive(Debug, Clone, Default)]
pub struct CgEffects {
    pub bryar_shot_effect: FxHandle,
    pub blaster_shot_effect: FxHandle,
    pub bowcaster_shot_effect: FxHandle,
    pub repeater_projectile_effect: FxHandle,
    pub repeater_alt_projectile_effect: FxHandle,
    pub mortar_projectile: FxHandle,
    pub flechette_shot_effect: FxHandle,
    pub flechette_alt_shot_effect: FxHandle,
    pub rocket_shot_effect: FxHandle,
    pub concussion_shot_effect: FxHandle,
}

// ============================================================
// Cvars
// ============================================================

/// Mirror of the cvars the effects code reads, refreshed once per frame.
#[derive(Debug, Clone)]
pub struct CgCvars {
    pub score_plums: i32,
    pub simulated_projectiles: i32,
    pub strafe_trail_ghost: i32,
    pub strafe_trail_radius: f32,
    pub strafe_trail_fps: i32,
}

impl Default for CgCvars {
    fn default() -> Self {
        // matches the registration defaults
        Self {
            score_plums: 1,
            simulated_projectiles: 0,
            strafe_trail_ghost: 0,
            strafe_trail_radius: 2.0,
            strafe_trail_fps: 30,
        }
    }
}

impl CgCvars {
    pub fn register(ctx: &mut CvarContext) {
        ctx.get("cg_scorePlums", "1", CVAR_ARCHIVE);
        ctx.get("cg_simulatedProjectiles", "0", CVAR_ARCHIVE);
        ctx.get("cg_strafeTrailGhost", "0", CVAR_ARCHIVE);
        ctx.get("cg_strafeTrailRadius", "2", CVAR_ARCHIVE);
        ctx.get("cg_strafeTrailFPS", "30", CVAR_ARCHIVE);
    }

    pub fn update(&mut self, ctx: &CvarContext) {
        self.score_plums = ctx.variable_integer("cg_scorePlums");
        self.simulated_projectiles = ctx.variable_integer("cg_simulatedProjectiles");
        self.strafe_trail_ghost = ctx.variable_integer("cg_strafeTrailGhost");
        self.strafe_trail_radius = ctx.variable_value("cg_strafeTrailRadius");
        self.strafe_trail_fps = ctx.variable_integer("cg_strafeTrailFPS");
    }
}

// ============================================================
// Per-frame state
// ============================================================

/// The slice of the latest server snapshot the effects code reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CgSnapshot {
    pub ping: i32,
}

/// Frame context for the effects code. The engine's split between
/// per-snapshot and per-level globals collapses into one struct here.
#[derive(Debug, Clone, Default)]
pub struct CgState {
    pub time: i32, // the time value the client is rendering at
    pub frametime: i32, // time since the last frame
    pub vieworg: Vec3, // render view origin for the current frame

    pub client_num: i32,
    pub player_origin: Vec3, // predicted player origin
    pub team: Team,
    pub pm_flags: i32,
    pub duel_time: i32,

    pub snap: Option<CgSnapshot>,

    pub jcinfo: i32, // jaPRO server feature bits
    pub jcinfo2: i32,

    pub media: CgMedia,
    pub effects: CgEffects,
    pub cvars: CgCvars,
}

/// Scale a ref entity's axis by its per-axis model scale, flagging the axes
/// as non-normalized for the renderer.
pub fn scale_model_axis(ent: &mut RefEntity) {
    for i in 0..3 {
        if ent.model_scale[i] != 0.0 && ent.model_scale[i] != 1.0 {
            ent.axis[i] = vector_scale(&ent.axis[i], ent.model_scale[i]);
            ent.non_normalized_axes = true;
        }
    }
}

// ============================================================
// Unit tests
// ============================================================
