// cg_effects.rs — these functions generate localentities, usually as a result
// of event processing
// Converted from: myjk-original/codemp/cgame/cg_effects.c

use myjk_common::common::com_error;
use myjk_common::q_shared::*;

use crate::cg_local::*;
use crate::cg_localents::{LocalEntState, StrafeTrailState};

/// Adds a smoke puff or blood trail localEntity.
#[allow(clippy::too_many_arguments)]
pub fn cg_smoke_puff(
    les: &mut LocalEntState,
    p: &Vec3,
    vel: &Vec3,
    radius: f32,
    r: f32,
    g: f32,
    b: f32,
    a: f32,
    duration: f32,
    start_time: i32,
    fade_in_time: i32,
    le_flags: i32,
    h_shader: QHandle,
) -> usize {
    let le = les.alloc_local_entity();
    let ent = &mut les.ents[le];

    ent.le_flags = le_flags;
    ent.radius = radius;

    ent.ref_entity.rotation = q_flrand(0.0, 1.0) * 360.0;
    ent.ref_entity.radius = radius;
    ent.ref_entity.shader_time = start_time as f32 / 1000.0;

    ent.le_type = LeType::MoveScaleFade;
    ent.start_time = start_time;
    ent.fade_in_time = fade_in_time;
    // lifeRate below divides by this span
    ent.end_time = start_time + (duration as i32).max(1);
    if fade_in_time > start_time {
        ent.life_rate = 1.0 / (ent.end_time - ent.fade_in_time) as f32;
    } else {
        ent.life_rate = 1.0 / (ent.end_time - ent.start_time) as f32;
    }
    ent.color[0] = r;
    ent.color[1] = g;
    ent.color[2] = b;
    ent.color[3] = a;

    ent.pos.tr_type = TrType::Linear;
    ent.pos.tr_time = start_time;
    ent.pos.tr_delta = *vel;
    ent.pos.tr_base = *p;

    ent.ref_entity.origin = *p;
    ent.ref_entity.custom_shader = h_shader;

    ent.ref_entity.shader_rgba[0] = (ent.color[0] * 0xff as f32) as u8;
    ent.ref_entity.shader_rgba[1] = (ent.color[1] * 0xff as f32) as u8;
    ent.ref_entity.shader_rgba[2] = (ent.color[2] * 0xff as f32) as u8;
    ent.ref_entity.shader_rgba[3] = 0xff;

    ent.ref_entity.re_type = RefEntityType::Sprite;
    ent.ref_entity.radius = ent.radius;

    le
}

/// Floating score feedback over the spot where the local player scored.
pub fn cg_score_plum(
    les: &mut LocalEntState,
    cg: &CgState,
    client: i32,
    org: &Vec3,
    score: i32,
) -> Option<usize> {
    // only visualize for the client that scored
    if client != cg.client_num || cg.cvars.score_plums == 0 {
        return None;
    }

    let last_pos = les.last_plum_pos;
    let le = les.alloc_local_entity();
    {
        let ent = &mut les.ents[le];
        ent.le_flags = 0;
        ent.le_type = LeType::ScorePlum;
        ent.start_time = cg.time;
        ent.end_time = cg.time + 4000;
        ent.life_rate = 1.0 / (ent.end_time - ent.start_time) as f32;

        ent.color[0] = 1.0;
        ent.color[1] = 1.0;
        ent.color[2] = 1.0;
        ent.color[3] = 1.0;

        ent.radius = score as f32;

        ent.pos.tr_base = *org;
        // keep plums that spawn at the same height from overlapping
        if org[2] >= last_pos[2] - 20.0 && org[2] <= last_pos[2] + 20.0 {
            ent.pos.tr_base[2] -= 20.0;
        }

        ent.ref_entity.re_type = RefEntityType::Sprite;
        ent.ref_entity.radius = 16.0;
    }
    les.last_plum_pos = *org;

    Some(le)
}

/// Persistent digit marker placed along a strafe trail. Identified by a zero
/// life rate; lives until cg_remove_strafe_trail retires it.
pub fn cg_trail_number_plum(
    les: &mut LocalEntState,
    cg: &CgState,
    client_num: i32,
    org: &Vec3,
    number: i32,
) -> usize {
    let le = les.alloc_local_entity();
    let ent = &mut les.ents[le];

    // owner is stored off by one so zero means unowned
    ent.le_flags = client_num + 1;
    ent.le_type = LeType::ScorePlum;
    ent.start_time = cg.time;
    ent.end_time = i32::MAX;
    ent.life_rate = 0.0;

    ent.color[0] = 1.0;
    ent.color[1] = 1.0;
    ent.color[2] = 1.0;
    ent.color[3] = 1.0;

    ent.radius = number as f32;

    ent.pos.tr_base = *org;

    ent.ref_entity.re_type = RefEntityType::Sprite;
    ent.ref_entity.radius = 16.0;

    le
}

/// Make an explosion at a point, as either a randomly rotated sprite or an
/// oriented model.
#[allow(clippy::too_many_arguments)]
pub fn cg_make_explosion(
    les: &mut LocalEntState,
    cg: &CgState,
    origin: &Vec3,
    dir: Option<&Vec3>,
    h_model: QHandle,
    shader: QHandle,
    msec: i32,
    is_sprite: bool,
    scale: f32,
    flags: i32,
) -> usize {
    if msec <= 0 {
        com_error(ERR_DROP, &format!("CG_MakeExplosion: msec = {}", msec));
    }

    // skew the time a bit so they aren't all in sync
    let offset = q_irand(0, 63);

    let ex = les.alloc_local_entity();
    let ent = &mut les.ents[ex];

    let new_origin;
    if is_sprite {
        ent.le_type = LeType::SpriteExplosion;

        // randomly rotate sprite orientation
        ent.ref_entity.rotation = q_irand(0, 359) as f32;
        let tmp = vector_scale(dir.unwrap_or(&vec3_origin), 16.0);
        new_origin = vector_add(&tmp, origin);
    } else {
        ent.le_type = LeType::Explosion;
        new_origin = *origin;

        // set axis with random rotate
        match dir {
            None => ent.ref_entity.axis = AXIS_DEFAULT,
            Some(d) => {
                let ang = if flags & LEF_NO_RANDOM_ROTATE == 0 {
                    q_irand(0, 359) as f32
                } else {
                    0.0
                };
                ent.ref_entity.axis[0] = *d;
                rotate_around_direction(&mut ent.ref_entity.axis, ang);
            }
        }

        if scale != 1.0 {
            ent.ref_entity.non_normalized_axes = true;
            for i in 0..3 {
                ent.ref_entity.axis[i] = vector_scale(&ent.ref_entity.axis[i], scale);
            }
        }
    }

    ent.le_flags = flags;
    ent.start_time = cg.time - offset;
    ent.end_time = ent.start_time + msec;

    // bias the time so all shader effects start correctly
    ent.ref_entity.shader_time = ent.start_time as f32 / 1000.0;

    ent.ref_entity.model = h_model;
    ent.ref_entity.custom_shader = shader;

    ent.life_rate = 1.0 / msec as f32;
    ent.color[0] = 1.0;
    ent.color[1] = 1.0;
    ent.color[2] = 1.0;
    ent.color[3] = 1.0;

    // set origin
    ent.ref_entity.origin = new_origin;
    ent.ref_entity.old_origin = new_origin;

    ex
}

/// Toss a gib chunk that bleeds, bounces and splats.
pub fn cg_launch_gib(
    les: &mut LocalEntState,
    cg: &CgState,
    origin: &Vec3,
    velocity: &Vec3,
    h_model: QHandle,
) -> usize {
    let le = les.alloc_local_entity();
    let ent = &mut les.ents[le];

    ent.le_type = LeType::Fragment;
    ent.start_time = cg.time;
    ent.end_time = ent.start_time + 5000 + (rand::random::<f32>() * 3000.0) as i32;

    ent.ref_entity.origin = *origin;
    ent.ref_entity.axis = AXIS_DEFAULT;
    ent.ref_entity.model = h_model;

    ent.pos.tr_type = TrType::Gravity;
    ent.pos.tr_base = *origin;
    ent.pos.tr_delta = *velocity;
    ent.pos.tr_time = cg.time;

    ent.bounce_factor = 0.6;

    ent.le_bounce_sound_type = LeBounceSoundType::Blood;
    ent.le_mark_type = LeMarkType::Blood;

    le
}

/// Toss a tumbling debris chunk. Unlike gibs these spin in flight and thud
/// instead of splat.
pub fn cg_launch_fragment(
    les: &mut LocalEntState,
    cg: &CgState,
    origin: &Vec3,
    velocity: &Vec3,
    h_model: QHandle,
    bounce_sound: SfxHandle,
) -> usize {
    let le = les.alloc_local_entity();
    let ent = &mut les.ents[le];

    ent.le_type = LeType::Fragment;
    ent.le_flags = LEF_TUMBLE;
    ent.start_time = cg.time;
    ent.end_time = ent.start_time + 5000 + (rand::random::<f32>() * 3000.0) as i32;

    ent.ref_entity.origin = *origin;
    ent.ref_entity.axis = AXIS_DEFAULT;
    ent.ref_entity.model = h_model;

    ent.pos.tr_type = TrType::Gravity;
    ent.pos.tr_base = *origin;
    ent.pos.tr_delta = *velocity;
    ent.pos.tr_time = cg.time;

    // random spin while airborne
    ent.angles.tr_type = TrType::Linear;
    ent.angles.tr_base = [q_flrand(0.0, 360.0), q_flrand(0.0, 360.0), 0.0];
    ent.angles.tr_delta = [q_irand(-400, 400) as f32, q_irand(-400, 400) as f32, 0.0];
    ent.angles.tr_time = cg.time;

    ent.bounce_factor = 0.3;
    ent.bounce_sound = bounce_sound;

    ent.le_bounce_sound_type = LeBounceSoundType::Rock;
    ent.le_mark_type = LeMarkType::None;

    le
}

/// Add one ribbon segment to a client's strafe trail.
pub fn cg_spawn_strafe_trail(
    trails: &mut StrafeTrailState,
    cg: &CgState,
    start: &Vec3,
    end: &Vec3,
    color: u32,
    client_num: i32,
    duration: i32,
) -> usize {
    let st = trails.alloc_strafe_trail();
    {
        let trail = &mut trails.trails[st];
        trail.start = *start;
        trail.end = *end;
        trail.color = color;
        // owner is stored off by one so zero means unowned
        trail.client_num = client_num + 1;
        trail.end_time = cg.time + duration;
    }
    trails.drawing |= 1 << client_num;
    st
}

// ============================================================
// Unit tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (LocalEntState, CgState) {
        let les = LocalEntState::new();
        let mut cg = CgState::default();
        cg.time = 10000;
        cg.frametime = 50;
        (les, cg)
    }

    #[test]
    fn test_smoke_puff_fields() {
        let (mut les, _cg) = state();
        let le = cg_smoke_puff(
            &mut les,
            &[10.0, 20.0, 30.0],
            &[0.0, 0.0, 5.0],
            20.0,
            1.0, 0.5, 0.25, 1.0,
            2000.0,
            1000,
            0,
            LEF_PUFF_DONT_SCALE,
            7,
        );

        let ent = &les.ents[le];
        assert_eq!(ent.le_type, LeType::MoveScaleFade);
        assert_eq!(ent.le_flags, LEF_PUFF_DONT_SCALE);
        assert_eq!(ent.start_time, 1000);
        assert_eq!(ent.end_time, 3000);
        assert!((ent.life_rate - 1.0 / 2000.0).abs() < 1e-9);
        assert_eq!(ent.pos.tr_type, TrType::Linear);
        assert_eq!(ent.pos.tr_time, 1000);
        assert_eq!(ent.pos.tr_base, [10.0, 20.0, 30.0]);
        assert_eq!(ent.pos.tr_delta, [0.0, 0.0, 5.0]);
        assert_eq!(ent.ref_entity.re_type, RefEntityType::Sprite);
        assert_eq!(ent.ref_entity.radius, 20.0);
        assert_eq!(ent.ref_entity.custom_shader, 7);
        assert_eq!(ent.ref_entity.shader_rgba, [255, 127, 63, 255]);
        assert_eq!(ent.ref_entity.shader_time, 1.0);
        assert!(ent.ref_entity.rotation >= 0.0 && ent.ref_entity.rotation < 360.0);
    }

    #[test]
    fn test_smoke_puff_fade_in_life_rate() {
        let (mut les, _cg) = state();
        let le = cg_smoke_puff(
            &mut les,
            &[0.0; 3],
            &[0.0; 3],
            10.0,
            1.0, 1.0, 1.0, 1.0,
            1000.0,
            2000,
            2400,
            0,
            1,
        );
        // rate covers only the window after the fade in completes
        assert!((les.ents[le].life_rate - 1.0 / 600.0).abs() < 1e-9);
        assert_eq!(les.ents[le].fade_in_time, 2400);
    }

    #[test]
    fn test_score_plum_gating() {
        let (mut les, mut cg) = state();
        cg.client_num = 3;

        // someone else scored
        assert!(cg_score_plum(&mut les, &cg, 2, &[0.0; 3], 5).is_none());
        assert_eq!(les.num_active(), 0);

        // plums disabled
        cg.cvars.score_plums = 0;
        assert!(cg_score_plum(&mut les, &cg, 3, &[0.0; 3], 5).is_none());
        assert_eq!(les.num_active(), 0);

        cg.cvars.score_plums = 1;
        let le = cg_score_plum(&mut les, &cg, 3, &[4.0, 5.0, 6.0], 5).unwrap();
        let ent = &les.ents[le];
        assert_eq!(ent.le_type, LeType::ScorePlum);
        assert_eq!(ent.radius, 5.0);
        assert_eq!(ent.end_time, cg.time + 4000);
        assert!((ent.life_rate - 1.0 / 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_plum_dodges_previous_height() {
        let (mut les, mut cg) = state();
        cg.client_num = 0;

        let first = cg_score_plum(&mut les, &cg, 0, &[0.0, 0.0, 100.0], 1).unwrap();
        // first plum near the origin default height keeps its z... the
        // initial last position is the world origin, so 100 is clear of it
        assert_eq!(les.ents[first].pos.tr_base[2], 100.0);

        // second plum at nearly the same height gets pushed down
        let second = cg_score_plum(&mut les, &cg, 0, &[0.0, 0.0, 110.0], 1).unwrap();
        assert_eq!(les.ents[second].pos.tr_base[2], 90.0);

        // far enough apart, no dodge
        let third = cg_score_plum(&mut les, &cg, 0, &[0.0, 0.0, 200.0], 1).unwrap();
        assert_eq!(les.ents[third].pos.tr_base[2], 200.0);
    }

    #[test]
    fn test_trail_number_plum() {
        let (mut les, cg) = state();
        let le = cg_trail_number_plum(&mut les, &cg, 4, &[1.0, 2.0, 3.0], 12);
        let ent = &les.ents[le];
        assert_eq!(ent.le_type, LeType::ScorePlum);
        assert_eq!(ent.le_flags, 5);
        assert_eq!(ent.life_rate, 0.0);
        assert_eq!(ent.radius, 12.0);
        assert_eq!(ent.end_time, i32::MAX);
    }

    #[test]
    fn test_make_explosion_sprite() {
        let (mut les, cg) = state();
        let dir = [0.0, 0.0, 1.0];
        let ex = cg_make_explosion(&mut les, &cg, &[10.0, 0.0, 0.0], Some(&dir), 0, 3, 600, true, 1.0, 0);

        let ent = &les.ents[ex];
        assert_eq!(ent.le_type, LeType::SpriteExplosion);
        // pushed out along the impact direction
        assert_eq!(ent.ref_entity.origin, [10.0, 0.0, 16.0]);
        // start time backdated by at most the desync skew
        assert!(ent.start_time <= cg.time && ent.start_time > cg.time - 64);
        assert_eq!(ent.end_time, ent.start_time + 600);
        assert!((ent.ref_entity.shader_time - ent.start_time as f32 / 1000.0).abs() < 1e-6);
        assert!((ent.life_rate - 1.0 / 600.0).abs() < 1e-9);
        assert_eq!(ent.ref_entity.custom_shader, 3);
    }

    #[test]
    fn test_make_explosion_model_no_dir() {
        let (mut les, cg) = state();
        let ex = cg_make_explosion(&mut les, &cg, &[1.0, 2.0, 3.0], None, 9, 0, 250, false, 1.0, 0);

        let ent = &les.ents[ex];
        assert_eq!(ent.le_type, LeType::Explosion);
        assert_eq!(ent.ref_entity.axis, AXIS_DEFAULT);
        assert_eq!(ent.ref_entity.origin, [1.0, 2.0, 3.0]);
        assert_eq!(ent.ref_entity.model, 9);
        assert!(!ent.ref_entity.non_normalized_axes);
    }

    #[test]
    fn test_make_explosion_model_scaled() {
        let (mut les, cg) = state();
        let dir = [1.0, 0.0, 0.0];
        let ex = cg_make_explosion(
            &mut les,
            &cg,
            &[0.0; 3],
            Some(&dir),
            9,
            0,
            250,
            false,
            2.0,
            LEF_NO_RANDOM_ROTATE,
        );

        let ent = &les.ents[ex];
        assert!(ent.ref_entity.non_normalized_axes);
        // with rotation suppressed the forward axis is just scaled
        assert!((vector_length(&ent.ref_entity.axis[0]) - 2.0).abs() < 1e-5);
        assert_eq!(ent.ref_entity.axis[0], [2.0, 0.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "CG_MakeExplosion: msec")]
    fn test_make_explosion_bad_duration() {
        let (mut les, cg) = state();
        cg_make_explosion(&mut les, &cg, &[0.0; 3], None, 0, 0, 0, true, 1.0, 0);
    }

    #[test]
    fn test_launch_gib() {
        let (mut les, cg) = state();
        let le = cg_launch_gib(&mut les, &cg, &[1.0, 1.0, 1.0], &[50.0, 0.0, 200.0], 4);

        let ent = &les.ents[le];
        assert_eq!(ent.le_type, LeType::Fragment);
        assert_eq!(ent.pos.tr_type, TrType::Gravity);
        assert_eq!(ent.pos.tr_delta, [50.0, 0.0, 200.0]);
        assert_eq!(ent.pos.tr_time, cg.time);
        assert_eq!(ent.bounce_factor, 0.6);
        assert_eq!(ent.le_bounce_sound_type, LeBounceSoundType::Blood);
        assert_eq!(ent.le_mark_type, LeMarkType::Blood);
        assert!(ent.end_time >= cg.time + 5000 && ent.end_time <= cg.time + 8000);
    }

    #[test]
    fn test_launch_fragment_tumbles() {
        let (mut les, cg) = state();
        let le = cg_launch_fragment(&mut les, &cg, &[0.0; 3], &[0.0, 0.0, 100.0], 4, 77);

        let ent = &les.ents[le];
        assert_eq!(ent.le_type, LeType::Fragment);
        assert_eq!(ent.le_flags & LEF_TUMBLE, LEF_TUMBLE);
        assert_eq!(ent.angles.tr_type, TrType::Linear);
        assert_eq!(ent.bounce_factor, 0.3);
        assert_eq!(ent.bounce_sound, 77);
        assert_eq!(ent.le_bounce_sound_type, LeBounceSoundType::Rock);
        assert_eq!(ent.le_mark_type, LeMarkType::None);
    }

    #[test]
    fn test_spawn_strafe_trail() {
        let mut trails = StrafeTrailState::new();
        let (_les, cg) = state();

        let st = cg_spawn_strafe_trail(
            &mut trails,
            &cg,
            &[0.0, 0.0, 0.0],
            &[10.0, 0.0, 0.0],
            0x0000ff,
            2,
            30000,
        );

        let trail = &trails.trails[st];
        assert_eq!(trail.client_num, 3);
        assert_eq!(trail.color, 0x0000ff);
        assert_eq!(trail.end_time, cg.time + 30000);
        assert_eq!(trails.drawing, 1 << 2);
        assert_eq!(trails.num_active(), 1);
    }
}
