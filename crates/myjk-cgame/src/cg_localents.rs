// cg_localents.rs — every frame, generate renderer commands for locally
// processed entities: smoke puffs, gibs, shells, explosions, strafe trails
// Converted from: myjk-original/codemp/cgame/cg_localents.c

use myjk_common::bg_misc::{bg_evaluate_trajectory, bg_evaluate_trajectory_delta};
use myjk_common::common::com_error;
use myjk_common::q_shared::*;

use crate::cg_effects::cg_smoke_puff;
use crate::cg_local::*;
use crate::cg_syscalls::CgameImport;

pub const MAX_LOCAL_ENTITIES: usize = 2048;
pub const MAX_STRAFE_TRAILS: usize = 1024 * 16;

// the slot past the pool doubles as the head of the circular active list
const ACTIVE_ENT: usize = MAX_LOCAL_ENTITIES;
const ACTIVE_TRAIL: usize = MAX_STRAFE_TRAILS;

const SINK_TIME: i32 = 1000; // time for fragments to fade out after settling

const NUMBER_SIZE: f32 = 8.0;

// ============================================================
// Local entity pool
// ============================================================

/// Fixed pool of local entities. Records link through their pool indices:
/// active records sit on a circular doubly linked list through the sentinel
/// slot, free records chain singly through next with prev == LE_NONE. That
/// cleared prev is what free_local_entity checks to catch double frees.
pub struct LocalEntState {
    pub ents: Vec<LocalEntity>,
    free: usize,

    /// Height of the last score plum, used to keep stacked plums apart.
    pub last_plum_pos: Vec3,
}

impl LocalEntState {
    pub fn new() -> Self {
        let mut state = Self {
            ents: vec![LocalEntity::default(); MAX_LOCAL_ENTITIES + 1],
            free: 0,
            last_plum_pos: [0.0; 3],
        };
        state.init();
        state
    }

    /// This is called at startup and for tournament restarts.
    pub fn init(&mut self) {
        for ent in self.ents.iter_mut() {
            *ent = LocalEntity::default();
        }
        self.ents[ACTIVE_ENT].next = ACTIVE_ENT;
        self.ents[ACTIVE_ENT].prev = ACTIVE_ENT;
        self.free = 0;
        for i in 0..MAX_LOCAL_ENTITIES - 1 {
            self.ents[i].next = i + 1;
        }
    }

    pub fn free_local_entity(&mut self, le: usize) {
        if self.ents[le].prev == LE_NONE {
            com_error(ERR_DROP, "CG_FreeLocalEntity: not active");
        }

        // remove from the doubly linked active list
        let prev = self.ents[le].prev;
        let next = self.ents[le].next;
        self.ents[prev].next = next;
        self.ents[next].prev = prev;

        // the free list is only singly linked; a cleared prev marks the
        // record free
        self.ents[le].prev = LE_NONE;
        self.ents[le].next = self.free;
        self.free = le;
    }

    /// Will always succeed, even if it requires freeing an old active entity.
    pub fn alloc_local_entity(&mut self) -> usize {
        if self.free == LE_NONE {
            // no free entities, so free the one at the end of the chain
            // remove the oldest active entity
            let oldest = self.ents[ACTIVE_ENT].prev;
            self.free_local_entity(oldest);
        }

        let le = self.free;
        self.free = self.ents[le].next;
        self.ents[le] = LocalEntity::default();

        // link into the active list
        let head = self.ents[ACTIVE_ENT].next;
        self.ents[le].next = head;
        self.ents[le].prev = ACTIVE_ENT;
        self.ents[head].prev = le;
        self.ents[ACTIVE_ENT].next = le;
        le
    }

    pub fn is_active(&self, le: usize) -> bool {
        self.ents[le].prev != LE_NONE
    }

    pub fn num_active(&self) -> usize {
        let mut count = 0;
        let mut le = self.ents[ACTIVE_ENT].next;
        while le != ACTIVE_ENT {
            count += 1;
            le = self.ents[le].next;
        }
        count
    }

    pub fn num_free(&self) -> usize {
        let mut count = 0;
        let mut le = self.free;
        while le != LE_NONE {
            count += 1;
            le = self.ents[le].next;
        }
        count
    }

    // ============================================================
    // Fragment processing
    // ============================================================

    /// Leave expanding blood puffs behind gibs.
    fn blood_trail(&mut self, le: usize, cg: &CgState) {
        let step = 150;
        let t2 = step * (cg.time / step);
        let mut t = step * ((cg.time - cg.frametime + step) / step);

        let pos = self.ents[le].pos;
        while t <= t2 {
            let new_origin = bg_evaluate_trajectory(&pos, t);

            let blood = cg_smoke_puff(
                self,
                &new_origin,
                &vec3_origin,
                20.0,               // radius
                1.0, 1.0, 1.0, 1.0, // color
                2000.0,             // trail time
                t,                  // start time
                0,                  // fade in time
                0,                  // flags
                cg.media.blood_trail_shader,
            );
            // use the optimized version
            self.ents[blood].le_type = LeType::FallScaleFade;
            // drop a total of 40 units over its lifetime
            self.ents[blood].pos.tr_delta[2] = 40.0;

            t += step;
        }
    }

    fn fragment_bounce_mark(&mut self, le: usize, trace: &Trace, cg: &CgState, imp: &mut impl CgameImport) {
        match self.ents[le].le_mark_type {
            LeMarkType::Blood => {
                let radius = 16 + q_irand(0, 31);
                imp.impact_mark(
                    cg.media.blood_mark_shader,
                    &trace.endpos,
                    &trace.plane.normal,
                    q_flrand(0.0, 1.0) * 360.0,
                    radius as f32,
                );
            }
            LeMarkType::Burn => {
                let radius = 8 + q_irand(0, 15);
                imp.impact_mark(
                    cg.media.burn_mark_shader,
                    &trace.endpos,
                    &trace.plane.normal,
                    q_flrand(0.0, 1.0) * 360.0,
                    radius as f32,
                );
            }
            LeMarkType::None => {}
        }

        // don't allow a fragment to make multiple marks, or they
        // pile up while settling
        self.ents[le].le_mark_type = LeMarkType::None;
    }

    fn fragment_bounce_sound(&mut self, le: usize, trace: &Trace, cg: &CgState, imp: &mut impl CgameImport) {
        // half the fragments will make a bounce sound
        if q_irand(0, 1) != 0 {
            let s = match self.ents[le].le_bounce_sound_type {
                LeBounceSoundType::Rock => cg.media.rock_bounce_sound[q_irand(0, 1) as usize],
                LeBounceSoundType::Metal => cg.media.metal_bounce_sound[q_irand(0, 1) as usize],
                LeBounceSoundType::Blood => {
                    // half the gibs will make splat sounds
                    if q_irand(0, 1) != 0 {
                        let r = q_irand(0, 3);
                        let s = if r == 0 {
                            cg.media.gib_bounce1_sound
                        } else if r == 1 {
                            cg.media.gib_bounce2_sound
                        } else {
                            cg.media.gib_bounce3_sound
                        };
                        imp.start_sound(&trace.endpos, ENTITYNUM_WORLD, CHAN_AUTO, s);
                    }
                    // gibs keep their sound type; the blood trail check reads it
                    return;
                }
                LeBounceSoundType::None => return,
            };

            if s != 0 {
                imp.start_sound(&trace.endpos, ENTITYNUM_WORLD, CHAN_AUTO, s);
            }

            // bouncers only make the sound once
            self.ents[le].le_bounce_sound_type = LeBounceSoundType::None;
        } else if q_irand(0, 1) != 0 {
            // we may end up bouncing again, but each bounce reduces the
            // chance of playing the sound again or they may make a lot of
            // noise when they settle
            self.ents[le].le_bounce_sound_type = LeBounceSoundType::None;
        }
    }

    fn reflect_velocity(&mut self, le: usize, trace: &Trace, cg: &CgState) {
        let ent = &mut self.ents[le];

        // reflect the velocity on the trace plane at the sub-frame hit time
        let hit_time = ((cg.time - cg.frametime) as f32 + cg.frametime as f32 * trace.fraction) as i32;
        let velocity = bg_evaluate_trajectory_delta(&ent.pos, hit_time);
        let dot = dot_product(&velocity, &trace.plane.normal);
        ent.pos.tr_delta = vector_ma(&velocity, -2.0 * dot, &trace.plane.normal);

        ent.pos.tr_delta = vector_scale(&ent.pos.tr_delta, ent.bounce_factor);

        ent.pos.tr_base = trace.endpos;
        ent.pos.tr_time = cg.time;

        // check for stop, making sure that even on low fps systems it doesn't bobble
        if trace.allsolid
            || (trace.plane.normal[2] > 0.0
                && (ent.pos.tr_delta[2] < 40.0
                    || ent.pos.tr_delta[2] < -(cg.frametime as f32) * ent.pos.tr_delta[2]))
        {
            ent.pos.tr_type = TrType::Stationary;
        }
    }

    fn add_fragment(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        if self.ents[le].force_alpha != 0 {
            let ent = &mut self.ents[le];
            ent.ref_entity.renderfx |= RF_FORCE_ENT_ALPHA;
            ent.ref_entity.shader_rgba[3] = ent.force_alpha;
        }

        if self.ents[le].pos.tr_type == TrType::Stationary {
            // fade out once it is near the removal time
            let ent = &mut self.ents[le];
            let t = ent.end_time - cg.time;
            if t < SINK_TIME * 2 {
                ent.ref_entity.renderfx |= RF_FORCE_ENT_ALPHA;
                let mut t_e = (t as f32 / (SINK_TIME * 2) as f32 * 255.0) as i32;
                if t_e > 255 {
                    t_e = 255;
                }
                if t_e < 1 {
                    t_e = 1;
                }
                if ent.ref_entity.shader_rgba[3] != 0 && t_e > ent.ref_entity.shader_rgba[3] as i32 {
                    t_e = ent.ref_entity.shader_rgba[3] as i32;
                }
                ent.ref_entity.shader_rgba[3] = t_e as u8;
            }
            imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
            return;
        }

        // calculate new position
        let new_origin = bg_evaluate_trajectory(&self.ents[le].pos, cg.time);

        // trace a line from previous position to new position
        let old_origin = self.ents[le].ref_entity.origin;
        let trace = imp.trace(&old_origin, None, None, &new_origin, -1, CONTENTS_SOLID);

        if trace.fraction == 1.0 {
            // still in free fall
            {
                let ent = &mut self.ents[le];
                ent.ref_entity.origin = new_origin;
                if ent.le_flags & LEF_TUMBLE != 0 {
                    let angles = bg_evaluate_trajectory(&ent.angles, cg.time);
                    angles_to_axis(&angles, &mut ent.ref_entity.axis);
                    scale_model_axis(&mut ent.ref_entity);
                }
            }

            imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);

            // add a blood trail
            if self.ents[le].le_bounce_sound_type == LeBounceSoundType::Blood {
                self.blood_trail(le, cg);
            }

            return;
        }

        // if it is in a nodrop zone, remove it
        // this keeps gibs from waiting at the bottom of pits of death
        // and floating levels
        if imp.point_contents(&trace.endpos, 0) & CONTENTS_NODROP != 0 {
            self.free_local_entity(le);
            return;
        }

        if !trace.startsolid {
            // leave a mark
            self.fragment_bounce_mark(le, &trace, cg, imp);

            // do a bouncy sound
            self.fragment_bounce_sound(le, &trace, cg, imp);

            if self.ents[le].bounce_sound != 0 {
                // specified bounce sound (debris)
                let at = self.ents[le].pos.tr_base;
                imp.start_sound(&at, ENTITYNUM_WORLD, CHAN_AUTO, self.ents[le].bounce_sound);
            }

            // reflect the velocity on the trace plane
            self.reflect_velocity(le, &trace, cg);

            imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
        }
    }

    // ============================================================
    // Frame style effects
    // ============================================================

    fn add_fade_rgb(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let ent = &mut self.ents[le];

        let mut c = (ent.end_time - cg.time) as f32 * ent.life_rate;
        c *= 0xff as f32;

        ent.ref_entity.shader_rgba[0] = (ent.color[0] * c) as u8;
        ent.ref_entity.shader_rgba[1] = (ent.color[1] * c) as u8;
        ent.ref_entity.shader_rgba[2] = (ent.color[2] * c) as u8;
        ent.ref_entity.shader_rgba[3] = (ent.color[3] * c) as u8;

        imp.add_ref_entity_to_scene(&ent.ref_entity);
    }

    fn add_fade_scale_model(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let ent = &mut self.ents[le];

        let mut frac = (cg.time - ent.start_time) as f32 / (ent.end_time - ent.start_time) as f32;

        // grows slowly, then pops at the end
        frac *= frac * frac;

        ent.ref_entity.non_normalized_axes = true;
        ent.ref_entity.axis = AXIS_DEFAULT;
        ent.ref_entity.axis[0] = vector_scale(&ent.ref_entity.axis[0], ent.radius * frac);
        ent.ref_entity.axis[1] = vector_scale(&ent.ref_entity.axis[1], ent.radius * frac);
        ent.ref_entity.axis[2] = vector_scale(&ent.ref_entity.axis[2], ent.radius * 0.5 * frac);

        frac = 1.0 - frac;

        ent.ref_entity.shader_rgba[0] = (ent.color[0] * frac) as u8;
        ent.ref_entity.shader_rgba[1] = (ent.color[1] * frac) as u8;
        ent.ref_entity.shader_rgba[2] = (ent.color[2] * frac) as u8;
        ent.ref_entity.shader_rgba[3] = (ent.color[3] * frac) as u8;

        // add the entity
        imp.add_ref_entity_to_scene(&ent.ref_entity);
    }

    fn add_puff(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let free_me;
        {
            let ent = &mut self.ents[le];

            // fade / grow time
            let c = (ent.end_time - cg.time) as f32 / (ent.end_time - ent.start_time) as f32;

            ent.ref_entity.shader_rgba[0] = (ent.color[0] * c) as u8;
            ent.ref_entity.shader_rgba[1] = (ent.color[1] * c) as u8;
            ent.ref_entity.shader_rgba[2] = (ent.color[2] * c) as u8;

            if ent.le_flags & LEF_PUFF_DONT_SCALE == 0 {
                ent.ref_entity.radius = ent.radius * (1.0 - c) + 8.0;
            }

            ent.ref_entity.origin = bg_evaluate_trajectory(&ent.pos, cg.time);

            // if the view would be "inside" the sprite, kill the sprite
            // so it doesn't add too much overdraw
            let delta = vector_subtract(&ent.ref_entity.origin, &cg.vieworg);
            free_me = vector_length(&delta) < ent.radius;
        }
        if free_me {
            self.free_local_entity(le);
            return;
        }

        imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
    }

    fn add_move_scale_fade(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let free_me;
        {
            let ent = &mut self.ents[le];

            let c = if ent.fade_in_time > ent.start_time && cg.time < ent.fade_in_time {
                // fade / grow time
                1.0 - (ent.fade_in_time - cg.time) as f32 / (ent.fade_in_time - ent.start_time) as f32
            } else {
                // fade / grow time
                (ent.end_time - cg.time) as f32 * ent.life_rate
            };

            ent.ref_entity.shader_rgba[3] = (0xff as f32 * c * ent.color[3]) as u8;

            if ent.le_flags & LEF_PUFF_DONT_SCALE == 0 {
                ent.ref_entity.radius = ent.radius * (1.0 - c) + 8.0;
            }

            ent.ref_entity.origin = bg_evaluate_trajectory(&ent.pos, cg.time);

            // if the view would be "inside" the sprite, kill the sprite
            // so it doesn't add too much overdraw
            let delta = vector_subtract(&ent.ref_entity.origin, &cg.vieworg);
            free_me = vector_length(&delta) < ent.radius;
        }
        if free_me {
            self.free_local_entity(le);
            return;
        }

        imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
    }

    fn add_scale_fade(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let free_me;
        {
            let ent = &mut self.ents[le];

            // fade / grow time
            let c = (ent.end_time - cg.time) as f32 * ent.life_rate;

            ent.ref_entity.shader_rgba[3] = (0xff as f32 * c * ent.color[3]) as u8;
            ent.ref_entity.radius = ent.radius * (1.0 - c) + 8.0;

            // if the view would be "inside" the sprite, kill the sprite
            // so it doesn't add too much overdraw
            let delta = vector_subtract(&ent.ref_entity.origin, &cg.vieworg);
            free_me = vector_length(&delta) < ent.radius;
        }
        if free_me {
            self.free_local_entity(le);
            return;
        }

        imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
    }

    /// This is just an optimized add_move_scale_fade for blood trail drops
    /// that fall straight down.
    fn add_fall_scale_fade(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let free_me;
        {
            let ent = &mut self.ents[le];

            // fade time
            let c = (ent.end_time - cg.time) as f32 * ent.life_rate;

            ent.ref_entity.shader_rgba[3] = (0xff as f32 * c * ent.color[3]) as u8;

            ent.ref_entity.origin[2] = ent.pos.tr_base[2] - (1.0 - c) * ent.pos.tr_delta[2];

            ent.ref_entity.radius = ent.radius * (1.0 - c) + 16.0;

            // if the view would be "inside" the sprite, kill the sprite
            // so it doesn't add too much overdraw
            let delta = vector_subtract(&ent.ref_entity.origin, &cg.vieworg);
            free_me = vector_length(&delta) < ent.radius;
        }
        if free_me {
            self.free_local_entity(le);
            return;
        }

        imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
    }

    fn add_explosion(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let ex = &self.ents[le];

        // add the entity
        imp.add_ref_entity_to_scene(&ex.ref_entity);

        // add the dlight
        if ex.light != 0.0 {
            let mut light = (cg.time - ex.start_time) as f32 / (ex.end_time - ex.start_time) as f32;
            if light < 0.5 {
                light = 1.0;
            } else {
                light = 1.0 - (light - 0.5) * 2.0;
            }
            light = ex.light * light;
            imp.add_light_to_scene(
                &ex.ref_entity.origin,
                light,
                ex.light_color[0],
                ex.light_color[1],
                ex.light_color[2],
            );
        }
    }

    fn add_sprite_explosion(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let ent = &self.ents[le];
        let mut re = ent.ref_entity.clone();

        let mut c = (ent.end_time - cg.time) as f32 / (ent.end_time - ent.start_time) as f32;
        if c > 1.0 {
            c = 1.0; // can happen during connection problems
        }

        re.shader_rgba[0] = 0xff;
        re.shader_rgba[1] = 0xff;
        re.shader_rgba[2] = 0xff;
        re.shader_rgba[3] = (0xff as f32 * c * 0.33) as u8;

        re.re_type = RefEntityType::Sprite;
        re.radius = 42.0 * (1.0 - c) + 30.0;

        imp.add_ref_entity_to_scene(&re);

        // add the dlight
        if ent.light != 0.0 {
            let mut light = (cg.time - ent.start_time) as f32 / (ent.end_time - ent.start_time) as f32;
            if light < 0.5 {
                light = 1.0;
            } else {
                light = 1.0 - (light - 0.5) * 2.0;
            }
            light = ent.light * light;
            imp.add_light_to_scene(&re.origin, light, ent.light_color[0], ent.light_color[1], ent.light_color[2]);
        }
    }

    fn add_score_plum(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let up: Vec3 = [0.0, 0.0, 1.0];

        // trail number plums live forever and never fade
        let strafe_trail_num = self.ents[le].life_rate == 0.0;

        let c = (self.ents[le].end_time - cg.time) as f32 * self.ents[le].life_rate;

        let mut score = self.ents[le].radius as i32;

        if strafe_trail_num {
            let diff = vector_subtract(&cg.vieworg, &self.ents[le].pos.tr_base);

            if cg.cvars.strafe_trail_ghost > 1 {
                return;
            }
            // ditch markers far above or below the view, or very far away
            if diff[2] > 2048.0 || diff[2] < -8192.0 {
                return;
            }
            if vector_length_squared(&diff) > 4096.0 * 4096.0 {
                return;
            }
        }

        {
            let re = &mut self.ents[le].ref_entity;
            if strafe_trail_num {
                re.shader_rgba[0] = 255;
                re.shader_rgba[1] = 0;
                re.shader_rgba[2] = 0;
            } else if score < 0 {
                re.shader_rgba[0] = 0xff;
                re.shader_rgba[1] = 0x11;
                re.shader_rgba[2] = 0x11;
            } else {
                re.shader_rgba[0] = 0xff;
                re.shader_rgba[1] = 0xff;
                re.shader_rgba[2] = 0xff;
                if score >= 50 {
                    re.shader_rgba[1] = 0;
                } else if score >= 20 {
                    re.shader_rgba[0] = 0;
                    re.shader_rgba[1] = 0;
                } else if score >= 10 {
                    re.shader_rgba[2] = 0;
                } else if score >= 2 {
                    re.shader_rgba[0] = 0;
                    re.shader_rgba[2] = 0;
                }
            }
        }

        {
            let re = &mut self.ents[le].ref_entity;
            re.shader_rgba[3] = if strafe_trail_num {
                0xff
            } else if c < 0.25 {
                (0xff as f32 * 4.0 * c) as u8
            } else {
                0xff
            };

            re.radius = NUMBER_SIZE / 2.0;
        }

        let mut origin = self.ents[le].pos.tr_base;
        if !strafe_trail_num {
            origin[2] += 110.0 - c * 100.0;
        }

        let dir = vector_subtract(&cg.vieworg, &origin);
        let mut vec = cross_product(&dir, &up);
        vector_normalize(&mut vec);

        origin = vector_ma(
            &origin,
            -10.0 + 20.0 * (c * 2.0 * std::f32::consts::PI).sin(),
            &vec,
        );

        // if the view would be "inside" the sprite, kill the sprite
        // so it doesn't add too much overdraw
        if !strafe_trail_num {
            let delta = vector_subtract(&origin, &cg.vieworg);
            if vector_length(&delta) < 20.0 {
                self.free_local_entity(le);
                return;
            }
        }

        let mut negative = false;
        score = self.ents[le].radius as i32;
        if score < 0 {
            negative = true;
            score = -score;
        }

        let mut digits = [0i32; 11];
        let mut numdigits = 0usize;
        while !(numdigits != 0 && score == 0) {
            digits[numdigits] = score % 10;
            score /= 10;
            numdigits += 1;
        }

        if negative {
            digits[numdigits] = 10;
            numdigits += 1;
        }

        for i in 0..numdigits {
            {
                let re = &mut self.ents[le].ref_entity;
                re.origin = vector_ma(
                    &origin,
                    (numdigits as f32 / 2.0 - i as f32) * NUMBER_SIZE,
                    &vec,
                );
                re.custom_shader = cg.media.number_shaders[digits[numdigits - 1 - i] as usize];
            }
            imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
        }
    }

    /// Drawn in place of a score plum when the radius carries no number:
    /// a team colored overhead marker for spotted players.
    fn add_spot_icon(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let mut ent = RefEntity::default();
        ent.origin = self.ents[le].pos.tr_base;
        ent.origin[2] += 48.0;
        ent.re_type = RefEntityType::Sprite;
        ent.renderfx = RF_NODEPTH;
        ent.shader_rgba[0] = 255;
        ent.shader_rgba[1] = 255;
        ent.shader_rgba[2] = 255;
        ent.shader_rgba[3] = 255;

        // scale up with distance so the icon stays readable
        let dist = distance(&cg.player_origin, &self.ents[le].pos.tr_base);
        let add = (dist / 50.0) as i32;
        ent.radius = 5.0 + add as f32;

        ent.custom_shader = if cg.team == Team::Red {
            cg.media.team_blue_shader
        } else {
            cg.media.team_red_shader
        };

        imp.add_ref_entity_to_scene(&ent);
    }

    fn add_oline(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let free_me;
        {
            let ent = &mut self.ents[le];

            let mut frac = (cg.time - ent.start_time) as f32 / (ent.end_time - ent.start_time) as f32;
            if frac > 1.0 {
                frac = 1.0; // can happen during connection problems
            } else if frac < 0.0 {
                frac = 0.0;
            }

            // interpolate the width over the lifetime
            ent.ref_entity.line_width = ent.line_width + ent.line_dwidth * frac;
            free_me = ent.ref_entity.line_width <= 0.0;

            if !free_me {
                // additive transparency: fade all four channels together
                let alpha = ent.alpha + ent.dalpha * frac;
                ent.ref_entity.shader_rgba = [(0xff as f32 * alpha) as u8; 4];

                ent.ref_entity.shader_tex_coord[0] = 1.0;
                ent.ref_entity.shader_tex_coord[1] = 1.0;

                ent.ref_entity.rotation = 90.0;

                ent.ref_entity.re_type = RefEntityType::OrientedLine;
            }
        }
        if free_me {
            self.free_local_entity(le);
            return;
        }

        imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
    }

    fn add_line(&mut self, le: usize, imp: &mut impl CgameImport) {
        let ent = &mut self.ents[le];
        ent.ref_entity.re_type = RefEntityType::Line;
        imp.add_ref_entity_to_scene(&ent.ref_entity);
    }

    /// Add a fake rendered entity to the scene, used to show the position of
    /// things the server no longer tells us about.
    fn add_ref_entity(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        if self.ents[le].end_time < cg.time {
            self.free_local_entity(le);
            return;
        }
        imp.add_ref_entity_to_scene(&self.ents[le].ref_entity);
    }

    /// Client-side simulated projectile, drawn as its weapon's flight effect
    /// at the analytic trajectory position.
    fn add_missile(&mut self, le: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let ent = &self.ents[le];

        // odd means altfire
        let (weapon, alt_fire) = if ent.le_flags % 2 != 0 {
            ((ent.le_flags - 1) / 2, true)
        } else {
            (ent.le_flags / 2, false)
        };

        let current_pos = bg_evaluate_trajectory(&ent.pos, cg.time);
        let dir = ent.angles.tr_base;

        let effect = match weapon {
            WP_BRYAR_PISTOL | WP_BRYAR_OLD => cg.effects.bryar_shot_effect,
            WP_BLASTER => cg.effects.blaster_shot_effect,
            WP_DISRUPTOR => {
                if cg.jcinfo & JAPRO_CINFO_PROJSNIPER == 0 {
                    return;
                }
                cg.effects.bryar_shot_effect
            }
            WP_BOWCASTER => cg.effects.bowcaster_shot_effect,
            WP_REPEATER => {
                if alt_fire {
                    if cg.jcinfo2 & JAPRO_CINFO2_WTTRIBES != 0 {
                        cg.effects.mortar_projectile
                    } else {
                        cg.effects.repeater_alt_projectile_effect
                    }
                } else {
                    cg.effects.repeater_projectile_effect
                }
            }
            WP_FLECHETTE => {
                if alt_fire {
                    cg.effects.flechette_alt_shot_effect
                } else {
                    cg.effects.flechette_shot_effect
                }
            }
            WP_ROCKET_LAUNCHER => cg.effects.rocket_shot_effect,
            WP_CONCUSSION => cg.effects.concussion_shot_effect,
            _ => return,
        };

        imp.play_effect_id(effect, &current_pos, &dir);
    }

    // ============================================================
    // Frame dispatch
    // ============================================================

    /// Run one frame of local entity simulation and drawing. Walks the list
    /// backwards, so any new local entities generated during the walk
    /// (trails, marks, etc) will be present this frame.
    pub fn add_local_entities(&mut self, cg: &CgState, imp: &mut impl CgameImport) {
        let mut le = self.ents[ACTIVE_ENT].prev;
        while le != ACTIVE_ENT {
            // grab next now, so if the local entity is freed we
            // still have it
            let next = self.ents[le].prev;

            if cg.time >= self.ents[le].end_time {
                self.free_local_entity(le);
                le = next;
                continue;
            }

            match self.ents[le].le_type {
                LeType::Mark => {}

                LeType::SpriteExplosion => self.add_sprite_explosion(le, cg, imp),

                LeType::Explosion => self.add_explosion(le, cg, imp),

                LeType::FadeScaleModel => self.add_fade_scale_model(le, cg, imp),

                // gibs and brass
                LeType::Fragment => self.add_fragment(le, cg, imp),

                LeType::Puff => self.add_puff(le, cg, imp),

                // water bubbles
                LeType::MoveScaleFade => self.add_move_scale_fade(le, cg, imp),

                // teleporters, railtrails
                LeType::FadeRgb => self.add_fade_rgb(le, cg, imp),

                // gib blood trails
                LeType::FallScaleFade => self.add_fall_scale_fade(le, cg, imp),

                // rocket trails
                LeType::ScaleFade => self.add_scale_fade(le, cg, imp),

                LeType::ScorePlum => {
                    if self.ents[le].radius != 0.0 {
                        self.add_score_plum(le, cg, imp);
                    } else {
                        self.add_spot_icon(le, cg, imp);
                    }
                }

                // oriented lines for FX
                LeType::OLine => self.add_oline(le, cg, imp),

                LeType::Line => self.add_line(le, imp),

                LeType::ShowRefEntity => self.add_ref_entity(le, cg, imp),

                // cg_simulatedProjectiles
                LeType::Missile => self.add_missile(le, cg, imp),
            }

            le = next;
        }
    }
}

impl Default for LocalEntState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// Strafe trails
// ============================================================

/// Strafe trail segments use the same pool discipline as local entities,
/// kept in their own arena so thousands of ribbon segments don't crowd out
/// the effect pool.
pub struct StrafeTrailState {
    pub trails: Vec<StrafeTrail>,
    free: usize,

    /// Bitmask of client numbers with a trail currently being recorded.
    pub drawing: i32,
}

impl StrafeTrailState {
    pub fn new() -> Self {
        let mut state = Self {
            trails: vec![StrafeTrail::default(); MAX_STRAFE_TRAILS + 1],
            free: 0,
            drawing: 0,
        };
        state.init();
        state
    }

    pub fn init(&mut self) {
        for trail in self.trails.iter_mut() {
            *trail = StrafeTrail::default();
        }
        self.trails[ACTIVE_TRAIL].next = ACTIVE_TRAIL;
        self.trails[ACTIVE_TRAIL].prev = ACTIVE_TRAIL;
        self.free = 0;
        for i in 0..MAX_STRAFE_TRAILS - 1 {
            self.trails[i].next = i + 1;
        }
        self.drawing = 0;
    }

    pub fn free_strafe_trail(&mut self, st: usize) {
        if self.trails[st].prev == LE_NONE {
            com_error(ERR_DROP, "CG_FreeStrafeTrail: not active");
        }

        // remove from the doubly linked active list
        let prev = self.trails[st].prev;
        let next = self.trails[st].next;
        self.trails[prev].next = next;
        self.trails[next].prev = prev;

        // the free list is only singly linked
        self.trails[st].prev = LE_NONE;
        self.trails[st].next = self.free;
        self.free = st;
    }

    /// Will always succeed, even if it requires freeing an old trail.
    pub fn alloc_strafe_trail(&mut self) -> usize {
        if self.free == LE_NONE {
            // no free segments, so recycle the oldest active one
            let oldest = self.trails[ACTIVE_TRAIL].prev;
            self.free_strafe_trail(oldest);
        }

        let st = self.free;
        self.free = self.trails[st].next;
        self.trails[st] = StrafeTrail::default();

        // link into the active list
        let head = self.trails[ACTIVE_TRAIL].next;
        self.trails[st].next = head;
        self.trails[st].prev = ACTIVE_TRAIL;
        self.trails[head].prev = st;
        self.trails[ACTIVE_TRAIL].next = st;
        st
    }

    pub fn is_active(&self, st: usize) -> bool {
        self.trails[st].prev != LE_NONE
    }

    pub fn num_active(&self) -> usize {
        let mut count = 0;
        let mut st = self.trails[ACTIVE_TRAIL].next;
        while st != ACTIVE_TRAIL {
            count += 1;
            st = self.trails[st].next;
        }
        count
    }

    pub fn num_free(&self) -> usize {
        let mut count = 0;
        let mut st = self.free;
        while st != LE_NONE {
            count += 1;
            st = self.trails[st].next;
        }
        count
    }

    fn add_single_strafe_trail(&self, st: usize, cg: &CgState, imp: &mut impl CgameImport) {
        let trail = &self.trails[st];

        let mut radius = cg.cvars.strafe_trail_radius;
        if radius < 0.1 {
            radius = 0.1;
        } else if radius > 100.0 {
            radius = 100.0;
        }

        let mut line = RefEntity::default();
        line.origin = trail.start;
        line.old_origin = trail.end;

        line.re_type = RefEntityType::Line;
        line.radius = 0.5 * radius;
        line.custom_shader = cg.media.white_shader;
        line.shader_tex_coord[0] = 1.0;
        line.shader_tex_coord[1] = 1.0;

        let mut color = trail.color;
        line.shader_rgba[0] = (color & 0xff) as u8;
        color >>= 8;
        line.shader_rgba[1] = (color & 0xff) as u8;
        color >>= 8;
        line.shader_rgba[2] = (color & 0xff) as u8;
        line.shader_rgba[3] = 0xff;

        imp.add_ref_entity_to_scene(&line);
    }

    /// Short vertical marker showing where along the trail a ghost replaying
    /// the run would currently be.
    fn add_strafe_ghost(&self, org: &Vec3, cg: &CgState, imp: &mut impl CgameImport) {
        let mut line = RefEntity::default();
        line.origin = *org;
        line.old_origin = *org;

        line.origin[2] -= 12.0;
        line.old_origin[2] += 12.0;
        line.radius = 12.0;

        line.shader_rgba[0] = 255;
        line.shader_rgba[1] = 0;
        line.shader_rgba[2] = 0;
        line.shader_rgba[3] = 0xff;
        line.shader_tex_coord[0] = 1.0;
        line.shader_tex_coord[1] = 1.0;

        line.re_type = RefEntityType::Line;
        line.custom_shader = cg.media.white_shader;

        imp.add_ref_entity_to_scene(&line);
    }

    /// Draw all live trail segments, expire old ones, and place the ghost
    /// marker for the current run time.
    pub fn add_all_strafe_trails(&mut self, cg: &CgState, imp: &mut impl CgameImport) {
        let speed = 1000 / cg.cvars.strafe_trail_fps.max(1);
        let mut time = 0i32;
        let mut drawn;

        if cg.cvars.strafe_trail_ghost == 0 || cg.snap.is_none() {
            drawn = true;
        } else {
            drawn = false;
            time = cg.time - cg.duel_time;
            // spectators and followers see raw time, players compensate
            // for ping and frame pacing
            if cg.pm_flags & PMF_FOLLOW == 0 && cg.team != Team::Spectator {
                if let Some(snap) = &cg.snap {
                    time = (time as f32 + snap.ping as f32 + speed as f32 * 0.5) as i32;
                }
            }
        }

        let mut i = 0i32;
        let mut st = self.trails[ACTIVE_TRAIL].prev;
        while st != ACTIVE_TRAIL {
            // grab next now, in case this segment is freed
            let next = self.trails[st].prev;

            if cg.time >= self.trails[st].end_time {
                self.free_strafe_trail(st);
                st = next;
                continue;
            }

            i += 1;

            // ditch segments far above or below the view, very far away,
            // or outside the potentially visible set
            let diff = vector_subtract(&cg.vieworg, &self.trails[st].end);
            if diff[2] > 2048.0 || diff[2] < -8192.0 {
                st = next;
                continue;
            }
            if vector_length_squared(&diff) > 16384.0 * 16384.0 {
                st = next;
                continue;
            }
            if !imp.in_pvs(&cg.vieworg, &self.trails[st].end) {
                st = next;
                continue;
            }

            if cg.cvars.strafe_trail_ghost < 2 {
                self.add_single_strafe_trail(st, cg, imp);
            }

            if !drawn && time < i * speed {
                let org = self.trails[st].start;
                self.add_strafe_ghost(&org, cg, imp);
                drawn = true;
            }

            st = next;
        }
    }
}

impl Default for StrafeTrailState {
    fn default() -> Self {
        Self::new()
    }
}

/// Retire the trail segments and trail number plums belonging to one client,
/// or all of them when client_num is -1. Records get a short grace period
/// instead of being freed in place.
pub fn cg_remove_strafe_trail(
    les: &mut LocalEntState,
    trails: &mut StrafeTrailState,
    cg: &CgState,
    client_num: i32,
) {
    if client_num == -1 {
        trails.drawing = 0;
    } else {
        trails.drawing &= !(1 << client_num);
    }

    for i in 0..MAX_STRAFE_TRAILS - 1 {
        if trails.trails[i].client_num == client_num + 1 || client_num == -1 {
            trails.trails[i].end_time = cg.time + 100;
        }
    }

    for i in 0..MAX_LOCAL_ENTITIES - 1 {
        if les.ents[i].le_type == LeType::ScorePlum
            && les.ents[i].life_rate == 0.0
            && (les.ents[i].le_flags == client_num + 1
                || (les.ents[i].le_flags > 0 && client_num == -1))
        {
            les.ents[i].end_time = cg.time + 100;
        }
    }
}

// ============================================================
// Unit tests
// ============================================================
