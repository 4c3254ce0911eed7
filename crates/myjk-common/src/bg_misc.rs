// bg_misc.rs — both games misc functions, all completely stateless
// Converted from: myjk-original/codemp/game/bg_misc.c

use crate::q_shared::{
    Trajectory, TrType, Vec3, DEFAULT_GRAVITY, DEG_TO_RAD, vector_ma, vector_scale,
};

/// BG_EvaluateTrajectory — position on a trajectory at an arbitrary time.
pub fn bg_evaluate_trajectory(tr: &Trajectory, at_time: i32) -> Vec3 {
    match tr.tr_type {
        TrType::Stationary | TrType::Interpolate => tr.tr_base,

        TrType::Linear => {
            let delta_time = (at_time - tr.tr_time) as f32 * 0.001; // milliseconds to seconds
            vector_ma(&tr.tr_base, delta_time, &tr.tr_delta)
        }

        TrType::Sine => {
            let delta_time = (at_time - tr.tr_time) as f32 / tr.tr_duration as f32;
            let phase = (delta_time * std::f32::consts::PI * 2.0).sin();
            vector_ma(&tr.tr_base, phase, &tr.tr_delta)
        }

        TrType::LinearStop => {
            let mut at_time = at_time;
            if at_time > tr.tr_time + tr.tr_duration {
                at_time = tr.tr_time + tr.tr_duration;
            }
            let mut delta_time = (at_time - tr.tr_time) as f32 * 0.001; // milliseconds to seconds
            if delta_time < 0.0 {
                delta_time = 0.0;
            }
            vector_ma(&tr.tr_base, delta_time, &tr.tr_delta)
        }

        TrType::NonlinearStop => {
            let mut at_time = at_time;
            if at_time > tr.tr_time + tr.tr_duration {
                at_time = tr.tr_time + tr.tr_duration;
            }
            // slow down at the end
            let delta_time = if at_time - tr.tr_time > tr.tr_duration || at_time - tr.tr_time <= 0
            {
                0.0
            } else {
                tr.tr_duration as f32
                    * 0.001
                    * (DEG_TO_RAD
                        * (90.0
                            - (90.0 * (at_time - tr.tr_time) as f32) / tr.tr_duration as f32))
                        .cos()
            };
            vector_ma(&tr.tr_base, delta_time, &tr.tr_delta)
        }

        TrType::Gravity => {
            let delta_time = (at_time - tr.tr_time) as f32 * 0.001; // milliseconds to seconds
            let mut result = vector_ma(&tr.tr_base, delta_time, &tr.tr_delta);
            result[2] -= 0.5 * DEFAULT_GRAVITY * delta_time * delta_time;
            result
        }
    }
}

/// BG_EvaluateTrajectoryDelta — velocity on a trajectory at an arbitrary time.
pub fn bg_evaluate_trajectory_delta(tr: &Trajectory, at_time: i32) -> Vec3 {
    match tr.tr_type {
        TrType::Stationary | TrType::Interpolate => [0.0; 3],

        TrType::Linear => tr.tr_delta,

        TrType::Sine => {
            let delta_time = (at_time - tr.tr_time) as f32 / tr.tr_duration as f32;
            // derivative of sin = cos
            let mut phase = (delta_time * std::f32::consts::PI * 2.0).cos();
            phase *= 0.5;
            vector_scale(&tr.tr_delta, phase)
        }

        TrType::LinearStop => {
            if at_time - tr.tr_time > tr.tr_duration {
                return [0.0; 3];
            }
            tr.tr_delta
        }

        TrType::NonlinearStop => {
            if at_time - tr.tr_time > tr.tr_duration || at_time - tr.tr_time <= 0 {
                return [0.0; 3];
            }
            let delta_time = (at_time - tr.tr_time) as f32 / tr.tr_duration as f32;
            vector_scale(
                &tr.tr_delta,
                (DEG_TO_RAD * (90.0 - 90.0 * delta_time)).sin(),
            )
        }

        TrType::Gravity => {
            let delta_time = (at_time - tr.tr_time) as f32 * 0.001; // milliseconds to seconds
            let mut result = tr.tr_delta;
            result[2] -= DEFAULT_GRAVITY * delta_time;
            result
        }
    }
}

// ============================================================
// Unit tests
// ============================================================
