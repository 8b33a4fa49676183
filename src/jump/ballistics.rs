//! Closed-form ballistics for route-to-route jumps.
//!
//! All launches are solved at a 45 degree elevation; the solver works on
//! the component speed and converts to the full launch speed at the end.

use glam::{Vec2, Vec3};

/// cos(45°) == sin(45°); splits a launch speed into its components.
const LAUNCH_COMPONENT: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Tolerance for the exact-hit classification.
const FIT_EPSILON: f32 = 1e-3;

/// Height above the launch plane after `t` seconds.
pub fn jump_height(vertical_speed: f32, t: f32, gravity: f32) -> f32 {
    -0.5 * gravity * t * t + vertical_speed * t
}

/// Sampled points along a trajectory, for visualization consumers.
pub fn jump_points(
    start: Vec3,
    dir: Vec3,
    vertical_speed: f32,
    steps: usize,
    t_max: f32,
    gravity: f32,
) -> Vec<Vec3> {
    let dt = t_max / steps as f32;
    (0..=steps)
        .map(|i| {
            let t = i as f32 * dt;
            start + dir * t + Vec3::Y * jump_height(vertical_speed, t, gravity)
        })
        .collect()
}

/// A solved launch: the full 45-degree launch speed and the airtime to
/// the target's horizontal distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallisticSolution {
    pub speed: f32,
    pub airtime: f32,
}

/// Solve the launch speed that lands a 45-degree jump exactly on `end`.
///
/// With horizontal distance `x` and elevation delta `dy`, the component
/// speed satisfies `v² = -g·x² / (2·(dy - x))`. A real positive solution
/// exists only for `dy < x`; the zero-denominator case `dy == x` has no
/// solution and is guarded explicitly.
pub fn solve_launch_speed(start: Vec3, end: Vec3, gravity: f32) -> Option<BallisticSolution> {
    let horizontal = Vec2::new(end.x - start.x, end.z - start.z);
    let x = horizontal.length();
    let dy = end.y - start.y;

    let denominator = dy - x;
    if denominator >= 0.0 {
        return None;
    }
    let v_sq = -gravity * x * x / (2.0 * denominator);
    if v_sq <= 0.0 {
        return None;
    }
    let component = v_sq.sqrt();
    Some(BallisticSolution {
        speed: component / LAUNCH_COMPONENT,
        airtime: x / component,
    })
}

/// How a fixed-speed trajectory relates to the target elevation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrajectoryFit {
    /// The arc passes below the target.
    Short,
    /// The arc meets the target within tolerance.
    Exact,
    /// The arc passes above the target.
    Long,
}

/// Full classification of one trajectory against a target.
#[derive(Clone, Copy, Debug)]
pub struct TrajectoryCheck {
    pub fit: TrajectoryFit,
    /// Apex of the arc; consumers aim cameras and rays at this point.
    pub ray_target: Vec3,
    /// Where the arc returns to the launch plane's descending branch.
    pub landing: Vec3,
}

/// Simulate a 45-degree launch at `speed` toward `end` and classify the
/// height reached at the target's horizontal distance.
///
/// Degenerate inputs (zero horizontal speed or zero horizontal distance)
/// classify as `Short` with the start as both targets.
pub fn check_physics(start: Vec3, end: Vec3, speed: f32, gravity: f32) -> TrajectoryCheck {
    let horizontal = Vec2::new(end.x - start.x, end.z - start.z);
    let x = horizontal.length();
    let dy = end.y - start.y;
    let vx = LAUNCH_COMPONENT * speed;
    let vy = LAUNCH_COMPONENT * speed;
    if vx <= f32::EPSILON || x <= f32::EPSILON {
        return TrajectoryCheck {
            fit: TrajectoryFit::Short,
            ray_target: start,
            landing: start,
        };
    }
    let dir = horizontal / x;
    let dir3 = Vec3::new(dir.x, 0.0, dir.y);

    let t = x / vx;
    let y = jump_height(vy, t, gravity);

    let peak_x = vy * vx / gravity;
    let peak_t = peak_x / vx;
    let peak_y = jump_height(vy, peak_t, gravity);
    let ray_target = start + dir3 * peak_x + Vec3::Y * peak_y;

    let intersection_x = 2.0 * vx * vx / gravity * (vy / vx - dy / x);
    let intersection_t = intersection_x / vx;
    let intersection_y = jump_height(vy, intersection_t, gravity);
    let landing = start + dir3 * intersection_x + Vec3::Y * intersection_y;

    let fit = if y > dy + FIT_EPSILON {
        TrajectoryFit::Long
    } else if y < dy - FIT_EPSILON {
        TrajectoryFit::Short
    } else {
        TrajectoryFit::Exact
    };
    TrajectoryCheck {
        fit,
        ray_target,
        landing,
    }
}
