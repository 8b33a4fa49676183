//! Ballistic jump discovery between route segments.

pub mod ballistics;
pub mod finder;

pub use ballistics::{
    check_physics, jump_height, jump_points, solve_launch_speed, BallisticSolution,
    TrajectoryCheck, TrajectoryFit,
};
pub use finder::{find_jumps, turn_angle_deg, JumpData};
