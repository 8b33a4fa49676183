//! Jump-point discovery along the route network.
//!
//! Walks route polylines for turn anchors, probes lateral takeoff offsets
//! against the spatial index, solves the ballistic connection and registers
//! validated jumps back into the index.

use glam::{Vec2, Vec3};

use crate::config::Settings;
use crate::core::types::Result;
use crate::jump::ballistics::{check_physics, solve_launch_speed};
use crate::nav::NavigationPath;
use crate::spatial::{CircleBound, EntryKind, PathHandle, QuadTree};

/// A validated route-to-route jump.
#[derive(Clone, Copy, Debug)]
pub struct JumpData {
    /// Takeoff position on the terrain.
    pub position: Vec3,
    /// Normalized direction from takeoff toward the landing waypoint.
    pub direction: Vec3,
    /// Exact landing point of the solved arc.
    pub landing: Vec3,
    /// Apex of the solved arc; cameras and rays aim here.
    pub ray_target: Vec3,
    /// Launch speed, always within the configured band.
    pub speed: f32,
    /// Airtime to the landing waypoint's horizontal distance.
    pub airtime: f32,
}

fn xz(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Angle in degrees between two non-zero vectors.
fn angle_deg(a: Vec2, b: Vec2) -> f32 {
    a.normalize_or_zero()
        .dot(b.normalize_or_zero())
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}

/// Horizontal turn angle at `node`, measured between the vectors from both
/// neighbors into the node. `None` when either segment is degenerate.
pub fn turn_angle_deg(prev: Vec3, node: Vec3, next: Vec3) -> Option<f32> {
    let incoming = xz(node) - xz(prev);
    let outgoing = xz(node) - xz(next);
    if incoming.length_squared() < 1e-8 || outgoing.length_squared() < 1e-8 {
        return None;
    }
    Some(angle_deg(incoming, outgoing))
}

/// Lateral takeoff offsets at `origin` whose footprint is free of any
/// existing geometry: the forward tangent and its two perpendiculars.
fn ramp_offsets(settings: &Settings, index: &QuadTree, origin: Vec2, dir: Vec2) -> Vec<Vec2> {
    let reach = settings.street_radius + settings.jump_offset_lateral;
    let mut offsets = Vec::with_capacity(3);
    for candidate in [dir, Vec2::new(dir.y, -dir.x), Vec2::new(-dir.y, dir.x)] {
        let footprint = CircleBound::new(origin + reach * candidate, settings.street_radius);
        if !index.collides_circle(footprint, None) {
            offsets.push(candidate);
        }
    }
    offsets
}

/// Scan all paths for jump anchors and validate takeoff candidates.
///
/// Paths shorter than `2 * stride + 2` waypoints are skipped silently.
/// Every validated jump is appended to the result and registered in the
/// index as a jump-typed entry at its takeoff point.
pub fn find_jumps(
    settings: &Settings,
    paths: &[NavigationPath],
    index: &mut QuadTree,
) -> Result<Vec<JumpData>> {
    let stride = settings.jump_stride;
    let mut jumps: Vec<JumpData> = Vec::new();

    for path in paths {
        if path.len() < stride * 2 + 2 {
            continue;
        }
        let mut j = stride + 1;
        while j < path.len() - 2 {
            let prev = path.world_waypoints[j - 1];
            let node = path.world_waypoints[j];
            let next = path.world_waypoints[j + 1];
            let Some(turn) = turn_angle_deg(prev, node, next) else {
                j += stride;
                continue;
            };
            // Moderate turns are skipped; only near-straight runs and
            // near-reversals anchor a jump.
            if turn > settings.turn_angle_min_deg && turn < settings.turn_angle_max_deg {
                j += stride;
                continue;
            }

            let origin = xz(node);
            // Both travel directions through the anchor are takeoff
            // tangent candidates.
            let rel = [
                (origin - xz(prev)).normalize(),
                (origin - xz(next)).normalize(),
            ];
            for d in 0..2 {
                for offset in ramp_offsets(settings, index, origin, rel[d]) {
                    let reach = settings.street_radius + settings.jump_offset_lateral;
                    let takeoff_xz = origin + reach * offset;
                    let blended = (rel[d] + offset).normalize_or_zero();
                    if blended == Vec2::ZERO {
                        continue;
                    }
                    let takeoff = Vec3::new(takeoff_xz.x, node.y, takeoff_xz.y);
                    check_point(
                        settings,
                        paths,
                        index,
                        takeoff,
                        takeoff_xz,
                        blended,
                        &mut jumps,
                    )?;
                }
            }
            j += stride;
        }
    }

    log::debug!("jump finder: {} validated jumps across {} paths", jumps.len(), paths.len());
    Ok(jumps)
}

/// Validate one takeoff candidate; appends and registers the jump when
/// every rejection gate passes.
fn check_point(
    settings: &Settings,
    paths: &[NavigationPath],
    index: &mut QuadTree,
    takeoff: Vec3,
    takeoff_xz: Vec2,
    dir: Vec2,
    jumps: &mut Vec<JumpData>,
) -> Result<bool> {
    let min_dist = settings.jump_min_dist;
    let max_dist = settings.jump_max_dist;

    let Some(hit) = index.raycast(
        takeoff_xz + dir * min_dist,
        dir,
        max_dist - min_dist,
        Some(EntryKind::Street),
        settings.jump_ray_tolerance,
    ) else {
        return Ok(false);
    };

    let col_path = &paths[hit.payload.collection];
    if col_path.len() < 2 {
        return Ok(false);
    }
    let label = hit.payload.label;
    let col_pos = col_path.world_waypoints[label];

    // Landing tangent from the neighboring waypoint, clamped at path ends.
    let next_label = if label == col_path.len() - 1 {
        label - 1
    } else {
        label + 1
    };
    let col_dir = (xz(col_path.world_waypoints[next_label]) - xz(col_pos)).normalize_or_zero();
    if col_dir == Vec2::ZERO {
        return Ok(false);
    }

    if col_pos.distance(takeoff) < min_dist {
        return Ok(false);
    }

    // Perpendicular landings are invalid; accept near-parallel or
    // near-head-on approaches only.
    let approach = angle_deg(dir, col_dir);
    if approach > settings.approach_angle_min_deg && approach < settings.approach_angle_max_deg {
        return Ok(false);
    }

    let launch = takeoff + Vec3::Y * settings.jump_offset_vertical;
    let Some(solution) = solve_launch_speed(launch, col_pos, settings.gravity) else {
        return Ok(false);
    };
    if solution.speed < settings.min_jump_speed || solution.speed > settings.max_jump_speed {
        return Ok(false);
    }

    let check = check_physics(takeoff, col_pos, solution.speed, settings.gravity);
    index.insert(
        takeoff_xz,
        EntryKind::Jump,
        PathHandle {
            collection: hit.payload.collection,
            label: jumps.len(),
        },
    )?;
    jumps.push(JumpData {
        position: takeoff,
        direction: (col_pos - takeoff).normalize_or_zero(),
        landing: check.landing,
        ray_target: check.ray_target,
        speed: solution.speed,
        airtime: solution.airtime,
    });
    Ok(true)
}
