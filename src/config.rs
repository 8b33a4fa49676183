//! Build configuration for terrain chunk synthesis.
//!
//! A `Settings` value is the complete input surface of one chunk build,
//! shared read-only across builds. Loadable from JSON for tooling.

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::core::Error;
use crate::heightmap::source::PostProcess;

/// Parameters for one fractal noise layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoiseLayer {
    /// Offset mixed into the world seed so layers decorrelate.
    pub seed_offset: u32,
    /// FBM octaves (detail levels).
    pub octaves: u32,
    /// FBM persistence (0.5 typical).
    pub persistence: f32,
    /// FBM lacunarity (2.0 typical).
    pub lacunarity: f32,
    /// Horizontal frequency multiplier on normalized chunk coordinates.
    pub frequency: f32,
    /// Contribution weight in the composed field.
    pub weight: f32,
    /// Scalar transforms applied to this layer's weighted samples, in order.
    #[serde(default)]
    pub post: Vec<PostProcess>,
}

impl NoiseLayer {
    /// A flat featureless layer, useful as a starting point in tests.
    pub fn simple(seed_offset: u32, frequency: f32, weight: f32) -> Self {
        Self {
            seed_offset,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            frequency,
            weight,
            post: Vec::new(),
        }
    }
}

/// Configuration for the full chunk build pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Height/normal/moisture grid resolution per side.
    pub resolution: usize,
    /// Texture-weight grid resolution per side.
    pub splat_resolution: usize,
    /// World-space side length of one chunk.
    pub chunk_size: f32,
    /// World-space height scale; grid heights in [0,1] map to [0,depth].
    pub depth: f32,
    /// Seed shared by every chunk of the world.
    pub world_seed: u32,

    /// Weighted noise layers composed into the height field.
    pub height_layers: Vec<NoiseLayer>,
    /// Transforms applied to the composed height after summation.
    #[serde(default)]
    pub height_post: Vec<PostProcess>,
    /// Noise layer sampled for the moisture field.
    pub moisture_layer: NoiseLayer,

    /// Maximum walkable surface slope in degrees.
    pub max_slope_deg: f32,

    /// A* base cost of a cardinal step.
    pub cardinal_cost: f32,
    /// A* base cost of a diagonal step.
    pub diagonal_cost: f32,
    /// A* cost weight on the height difference between adjacent cells.
    pub slope_cost_weight: f32,
    /// Multiplier (< 1) on steps into cells already carrying a street.
    pub road_discount: f32,
    /// Scale on the octile heuristic; 1.0 is admissible.
    pub heuristic_weight: f32,
    /// Route seed points generated per chunk boundary.
    pub edge_seed_points: usize,

    /// World-space half width of a carved street.
    pub street_radius: f32,

    /// Gravitational acceleration for ballistic solves.
    pub gravity: f32,
    /// Lowest accepted launch speed.
    pub min_jump_speed: f32,
    /// Highest accepted launch speed.
    pub max_jump_speed: f32,
    /// Outward offset of a takeoff footprint beyond the street edge.
    pub jump_offset_lateral: f32,
    /// Height added to the takeoff point before solving the launch.
    pub jump_offset_vertical: f32,
    /// Waypoint step between jump anchor candidates.
    pub jump_stride: usize,
    /// Closest landing considered for a jump.
    pub jump_min_dist: f32,
    /// Furthest landing probed by the takeoff raycast.
    pub jump_max_dist: f32,
    /// Perpendicular tolerance of the takeoff raycast.
    pub jump_ray_tolerance: f32,
    /// Anchors with a turn angle strictly inside (min, max) are skipped.
    pub turn_angle_min_deg: f32,
    pub turn_angle_max_deg: f32,
    /// Landings with an approach angle strictly inside (min, max) are rejected.
    pub approach_angle_min_deg: f32,
    pub approach_angle_max_deg: f32,

    /// Texture layers in the splat volume, including the street layer.
    pub texture_layers: usize,
    /// Bin-space distance below which a texture bin contributes weight.
    pub splat_trigger: f32,
    /// Proximity epsilon subtracted from the trigger band.
    pub splat_mixing: f32,

    /// Normalized height below which the presentation layer places water.
    pub water_level: f32,
    /// Normalized height above which vegetation is suppressed.
    pub vegetation_level: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: 129,
            splat_resolution: 129,
            chunk_size: 256.0,
            depth: 64.0,
            world_seed: 12345,
            height_layers: vec![
                NoiseLayer {
                    seed_offset: 0,
                    octaves: 5,
                    persistence: 0.5,
                    lacunarity: 2.0,
                    frequency: 1.0,
                    weight: 0.7,
                    post: vec![
                        PostProcess::Exponent { exponent: 2.0 },
                        PostProcess::Rescale { min: 0.0, max: 0.64 },
                        PostProcess::Terrace { step: 0.15, strength: 0.15 },
                    ],
                },
                NoiseLayer {
                    seed_offset: 7,
                    octaves: 5,
                    persistence: 0.5,
                    lacunarity: 2.0,
                    frequency: 4.0,
                    weight: 0.3,
                    post: vec![PostProcess::Rescale { min: 0.2, max: 0.9 }],
                },
            ],
            height_post: Vec::new(),
            moisture_layer: NoiseLayer::simple(31, 2.0, 1.0),
            max_slope_deg: 25.0,
            cardinal_cost: 10.0,
            diagonal_cost: 14.0,
            slope_cost_weight: 5000.0,
            road_discount: 0.5,
            heuristic_weight: 2.0,
            edge_seed_points: 1,
            street_radius: 3.0,
            gravity: 9.81,
            min_jump_speed: 2.0,
            max_jump_speed: 20.0,
            jump_offset_lateral: 1.0,
            jump_offset_vertical: 0.5,
            jump_stride: 4,
            jump_min_dist: 4.0,
            jump_max_dist: 30.0,
            jump_ray_tolerance: 0.1,
            turn_angle_min_deg: 30.0,
            turn_angle_max_deg: 150.0,
            approach_angle_min_deg: 45.0,
            approach_angle_max_deg: 135.0,
            texture_layers: 9,
            splat_trigger: 0.9,
            splat_mixing: 1e-2,
            water_level: 0.3,
            vegetation_level: 0.8,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the structural invariants a build relies on.
    ///
    /// Violations are programming/configuration errors and fail the build
    /// immediately rather than producing partial output.
    pub fn validate(&self) -> Result<()> {
        fn fail(msg: impl Into<String>) -> Result<()> {
            Err(Error::InvalidSettings(msg.into()))
        }

        if self.resolution < 2 || self.splat_resolution < 2 {
            return fail("grid resolutions must be at least 2");
        }
        if self.chunk_size <= 0.0 || self.depth <= 0.0 {
            return fail("chunk_size and depth must be positive");
        }
        if self.height_layers.is_empty() {
            return fail("at least one height layer is required");
        }
        if !(0.0..90.0).contains(&self.max_slope_deg) {
            return fail("max_slope_deg must lie in [0, 90)");
        }
        if self.cardinal_cost <= 0.0 || self.diagonal_cost <= 0.0 {
            return fail("step costs must be positive");
        }
        if !(0.0..=1.0).contains(&self.road_discount) {
            return fail("road_discount must lie in [0, 1]");
        }
        if self.heuristic_weight <= 0.0 {
            return fail("heuristic_weight must be positive");
        }
        if self.edge_seed_points == 0 {
            return fail("edge_seed_points must be at least 1");
        }
        if self.street_radius <= 0.0 {
            return fail("street_radius must be positive");
        }
        if self.gravity <= 0.0 {
            return fail("gravity must be positive");
        }
        if self.min_jump_speed > self.max_jump_speed {
            return fail("min_jump_speed exceeds max_jump_speed");
        }
        if self.jump_stride == 0 {
            return fail("jump_stride must be at least 1");
        }
        if self.jump_min_dist >= self.jump_max_dist {
            return fail("jump_min_dist must be below jump_max_dist");
        }
        if self.turn_angle_min_deg >= self.turn_angle_max_deg {
            return fail("turn angle band is empty");
        }
        if self.approach_angle_min_deg >= self.approach_angle_max_deg {
            return fail("approach angle band is empty");
        }
        if self.texture_layers < 2 {
            return fail("texture_layers must include at least one terrain layer besides the street layer");
        }
        if self.splat_trigger <= 0.0 {
            return fail("splat_trigger must be positive");
        }
        if !(0.0..=1.0).contains(&self.water_level) || !(0.0..=1.0).contains(&self.vegetation_level) {
            return fail("water_level and vegetation_level must lie in [0, 1]");
        }
        Ok(())
    }

    /// World-space side length of one grid cell.
    pub fn cell_size(&self) -> f32 {
        self.chunk_size / self.resolution as f32
    }

    /// Cosine threshold on the surface normal's up component.
    pub fn walkable_min_up(&self) -> f32 {
        self.max_slope_deg.to_radians().cos()
    }
}
