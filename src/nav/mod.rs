//! Walkability, connectivity and route-network construction.

pub mod astar;
pub mod connectivity;
pub mod network;
pub mod path;
pub mod walkable;

pub use astar::{octile_distance, AStarSearch, StepCost};
pub use connectivity::ConnectivityLabels;
pub use network::{build_network, RouteNetwork};
pub use path::NavigationPath;
pub use walkable::{neighbors_8, WalkableCache};
