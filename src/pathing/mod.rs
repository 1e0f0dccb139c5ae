pub mod pathfinder;
pub mod router;
