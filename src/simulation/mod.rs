//! Simulation driver - world ownership and the per-tick update

pub mod tick;
pub mod world;

pub use tick::run_engagement_tick;
pub use world::EngagementWorld;
