pub mod config;
pub mod error;
pub mod types;

pub use config::EngagementConfig;
pub use error::{EngagementError, Result};
pub use types::{AgentId, Tick};
