pub mod config;
pub mod error;
pub mod types;

pub use config::MoodcastConfig;
pub use error::{MoodcastError, Result};
pub use types::*;
