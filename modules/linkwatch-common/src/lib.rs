pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, WatchConfig};
pub use error::LinkwatchError;
pub use types::*;
