pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use config::{CodeConfig, KeypadConfig, LockConfig, ScanPolicy, TimingConfig};
pub use error::{Error, Rejection, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
