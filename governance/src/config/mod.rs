//! Configuration for governance runs
//!
//! Layered the 12-factor way:
//! 1. Defaults (from code)
//! 2. Config file (`governance.toml`)
//! 3. Environment variables (`DOCGOV_*` prefix, `__` for nesting)
//!
//! Command-line flags are applied on top by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use docgov_governance::config::ConfigLoader;
//!
//! let config = ConfigLoader::load_default().expect("Failed to load config");
//!
//! let config = ConfigLoader::new()
//!     .with_file("./governance.toml")
//!     .load()
//!     .expect("Failed to load config");
//! ```

pub mod error;
pub mod loader;
pub mod validator;

pub use error::{ConfigError, Result};
pub use loader::{
    BddConfig, ChangesConfig, ConfigLoader, GovernanceConfig, LayoutConfig, SnapshotConfig,
};
pub use validator::SchemaValidator;
