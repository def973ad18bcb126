//! Documentation governance linter
//!
//! Validates the YAML front matter of Markdown governance records (Roadmap
//! Items, ADRs, Change Entries, NFRs), enforces the roadmap lifecycle gates,
//! and checks BDD feature files for capability tags.
//!
//! Validators are pure: each file produces a `ValidationOutcome` that the
//! `runner` folds into a `Report`. The CLI crate owns all terminal output.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod bdd;
pub mod config;
pub mod corpus;
pub mod error;
pub mod export;
pub mod finding;
pub mod frontmatter;
pub mod ids;
pub mod report;
pub mod runner;
pub mod schema;
pub mod snapshot;
pub mod state_machine;

pub use config::{ConfigLoader, GovernanceConfig};
pub use corpus::Corpus;
pub use error::{GovernanceError, Result};
pub use finding::{Severity, ValidationOutcome};
pub use frontmatter::{FrontMatter, Record, extract};
pub use report::Report;
pub use runner::{Pass, Runner};
pub use schema::RecordKind;
pub use state_machine::RoadmapStatus;

/// Governance linter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Docs root used when neither config nor flags name one
pub const DEFAULT_DOCS_ROOT: &str = "docs";
