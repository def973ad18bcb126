use crate::config::error::{ConfigError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix (`DOCGOV_DOCS_ROOT`, `DOCGOV_LAYOUT__ROADS_DIR`, ...)
pub const ENV_PREFIX: &str = "DOCGOV";

/// Root governance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Directory holding the governance records
    #[serde(default = "default_docs_root")]
    pub docs_root: PathBuf,

    /// Per-kind directory names under `docs_root`
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Change Entry publication rules
    #[serde(default)]
    pub changes: ChangesConfig,

    /// Feature tag validation
    #[serde(default)]
    pub bdd: BddConfig,

    /// Previous-status snapshot for transition checks
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Validate the merged configuration against the embedded JSON schema
    #[serde(default = "default_true")]
    pub schema_validation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_roads_dir")]
    pub roads_dir: PathBuf,
    #[serde(default = "default_adr_dir")]
    pub adr_dir: PathBuf,
    #[serde(default = "default_changes_dir")]
    pub changes_dir: PathBuf,
    #[serde(default = "default_nfr_dir")]
    pub nfr_dir: PathBuf,
    #[serde(default = "default_capabilities_dir")]
    pub capabilities_dir: PathBuf,
    #[serde(default = "default_features_dir")]
    pub features_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesConfig {
    /// Roles that must appear among the signatures of a published entry
    #[serde(default = "default_required_signature_roles")]
    pub required_signature_roles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BddConfig {
    /// Capability ids accepted in addition to `capabilities/CAP-*.md`
    #[serde(default)]
    pub known_capabilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Snapshot file; relative paths resolve against the working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_docs_root() -> PathBuf {
    PathBuf::from(crate::DEFAULT_DOCS_ROOT)
}
fn default_true() -> bool {
    true
}
fn default_roads_dir() -> PathBuf {
    PathBuf::from("roads")
}
fn default_adr_dir() -> PathBuf {
    PathBuf::from("adr")
}
fn default_changes_dir() -> PathBuf {
    PathBuf::from("changes")
}
fn default_nfr_dir() -> PathBuf {
    PathBuf::from("nfr")
}
fn default_capabilities_dir() -> PathBuf {
    PathBuf::from("capabilities")
}
fn default_features_dir() -> PathBuf {
    PathBuf::from("features")
}
fn default_required_signature_roles() -> Vec<String> {
    vec!["architect".to_string(), "qa".to_string()]
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            roads_dir: default_roads_dir(),
            adr_dir: default_adr_dir(),
            changes_dir: default_changes_dir(),
            nfr_dir: default_nfr_dir(),
            capabilities_dir: default_capabilities_dir(),
            features_dir: default_features_dir(),
        }
    }
}

impl Default for ChangesConfig {
    fn default() -> Self {
        Self {
            required_signature_roles: default_required_signature_roles(),
        }
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            docs_root: default_docs_root(),
            layout: LayoutConfig::default(),
            changes: ChangesConfig::default(),
            bdd: BddConfig::default(),
            snapshot: SnapshotConfig::default(),
            schema_validation: default_true(),
        }
    }
}

/// Configuration loader with layered merging support
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration with layered merging:
    /// 1. Start with defaults
    /// 2. Merge config file if provided
    /// 3. Override with environment variables (DOCGOV_ prefix)
    pub fn load(&self) -> Result<GovernanceConfig> {
        let mut builder = Config::builder();

        // Layer 1: Defaults, serialized to JSON
        let defaults_json = serde_json::to_string(&GovernanceConfig::default())?;
        builder = builder.add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // Layer 2: Config file
        if let Some(ref path) = self.config_path {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_ref()));
            } else {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
        }

        // Layer 3: Environment, e.g. DOCGOV_CHANGES__REQUIRED_SIGNATURE_ROLES=architect,qa
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("changes.required_signature_roles")
                .with_list_parse_key("bdd.known_capabilities"),
        );

        let config = builder.build()?;
        let governance_config: GovernanceConfig = config.try_deserialize()?;

        if governance_config.schema_validation {
            let validator = crate::config::validator::SchemaValidator::new()?;
            validator.validate(&governance_config)?;
        }

        tracing::debug!(
            config_file = ?self.config_path,
            docs_root = %governance_config.docs_root.display(),
            "governance config loaded"
        );
        Ok(governance_config)
    }

    /// Locate the default config file:
    /// 1. Current directory: ./governance.toml
    /// 2. Platform config dir: <config_dir>/docgov/config.toml
    pub fn find_config_file() -> Option<PathBuf> {
        let cwd_config = PathBuf::from("./governance.toml");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("docgov").join("config.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<GovernanceConfig> {
        let loader = if let Some(config_path) = Self::find_config_file() {
            ConfigLoader::new().with_file(config_path)
        } else {
            ConfigLoader::new()
        };

        loader.load()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::env;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("governance.toml");
        std::fs::write(&config_path, content).expect("Failed to write temp file");
        (temp_dir, config_path)
    }

    #[test]
    fn test_default_config() {
        let config = GovernanceConfig::default();
        assert_eq!(config.docs_root, PathBuf::from("docs"));
        assert_eq!(config.layout.roads_dir, PathBuf::from("roads"));
        assert_eq!(config.layout.features_dir, PathBuf::from("features"));
        assert_eq!(
            config.changes.required_signature_roles,
            vec!["architect".to_string(), "qa".to_string()]
        );
        assert!(config.bdd.known_capabilities.is_empty());
        assert_eq!(config.snapshot.path, None);
        assert!(config.schema_validation);
    }

    #[test]
    #[serial]
    fn test_load_with_defaults_only() {
        let config = ConfigLoader::new().load().expect("Failed to load default config");
        assert_eq!(config, GovernanceConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_with_toml_file() {
        let (_dir, config_path) = write_config(
            r#"
docs_root = "handbook"

[layout]
adr_dir = "decisions"

[changes]
required_signature_roles = ["architect", "qa", "security"]

[bdd]
known_capabilities = ["CAP-001", "CAP-002"]

[snapshot]
path = "handbook/.status.json"
"#,
        );

        let config = ConfigLoader::new()
            .with_file(&config_path)
            .load()
            .expect("Failed to load config");

        assert_eq!(config.docs_root, PathBuf::from("handbook"));
        assert_eq!(config.layout.adr_dir, PathBuf::from("decisions"));
        assert_eq!(config.layout.roads_dir, PathBuf::from("roads"));
        assert_eq!(config.changes.required_signature_roles.len(), 3);
        assert_eq!(config.bdd.known_capabilities, vec!["CAP-001", "CAP-002"]);
        assert_eq!(
            config.snapshot.path,
            Some(PathBuf::from("handbook/.status.json"))
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let (_dir, config_path) = write_config("docs_root = \"handbook\"\n");

        unsafe {
            env::set_var("DOCGOV_DOCS_ROOT", "site/docs");
            env::set_var("DOCGOV_CHANGES__REQUIRED_SIGNATURE_ROLES", "architect,security");
        }

        let result = ConfigLoader::new().with_file(&config_path).load();

        unsafe {
            env::remove_var("DOCGOV_DOCS_ROOT");
            env::remove_var("DOCGOV_CHANGES__REQUIRED_SIGNATURE_ROLES");
        }

        let config = result.expect("Failed to load config");
        assert_eq!(config.docs_root, PathBuf::from("site/docs"));
        assert_eq!(
            config.changes.required_signature_roles,
            vec!["architect".to_string(), "security".to_string()]
        );
    }

    #[test]
    fn test_missing_file_error() {
        let result = ConfigLoader::new()
            .with_file("/nonexistent/governance.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    #[serial]
    fn test_invalid_capability_rejected_by_schema() {
        let (_dir, config_path) = write_config("[bdd]\nknown_capabilities = [\"capability-1\"]\n");

        let result = ConfigLoader::new().with_file(&config_path).load();
        let err = result.expect_err("schema should reject the capability id");
        assert!(matches!(err, ConfigError::SchemaValidationError(_)));
        assert!(err.to_string().contains("capability-1"), "{err}");
    }

    #[test]
    #[serial]
    fn test_schema_validation_can_be_disabled() {
        let (_dir, config_path) = write_config(
            "schema_validation = false\n[bdd]\nknown_capabilities = [\"capability-1\"]\n",
        );

        let config = ConfigLoader::new()
            .with_file(&config_path)
            .load()
            .expect("validation disabled");
        assert!(!config.schema_validation);
        assert_eq!(config.bdd.known_capabilities, vec!["capability-1"]);
    }
}
