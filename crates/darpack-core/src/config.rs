//! Packager configuration
//!
//! Every knob the pipeline reads lives here rather than in constants, so a
//! run can be described entirely by a [`PackagerConfig`]. The structure can
//! be loaded from a YAML file (camelCase keys, all fields optional) and then
//! overridden from the command line.
//!
//! ```yaml
//! workDirectory: ./work
//! writeBackup: true
//! version:
//!   mode: placeholder
//!   token: "{{APP_VERSION}}"
//! selection:
//!   filterByApplication: false
//!   registryHost: registry.example.com:5000
//! ```

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::manifest::{MANIFEST_BACKUP_FILE, MANIFEST_FILE, timestamp_version};

/// Default directory receiving the manifest and resource files
pub const DEFAULT_WORK_DIRECTORY: &str = "./work";

/// Default archive location, relative to the process working directory
pub const DEFAULT_ARCHIVE_PATH: &str = "package.dar";

/// Default placeholder substituted by the release system at deploy time
pub const DEFAULT_VERSION_TOKEN: &str = "{{APP_VERSION}}";

/// Resource kinds packaged out of the box
pub const DEFAULT_MANAGED_KINDS: &[&str] =
    &["Route", "DeploymentConfig", "Service", "PersistentVolumeClaim"];

/// Kind added by [`SelectionPolicy::with_image_streams`]
pub const IMAGE_STREAM_KIND: &str = "ImageStream";

/// Rules deciding which resources become deployables and how they are rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionPolicy {
    /// Allow-list of resource kinds, compared case-sensitively
    pub managed_kinds: Vec<String>,

    /// Only accept resources whose name contains the application name
    pub filter_by_application: bool,

    /// Registry host prepended to rewritten container images
    pub registry_host: String,

    /// Registry namespace (project) holding the application images
    pub app_namespace: String,

    /// Tag placed on rewritten container images
    pub version_token: String,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            managed_kinds: DEFAULT_MANAGED_KINDS.iter().map(|k| k.to_string()).collect(),
            filter_by_application: true,
            registry_host: "docker-registry.default.svc:5000".to_string(),
            app_namespace: "openshift".to_string(),
            version_token: DEFAULT_VERSION_TOKEN.to_string(),
        }
    }
}

impl SelectionPolicy {
    /// Also package `ImageStream` resources
    #[must_use]
    pub fn with_image_streams(mut self) -> Self {
        if !self.is_managed(IMAGE_STREAM_KIND) {
            self.managed_kinds.push(IMAGE_STREAM_KIND.to_string());
        }
        self
    }

    /// Whether `kind` is on the allow-list
    pub fn is_managed(&self, kind: &str) -> bool {
        self.managed_kinds.iter().any(|k| k == kind)
    }
}

/// How the manifest `version` attribute is produced
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum VersionPolicy {
    /// Wall-clock time of the run, `YYYY-MM-DD-HH-MM-SS`
    #[default]
    Timestamp,
    /// Literal token replaced later by the release system
    Placeholder {
        #[serde(default = "default_version_token")]
        token: String,
    },
}

fn default_version_token() -> String {
    DEFAULT_VERSION_TOKEN.to_string()
}

impl VersionPolicy {
    /// Placeholder mode with the default token
    pub fn placeholder() -> Self {
        Self::Placeholder {
            token: default_version_token(),
        }
    }

    /// Produce the version string for a run started at `now`
    pub fn resolve(&self, now: DateTime<Local>) -> String {
        match self {
            VersionPolicy::Timestamp => timestamp_version(now),
            VersionPolicy::Placeholder { token } => token.clone(),
        }
    }
}

/// Complete description of one packaging run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackagerConfig {
    /// Deployment application identifier written into the manifest
    pub application_name: String,

    /// Input List or Template document
    pub source: PathBuf,

    /// Directory receiving the manifest and one file per resource
    pub work_directory: PathBuf,

    /// Output archive, truncated on every run
    pub archive_path: PathBuf,

    /// Also write `deployit-manifest.xml.bak`
    pub write_backup: bool,

    /// Manifest version policy
    pub version: VersionPolicy,

    /// Resource selection rules
    pub selection: SelectionPolicy,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            source: PathBuf::new(),
            work_directory: PathBuf::from(DEFAULT_WORK_DIRECTORY),
            archive_path: PathBuf::from(DEFAULT_ARCHIVE_PATH),
            write_backup: false,
            version: VersionPolicy::default(),
            selection: SelectionPolicy::default(),
        }
    }
}

impl PackagerConfig {
    /// Default configuration for an application and source document
    pub fn new(application_name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            application_name: application_name.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| CoreError::InvalidConfig {
            message: format!("{}: {}", path.display(), e),
        })?;
        Ok(config)
    }

    /// Check the settings a run cannot do without
    pub fn validate(&self) -> Result<()> {
        if self.application_name.trim().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "application name must not be empty".to_string(),
            });
        }
        if self.source.as_os_str().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "source document path must not be empty".to_string(),
            });
        }
        if self.selection.managed_kinds.is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "at least one managed kind is required".to_string(),
            });
        }
        Ok(())
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.work_directory.join(MANIFEST_FILE)
    }

    pub fn manifest_backup_path(&self) -> PathBuf {
        self.work_directory.join(MANIFEST_BACKUP_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_default_policy() {
        let policy = SelectionPolicy::default();
        assert!(policy.is_managed("Route"));
        assert!(policy.is_managed("DeploymentConfig"));
        assert!(policy.is_managed("Service"));
        assert!(policy.is_managed("PersistentVolumeClaim"));
        assert!(!policy.is_managed("ImageStream"));
        assert!(!policy.is_managed("service"));
        assert!(policy.filter_by_application);
    }

    #[test]
    fn test_with_image_streams_is_idempotent() {
        let policy = SelectionPolicy::default().with_image_streams().with_image_streams();
        assert!(policy.is_managed("ImageStream"));
        assert_eq!(
            policy.managed_kinds.iter().filter(|k| *k == "ImageStream").count(),
            1
        );
    }

    #[test]
    fn test_version_policy_resolve() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(VersionPolicy::Timestamp.resolve(now), "2024-03-09-07-05-01");
        assert_eq!(VersionPolicy::placeholder().resolve(now), "{{APP_VERSION}}");
    }

    #[test]
    fn test_load_partial_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("darpack.yaml");
        std::fs::write(
            &path,
            r#"applicationName: coolstore
writeBackup: true
version:
  mode: placeholder
selection:
  filterByApplication: false
  registryHost: registry.example.com
"#,
        )
        .unwrap();

        let config = PackagerConfig::load_from(&path).unwrap();
        assert_eq!(config.application_name, "coolstore");
        assert!(config.write_backup);
        assert_eq!(config.version, VersionPolicy::placeholder());
        assert!(!config.selection.filter_by_application);
        assert_eq!(config.selection.registry_host, "registry.example.com");
        // untouched fields keep their defaults
        assert_eq!(config.selection.app_namespace, "openshift");
        assert_eq!(config.work_directory, PathBuf::from("./work"));
        assert_eq!(config.selection.managed_kinds.len(), 4);
    }

    #[test]
    fn test_load_invalid_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("darpack.yaml");
        std::fs::write(&path, "writeBackup: [not, a, bool]\n").unwrap();

        let err = PackagerConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate() {
        assert!(PackagerConfig::new("coolstore", "in.yaml").validate().is_ok());
        assert!(PackagerConfig::new("  ", "in.yaml").validate().is_err());
        assert!(PackagerConfig::new("coolstore", "").validate().is_err());

        let mut config = PackagerConfig::new("coolstore", "in.yaml");
        config.selection.managed_kinds.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_manifest_paths() {
        let mut config = PackagerConfig::new("coolstore", "in.yaml");
        config.work_directory = PathBuf::from("out");
        assert_eq!(config.manifest_path(), PathBuf::from("out/deployit-manifest.xml"));
        assert_eq!(
            config.manifest_backup_path(),
            PathBuf::from("out/deployit-manifest.xml.bak")
        );
    }
}
