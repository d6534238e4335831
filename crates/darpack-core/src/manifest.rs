//! Deployment package manifest
//!
//! `deployit-manifest.xml` indexes every resource file in the package. Each
//! deployable becomes one self-closing element whose tag is the deployable
//! type and whose `file` attribute is the entry name inside the archive.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Manifest file name inside the work directory and the archive
pub const MANIFEST_FILE: &str = "deployit-manifest.xml";

/// Optional backup copy of the manifest
pub const MANIFEST_BACKUP_FILE: &str = "deployit-manifest.xml.bak";

/// Deployable type for OpenShift resource files
pub const RESOURCES_FILE_TYPE: &str = "openshift.ResourcesFile";

/// Format used for timestamp versions
const VERSION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// One packaged resource file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployableRecord {
    /// Deployable type, always [`RESOURCES_FILE_TYPE`]
    pub r#type: String,
    /// Lowercase `{kind}-{name}`
    pub name: String,
    /// Entry name inside the archive (`/`-separated, relative)
    pub file: String,
    /// Location on disk
    pub path: PathBuf,
}

impl DeployableRecord {
    pub fn resources_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            r#type: RESOURCES_FILE_TYPE.to_string(),
            name: name.into(),
            file: crate::archive::entry_name(&path),
            path,
        }
    }
}

/// The manifest of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub version: String,
    pub application: String,
    pub deployables: Vec<DeployableRecord>,
}

/// Paths written by [`Manifest::write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenManifest {
    pub path: PathBuf,
    pub backup: Option<PathBuf>,
}

impl Manifest {
    pub fn compose(
        application: impl Into<String>,
        version: impl Into<String>,
        deployables: Vec<DeployableRecord>,
    ) -> Self {
        Self {
            version: version.into(),
            application: application.into(),
            deployables,
        }
    }

    /// Write the manifest into `work_directory`, plus the `.bak` copy if asked
    pub fn write(&self, work_directory: &Path, backup: bool) -> Result<WrittenManifest> {
        std::fs::create_dir_all(work_directory)?;
        let content = self.to_string();

        let path = work_directory.join(MANIFEST_FILE);
        std::fs::write(&path, &content)?;

        let backup = if backup {
            let backup_path = work_directory.join(MANIFEST_BACKUP_FILE);
            std::fs::write(&backup_path, &content)?;
            Some(backup_path)
        } else {
            None
        };

        Ok(WrittenManifest { path, backup })
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            f,
            r#"<udm.DeploymentPackage version="{}" application="{}">"#,
            escape_attr(&self.version),
            escape_attr(&self.application)
        )?;
        writeln!(f, "    <deployables>")?;
        for deployable in &self.deployables {
            writeln!(
                f,
                r#"        <{} name="{}" file="{}"/>"#,
                deployable.r#type,
                escape_attr(&deployable.name),
                escape_attr(&deployable.file)
            )?;
        }
        writeln!(f, "    </deployables>")?;
        writeln!(f, "</udm.DeploymentPackage>")
    }
}

/// Version string for a run started at `now`
pub fn timestamp_version(now: DateTime<Local>) -> String {
    now.format(VERSION_TIMESTAMP_FORMAT).to_string()
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn sample_manifest() -> Manifest {
        Manifest::compose(
            "coolstore",
            "2024-03-09-07-05-01",
            vec![
                DeployableRecord::resources_file(
                    "service-coolstore-catalog",
                    "work/service-coolstore-catalog.yaml",
                ),
                DeployableRecord::resources_file(
                    "deploymentconfig-coolstore-catalog",
                    "./work/deploymentconfig-coolstore-catalog.yaml.bak",
                ),
            ],
        )
    }

    #[test]
    fn test_resources_file_record() {
        let record = DeployableRecord::resources_file("route-web", "./work/route-web.yaml");
        assert_eq!(record.r#type, "openshift.ResourcesFile");
        assert_eq!(record.file, "work/route-web.yaml");
        assert_eq!(record.path, PathBuf::from("./work/route-web.yaml"));
    }

    #[test]
    fn test_render_manifest() {
        insta::assert_snapshot!("manifest_with_deployables", sample_manifest().to_string());
    }

    #[test]
    fn test_render_preserves_order_and_count() {
        let rendered = sample_manifest().to_string();
        let lines: Vec<_> = rendered
            .lines()
            .filter(|l| l.trim_start().starts_with("<openshift.ResourcesFile"))
            .collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#"name="service-coolstore-catalog""#));
        assert!(lines[0].contains(r#"file="work/service-coolstore-catalog.yaml""#));
        assert!(lines[1].contains(r#"name="deploymentconfig-coolstore-catalog""#));
        assert!(lines[1].contains(r#"file="work/deploymentconfig-coolstore-catalog.yaml.bak""#));
    }

    #[test]
    fn test_render_empty_manifest() {
        let rendered = Manifest::compose("coolstore", "{{APP_VERSION}}", Vec::new()).to_string();
        assert_eq!(
            rendered,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <udm.DeploymentPackage version=\"{{APP_VERSION}}\" application=\"coolstore\">\n    \
             <deployables>\n    \
             </deployables>\n\
             </udm.DeploymentPackage>\n"
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let rendered = Manifest::compose("a&b \"quoted\" <x>", "1", Vec::new()).to_string();
        assert!(rendered.contains(r#"application="a&amp;b &quot;quoted&quot; &lt;x&gt;""#));
    }

    #[test]
    fn test_timestamp_version() {
        let now = Local.with_ymd_and_hms(2023, 12, 31, 23, 59, 9).unwrap();
        assert_eq!(timestamp_version(now), "2023-12-31-23-59-09");
    }

    #[test]
    fn test_write_with_and_without_backup() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        let manifest = sample_manifest();

        let written = manifest.write(&work, false).unwrap();
        assert_eq!(written.path, work.join(MANIFEST_FILE));
        assert!(written.backup.is_none());
        assert!(!work.join(MANIFEST_BACKUP_FILE).exists());

        let written = manifest.write(&work, true).unwrap();
        let backup = written.backup.unwrap();
        assert_eq!(
            std::fs::read(&written.path).unwrap(),
            std::fs::read(&backup).unwrap()
        );
        assert_eq!(
            std::fs::read_to_string(&written.path).unwrap(),
            manifest.to_string()
        );
    }
}
