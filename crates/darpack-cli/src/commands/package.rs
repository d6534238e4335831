//! Package command - build a deployment archive from an OpenShift export

use clap::Args;
use console::style;
use darpack_core::{Packager, PackagerConfig, VersionPolicy};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::error::IntoCliResult;
use crate::util::format_size;

#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    /// Application name written into the manifest [default: `applicationName` from --config]
    pub application: Option<String>,

    /// List or Template document, YAML or JSON [default: `source` from --config]
    pub source: Option<PathBuf>,

    /// Directory receiving the manifest and resource files
    #[arg(short = 'w', long)]
    pub work_dir: Option<PathBuf>,

    /// Output archive
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Package resources whose name does not contain the application name
    #[arg(long)]
    pub no_filter: bool,

    /// Also package ImageStream resources
    #[arg(long)]
    pub image_streams: bool,

    /// Also write deployit-manifest.xml.bak
    #[arg(long)]
    pub backup: bool,

    /// Use a placeholder token as manifest version instead of a timestamp
    #[arg(long, value_name = "TOKEN", num_args = 0..=1, default_missing_value = "{{APP_VERSION}}")]
    pub version_placeholder: Option<String>,

    /// Registry host for rewritten DeploymentConfig images
    #[arg(long)]
    pub registry: Option<String>,

    /// Registry namespace for rewritten DeploymentConfig images
    #[arg(long)]
    pub namespace: Option<String>,

    /// Configuration file (YAML); flags override its values
    #[arg(short, long, env = "DARPACK_CONFIG")]
    pub config: Option<PathBuf>,
}

impl PackageArgs {
    /// Resolve the effective configuration
    pub fn to_config(&self) -> darpack_core::Result<PackagerConfig> {
        let mut config = match &self.config {
            Some(path) => PackagerConfig::load_from(path)?,
            None => PackagerConfig::default(),
        };

        if let Some(application) = &self.application {
            config.application_name = application.clone();
        }
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(dir) = &self.work_dir {
            config.work_directory = dir.clone();
        }
        if let Some(output) = &self.output {
            config.archive_path = output.clone();
        }
        if self.no_filter {
            config.selection.filter_by_application = false;
        }
        if self.image_streams {
            config.selection = config.selection.with_image_streams();
        }
        if self.backup {
            config.write_backup = true;
        }
        if let Some(token) = &self.version_placeholder {
            config.version = VersionPolicy::Placeholder {
                token: token.clone(),
            };
        }
        if let Some(registry) = &self.registry {
            config.selection.registry_host = registry.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.selection.app_namespace = namespace.clone();
        }

        Ok(config)
    }
}

pub fn run(args: &PackageArgs) -> Result<()> {
    let config = args.to_config().into_cli_result()?;
    let packager = Packager::new(config).into_cli_result()?;

    println!(
        "{} {} from {}",
        style("Packaging").cyan().bold(),
        packager.config().application_name,
        packager.config().source.display()
    );

    let report = packager.run().into_cli_result()?;

    if let Some(error) = &report.parse_error {
        println!("  {} {}", style("Warning").yellow().bold(), error);
    }

    let metadata = std::fs::metadata(&report.archive_path).into_diagnostic()?;
    println!("  {} {}", style("Created").green().bold(), report.archive_path.display());
    println!("  {} {}", style("Size").dim(), format_size(metadata.len()));
    println!("  {} {}", style("Version").dim(), report.version);

    println!();
    println!("{}:", style("Deployables").bold());
    if report.records.is_empty() {
        println!("  {}", style("(none)").dim());
    }
    for record in &report.records {
        println!("  {:40} {}", record.name, style(&record.file).dim());
    }

    println!();
    println!("{}: {}", style("Manifest").bold(), report.manifest_path.display());
    if let Some(backup) = &report.backup_path {
        println!("{}: {}", style("Backup").bold(), backup.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: PackageArgs,
    }

    fn parse(args: &[&str]) -> PackageArgs {
        TestCli::parse_from(std::iter::once("darpack").chain(args.iter().copied())).args
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["coolstore", "in.yaml"]).to_config().unwrap();
        assert_eq!(config.application_name, "coolstore");
        assert_eq!(config.source, PathBuf::from("in.yaml"));
        assert_eq!(config.work_directory, PathBuf::from("./work"));
        assert_eq!(config.archive_path, PathBuf::from("package.dar"));
        assert!(config.selection.filter_by_application);
        assert!(!config.selection.is_managed("ImageStream"));
        assert!(!config.write_backup);
        assert_eq!(config.version, VersionPolicy::Timestamp);
    }

    #[test]
    fn test_flag_overrides() {
        let config = parse(&[
            "coolstore",
            "in.yaml",
            "--work-dir",
            "out",
            "--output",
            "out/app.dar",
            "--no-filter",
            "--image-streams",
            "--backup",
            "--registry",
            "registry.example.com",
            "--namespace",
            "shop",
        ])
        .to_config()
        .unwrap();

        assert_eq!(config.work_directory, PathBuf::from("out"));
        assert_eq!(config.archive_path, PathBuf::from("out/app.dar"));
        assert!(!config.selection.filter_by_application);
        assert!(config.selection.is_managed("ImageStream"));
        assert!(config.write_backup);
        assert_eq!(config.selection.registry_host, "registry.example.com");
        assert_eq!(config.selection.app_namespace, "shop");
    }

    #[test]
    fn test_config_file_supplies_application_and_source() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("darpack.yaml");
        std::fs::write(&path, "applicationName: coolstore\nsource: export.yaml\n").unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = parse(&["--config", &path]).to_config().unwrap();
        assert_eq!(config.application_name, "coolstore");
        assert_eq!(config.source, PathBuf::from("export.yaml"));
        assert!(config.validate().is_ok());

        let config = parse(&["shop", "other.yaml", "--config", &path]).to_config().unwrap();
        assert_eq!(config.application_name, "shop");
        assert_eq!(config.source, PathBuf::from("other.yaml"));
    }

    #[test]
    fn test_missing_application_fails_validation() {
        let config = parse(&[]).to_config().unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_version_placeholder_flag() {
        let config = parse(&["app", "in.yaml", "--version-placeholder"]).to_config().unwrap();
        assert_eq!(config.version, VersionPolicy::placeholder());

        let config = parse(&["app", "in.yaml", "--version-placeholder", "@VERSION@"])
            .to_config()
            .unwrap();
        assert_eq!(
            config.version,
            VersionPolicy::Placeholder {
                token: "@VERSION@".to_string()
            }
        );
    }
}
