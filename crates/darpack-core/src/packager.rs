//! The packaging pipeline: load, select, compose, package

use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::archive::create_archive;
use crate::config::PackagerConfig;
use crate::document::SourceDocument;
use crate::error::Result;
use crate::manifest::{DeployableRecord, Manifest};
use crate::select::Selector;

/// What a run produced
#[derive(Debug, Clone)]
pub struct PackageReport {
    pub version: String,
    pub records: Vec<DeployableRecord>,
    pub manifest_path: PathBuf,
    pub backup_path: Option<PathBuf>,
    pub archive_path: PathBuf,
    /// Set when the source could not be parsed and an empty package was built
    pub parse_error: Option<String>,
}

/// Runs one packaging pass for a [`PackagerConfig`]
#[derive(Debug, Clone)]
pub struct Packager {
    config: PackagerConfig,
}

impl Packager {
    pub fn new(config: PackagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    /// Run the pipeline with the current wall-clock time
    pub fn run(&self) -> Result<PackageReport> {
        self.run_at(Local::now())
    }

    /// Run the pipeline as if started at `now`
    ///
    /// Malformed input is logged and packaged as an empty document;
    /// filesystem and archive failures abort the run.
    pub fn run_at(&self, now: DateTime<Local>) -> Result<PackageReport> {
        let config = &self.config;

        let (document, parse_error) = match SourceDocument::load(&config.source) {
            Ok(document) => (document, None),
            Err(e) if e.is_parse() => {
                tracing::error!("{}", e);
                (SourceDocument::empty(), Some(e.to_string()))
            }
            Err(e) => return Err(e),
        };

        let selection = Selector::new(
            &config.selection,
            &config.application_name,
            &config.work_directory,
        )
        .select(&document);
        selection.write()?;

        let version = config.version.resolve(now);
        let manifest = Manifest::compose(&config.application_name, version, selection.records());
        let written = manifest.write(&config.work_directory, config.write_backup)?;

        let archive_path =
            create_archive(&config.archive_path, &written.path, &manifest.deployables)?;
        tracing::info!(
            "Packaged {} deployable(s) into {}",
            manifest.deployables.len(),
            archive_path.display()
        );

        Ok(PackageReport {
            version: manifest.version,
            records: manifest.deployables,
            manifest_path: written.path,
            backup_path: written.backup,
            archive_path,
            parse_error,
        })
    }
}
