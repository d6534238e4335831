//! Darpack Core - OpenShift manifests to XL Deploy deployment packages
//!
//! This crate provides the packaging pipeline used by the `darpack` CLI:
//! - `SourceDocument`: a parsed `List` or `Template` export
//! - `Selector`: picks the deployable resources and rewrites them
//! - `Manifest`: the `deployit-manifest.xml` index
//! - `archive`: `.dar` creation and inspection
//! - `Packager`: runs the whole pipeline for a `PackagerConfig`

pub mod archive;
pub mod config;
pub mod document;
pub mod error;
pub mod manifest;
pub mod packager;
pub mod placeholder;
pub mod select;

pub use archive::{
    ArchiveEntry, VerificationResult, create_archive, list_archive, read_file_from_archive,
    read_manifest_from_archive, verify_archive,
};
pub use config::{PackagerConfig, SelectionPolicy, VersionPolicy};
pub use document::{DocumentKind, ResourceItem, SourceDocument};
pub use error::{CoreError, Result};
pub use manifest::{DeployableRecord, MANIFEST_FILE, Manifest, timestamp_version};
pub use packager::{PackageReport, Packager};
pub use placeholder::{normalize_placeholders, normalize_value};
pub use select::{Decision, SelectedResource, Selection, Selector, rewrite_image};
