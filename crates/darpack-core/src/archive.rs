//! Deployment archive (`.dar`) creation and inspection
//!
//! A `.dar` is a ZIP file holding `deployit-manifest.xml` at its root and
//! every resource file under the entry name recorded in the manifest.

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{CoreError, Result};
use crate::manifest::{DeployableRecord, MANIFEST_FILE};

/// Archive entry name for an on-disk path
///
/// Only normal components are kept, so `./work/a.yaml` and `work/a.yaml`
/// both map to `work/a.yaml`.
pub fn entry_name(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Create (or truncate) `output` with the manifest followed by every record's file
pub fn create_archive(
    output: &Path,
    manifest_path: &Path,
    records: &[DeployableRecord],
) -> Result<PathBuf> {
    let file = File::create(output)?;
    let mut writer = ZipWriter::new(file);

    add_file_to_archive(&mut writer, manifest_path, MANIFEST_FILE)?;

    let mut seen = HashSet::from([MANIFEST_FILE.to_string()]);
    for record in records {
        if !seen.insert(record.file.clone()) {
            tracing::warn!("Duplicate archive entry {}, added once", record.file);
            continue;
        }
        add_file_to_archive(&mut writer, &record.path, &record.file)?;
    }

    writer.finish()?;
    Ok(output.to_path_buf())
}

/// Information about a file in an archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Entry name within the archive
    pub path: String,
    /// Uncompressed size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
}

/// List the entries of an archive in storage order
pub fn list_archive(archive_path: &Path) -> Result<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        entries.push(ArchiveEntry {
            path: entry.name().to_string(),
            size: entry.size(),
            is_dir: entry.is_dir(),
        });
    }

    Ok(entries)
}

/// Read a specific file from an archive
pub fn read_file_from_archive(archive_path: &Path, file_path: &str) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let mut entry = match archive.by_name(file_path) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(CoreError::Archive {
                message: format!("File not found in archive: {}", file_path),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut content = Vec::new();
    entry.read_to_end(&mut content)?;
    Ok(content)
}

/// Read the manifest text from an archive
pub fn read_manifest_from_archive(archive_path: &Path) -> Result<String> {
    let content = read_file_from_archive(archive_path, MANIFEST_FILE)?;
    String::from_utf8(content).map_err(|e| CoreError::Archive {
        message: format!("Invalid UTF-8 in {}: {}", MANIFEST_FILE, e),
    })
}

/// Outcome of comparing an archive with the files it was built from
#[derive(Debug, Clone, Default)]
pub struct VerificationResult {
    pub valid: bool,
    /// Expected entries absent from the archive
    pub missing: Vec<String>,
    /// Entries whose content differs from disk
    pub mismatched: Vec<String>,
    /// Entries nothing accounts for
    pub unexpected: Vec<String>,
}

/// Check that the archive holds exactly the manifest and the record files,
/// each byte-identical to its on-disk source
pub fn verify_archive(
    archive_path: &Path,
    manifest_path: &Path,
    records: &[DeployableRecord],
) -> Result<VerificationResult> {
    let mut expected = BTreeMap::new();
    expected.insert(MANIFEST_FILE.to_string(), manifest_path.to_path_buf());
    for record in records {
        expected
            .entry(record.file.clone())
            .or_insert_with(|| record.path.clone());
    }

    let mut contents = read_all_files_from_archive(archive_path)?;
    let mut result = VerificationResult::default();

    for (name, disk_path) in &expected {
        match contents.remove(name) {
            Some(data) => {
                if std::fs::read(disk_path)? != data {
                    result.mismatched.push(name.clone());
                }
            }
            None => result.missing.push(name.clone()),
        }
    }
    result.unexpected = contents.into_keys().collect();
    result.valid =
        result.missing.is_empty() && result.mismatched.is_empty() && result.unexpected.is_empty();

    Ok(result)
}

/// Read all files from an archive in a single pass
fn read_all_files_from_archive(archive_path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let mut contents = BTreeMap::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        contents.insert(entry.name().to_string(), data);
    }

    Ok(contents)
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        // Reproducible builds: fixed DOS epoch timestamp
        .last_modified_time(zip::DateTime::default())
}

/// Add a file to a zip archive under `archive_path`
fn add_file_to_archive<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    file_path: &Path,
    archive_path: &str,
) -> Result<()> {
    let content = std::fs::read(file_path)?;
    writer.start_file(archive_path, entry_options())?;
    writer.write_all(&content)?;
    Ok(())
}
