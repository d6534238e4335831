//! Resource selection and transformation
//!
//! Decides which embedded resources become deployables, names them, and
//! produces the content written for each one. The parsed document is never
//! modified: every accepted resource carries its own transformed copy.

use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::config::SelectionPolicy;
use crate::document::{ResourceItem, SourceDocument};
use crate::error::Result;
use crate::manifest::DeployableRecord;
use crate::placeholder::normalize_value;

/// Kind whose container image is rewritten and whose file awaits substitution
pub const DEPLOYMENT_CONFIG_KIND: &str = "DeploymentConfig";

/// Extension of resources written as-is
const RESOURCE_EXTENSION: &str = "yaml";

/// Extension of resources that still contain release-system tokens
const PENDING_EXTENSION: &str = "yaml.bak";

/// An accepted resource ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedResource {
    pub record: DeployableRecord,
    /// Transformed copy of the source object
    pub content: Value,
}

impl SelectedResource {
    /// Serialized file content, placeholders normalized
    pub fn render(&self) -> Result<String> {
        render_resource(&self.content)
    }
}

/// Outcome for a single resource
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accepted(Box<SelectedResource>),
    /// Name does not contain the application name
    FilteredOut,
    /// Kind is not on the allow-list
    Unsupported { kind: String, name: String },
}

/// Accepted resources of one document, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    work_directory: PathBuf,
    resources: Vec<SelectedResource>,
}

impl Selection {
    pub fn resources(&self) -> &[SelectedResource] {
        &self.resources
    }

    pub fn records(&self) -> Vec<DeployableRecord> {
        self.resources.iter().map(|r| r.record.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Write every resource to its recorded path
    pub fn write(&self) -> Result<()> {
        std::fs::create_dir_all(&self.work_directory)?;
        for resource in &self.resources {
            std::fs::write(&resource.record.path, resource.render()?)?;
        }
        Ok(())
    }
}

/// Applies a [`SelectionPolicy`] to resources
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    policy: &'a SelectionPolicy,
    application_name: &'a str,
    work_directory: &'a Path,
}

impl<'a> Selector<'a> {
    pub fn new(
        policy: &'a SelectionPolicy,
        application_name: &'a str,
        work_directory: &'a Path,
    ) -> Self {
        Self {
            policy,
            application_name,
            work_directory,
        }
    }

    /// Select every deployable resource of `document`
    pub fn select(&self, document: &SourceDocument) -> Selection {
        let mut resources: Vec<SelectedResource> = Vec::new();

        for item in &document.items {
            match self.select_item(item) {
                Decision::Accepted(resource) => {
                    tracing::info!("Packaging {} {}", item.kind(), item.name());
                    if resources.iter().any(|r| r.record.path == resource.record.path) {
                        tracing::warn!(
                            "{} {} maps to {} like an earlier resource; its content replaces it",
                            item.kind(),
                            item.name(),
                            resource.record.file
                        );
                    }
                    resources.push(*resource);
                }
                Decision::Unsupported { kind, name } => {
                    tracing::info!("Skipping {} {}: kind not supported", kind, name);
                }
                Decision::FilteredOut => {}
            }
        }

        Selection {
            work_directory: self.work_directory.to_path_buf(),
            resources,
        }
    }

    /// Decide what happens to one resource
    pub fn select_item(&self, item: &ResourceItem) -> Decision {
        if self.policy.filter_by_application && !item.name().contains(self.application_name) {
            return Decision::FilteredOut;
        }

        if !self.policy.is_managed(item.kind()) {
            return Decision::Unsupported {
                kind: item.kind().to_string(),
                name: item.name().to_string(),
            };
        }

        let name = format!("{}-{}", item.kind(), item.name()).to_lowercase();
        let mut content = item.value().clone();

        let extension = if item.kind() == DEPLOYMENT_CONFIG_KIND {
            self.rewrite_container_image(&mut content, item.name());
            PENDING_EXTENSION
        } else {
            RESOURCE_EXTENSION
        };

        let path = self.work_directory.join(format!("{}.{}", name, extension));
        Decision::Accepted(Box::new(SelectedResource {
            record: DeployableRecord::resources_file(name, path),
            content,
        }))
    }

    fn rewrite_container_image(&self, content: &mut Value, name: &str) {
        let image = content
            .get_mut("spec")
            .and_then(|v| v.get_mut("template"))
            .and_then(|v| v.get_mut("spec"))
            .and_then(|v| v.get_mut("containers"))
            .and_then(|v| v.get_mut(0))
            .and_then(|v| v.get_mut("image"));

        match image {
            Some(Value::String(image)) => match rewrite_image(image, self.policy) {
                Some(rewritten) => *image = rewritten,
                None => {
                    tracing::warn!("{} {}: empty image, left as is", DEPLOYMENT_CONFIG_KIND, name)
                }
            },
            _ => tracing::warn!(
                "{} {}: no spec.template.spec.containers[0].image to rewrite",
                DEPLOYMENT_CONFIG_KIND,
                name
            ),
        }
    }
}

/// `{registry}/{namespace}/{repository}:{token}` for an image reference
///
/// The repository is the last path segment of `image` without its tag or
/// digest. Returns `None` when no repository name can be found.
pub fn rewrite_image(image: &str, policy: &SelectionPolicy) -> Option<String> {
    let without_digest = image.trim().split('@').next().unwrap_or_default();
    let last_segment = without_digest.rsplit('/').next().unwrap_or_default();
    let repository = last_segment.split(':').next().unwrap_or_default();

    if repository.is_empty() {
        return None;
    }

    Some(format!(
        "{}/{}/{}:{}",
        policy.registry_host, policy.app_namespace, repository, policy.version_token
    ))
}

/// Serialize a resource with placeholders normalized
pub fn render_resource(value: &Value) -> Result<String> {
    Ok(serde_yaml::to_string(&normalize_value(value))?)
}
