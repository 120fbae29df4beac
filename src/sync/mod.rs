//! Status synchronization: reconcile local records with the provider's
//! source of truth.
//!
//! A pass is the only way a template reaches `Approved`, `Rejected`, or
//! `Disabled` locally. Passes are idempotent: with no provider-side change,
//! a second run mutates nothing.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::{ProviderApi, WabaError};
use crate::domain::{ProviderButton, ProviderComponent, ProviderTemplate, TemplateStatus};
use crate::store::{NewTemplateRecord, StoreError, StoredButton, TemplateStore, TemplateUpdate};

/// Language assumed for imported templates when the provider omits one.
pub const DEFAULT_IMPORT_LANGUAGE: &str = "tr";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Mutation counts of one synchronization pass.
pub struct SyncReport {
    /// Local records whose status was copied from the provider.
    pub updated: usize,
    /// Provider templates imported as new local records.
    pub imported: usize,
    /// Provider entries skipped (unknown status tag or duplicate name).
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The provider list call failed; no local record was touched.
    #[error("provider list failed: {0}")]
    Provider(#[from] WabaError),

    /// A store operation failed mid-pass; earlier mutations stand.
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
}

/// Reconciles local template records against the provider's list.
pub struct Synchronizer {
    provider: Arc<dyn ProviderApi>,
    store: Arc<dyn TemplateStore>,
}

impl Synchronizer {
    pub fn new(provider: Arc<dyn ProviderApi>, store: Arc<dyn TemplateStore>) -> Self {
        Self { provider, store }
    }

    /// Run one synchronization pass.
    ///
    /// Status reconciliation for known records always completes before any
    /// import. Matching is by `name` only; a name match with a differing
    /// language is reconciled anyway and logged, since the provider allows
    /// same-named templates across languages.
    pub async fn run(&self) -> Result<SyncReport, SyncError> {
        let remote = self.provider.list_templates().await?;
        let locals = self.store.list().await?;

        let mut report = SyncReport::default();

        for local in &locals {
            let Some(matched) = remote.iter().find(|template| template.name == local.name)
            else {
                continue;
            };

            if let Some(language) = &matched.language {
                if language != &local.language {
                    warn!(
                        name = %local.name,
                        local_language = %local.language,
                        remote_language = %language,
                        "template matched by name across different languages"
                    );
                }
            }

            let Some(status) = matched.status() else {
                warn!(
                    name = %matched.name,
                    status_tag = %matched.status_tag,
                    "skipping status update for unknown provider status tag"
                );
                report.skipped += 1;
                continue;
            };

            if status != local.status {
                self.store
                    .update(
                        &local.id,
                        TemplateUpdate {
                            status: Some(status),
                            ..Default::default()
                        },
                    )
                    .await?;
                report.updated += 1;
            }
        }

        let local_names: HashSet<&str> = locals.iter().map(|record| record.name.as_str()).collect();
        let mut imported_names: HashSet<String> = HashSet::new();

        for template in &remote {
            if local_names.contains(template.name.as_str()) {
                continue;
            }
            if imported_names.contains(&template.name) {
                warn!(
                    name = %template.name,
                    "duplicate provider template name; importing only the first"
                );
                report.skipped += 1;
                continue;
            }

            let Some(status) = template.status() else {
                warn!(
                    name = %template.name,
                    status_tag = %template.status_tag,
                    "skipping import for unknown provider status tag"
                );
                report.skipped += 1;
                continue;
            };

            self.store.insert(import_record(template, status)).await?;
            imported_names.insert(template.name.clone());
            report.imported += 1;
        }

        debug!(
            updated = report.updated,
            imported = report.imported,
            skipped = report.skipped,
            "synchronization pass finished"
        );
        Ok(report)
    }
}

fn import_record(template: &ProviderTemplate, status: TemplateStatus) -> NewTemplateRecord {
    let mut header_text = None;
    let mut body_text = None;
    let mut footer_text = None;
    let mut buttons = Vec::new();

    for component in &template.components {
        match component {
            ProviderComponent::Header { text } => header_text = Some(text.clone()),
            ProviderComponent::Body { text } => body_text = Some(text.clone()),
            ProviderComponent::Footer { text } => footer_text = Some(text.clone()),
            ProviderComponent::Buttons {
                buttons: remote_buttons,
            } => {
                buttons = remote_buttons
                    .iter()
                    .map(|button| match button {
                        ProviderButton::QuickReply { text } => StoredButton::QuickReply {
                            text: text.clone(),
                        },
                        ProviderButton::Url { text, url } => StoredButton::Url {
                            text: text.clone(),
                            url: url.clone(),
                        },
                        ProviderButton::Phone { text, phone_number } => StoredButton::Phone {
                            text: text.clone(),
                            phone: phone_number.clone(),
                        },
                    })
                    .collect();
            }
        }
    }

    NewTemplateRecord {
        name: template.name.clone(),
        category: template.category.unwrap_or_default(),
        language: template
            .language
            .clone()
            .unwrap_or_else(|| DEFAULT_IMPORT_LANGUAGE.to_owned()),
        status,
        header_text,
        body_text,
        footer_text,
        buttons,
        provider_id: template
            .id
            .as_ref()
            .map(|id| id.as_str().to_owned()),
    }
}
