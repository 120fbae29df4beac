//! Typed Rust client core for the WhatsApp Business message-template
//! lifecycle.
//!
//! The design follows three layers: a domain layer of strong types with
//! validation, a transport layer for the provider's Graph-style wire
//! format, and a client layer orchestrating requests. On top of those sit
//! the pieces a CRM embeds: a builder workflow for editing and submitting
//! templates, and a synchronizer that copies provider-side approval status
//! (and unseen templates) into local storage.
//!
//! ```rust,no_run
//! use waba_templates::{Auth, WabaClient, WabaId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), waba_templates::WabaError> {
//!     let client = WabaClient::new(Auth::bearer("...")?, WabaId::new("1098765")?);
//!     for template in client.list_templates().await? {
//!         println!("{} -> {}", template.name, template.status_tag);
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

use std::future::Future;
use std::pin::Pin;

pub mod client;
pub mod domain;
pub mod notify;
pub mod store;
pub mod sync;
mod transport;
pub mod workflow;

/// Boxed future used by the object-safe collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub use client::{Auth, ProviderApi, WabaClient, WabaClientBuilder, WabaError};
pub use domain::{
    BodyText, Button, ButtonText, Buttons, Category, Component, ComponentKind, ComponentSet,
    CreateTemplateResponse, FooterText, HeaderText, LanguageCode, PhoneTarget, ProviderButton,
    ProviderComponent, ProviderTemplate, ProviderTemplateId, Template, TemplateName,
    TemplateStatus, UrlTarget, ValidationError, ValidationWarning, VariableReport, WabaId,
    validate_body,
};
pub use notify::{Notification, Notifier, NotifyError, Severity, SubmissionRecord};
pub use store::{
    MemoryTemplateStore, NewTemplateRecord, StoreError, StoredButton, TemplateRecord,
    TemplateStore, TemplateUpdate,
};
pub use sync::{SyncError, SyncReport, Synchronizer};
pub use workflow::{
    ButtonDraft, DraftComponent, Preview, SubmitOutcome, TemplateDraft, TemplateWorkflow,
    ValidationReport, WorkflowError,
};
