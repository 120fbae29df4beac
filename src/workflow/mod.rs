//! The template editing session and its two terminal actions.
//!
//! A [`TemplateDraft`] is the transient working copy; nothing touches the
//! store or the provider until [`TemplateWorkflow::save_draft`] or
//! [`TemplateWorkflow::submit_for_approval`] is called. Validation is
//! accumulated, never short-circuited, so an editor can show every problem
//! at once.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::warn;

use crate::client::{ProviderApi, WabaError};
use crate::domain::{
    BodyText, Button, ButtonText, Buttons, Category, Component, ComponentKind, ComponentSet,
    FooterText, HeaderText, LanguageCode, PhoneTarget, ProviderTemplateId, Template, TemplateName,
    TemplateStatus, UrlTarget, ValidationError, ValidationWarning, variables,
};
use crate::notify::{Notification, Notifier, SubmissionRecord};
use crate::store::{
    NewTemplateRecord, StoreError, StoredButton, TemplateRecord, TemplateStore, TemplateUpdate,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One button as entered in the editor, not yet validated.
pub enum ButtonDraft {
    QuickReply { text: String },
    Url { text: String, url: String },
    Phone { text: String, phone: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One component slot as entered in the editor, not yet validated.
pub enum DraftComponent {
    Header(String),
    Body(String),
    Footer(String),
    Buttons(Vec<ButtonDraft>),
}

impl DraftComponent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Header(_) => ComponentKind::Header,
            Self::Body(_) => ComponentKind::Body,
            Self::Footer(_) => ComponentKind::Footer,
            Self::Buttons(_) => ComponentKind::Buttons,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Accumulated validation outcome for a draft.
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Live preview of the draft body with auto-assigned sample values.
pub struct Preview {
    /// `"Sample N"` for every detected variable, keyed by number.
    pub values: BTreeMap<u32, String>,
    /// Body text with the sample values substituted, when a body exists.
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The transient working copy edited by the user.
///
/// Editing allows transient invalid states; the structural rules are only
/// enforced by [`TemplateDraft::validate`] and at the terminal actions.
pub struct TemplateDraft {
    /// Backing store row, when this draft edits an existing template.
    pub record_id: Option<String>,
    pub name: String,
    pub category: Category,
    pub language: String,
    components: BTreeMap<ComponentKind, DraftComponent>,
}

impl TemplateDraft {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        language: impl Into<String>,
    ) -> Self {
        Self {
            record_id: None,
            name: name.into(),
            category,
            language: language.into(),
            components: BTreeMap::new(),
        }
    }

    /// Open an existing record for editing.
    pub fn from_record(record: &TemplateRecord) -> Self {
        let mut components = BTreeMap::new();
        if let Some(text) = &record.header_text {
            components.insert(ComponentKind::Header, DraftComponent::Header(text.clone()));
        }
        if let Some(text) = &record.body_text {
            components.insert(ComponentKind::Body, DraftComponent::Body(text.clone()));
        }
        if let Some(text) = &record.footer_text {
            components.insert(ComponentKind::Footer, DraftComponent::Footer(text.clone()));
        }
        if !record.buttons.is_empty() {
            let buttons = record
                .buttons
                .iter()
                .map(|button| match button {
                    StoredButton::QuickReply { text } => ButtonDraft::QuickReply {
                        text: text.clone(),
                    },
                    StoredButton::Url { text, url } => ButtonDraft::Url {
                        text: text.clone(),
                        url: url.clone(),
                    },
                    StoredButton::Phone { text, phone } => ButtonDraft::Phone {
                        text: text.clone(),
                        phone: phone.clone(),
                    },
                })
                .collect();
            components.insert(ComponentKind::Buttons, DraftComponent::Buttons(buttons));
        }

        Self {
            record_id: Some(record.id.clone()),
            name: record.name.clone(),
            category: record.category,
            language: record.language.clone(),
            components,
        }
    }

    /// Add a component, failing if its slot is already filled.
    pub fn add_component(&mut self, component: DraftComponent) -> Result<(), ValidationError> {
        let kind = component.kind();
        if self.components.contains_key(&kind) {
            return Err(ValidationError::DuplicateComponent { kind: kind.name() });
        }
        self.components.insert(kind, component);
        Ok(())
    }

    /// Insert or overwrite a component.
    pub fn replace_component(&mut self, component: DraftComponent) {
        self.components.insert(component.kind(), component);
    }

    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<DraftComponent> {
        self.components.remove(&kind)
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&DraftComponent> {
        self.components.get(&kind)
    }

    pub fn has_components(&self) -> bool {
        !self.components.is_empty()
    }

    pub fn body_text(&self) -> Option<&str> {
        match self.components.get(&ComponentKind::Body) {
            Some(DraftComponent::Body(text)) => Some(text),
            _ => None,
        }
    }

    /// Rewrite body placeholders to be sequential from 1, preserving the
    /// relative order of first appearance.
    pub fn renumber_body_placeholders(&mut self) {
        if let Some(DraftComponent::Body(text)) = self.components.get_mut(&ComponentKind::Body) {
            *text = variables::renumber_placeholders(text);
        }
    }

    /// Regenerate the live preview from the current components.
    pub fn preview(&self) -> Preview {
        match self.body_text() {
            Some(text) => {
                let values = variables::sample_values(text);
                let body = variables::render_preview(text, &values);
                Preview {
                    values,
                    body: Some(body),
                }
            }
            None => Preview {
                values: BTreeMap::new(),
                body: None,
            },
        }
    }

    /// Run the full submission validation, accumulating every error.
    pub fn validate(&self) -> ValidationReport {
        self.check().1
    }

    /// Validate and assemble the submission-ready template.
    pub fn build(&self) -> Result<Template, ValidationReport> {
        let (template, report) = self.check();
        match template {
            Some(template) if report.is_valid() => Ok(template),
            _ => Err(report),
        }
    }

    fn check(&self) -> (Option<Template>, ValidationReport) {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let name = push_err(&mut errors, TemplateName::new(&self.name));
        let language = push_err(&mut errors, LanguageCode::new(&self.language));

        if self.components.is_empty() {
            errors.push(ValidationError::Empty {
                field: "components",
            });
        }

        let mut set = ComponentSet::new();

        match self.components.get(&ComponentKind::Body) {
            Some(DraftComponent::Body(text)) => {
                let report = variables::validate_body(text);
                errors.extend(report.errors);
                warnings.extend(report.warnings);

                if let Some(body) = push_err(&mut errors, BodyText::new(text.clone())) {
                    let _ = set.replace(Component::Body(body));
                }
            }
            _ => errors.push(ValidationError::MissingBody),
        }

        if let Some(DraftComponent::Header(text)) = self.components.get(&ComponentKind::Header) {
            if let Some(header) = push_err(&mut errors, HeaderText::new(text.clone())) {
                let _ = set.replace(Component::Header(header));
            }
        }

        if let Some(DraftComponent::Footer(text)) = self.components.get(&ComponentKind::Footer) {
            if let Some(footer) = push_err(&mut errors, FooterText::new(text.clone())) {
                let _ = set.replace(Component::Footer(footer));
            }
        }

        if let Some(DraftComponent::Buttons(drafts)) = self.components.get(&ComponentKind::Buttons)
        {
            let mut built = Vec::with_capacity(drafts.len());
            let mut all_built = true;
            for draft in drafts {
                match build_button(draft, &mut errors) {
                    Some(button) => built.push(button),
                    None => all_built = false,
                }
            }
            if all_built {
                let violations = Buttons::collection_violations(&built);
                if violations.is_empty() {
                    if let Some(buttons) = push_err(&mut errors, Buttons::new(built)) {
                        let _ = set.replace(Component::Buttons(buttons));
                    }
                } else {
                    errors.extend(violations);
                }
            }
        }

        let template = match (name, language) {
            (Some(name), Some(language)) if errors.is_empty() => {
                push_err(&mut errors, Template::new(name, self.category, language, set))
            }
            _ => None,
        };

        (template, ValidationReport { errors, warnings })
    }

    fn stored_buttons(&self) -> Vec<StoredButton> {
        match self.components.get(&ComponentKind::Buttons) {
            Some(DraftComponent::Buttons(drafts)) => drafts
                .iter()
                .map(|draft| match draft {
                    ButtonDraft::QuickReply { text } => StoredButton::QuickReply {
                        text: text.clone(),
                    },
                    ButtonDraft::Url { text, url } => StoredButton::Url {
                        text: text.clone(),
                        url: url.clone(),
                    },
                    ButtonDraft::Phone { text, phone } => StoredButton::Phone {
                        text: text.clone(),
                        phone: phone.clone(),
                    },
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn component_text(&self, kind: ComponentKind) -> Option<String> {
        match self.components.get(&kind) {
            Some(DraftComponent::Header(text))
            | Some(DraftComponent::Body(text))
            | Some(DraftComponent::Footer(text)) => Some(text.clone()),
            _ => None,
        }
    }

    fn to_new_record(&self, status: TemplateStatus) -> NewTemplateRecord {
        NewTemplateRecord {
            name: self.name.trim().to_owned(),
            category: self.category,
            language: self.language.trim().to_owned(),
            status,
            header_text: self.component_text(ComponentKind::Header),
            body_text: self.component_text(ComponentKind::Body),
            footer_text: self.component_text(ComponentKind::Footer),
            buttons: self.stored_buttons(),
            provider_id: None,
        }
    }

    fn to_update(&self, status: TemplateStatus) -> TemplateUpdate {
        TemplateUpdate {
            name: Some(self.name.trim().to_owned()),
            category: Some(self.category),
            language: Some(self.language.trim().to_owned()),
            status: Some(status),
            header_text: Some(self.component_text(ComponentKind::Header)),
            body_text: Some(self.component_text(ComponentKind::Body)),
            footer_text: Some(self.component_text(ComponentKind::Footer)),
            buttons: Some(self.stored_buttons()),
            provider_id: None,
        }
    }
}

fn push_err<T>(errors: &mut Vec<ValidationError>, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.push(error);
            None
        }
    }
}

fn build_button(draft: &ButtonDraft, errors: &mut Vec<ValidationError>) -> Option<Button> {
    match draft {
        ButtonDraft::QuickReply { text } => {
            let text = push_err(errors, ButtonText::new(text.clone()))?;
            Some(Button::QuickReply { text })
        }
        ButtonDraft::Url { text, url } => {
            let text = push_err(errors, ButtonText::new(text.clone()));
            let url = push_err(errors, UrlTarget::new(url.clone()));
            Some(Button::Url {
                text: text?,
                url: url?,
            })
        }
        ButtonDraft::Phone { text, phone } => {
            let text = push_err(errors, ButtonText::new(text.clone()));
            let phone = push_err(errors, PhoneTarget::parse(None, phone.clone()));
            Some(Button::Phone {
                text: text?,
                phone: phone?,
            })
        }
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by the workflow's terminal actions.
pub enum WorkflowError {
    /// Validation failed; the provider was never called.
    #[error("template failed validation with {} error(s)", .0.errors.len())]
    Invalid(ValidationReport),

    /// A submission for the same `(name, language)` pair is in flight.
    #[error("a submission for template '{name}' ({language}) is already in flight")]
    Conflict { name: String, language: String },

    /// The provider rejected or could not process the submission.
    #[error("provider call failed: {0}")]
    Provider(#[source] WabaError),

    /// The persistence store failed; the working draft is untouched.
    #[error("store operation failed: {0}")]
    Store(#[source] StoreError),
}

#[derive(Debug, Clone, PartialEq)]
/// Result of a successful submission.
pub struct SubmitOutcome {
    pub record: TemplateRecord,
    pub provider_id: ProviderTemplateId,
    /// Status the provider reported for the fresh submission, when known.
    pub provider_status: Option<TemplateStatus>,
}

/// Coordinates editing-session terminal actions against the injected
/// store, provider, and notifier.
pub struct TemplateWorkflow {
    provider: Arc<dyn ProviderApi>,
    store: Arc<dyn TemplateStore>,
    notifier: Arc<dyn Notifier>,
    in_flight: Mutex<HashSet<(String, String)>>,
}

impl TemplateWorkflow {
    pub fn new(
        provider: Arc<dyn ProviderApi>,
        store: Arc<dyn TemplateStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            store,
            notifier,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Persist the working draft locally with status forced to `Draft`.
    ///
    /// Succeeds whenever the draft has a non-empty name and at least one
    /// component; never contacts the provider.
    pub async fn save_draft(&self, draft: &TemplateDraft) -> Result<TemplateRecord, WorkflowError> {
        let mut errors = Vec::new();
        if draft.name.trim().is_empty() {
            errors.push(ValidationError::Empty { field: "name" });
        }
        if !draft.has_components() {
            errors.push(ValidationError::Empty {
                field: "components",
            });
        }
        if !errors.is_empty() {
            return Err(WorkflowError::Invalid(ValidationReport {
                errors,
                warnings: Vec::new(),
            }));
        }

        match self.persist(draft, TemplateStatus::Draft, None).await {
            Ok(record) => Ok(record),
            Err(error) => {
                self.notify_best_effort(Notification::destructive(
                    "Draft not saved",
                    error.to_string(),
                ))
                .await;
                Err(WorkflowError::Store(error))
            }
        }
    }

    /// Validate, submit to the provider, and persist the `Pending` state.
    ///
    /// Every validation error is surfaced at once and blocks the network
    /// call entirely. On provider failure the local record keeps its
    /// `Draft` state and the provider's message is surfaced verbatim when
    /// available.
    pub async fn submit_for_approval(
        &self,
        draft: &TemplateDraft,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let template = match draft.build() {
            Ok(template) => template,
            Err(report) => return Err(WorkflowError::Invalid(report)),
        };

        let _guard = InFlightGuard::acquire(
            &self.in_flight,
            template.name().as_str(),
            template.language().as_str(),
        )?;

        let created = match self.provider.create_template(&template).await {
            Ok(created) => created,
            Err(error) => {
                self.notify_best_effort(Notification::destructive(
                    "Template submission failed",
                    provider_user_message(&error),
                ))
                .await;
                return Err(WorkflowError::Provider(error));
            }
        };

        let record = match self
            .persist(draft, TemplateStatus::Pending, Some(&created.id))
            .await
        {
            Ok(record) => record,
            Err(error) => {
                self.notify_best_effort(Notification::destructive(
                    "Template submitted but not saved",
                    error.to_string(),
                ))
                .await;
                return Err(WorkflowError::Store(error));
            }
        };

        self.notify_best_effort(Notification::info(
            "Template submitted",
            format!(
                "'{}' was sent for approval. Review usually takes 24-48 hours.",
                template.name().as_str()
            ),
        ))
        .await;

        let submission = SubmissionRecord {
            template_name: template.name().as_str().to_owned(),
            language: template.language().as_str().to_owned(),
            provider_id: created.id.as_str().to_owned(),
            submitted_at: Utc::now(),
        };
        if let Err(error) = self.notifier.record_submission(submission).await {
            warn!(error = %error, "failed to write durable submission record");
        }

        Ok(SubmitOutcome {
            record,
            provider_id: created.id,
            provider_status: created.status,
        })
    }

    async fn persist(
        &self,
        draft: &TemplateDraft,
        status: TemplateStatus,
        provider_id: Option<&ProviderTemplateId>,
    ) -> Result<TemplateRecord, StoreError> {
        match &draft.record_id {
            Some(id) => {
                let mut patch = draft.to_update(status);
                patch.provider_id = provider_id.map(|id| id.as_str().to_owned());
                self.store.update(id, patch).await
            }
            None => {
                let mut record = draft.to_new_record(status);
                record.provider_id = provider_id.map(|id| id.as_str().to_owned());
                self.store.insert(record).await
            }
        }
    }

    async fn notify_best_effort(&self, notification: Notification) {
        if let Err(error) = self.notifier.notify(notification).await {
            warn!(error = %error, "notification sink failed");
        }
    }
}

fn provider_user_message(error: &WabaError) -> String {
    match error {
        WabaError::Api { message, .. } => message.clone(),
        _ => "The messaging provider could not process the request.".to_owned(),
    }
}

struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<(String, String)>>,
    key: (String, String),
}

impl<'a> InFlightGuard<'a> {
    fn acquire(
        set: &'a Mutex<HashSet<(String, String)>>,
        name: &str,
        language: &str,
    ) -> Result<Self, WorkflowError> {
        let key = (name.to_owned(), language.to_owned());
        let mut held = lock_in_flight(set);
        if !held.insert(key.clone()) {
            return Err(WorkflowError::Conflict {
                name: key.0,
                language: key.1,
            });
        }
        drop(held);
        Ok(Self { set, key })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        lock_in_flight(self.set).remove(&self.key);
    }
}

fn lock_in_flight<'a>(
    set: &'a Mutex<HashSet<(String, String)>>,
) -> MutexGuard<'a, HashSet<(String, String)>> {
    match set.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
