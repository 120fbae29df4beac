//! Template components: the four typed slots and their constraints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::validation::ValidationError;
use crate::domain::value::{BodyText, ButtonText, FooterText, HeaderText, PhoneTarget, UrlTarget};

/// Maximum number of buttons the provider accepts per template.
pub const MAX_BUTTONS: usize = 10;

/// Maximum number of `url` buttons.
pub const MAX_URL_BUTTONS: usize = 2;

/// Maximum number of `phone` buttons.
pub const MAX_PHONE_BUTTONS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// The four component slots a template can carry.
///
/// Variant order is the fixed presentation and wire order; it is applied at
/// render/submission time and never stored.
pub enum ComponentKind {
    Header,
    Body,
    Footer,
    Buttons,
}

impl ComponentKind {
    /// Lower-case name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::Footer => "footer",
            Self::Buttons => "buttons",
        }
    }

    /// Upper-case type tag used on the wire.
    pub fn wire_tag(self) -> &'static str {
        match self {
            Self::Header => "HEADER",
            Self::Body => "BODY",
            Self::Footer => "FOOTER",
            Self::Buttons => "BUTTONS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One button on a template.
pub enum Button {
    QuickReply { text: ButtonText },
    Url { text: ButtonText, url: UrlTarget },
    Phone { text: ButtonText, phone: PhoneTarget },
}

impl Button {
    /// Upper-case type tag used on the wire.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::QuickReply { .. } => "QUICK_REPLY",
            Self::Url { .. } => "URL",
            Self::Phone { .. } => "PHONE_NUMBER",
        }
    }

    pub fn text(&self) -> &ButtonText {
        match self {
            Self::QuickReply { text } | Self::Url { text, .. } | Self::Phone { text, .. } => text,
        }
    }

    fn is_quick_reply(&self) -> bool {
        matches!(self, Self::QuickReply { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Validated, ordered button list.
///
/// Invariants: non-empty, at most [`MAX_BUTTONS`] entries, at most
/// [`MAX_URL_BUTTONS`] url buttons, at most [`MAX_PHONE_BUTTONS`] phone
/// buttons, and quick replies must not be interleaved with url/phone
/// buttons (each group must be contiguous).
pub struct Buttons(Vec<Button>);

impl Buttons {
    /// Create a validated button list, failing on the first violation.
    ///
    /// Callers that need every violation at once (editor feedback) should
    /// use [`Buttons::collection_violations`] instead.
    pub fn new(buttons: Vec<Button>) -> Result<Self, ValidationError> {
        if let Some(error) = Self::collection_violations(&buttons).into_iter().next() {
            return Err(error);
        }
        Ok(Self(buttons))
    }

    /// All collection-level violations for a candidate button list.
    pub fn collection_violations(buttons: &[Button]) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if buttons.is_empty() {
            errors.push(ValidationError::Empty { field: "buttons" });
            return errors;
        }
        if buttons.len() > MAX_BUTTONS {
            errors.push(ValidationError::TooManyButtons {
                max: MAX_BUTTONS,
                actual: buttons.len(),
            });
        }

        let url_count = buttons
            .iter()
            .filter(|b| matches!(b, Button::Url { .. }))
            .count();
        if url_count > MAX_URL_BUTTONS {
            errors.push(ValidationError::TooManyUrlButtons {
                max: MAX_URL_BUTTONS,
                actual: url_count,
            });
        }

        let phone_count = buttons
            .iter()
            .filter(|b| matches!(b, Button::Phone { .. }))
            .count();
        if phone_count > MAX_PHONE_BUTTONS {
            errors.push(ValidationError::TooManyPhoneButtons {
                max: MAX_PHONE_BUTTONS,
                actual: phone_count,
            });
        }

        // Quick replies and call-to-action buttons must form two contiguous
        // groups; count the group boundaries.
        let transitions = buttons
            .windows(2)
            .filter(|pair| pair[0].is_quick_reply() != pair[1].is_quick_reply())
            .count();
        if transitions > 1 {
            errors.push(ValidationError::MixedButtonGroups);
        }

        errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Button> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Button] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A filled component slot.
pub enum Component {
    Header(HeaderText),
    Body(BodyText),
    Footer(FooterText),
    Buttons(Buttons),
}

impl Component {
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
/// The component slots of a template, keyed by kind.
///
/// At most one component of each kind can be present. Iteration always
/// yields the fixed header, body, footer, buttons order regardless of
/// insertion order.
pub struct ComponentSet {
    slots: BTreeMap<ComponentKind, Component>,
}

impl ComponentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component, failing if its slot is already filled.
    pub fn add(&mut self, component: Component) -> Result<(), ValidationError> {
        let kind = component.kind();
        if self.slots.contains_key(&kind) {
            return Err(ValidationError::DuplicateComponent { kind: kind.name() });
        }
        self.slots.insert(kind, component);
        Ok(())
    }

    /// Insert or overwrite a component, returning the previous occupant.
    pub fn replace(&mut self, component: Component) -> Option<Component> {
        self.slots.insert(component.kind(), component)
    }

    pub fn remove(&mut self, kind: ComponentKind) -> Option<Component> {
        self.slots.remove(&kind)
    }

    pub fn get(&self, kind: ComponentKind) -> Option<&Component> {
        self.slots.get(&kind)
    }

    pub fn header(&self) -> Option<&HeaderText> {
        match self.slots.get(&ComponentKind::Header) {
            Some(Component::Header(text)) => Some(text),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&BodyText> {
        match self.slots.get(&ComponentKind::Body) {
            Some(Component::Body(text)) => Some(text),
            _ => None,
        }
    }

    pub fn footer(&self) -> Option<&FooterText> {
        match self.slots.get(&ComponentKind::Footer) {
            Some(Component::Footer(text)) => Some(text),
            _ => None,
        }
    }

    pub fn buttons(&self) -> Option<&Buttons> {
        match self.slots.get(&ComponentKind::Buttons) {
            Some(Component::Buttons(buttons)) => Some(buttons),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Components in the fixed presentation order.
    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.slots.values()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Provider template category.
pub enum Category {
    #[default]
    Marketing,
    Utility,
    Authentication,
}

impl Category {
    /// Upper-case tag used on the wire and in stored rows.
    pub fn wire_tag(self) -> &'static str {
        match self {
            Self::Marketing => "MARKETING",
            Self::Utility => "UTILITY",
            Self::Authentication => "AUTHENTICATION",
        }
    }

    /// Map a provider tag to a category, if known.
    pub fn from_wire_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "MARKETING" => Self::Marketing,
            "UTILITY" => Self::Utility,
            "AUTHENTICATION" => Self::Authentication,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// Lifecycle status of a template.
///
/// `Draft` exists only locally. `Pending` is set when a submission is
/// accepted by the provider. `Approved`, `Rejected`, and `Disabled` are
/// only ever copied in from the provider by the synchronizer.
pub enum TemplateStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Disabled,
}

impl TemplateStatus {
    /// Upper-case tag used in stored rows.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Disabled => "DISABLED",
        }
    }

    /// Map a provider status tag to a status, if known.
    ///
    /// The provider never reports `DRAFT`; unknown tags yield `None` and
    /// are handled by the caller rather than failing a whole sync pass.
    pub fn from_provider_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "PENDING" => Self::Pending,
            "APPROVED" => Self::Approved,
            "REJECTED" => Self::Rejected,
            "DISABLED" => Self::Disabled,
            _ => return None,
        })
    }

    /// Whether only the synchronizer may set this status.
    pub fn is_provider_owned(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected | Self::Disabled)
    }
}
