use crate::domain::validation::ValidationError;

use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Provider-facing template name.
///
/// Invariant: non-empty after trimming, at most 512 characters, lowercase
/// letters, digits, and underscores only.
pub struct TemplateName(String);

impl TemplateName {
    /// Wire field name (`name`).
    pub const FIELD: &'static str = "name";

    /// Maximum length accepted by the provider.
    pub const MAX: usize = 512;

    /// Create a validated [`TemplateName`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let chars = trimmed.chars().count();
        if chars > Self::MAX {
            return Err(ValidationError::TooLong {
                field: Self::FIELD,
                max: Self::MAX,
                actual: chars,
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ValidationError::InvalidTemplateName {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Locale code of a template, e.g. `tr`, `en`, `en_US`.
///
/// Invariant: two or three lowercase letters, optionally followed by an
/// underscore and a two-letter uppercase region.
pub struct LanguageCode(String);

impl LanguageCode {
    /// Wire field name (`language`).
    pub const FIELD: &'static str = "language";

    /// Create a validated [`LanguageCode`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !is_valid_language(trimmed) {
            return Err(ValidationError::InvalidLanguageCode {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_language(code: &str) -> bool {
    let mut parts = code.splitn(2, '_');
    let base = parts.next().unwrap_or_default();
    let region = parts.next();

    let base_ok = (2..=3).contains(&base.len()) && base.bytes().all(|b| b.is_ascii_lowercase());
    let region_ok = match region {
        None => true,
        Some(region) => region.len() == 2 && region.bytes().all(|b| b.is_ascii_uppercase()),
    };
    base_ok && region_ok
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Header component text.
///
/// Invariant: non-empty after trimming, at most 60 characters. The original
/// value (including whitespace) is preserved.
pub struct HeaderText(String);

impl HeaderText {
    /// Stored column / error field name (`header_text`).
    pub const FIELD: &'static str = "header_text";

    /// Maximum length accepted by the provider.
    pub const MAX: usize = 60;

    /// Create validated header text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        bounded_text(&value, Self::FIELD, Self::MAX)?;
        Ok(Self(value))
    }

    /// Borrow the text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Body component text.
///
/// Invariant: non-empty after trimming, at most 1024 characters. Placeholder
/// sequencing is validated separately so editors can report every problem at
/// once.
pub struct BodyText(String);

impl BodyText {
    /// Stored column / error field name (`body_text`).
    pub const FIELD: &'static str = "body_text";

    /// Maximum length accepted by the provider.
    pub const MAX: usize = 1024;

    /// Create validated body text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        bounded_text(&value, Self::FIELD, Self::MAX)?;
        Ok(Self(value))
    }

    /// Borrow the text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Footer component text.
///
/// Invariant: non-empty after trimming, at most 60 characters.
pub struct FooterText(String);

impl FooterText {
    /// Stored column / error field name (`footer_text`).
    pub const FIELD: &'static str = "footer_text";

    /// Maximum length accepted by the provider.
    pub const MAX: usize = 60;

    /// Create validated footer text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        bounded_text(&value, Self::FIELD, Self::MAX)?;
        Ok(Self(value))
    }

    /// Borrow the text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Label shown on a button.
///
/// Invariant: non-empty after trimming, at most 25 characters.
pub struct ButtonText(String);

impl ButtonText {
    /// Wire field name (`text`).
    pub const FIELD: &'static str = "text";

    /// Maximum length accepted by the provider.
    pub const MAX: usize = 25;

    /// Create validated button text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        bounded_text(&value, Self::FIELD, Self::MAX)?;
        Ok(Self(value))
    }

    /// Borrow the text as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn bounded_text(value: &str, field: &'static str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let chars = value.chars().count();
    if chars > max {
        return Err(ValidationError::TooLong {
            field,
            max,
            actual: chars,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Target of a `url` button.
///
/// Invariant: parses as an absolute `http`/`https` URL.
pub struct UrlTarget(String);

impl UrlTarget {
    /// Wire field name (`url`).
    pub const FIELD: &'static str = "url";

    /// Create a validated [`UrlTarget`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let parsed = url::Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl {
            input: trimmed.to_owned(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ValidationError::InvalidUrl {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated URL.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
/// Target of a `phone` button, normalized to E.164.
///
/// Equality and hashing are based on the E.164 form.
pub struct PhoneTarget {
    raw: String,
    e164: String,
}

impl PhoneTarget {
    /// Wire field name (`phone_number`).
    pub const FIELD: &'static str = "phone_number";

    /// Parse and normalize a phone number into E.164.
    ///
    /// `default_region` is used when the input does not contain an explicit
    /// country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| ValidationError::InvalidPhoneNumber { input: raw.clone() })?;

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();

        Ok(Self { raw, e164 })
    }

    /// Raw input after trimming.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized E.164 representation, as sent to the provider.
    pub fn e164(&self) -> &str {
        &self.e164
    }
}

impl PartialEq for PhoneTarget {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneTarget {}

impl std::hash::Hash for PhoneTarget {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// WhatsApp Business Account id templates belong to.
///
/// Invariant: non-empty after trimming.
pub struct WabaId(String);

impl WabaId {
    /// URL path segment name (`waba_id`).
    pub const FIELD: &'static str = "waba_id";

    /// Create a validated [`WabaId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Bearer token for the provider API.
///
/// Invariant: non-empty after trimming.
pub struct AccessToken(String);

impl AccessToken {
    /// Header field the token travels in (`Authorization`).
    pub const FIELD: &'static str = "access_token";

    /// Create a validated [`AccessToken`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Provider-side template id returned by the create call.
///
/// Invariant: non-empty after trimming.
pub struct ProviderTemplateId(String);

impl ProviderTemplateId {
    /// Wire field name (`id`).
    pub const FIELD: &'static str = "id";

    /// Create a validated [`ProviderTemplateId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
