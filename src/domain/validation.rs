use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    TooLong { field: &'static str, max: usize, actual: usize },
    InvalidTemplateName { input: String },
    InvalidLanguageCode { input: String },
    InvalidUrl { input: String },
    InvalidPhoneNumber { input: String },
    PlaceholdersNotSequential { found: Vec<u32> },
    StartsWithPlaceholder,
    EndsWithPlaceholder,
    DuplicateComponent { kind: &'static str },
    MissingBody,
    TooManyButtons { max: usize, actual: usize },
    TooManyUrlButtons { max: usize, actual: usize },
    TooManyPhoneButtons { max: usize, actual: usize },
    MixedButtonGroups,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooLong { field, max, actual } => {
                write!(f, "{field} is too long: {actual} characters (max {max})")
            }
            Self::InvalidTemplateName { input } => {
                write!(
                    f,
                    "invalid template name: {input} (lowercase letters, digits and underscores only)"
                )
            }
            Self::InvalidLanguageCode { input } => write!(f, "invalid language code: {input}"),
            Self::InvalidUrl { input } => write!(f, "invalid url: {input}"),
            Self::InvalidPhoneNumber { input } => write!(f, "invalid phone number: {input}"),
            Self::PlaceholdersNotSequential { found } => {
                write!(
                    f,
                    "placeholder numbers must run 1..N without gaps, found: {found:?}"
                )
            }
            Self::StartsWithPlaceholder => write!(f, "body must not start with a placeholder"),
            Self::EndsWithPlaceholder => write!(f, "body must not end with a placeholder"),
            Self::DuplicateComponent { kind } => write!(f, "component already present: {kind}"),
            Self::MissingBody => write!(f, "template must have a body component"),
            Self::TooManyButtons { max, actual } => {
                write!(f, "too many buttons: {actual} (max {max})")
            }
            Self::TooManyUrlButtons { max, actual } => {
                write!(f, "too many url buttons: {actual} (max {max})")
            }
            Self::TooManyPhoneButtons { max, actual } => {
                write!(f, "too many phone buttons: {actual} (max {max})")
            }
            Self::MixedButtonGroups => {
                write!(
                    f,
                    "quick reply buttons must not be interleaved with url/phone buttons"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Non-blocking findings surfaced alongside [`ValidationError`]s.
///
/// Warnings never gate submission; they exist for editor feedback.
pub enum ValidationWarning {
    TooManyVariables { count: usize, literal_chars: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyVariables {
                count,
                literal_chars,
            } => {
                write!(
                    f,
                    "body uses {count} distinct variables with only {literal_chars} characters of literal text"
                )
            }
        }
    }
}
