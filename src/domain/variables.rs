//! Placeholder (`{{N}}`) scanning and the body variable rules.
//!
//! Everything here is pure: the same input always yields the same report,
//! so editors can re-run validation on every keystroke.

use std::collections::BTreeMap;

use crate::domain::validation::{ValidationError, ValidationWarning};

/// Distinct-variable count above which a density warning is considered.
pub const VARIABLE_DENSITY_COUNT: usize = 5;

/// Literal-text length below which the density warning fires.
pub const VARIABLE_DENSITY_MIN_LITERAL: usize = 100;

/// Outcome of [`validate_body`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReport {
    /// Distinct placeholder numbers in order of first appearance.
    pub placeholders: Vec<u32>,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl VariableReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Byte span of one placeholder occurrence plus its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
    number: u32,
}

/// Find every well-formed `{{N}}` occurrence, left to right.
///
/// A number that overflows `u32` is treated as literal text, as is any
/// brace pair without digits between it.
fn scan_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut offset = 0;

    while let Some(open) = text[offset..].find("{{") {
        let start = offset + open;
        let after = &text[start + 2..];
        let digit_len = after.bytes().take_while(u8::is_ascii_digit).count();
        if digit_len > 0 && after[digit_len..].starts_with("}}") {
            if let Ok(number) = after[..digit_len].parse::<u32>() {
                let end = start + 2 + digit_len + 2;
                spans.push(Span { start, end, number });
                offset = end;
                continue;
            }
        }
        offset = start + 2;
    }
    spans
}

/// All placeholder numbers in order of appearance, duplicates included.
pub fn scan_placeholders(text: &str) -> Vec<u32> {
    scan_spans(text).iter().map(|span| span.number).collect()
}

fn distinct_in_order(numbers: &[u32]) -> Vec<u32> {
    let mut seen = Vec::new();
    for &number in numbers {
        if !seen.contains(&number) {
            seen.push(number);
        }
    }
    seen
}

/// Text with every placeholder removed, used for the density check.
fn strip_placeholders(text: &str) -> String {
    let spans = scan_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in &spans {
        out.push_str(&text[last..span.start]);
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Validate body text against the placeholder rules.
///
/// Errors (blocking):
/// - the sorted-deduplicated placeholder set must be exactly `1..=K`;
/// - the trimmed text must not begin with `{{` nor end with `}}`.
///
/// Warning (non-blocking): more than [`VARIABLE_DENSITY_COUNT`] distinct
/// variables while the literal text is under
/// [`VARIABLE_DENSITY_MIN_LITERAL`] characters.
pub fn validate_body(text: &str) -> VariableReport {
    let occurrences = scan_placeholders(text);
    let placeholders = distinct_in_order(&occurrences);

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut sorted = placeholders.clone();
    sorted.sort_unstable();
    let sequential = sorted
        .iter()
        .enumerate()
        .all(|(idx, &number)| number == idx as u32 + 1);
    if !sequential {
        errors.push(ValidationError::PlaceholdersNotSequential { found: sorted });
    }

    let trimmed = text.trim();
    if trimmed.starts_with("{{") {
        errors.push(ValidationError::StartsWithPlaceholder);
    }
    if trimmed.ends_with("}}") {
        errors.push(ValidationError::EndsWithPlaceholder);
    }

    if placeholders.len() > VARIABLE_DENSITY_COUNT {
        let literal_chars = strip_placeholders(text).chars().count();
        if literal_chars < VARIABLE_DENSITY_MIN_LITERAL {
            warnings.push(ValidationWarning::TooManyVariables {
                count: placeholders.len(),
                literal_chars,
            });
        }
    }

    VariableReport {
        placeholders,
        errors,
        warnings,
    }
}

/// Rewrite placeholders to be sequential from 1, preserving the relative
/// order of first appearance (and therefore reuse).
///
/// `"Hi {{3}}, order {{7}} for {{3}}"` becomes
/// `"Hi {{1}}, order {{2}} for {{1}}"`.
pub fn renumber_placeholders(text: &str) -> String {
    let spans = scan_spans(text);
    let distinct = distinct_in_order(&spans.iter().map(|s| s.number).collect::<Vec<_>>());
    let mapping: BTreeMap<u32, u32> = distinct
        .iter()
        .enumerate()
        .map(|(idx, &number)| (number, idx as u32 + 1))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in &spans {
        out.push_str(&text[last..span.start]);
        out.push_str("{{");
        // Every scanned number is a mapping key.
        let renumbered = mapping.get(&span.number).copied().unwrap_or(span.number);
        out.push_str(&renumbered.to_string());
        out.push_str("}}");
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}

/// Auto-assigned preview value for each detected variable: `"Sample N"`.
pub fn sample_values(text: &str) -> BTreeMap<u32, String> {
    let occurrences = scan_placeholders(text);
    distinct_in_order(&occurrences)
        .into_iter()
        .map(|number| (number, format!("Sample {number}")))
        .collect()
}

/// Substitute `values` into `text`. Placeholders without a value are left
/// untouched.
pub fn render_preview(text: &str, values: &BTreeMap<u32, String>) -> String {
    let spans = scan_spans(text);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in &spans {
        out.push_str(&text[last..span.start]);
        match values.get(&span.number) {
            Some(value) => out.push_str(value),
            None => out.push_str(&text[span.start..span.end]),
        }
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_pure_and_idempotent() {
        let text = "Hello {{1}}, your order {{2}} is ready";
        let first = validate_body(text);
        let second = validate_body(text);
        assert_eq!(first, second);
        assert!(first.is_valid());
        assert_eq!(first.placeholders, vec![1, 2]);
    }

    #[test]
    fn sequential_placeholders_are_valid() {
        assert!(validate_body("Hello {{1}}, your order {{2}} is ready").is_valid());
        assert!(validate_body("no variables at all").is_valid());
    }

    #[test]
    fn gaps_in_numbering_are_rejected() {
        let report = validate_body("Hello {{1}}, order {{3}}");
        assert_eq!(
            report.errors,
            vec![ValidationError::PlaceholdersNotSequential { found: vec![1, 3] }]
        );

        // Numbering must start at 1.
        let report = validate_body("order {{2}} shipped to {{3}} today");
        assert!(!report.is_valid());
    }

    #[test]
    fn zero_is_not_a_valid_placeholder_number() {
        let report = validate_body("hi {{0}} there");
        assert_eq!(
            report.errors,
            vec![ValidationError::PlaceholdersNotSequential { found: vec![0] }]
        );
    }

    #[test]
    fn reused_placeholders_are_valid() {
        let report = validate_body("code {{1}} and {{1}} again, plus {{2}} ok");
        assert!(report.is_valid());
        assert_eq!(report.placeholders, vec![1, 2]);
    }

    #[test]
    fn dangling_placeholders_are_rejected() {
        let report = validate_body("{{1}} hello");
        assert_eq!(report.errors, vec![ValidationError::StartsWithPlaceholder]);

        let report = validate_body("hello {{1}}");
        assert_eq!(report.errors, vec![ValidationError::EndsWithPlaceholder]);

        assert!(validate_body("hello {{1}} world").is_valid());

        // Surrounding whitespace does not hide the violation.
        let report = validate_body("  {{1}} hello  ");
        assert_eq!(report.errors, vec![ValidationError::StartsWithPlaceholder]);
    }

    #[test]
    fn malformed_tokens_are_literal_text() {
        let report = validate_body("brace {{}} and {{x}} and {1} stay literal");
        assert!(report.is_valid());
        assert!(report.placeholders.is_empty());

        // An unmatched open brace before a real placeholder.
        let report = validate_body("a {{ b {{1}} c");
        assert_eq!(report.placeholders, vec![1]);
    }

    #[test]
    fn density_warning_fires_only_when_literal_text_is_short() {
        let dense = "a {{1}} {{2}} {{3}} {{4}} {{5}} {{6}} b";
        let report = validate_body(dense);
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            vec![ValidationWarning::TooManyVariables {
                count: 6,
                literal_chars: dense.chars().count() - 6 * 5,
            }]
        );

        let padding = "x".repeat(120);
        let roomy = format!("{padding} {{{{1}}}} {{{{2}}}} {{{{3}}}} {{{{4}}}} {{{{5}}}} {{{{6}}}} end");
        let report = validate_body(&roomy);
        assert!(report.warnings.is_empty());

        // Five distinct variables never warn.
        let report = validate_body("a {{1}} {{2}} {{3}} {{4}} {{5}} b");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn renumbering_preserves_first_appearance_order_and_reuse() {
        assert_eq!(
            renumber_placeholders("Hi {{3}}, order {{7}} for {{3}}"),
            "Hi {{1}}, order {{2}} for {{1}}"
        );
        assert_eq!(renumber_placeholders("untouched text"), "untouched text");
        assert_eq!(
            renumber_placeholders("{{2}}{{2}}{{1}}"),
            "{{1}}{{1}}{{2}}"
        );
    }

    #[test]
    fn sample_values_follow_placeholder_numbers() {
        let values = sample_values("Hi {{2}}, {{1}} is ready");
        assert_eq!(values.get(&1).map(String::as_str), Some("Sample 1"));
        assert_eq!(values.get(&2).map(String::as_str), Some("Sample 2"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn preview_substitutes_known_values_and_keeps_unknown_tokens() {
        let mut values = BTreeMap::new();
        values.insert(1, "Ada".to_owned());
        assert_eq!(
            render_preview("Hi {{1}}, order {{2}}", &values),
            "Hi Ada, order {{2}}"
        );
    }
}
