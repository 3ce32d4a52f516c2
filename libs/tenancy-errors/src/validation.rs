//! Field validators applied explicitly before a write.
//!
//! Services call these on their input and turn the collected
//! [`ValidationViolation`]s into a 422 problem; nothing runs implicitly.

use crate::problem::ValidationViolation;

/// Characters rejected by [`Rule::NoSpecialChars`].
pub const SPECIAL_CHARS: &str = "\\|!#$%&/()=?\u{bb}\u{ab}@\u{a3}\u{a7}\u{20ac}{}.-;'<>_,";

/// A single check on a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule<'a> {
    /// Not empty after trimming.
    NotEmpty,
    /// None of [`SPECIAL_CHARS`], except those listed in `allow`.
    NoSpecialChars { allow: &'a str },
    /// Only letters and digits.
    LetterOrDigit,
    NoWhitespace,
    /// At most this many characters.
    MaxLen(usize),
}

impl Rule<'_> {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Rule::NotEmpty => "not_empty",
            Rule::NoSpecialChars { .. } => "no_special_chars",
            Rule::LetterOrDigit => "letter_or_digit",
            Rule::NoWhitespace => "no_whitespace",
            Rule::MaxLen(_) => "max_len",
        }
    }

    /// Apply the rule, returning a violation for `field` if `value` fails it.
    #[must_use]
    pub fn check(self, field: &str, value: &str) -> Option<ValidationViolation> {
        let message = match self {
            Rule::NotEmpty if value.trim().is_empty() => format!("{field} must not be empty"),
            Rule::NoSpecialChars { allow } if has_special_char(value, allow) => {
                format!("{field} can not contain any special characters")
            }
            Rule::LetterOrDigit if !value.chars().all(char::is_alphanumeric) => {
                format!("{field} can only contain letters or digits")
            }
            Rule::NoWhitespace if value.chars().any(char::is_whitespace) => {
                format!("{field} can not contain spaces")
            }
            Rule::MaxLen(max) if value.chars().count() > max => {
                format!("{field} must be at most {max} characters")
            }
            _ => return None,
        };
        Some(ValidationViolation::new(field, message).with_code(self.code()))
    }
}

/// True if `value` contains a special character not listed in `allow`.
#[must_use]
pub fn has_special_char(value: &str, allow: &str) -> bool {
    value
        .chars()
        .any(|c| SPECIAL_CHARS.contains(c) && !allow.contains(c))
}

/// Accumulates violations across fields.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Violations(Vec<ValidationViolation>);

impl Violations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every rule against one field. All failures are kept, not just the first.
    pub fn check(&mut self, field: &str, value: &str, rules: &[Rule<'_>]) -> &mut Self {
        self.0
            .extend(rules.iter().filter_map(|rule| rule.check(field, value)));
        self
    }

    pub fn push(&mut self, violation: ValidationViolation) {
        self.0.push(violation);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// # Errors
    /// Returns the collected violations if there are any.
    pub fn into_result(self) -> Result<(), Vec<ValidationViolation>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}
