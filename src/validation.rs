//! Client-side validation of drafts.
//!
//! Validation runs before any network call. Each error is scoped to one field
//! and, for translatable fields, to one language, so a form can flag the
//! exact language tab that needs attention.

use crate::i18n::Language;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Required,
    InvalidEmail,
    TooShort { min: usize },
    WrongLength { expected: usize },
    InvalidUrl,
    Negative,
    /// Value must equal the named field (password confirmation)
    Mismatch { other: String },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Required => write!(f, "required"),
            Reason::InvalidEmail => write!(f, "invalid email"),
            Reason::TooShort { min } => write!(f, "must be at least {} characters", min),
            Reason::WrongLength { expected } => write!(f, "must be exactly {} characters", expected),
            Reason::InvalidUrl => write!(f, "invalid URL"),
            Reason::Negative => write!(f, "must not be negative"),
            Reason::Mismatch { other } => write!(f, "does not match {}", other),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    /// Set for translatable fields only
    pub lang: Option<Language>,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(field: &str, reason: Reason) -> Self {
        Self {
            field: field.to_string(),
            lang: None,
            reason,
        }
    }

    pub fn for_language(field: &str, lang: Language, reason: Reason) -> Self {
        Self {
            field: field.to_string(),
            lang: Some(lang),
            reason,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lang {
            Some(lang) => write!(f, "{} ({}): {}", self.field, lang, self.reason),
            None => write!(f, "{}: {}", self.field, self.reason),
        }
    }
}

/// All validation failures of one draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed: {}", summary(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

fn summary(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the outcome of a single-field check.
    pub fn check(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn for_field(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// Whether `field` has an error in `lang` (the per-tab indicator).
    pub fn has_error(&self, field: &str, lang: Language) -> bool {
        self.errors
            .iter()
            .any(|e| e.field == field && e.lang == Some(lang))
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

// ==================== Rule Helpers ====================

/// Non-empty; whitespace counts as content, the same rule translatable
/// fields use.
pub fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, Reason::Required));
    }
    Ok(())
}

pub fn require_email(field: &str, value: &str) -> Result<(), ValidationError> {
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
    if !regex.is_match(value) {
        return Err(ValidationError::new(field, Reason::InvalidEmail));
    }
    Ok(())
}

/// Length is counted in characters, not bytes.
pub fn min_chars(field: &str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::new(field, Reason::TooShort { min }));
    }
    Ok(())
}

pub fn exact_chars(field: &str, value: &str, expected: usize) -> Result<(), ValidationError> {
    if value.chars().count() != expected {
        return Err(ValidationError::new(field, Reason::WrongLength { expected }));
    }
    Ok(())
}

/// Empty is accepted; anything else must be an absolute URL.
pub fn optional_url(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    match reqwest::Url::parse(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new(field, Reason::InvalidUrl)),
    }
}

pub fn non_negative(field: &str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(field, Reason::Negative));
    }
    Ok(())
}
