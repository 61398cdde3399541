//! One logical text field held in every content language.

use crate::form_data::FormValue;
use crate::i18n::Language;
use crate::validation::{Reason, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};

/// Text in Uzbek (mandatory when the owning field is required), Russian and
/// English (both optional).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatableText {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub uz: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ru: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
}

/// A stored `null` reads as an empty string and is left to validation.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl TranslatableText {
    /// Form default: every language present and empty.
    pub fn blank() -> Self {
        Self {
            uz: String::new(),
            ru: Some(String::new()),
            en: Some(String::new()),
        }
    }

    pub fn uz(text: &str) -> Self {
        Self {
            uz: text.to_string(),
            ru: None,
            en: None,
        }
    }

    pub fn get(&self, lang: Language) -> Option<&str> {
        match lang.code() {
            "uz" => Some(self.uz.as_str()),
            "ru" => self.ru.as_deref(),
            _ => self.en.as_deref(),
        }
    }

    pub fn set(&mut self, lang: Language, value: &str) {
        match lang.code() {
            "uz" => self.uz = value.to_string(),
            "ru" => self.ru = Some(value.to_string()),
            _ => self.en = Some(value.to_string()),
        }
    }

    /// Fails on the canonical language only; `ru`/`en` content never matters.
    pub fn validate(&self, field: &str, required: bool) -> Result<(), ValidationError> {
        if required && self.uz.is_empty() {
            return Err(ValidationError::for_language(
                field,
                Language::canonical(),
                Reason::Required,
            ));
        }
        Ok(())
    }

    /// `{uz, ru, en}` mapping; a missing translation becomes `Absent`, which
    /// the encoder emits as an empty string inside the mapping.
    pub fn to_form_value(&self) -> FormValue {
        FormValue::mapping(vec![
            ("uz", FormValue::text(&self.uz)),
            ("ru", self.ru.as_deref().map(FormValue::text).unwrap_or(FormValue::Absent)),
            ("en", self.en.as_deref().map(FormValue::text).unwrap_or(FormValue::Absent)),
        ])
    }
}
