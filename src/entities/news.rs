use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{multipart_body, EntityDraft, EntityKind, RequestBody};
use crate::form_data::FormValue;
use crate::i18n::TranslatableText;
use crate::image::{ImageField, ImageResolver, LocalFile};
use crate::validation::{require_text, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<TranslatableText>,
    #[serde(default)]
    pub subtitle: Option<TranslatableText>,
    #[serde(default)]
    pub description: Option<TranslatableText>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug)]
pub struct NewsDraft {
    pub title: TranslatableText,
    pub subtitle: TranslatableText,
    pub description: TranslatableText,
    pub image: ImageField,
    /// `YYYY-MM-DD`
    pub date: String,
    pub category: String,
}

fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Reduce a stored date (plain date or full timestamp) to `YYYY-MM-DD`.
fn normalize_date(raw: &str) -> Option<String> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d").to_string())
}

impl EntityDraft for NewsDraft {
    const KIND: EntityKind = EntityKind::News;
    type Record = NewsRecord;

    fn blank(images: &ImageResolver) -> Self {
        Self {
            title: TranslatableText::blank(),
            subtitle: TranslatableText::blank(),
            description: TranslatableText::blank(),
            image: images.field(),
            date: today(),
            category: String::new(),
        }
    }

    fn from_record(record: NewsRecord, images: &ImageResolver) -> Self {
        Self {
            title: record.title.unwrap_or_else(TranslatableText::blank),
            subtitle: record.subtitle.unwrap_or_else(TranslatableText::blank),
            description: record.description.unwrap_or_else(TranslatableText::blank),
            image: images.field_from_path(record.image.as_deref().filter(|s| !s.is_empty())),
            date: record
                .date
                .as_deref()
                .and_then(normalize_date)
                .unwrap_or_else(today),
            category: record.category.unwrap_or_default(),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(self.title.validate("title", true));
        errors.check(self.subtitle.validate("subtitle", true));
        errors.check(self.description.validate("description", true));
        errors.check(self.image.validate(true));
        errors.check(require_text("category", &self.category));
        errors
    }

    fn body(&self) -> RequestBody {
        let fields = FormValue::mapping(vec![
            ("title", self.title.to_form_value()),
            ("subtitle", self.subtitle.to_form_value()),
            ("description", self.description.to_form_value()),
            ("date", FormValue::text(&self.date)),
            ("category", FormValue::text(&self.category)),
        ]);
        multipart_body(fields, self.image.value())
    }

    fn attach_image(&mut self, file: LocalFile) {
        self.image.set_from_file(file);
    }
}
