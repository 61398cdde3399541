use serde::{Deserialize, Serialize};

use super::{multipart_body, EntityDraft, EntityKind, RequestBody};
use crate::form_data::FormValue;
use crate::i18n::TranslatableText;
use crate::image::{ImageField, ImageResolver, LocalFile};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<TranslatableText>,
    #[serde(default)]
    pub subtitle: Option<TranslatableText>,
    #[serde(default)]
    pub description: Option<TranslatableText>,
    #[serde(default)]
    pub details: Option<TranslatableText>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug)]
pub struct OpportunityDraft {
    pub title: TranslatableText,
    pub subtitle: TranslatableText,
    pub description: TranslatableText,
    pub details: TranslatableText,
    pub image: ImageField,
}

impl EntityDraft for OpportunityDraft {
    const KIND: EntityKind = EntityKind::Opportunities;
    type Record = OpportunityRecord;

    fn blank(images: &ImageResolver) -> Self {
        Self {
            title: TranslatableText::blank(),
            subtitle: TranslatableText::blank(),
            description: TranslatableText::blank(),
            details: TranslatableText::blank(),
            image: images.field(),
        }
    }

    fn from_record(record: OpportunityRecord, images: &ImageResolver) -> Self {
        Self {
            title: record.title.unwrap_or_else(TranslatableText::blank),
            subtitle: record.subtitle.unwrap_or_else(TranslatableText::blank),
            description: record.description.unwrap_or_else(TranslatableText::blank),
            details: record.details.unwrap_or_else(TranslatableText::blank),
            image: images.field_from_path(record.image.as_deref().filter(|s| !s.is_empty())),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(self.title.validate("title", true));
        errors.check(self.subtitle.validate("subtitle", true));
        errors.check(self.description.validate("description", true));
        errors.check(self.details.validate("details", true));
        errors.check(self.image.validate(true));
        errors
    }

    fn body(&self) -> RequestBody {
        let fields = FormValue::mapping(vec![
            ("title", self.title.to_form_value()),
            ("subtitle", self.subtitle.to_form_value()),
            ("description", self.description.to_form_value()),
            ("details", self.details.to_form_value()),
        ]);
        multipart_body(fields, self.image.value())
    }

    fn attach_image(&mut self, file: LocalFile) {
        self.image.set_from_file(file);
    }
}
