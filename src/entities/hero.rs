use serde::{Deserialize, Serialize};

use super::{multipart_body, EntityDraft, EntityKind, RequestBody};
use crate::form_data::FormValue;
use crate::i18n::TranslatableText;
use crate::image::{ImageField, ImageResolver, LocalFile};
use crate::validation::{non_negative, optional_url, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<TranslatableText>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub button_link: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// A slide of the landing-page hero carousel
#[derive(Debug)]
pub struct HeroDraft {
    pub title: TranslatableText,
    pub image: ImageField,
    /// Empty means no button
    pub button_link: String,
    pub order: i64,
    pub is_active: bool,
}

impl EntityDraft for HeroDraft {
    const KIND: EntityKind = EntityKind::Hero;
    type Record = HeroRecord;

    fn blank(images: &ImageResolver) -> Self {
        Self {
            title: TranslatableText::blank(),
            image: images.field(),
            button_link: String::new(),
            order: 0,
            is_active: true,
        }
    }

    fn from_record(record: HeroRecord, images: &ImageResolver) -> Self {
        Self {
            title: record.title.unwrap_or_else(TranslatableText::blank),
            image: images.field_from_path(record.image.as_deref().filter(|s| !s.is_empty())),
            button_link: record.button_link.unwrap_or_default(),
            order: record.order.unwrap_or(0),
            is_active: record.is_active.unwrap_or(true),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(self.title.validate("title", true));
        errors.check(self.image.validate(true));
        errors.check(optional_url("buttonLink", &self.button_link));
        errors.check(non_negative("order", self.order));
        errors
    }

    fn body(&self) -> RequestBody {
        let fields = FormValue::mapping(vec![
            ("title", self.title.to_form_value()),
            ("buttonLink", FormValue::text(&self.button_link)),
            ("order", FormValue::integer(self.order)),
            ("isActive", FormValue::bool(self.is_active)),
        ]);
        multipart_body(fields, self.image.value())
    }

    fn attach_image(&mut self, file: LocalFile) {
        self.image.set_from_file(file);
    }
}
