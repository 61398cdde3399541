use serde::{Deserialize, Serialize};

use super::{multipart_body, EntityDraft, EntityKind, RequestBody};
use crate::form_data::FormValue;
use crate::i18n::TranslatableText;
use crate::image::{ImageField, ImageResolver, LocalFile};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<TranslatableText>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug)]
pub struct GalleryDraft {
    pub title: TranslatableText,
    pub image: ImageField,
}

impl EntityDraft for GalleryDraft {
    const KIND: EntityKind = EntityKind::Gallery;
    type Record = GalleryRecord;

    fn blank(images: &ImageResolver) -> Self {
        Self {
            title: TranslatableText::blank(),
            image: images.field(),
        }
    }

    fn from_record(record: GalleryRecord, images: &ImageResolver) -> Self {
        Self {
            title: record.title.unwrap_or_else(TranslatableText::blank),
            image: images.field_from_path(record.image.as_deref().filter(|s| !s.is_empty())),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(self.title.validate("title", true));
        errors.check(self.image.validate(true));
        errors
    }

    fn body(&self) -> RequestBody {
        let fields = FormValue::mapping(vec![("title", self.title.to_form_value())]);
        multipart_body(fields, self.image.value())
    }

    fn attach_image(&mut self, file: LocalFile) {
        self.image.set_from_file(file);
    }
}
