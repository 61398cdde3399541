use serde::{Deserialize, Serialize};

use super::{EntityDraft, EntityKind, RequestBody};
use crate::i18n::TranslatableText;
use crate::image::ImageResolver;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub question: Option<TranslatableText>,
    #[serde(default)]
    pub answer: Option<TranslatableText>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqDraft {
    pub question: TranslatableText,
    pub answer: TranslatableText,
}

impl EntityDraft for FaqDraft {
    const KIND: EntityKind = EntityKind::Faq;
    type Record = FaqRecord;

    fn blank(_images: &ImageResolver) -> Self {
        Self {
            question: TranslatableText::blank(),
            answer: TranslatableText::blank(),
        }
    }

    fn from_record(record: FaqRecord, _images: &ImageResolver) -> Self {
        Self {
            question: record.question.unwrap_or_else(TranslatableText::blank),
            answer: record.answer.unwrap_or_else(TranslatableText::blank),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(self.question.validate("question", true));
        errors.check(self.answer.validate("answer", true));
        errors
    }

    fn body(&self) -> RequestBody {
        RequestBody::Json(serde_json::json!({
            "question": self.question,
            "answer": self.answer,
        }))
    }
}
