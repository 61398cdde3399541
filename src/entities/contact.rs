use serde::{Deserialize, Serialize};

use super::{EntityDraft, EntityKind, RequestBody};
use crate::image::ImageResolver;
use crate::validation::{require_email, require_text, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub working_hours: Option<String>,
    #[serde(default)]
    pub map_url: Option<String>,
}

/// Contact details shown on the public site.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub working_hours: String,
    pub map_url: String,
}

impl EntityDraft for ContactDraft {
    const KIND: EntityKind = EntityKind::Contact;
    type Record = ContactRecord;

    fn blank(_images: &ImageResolver) -> Self {
        Self::default()
    }

    fn from_record(record: ContactRecord, _images: &ImageResolver) -> Self {
        Self {
            address: record.address.unwrap_or_default(),
            phone: record.phone.unwrap_or_default(),
            email: record.email.unwrap_or_default(),
            working_hours: record.working_hours.unwrap_or_default(),
            map_url: record.map_url.unwrap_or_default(),
        }
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.check(require_text("address", &self.address));
        errors.check(require_text("phone", &self.phone));
        errors.check(require_email("email", &self.email));
        errors.check(require_text("workingHours", &self.working_hours));
        errors.check(require_text("mapUrl", &self.map_url));
        errors
    }

    fn body(&self) -> RequestBody {
        // Serializing a struct of plain strings cannot fail
        RequestBody::Json(serde_json::to_value(self).unwrap_or_default())
    }
}
