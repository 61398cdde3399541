//! Editable content entities.
//!
//! Every entity exposes a `Record` (the shape the backend returns) and a
//! draft (the form state). Drafts validate themselves and produce the
//! request body for create/update: multipart for entities with an image,
//! JSON for the rest.

mod contact;
mod faq;
mod gallery;
mod hero;
mod news;
mod opportunity;

pub use contact::{ContactDraft, ContactRecord};
pub use faq::{FaqDraft, FaqRecord};
pub use gallery::{GalleryDraft, GalleryRecord};
pub use hero::{HeroDraft, HeroRecord};
pub use news::{NewsDraft, NewsRecord};
pub use opportunity::{OpportunityDraft, OpportunityRecord};

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

use crate::form_data::{encode, FormPayload, FormValue};
use crate::image::{ImageResolver, ImageValue};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    News,
    Gallery,
    Opportunities,
    Faq,
    Contact,
    Hero,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::News,
        EntityKind::Gallery,
        EntityKind::Opportunities,
        EntityKind::Faq,
        EntityKind::Contact,
        EntityKind::Hero,
    ];

    /// REST path segment, also used as the dashboard route segment
    pub fn resource(&self) -> &'static str {
        match self {
            EntityKind::News => "news",
            EntityKind::Gallery => "gallery",
            EntityKind::Opportunities => "opportunities",
            EntityKind::Faq => "faq",
            EntityKind::Contact => "contact",
            EntityKind::Hero => "hero",
        }
    }

    pub fn uses_multipart(&self) -> bool {
        !matches!(self, EntityKind::Faq | EntityKind::Contact)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource())
    }
}

impl FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match EntityKind::ALL.iter().find(|k| k.resource() == s) {
            Some(kind) => Ok(*kind),
            None => bail!("Unknown entity: '{}'", s),
        }
    }
}

/// Body of a create/update request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Multipart(FormPayload),
    Json(serde_json::Value),
}

/// A form draft for one entity kind.
pub trait EntityDraft: Sized {
    const KIND: EntityKind;
    type Record: DeserializeOwned + fmt::Debug + Send;

    /// Defaults for the "new" form.
    fn blank(images: &ImageResolver) -> Self;

    /// Populate the "edit" form from a fetched record.
    fn from_record(record: Self::Record, images: &ImageResolver) -> Self;

    fn validate(&self) -> ValidationErrors;

    fn body(&self) -> RequestBody;

    /// Replace the image with a local file; drafts without an image ignore it.
    fn attach_image(&mut self, _file: crate::image::LocalFile) {}
}

/// Swap the generic image for the key the backend expects: `imageFile` for
/// a local file, `imageUrl` for a URL. `image` itself is never sent.
pub fn image_entry(image: &ImageValue) -> Option<(&'static str, FormValue)> {
    match image {
        ImageValue::None => None,
        ImageValue::RemoteUrl(url) => Some(("imageUrl", FormValue::text(url))),
        ImageValue::LocalFile(file) => Some(("imageFile", FormValue::Binary(file.clone()))),
    }
}

/// Append the image entry to a draft mapping and encode the whole thing.
pub(crate) fn multipart_body(mut fields: FormValue, image: &ImageValue) -> RequestBody {
    if let Some((key, value)) = image_entry(image) {
        fields.insert(key, value);
    }
    RequestBody::Multipart(encode(&fields))
}
