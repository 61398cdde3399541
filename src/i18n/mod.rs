//! Content languages and translatable values.
//!
//! # Architecture
//!
//! - `registry`: the content languages (Uzbek mandatory, Russian and English optional)
//! - `language`: type-safe Language validated against the registry
//! - `translatable`: one text field held in every content language
//! - `strings`: dashboard navigation labels, looked up by key
//!
//! # Example
//!
//! ```rust,ignore
//! use cms_admin::i18n::{Language, TranslatableText};
//!
//! let mut title = TranslatableText::blank();
//! title.set(Language::UZBEK, "Yangiliklar");
//! title.validate("title", true)?;
//! ```

mod language;
mod registry;
mod strings;
mod translatable;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::UiStrings;
pub use translatable::TranslatableText;
