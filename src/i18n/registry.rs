//! Language registry: Single source of truth for the content languages.
//!
//! Every translatable field of every entity is edited in the languages listed
//! here. The registry is a `OnceLock` singleton, initialised on first access.

use std::sync::OnceLock;

/// Configuration for a content language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "uz", "ru", "en")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Native name of the language
    pub native_name: &'static str,

    /// Whether this is the mandatory language of every translatable field
    /// (only one should be true)
    pub is_canonical: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All languages in editing order (canonical first).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the canonical language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not hold exactly one canonical language
    /// (this indicates a configuration error).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }
}

/// Uzbek is mandatory; Russian and English are optional translations.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "uz",
            name: "Uzbek",
            native_name: "O'zbekcha",
            is_canonical: true,
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_canonical: false,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: false,
        },
    ]
}
