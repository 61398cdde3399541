/// Dashboard navigation labels for one UI locale
#[derive(Debug, Clone)]
pub struct UiStrings {
    pub welcome: &'static str,
    pub news: &'static str,
    pub gallery: &'static str,
    pub opportunities: &'static str,
    pub faq: &'static str,
    pub contact: &'static str,
    pub settings: &'static str,
    pub logout: &'static str,
}

pub const ENGLISH_UI: UiStrings = UiStrings {
    welcome: "Welcome to Admin Panel",
    news: "News",
    gallery: "Gallery",
    opportunities: "Opportunities",
    faq: "FAQ",
    contact: "Contact",
    settings: "Settings",
    logout: "Logout",
};

pub const UZBEK_UI: UiStrings = UiStrings {
    welcome: "Admin Panelga Xush Kelibsiz",
    news: "Yangiliklar",
    gallery: "Galereya",
    opportunities: "Imkoniyatlar",
    faq: "FAQ",
    contact: "Aloqa",
    settings: "Sozlamalar",
    logout: "Chiqish",
};

impl UiStrings {
    /// Strings for a UI locale; anything but "uz" falls back to English.
    pub fn for_locale(locale: &str) -> &'static UiStrings {
        match locale {
            "uz" => &UZBEK_UI,
            _ => &ENGLISH_UI,
        }
    }

    fn by_key(&self, key: &str) -> Option<&'static str> {
        let value = match key {
            "Welcome" => self.welcome,
            "News" => self.news,
            "Gallery" => self.gallery,
            "Opportunities" => self.opportunities,
            "FAQ" => self.faq,
            "Contact" => self.contact,
            "Settings" => self.settings,
            "Logout" => self.logout,
            _ => return None,
        };
        Some(value)
    }

    /// Translate a label key; unknown keys come back verbatim.
    pub fn lookup<'a>(locale: &str, key: &'a str) -> &'a str {
        Self::for_locale(locale)
            .by_key(key)
            .or_else(|| ENGLISH_UI.by_key(key))
            .unwrap_or(key)
    }
}
