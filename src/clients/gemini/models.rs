#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GeminiModel {
    #[default]
    Flash,       // "gemini-2.5-flash"
    FlashLite,   // "gemini-2.5-flash-lite"
    Pro,         // "gemini-2.5-pro"
    Override(String),
}

impl GeminiModel {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Flash => "gemini-2.5-flash",
            Self::FlashLite => "gemini-2.5-flash-lite",
            Self::Pro => "gemini-2.5-pro",
            Self::Override(s) => s.as_str(),
        }
    }

    /// Map a configured model identifier onto a known variant where possible.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id.trim() {
            "gemini-2.5-flash" => Self::Flash,
            "gemini-2.5-flash-lite" => Self::FlashLite,
            "gemini-2.5-pro" => Self::Pro,
            other => Self::Override(other.to_string()),
        }
    }
}
