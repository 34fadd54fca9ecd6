//! Known recognizer models and where to fetch them.
//!
//! Mirrors the published Vosk model index at <https://alphacephei.com/vosk/models>.
//! Install names are stable short codes; the archives carry versioned
//! directory names that the fetch step renames away.

/// Rough size class: small models run comfortably on laptops, large ones
/// want a few gigabytes of RAM in exchange for accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelClass {
    Small,
    Large,
}

impl ModelClass {
    pub fn label(self) -> &'static str {
        match self {
            ModelClass::Small => "small",
            ModelClass::Large => "large",
        }
    }
}

/// One downloadable model.
#[derive(Debug, Clone, Copy)]
pub struct ModelSpec {
    pub name: &'static str,
    pub language: &'static str,
    pub class: ModelClass,
    pub url: &'static str,
}

/// Every model the setup tool knows how to install.
pub fn catalog() -> &'static [ModelSpec] {
    CATALOG
}

impl ModelSpec {
    pub fn find(name: &str) -> Option<&'static ModelSpec> {
        CATALOG.iter().find(|spec| spec.name == name)
    }
}

const CATALOG: &[ModelSpec] = &[
    ModelSpec {
        name: "en-us-small",
        language: "English (US)",
        class: ModelClass::Small,
        url: "https://alphacephei.com/vosk/models/vosk-model-small-en-us-0.15.zip",
    },
    ModelSpec {
        name: "en-us-large",
        language: "English (US)",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-en-us-0.22.zip",
    },
    ModelSpec {
        name: "en-in-small",
        language: "English (India)",
        class: ModelClass::Small,
        url: "https://alphacephei.com/vosk/models/vosk-model-small-en-in-0.4.zip",
    },
    ModelSpec {
        name: "en-in-large",
        language: "English (India)",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-en-in-0.5.zip",
    },
    ModelSpec {
        name: "hi-small",
        language: "Hindi",
        class: ModelClass::Small,
        url: "https://alphacephei.com/vosk/models/vosk-model-small-hi-0.22.zip",
    },
    ModelSpec {
        name: "hi-large",
        language: "Hindi",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-hi-0.22.zip",
    },
    ModelSpec {
        name: "ta-small",
        language: "Tamil",
        class: ModelClass::Small,
        url: "https://alphacephei.com/vosk/models/vosk-model-small-ta-0.1.zip",
    },
    ModelSpec {
        name: "te-small",
        language: "Telugu",
        class: ModelClass::Small,
        url: "https://alphacephei.com/vosk/models/vosk-model-small-te-0.4.zip",
    },
    ModelSpec {
        name: "gu-small",
        language: "Gujarati",
        class: ModelClass::Small,
        url: "https://alphacephei.com/vosk/models/vosk-model-small-gu-0.42.zip",
    },
    ModelSpec {
        name: "cn-large",
        language: "Chinese",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-cn-0.22.zip",
    },
    ModelSpec {
        name: "ru-large",
        language: "Russian",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-ru-0.42.zip",
    },
    ModelSpec {
        name: "fr-large",
        language: "French",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-fr-0.22.zip",
    },
    ModelSpec {
        name: "de-large",
        language: "German",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-de-0.21.zip",
    },
    ModelSpec {
        name: "es-large",
        language: "Spanish",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-es-0.42.zip",
    },
    ModelSpec {
        name: "pt-large",
        language: "Portuguese",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-pt-fb-v0.1.1-20220516_2113.zip",
    },
    ModelSpec {
        name: "it-large",
        language: "Italian",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-it-0.22.zip",
    },
    ModelSpec {
        name: "ja-large",
        language: "Japanese",
        class: ModelClass::Large,
        url: "https://alphacephei.com/vosk/models/vosk-model-ja-0.22.zip",
    },
];
