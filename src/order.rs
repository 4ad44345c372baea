//! Order Brief capture
//!
//! Raw form payloads are trimmed and defaulted once; the resulting
//! `OrderBrief` is immutable and only read afterwards.

use serde::{Deserialize, Serialize};

use crate::content_guard::BriefFields;

pub const DEFAULT_LANGUAGE: &str = "magyar";
pub const DEFAULT_FORMAT: &str = "mp3";

/// Instrumentation tags always sent to the generation provider
const BASE_TAGS: &[&str] = &["folk-pop", "piano", "violin", "electronic"];

/// Order form payload as submitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrder {
    pub email: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "style")]
    pub styles: Option<String>,
    #[serde(alias = "vocalist")]
    pub vocal: Option<String>,
    pub language: Option<String>,
    pub brief: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub extra_forbidden: Vec<String>,
}

/// Captured customer brief
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBrief {
    pub email: String,
    pub title: String,
    pub styles: String,
    pub vocal: String,
    pub language: String,
    pub brief: String,
    pub format: String,
    pub names: Vec<String>,
    pub extra_forbidden: Vec<String>,
}

impl OrderBrief {
    /// Free-text fields feeding the Allowed Lexicon
    pub fn lexicon_fields(&self) -> BriefFields<'_> {
        BriefFields {
            brief: &self.brief,
            style: &self.styles,
            vocals: &self.vocal,
            language: &self.language,
            names: &self.names,
        }
    }

    pub fn wants_audio(&self) -> bool {
        self.format == DEFAULT_FORMAT
    }
}

/// Trim every field and apply defaults (`magyar`, `mp3`).
pub fn normalize_order(raw: RawOrder) -> OrderBrief {
    let pick = |v: Option<String>| v.map(|s| s.trim().to_string()).unwrap_or_default();
    let or_default = |v: String, d: &str| if v.is_empty() { d.to_string() } else { v };

    OrderBrief {
        email: pick(raw.email),
        title: pick(raw.title),
        styles: pick(raw.styles),
        vocal: pick(raw.vocal),
        language: or_default(pick(raw.language), DEFAULT_LANGUAGE),
        brief: pick(raw.brief),
        format: or_default(pick(raw.format), DEFAULT_FORMAT).to_lowercase(),
        names: raw
            .names
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
        extra_forbidden: raw
            .extra_forbidden
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect(),
    }
}

// =============================================================================
// SPECIAL MODES
// =============================================================================

/// Song modes inferred from style and vocalist text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpecialModes {
    pub is_child_song: bool,
    pub is_robot: bool,
    pub is_duet: bool,
}

pub fn detect_special_modes(order: &OrderBrief) -> SpecialModes {
    let style = order.styles.to_lowercase();
    let vocal = order.vocal.to_lowercase();
    let has = |t: &str| style.contains(t) || vocal.contains(t);

    SpecialModes {
        is_child_song: has("gyerek") || has("child"),
        is_robot: has("robot"),
        is_duet: has("duett") || has("duet"),
    }
}

/// Vocal mode sent to the generation provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocalMode {
    Female,
    Male,
    Duet,
    Robot,
}

impl VocalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
            Self::Duet => "duet",
            Self::Robot => "robot",
        }
    }
}

pub fn pick_vocal_mode(vocal: &str, modes: &SpecialModes) -> VocalMode {
    if modes.is_robot {
        return VocalMode::Robot;
    }
    if modes.is_duet {
        return VocalMode::Duet;
    }
    let v = vocal.to_lowercase();
    if v.contains("nő") {
        VocalMode::Female
    } else if v.contains("ferfi") || v.contains("férfi") {
        VocalMode::Male
    } else if v.contains("duett") || v.contains("duet") {
        VocalMode::Duet
    } else if v.contains("robot") {
        VocalMode::Robot
    } else {
        VocalMode::Female
    }
}

/// Style tags for the provider, first occurrence wins
pub fn build_tags(styles: &str, modes: &SpecialModes) -> Vec<String> {
    let mut tags: Vec<String> = styles
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    tags.extend(BASE_TAGS.iter().map(|t| t.to_string()));
    if modes.is_child_song {
        tags.push("kids song".to_string());
        tags.push("simple lyrics".to_string());
    }
    if modes.is_robot {
        tags.push("robot voice".to_string());
    }
    if modes.is_duet {
        tags.push("duet".to_string());
    }

    let mut seen = std::collections::HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));
    tags
}

/// Whether the vocal field asks for an instrumental track
pub fn is_instrumental(vocal: &str) -> bool {
    vocal.to_lowercase().contains("instrument")
}
