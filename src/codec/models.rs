use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported models, in display order. The first entry is the decode default.
pub const AI_MODELS: [&str; 4] = ["z-image", "flux", "nano banana", "豆包"];

pub const DEFAULT_CATEGORIES: [&str; 6] = ["风景", "人物", "艺术", "科幻", "动漫", "其他"];

/// Category used when an issue carries none.
pub const FALLBACK_CATEGORY: &str = "其他";

/// Image generation model a prompt targets.
///
/// Names outside the supported list are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AiModel {
    ZImage,
    Flux,
    NanoBanana,
    Doubao,
    Other(String),
}

impl AiModel {
    pub fn parse(s: &str) -> Self {
        match s {
            "z-image" => AiModel::ZImage,
            "flux" => AiModel::Flux,
            "nano banana" => AiModel::NanoBanana,
            "豆包" => AiModel::Doubao,
            other => AiModel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AiModel::ZImage => AI_MODELS[0],
            AiModel::Flux => AI_MODELS[1],
            AiModel::NanoBanana => AI_MODELS[2],
            AiModel::Doubao => AI_MODELS[3],
            AiModel::Other(name) => name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AiModel::Other(_))
    }

    pub fn supported() -> Vec<AiModel> {
        AI_MODELS.iter().map(|m| AiModel::parse(m)).collect()
    }
}

impl Default for AiModel {
    fn default() -> Self {
        AiModel::parse(AI_MODELS[0])
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for AiModel {
    fn from(s: String) -> Self {
        AiModel::parse(&s)
    }
}

impl From<AiModel> for String {
    fn from(model: AiModel) -> Self {
        model.as_str().to_string()
    }
}

/// A gallery entry, projected from exactly one open issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub number: u64,
    pub title: String,
    pub model: AiModel,
    pub category: String,
    pub prompt: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub created_at: String,
    pub author: String,
}

impl Prompt {
    /// Calendar date of `created_at`, which is either a bare `YYYY-MM-DD`
    /// from the header or the issue's RFC 3339 timestamp.
    pub fn created_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.created_at, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(&self.created_at)
                    .ok()
                    .map(|dt| dt.date_naive())
            })
    }
}

/// A prompt that has not been written to the tracker yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewPrompt {
    pub title: String,
    pub model: AiModel,
    pub category: String,
    pub prompt: String,
    pub image_url: Option<String>,
    /// Stored comma-joined, so a tag may not itself contain a comma.
    pub tags: Vec<String>,
}

impl NewPrompt {
    /// Reject values the issue header cannot hold.
    pub fn validate(&self) -> Result<()> {
        let single_line = [
            ("title", self.title.as_str()),
            ("model", self.model.as_str()),
            ("category", self.category.as_str()),
            ("image_url", self.image_url.as_deref().unwrap_or("")),
        ];
        for (field, value) in single_line {
            if value.contains(['\r', '\n']) {
                return Err(Error::InvalidInput(format!(
                    "{field} must be a single line"
                )));
            }
        }

        if let Some(tag) = self.tags.iter().find(|t| t.contains([',', '\r', '\n'])) {
            return Err(Error::InvalidInput(format!(
                "tag '{}' may not contain a comma or line break",
                tag.escape_debug()
            )));
        }

        Ok(())
    }
}

/// The fields of a GitHub issue the codec reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: String,
}

/// Issue payload produced by `encode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}
