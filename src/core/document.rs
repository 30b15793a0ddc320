//! Drawing documents and their on-disk metadata record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Name given to documents saved without one
pub const UNTITLED: &str = "Untitled";

/// Where a document was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Local,
}

/// A drawing document
///
/// Serializes to the metadata record stored in `<id>.i.json`. The content
/// payload lives in its own file and is never part of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    /// Nominal creator, not authenticated
    #[serde(rename = "userId", default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
    /// Serialized drawing, opaque to the store
    #[serde(skip)]
    pub content: String,
    /// Encoded preview image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(skip)]
    pub location: Location,
}

impl Document {
    /// Create a new document with a freshly generated id
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_id(new_id(), owner, name)
    }

    /// Create a document for a known id
    pub fn with_id(id: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            owner: owner.into(),
            name: if name.is_empty() { UNTITLED.to_string() } else { name },
            content: String::new(),
            thumbnail: None,
            created_at: None,
            updated_at: None,
            is_public: false,
            location: Location::Local,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the preview image. An empty string clears it.
    pub fn thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into()).filter(|t| !t.is_empty());
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Copy of this document under a new id, with timestamps cleared
    pub fn duplicate(&self, name: Option<&str>) -> Self {
        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} (Copy)", self.name),
        };
        Self {
            id: new_id(),
            name,
            created_at: None,
            updated_at: None,
            ..self.clone()
        }
    }

    /// Decode a metadata record, leaving content empty
    pub fn from_metadata(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Encode the metadata record
    pub fn to_metadata(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Incoming save request, where everything but the owner may be omitted
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

impl From<SaveRequest> for Document {
    fn from(req: SaveRequest) -> Self {
        let id = req.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id);
        let mut doc = Document::with_id(id, req.user_id, req.name.unwrap_or_default());
        doc.content = req.data.unwrap_or_default();
        doc.thumbnail = req.thumbnail.filter(|t| !t.is_empty());
        doc.is_public = req.is_public.unwrap_or(false);
        doc
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Records written by older clients carry `""` for unset timestamps.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
    }
}
