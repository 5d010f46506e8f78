use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::format_date;

/// Subjects offered by the upload form.
pub const SUBJECTS: &[&str] = &[
    "Computer Science",
    "Mathematics",
    "Physics",
    "Chemistry",
    "History",
    "Literature",
    "Web Development",
    "Database Systems",
];

pub const DEFAULT_SUBJECT: &str = "Computer Science";

/// Uploader name shown when the server omits the populated user.
const UNKNOWN_UPLOADER: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uploader {
    #[serde(default)]
    pub name: Option<String>,
}

/// A study resource as listed by `GET /api/materials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "uploadedBy", default)]
    pub uploaded_by: Option<Uploader>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "fileUrl", default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Material {
    pub fn uploader_name(&self) -> &str {
        self.uploaded_by
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_UPLOADER)
    }

    pub fn created_display(&self) -> String {
        self.created_at
            .as_deref()
            .map(format_date)
            .unwrap_or_default()
    }

    /// Absolute download link for an uploaded file, resolved against the API base.
    /// Stored paths are relative to the server root (`uploads/notes.pdf`).
    pub fn download_url(&self, base: &Url) -> Option<Url> {
        let path = self.file_url.as_deref()?;
        base.join(path.trim_start_matches('/')).ok()
    }

    /// Where the resource can be opened: the uploaded file, else the external link.
    pub fn link(&self, base: &Url) -> Option<String> {
        self.download_url(base)
            .map(|u| u.to_string())
            .or_else(|| self.url.clone().filter(|u| !u.is_empty()))
    }
}

/// What an upload carries besides its metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSource {
    File(PathBuf),
    Link(String),
}

/// Payload for `POST /api/materials`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterial {
    pub title: String,
    pub subject: String,
    pub description: String,
    pub source: MaterialSource,
}
