//! Wire schema for the bag service. Field names follow the service (Dutch).

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

use crate::design::Design;

/// A submitted design as listed by `GET /bag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub naam: String,
    #[serde(default)]
    pub smaak: String,
    #[serde(default)]
    pub kleur: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "previewImage", default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,
}

impl Bag {
    /// Name shown on the voting card.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.naam.trim().is_empty() { "chipszak" } else { &self.naam }
    }
}

/// Body of `POST /bag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBag {
    pub naam: String,
    pub smaak: String,
    pub kleur: String,
    pub image: String,
    pub preview_image: String,
    pub submitted_by_name: String,
    pub submitted_by_email: String,
}

impl NewBag {
    /// Build the request body from a design snapshot and submitter identity.
    /// A missing preview is sent as an empty string.
    #[must_use]
    pub fn from_design(design: &Design, preview: Option<String>, name: &str, email: &str) -> Self {
        Self {
            naam: design.name.clone(),
            smaak: design.flavor.clone(),
            kleur: design.color.clone(),
            image: design.image.clone().unwrap_or_default(),
            preview_image: preview.unwrap_or_default(),
            submitted_by_name: name.to_owned(),
            submitted_by_email: email.to_owned(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct GuestSessionRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SavedBag {
    #[serde(rename = "_id")]
    pub id: String,
}

/// Error body returned by the service on non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
