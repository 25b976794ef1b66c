//! Wire types for the "on this day" births feed.
//!
//! Upstream fields are loosely typed and frequently partial. Every field here
//! is optional and decodes leniently: a missing or mistyped value becomes
//! `None` instead of failing the whole payload. Validation happens in the
//! normalizer, never past it.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

/// Top-level key holding the births collection.
pub const BIRTHS_FIELD: &str = "births";

/// Description the feed gives to the page that represents the calendar date
/// rather than the person.
pub const DAY_OF_THE_YEAR: &str = "Day of the year";

/// Page type of regular article pages.
pub const STANDARD_PAGE_TYPE: &str = "standard";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBirth {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(
        default,
        deserialize_with = "lenient_elements",
        skip_serializing_if = "Option::is_none"
    )]
    pub pages: Option<Vec<RawPage>>,
}

impl RawBirth {
    /// Decodes one element of the births collection. Anything that is not an
    /// object decodes to an empty item, which the normalizer drops.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub pageid: Option<i64>,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub titles: Option<RawTitles>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<RawImage>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub originalimage: Option<RawImage>,
}

impl RawPage {
    /// True for the sub-record describing the person: a standard page that is
    /// not the "Day of the year" page.
    pub fn is_person_page(&self) -> bool {
        self.page_type.as_deref() == Some(STANDARD_PAGE_TYPE)
            && self.description.as_deref() != Some(DAY_OF_THE_YEAR)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTitles {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImage {
    pub source: String,
    pub width: u32,
    pub height: u32,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`] for arrays, but judges each element on its own: elements
/// that fail to decode are skipped and their siblings kept.
fn lenient_elements<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
    ))
}
