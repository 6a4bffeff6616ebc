use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const FIELD_TITLE: &str = "title";
pub const FIELD_PROBLEM: &str = "problem";
pub const FIELD_SOLUTION: &str = "solution";
pub const FIELD_RESOURCES: &str = "resources";
pub const FIELD_CATEGORY: &str = "category";

/// Fields that must be present and non-empty before an idea leaves the gateway.
pub const REQUIRED_FIELDS: [&str; 4] = [FIELD_TITLE, FIELD_PROBLEM, FIELD_SOLUTION, FIELD_CATEGORY];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    FinTech,
    CivicTech,
    Logistics,
    Infrastructure,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::FinTech => "FinTech",
            Category::CivicTech => "CivicTech",
            Category::Logistics => "Logistics",
            Category::Infrastructure => "Infrastructure",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped form input as it arrives from a browser form or a front end.
///
/// Values are kept verbatim; nothing is trimmed or checked here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFields(BTreeMap<String, String>);

impl RawFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Required fields that are absent or empty, in declaration order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|field| self.get(field).map_or(true, str::is_empty))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for RawFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Normalized record handed to the external record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaPayload {
    pub title: String,
    pub problem: String,
    pub solution: String,
    pub resources: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_on: Option<NaiveDate>,
}
