use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, WikitrackError};

fn entity_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[QPL][1-9][0-9]*$").expect("valid entity id regex"))
}

/// Validated Wikidata identifier (`Q42`, `P31`, `L7`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Parse user input; surrounding whitespace and lower-case prefixes are accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let normalized = input.trim().to_uppercase();
        if !entity_id_pattern().is_match(&normalized) {
            return Err(WikitrackError::InvalidEntityId {
                value: input.to_string(),
            });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title of the wiki page holding this entity. Items live in the main
    /// namespace; properties and lexemes in their own.
    pub fn page_title(&self) -> String {
        match self.0.as_bytes().first() {
            Some(b'P') => format!("Property:{}", self.0),
            Some(b'L') => format!("Lexeme:{}", self.0),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A label or description in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub language: String,
    pub value: String,
}

/// Metadata about an entity: labels, descriptions and raw claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetails {
    pub id: EntityId,
    #[serde(default)]
    pub labels: BTreeMap<String, LocalizedText>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, LocalizedText>,
    /// Claims keyed by property id; the claim bodies are kept opaque.
    #[serde(default)]
    pub claims: BTreeMap<String, Vec<serde_json::Value>>,
}

impl EntityDetails {
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(|t| t.value.as_str())
    }

    pub fn description(&self, language: &str) -> Option<&str> {
        self.descriptions.get(language).map(|t| t.value.as_str())
    }

    /// Total number of statements across all properties.
    pub fn statement_count(&self) -> usize {
        self.claims.values().map(Vec::len).sum()
    }
}
