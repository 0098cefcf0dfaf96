use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic category of an edit, inferred from its comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    Labels,
    Descriptions,
    Aliases,
    Statements,
    Qualifiers,
    References,
    Sitelinks,
}

/// Keyword table checked in order against the lower-cased comment.
/// First match wins.
const PROPERTY_KEYWORDS: &[(&str, Property)] = &[
    ("label", Property::Labels),
    ("description", Property::Descriptions),
    ("alias", Property::Aliases),
    ("statement", Property::Statements),
    ("claim", Property::Statements),
    ("qualifier", Property::Qualifiers),
    ("reference", Property::References),
    ("sitelink", Property::Sitelinks),
];

impl Property {
    pub const ALL: [Property; 7] = [
        Property::Labels,
        Property::Descriptions,
        Property::Aliases,
        Property::Statements,
        Property::Qualifiers,
        Property::References,
        Property::Sitelinks,
    ];

    /// Best-effort guess of which part of an entity an edit touched.
    pub fn infer(comment: &str) -> Option<Property> {
        let lower = comment.to_lowercase();
        PROPERTY_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|(_, property)| *property)
    }

    /// Machine name, as used on the command line and in exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Labels => "labels",
            Property::Descriptions => "descriptions",
            Property::Aliases => "aliases",
            Property::Statements => "statements",
            Property::Qualifiers => "qualifiers",
            Property::References => "references",
            Property::Sitelinks => "sitelinks",
        }
    }

    /// Human-readable column label.
    pub fn label(&self) -> &'static str {
        match self {
            Property::Labels => "Labels",
            Property::Descriptions => "Descriptions",
            Property::Aliases => "Aliases",
            Property::Statements => "Statements",
            Property::Qualifiers => "Qualifiers",
            Property::References => "References",
            Property::Sitelinks => "Sitelinks",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Property::ALL
            .iter()
            .find(|p| p.as_str() == wanted)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = Property::ALL.iter().map(|p| p.as_str()).collect();
                format!("unknown property '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

/// Byte size of a revision before and after the edit.
///
/// `diff == new - old` always holds: the fields are private and every
/// constructor (including deserialization) enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSizeChange")]
pub struct SizeChange {
    old: i64,
    new: i64,
    diff: i64,
}

#[derive(Deserialize)]
struct RawSizeChange {
    old: i64,
    new: i64,
    diff: i64,
}

impl TryFrom<RawSizeChange> for SizeChange {
    type Error = String;

    fn try_from(raw: RawSizeChange) -> std::result::Result<Self, Self::Error> {
        if raw.new - raw.old != raw.diff {
            return Err(format!(
                "size diff {} does not match new ({}) - old ({})",
                raw.diff, raw.new, raw.old
            ));
        }
        Ok(Self {
            old: raw.old,
            new: raw.new,
            diff: raw.diff,
        })
    }
}

impl SizeChange {
    /// Build from the sizes before and after the edit.
    pub fn from_sizes(old: i64, new: i64) -> Self {
        Self {
            old,
            new,
            diff: new - old,
        }
    }

    /// Build from the size after the edit and the signed delta.
    pub fn from_new_and_diff(new: i64, diff: i64) -> Self {
        Self {
            old: new - diff,
            new,
            diff,
        }
    }

    pub fn old(&self) -> i64 {
        self.old
    }

    pub fn new_size(&self) -> i64 {
        self.new
    }

    pub fn diff(&self) -> i64 {
        self.diff
    }
}

/// One revision of a wiki entity, normalized from any of the API's list shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    pub id: u64,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub comment: String,
    pub size: SizeChange,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
}

impl EditRecord {
    /// Construct a record, inferring the property from the comment.
    pub fn new(
        id: u64,
        title: impl Into<String>,
        timestamp: DateTime<Utc>,
        user: impl Into<String>,
        comment: impl Into<String>,
        size: SizeChange,
        tags: Vec<String>,
    ) -> Self {
        let comment = comment.into();
        let property = Property::infer(&comment);
        Self {
            id,
            title: title.into(),
            timestamp,
            user: user.into(),
            comment,
            size,
            tags,
            property,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn infers_each_property_keyword() {
        let cases = [
            ("/* wbsetlabel-add:1|en */ Douglas Adams", Property::Labels),
            ("/* wbsetdescription-set:1|en */ writer", Property::Descriptions),
            ("/* wbsetaliases-add:1|en */ DNA", Property::Aliases),
            ("/* wbcreateclaim-create:1| */ [[Property:P31]]", Property::Statements),
            ("Added statement via tool", Property::Statements),
            ("/* wbsetqualifier-add:1| */", Property::Qualifiers),
            ("/* wbsetreference-add:2| */", Property::References),
            ("/* wbsetsitelink-add:1|enwiki */", Property::Sitelinks),
        ];
        for (comment, expected) in cases {
            assert_eq!(Property::infer(comment), Some(expected), "comment: {comment}");
        }
    }

    #[test]
    fn first_keyword_wins() {
        // "label" comes before "description" in the table
        assert_eq!(
            Property::infer("Changed label and description"),
            Some(Property::Labels)
        );
    }

    #[test]
    fn inference_is_case_insensitive() {
        assert_eq!(Property::infer("SITELINK moved"), Some(Property::Sitelinks));
    }

    #[test]
    fn no_keyword_leaves_property_unset() {
        assert_eq!(Property::infer("Reverted vandalism"), None);
        assert_eq!(Property::infer(""), None);
    }

    #[test]
    fn property_parses_from_cli_names() {
        assert_eq!("Labels".parse::<Property>().unwrap(), Property::Labels);
        assert_eq!(" sitelinks ".parse::<Property>().unwrap(), Property::Sitelinks);
        assert!("colors".parse::<Property>().is_err());
    }

    #[test]
    fn size_change_constructors_keep_diff_consistent() {
        let a = SizeChange::from_new_and_diff(1200, -45);
        assert_eq!(a.old(), 1245);
        assert_eq!(a.diff(), a.new_size() - a.old());

        let b = SizeChange::from_sizes(300, 512);
        assert_eq!(b.diff(), 212);
    }

    #[test]
    fn size_change_rejects_inconsistent_json() {
        let bad = r#"{"old": 10, "new": 20, "diff": 5}"#;
        assert!(serde_json::from_str::<SizeChange>(bad).is_err());

        let good = r#"{"old": 10, "new": 20, "diff": 10}"#;
        let parsed: SizeChange = serde_json::from_str(good).unwrap();
        assert_eq!(parsed, SizeChange::from_sizes(10, 20));
    }

    #[test]
    fn new_record_infers_property() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = EditRecord::new(
            1,
            "Q42",
            ts,
            "Alice",
            "/* wbsetdescription-set:1|en */",
            SizeChange::from_sizes(100, 120),
            vec![],
        );
        assert_eq!(record.property, Some(Property::Descriptions));
    }

    #[test]
    fn timestamp_serializes_as_iso8601() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let record = EditRecord::new(
            7,
            "Q1",
            ts,
            "Bob",
            "",
            SizeChange::from_sizes(0, 0),
            vec!["mobile edit".into()],
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2026-03-01T12:00:00Z");
        assert!(json.get("property").is_none());
    }
}
