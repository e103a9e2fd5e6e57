//! Entities, relationships and the typed enumerations used to style them.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity type name, e.g. `Actor` or `Forum`.
///
/// Types are not hardcoded: the set of valid names is whatever the [`TypeRegistry`] holds.
///
/// [`TypeRegistry`]: crate::TypeRegistry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Threat severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Ring color drawn around nodes carrying this severity.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#22c55e",
            Self::Medium => "#ca8a04",
            Self::High => "#f97316",
            Self::Critical => "#ef4444",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// Node glyph used by the legend and the draw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Circle,
    Square,
    Hexagon,
    Triangle,
    Pentagon,
    Diamond,
}

impl NodeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Hexagon => "hexagon",
            Self::Triangle => "triangle",
            Self::Pentagon => "pentagon",
            Self::Diamond => "diamond",
        }
    }

    /// Number of polygon corners, or `None` for a circle.
    pub fn corners(&self) -> Option<usize> {
        match self {
            Self::Circle => None,
            Self::Triangle => Some(3),
            Self::Square | Self::Diamond => Some(4),
            Self::Pentagon => Some(5),
            Self::Hexagon => Some(6),
        }
    }
}

/// A graph vertex: a threat actor, tool, target, vulnerability, forum, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub label: String,
    /// Display attributes, in insertion order.
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<EntityType>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            label: label.into(),
            attributes: IndexMap::new(),
            last_seen: None,
            severity: None,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_last_seen(mut self, last_seen: DateTime<Utc>) -> Self {
        self.last_seen = Some(last_seen);
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

fn default_weight() -> f64 {
    1.0
}

/// An undirected association between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Layout attraction strength.
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl Relationship {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            weight: default_weight(),
            label: None,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The endpoint opposite to `id`, or `None` if `id` is not an endpoint.
    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_from_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
        assert_eq!(
            Severity::ALL.iter().copied().max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert_eq!(" critical ".parse::<Severity>(), Ok(Severity::Critical));
        assert!("severe".parse::<Severity>().is_err());
    }

    #[test]
    fn entity_json_uses_type_and_camel_case_keys() {
        let json = serde_json::json!({
            "id": "SC",
            "type": "Actor",
            "label": "ShadowCorp",
            "attributes": { "Region": "Eastern Europe", "Activity Level": "High" },
            "lastSeen": "2024-01-15T00:00:00Z",
            "severity": "critical"
        });
        let e: Entity = serde_json::from_value(json).expect("entity");
        assert_eq!(e.entity_type, EntityType::from("Actor"));
        assert_eq!(e.severity, Some(Severity::Critical));
        assert!(e.last_seen.is_some());
        let keys: Vec<&str> = e.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Region", "Activity Level"]);
    }

    #[test]
    fn relationship_weight_defaults_to_one() {
        let r: Relationship =
            serde_json::from_str(r#"{"id":"e1","source":"a","target":"b"}"#).expect("edge");
        assert_eq!(r.weight, 1.0);
        assert_eq!(r.other_end("a"), Some("b"));
        assert_eq!(r.other_end("b"), Some("a"));
        assert_eq!(r.other_end("c"), None);
    }

    #[test]
    fn shape_corners() {
        assert_eq!(NodeShape::Circle.corners(), None);
        assert_eq!(NodeShape::Hexagon.corners(), Some(6));
        assert_eq!(NodeShape::Pentagon.corners(), Some(5));
    }
}
