//! Series registry: the fixed, ordered list of upstream series the pipeline pulls.
//!
//! Registry order is observable: raw artifacts are fetched, persisted, and
//! reported in definition order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const USD_OFFICIAL: &str = "usd_official";
pub const RESERVES_USD: &str = "reserves_usd";
pub const IPC_NACIONAL: &str = "ipc_nacional";
pub const RIPTE: &str = "ripte";

/// Series the pipeline derives indicators from; a registry used by the
/// pipeline must contain all of them.
pub const REQUIRED_SERIES: [&str; 4] = [USD_OFFICIAL, RESERVES_USD, IPC_NACIONAL, RIPTE];

/// Server-side resampling granularity (`collapse` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collapse {
    Day,
    Week,
    Month,
    Quarter,
    Semester,
    Year,
}

impl Collapse {
    pub fn as_token(&self) -> &'static str {
        match self {
            Collapse::Day => "day",
            Collapse::Week => "week",
            Collapse::Month => "month",
            Collapse::Quarter => "quarter",
            Collapse::Semester => "semester",
            Collapse::Year => "year",
        }
    }
}

impl fmt::Display for Collapse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for Collapse {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Collapse::Day),
            "week" => Ok(Collapse::Week),
            "month" => Ok(Collapse::Month),
            "quarter" => Ok(Collapse::Quarter),
            "semester" => Ok(Collapse::Semester),
            "year" => Ok(Collapse::Year),
            other => Err(RegistryError::UnknownToken {
                kind: "collapse",
                token: other.to_string(),
            }),
        }
    }
}

/// How raw points inside one collapsed period become a single value
/// (`collapse_aggregation` query parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aggregation {
    Avg,
    Sum,
    EndOfPeriod,
    Min,
    Max,
}

impl Aggregation {
    pub fn as_token(&self) -> &'static str {
        match self {
            Aggregation::Avg => "avg",
            Aggregation::Sum => "sum",
            Aggregation::EndOfPeriod => "end_of_period",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for Aggregation {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avg" => Ok(Aggregation::Avg),
            "sum" => Ok(Aggregation::Sum),
            "end_of_period" => Ok(Aggregation::EndOfPeriod),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            other => Err(RegistryError::UnknownToken {
                kind: "aggregation",
                token: other.to_string(),
            }),
        }
    }
}

/// One registry entry: a local name bound to an upstream series id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSpec {
    pub name: String,
    pub id: String,
    pub collapse: Option<Collapse>,
    pub aggregation: Option<Aggregation>,
}

impl SeriesSpec {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        collapse: Option<Collapse>,
        aggregation: Option<Aggregation>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            collapse,
            aggregation,
        }
    }
}

/// A registry entry as written in configuration, tokens still unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesEntry {
    pub name: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
}

impl SeriesEntry {
    /// Parse the collapse and aggregation tokens.
    pub fn resolve(&self) -> Result<SeriesSpec, RegistryError> {
        Ok(SeriesSpec {
            name: self.name.clone(),
            id: self.id.clone(),
            collapse: self.collapse.as_deref().map(str::parse).transpose()?,
            aggregation: self.aggregation.as_deref().map(str::parse).transpose()?,
        })
    }
}

impl From<&SeriesSpec> for SeriesEntry {
    fn from(spec: &SeriesSpec) -> Self {
        Self {
            name: spec.name.clone(),
            id: spec.id.clone(),
            collapse: spec.collapse.map(|c| c.as_token().to_string()),
            aggregation: spec.aggregation.map(|a| a.as_token().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry is empty")]
    Empty,

    #[error("registry entry #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("registry entry '{name}' has an empty series id")]
    EmptyId { name: String },

    #[error("registry entry '{name}' is defined more than once")]
    DuplicateName { name: String },

    #[error("registry is missing required series '{name}'")]
    MissingSeries { name: String },

    #[error("unknown {kind} token '{token}'")]
    UnknownToken { kind: &'static str, token: String },
}

/// Validated, immutable, ordered list of series specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRegistry {
    entries: Vec<SeriesSpec>,
}

impl SeriesRegistry {
    /// Validate and freeze a list of entries, keeping their order.
    pub fn new(entries: Vec<SeriesSpec>) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for (index, spec) in entries.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(RegistryError::EmptyName { index });
            }
            if spec.id.trim().is_empty() {
                return Err(RegistryError::EmptyId {
                    name: spec.name.clone(),
                });
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(RegistryError::DuplicateName {
                    name: spec.name.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// The four monthly series the pipeline was built around.
    pub fn builtin() -> Self {
        Self {
            entries: builtin_entries(),
        }
    }

    /// Fail unless every name in `names` is registered.
    pub fn require(&self, names: &[&str]) -> Result<(), RegistryError> {
        for name in names {
            if self.get(name).is_none() {
                return Err(RegistryError::MissingSeries {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SeriesSpec> {
        self.entries.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesSpec> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[SeriesSpec] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SeriesRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Built-in registry entries, in definition order.
pub fn builtin_entries() -> Vec<SeriesSpec> {
    vec![
        SeriesSpec::new(
            USD_OFFICIAL,
            "168.1_T_CAMBIOR_D_0_0_26",
            Some(Collapse::Month),
            Some(Aggregation::EndOfPeriod),
        ),
        SeriesSpec::new(
            RESERVES_USD,
            "92.2_RESERVAS_IRES_0_0_32_40",
            Some(Collapse::Month),
            Some(Aggregation::EndOfPeriod),
        ),
        SeriesSpec::new(
            IPC_NACIONAL,
            "147.3_IBIENESUYO_DICI_T_15",
            Some(Collapse::Month),
            Some(Aggregation::Avg),
        ),
        SeriesSpec::new(
            RIPTE,
            "sspm_32.3_RIPTE_0_0_33",
            Some(Collapse::Month),
            Some(Aggregation::Avg),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_valid_and_ordered() {
        let registry = SeriesRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec![USD_OFFICIAL, RESERVES_USD, IPC_NACIONAL, RIPTE]
        );
        assert_eq!(SeriesRegistry::new(builtin_entries()).unwrap(), registry);
        assert!(registry.require(&REQUIRED_SERIES).is_ok());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = SeriesRegistry::new(vec![
            SeriesSpec::new("a", "id1", None, None),
            SeriesSpec::new("a", "id2", None, None),
        ])
        .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName { name: "a".into() });
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(
            SeriesRegistry::new(vec![SeriesSpec::new(" ", "id", None, None)]).unwrap_err(),
            RegistryError::EmptyName { index: 0 }
        );
        assert_eq!(
            SeriesRegistry::new(vec![SeriesSpec::new("a", "", None, None)]).unwrap_err(),
            RegistryError::EmptyId { name: "a".into() }
        );
        assert_eq!(SeriesRegistry::new(vec![]).unwrap_err(), RegistryError::Empty);
    }

    #[test]
    fn require_reports_first_missing_name() {
        let registry =
            SeriesRegistry::new(vec![SeriesSpec::new(USD_OFFICIAL, "x", None, None)]).unwrap();
        let err = registry.require(&REQUIRED_SERIES).unwrap_err();
        assert_eq!(
            err,
            RegistryError::MissingSeries {
                name: RESERVES_USD.into()
            }
        );
    }

    #[test]
    fn tokens_round_trip_through_from_str() {
        for c in [
            Collapse::Day,
            Collapse::Week,
            Collapse::Month,
            Collapse::Quarter,
            Collapse::Semester,
            Collapse::Year,
        ] {
            assert_eq!(c.as_token().parse::<Collapse>().unwrap(), c);
        }
        assert_eq!(
            "end_of_period".parse::<Aggregation>().unwrap(),
            Aggregation::EndOfPeriod
        );
        assert!("monthly".parse::<Collapse>().is_err());
        assert!("mean".parse::<Aggregation>().is_err());
    }

    #[test]
    fn entries_resolve_tokens_and_report_unknown_ones() {
        for spec in builtin_entries() {
            assert_eq!(SeriesEntry::from(&spec).resolve().unwrap(), spec);
        }

        let entry = SeriesEntry {
            name: USD_OFFICIAL.into(),
            id: "x".into(),
            collapse: Some("month".into()),
            aggregation: Some("median".into()),
        };
        assert_eq!(
            entry.resolve().unwrap_err(),
            RegistryError::UnknownToken {
                kind: "aggregation",
                token: "median".into()
            }
        );
    }
}
