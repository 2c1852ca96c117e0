use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!(
                "Invalid severity '{}'. Valid options: low, medium, high, critical",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub id: ResourceId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub project: Option<ResourceId>,
    /// Unknown severities from the server decode as `None`.
    #[serde(default, deserialize_with = "severity")]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "de::date")]
    pub incident_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::reference")]
    pub reported_by: Option<ResourceId>,
}

fn severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| s.parse().ok()))
}

impl Incident {
    pub fn is_open(&self) -> bool {
        !matches!(self.status.as_str(), "resolved" | "closed")
    }

    pub fn is_serious(&self) -> bool {
        self.severity.is_some_and(|s| s >= Severity::High)
    }
}

impl Resource for Incident {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
