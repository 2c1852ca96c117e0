use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::amount")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "de::reference")]
    pub manager: Option<ResourceId>,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

impl Resource for Project {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
