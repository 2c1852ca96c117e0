use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Inspection {
    pub id: ResourceId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub project: Option<ResourceId>,
    #[serde(default)]
    pub inspection_type: String,
    #[serde(default, deserialize_with = "de::date")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub result: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub inspector: Option<ResourceId>,
}

impl Resource for Inspection {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
