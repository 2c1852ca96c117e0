use serde::{Deserialize, Serialize};

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
    pub id: ResourceId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub equipment_type: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub project: Option<ResourceId>,
    #[serde(default, deserialize_with = "de::amount")]
    pub hourly_rate: Option<f64>,
}

impl Resource for Equipment {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
