use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: ResourceId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub project: Option<ResourceId>,
    #[serde(default, deserialize_with = "de::reference")]
    pub assigned_to: Option<ResourceId>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default, deserialize_with = "de::date")]
    pub due_date: Option<NaiveDate>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    /// Past its due date and not completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed() && self.due_date.is_some_and(|due| due < today)
    }
}

impl Resource for Task {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
