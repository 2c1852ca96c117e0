use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrder {
    pub id: ResourceId,
    #[serde(default)]
    pub po_number: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub vendor: Option<ResourceId>,
    #[serde(default, deserialize_with = "de::reference")]
    pub project: Option<ResourceId>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "de::amount")]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "de::date")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::reference")]
    pub requested_by: Option<ResourceId>,
}

impl PurchaseOrder {
    /// Awaiting a decision.
    pub fn is_pending(&self) -> bool {
        matches!(self.status.as_str(), "draft" | "pending")
    }

    /// Counts toward committed spend.
    pub fn is_committed(&self) -> bool {
        matches!(self.status.as_str(), "approved" | "delivered")
    }
}

impl Resource for PurchaseOrder {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
