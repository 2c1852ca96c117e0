use serde::{Deserialize, Serialize};

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: ResourceId,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub sender: Option<ResourceId>,
    #[serde(default, deserialize_with = "de::reference")]
    pub recipient: Option<ResourceId>,
    #[serde(default, deserialize_with = "de::flag")]
    pub is_read: bool,
}

impl Message {
    pub fn is_unread_by(&self, user: &ResourceId) -> bool {
        !self.is_read && self.recipient.as_ref() == Some(user)
    }
}

impl Resource for Message {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
