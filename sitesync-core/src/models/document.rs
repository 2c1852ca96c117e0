use serde::{Deserialize, Serialize};

use super::de;
use crate::resource::{Resource, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: ResourceId,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "de::reference")]
    pub project: Option<ResourceId>,
    #[serde(default)]
    pub document_type: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default, deserialize_with = "de::reference")]
    pub uploaded_by: Option<ResourceId>,
}

impl Resource for Document {
    fn id(&self) -> ResourceId {
        self.id.clone()
    }
}
