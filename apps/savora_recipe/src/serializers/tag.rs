use savora_core::models::tag;
use serde::{Deserialize, Serialize};

/// Name-only descriptor nested in recipe payloads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagDescriptor {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagWriteReq {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TagOut {
    pub id: i64,
    pub name: String,
}

impl TagOut {
    pub fn from_entity(tag: tag::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}
