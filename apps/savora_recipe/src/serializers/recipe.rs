use rust_decimal::Decimal;
use savora_core::models::{recipe, tag};
use serde::{Deserialize, Serialize};

use crate::serializers::tag::{TagDescriptor, TagOut};

/// Write payload shared by create, full update and partial update; the views
/// decide which fields are mandatory. There is deliberately no owner field —
/// unknown keys in the payload are dropped by serde.
///
/// `tags: None` (field absent) and `tags: Some(vec![])` mean different
/// things on update: leave the set alone vs. clear it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecipeWriteReq {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<TagDescriptor>>,
}

/// List representation.
#[derive(Debug, Serialize)]
pub struct RecipeOut {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tags: Vec<TagOut>,
}

impl RecipeOut {
    pub fn from_entity(recipe: recipe::Model, tags: Vec<tag::Model>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: tags.into_iter().map(TagOut::from_entity).collect(),
        }
    }
}

/// Detail representation: the list fields plus the description.
#[derive(Debug, Serialize)]
pub struct RecipeDetailOut {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Vec<TagOut>,
}

impl RecipeDetailOut {
    pub fn from_entity(recipe: recipe::Model, tags: Vec<tag::Model>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            description: recipe.description,
            link: recipe.link,
            tags: tags.into_iter().map(TagOut::from_entity).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_deserialize_to_none() {
        let req: RecipeWriteReq = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.tags.is_none());
    }

    #[test]
    fn empty_tags_list_is_not_absent() {
        let req: RecipeWriteReq = serde_json::from_str(r#"{"tags": []}"#).unwrap();
        assert!(req.tags.is_some_and(|tags| tags.is_empty()));
    }

    #[test]
    fn owner_field_in_payload_is_dropped() {
        let req: RecipeWriteReq =
            serde_json::from_str(r#"{"title": "Pasta", "user": 99, "user_id": 99}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("Pasta"));
    }

    #[test]
    fn price_accepts_strings_and_numbers() {
        let a: RecipeWriteReq = serde_json::from_str(r#"{"price": "5.25"}"#).unwrap();
        let b: RecipeWriteReq = serde_json::from_str(r#"{"price": 5.25}"#).unwrap();
        assert_eq!(a.price, b.price);
    }
}
