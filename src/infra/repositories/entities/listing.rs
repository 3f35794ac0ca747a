//! Listing database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Listing, PropertyType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub property_type: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub nightly_price_cents: i64,
    pub cleaning_fee_cents: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    /// JSON array of amenity labels
    pub amenities: Json,
    /// JSON array of image URLs hosted by the media provider
    pub image_urls: Json,
    pub is_published: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Decode a JSON string array, treating anything else as empty
pub(crate) fn string_list(value: Json) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}

impl From<Model> for Listing {
    fn from(model: Model) -> Self {
        Listing {
            id: model.id,
            host_id: model.host_id,
            title: model.title,
            description: model.description,
            property_type: PropertyType::from(model.property_type.as_str()),
            address: model.address,
            city: model.city,
            country: model.country,
            latitude: model.latitude,
            longitude: model.longitude,
            nightly_price_cents: model.nightly_price_cents,
            cleaning_fee_cents: model.cleaning_fee_cents,
            max_guests: model.max_guests,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            amenities: string_list(model.amenities),
            image_urls: string_list(model.image_urls),
            is_published: model.is_published,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}
