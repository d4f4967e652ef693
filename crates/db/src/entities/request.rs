//! Service request (solicitação) entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request lifecycle status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Newly submitted, nobody working on it yet.
    #[sea_orm(string_value = "open")]
    #[serde(alias = "aberta")]
    #[default]
    Open,
    /// Being handled.
    #[sea_orm(string_value = "in_progress")]
    #[serde(alias = "em_andamento")]
    InProgress,
    /// Solved.
    #[sea_orm(string_value = "resolved")]
    #[serde(alias = "resolvida")]
    Resolved,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "request")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub category_id: i32,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(nullable)]
    pub address: Option<String>,

    #[sea_orm(nullable)]
    pub neighborhood_id: Option<i32>,

    #[sea_orm(nullable)]
    pub postal_code: Option<String>,

    #[sea_orm(nullable)]
    pub latitude: Option<f64>,

    #[sea_orm(nullable)]
    pub longitude: Option<f64>,

    /// JSON-encoded array of photo URLs. Use [`Model::photo_urls`] to read it.
    #[sea_orm(column_type = "Text", nullable)]
    pub photos: Option<String>,

    pub status: RequestStatus,

    /// Hide the submitter from every read
    #[sea_orm(default_value = false)]
    pub anonymous: bool,

    /// Submitting user
    pub user_id: i32,

    /// Claiming official
    #[sea_orm(nullable)]
    pub official_id: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Whole days between creation and resolution, stamped once.
    #[sea_orm(nullable)]
    pub resolution_time_days: Option<i32>,
}

impl Model {
    /// Decode the stored photo list. Unset or malformed values yield an empty list.
    #[must_use]
    pub fn photo_urls(&self) -> Vec<String> {
        self.photos
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
            .unwrap_or_default()
    }
}

/// Encode a photo list for storage.
#[must_use]
pub fn encode_photos(urls: &[String]) -> String {
    serde_json::to_string(urls).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "Restrict"
    )]
    Category,

    #[sea_orm(
        belongs_to = "super::neighborhood::Entity",
        from = "Column::NeighborhoodId",
        to = "super::neighborhood::Column::Id",
        on_delete = "SetNull"
    )]
    Neighborhood,

    #[sea_orm(
        belongs_to = "super::official::Entity",
        from = "Column::OfficialId",
        to = "super::official::Column::Id",
        on_delete = "SetNull"
    )]
    Official,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::neighborhood::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Neighborhood.def()
    }
}

impl Related<super::official::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Official.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
