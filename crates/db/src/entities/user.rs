//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Citizen submitting requests.
    #[sea_orm(string_value = "citizen")]
    #[serde(alias = "cidadao")]
    #[default]
    Citizen,
    /// Elected official who may claim and resolve requests.
    #[sea_orm(string_value = "official")]
    #[serde(alias = "vereador")]
    Official,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Display name
    pub name: String,

    pub role: UserRole,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this account belongs to an elected official.
    #[must_use]
    pub fn is_official(&self) -> bool {
        self.role == UserRole::Official
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::request::Entity")]
    Requests,

    #[sea_orm(has_one = "super::official::Entity")]
    Official,
}

impl Related<super::request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requests.def()
    }
}

impl Related<super::official::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Official.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
