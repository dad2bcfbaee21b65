use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "brewers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub is_public: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::brewery::Entity")]
    Brewery,
    #[sea_orm(has_many = "super::tasting_note::Entity")]
    TastingNote,
}

impl Related<super::brewery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brewery.def()
    }
}

impl Related<super::tasting_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TastingNote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
