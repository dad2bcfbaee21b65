use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A brewery has no visibility flag of its own; it is as public as its brewer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "breweries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brewer_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub established_date: Option<Date>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brewer::Entity",
        from = "Column::BrewerId",
        to = "super::brewer::Column::Id",
        on_delete = "Cascade"
    )]
    Brewer,
    #[sea_orm(has_many = "super::brew::Entity")]
    Brew,
}

impl Related<super::brewer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brewer.def()
    }
}

impl Related<super::brew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brew.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
