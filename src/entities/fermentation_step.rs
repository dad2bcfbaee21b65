use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fermentation_steps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brew_id: i32,
    pub date: Date,
    pub name: Option<String>,
    pub og: Option<f64>,
    pub fg: Option<f64>,
    pub volume: Option<f64>,
    pub temperature: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brew::Entity",
        from = "Column::BrewId",
        to = "super::brew::Column::Id",
        on_delete = "Cascade"
    )]
    Brew,
}

impl Related<super::brew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brew.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
