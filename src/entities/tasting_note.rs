use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasting_notes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brew_id: i32,
    pub author_id: i32,
    pub date: Date,
    #[sea_orm(column_type = "Text")]
    pub text: String,
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
    #[sea_orm(
        belongs_to = "super::brewer::Entity",
        from = "Column::AuthorId",
        to = "super::brewer::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::brew::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brew.def()
    }
}

impl Related<super::brewer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
