use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Original and final gravity are not stored here; they come from the
/// fermentation chain (see `brewing::chain`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "brews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brewery_id: i32,
    pub name: String,
    pub code: Option<String>,
    pub style: Option<String>,
    pub bjcp_style_code: Option<String>,
    pub bjcp_style_name: Option<String>,
    pub bjcp_style: Option<String>,
    pub notes: Option<String>,
    pub is_public: bool,
    pub is_draft: bool,
    pub date_brewed: Option<Date>,
    pub bottling_date: Option<Date>,
    pub tapped: Option<Date>,
    pub finished: Option<Date>,
    pub carbonation_type: Option<String>, // "forced in keg" | "keg with priming" | "bottles with priming"
    pub carbonation_level: Option<String>, // "high" | "normal" | "low" | "very low" | "none"
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brewery::Entity",
        from = "Column::BreweryId",
        to = "super::brewery::Column::Id",
        on_delete = "Cascade"
    )]
    Brewery,
    #[sea_orm(has_many = "super::fermentation_step::Entity")]
    FermentationStep,
    #[sea_orm(has_many = "super::tasting_note::Entity")]
    TastingNote,
}

impl Related<super::brewery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brewery.def()
    }
}

impl Related<super::fermentation_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FermentationStep.def()
    }
}

impl Related<super::tasting_note::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TastingNote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
