pub mod brew;
pub mod brewer;
pub mod brewery;
pub mod fermentation_step;
pub mod tasting_note;

pub use brew::Entity as Brew;
pub use brewer::Entity as Brewer;
pub use brewery::Entity as Brewery;
pub use fermentation_step::Entity as FermentationStep;
pub use tasting_note::Entity as TastingNote;
