pub mod builders;
pub mod db;

pub use builders::{BrewBuilder, BrewerBuilder, BreweryBuilder, StepBuilder};
pub use db::TestDb;
