//! Brewing domain logic: lifecycle, fermentation chain and derived figures.

pub mod calc;
pub mod chain;
pub mod lifecycle;
pub mod summary;
pub mod text;

pub use chain::{FermentationChain, Gravity, GravityUpdate};
pub use lifecycle::{current_state, BrewPhase, BrewState, LifecycleDates, StateAction};
pub use summary::BrewSummary;
