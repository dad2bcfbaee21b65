//! Brewlog - homebrewing journal core
//!
//! Visibility and ownership rules, brew lifecycle and the fermentation step
//! chain, plus the persistence and journal operations built on them.
//! It exposes all modules for testing purposes.

pub mod access;
pub mod brewing;
pub mod entities;
pub mod errors;
pub mod graph;
pub mod journal;
pub mod settings;
pub mod storage;
