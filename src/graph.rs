//! Owned records that carry an entity together with its ownership chain.
//!
//! Loaded once per request by `storage` and handed to the access rules and
//! derivations, so nothing here outlives the request that built it.

use crate::entities::{brew, brewer, brewery, tasting_note};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreweryRecord {
    pub brewery: brewery::Model,
    pub brewer: brewer::Model,
}

impl BreweryRecord {
    pub fn owner_id(&self) -> i32 {
        self.brewer.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrewRecord {
    pub brew: brew::Model,
    pub brewery: brewery::Model,
    pub brewer: brewer::Model,
}

impl BrewRecord {
    pub fn owner_id(&self) -> i32 {
        self.brewer.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TastingNoteRecord {
    pub note: tasting_note::Model,
    pub brew: BrewRecord,
}
