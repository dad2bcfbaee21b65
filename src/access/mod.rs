//! Cascading visibility and ownership checks for journal entities.

pub mod errors;
pub mod manager;
pub mod policy;
pub mod rule;
pub mod visibility;

use serde::{Deserialize, Serialize};

pub use errors::Denial;
pub use manager::AccessManager;
pub use policy::{authorize, authorize_mutation, Guarded, TastingNoteAccess};
pub use rule::{AccessRule, RuleKind};
pub use visibility::{is_visible, personal_filter, visible_filter, Listing, Predicate, Visible};

/// The brewer on whose behalf a request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Viewer {
    Anonymous,
    Brewer(i32),
}

impl Viewer {
    pub fn from_id(id: Option<i32>) -> Self {
        id.map_or(Viewer::Anonymous, Viewer::Brewer)
    }

    pub fn id(&self) -> Option<i32> {
        match self {
            Viewer::Anonymous => None,
            Viewer::Brewer(id) => Some(*id),
        }
    }

    /// True when the viewer is the given brewer. Anonymous viewers never match.
    pub fn is(&self, brewer_id: i32) -> bool {
        matches!(self, Viewer::Brewer(id) if *id == brewer_id)
    }
}
