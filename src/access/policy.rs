//! Access rules for each guarded entity type.
//!
//! Each entity contributes only its predicates; how a failure is reported
//! comes from the rule kind.

use crate::access::errors::Denial;
use crate::access::manager::AccessManager;
use crate::access::rule::AccessRule;
use crate::access::visibility::Visible;
use crate::access::Viewer;
use crate::entities::brewer;
use crate::graph::{BrewRecord, BreweryRecord, TastingNoteRecord};

/// An entity whose access is governed by a public rule and an owner rule.
pub trait Guarded {
    fn public_rule(&self, viewer: Viewer) -> AccessRule<'_>;

    fn owner_rule(&self, viewer: Viewer) -> AccessRule<'_>;

    fn access_manager(&self, viewer: Viewer, elevated: bool) -> AccessManager<'_> {
        AccessManager::new(
            self.public_rule(viewer),
            Some(self.owner_rule(viewer)),
            elevated,
        )
    }
}

impl Guarded for brewer::Model {
    fn public_rule(&self, viewer: Viewer) -> AccessRule<'_> {
        AccessRule::public("profile", move || self.is_visible(viewer))
    }

    fn owner_rule(&self, viewer: Viewer) -> AccessRule<'_> {
        AccessRule::owner("profile", move || viewer.is(self.id))
    }
}

impl Guarded for BreweryRecord {
    fn public_rule(&self, viewer: Viewer) -> AccessRule<'_> {
        AccessRule::public("brewery", move || self.is_visible(viewer))
    }

    fn owner_rule(&self, viewer: Viewer) -> AccessRule<'_> {
        AccessRule::owner("brewery", move || viewer.is(self.owner_id()))
    }
}

impl Guarded for BrewRecord {
    fn public_rule(&self, viewer: Viewer) -> AccessRule<'_> {
        AccessRule::public("brew", move || self.is_visible(viewer))
    }

    fn owner_rule(&self, viewer: Viewer) -> AccessRule<'_> {
        AccessRule::owner("brew", move || viewer.is(self.owner_id()))
    }
}

/// Authorize a request: the primary rule always applies, the owner rule joins
/// when `elevated`, and the first satisfied rule grants access.
pub fn authorize<T: Guarded + ?Sized>(
    entity: &T,
    viewer: Viewer,
    elevated: bool,
) -> Result<(), Denial> {
    entity.access_manager(viewer, elevated).check()
}

/// Authorize a mutation: both the public and the owner rule must hold, so a
/// hidden object still reads as missing and a visible one as forbidden.
pub fn authorize_mutation<T: Guarded + ?Sized>(entity: &T, viewer: Viewer) -> Result<(), Denial> {
    entity.access_manager(viewer, true).check_all()
}

/// Tasting notes are guarded by their brew's public rule and, for edits, by an
/// author-or-owner rule. The two are evaluated independently.
pub struct TastingNoteAccess<'a> {
    record: &'a TastingNoteRecord,
}

impl<'a> TastingNoteAccess<'a> {
    pub fn new(record: &'a TastingNoteRecord) -> Self {
        Self { record }
    }

    /// Anyone who can see the brew may leave a note on it.
    pub fn check_create(brew: &BrewRecord, viewer: Viewer) -> Result<(), Denial> {
        let rule = brew.public_rule(viewer);
        if rule.check() {
            Ok(())
        } else {
            Err(rule.deny())
        }
    }

    pub fn author_or_owner_rule(&self, viewer: Viewer) -> AccessRule<'a> {
        let record = self.record;
        AccessRule::owner("tasting note", move || {
            viewer.is(record.note.author_id) || viewer.is(record.brew.owner_id())
        })
    }

    pub fn check(&self, viewer: Viewer) -> Result<(), Denial> {
        AccessManager::new(
            self.record.brew.public_rule(viewer),
            Some(self.author_or_owner_rule(viewer)),
            true,
        )
        .check_all()
    }
}
