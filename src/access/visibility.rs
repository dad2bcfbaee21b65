//! Visibility of journal entities for a given viewer.
//!
//! The same rules exist in two forms: `Visible::is_visible` answers for one
//! loaded object, while `visible_filter` produces a declarative [`Predicate`]
//! that can be evaluated in memory or pushed into a list query as a sea-orm
//! [`Condition`]. Visibility only narrows going down the ownership chain: a
//! hidden brewer hides everything beneath it.

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition};

use crate::access::Viewer;
use crate::entities::{brew, brewer};
use crate::graph::{BrewRecord, BreweryRecord, TastingNoteRecord};

/// The flags a visibility decision depends on, flattened from an ownership chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityFacts {
    pub owner_id: i32,
    pub owner_public: bool,
    /// `None` for entities that sit above the brew level.
    pub brew_public: Option<bool>,
}

pub trait Visible {
    fn facts(&self) -> VisibilityFacts;

    fn is_visible(&self, viewer: Viewer) -> bool;
}

pub fn is_visible<E: Visible + ?Sized>(entity: &E, viewer: Viewer) -> bool {
    entity.is_visible(viewer)
}

impl Visible for brewer::Model {
    fn facts(&self) -> VisibilityFacts {
        VisibilityFacts {
            owner_id: self.id,
            owner_public: self.is_public,
            brew_public: None,
        }
    }

    fn is_visible(&self, viewer: Viewer) -> bool {
        viewer.is(self.id) || self.is_public
    }
}

impl Visible for BreweryRecord {
    fn facts(&self) -> VisibilityFacts {
        VisibilityFacts {
            owner_id: self.brewer.id,
            owner_public: self.brewer.is_public,
            brew_public: None,
        }
    }

    fn is_visible(&self, viewer: Viewer) -> bool {
        self.brewer.is_public || viewer.is(self.brewer.id)
    }
}

impl Visible for BrewRecord {
    fn facts(&self) -> VisibilityFacts {
        VisibilityFacts {
            owner_id: self.brewer.id,
            owner_public: self.brewer.is_public,
            brew_public: Some(self.brew.is_public),
        }
    }

    fn is_visible(&self, viewer: Viewer) -> bool {
        viewer.is(self.brewer.id) || (self.brew.is_public && self.brewer.is_public)
    }
}

impl Visible for TastingNoteRecord {
    fn facts(&self) -> VisibilityFacts {
        self.brew.facts()
    }

    fn is_visible(&self, viewer: Viewer) -> bool {
        self.brew.is_visible(viewer)
    }
}

/// Entity families that have a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    Profiles,
    Breweries,
    Brews,
    TastingNotes,
}

/// Declarative visibility filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Const(bool),
    /// The owning brewer (or the profile itself) is the given brewer.
    OwnedBy(i32),
    BrewerPublic,
    BrewPublic,
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn eval(&self, facts: &VisibilityFacts) -> bool {
        match self {
            Predicate::Const(value) => *value,
            Predicate::OwnedBy(id) => facts.owner_id == *id,
            Predicate::BrewerPublic => facts.owner_public,
            Predicate::BrewPublic => facts.brew_public.unwrap_or(false),
            Predicate::All(parts) => parts.iter().all(|p| p.eval(facts)),
            Predicate::Any(parts) => parts.iter().any(|p| p.eval(facts)),
        }
    }

    /// Render as a query condition. The query must join `brewers` (and
    /// `brews` when the predicate mentions brew flags).
    pub fn to_condition(&self) -> Condition {
        match self {
            Predicate::Const(value) => {
                Condition::all().add(Expr::val(1).eq(if *value { 1 } else { 0 }))
            }
            Predicate::OwnedBy(id) => Condition::all().add(brewer::Column::Id.eq(*id)),
            Predicate::BrewerPublic => Condition::all().add(brewer::Column::IsPublic.eq(true)),
            Predicate::BrewPublic => Condition::all().add(brew::Column::IsPublic.eq(true)),
            Predicate::All(parts) => parts
                .iter()
                .fold(Condition::all(), |cond, p| cond.add(p.to_condition())),
            Predicate::Any(parts) if parts.is_empty() => Predicate::Const(false).to_condition(),
            Predicate::Any(parts) => parts
                .iter()
                .fold(Condition::any(), |cond, p| cond.add(p.to_condition())),
        }
    }
}

pub fn visible_filter(listing: Listing, viewer: Viewer) -> Predicate {
    let public = match listing {
        Listing::Profiles | Listing::Breweries => Predicate::BrewerPublic,
        Listing::Brews | Listing::TastingNotes => {
            Predicate::All(vec![Predicate::BrewerPublic, Predicate::BrewPublic])
        }
    };
    match viewer.id() {
        Some(id) => Predicate::Any(vec![Predicate::OwnedBy(id), public]),
        None => public,
    }
}

/// Lists a signed-in brewer sees as "mine": their own entries only. Anonymous
/// viewers get the public entries instead.
pub fn personal_filter(listing: Listing, viewer: Viewer) -> Predicate {
    match viewer.id() {
        Some(id) => Predicate::OwnedBy(id),
        None => visible_filter(listing, viewer),
    }
}
