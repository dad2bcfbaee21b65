//! Journal operations as seen by a request handler.
//!
//! Every operation loads the records it needs once, asks the access rules,
//! then reads or mutates through `storage`. Hidden and missing objects are
//! reported the same way.

use chrono::{Local, NaiveDate};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::{
    authorize, authorize_mutation, personal_filter, visible_filter, Listing, Predicate,
    TastingNoteAccess, Viewer,
};
use crate::brewing::calc::{CarbonationLevel, CarbonationType};
use crate::brewing::{current_state, BrewState, BrewSummary, FermentationChain, StateAction};
use crate::entities::{brewer, fermentation_step};
use crate::errors::JournalError;
use crate::graph::{BrewRecord, BreweryRecord, TastingNoteRecord};
use crate::settings;
use crate::storage::{
    self, BrewInput, BreweryInput, Dashboard, DashboardQuery, Direction, LatestQuery, NewBrewer,
    NoteInput, Recency, StepInput, StepWrite,
};

/// Fermentation step as submitted, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepForm {
    pub date: Option<NaiveDate>,
    pub name: Option<String>,
    pub og: Option<f64>,
    pub fg: Option<f64>,
    pub volume: Option<f64>,
    pub temperature: Option<i32>,
    pub notes: Option<String>,
}

impl StepForm {
    pub fn validate(self) -> Result<StepInput, JournalError> {
        let date = self
            .date
            .ok_or_else(|| JournalError::Validation("step date is required".into()))?;
        for (label, value) in [("og", self.og), ("fg", self.fg), ("volume", self.volume)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(JournalError::Validation(format!(
                        "{label} must be a non-negative number"
                    )));
                }
            }
        }
        Ok(StepInput {
            date,
            name: self.name,
            og: self.og,
            fg: self.fg,
            volume: self.volume,
            temperature: self.temperature,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteForm {
    pub date: Option<NaiveDate>,
    pub text: String,
}

/// A brew with its chain and derived figures, loaded for one request.
#[derive(Debug, Clone, Serialize)]
pub struct BrewView {
    pub record: BrewRecord,
    pub chain: FermentationChain,
    pub summary: BrewSummary,
}

/// The visible brews on either side of a brew within its brewery.
#[derive(Debug, Clone, Serialize)]
pub struct BrewNeighbors {
    pub previous: Option<BrewRecord>,
    pub next: Option<BrewRecord>,
}

/// A signed-in brewer's own brewing at a glance.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub latest_brews: Vec<BrewRecord>,
    pub recently_brewed: Vec<BrewRecord>,
    pub recent_notes: Vec<TastingNoteRecord>,
    pub fermenting: Vec<BrewRecord>,
    pub maturing: Vec<BrewRecord>,
    pub on_tap: Vec<BrewRecord>,
}

/// What is new across the journal.
#[derive(Debug, Clone, Serialize)]
pub struct FrontPage {
    pub latest_brews: Vec<BrewRecord>,
    pub latest_breweries: Vec<BreweryRecord>,
    pub latest_brewers: Vec<brewer::Model>,
    pub latest_notes: Vec<TastingNoteRecord>,
}

/// The landing view: a dashboard when signed in, the front page otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum Home {
    Dashboard(DashboardView),
    FrontPage(FrontPage),
}

fn require_brewer(viewer: Viewer) -> Result<i32, JournalError> {
    viewer.id().ok_or(JournalError::Unauthenticated)
}

fn validate_brew(input: &BrewInput) -> Result<(), JournalError> {
    if input.name.trim().is_empty() {
        return Err(JournalError::Validation("brew name is required".into()));
    }
    if let Some(value) = input.carbonation_type.as_deref().filter(|v| !v.is_empty()) {
        if CarbonationType::parse(value).is_none() {
            return Err(JournalError::Validation(format!(
                "unknown carbonation type: {value}"
            )));
        }
    }
    if let Some(value) = input.carbonation_level.as_deref().filter(|v| !v.is_empty()) {
        if CarbonationLevel::parse(value).is_none() {
            return Err(JournalError::Validation(format!(
                "unknown carbonation level: {value}"
            )));
        }
    }
    Ok(())
}

fn validate_note(form: NoteForm, today: NaiveDate) -> Result<NoteInput, JournalError> {
    if form.text.trim().is_empty() {
        return Err(JournalError::Validation("tasting note text is required".into()));
    }
    Ok(NoteInput {
        date: form.date.unwrap_or(today),
        text: form.text,
    })
}

#[derive(Clone)]
pub struct Journal {
    db: DatabaseConnection,
    settings: settings::Journal,
}

impl Journal {
    pub fn new(db: DatabaseConnection, settings: settings::Journal) -> Self {
        Self { db, settings }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    // ------------------------------------------------------------------
    // Loaders
    // ------------------------------------------------------------------

    async fn load_brewer(&self, brewer_id: i32) -> Result<brewer::Model, JournalError> {
        storage::get_brewer(&self.db, brewer_id)
            .await?
            .ok_or(JournalError::NotFound("profile"))
    }

    async fn load_brewery(&self, brewery_id: i32) -> Result<BreweryRecord, JournalError> {
        storage::get_brewery_record(&self.db, brewery_id)
            .await?
            .ok_or(JournalError::NotFound("brewery"))
    }

    async fn load_brew(&self, brew_id: i32) -> Result<BrewRecord, JournalError> {
        storage::get_brew_record(&self.db, brew_id)
            .await?
            .ok_or(JournalError::NotFound("brew"))
    }

    async fn load_note(&self, note_id: i32) -> Result<TastingNoteRecord, JournalError> {
        storage::get_note_record(&self.db, note_id)
            .await?
            .ok_or(JournalError::NotFound("tasting note"))
    }

    /// A step of the given brew; steps of other brews read as missing.
    async fn load_step(
        &self,
        brew_id: i32,
        step_id: i32,
    ) -> Result<fermentation_step::Model, JournalError> {
        storage::get_step(&self.db, step_id)
            .await?
            .filter(|step| step.brew_id == brew_id)
            .ok_or(JournalError::NotFound("fermentation step"))
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    pub async fn register(&self, input: NewBrewer) -> Result<brewer::Model, JournalError> {
        if input.name.trim().is_empty() {
            return Err(JournalError::Validation("brewer name is required".into()));
        }
        let brewer = storage::create_brewer(&self.db, input).await?;
        info!(brewer_id = brewer.id, "registered brewer");
        Ok(brewer)
    }

    pub async fn profile(&self, viewer: Viewer, brewer_id: i32) -> Result<brewer::Model, JournalError> {
        let brewer = self.load_brewer(brewer_id).await?;
        authorize(&brewer, viewer, false)?;
        Ok(brewer)
    }

    pub async fn update_profile(
        &self,
        viewer: Viewer,
        brewer_id: i32,
        input: NewBrewer,
    ) -> Result<brewer::Model, JournalError> {
        require_brewer(viewer)?;
        let brewer = self.load_brewer(brewer_id).await?;
        authorize_mutation(&brewer, viewer)?;
        storage::update_brewer(&self.db, brewer, input).await
    }

    /// Remove a profile with everything its brewer owns or wrote.
    pub async fn delete_profile(&self, viewer: Viewer, brewer_id: i32) -> Result<(), JournalError> {
        require_brewer(viewer)?;
        let brewer = self.load_brewer(brewer_id).await?;
        authorize_mutation(&brewer, viewer)?;
        storage::delete_brewer(&self.db, brewer_id).await
    }

    pub async fn profiles(&self, viewer: Viewer) -> Result<Vec<brewer::Model>, JournalError> {
        storage::list_profiles(&self.db, viewer).await
    }

    // ------------------------------------------------------------------
    // Breweries
    // ------------------------------------------------------------------

    pub async fn create_brewery(
        &self,
        viewer: Viewer,
        input: BreweryInput,
    ) -> Result<BreweryRecord, JournalError> {
        let brewer_id = require_brewer(viewer)?;
        let brewer = self.load_brewer(brewer_id).await?;
        if input.name.trim().is_empty() {
            return Err(JournalError::Validation("brewery name is required".into()));
        }
        let brewery = storage::create_brewery(&self.db, brewer_id, input).await?;
        info!(brewery_id = brewery.id, brewer_id, "created brewery");
        Ok(BreweryRecord { brewery, brewer })
    }

    pub async fn brewery(&self, viewer: Viewer, brewery_id: i32) -> Result<BreweryRecord, JournalError> {
        let record = self.load_brewery(brewery_id).await?;
        authorize(&record, viewer, false)?;
        Ok(record)
    }

    pub async fn update_brewery(
        &self,
        viewer: Viewer,
        brewery_id: i32,
        input: BreweryInput,
    ) -> Result<BreweryRecord, JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brewery(brewery_id).await?;
        authorize_mutation(&record, viewer)?;
        let brewery = storage::update_brewery(&self.db, record.brewery, input).await?;
        Ok(BreweryRecord {
            brewery,
            brewer: record.brewer,
        })
    }

    pub async fn delete_brewery(&self, viewer: Viewer, brewery_id: i32) -> Result<(), JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brewery(brewery_id).await?;
        authorize_mutation(&record, viewer)?;
        storage::delete_brewery(&self.db, brewery_id).await
    }

    pub async fn breweries(&self, viewer: Viewer) -> Result<Vec<BreweryRecord>, JournalError> {
        storage::list_breweries(&self.db, viewer).await
    }

    /// Breweries by name prefix: the viewer's own, or public ones when anonymous.
    pub async fn search_breweries(
        &self,
        viewer: Viewer,
        prefix: &str,
    ) -> Result<Vec<BreweryRecord>, JournalError> {
        let filter = personal_filter(Listing::Breweries, viewer);
        storage::search_breweries(&self.db, &filter, prefix.trim()).await
    }

    // ------------------------------------------------------------------
    // Brews
    // ------------------------------------------------------------------

    pub async fn create_brew(
        &self,
        viewer: Viewer,
        brewery_id: i32,
        input: BrewInput,
    ) -> Result<BrewRecord, JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brewery(brewery_id).await?;
        authorize_mutation(&record, viewer)?;
        validate_brew(&input)?;
        let brew = storage::create_brew(&self.db, brewery_id, input).await?;
        info!(brew_id = brew.id, brewery_id, "created brew");
        Ok(BrewRecord {
            brew,
            brewery: record.brewery,
            brewer: record.brewer,
        })
    }

    pub async fn brew(&self, viewer: Viewer, brew_id: i32) -> Result<BrewView, JournalError> {
        let record = self.load_brew(brew_id).await?;
        authorize(&record, viewer, false)?;
        let chain = storage::load_chain(&self.db, brew_id).await?;
        let summary = BrewSummary::derive(&record.brew, &chain);
        Ok(BrewView {
            record,
            chain,
            summary,
        })
    }

    pub async fn update_brew(
        &self,
        viewer: Viewer,
        brew_id: i32,
        input: BrewInput,
    ) -> Result<BrewRecord, JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brew(brew_id).await?;
        authorize_mutation(&record, viewer)?;
        validate_brew(&input)?;
        let brew = storage::update_brew(&self.db, record.brew, input).await?;
        Ok(BrewRecord {
            brew,
            brewery: record.brewery,
            brewer: record.brewer,
        })
    }

    pub async fn delete_brew(&self, viewer: Viewer, brew_id: i32) -> Result<(), JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brew(brew_id).await?;
        authorize_mutation(&record, viewer)?;
        storage::delete_brew(&self.db, brew_id).await
    }

    pub async fn brews(
        &self,
        viewer: Viewer,
        brewery_id: Option<i32>,
    ) -> Result<Vec<BrewRecord>, JournalError> {
        if let Some(brewery_id) = brewery_id {
            let brewery = self.load_brewery(brewery_id).await?;
            authorize(&brewery, viewer, false)?;
        }
        storage::list_brews(&self.db, viewer, brewery_id).await
    }

    /// Brews by name prefix: the viewer's own, or public ones when anonymous.
    pub async fn search_brews(
        &self,
        viewer: Viewer,
        prefix: &str,
    ) -> Result<Vec<BrewRecord>, JournalError> {
        let filter = personal_filter(Listing::Brews, viewer);
        storage::search_brews(&self.db, &filter, prefix.trim()).await
    }

    pub async fn brew_neighbors(
        &self,
        viewer: Viewer,
        brew_id: i32,
    ) -> Result<BrewNeighbors, JournalError> {
        let record = self.load_brew(brew_id).await?;
        authorize(&record, viewer, false)?;
        Ok(BrewNeighbors {
            previous: storage::adjacent_brew(&self.db, viewer, &record.brew, Direction::Previous)
                .await?,
            next: storage::adjacent_brew(&self.db, viewer, &record.brew, Direction::Next).await?,
        })
    }

    pub async fn brew_state(&self, viewer: Viewer, brew_id: i32) -> Result<BrewState, JournalError> {
        let record = self.load_brew(brew_id).await?;
        authorize(&record, viewer, false)?;
        Ok(current_state(&record.brew))
    }

    /// Tap, untap or finish a bottled brew.
    pub async fn change_state(
        &self,
        viewer: Viewer,
        brew_id: i32,
        action: StateAction,
    ) -> Result<BrewState, JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brew(brew_id).await?;
        authorize_mutation(&record, viewer)?;
        let state = current_state(&record.brew);
        if !state.phase.is_changeable() {
            return Err(JournalError::Validation(format!(
                "a {} brew cannot change state",
                state.phase
            )));
        }
        let brew = storage::change_brew_state(&self.db, record.brew, action, self.today()).await?;
        Ok(current_state(&brew))
    }

    // ------------------------------------------------------------------
    // Fermentation steps
    // ------------------------------------------------------------------

    pub async fn add_step(
        &self,
        viewer: Viewer,
        brew_id: i32,
        form: StepForm,
    ) -> Result<StepWrite, JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brew(brew_id).await?;
        authorize_mutation(&record, viewer)?;
        let input = form.validate()?;
        storage::insert_step(&self.db, brew_id, input).await
    }

    pub async fn update_step(
        &self,
        viewer: Viewer,
        brew_id: i32,
        step_id: i32,
        form: StepForm,
    ) -> Result<StepWrite, JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brew(brew_id).await?;
        authorize_mutation(&record, viewer)?;
        let step = self.load_step(brew_id, step_id).await?;
        let input = form.validate()?;
        storage::update_step(&self.db, step, input).await
    }

    pub async fn delete_step(
        &self,
        viewer: Viewer,
        brew_id: i32,
        step_id: i32,
    ) -> Result<(), JournalError> {
        require_brewer(viewer)?;
        let record = self.load_brew(brew_id).await?;
        authorize_mutation(&record, viewer)?;
        let step = self.load_step(brew_id, step_id).await?;
        storage::delete_step(&self.db, step.id).await
    }

    // ------------------------------------------------------------------
    // Tasting notes
    // ------------------------------------------------------------------

    pub async fn add_note(
        &self,
        viewer: Viewer,
        brew_id: i32,
        form: NoteForm,
    ) -> Result<TastingNoteRecord, JournalError> {
        let author_id = require_brewer(viewer)?;
        let brew = self.load_brew(brew_id).await?;
        TastingNoteAccess::check_create(&brew, viewer)?;
        let input = validate_note(form, self.today())?;
        let note = storage::create_note(&self.db, brew_id, author_id, input).await?;
        debug!(note_id = note.id, brew_id, author_id, "added tasting note");
        Ok(TastingNoteRecord { note, brew })
    }

    pub async fn update_note(
        &self,
        viewer: Viewer,
        note_id: i32,
        form: NoteForm,
    ) -> Result<TastingNoteRecord, JournalError> {
        require_brewer(viewer)?;
        let record = self.load_note(note_id).await?;
        TastingNoteAccess::new(&record).check(viewer)?;
        let input = validate_note(form, record.note.date)?;
        let note = storage::update_note(&self.db, record.note, input).await?;
        Ok(TastingNoteRecord {
            note,
            brew: record.brew,
        })
    }

    pub async fn delete_note(&self, viewer: Viewer, note_id: i32) -> Result<(), JournalError> {
        require_brewer(viewer)?;
        let record = self.load_note(note_id).await?;
        TastingNoteAccess::new(&record).check(viewer)?;
        storage::delete_note(&self.db, note_id).await
    }

    /// Notes on one brew, or on every visible brew when `brew_id` is `None`.
    pub async fn notes(
        &self,
        viewer: Viewer,
        brew_id: Option<i32>,
    ) -> Result<Vec<TastingNoteRecord>, JournalError> {
        match brew_id {
            Some(brew_id) => {
                let brew = self.load_brew(brew_id).await?;
                authorize(&brew, viewer, false)?;
                storage::list_notes(&self.db, &brew).await
            }
            None => storage::list_visible_notes(&self.db, viewer).await,
        }
    }

    // ------------------------------------------------------------------
    // Dashboard and front page
    // ------------------------------------------------------------------

    /// The signed-in brewer's own brews and notes. Drafts are included.
    pub async fn dashboard_on(
        &self,
        viewer: Viewer,
        today: NaiveDate,
    ) -> Result<DashboardView, JournalError> {
        let brewer_id = require_brewer(viewer)?;
        let limit = self.settings.listing_limit;
        let own = Predicate::OwnedBy(brewer_id);
        let latest = |recency| LatestQuery {
            recency,
            limit,
            hide_drafts: false,
        };
        let query = DashboardQuery { today, limit };
        let db = &self.db;
        Ok(DashboardView {
            latest_brews: storage::latest_brews(db, viewer, &own, latest(Recency::Created)).await?,
            recently_brewed: storage::latest_brews(db, viewer, &own, latest(Recency::Brewed))
                .await?,
            recent_notes: storage::latest_notes(db, viewer, Some(brewer_id), limit).await?,
            fermenting: storage::list_dashboard(db, brewer_id, Dashboard::Fermenting, query).await?,
            maturing: storage::list_dashboard(db, brewer_id, Dashboard::Maturing, query).await?,
            on_tap: storage::list_dashboard(db, brewer_id, Dashboard::OnTap, query).await?,
        })
    }

    pub async fn dashboard(&self, viewer: Viewer) -> Result<DashboardView, JournalError> {
        self.dashboard_on(viewer, self.today()).await
    }

    /// Newest brews, breweries, brewers and notes the viewer may see.
    pub async fn front_page(&self, viewer: Viewer) -> Result<FrontPage, JournalError> {
        let limit = self.settings.listing_limit;
        let query = LatestQuery {
            recency: Recency::Created,
            limit,
            hide_drafts: self.settings.hide_drafts,
        };
        let brews = visible_filter(Listing::Brews, viewer);
        let db = &self.db;
        Ok(FrontPage {
            latest_brews: storage::latest_brews(db, viewer, &brews, query).await?,
            latest_breweries: storage::latest_breweries(db, viewer, limit).await?,
            latest_brewers: storage::latest_brewers(db, viewer, limit).await?,
            latest_notes: storage::latest_notes(db, viewer, None, limit).await?,
        })
    }

    pub async fn home(&self, viewer: Viewer) -> Result<Home, JournalError> {
        match viewer {
            Viewer::Anonymous => Ok(Home::FrontPage(self.front_page(viewer).await?)),
            Viewer::Brewer(_) => Ok(Home::Dashboard(self.dashboard(viewer).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_form_requires_date() {
        let err = StepForm::default().validate().unwrap_err();
        assert!(matches!(err, JournalError::Validation(_)));
    }

    #[test]
    fn test_step_form_rejects_bad_gravity() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1);
        for og in [f64::NAN, f64::INFINITY, -1.0] {
            let form = StepForm {
                date,
                og: Some(og),
                ..Default::default()
            };
            assert!(form.validate().is_err(), "{og} accepted");
        }
        let ok = StepForm {
            date,
            og: Some(12.0),
            fg: Some(0.0),
            ..Default::default()
        };
        assert_eq!(ok.validate().unwrap().fg, Some(0.0));
    }

    #[test]
    fn test_brew_validation() {
        let mut input = BrewInput {
            name: "Porter".into(),
            ..Default::default()
        };
        assert!(validate_brew(&input).is_ok());
        input.carbonation_level = Some("fizzy".into());
        assert!(validate_brew(&input).is_err());
        input.carbonation_level = Some("very low".into());
        input.carbonation_type = Some("bottles with priming".into());
        assert!(validate_brew(&input).is_ok());
    }

    #[test]
    fn test_note_date_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let input = validate_note(
            NoteForm {
                date: None,
                text: "roasty".into(),
            },
            today,
        )
        .unwrap();
        assert_eq!(input.date, today);
        assert!(validate_note(NoteForm::default(), today).is_err());
    }

    #[test]
    fn test_anonymous_viewer_cannot_mutate() {
        assert!(matches!(
            require_brewer(Viewer::Anonymous),
            Err(JournalError::Unauthenticated)
        ));
        assert_eq!(require_brewer(Viewer::Brewer(3)).unwrap(), 3);
    }
}
