use crate::access::{visible_filter, Listing, Predicate, Viewer};
use crate::brewing::text;
use crate::brewing::{BrewPhase, FermentationChain, Gravity, GravityUpdate, StateAction};
use crate::entities::{brew, brewer, brewery, fermentation_step, tasting_note};
use crate::errors::JournalError;
use crate::graph::{BrewRecord, BreweryRecord, TastingNoteRecord};
use crate::settings::Database as DbCfg;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, JoinType, ModelTrait, NotSet, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBrewer {
    pub name: String,
    pub email: Option<String>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreweryInput {
    pub name: String,
    pub description: Option<String>,
    pub established_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrewInput {
    pub name: String,
    pub code: Option<String>,
    pub style: Option<String>,
    pub bjcp_style_code: Option<String>,
    pub bjcp_style_name: Option<String>,
    pub notes: Option<String>,
    pub is_public: bool,
    pub is_draft: bool,
    pub date_brewed: Option<NaiveDate>,
    pub bottling_date: Option<NaiveDate>,
    pub carbonation_type: Option<String>,
    pub carbonation_level: Option<String>,
}

/// A validated fermentation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    pub date: NaiveDate,
    pub name: Option<String>,
    pub og: Option<f64>,
    pub fg: Option<f64>,
    pub volume: Option<f64>,
    pub temperature: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInput {
    pub date: NaiveDate,
    pub text: String,
}

/// A saved step together with the neighbor writes committed alongside it and
/// the brew's chain as it stands after the commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepWrite {
    pub step: fermentation_step::Model,
    pub updates: Vec<GravityUpdate>,
    pub chain: FermentationChain,
}

/// Dashboard lists of brews in a given phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dashboard {
    Fermenting,
    Maturing,
    OnTap,
}

impl Dashboard {
    pub fn phase(self) -> BrewPhase {
        match self {
            Dashboard::Fermenting => BrewPhase::Fermenting,
            Dashboard::Maturing => BrewPhase::Maturing,
            Dashboard::OnTap => BrewPhase::Tapped,
        }
    }

    fn condition(self, today: NaiveDate) -> Condition {
        match self {
            Dashboard::Fermenting => Condition::all()
                .add(brew::Column::DateBrewed.lte(today))
                .add(brew::Column::BottlingDate.is_null())
                .add(brew::Column::Tapped.is_null())
                .add(brew::Column::Finished.is_null()),
            Dashboard::Maturing => Condition::all()
                .add(brew::Column::BottlingDate.lte(today))
                .add(brew::Column::Tapped.is_null())
                .add(brew::Column::Finished.is_null()),
            Dashboard::OnTap => Condition::all()
                .add(brew::Column::Tapped.lte(today))
                .add(brew::Column::Finished.is_null()),
        }
    }
}

/// Which dashboard entries to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardQuery {
    pub today: NaiveDate,
    pub limit: u64,
}

/// Ordering of the latest-brews lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recency {
    Created,
    /// By brew date. Brews without one are left out.
    Brewed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestQuery {
    pub recency: Recency,
    pub limit: u64,
    /// Leave out drafts, except the viewer's own.
    pub hide_drafts: bool,
}

/// Which neighbor of a brew within its brewery to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Previous,
    Next,
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, JournalError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

fn normalized_notes(notes: Option<&str>) -> Option<String> {
    text::non_empty(notes).map(|n| text::stars2deg(&n))
}

// ============================================================================
// Brewers
// ============================================================================

pub async fn create_brewer<C: ConnectionTrait>(
    db: &C,
    input: NewBrewer,
) -> Result<brewer::Model, JournalError> {
    let brewer = brewer::ActiveModel {
        id: NotSet,
        name: Set(input.name.trim().to_string()),
        email: Set(text::non_empty(input.email.as_deref())),
        is_public: Set(input.is_public),
        created_at: Set(Utc::now().timestamp()),
    };
    Ok(brewer.insert(db).await?)
}

pub async fn get_brewer<C: ConnectionTrait>(
    db: &C,
    brewer_id: i32,
) -> Result<Option<brewer::Model>, JournalError> {
    Ok(brewer::Entity::find_by_id(brewer_id).one(db).await?)
}

pub async fn update_brewer<C: ConnectionTrait>(
    db: &C,
    brewer: brewer::Model,
    input: NewBrewer,
) -> Result<brewer::Model, JournalError> {
    let mut active: brewer::ActiveModel = brewer.into();
    active.name = Set(input.name.trim().to_string());
    active.email = Set(text::non_empty(input.email.as_deref()));
    active.is_public = Set(input.is_public);
    Ok(active.update(db).await?)
}

pub async fn list_profiles<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
) -> Result<Vec<brewer::Model>, JournalError> {
    let filter = visible_filter(Listing::Profiles, viewer);
    Ok(brewer::Entity::find()
        .filter(filter.to_condition())
        .order_by_asc(brewer::Column::Name)
        .order_by_asc(brewer::Column::Id)
        .all(db)
        .await?)
}

/// Most recently registered brewers the viewer may see.
pub async fn latest_brewers<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
    limit: u64,
) -> Result<Vec<brewer::Model>, JournalError> {
    let filter = visible_filter(Listing::Profiles, viewer);
    Ok(brewer::Entity::find()
        .filter(filter.to_condition())
        .order_by_desc(brewer::Column::CreatedAt)
        .order_by_desc(brewer::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}

/// Remove a brewer with everything they own, and every tasting note they wrote
/// on someone else's brew.
pub async fn delete_brewer(db: &DatabaseConnection, brewer_id: i32) -> Result<(), JournalError> {
    let txn = db.begin().await?;
    let brewery_ids: Vec<i32> = brewery::Entity::find()
        .select_only()
        .column(brewery::Column::Id)
        .filter(brewery::Column::BrewerId.eq(brewer_id))
        .into_tuple()
        .all(&txn)
        .await?;
    let brew_ids: Vec<i32> = brew::Entity::find()
        .select_only()
        .column(brew::Column::Id)
        .filter(brew::Column::BreweryId.is_in(brewery_ids.clone()))
        .into_tuple()
        .all(&txn)
        .await?;
    let notes = tasting_note::Entity::delete_many()
        .filter(
            Condition::any()
                .add(tasting_note::Column::AuthorId.eq(brewer_id))
                .add(tasting_note::Column::BrewId.is_in(brew_ids.clone())),
        )
        .exec(&txn)
        .await?;
    fermentation_step::Entity::delete_many()
        .filter(fermentation_step::Column::BrewId.is_in(brew_ids.clone()))
        .exec(&txn)
        .await?;
    brew::Entity::delete_many()
        .filter(brew::Column::Id.is_in(brew_ids.clone()))
        .exec(&txn)
        .await?;
    brewery::Entity::delete_many()
        .filter(brewery::Column::BrewerId.eq(brewer_id))
        .exec(&txn)
        .await?;
    brewer::Entity::delete_by_id(brewer_id).exec(&txn).await?;
    txn.commit().await?;
    info!(
        brewer_id,
        breweries = brewery_ids.len(),
        brews = brew_ids.len(),
        notes = notes.rows_affected,
        "deleted brewer"
    );
    Ok(())
}

// ============================================================================
// Breweries
// ============================================================================

pub async fn create_brewery<C: ConnectionTrait>(
    db: &C,
    brewer_id: i32,
    input: BreweryInput,
) -> Result<brewery::Model, JournalError> {
    let brewery = brewery::ActiveModel {
        id: NotSet,
        brewer_id: Set(brewer_id),
        name: Set(input.name.trim().to_string()),
        description: Set(normalized_notes(input.description.as_deref())),
        established_date: Set(input.established_date),
        created_at: Set(Utc::now().timestamp()),
    };
    Ok(brewery.insert(db).await?)
}

pub async fn update_brewery<C: ConnectionTrait>(
    db: &C,
    brewery: brewery::Model,
    input: BreweryInput,
) -> Result<brewery::Model, JournalError> {
    let mut active: brewery::ActiveModel = brewery.into();
    active.name = Set(input.name.trim().to_string());
    active.description = Set(normalized_notes(input.description.as_deref()));
    active.established_date = Set(input.established_date);
    Ok(active.update(db).await?)
}

pub async fn get_brewery_record<C: ConnectionTrait>(
    db: &C,
    brewery_id: i32,
) -> Result<Option<BreweryRecord>, JournalError> {
    let Some(brewery) = brewery::Entity::find_by_id(brewery_id).one(db).await? else {
        return Ok(None);
    };
    let Some(brewer) = brewery.find_related(brewer::Entity).one(db).await? else {
        return Ok(None);
    };
    Ok(Some(BreweryRecord { brewery, brewer }))
}

fn breweries_where(filter: &Predicate) -> sea_orm::SelectTwo<brewery::Entity, brewer::Entity> {
    brewery::Entity::find()
        .find_also_related(brewer::Entity)
        .filter(filter.to_condition())
}

fn brewery_records(rows: Vec<(brewery::Model, Option<brewer::Model>)>) -> Vec<BreweryRecord> {
    rows.into_iter()
        .filter_map(|(brewery, brewer)| Some(BreweryRecord { brewery, brewer: brewer? }))
        .collect()
}

pub async fn list_breweries<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
) -> Result<Vec<BreweryRecord>, JournalError> {
    let rows = breweries_where(&visible_filter(Listing::Breweries, viewer))
        .order_by_asc(brewery::Column::Name)
        .order_by_asc(brewery::Column::Id)
        .all(db)
        .await?;
    Ok(brewery_records(rows))
}

/// Most recently created breweries the viewer may see.
pub async fn latest_breweries<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
    limit: u64,
) -> Result<Vec<BreweryRecord>, JournalError> {
    let rows = breweries_where(&visible_filter(Listing::Breweries, viewer))
        .order_by_desc(brewery::Column::CreatedAt)
        .order_by_desc(brewery::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(brewery_records(rows))
}

/// Breweries matching `filter` whose name starts with `prefix`, by name.
pub async fn search_breweries<C: ConnectionTrait>(
    db: &C,
    filter: &Predicate,
    prefix: &str,
) -> Result<Vec<BreweryRecord>, JournalError> {
    let rows = breweries_where(filter)
        .filter(brewery::Column::Name.starts_with(prefix))
        .order_by_asc(brewery::Column::Name)
        .order_by_asc(brewery::Column::Id)
        .all(db)
        .await?;
    Ok(brewery_records(rows))
}

/// Remove a brewery with every brew, step and tasting note beneath it.
pub async fn delete_brewery(db: &DatabaseConnection, brewery_id: i32) -> Result<(), JournalError> {
    let txn = db.begin().await?;
    let brew_ids: Vec<i32> = brew::Entity::find()
        .select_only()
        .column(brew::Column::Id)
        .filter(brew::Column::BreweryId.eq(brewery_id))
        .into_tuple()
        .all(&txn)
        .await?;
    if !brew_ids.is_empty() {
        tasting_note::Entity::delete_many()
            .filter(tasting_note::Column::BrewId.is_in(brew_ids.clone()))
            .exec(&txn)
            .await?;
        fermentation_step::Entity::delete_many()
            .filter(fermentation_step::Column::BrewId.is_in(brew_ids.clone()))
            .exec(&txn)
            .await?;
        brew::Entity::delete_many()
            .filter(brew::Column::BreweryId.eq(brewery_id))
            .exec(&txn)
            .await?;
    }
    brewery::Entity::delete_by_id(brewery_id).exec(&txn).await?;
    txn.commit().await?;
    info!(brewery_id, brews = brew_ids.len(), "deleted brewery");
    Ok(())
}

// ============================================================================
// Brews
// ============================================================================

fn brew_active_model(active: &mut brew::ActiveModel, input: BrewInput) {
    let code = text::non_empty(input.code.as_deref());
    let bjcp_code = text::non_empty(input.bjcp_style_code.as_deref());
    let bjcp_name = text::non_empty(input.bjcp_style_name.as_deref());
    active.bjcp_style = Set(text::bjcp_style(bjcp_code.as_deref(), bjcp_name.as_deref()));
    active.name = Set(input.name.trim().to_string());
    active.code = Set(code);
    active.style = Set(text::non_empty(input.style.as_deref()));
    active.bjcp_style_code = Set(bjcp_code);
    active.bjcp_style_name = Set(bjcp_name);
    active.notes = Set(normalized_notes(input.notes.as_deref()));
    active.is_public = Set(input.is_public);
    active.is_draft = Set(input.is_draft);
    active.date_brewed = Set(input.date_brewed);
    active.bottling_date = Set(input.bottling_date);
    active.carbonation_type = Set(text::non_empty(input.carbonation_type.as_deref()));
    active.carbonation_level = Set(text::non_empty(input.carbonation_level.as_deref()));
}

pub async fn create_brew<C: ConnectionTrait>(
    db: &C,
    brewery_id: i32,
    input: BrewInput,
) -> Result<brew::Model, JournalError> {
    let mut active = brew::ActiveModel {
        id: NotSet,
        brewery_id: Set(brewery_id),
        tapped: Set(None),
        finished: Set(None),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    };
    brew_active_model(&mut active, input);
    Ok(active.insert(db).await?)
}

pub async fn update_brew<C: ConnectionTrait>(
    db: &C,
    brew: brew::Model,
    input: BrewInput,
) -> Result<brew::Model, JournalError> {
    let mut active: brew::ActiveModel = brew.into();
    brew_active_model(&mut active, input);
    Ok(active.update(db).await?)
}

/// Apply a manual serving-state change. The caller checks the phase allows it.
pub async fn change_brew_state<C: ConnectionTrait>(
    db: &C,
    brew: brew::Model,
    action: StateAction,
    today: NaiveDate,
) -> Result<brew::Model, JournalError> {
    let brew_id = brew.id;
    let (tapped, finished) = action.serving_dates(today);
    let mut active: brew::ActiveModel = brew.into();
    active.tapped = Set(tapped);
    active.finished = Set(finished);
    let updated = active.update(db).await?;
    info!(brew_id, ?action, "brew state changed");
    Ok(updated)
}

pub async fn get_brew_record<C: ConnectionTrait>(
    db: &C,
    brew_id: i32,
) -> Result<Option<BrewRecord>, JournalError> {
    let Some(brew) = brew::Entity::find_by_id(brew_id).one(db).await? else {
        return Ok(None);
    };
    let Some(BreweryRecord { brewery, brewer }) = get_brewery_record(db, brew.brewery_id).await?
    else {
        return Ok(None);
    };
    Ok(Some(BrewRecord {
        brew,
        brewery,
        brewer,
    }))
}

/// Attach breweries and brewers to already filtered brews, keeping their order.
async fn brew_records<C: ConnectionTrait>(
    db: &C,
    brews: Vec<brew::Model>,
) -> Result<Vec<BrewRecord>, JournalError> {
    if brews.is_empty() {
        return Ok(Vec::new());
    }
    let brewery_ids: BTreeSet<i32> = brews.iter().map(|b| b.brewery_id).collect();
    let breweries: HashMap<i32, brewery::Model> = brewery::Entity::find()
        .filter(brewery::Column::Id.is_in(brewery_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();
    let brewer_ids: BTreeSet<i32> = breweries.values().map(|b| b.brewer_id).collect();
    let brewers: HashMap<i32, brewer::Model> = brewer::Entity::find()
        .filter(brewer::Column::Id.is_in(brewer_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    Ok(brews
        .into_iter()
        .filter_map(|brew| {
            let brewery = breweries.get(&brew.brewery_id)?.clone();
            let brewer = brewers.get(&brewery.brewer_id)?.clone();
            Some(BrewRecord {
                brew,
                brewery,
                brewer,
            })
        })
        .collect())
}

fn brews_where(filter: &Predicate) -> sea_orm::Select<brew::Entity> {
    brew::Entity::find()
        .join(JoinType::InnerJoin, brew::Relation::Brewery.def())
        .join(JoinType::InnerJoin, brewery::Relation::Brewer.def())
        .filter(filter.to_condition())
}

/// Drafts are listed for their owner only.
fn drafts_hidden(viewer: Viewer) -> Condition {
    let shown = Condition::any().add(brew::Column::IsDraft.eq(false));
    match viewer.id() {
        Some(id) => shown.add(brewer::Column::Id.eq(id)),
        None => shown,
    }
}

/// Brews the viewer may see, newest first, optionally within one brewery.
pub async fn list_brews<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
    brewery_id: Option<i32>,
) -> Result<Vec<BrewRecord>, JournalError> {
    let mut query = brews_where(&visible_filter(Listing::Brews, viewer));
    if let Some(brewery_id) = brewery_id {
        query = query.filter(brew::Column::BreweryId.eq(brewery_id));
    }
    let brews = query
        .order_by_desc(brew::Column::CreatedAt)
        .order_by_desc(brew::Column::Id)
        .all(db)
        .await?;
    brew_records(db, brews).await
}

/// The brewer's own brews in the given phase, most recently brewed first.
pub async fn list_dashboard<C: ConnectionTrait>(
    db: &C,
    brewer_id: i32,
    dashboard: Dashboard,
    query: DashboardQuery,
) -> Result<Vec<BrewRecord>, JournalError> {
    let brews = brews_where(&Predicate::OwnedBy(brewer_id))
        .filter(dashboard.condition(query.today))
        .order_by_desc(brew::Column::DateBrewed)
        .order_by_desc(brew::Column::Id)
        .limit(query.limit)
        .all(db)
        .await?;
    brew_records(db, brews).await
}

pub async fn latest_brews<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
    filter: &Predicate,
    query: LatestQuery,
) -> Result<Vec<BrewRecord>, JournalError> {
    let mut select = brews_where(filter);
    if query.hide_drafts {
        select = select.filter(drafts_hidden(viewer));
    }
    let column = match query.recency {
        Recency::Created => brew::Column::CreatedAt,
        Recency::Brewed => {
            select = select.filter(brew::Column::DateBrewed.is_not_null());
            brew::Column::DateBrewed
        }
    };
    let brews = select
        .order_by_desc(column)
        .order_by_desc(brew::Column::Id)
        .limit(query.limit)
        .all(db)
        .await?;
    brew_records(db, brews).await
}

/// Brews matching `filter` whose name starts with `prefix`, by name.
pub async fn search_brews<C: ConnectionTrait>(
    db: &C,
    filter: &Predicate,
    prefix: &str,
) -> Result<Vec<BrewRecord>, JournalError> {
    let brews = brews_where(filter)
        .filter(brew::Column::Name.starts_with(prefix))
        .order_by_asc(brew::Column::Name)
        .order_by_asc(brew::Column::Id)
        .all(db)
        .await?;
    brew_records(db, brews).await
}

/// The nearest brew of the same brewery, by id, that the viewer may see.
pub async fn adjacent_brew<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
    brew: &brew::Model,
    direction: Direction,
) -> Result<Option<BrewRecord>, JournalError> {
    let select = brews_where(&visible_filter(Listing::Brews, viewer))
        .filter(brew::Column::BreweryId.eq(brew.brewery_id));
    let select = match direction {
        Direction::Previous => select
            .filter(brew::Column::Id.lt(brew.id))
            .order_by_desc(brew::Column::Id),
        Direction::Next => select
            .filter(brew::Column::Id.gt(brew.id))
            .order_by_asc(brew::Column::Id),
    };
    let Some(found) = select.one(db).await? else {
        return Ok(None);
    };
    Ok(brew_records(db, vec![found]).await?.pop())
}

/// Remove a brew with its fermentation steps and tasting notes.
pub async fn delete_brew(db: &DatabaseConnection, brew_id: i32) -> Result<(), JournalError> {
    let txn = db.begin().await?;
    let notes = tasting_note::Entity::delete_many()
        .filter(tasting_note::Column::BrewId.eq(brew_id))
        .exec(&txn)
        .await?;
    let steps = fermentation_step::Entity::delete_many()
        .filter(fermentation_step::Column::BrewId.eq(brew_id))
        .exec(&txn)
        .await?;
    brew::Entity::delete_by_id(brew_id).exec(&txn).await?;
    txn.commit().await?;
    info!(
        brew_id,
        steps = steps.rows_affected,
        notes = notes.rows_affected,
        "deleted brew"
    );
    Ok(())
}

// ============================================================================
// Fermentation steps
// ============================================================================

pub async fn get_step<C: ConnectionTrait>(
    db: &C,
    step_id: i32,
) -> Result<Option<fermentation_step::Model>, JournalError> {
    Ok(fermentation_step::Entity::find_by_id(step_id).one(db).await?)
}

/// The brew's steps ordered by date, then by insertion.
pub async fn load_chain<C: ConnectionTrait>(
    db: &C,
    brew_id: i32,
) -> Result<FermentationChain, JournalError> {
    let steps = fermentation_step::Entity::find()
        .filter(fermentation_step::Column::BrewId.eq(brew_id))
        .order_by_asc(fermentation_step::Column::Date)
        .order_by_asc(fermentation_step::Column::Id)
        .all(db)
        .await?;
    Ok(FermentationChain::new(brew_id, steps))
}

async fn write_gravity<C: ConnectionTrait>(
    db: &C,
    update: &GravityUpdate,
) -> Result<(), JournalError> {
    let column = match update.gravity {
        Gravity::Original => fermentation_step::Column::Og,
        Gravity::Final => fermentation_step::Column::Fg,
    };
    fermentation_step::Entity::update_many()
        .col_expr(column, Expr::value(update.value))
        .filter(fermentation_step::Column::Id.eq(update.step_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Reload the chain around a freshly saved step and write its neighbors.
async fn propagate<C: ConnectionTrait>(
    db: &C,
    step: &fermentation_step::Model,
) -> Result<(FermentationChain, Vec<GravityUpdate>), JournalError> {
    let mut chain = load_chain(db, step.brew_id).await?;
    let updates = chain.propagate(step);
    for update in &updates {
        write_gravity(db, update).await?;
    }
    if !updates.is_empty() {
        debug!(
            brew_id = step.brew_id,
            step_id = step.id,
            ?updates,
            "propagated gravity to neighboring steps"
        );
    }
    chain.apply(&updates);
    Ok((chain, updates))
}

fn step_fields(active: &mut fermentation_step::ActiveModel, input: StepInput) {
    active.date = Set(input.date);
    active.name = Set(text::non_empty(input.name.as_deref()));
    active.og = Set(input.og);
    active.fg = Set(input.fg);
    active.volume = Set(input.volume);
    active.temperature = Set(input.temperature);
    active.notes = Set(normalized_notes(input.notes.as_deref()));
}

/// Insert a step and stitch its neighbors in a single transaction.
///
/// Two saves on the same brew may run concurrently. Each reads its neighbors
/// inside its own transaction, so the last one to commit wins.
pub async fn insert_step(
    db: &DatabaseConnection,
    brew_id: i32,
    input: StepInput,
) -> Result<StepWrite, JournalError> {
    let txn = db.begin().await?;
    let mut active = fermentation_step::ActiveModel {
        id: NotSet,
        brew_id: Set(brew_id),
        ..Default::default()
    };
    step_fields(&mut active, input);
    let step = active.insert(&txn).await?;
    let (chain, updates) = propagate(&txn, &step).await?;
    txn.commit().await?;
    Ok(StepWrite {
        step,
        updates,
        chain,
    })
}

/// Update a step and stitch its neighbors at its (possibly new) position.
///
/// Concurrent saves on one brew are last-writer-wins, as with [`insert_step`].
pub async fn update_step(
    db: &DatabaseConnection,
    step: fermentation_step::Model,
    input: StepInput,
) -> Result<StepWrite, JournalError> {
    let txn = db.begin().await?;
    let mut active: fermentation_step::ActiveModel = step.into();
    step_fields(&mut active, input);
    let step = active.update(&txn).await?;
    let (chain, updates) = propagate(&txn, &step).await?;
    txn.commit().await?;
    Ok(StepWrite {
        step,
        updates,
        chain,
    })
}

/// Neighbors keep the readings they were stitched with.
pub async fn delete_step<C: ConnectionTrait>(db: &C, step_id: i32) -> Result<(), JournalError> {
    fermentation_step::Entity::delete_by_id(step_id).exec(db).await?;
    Ok(())
}

// ============================================================================
// Tasting notes
// ============================================================================

pub async fn create_note<C: ConnectionTrait>(
    db: &C,
    brew_id: i32,
    author_id: i32,
    input: NoteInput,
) -> Result<tasting_note::Model, JournalError> {
    let note = tasting_note::ActiveModel {
        id: NotSet,
        brew_id: Set(brew_id),
        author_id: Set(author_id),
        date: Set(input.date),
        text: Set(text::stars2deg(input.text.trim())),
    };
    Ok(note.insert(db).await?)
}

pub async fn update_note<C: ConnectionTrait>(
    db: &C,
    note: tasting_note::Model,
    input: NoteInput,
) -> Result<tasting_note::Model, JournalError> {
    let mut active: tasting_note::ActiveModel = note.into();
    active.date = Set(input.date);
    active.text = Set(text::stars2deg(input.text.trim()));
    Ok(active.update(db).await?)
}

pub async fn delete_note<C: ConnectionTrait>(db: &C, note_id: i32) -> Result<(), JournalError> {
    tasting_note::Entity::delete_by_id(note_id).exec(db).await?;
    Ok(())
}

pub async fn get_note_record<C: ConnectionTrait>(
    db: &C,
    note_id: i32,
) -> Result<Option<TastingNoteRecord>, JournalError> {
    let Some(note) = tasting_note::Entity::find_by_id(note_id).one(db).await? else {
        return Ok(None);
    };
    let Some(brew) = get_brew_record(db, note.brew_id).await? else {
        return Ok(None);
    };
    Ok(Some(TastingNoteRecord { note, brew }))
}

/// Notes on one brew, newest first. The brew itself is already authorized.
pub async fn list_notes<C: ConnectionTrait>(
    db: &C,
    brew: &BrewRecord,
) -> Result<Vec<TastingNoteRecord>, JournalError> {
    let notes = tasting_note::Entity::find()
        .filter(tasting_note::Column::BrewId.eq(brew.brew.id))
        .order_by_desc(tasting_note::Column::Date)
        .order_by_desc(tasting_note::Column::Id)
        .all(db)
        .await?;
    Ok(notes
        .into_iter()
        .map(|note| TastingNoteRecord {
            note,
            brew: brew.clone(),
        })
        .collect())
}

fn notes_where(filter: &Predicate) -> sea_orm::Select<tasting_note::Entity> {
    tasting_note::Entity::find()
        .join(JoinType::InnerJoin, tasting_note::Relation::Brew.def())
        .join(JoinType::InnerJoin, brew::Relation::Brewery.def())
        .join(JoinType::InnerJoin, brewery::Relation::Brewer.def())
        .filter(filter.to_condition())
        .order_by_desc(tasting_note::Column::Date)
        .order_by_desc(tasting_note::Column::Id)
}

/// Attach brew records to already filtered notes, keeping their order.
async fn note_records<C: ConnectionTrait>(
    db: &C,
    notes: Vec<tasting_note::Model>,
) -> Result<Vec<TastingNoteRecord>, JournalError> {
    let brew_ids: BTreeSet<i32> = notes.iter().map(|n| n.brew_id).collect();
    let brews = brew::Entity::find()
        .filter(brew::Column::Id.is_in(brew_ids))
        .all(db)
        .await?;
    let records: HashMap<i32, BrewRecord> = brew_records(db, brews)
        .await?
        .into_iter()
        .map(|r| (r.brew.id, r))
        .collect();

    Ok(notes
        .into_iter()
        .filter_map(|note| {
            let brew = records.get(&note.brew_id)?.clone();
            Some(TastingNoteRecord { note, brew })
        })
        .collect())
}

/// Tasting notes across the journal that the viewer may see, newest first.
pub async fn list_visible_notes<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
) -> Result<Vec<TastingNoteRecord>, JournalError> {
    let notes = notes_where(&visible_filter(Listing::TastingNotes, viewer))
        .all(db)
        .await?;
    note_records(db, notes).await
}

/// The newest visible notes, optionally only those written by `author_id`.
pub async fn latest_notes<C: ConnectionTrait>(
    db: &C,
    viewer: Viewer,
    author_id: Option<i32>,
    limit: u64,
) -> Result<Vec<TastingNoteRecord>, JournalError> {
    let mut select = notes_where(&visible_filter(Listing::TastingNotes, viewer));
    if let Some(author_id) = author_id {
        select = select.filter(tasting_note::Column::AuthorId.eq(author_id));
    }
    let notes = select.limit(limit).all(db).await?;
    note_records(db, notes).await
}
