//! Brew lifecycle phase, derived from the brew's dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::brew;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrewPhase {
    Planned,
    Fermenting,
    Finished,
    Tapped,
    Maturing,
}

impl BrewPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrewPhase::Planned => "planned",
            BrewPhase::Fermenting => "fermenting",
            BrewPhase::Finished => "finished",
            BrewPhase::Tapped => "tapped",
            BrewPhase::Maturing => "maturing",
        }
    }

    /// Only bottled brews can be tapped, untapped or finished by hand.
    pub fn is_changeable(&self) -> bool {
        matches!(
            self,
            BrewPhase::Finished | BrewPhase::Tapped | BrewPhase::Maturing
        )
    }
}

impl fmt::Display for BrewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrewState {
    pub phase: BrewPhase,
    /// Date the phase began; absent for planned brews.
    pub since: Option<NaiveDate>,
}

/// The dates a phase is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleDates {
    pub date_brewed: Option<NaiveDate>,
    pub bottling_date: Option<NaiveDate>,
    pub tapped: Option<NaiveDate>,
    pub finished: Option<NaiveDate>,
}

impl From<&brew::Model> for LifecycleDates {
    fn from(brew: &brew::Model) -> Self {
        Self {
            date_brewed: brew.date_brewed,
            bottling_date: brew.bottling_date,
            tapped: brew.tapped,
            finished: brew.finished,
        }
    }
}

impl LifecycleDates {
    /// First matching branch wins. `finished` outranks `tapped` even when the
    /// dates are out of order; nothing here validates date ordering.
    pub fn state(&self) -> BrewState {
        let (phase, since) = match (self.date_brewed, self.bottling_date) {
            (None, _) => (BrewPhase::Planned, None),
            (Some(brewed), None) => (BrewPhase::Fermenting, Some(brewed)),
            (Some(_), Some(bottled)) => match (self.finished, self.tapped) {
                (Some(finished), _) => (BrewPhase::Finished, Some(finished)),
                (None, Some(tapped)) => (BrewPhase::Tapped, Some(tapped)),
                (None, None) => (BrewPhase::Maturing, Some(bottled)),
            },
        };
        BrewState { phase, since }
    }
}

pub fn current_state(brew: &brew::Model) -> BrewState {
    LifecycleDates::from(brew).state()
}

/// Manual state transitions available once a brew is bottled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateAction {
    Tap,
    Untap,
    Available,
    Finish,
}

impl StateAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tap" => Some(StateAction::Tap),
            "untap" => Some(StateAction::Untap),
            "available" => Some(StateAction::Available),
            "finish" => Some(StateAction::Finish),
            _ => None,
        }
    }

    /// New `(tapped, finished)` dates after applying the action on `today`.
    pub fn serving_dates(self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self {
            StateAction::Tap => (Some(today), None),
            StateAction::Untap | StateAction::Available => (None, None),
            StateAction::Finish => (None, Some(today)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn dates(
        date_brewed: Option<NaiveDate>,
        bottling_date: Option<NaiveDate>,
        tapped: Option<NaiveDate>,
        finished: Option<NaiveDate>,
    ) -> LifecycleDates {
        LifecycleDates {
            date_brewed,
            bottling_date,
            tapped,
            finished,
        }
    }

    #[test]
    fn test_state_derivation_table() {
        let cases = [
            (dates(None, None, None, None), BrewPhase::Planned, None),
            (
                dates(date(2024, 1, 1), None, None, None),
                BrewPhase::Fermenting,
                date(2024, 1, 1),
            ),
            (
                dates(date(2024, 1, 1), date(2024, 2, 1), None, date(2024, 3, 1)),
                BrewPhase::Finished,
                date(2024, 3, 1),
            ),
            (
                dates(date(2024, 1, 1), date(2024, 2, 1), date(2024, 2, 15), None),
                BrewPhase::Tapped,
                date(2024, 2, 15),
            ),
            (
                dates(date(2024, 1, 1), date(2024, 2, 1), None, None),
                BrewPhase::Maturing,
                date(2024, 2, 1),
            ),
        ];
        for (input, phase, since) in cases {
            assert_eq!(input.state(), BrewState { phase, since }, "{input:?}");
        }
    }

    #[test]
    fn test_planned_ignores_later_dates() {
        let state = dates(None, date(2024, 2, 1), date(2024, 2, 15), None).state();
        assert_eq!(state.phase, BrewPhase::Planned);
        assert_eq!(state.since, None);
    }

    #[test]
    fn test_unbottled_brew_keeps_fermenting() {
        let state = dates(date(2024, 1, 1), None, date(2024, 2, 15), date(2024, 3, 1)).state();
        assert_eq!(state.phase, BrewPhase::Fermenting);
    }

    #[test]
    fn test_finished_outranks_tapped_even_when_earlier() {
        let state = dates(
            date(2024, 1, 1),
            date(2024, 2, 1),
            date(2024, 3, 10),
            date(2024, 3, 1),
        )
        .state();
        assert_eq!(state.phase, BrewPhase::Finished);
        assert_eq!(state.since, date(2024, 3, 1));
    }

    #[test]
    fn test_state_actions() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        assert_eq!(StateAction::Tap.serving_dates(today), (Some(today), None));
        assert_eq!(StateAction::Untap.serving_dates(today), (None, None));
        assert_eq!(StateAction::Available.serving_dates(today), (None, None));
        assert_eq!(StateAction::Finish.serving_dates(today), (None, Some(today)));
        assert_eq!(StateAction::parse("finish"), Some(StateAction::Finish));
        assert_eq!(StateAction::parse("drink"), None);
    }

    #[test]
    fn test_changeable_phases() {
        assert!(!BrewPhase::Planned.is_changeable());
        assert!(!BrewPhase::Fermenting.is_changeable());
        assert!(BrewPhase::Maturing.is_changeable());
        assert!(BrewPhase::Tapped.is_changeable());
        assert!(BrewPhase::Finished.is_changeable());
    }
}
