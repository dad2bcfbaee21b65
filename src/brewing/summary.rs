//! Figures derived from a brew and its fermentation chain.
//!
//! A summary is built once per request from an already loaded chain, so
//! repeated reads of `og`, `fg` or `abv` do not go back to the database.

use chrono::NaiveDate;
use serde::Serialize;

use super::calc::{self, Attenuation};
use super::chain::FermentationChain;
use super::lifecycle::{current_state, BrewState};
use super::text;
use crate::entities::brew;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrewSummary {
    pub brew_id: i32,
    pub full_name: String,
    pub state: BrewState,
    pub changeable: bool,
    pub og: Option<f64>,
    pub fg: Option<f64>,
    pub abv: Option<f64>,
    pub attenuation: Option<Attenuation>,
    pub fermentation_start_date: Option<NaiveDate>,
    pub brew_length: Option<f64>,
}

impl BrewSummary {
    pub fn derive(brew: &brew::Model, chain: &FermentationChain) -> Self {
        let state = current_state(brew);
        let og = chain.og();
        let fg = chain.fg();
        let (abv, attenuation) = match (og, fg) {
            (Some(og), Some(fg)) => {
                let bonus = calc::carbonation_bonus(
                    brew.carbonation_type.as_deref(),
                    brew.carbonation_level.as_deref(),
                );
                (
                    Some(calc::abv(og, fg, bonus)),
                    Attenuation::from_gravity(og, fg),
                )
            }
            _ => (None, None),
        };
        Self {
            brew_id: brew.id,
            full_name: text::full_name(brew.code.as_deref(), &brew.name),
            state,
            changeable: state.phase.is_changeable(),
            og,
            fg,
            abv,
            attenuation,
            fermentation_start_date: chain.fermentation_start_date(),
            brew_length: chain.brew_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::visibility::tests::brew_model;
    use crate::brewing::chain::tests::step;
    use crate::brewing::lifecycle::BrewPhase;

    #[test]
    fn test_summary_reads_chain_boundaries() {
        let mut brew = brew_model(1, 1, true);
        brew.code = Some("7".into());
        brew.date_brewed = NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut first = step(1, 1, Some(12.0), Some(6.0));
        first.volume = Some(20.0);
        let chain = FermentationChain::new(
            1,
            vec![first, step(2, 10, Some(6.0), Some(2.31))],
        );

        let summary = BrewSummary::derive(&brew, &chain);
        assert_eq!(summary.full_name, format!("#7 {}", brew.name));
        assert_eq!(summary.state.phase, BrewPhase::Fermenting);
        assert!(!summary.changeable);
        assert_eq!(summary.og, Some(12.0));
        assert_eq!(summary.fg, Some(2.31));
        assert!((summary.abv.unwrap() - 5.0).abs() < 1e-9);
        assert!(summary.attenuation.is_some());
        assert_eq!(summary.fermentation_start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(summary.brew_length, Some(20.0));
    }

    #[test]
    fn test_summary_without_readings() {
        let brew = brew_model(1, 1, true);
        let summary = BrewSummary::derive(&brew, &FermentationChain::new(1, vec![]));
        assert_eq!(summary.state.phase, BrewPhase::Planned);
        assert!(summary.abv.is_none());
        assert!(summary.attenuation.is_none());
        assert!(summary.fermentation_start_date.is_none());
    }
}
