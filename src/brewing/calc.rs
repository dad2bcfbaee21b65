//! Gravity formulas. Gravities are in degrees Plato.

use serde::Serialize;

/// Divisor turning a Plato drop into percent alcohol by volume.
const ABV_DIVISOR: f64 = 1.938;
/// Ratio between real and apparent attenuation.
const REAL_ATTENUATION_FACTOR: f64 = 0.8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbonationType {
    ForcedInKeg,
    KegWithPriming,
    BottlesWithPriming,
}

impl CarbonationType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "forced in keg" => Some(Self::ForcedInKeg),
            "keg with priming" => Some(Self::KegWithPriming),
            "bottles with priming" => Some(Self::BottlesWithPriming),
            _ => None,
        }
    }

    pub fn is_priming(self) -> bool {
        matches!(self, Self::KegWithPriming | Self::BottlesWithPriming)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarbonationLevel {
    High,
    #[default]
    Normal,
    Low,
    VeryLow,
    None,
}

impl CarbonationLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            "low" => Some(Self::Low),
            "very low" => Some(Self::VeryLow),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Alcohol added by refermentation at this carbonation level.
    pub fn priming_bonus(self) -> f64 {
        match self {
            Self::High => 0.4,
            Self::Normal => 0.35,
            Self::Low => 0.3,
            Self::VeryLow => 0.15,
            Self::None => 0.0,
        }
    }
}

/// Alcohol bonus for a brew's carbonation settings; only priming adds alcohol.
pub fn carbonation_bonus(carbonation_type: Option<&str>, carbonation_level: Option<&str>) -> f64 {
    match carbonation_type.and_then(CarbonationType::parse) {
        Some(kind) if kind.is_priming() => carbonation_level
            .and_then(CarbonationLevel::parse)
            .unwrap_or_default()
            .priming_bonus(),
        _ => 0.0,
    }
}

pub fn abv(og: f64, fg: f64, from_carbonation: f64) -> f64 {
    (og - fg) / ABV_DIVISOR + from_carbonation
}

pub fn apparent_attenuation(og: f64, fg: f64) -> Option<f64> {
    if og == 0.0 {
        return None;
    }
    Some(100.0 * (og - fg) / og)
}

pub fn real_attenuation(og: f64, fg: f64) -> Option<f64> {
    apparent_attenuation(og, fg).map(|aa| REAL_ATTENUATION_FACTOR * aa)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attenuation {
    pub apparent: f64,
    pub real: f64,
}

impl Attenuation {
    pub fn from_gravity(og: f64, fg: f64) -> Option<Self> {
        Some(Self {
            apparent: apparent_attenuation(og, fg)?,
            real: real_attenuation(og, fg)?,
        })
    }
}
