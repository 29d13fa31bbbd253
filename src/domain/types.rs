//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during feature engineering and training
//! - exported to CSV/JSON caches
//! - embedded in chart payloads

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// State code used as the benchmark row in scenarios and charts.
pub const BENCHMARK_STATE: &str = "MA";

/// Country label that stands in for Massachusetts in the international table.
pub const BENCHMARK_COUNTRY: &str = "Massachusetts";

/// The ten states every table covers, in canonical order.
pub const ALL_STATES: [&str; 10] = ["MA", "TX", "CA", "NY", "FL", "AL", "MS", "VT", "CT", "NH"];

/// Where a record came from and when it was assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub data_source: String,
    pub collection_date: DateTime<Local>,
}

impl Provenance {
    pub fn new(data_source: &str, collection_date: DateTime<Local>) -> Self {
        Self {
            data_source: data_source.to_string(),
            collection_date,
        }
    }
}

/// NAEP scale scores for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub state: String,
    pub year: i32,
    pub math_8th_grade: f64,
    pub reading_8th_grade: f64,
    pub math_4th_grade: f64,
    pub reading_4th_grade: f64,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Economic mobility indicators for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobilityRecord {
    pub state: String,
    pub mobility_index: f64,
    pub income_25th_percentile: f64,
    pub income_75th_percentile: f64,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Child health outcomes for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub state: String,
    pub child_mortality_rate: f64,
    pub infant_mortality_rate: f64,
    pub uninsured_children_pct: f64,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// School nutrition program coverage for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub state: String,
    pub free_lunch_eligible_pct: f64,
    pub school_breakfast_participation: f64,
    /// `true` when the state runs universal free school meals.
    pub universal_meals: bool,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Country-level (plus Massachusetts) benchmark row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternationalRecord {
    pub country: String,
    pub education_spending_gdp: f64,
    pub child_poverty_rate: f64,
    pub pisa_math_score: f64,
    pub social_mobility_index: f64,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// All datasets gathered for a run.
#[derive(Debug, Clone, Default)]
pub struct DataCatalog {
    pub education: Vec<EducationRecord>,
    pub mobility: Vec<MobilityRecord>,
    pub health: Vec<HealthRecord>,
    pub nutrition: Vec<NutritionRecord>,
    pub international: Vec<InternationalRecord>,
}

impl DataCatalog {
    pub fn education_for(&self, state: &str) -> Option<&EducationRecord> {
        self.education.iter().find(|r| r.state == state)
    }

    pub fn mobility_for(&self, state: &str) -> Option<&MobilityRecord> {
        self.mobility.iter().find(|r| r.state == state)
    }

    pub fn health_for(&self, state: &str) -> Option<&HealthRecord> {
        self.health.iter().find(|r| r.state == state)
    }

    pub fn nutrition_for(&self, state: &str) -> Option<&NutritionRecord> {
        self.nutrition.iter().find(|r| r.state == state)
    }

    /// Names of the datasets in collection order.
    pub fn dataset_names(&self) -> Vec<&'static str> {
        vec!["education", "mobility", "health", "nutrition", "international"]
    }

    pub fn total_records(&self) -> usize {
        self.education.len()
            + self.mobility.len()
            + self.health.len()
            + self.nutrition.len()
            + self.international.len()
    }
}

/// Prediction targets trained by the model suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Roi20yr,
    HumanCapital,
    PovertyReduction,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Roi20yr, Target::HumanCapital, Target::PovertyReduction];

    /// Stable identifier used in file names and CSV headers.
    pub fn key(self) -> &'static str {
        match self {
            Target::Roi20yr => "roi_20yr",
            Target::HumanCapital => "human_capital",
            Target::PovertyReduction => "poverty_reduction",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Target::Roi20yr => "20-year ROI",
            Target::HumanCapital => "Human capital score",
            Target::PovertyReduction => "Poverty reduction potential",
        }
    }
}

/// Regressor families compared for every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    RandomForest,
    GradientBoosting,
    Ridge,
    ElasticNet,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
        ModelKind::Ridge,
        ModelKind::ElasticNet,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::RandomForest => "Random Forest",
            ModelKind::GradientBoosting => "Gradient Boosting",
            ModelKind::Ridge => "Ridge Regression",
            ModelKind::ElasticNet => "Elastic Net",
        }
    }
}

/// Named policy variant of the base feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyScenario {
    #[serde(rename = "Status Quo")]
    StatusQuo,
    #[serde(rename = "Massachusetts Model")]
    MassachusettsModel,
    #[serde(rename = "Universal Programs")]
    UniversalPrograms,
    #[serde(rename = "Comprehensive Reform")]
    ComprehensiveReform,
}

impl PolicyScenario {
    pub const ALL: [PolicyScenario; 4] = [
        PolicyScenario::StatusQuo,
        PolicyScenario::MassachusettsModel,
        PolicyScenario::UniversalPrograms,
        PolicyScenario::ComprehensiveReform,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            PolicyScenario::StatusQuo => "Status Quo",
            PolicyScenario::MassachusettsModel => "Massachusetts Model",
            PolicyScenario::UniversalPrograms => "Universal Programs",
            PolicyScenario::ComprehensiveReform => "Comprehensive Reform",
        }
    }
}

/// Held-out quality of one fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub r2: f64,
    pub mse: f64,
    pub mae: f64,
    pub n_test: usize,
}

/// One row of the scenario prediction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPrediction {
    pub scenario: PolicyScenario,
    pub state: String,
    pub roi_20yr: f64,
    pub human_capital: f64,
    pub poverty_reduction: f64,
    pub policy_innovation_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_keys_are_stable() {
        let keys: Vec<&str> = Target::ALL.iter().map(|t| t.key()).collect();
        assert_eq!(keys, vec!["roi_20yr", "human_capital", "poverty_reduction"]);
    }

    #[test]
    fn scenario_serializes_with_display_name() {
        let json = serde_json::to_string(&PolicyScenario::MassachusettsModel).unwrap();
        assert_eq!(json, "\"Massachusetts Model\"");
    }
}
