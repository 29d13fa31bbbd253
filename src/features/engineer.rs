//! Feature engineering over the joined state tables.
//!
//! The education table drives row order. Mobility, health and nutrition are
//! left-joined by state; a state missing from one of them takes the column
//! median of the states that are present.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{BENCHMARK_STATE, DataCatalog, Target};
use crate::error::AppError;
use crate::math::stats::{max, mean, median};

/// Model input columns, in design-matrix order.
pub const FEATURE_NAMES: [&str; 21] = [
    "math_8th_grade",
    "reading_8th_grade",
    "academic_performance_index",
    "academic_excellence_score",
    "mobility_index",
    "income_25th_percentile",
    "income_75th_percentile",
    "income_inequality_ratio",
    "mobility_score",
    "child_mortality_rate",
    "infant_mortality_rate",
    "uninsured_children_pct",
    "health_investment_proxy",
    "free_lunch_eligible_pct",
    "school_breakfast_participation",
    "universal_meals",
    "policy_comprehensiveness",
    "education_health_synergy",
    "comprehensive_policy_score",
    "is_massachusetts",
    "policy_innovation_score",
];

/// Engineered features and targets for one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub state: String,

    pub math_8th_grade: f64,
    pub reading_8th_grade: f64,
    pub academic_performance_index: f64,
    pub academic_excellence_score: f64,

    pub mobility_index: f64,
    pub income_25th_percentile: f64,
    pub income_75th_percentile: f64,
    pub income_inequality_ratio: f64,
    pub mobility_score: f64,

    pub child_mortality_rate: f64,
    pub infant_mortality_rate: f64,
    pub uninsured_children_pct: f64,
    pub health_investment_proxy: f64,

    pub free_lunch_eligible_pct: f64,
    pub school_breakfast_participation: f64,
    /// 0.0 or 1.0.
    pub universal_meals: f64,
    pub policy_comprehensiveness: f64,

    pub education_health_synergy: f64,
    pub comprehensive_policy_score: f64,
    pub is_massachusetts: f64,
    pub policy_innovation_score: f64,

    pub human_capital_score: f64,
    pub projected_roi_20yr: f64,
    pub poverty_reduction_potential: f64,
}

impl FeatureRow {
    /// Feature values in `FEATURE_NAMES` order.
    pub fn features(&self) -> [f64; 21] {
        [
            self.math_8th_grade,
            self.reading_8th_grade,
            self.academic_performance_index,
            self.academic_excellence_score,
            self.mobility_index,
            self.income_25th_percentile,
            self.income_75th_percentile,
            self.income_inequality_ratio,
            self.mobility_score,
            self.child_mortality_rate,
            self.infant_mortality_rate,
            self.uninsured_children_pct,
            self.health_investment_proxy,
            self.free_lunch_eligible_pct,
            self.school_breakfast_participation,
            self.universal_meals,
            self.policy_comprehensiveness,
            self.education_health_synergy,
            self.comprehensive_policy_score,
            self.is_massachusetts,
            self.policy_innovation_score,
        ]
    }

    pub fn target(&self, target: Target) -> f64 {
        match target {
            Target::Roi20yr => self.projected_roi_20yr,
            Target::HumanCapital => self.human_capital_score,
            Target::PovertyReduction => self.poverty_reduction_potential,
        }
    }
}

/// Feature rows for every state, in education-table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, state: &str) -> Option<&FeatureRow> {
        self.rows.iter().find(|r| r.state == state)
    }

    pub fn states(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.state.clone()).collect()
    }

    /// `n × 21` design matrix.
    pub fn design_matrix(&self) -> DMatrix<f64> {
        let cols = FEATURE_NAMES.len();
        DMatrix::from_fn(self.rows.len(), cols, |i, j| self.rows[i].features()[j])
    }

    pub fn target(&self, target: Target) -> Vec<f64> {
        self.rows.iter().map(|r| r.target(target)).collect()
    }

    /// Values of one column by its feature name.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = FEATURE_NAMES.iter().position(|n| *n == name)?;
        Some(self.rows.iter().map(|r| r.features()[idx]).collect())
    }
}

/// Raw joined indicators before derivation; `None` marks a missing join.
struct JoinedRow {
    state: String,
    math8: f64,
    reading8: f64,
    indicators: [Option<f64>; 9],
}

// Index into `JoinedRow::indicators`.
const MOBILITY: usize = 0;
const INCOME_25: usize = 1;
const INCOME_75: usize = 2;
const CHILD_MORTALITY: usize = 3;
const INFANT_MORTALITY: usize = 4;
const UNINSURED: usize = 5;
const FREE_LUNCH: usize = 6;
const BREAKFAST: usize = 7;
const UNIVERSAL: usize = 8;

const INDICATOR_NAMES: [&str; 9] = [
    "mobility_index",
    "income_25th_percentile",
    "income_75th_percentile",
    "child_mortality_rate",
    "infant_mortality_rate",
    "uninsured_children_pct",
    "free_lunch_eligible_pct",
    "school_breakfast_participation",
    "universal_meals",
];

/// Join the state tables and derive every feature and target column.
pub fn prepare_features(catalog: &DataCatalog) -> Result<FeatureTable, AppError> {
    if catalog.education.is_empty() {
        return Err(AppError::data("Feature engineering requires education data."));
    }

    let joined: Vec<JoinedRow> = catalog
        .education
        .iter()
        .map(|edu| {
            let mob = catalog.mobility_for(&edu.state);
            let health = catalog.health_for(&edu.state);
            let nutr = catalog.nutrition_for(&edu.state);
            JoinedRow {
                state: edu.state.clone(),
                math8: edu.math_8th_grade,
                reading8: edu.reading_8th_grade,
                indicators: [
                    mob.map(|m| m.mobility_index),
                    mob.map(|m| m.income_25th_percentile),
                    mob.map(|m| m.income_75th_percentile),
                    health.map(|h| h.child_mortality_rate),
                    health.map(|h| h.infant_mortality_rate),
                    health.map(|h| h.uninsured_children_pct),
                    nutr.map(|n| n.free_lunch_eligible_pct),
                    nutr.map(|n| n.school_breakfast_participation),
                    nutr.map(|n| if n.universal_meals { 1.0 } else { 0.0 }),
                ],
            }
        })
        .collect();

    let filled = fill_missing_with_median(&joined)?;

    let math: Vec<f64> = joined.iter().map(|r| r.math8).collect();
    let reading: Vec<f64> = joined.iter().map(|r| r.reading8).collect();
    let math_max = max(&math).unwrap_or(1.0);
    let reading_max = max(&reading).unwrap_or(1.0);

    let mut rows: Vec<FeatureRow> = joined
        .iter()
        .zip(&filled)
        .map(|(raw, v)| {
            let api = raw.math8 * 0.5 + raw.reading8 * 0.5;
            let aes = raw.math8 / math_max * 50.0 + raw.reading8 / reading_max * 50.0;
            let mobility_score = v[MOBILITY] * 10.0;
            let hip = (100.0 - v[CHILD_MORTALITY] * 5.0 + 100.0 - v[UNINSURED]) / 2.0;
            let pc = (v[BREAKFAST] / 100.0 * 0.4 + v[UNIVERSAL] * 0.6) * 100.0;
            FeatureRow {
                state: raw.state.clone(),
                math_8th_grade: raw.math8,
                reading_8th_grade: raw.reading8,
                academic_performance_index: api,
                academic_excellence_score: aes,
                mobility_index: v[MOBILITY],
                income_25th_percentile: v[INCOME_25],
                income_75th_percentile: v[INCOME_75],
                income_inequality_ratio: v[INCOME_75] / v[INCOME_25],
                mobility_score,
                child_mortality_rate: v[CHILD_MORTALITY],
                infant_mortality_rate: v[INFANT_MORTALITY],
                uninsured_children_pct: v[UNINSURED],
                health_investment_proxy: hip,
                free_lunch_eligible_pct: v[FREE_LUNCH],
                school_breakfast_participation: v[BREAKFAST],
                universal_meals: v[UNIVERSAL],
                policy_comprehensiveness: pc,
                education_health_synergy: api * hip / 100.0,
                comprehensive_policy_score: aes * 0.3 + mobility_score * 0.3 + hip * 0.2 + pc * 0.2,
                is_massachusetts: if raw.state == BENCHMARK_STATE { 1.0 } else { 0.0 },
                policy_innovation_score: 0.0,
                human_capital_score: 0.0,
                projected_roi_20yr: 0.0,
                poverty_reduction_potential: 0.0,
            }
        })
        .collect();

    derive_targets(&mut rows);
    for row in &mut rows {
        row.policy_innovation_score = innovation_score(row);
    }

    info!(features = FEATURE_NAMES.len(), states = rows.len(), "engineered features");
    Ok(FeatureTable { rows })
}

fn fill_missing_with_median(joined: &[JoinedRow]) -> Result<Vec<[f64; 9]>, AppError> {
    let mut medians = [0.0; 9];
    for (k, name) in INDICATOR_NAMES.iter().enumerate() {
        let present: Vec<f64> = joined.iter().filter_map(|r| r.indicators[k]).collect();
        if present.len() < joined.len() {
            warn!(
                column = *name,
                missing = joined.len() - present.len(),
                "filling missing values with column median"
            );
        }
        medians[k] = median(&present)
            .ok_or_else(|| AppError::data(format!("No state has a value for '{name}'.")))?;
    }

    Ok(joined
        .iter()
        .map(|r| {
            let mut out = [0.0; 9];
            for k in 0..9 {
                out[k] = r.indicators[k].unwrap_or(medians[k]);
            }
            out
        })
        .collect())
}

fn derive_targets(rows: &mut [FeatureRow]) {
    let api: Vec<f64> = rows.iter().map(|r| r.academic_performance_index).collect();
    let mobility: Vec<f64> = rows.iter().map(|r| r.mobility_index).collect();
    let ms: Vec<f64> = rows.iter().map(|r| r.mobility_score).collect();

    let api_max = max(&api).unwrap_or(1.0);
    let api_mean = mean(&api).unwrap_or(0.0);
    let mobility_max = max(&mobility).unwrap_or(1.0);
    let ms_mean = mean(&ms).unwrap_or(0.0);

    for r in rows.iter_mut() {
        let is_ma = r.is_massachusetts;

        r.human_capital_score = r.academic_performance_index / api_max * 40.0
            + r.mobility_index / mobility_max * 30.0
            + r.health_investment_proxy / 100.0 * 20.0
            + r.policy_comprehensiveness / 100.0 * 10.0;

        let roi = 3.5
            + is_ma * 1.2
            + (r.academic_performance_index - api_mean) / 100.0
            + (r.health_investment_proxy - 50.0) / 200.0
            + r.policy_comprehensiveness / 500.0;
        r.projected_roi_20yr = roi.clamp(2.0, 6.0);

        let poverty = 15.0
            + is_ma * 10.0
            + (r.academic_excellence_score - 50.0) / 5.0
            + (r.mobility_score - ms_mean) / 2.0;
        r.poverty_reduction_potential = poverty.clamp(5.0, 40.0);
    }
}

/// Additive policy innovation points (0..=100).
pub fn innovation_score(row: &FeatureRow) -> f64 {
    let mut score = 0.0;
    if row.universal_meals == 1.0 {
        score += 25.0;
    }
    if row.academic_performance_index > 275.0 {
        score += 20.0;
    }
    if row.mobility_index > 6.0 {
        score += 20.0;
    }
    if row.uninsured_children_pct < 4.0 {
        score += 20.0;
    }
    if row.school_breakfast_participation > 80.0 {
        score += 15.0;
    }
    score
}
