//! Literal indicator tables.
//!
//! Values are hypothetical, shaped after the public NAEP, Opportunity
//! Insights, CDC, USDA FNS and OECD/World Bank releases. Rows are listed in
//! `ALL_STATES` order.

use chrono::{DateTime, Local};

use crate::domain::{
    ALL_STATES, EducationRecord, HealthRecord, InternationalRecord, MobilityRecord, NutritionRecord,
    Provenance,
};

pub const SOURCE_NAEP: &str = "NAEP";
pub const SOURCE_MOBILITY: &str = "Opportunity_Insights";
pub const SOURCE_HEALTH: &str = "CDC";
pub const SOURCE_NUTRITION: &str = "USDA_FNS";
pub const SOURCE_INTERNATIONAL: &str = "OECD_WorldBank";

/// NAEP assessment year of the education table.
pub const NAEP_YEAR: i32 = 2023;

// (state, math 8th, reading 8th, math 4th, reading 4th)
const NAEP: [(&str, f64, f64, f64, f64); 10] = [
    ("MA", 295.0, 279.0, 253.0, 235.0),
    ("TX", 275.0, 260.0, 243.0, 217.0),
    ("CA", 270.0, 255.0, 238.0, 212.0),
    ("NY", 274.0, 264.0, 240.0, 220.0),
    ("FL", 273.0, 258.0, 241.0, 218.0),
    ("AL", 258.0, 248.0, 226.0, 208.0),
    ("MS", 256.0, 246.0, 224.0, 205.0),
    ("VT", 287.0, 273.0, 248.0, 230.0),
    ("CT", 284.0, 270.0, 245.0, 228.0),
    ("NH", 290.0, 275.0, 250.0, 232.0),
];

// (state, mobility index, income p25, income p75)
const MOBILITY: [(&str, f64, f64, f64); 10] = [
    ("MA", 7.5, 28400.0, 51200.0),
    ("TX", 5.2, 24800.0, 44300.0),
    ("CA", 6.1, 26200.0, 47800.0),
    ("NY", 5.8, 25900.0, 46500.0),
    ("FL", 4.9, 24100.0, 42700.0),
    ("AL", 4.2, 22800.0, 39200.0),
    ("MS", 3.8, 21900.0, 37500.0),
    ("VT", 7.1, 27600.0, 49800.0),
    ("CT", 6.8, 28100.0, 52400.0),
    ("NH", 7.3, 28800.0, 51900.0),
];

// (state, child mortality, infant mortality, uninsured children %)
const HEALTH: [(&str, f64, f64, f64); 10] = [
    ("MA", 3.2, 3.9, 1.8),
    ("TX", 5.8, 5.9, 10.7),
    ("CA", 4.1, 4.2, 4.2),
    ("NY", 4.3, 4.6, 3.1),
    ("FL", 5.2, 6.0, 7.8),
    ("AL", 7.1, 8.5, 5.9),
    ("MS", 8.2, 9.6, 6.8),
    ("VT", 3.8, 4.1, 2.3),
    ("CT", 3.5, 4.3, 2.7),
    ("NH", 3.4, 3.7, 3.2),
];

// (state, free lunch eligible %, breakfast participation %, universal meals)
const NUTRITION: [(&str, f64, f64, bool); 10] = [
    ("MA", 38.2, 87.4, true),
    ("TX", 62.3, 71.2, false),
    ("CA", 55.7, 78.9, true),
    ("NY", 51.4, 82.1, false),
    ("FL", 58.9, 74.6, false),
    ("AL", 66.8, 68.3, false),
    ("MS", 71.2, 65.7, false),
    ("VT", 42.1, 85.3, true),
    ("CT", 41.7, 84.9, false),
    ("NH", 35.8, 81.2, false),
];

// (country, education spending % GDP, child poverty %, PISA math, social mobility index)
const INTERNATIONAL: [(&str, f64, f64, f64, f64); 6] = [
    ("Finland", 6.8, 2.9, 507.0, 85.2),
    ("Denmark", 7.0, 2.7, 489.0, 85.8),
    ("Canada", 5.2, 7.6, 512.0, 78.9),
    ("Germany", 4.9, 9.6, 489.0, 78.1),
    ("United States", 3.7, 17.5, 478.0, 70.4),
    ("Massachusetts", 5.9, 9.7, 514.0, 76.8),
];

/// NAEP rows for the requested states; unknown codes are skipped.
///
/// `None` selects every state.
pub fn education_records(states: Option<&[&str]>, at: DateTime<Local>) -> Vec<EducationRecord> {
    let wanted: &[&str] = states.unwrap_or(&ALL_STATES);
    wanted
        .iter()
        .filter_map(|state| NAEP.iter().find(|row| row.0 == *state))
        .map(|&(state, m8, r8, m4, r4)| EducationRecord {
            state: state.to_string(),
            year: NAEP_YEAR,
            math_8th_grade: m8,
            reading_8th_grade: r8,
            math_4th_grade: m4,
            reading_4th_grade: r4,
            provenance: Provenance::new(SOURCE_NAEP, at),
        })
        .collect()
}

pub fn mobility_records(at: DateTime<Local>) -> Vec<MobilityRecord> {
    MOBILITY
        .iter()
        .map(|&(state, index, p25, p75)| MobilityRecord {
            state: state.to_string(),
            mobility_index: index,
            income_25th_percentile: p25,
            income_75th_percentile: p75,
            provenance: Provenance::new(SOURCE_MOBILITY, at),
        })
        .collect()
}

pub fn health_records(at: DateTime<Local>) -> Vec<HealthRecord> {
    HEALTH
        .iter()
        .map(|&(state, child, infant, uninsured)| HealthRecord {
            state: state.to_string(),
            child_mortality_rate: child,
            infant_mortality_rate: infant,
            uninsured_children_pct: uninsured,
            provenance: Provenance::new(SOURCE_HEALTH, at),
        })
        .collect()
}

pub fn nutrition_records(at: DateTime<Local>) -> Vec<NutritionRecord> {
    NUTRITION
        .iter()
        .map(|&(state, free_lunch, breakfast, universal)| NutritionRecord {
            state: state.to_string(),
            free_lunch_eligible_pct: free_lunch,
            school_breakfast_participation: breakfast,
            universal_meals: universal,
            provenance: Provenance::new(SOURCE_NUTRITION, at),
        })
        .collect()
}

pub fn international_records(at: DateTime<Local>) -> Vec<InternationalRecord> {
    INTERNATIONAL
        .iter()
        .map(|&(country, spending, poverty, pisa, social)| InternationalRecord {
            country: country.to_string(),
            education_spending_gdp: spending,
            child_poverty_rate: poverty,
            pisa_math_score: pisa,
            social_mobility_index: social,
            provenance: Provenance::new(SOURCE_INTERNATIONAL, at),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn education_defaults_to_all_states_in_order() {
        let rows = education_records(None, Local::now());
        let states: Vec<&str> = rows.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, ALL_STATES.to_vec());
        assert_eq!(rows[0].math_8th_grade, 295.0);
        assert!(rows.iter().all(|r| r.year == 2023 && r.provenance.data_source == "NAEP"));
    }

    #[test]
    fn education_skips_unknown_states() {
        let rows = education_records(Some(&["MS", "ZZ", "VT"]), Local::now());
        let states: Vec<&str> = rows.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["MS", "VT"]);
        assert_eq!(rows[0].reading_4th_grade, 205.0);
    }

    #[test]
    fn literal_values_match_published_table() {
        let now = Local::now();
        let health = health_records(now);
        let tx = health.iter().find(|r| r.state == "TX").unwrap();
        assert_eq!(tx.uninsured_children_pct, 10.7);

        let nutrition = nutrition_records(now);
        let universal: Vec<&str> = nutrition
            .iter()
            .filter(|r| r.universal_meals)
            .map(|r| r.state.as_str())
            .collect();
        assert_eq!(universal, vec!["MA", "CA", "VT"]);

        let intl = international_records(now);
        assert_eq!(intl.len(), 6);
        assert_eq!(intl.last().unwrap().pisa_math_score, 514.0);
    }
}
