//! Policy scenarios: fixed arithmetic transforms of the base feature table.
//!
//! Transforms only touch the columns they name. Derived columns (synergy,
//! composite scores, targets) keep their base values.

use crate::domain::{BENCHMARK_STATE, PolicyScenario};
use crate::features::engineer::FeatureTable;

/// Share of the gap to the benchmark state closed by the Massachusetts model.
pub const CONVERGENCE_SHARE: f64 = 0.8;

/// Build the variant of `base` for `scenario`.
pub fn apply_scenario(base: &FeatureTable, scenario: PolicyScenario) -> FeatureTable {
    match scenario {
        PolicyScenario::StatusQuo => base.clone(),
        PolicyScenario::MassachusettsModel => massachusetts_model(base),
        PolicyScenario::UniversalPrograms => universal_programs(base),
        PolicyScenario::ComprehensiveReform => comprehensive_reform(base),
    }
}

/// Every scenario applied to `base`, in `PolicyScenario::ALL` order.
pub fn all_scenarios(base: &FeatureTable) -> Vec<(PolicyScenario, FeatureTable)> {
    PolicyScenario::ALL
        .iter()
        .map(|&s| (s, apply_scenario(base, s)))
        .collect()
}

fn massachusetts_model(base: &FeatureTable) -> FeatureTable {
    let mut out = base.clone();

    if let Some(ma) = base.row(BENCHMARK_STATE) {
        let ma = ma.clone();
        for r in &mut out.rows {
            r.academic_performance_index = converge(r.academic_performance_index, ma.academic_performance_index);
            r.mobility_score = converge(r.mobility_score, ma.mobility_score);
            r.health_investment_proxy = converge(r.health_investment_proxy, ma.health_investment_proxy);
            r.policy_comprehensiveness = converge(r.policy_comprehensiveness, ma.policy_comprehensiveness);
        }
    }

    for r in &mut out.rows {
        r.universal_meals = 1.0;
        r.policy_innovation_score += 25.0;
    }
    out
}

fn universal_programs(base: &FeatureTable) -> FeatureTable {
    let mut out = base.clone();
    for r in &mut out.rows {
        r.universal_meals = 1.0;
        r.school_breakfast_participation = r.school_breakfast_participation.max(85.0);
        r.uninsured_children_pct = r.uninsured_children_pct.min(3.0);
        r.policy_comprehensiveness = r.policy_comprehensiveness.max(70.0);
    }
    out
}

fn comprehensive_reform(base: &FeatureTable) -> FeatureTable {
    let mut out = universal_programs(&massachusetts_model(base));
    for r in &mut out.rows {
        r.academic_performance_index += 10.0;
        r.mobility_score += 5.0;
        r.health_investment_proxy += 15.0;
        r.policy_innovation_score = 100.0;
    }
    out
}

fn converge(value: f64, target: f64) -> f64 {
    value + (target - value) * CONVERGENCE_SHARE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::build_catalog;
    use crate::features::prepare_features;
    use chrono::Local;

    fn base() -> FeatureTable {
        prepare_features(&build_catalog(Local::now())).unwrap()
    }

    #[test]
    fn status_quo_is_identity() {
        let b = base();
        assert_eq!(apply_scenario(&b, PolicyScenario::StatusQuo), b);
    }

    #[test]
    fn massachusetts_model_closes_eighty_percent_of_gap() {
        let b = base();
        let s = apply_scenario(&b, PolicyScenario::MassachusettsModel);
        let ms_before = b.row("MS").unwrap();
        let ms_after = s.row("MS").unwrap();
        let ma = b.row("MA").unwrap();

        let expected = ms_before.academic_performance_index
            + (ma.academic_performance_index - ms_before.academic_performance_index) * 0.8;
        assert!((ms_after.academic_performance_index - expected).abs() < 1e-9);
        assert_eq!(ms_after.universal_meals, 1.0);
        assert_eq!(ms_after.policy_innovation_score, ms_before.policy_innovation_score + 25.0);
        // Untouched derived column.
        assert_eq!(ms_after.education_health_synergy, ms_before.education_health_synergy);
        // The benchmark itself does not move.
        let ma_after = s.row("MA").unwrap();
        assert_eq!(ma_after.academic_performance_index, ma.academic_performance_index);
    }

    #[test]
    fn massachusetts_model_without_benchmark_only_sets_programs() {
        let mut b = base();
        b.rows.retain(|r| r.state != "MA");
        let s = apply_scenario(&b, PolicyScenario::MassachusettsModel);
        let tx_before = b.row("TX").unwrap();
        let tx_after = s.row("TX").unwrap();
        assert_eq!(tx_after.mobility_score, tx_before.mobility_score);
        assert_eq!(tx_after.universal_meals, 1.0);
    }

    #[test]
    fn universal_programs_floors_and_caps() {
        let s = apply_scenario(&base(), PolicyScenario::UniversalPrograms);
        for r in &s.rows {
            assert_eq!(r.universal_meals, 1.0);
            assert!(r.school_breakfast_participation >= 85.0);
            assert!(r.uninsured_children_pct <= 3.0);
            assert!(r.policy_comprehensiveness >= 70.0);
        }
        // MA breakfast 87.4 is already above the floor.
        assert_eq!(s.row("MA").unwrap().school_breakfast_participation, 87.4);
    }

    #[test]
    fn comprehensive_reform_stacks_improvements() {
        let b = base();
        let ma_model = apply_scenario(&b, PolicyScenario::MassachusettsModel);
        let reform = apply_scenario(&b, PolicyScenario::ComprehensiveReform);
        let before = ma_model.row("AL").unwrap();
        let after = reform.row("AL").unwrap();
        assert!((after.academic_performance_index - (before.academic_performance_index + 10.0)).abs() < 1e-9);
        assert!((after.health_investment_proxy - (before.health_investment_proxy + 15.0)).abs() < 1e-9);
        assert_eq!(after.policy_innovation_score, 100.0);
        assert!(after.uninsured_children_pct <= 3.0);
    }

    #[test]
    fn all_scenarios_in_order() {
        let names: Vec<&str> = all_scenarios(&base())
            .iter()
            .map(|(s, _)| s.display_name())
            .collect();
        assert_eq!(
            names,
            vec!["Status Quo", "Massachusetts Model", "Universal Programs", "Comprehensive Reform"]
        );
    }
}
