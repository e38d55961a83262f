//! Department Aggregator Module
//! Reduces cleaned project records to per-department energy-economics
//! metrics.

use crate::data::ProjectRecord;
use rayon::prelude::*;
use std::collections::HashMap;

/// LCOE and subsidy arrive in thousands of COP; results are reported in COP.
const THOUSANDS: f64 = 1000.0;

/// The four scalar metrics of a department aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    WeightedCost,
    GenerationPerUser,
    PaymentPerUser,
    SubsidyTotal,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::WeightedCost,
        Metric::GenerationPerUser,
        Metric::PaymentPerUser,
        Metric::SubsidyTotal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::WeightedCost => "Weighted LCOE",
            Metric::GenerationPerUser => "Generation per User",
            Metric::PaymentPerUser => "Payment per User",
            Metric::SubsidyTotal => "Total Subsidy",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::WeightedCost => "COP/kWh",
            Metric::GenerationPerUser => "kWh/user",
            Metric::PaymentPerUser => "COP/user",
            Metric::SubsidyTotal => "COP",
        }
    }

    pub fn value(self, aggregate: &DepartmentAggregate) -> f64 {
        match self {
            Metric::WeightedCost => aggregate.weighted_cost,
            Metric::GenerationPerUser => aggregate.generation_per_user,
            Metric::PaymentPerUser => aggregate.payment_per_user,
            Metric::SubsidyTotal => aggregate.subsidy_total,
        }
    }
}

/// One output row, keyed by department. Immutable once computed.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentAggregate {
    pub department: String,
    pub total_users: f64,
    /// User-weighted average LCOE, COP/kWh.
    pub weighted_cost: f64,
    /// Lifetime generation per user, kWh.
    pub generation_per_user: f64,
    /// Average user payment after subsidy, COP.
    pub payment_per_user: f64,
    /// Summed subsidy, COP.
    pub subsidy_total: f64,
    pub solar_prop: f64,
    pub biomass_prop: f64,
    pub diesel_prop: f64,
}

/// Groups records by department and reduces each group.
pub struct Aggregator;

impl Aggregator {
    /// Reduce one department's records.
    ///
    /// Callers guarantee `user_count > 0` for every record, so `total_users`
    /// is never zero here.
    pub fn aggregate_department(
        department: &str,
        records: &[&ProjectRecord],
        subsidy_ratio: f64,
    ) -> DepartmentAggregate {
        let total_users: f64 = records.iter().map(|r| r.user_count).sum();

        let weighted_cost = records
            .iter()
            .map(|r| r.levelized_cost * THOUSANDS * r.user_count)
            .sum::<f64>()
            / total_users;

        let generation_per_user =
            records.iter().map(|r| r.generation).sum::<f64>() / total_users;

        let payment_per_user = records
            .iter()
            .map(|r| r.generation * r.levelized_cost * THOUSANDS * (1.0 - subsidy_ratio))
            .sum::<f64>()
            / total_users;

        let subsidy_total = records.iter().map(|r| r.subsidy * THOUSANDS).sum::<f64>();

        let sum_solar: f64 = records.iter().map(|r| r.solar_fraction).sum();
        let sum_biomass: f64 = records.iter().map(|r| r.biomass_fraction).sum();
        let sum_diesel: f64 = records.iter().map(|r| r.diesel_fraction).sum();
        let total = sum_solar + sum_biomass + sum_diesel;

        // All-zero mix stays at zero rather than dividing by zero.
        let (solar_prop, biomass_prop, diesel_prop) = if total > 0.0 {
            (
                sum_solar / total,
                sum_biomass / total,
                sum_diesel / total,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        DepartmentAggregate {
            department: department.to_string(),
            total_users,
            weighted_cost,
            generation_per_user,
            payment_per_user,
            subsidy_total,
            solar_prop,
            biomass_prop,
            diesel_prop,
        }
    }

    /// Group records by department and reduce each group in parallel.
    ///
    /// Output order is the departments' first-encounter order in the input;
    /// the parallel map runs over the pre-built order list, so the order is
    /// deterministic.
    pub fn aggregate(records: &[ProjectRecord], subsidy_ratio: f64) -> Vec<DepartmentAggregate> {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&ProjectRecord>> = HashMap::new();
        for record in records {
            let group = groups.entry(record.department.as_str()).or_default();
            if group.is_empty() {
                order.push(record.department.as_str());
            }
            group.push(record);
        }

        let aggregates: Vec<DepartmentAggregate> = order
            .par_iter()
            .map(|department| {
                Self::aggregate_department(department, &groups[department], subsidy_ratio)
            })
            .collect();

        log::info!(
            "aggregated {} records into {} departments",
            records.len(),
            aggregates.len()
        );
        aggregates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        department: &str,
        user_count: f64,
        levelized_cost: f64,
        generation: f64,
        subsidy: f64,
        mix: (f64, f64, f64),
    ) -> ProjectRecord {
        ProjectRecord {
            department: department.to_string(),
            user_count,
            levelized_cost,
            generation,
            subsidy,
            solar_fraction: mix.0,
            biomass_fraction: mix.1,
            diesel_fraction: mix.2,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn worked_two_record_example() {
        let records = vec![
            record("Choco", 10.0, 0.5, 100.0, 0.2, (1.0, 0.0, 0.0)),
            record("Choco", 20.0, 0.8, 200.0, 0.4, (0.0, 1.0, 0.0)),
        ];
        let aggregates = Aggregator::aggregate(&records, 0.5);
        assert_eq!(aggregates.len(), 1);

        let agg = &aggregates[0];
        assert_eq!(agg.department, "Choco");
        assert_close(agg.total_users, 30.0);
        // (500*10 + 800*20) / 30
        assert_close(agg.weighted_cost, 700.0);
        assert_close(agg.generation_per_user, 10.0);
        // (100*500*0.5 + 200*800*0.5) / 30
        assert_close(agg.payment_per_user, (100.0 * 500.0 * 0.5 + 200.0 * 800.0 * 0.5) / 30.0);
        // (0.2 + 0.4) * 1000
        assert_close(agg.subsidy_total, 600.0);
        assert_close(agg.solar_prop, 0.5);
        assert_close(agg.biomass_prop, 0.5);
        assert_close(agg.diesel_prop, 0.0);
    }

    #[test]
    fn weighted_cost_is_bounded_by_group_extremes() {
        let records = vec![
            record("Meta", 3.0, 0.42, 10.0, 0.0, (1.0, 0.0, 0.0)),
            record("Meta", 11.0, 0.97, 10.0, 0.0, (1.0, 0.0, 0.0)),
            record("Meta", 7.0, 0.61, 10.0, 0.0, (1.0, 0.0, 0.0)),
        ];
        let group: Vec<&ProjectRecord> = records.iter().collect();
        let agg = Aggregator::aggregate_department("Meta", &group, 0.5);
        assert!(agg.weighted_cost >= 0.42 * 1000.0);
        assert!(agg.weighted_cost <= 0.97 * 1000.0);
    }

    #[test]
    fn mix_proportions_sum_to_one_when_any_source_is_present() {
        let records = vec![
            record("Cauca", 5.0, 0.5, 10.0, 0.1, (0.3, 0.2, 0.0)),
            record("Cauca", 6.0, 0.5, 10.0, 0.1, (0.0, 0.4, 0.6)),
        ];
        let group: Vec<&ProjectRecord> = records.iter().collect();
        let agg = Aggregator::aggregate_department("Cauca", &group, 0.5);
        assert_close(agg.solar_prop + agg.biomass_prop + agg.diesel_prop, 1.0);
    }

    #[test]
    fn all_zero_mix_yields_zero_proportions() {
        let records = vec![
            record("Vichada", 5.0, 0.5, 10.0, 0.1, (0.0, 0.0, 0.0)),
            record("Vichada", 6.0, 0.5, 10.0, 0.1, (0.0, 0.0, 0.0)),
        ];
        let group: Vec<&ProjectRecord> = records.iter().collect();
        let agg = Aggregator::aggregate_department("Vichada", &group, 0.5);
        assert_eq!(agg.solar_prop, 0.0);
        assert_eq!(agg.biomass_prop, 0.0);
        assert_eq!(agg.diesel_prop, 0.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![
            record("Choco", 10.0, 0.5, 100.0, 0.2, (1.0, 0.0, 0.0)),
            record("Narino", 20.0, 0.8, 200.0, 0.4, (0.0, 1.0, 0.0)),
            record("Choco", 4.0, 0.3, 40.0, 0.1, (0.0, 0.0, 1.0)),
        ];
        let first = Aggregator::aggregate(&records, 0.5);
        let second = Aggregator::aggregate(&records, 0.5);
        assert_eq!(first, second);
    }

    #[test]
    fn every_department_appears_once_in_encounter_order() {
        let records = vec![
            record("Guaviare", 1.0, 0.5, 10.0, 0.0, (1.0, 0.0, 0.0)),
            record("Amazonas", 1.0, 0.5, 10.0, 0.0, (1.0, 0.0, 0.0)),
            record("Guaviare", 1.0, 0.5, 10.0, 0.0, (1.0, 0.0, 0.0)),
            record("Putumayo", 1.0, 0.5, 10.0, 0.0, (1.0, 0.0, 0.0)),
            record("Amazonas", 1.0, 0.5, 10.0, 0.0, (1.0, 0.0, 0.0)),
        ];
        let aggregates = Aggregator::aggregate(&records, 0.5);
        let departments: Vec<&str> = aggregates.iter().map(|a| a.department.as_str()).collect();
        assert_eq!(departments, vec!["Guaviare", "Amazonas", "Putumayo"]);
    }

    #[test]
    fn subsidy_ratio_scales_payment_only() {
        let records = vec![record("Cesar", 10.0, 0.5, 100.0, 0.2, (1.0, 0.0, 0.0))];
        let group: Vec<&ProjectRecord> = records.iter().collect();
        let free = Aggregator::aggregate_department("Cesar", &group, 1.0);
        let full = Aggregator::aggregate_department("Cesar", &group, 0.0);
        assert_close(free.payment_per_user, 0.0);
        assert_close(full.payment_per_user, 100.0 * 500.0 / 10.0);
        assert_close(free.weighted_cost, full.weighted_cost);
        assert_close(free.subsidy_total, full.subsidy_total);
    }

    #[test]
    fn empty_input_yields_no_aggregates() {
        assert!(Aggregator::aggregate(&[], 0.5).is_empty());
    }
}
