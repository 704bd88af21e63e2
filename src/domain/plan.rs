// Typed optimization results passed between pipeline stages and handed to
// downstream consumers (reporting, persistence).

use std::fmt::Write as _;

use serde::Serialize;

/// One positive flow in the optimized plan.
#[derive(Debug, Clone, Serialize)]
pub struct Shipment {
    pub from_warehouse: String,
    pub to_customer_id: String,
    pub quantity_kg: f64,
    pub cost: f64,
}

/// An activated facility with its realized load.
#[derive(Debug, Clone, Serialize)]
pub struct ActivatedFacility {
    pub warehouse_id: String,
    pub fixed_cost: f64,
    pub monthly_capacity: f64,
    pub outbound_kg: f64,
    /// Outbound over capacity; in (0, 1] for every activated facility.
    pub utilization: f64,
}

/// Fixed and transport cost totals of a plan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CostBreakdown {
    pub fixed: f64,
    pub transport: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.fixed + self.transport
    }
}

/// Validated shipment plan extracted from an optimal solve.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentPlan {
    pub activated: Vec<ActivatedFacility>,
    pub shipments: Vec<Shipment>,
    pub costs: CostBreakdown,
    /// Objective value as reported by the solver; reconciled against `costs`
    /// during extraction.
    pub objective_value: f64,
    pub min_facilities: usize,
    pub max_facilities: usize,
    pub solve_time_ms: f64,
    pub native_status: String,
}

impl ShipmentPlan {
    pub fn activated_ids(&self) -> Vec<&str> {
        self.activated.iter().map(|f| f.warehouse_id.as_str()).collect()
    }

    pub fn is_activated(&self, warehouse_id: &str) -> bool {
        self.activated.iter().any(|f| f.warehouse_id == warehouse_id)
    }

    pub fn total_shipped_kg(&self) -> f64 {
        self.shipments.iter().map(|s| s.quantity_kg).sum()
    }

    /// Human-readable report of the plan.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "SUPPLY CHAIN OPTIMIZATION SUMMARY");
        let _ = writeln!(out, "=================================");
        let _ = writeln!(
            out,
            "Selected warehouses: {} (allowed {} to {})",
            self.activated.len(),
            self.min_facilities,
            self.max_facilities
        );
        for facility in &self.activated {
            let _ = writeln!(
                out,
                "  - {}: ${:.0}/month fixed, {:.0} kg shipped, {:.1}% of capacity",
                facility.warehouse_id,
                facility.fixed_cost,
                facility.outbound_kg,
                facility.utilization * 100.0
            );
        }
        let _ = writeln!(out, "Fixed costs:          ${:.2}", self.costs.fixed);
        let _ = writeln!(out, "Transportation costs: ${:.2}", self.costs.transport);
        let _ = writeln!(out, "Total monthly cost:   ${:.2}", self.costs.total());
        let _ = writeln!(
            out,
            "Solver status: {} in {:.1} ms",
            self.native_status, self.solve_time_ms
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> ShipmentPlan {
        ShipmentPlan {
            activated: vec![ActivatedFacility {
                warehouse_id: "W1".to_string(),
                fixed_cost: 1000.0,
                monthly_capacity: 100.0,
                outbound_kg: 80.0,
                utilization: 0.8,
            }],
            shipments: vec![
                Shipment {
                    from_warehouse: "W1".to_string(),
                    to_customer_id: "C1".to_string(),
                    quantity_kg: 50.0,
                    cost: 100.0,
                },
                Shipment {
                    from_warehouse: "W1".to_string(),
                    to_customer_id: "C2".to_string(),
                    quantity_kg: 30.0,
                    cost: 90.0,
                },
            ],
            costs: CostBreakdown {
                fixed: 1000.0,
                transport: 190.0,
            },
            objective_value: 1190.0,
            min_facilities: 1,
            max_facilities: 2,
            solve_time_ms: 3.2,
            native_status: "Optimal".to_string(),
        }
    }

    #[test]
    fn accessors_reflect_contents() {
        let plan = plan();
        assert_eq!(plan.activated_ids(), vec!["W1"]);
        assert!(plan.is_activated("W1"));
        assert!(!plan.is_activated("W2"));
        assert!((plan.total_shipped_kg() - 80.0).abs() < 1e-12);
        assert!((plan.costs.total() - 1190.0).abs() < 1e-12);
    }

    #[test]
    fn summary_names_every_activated_facility() {
        let text = plan().summary();
        assert!(text.contains("W1"));
        assert!(text.contains("Total monthly cost"));
    }
}
