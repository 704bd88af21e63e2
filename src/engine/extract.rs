// Solution extraction: turn a raw optimal assignment into a validated
// shipment plan with a reconciled cost breakdown.

use log::{debug, info};

use crate::domain::models::Solution;
use crate::domain::network::Network;
use crate::domain::plan::{ActivatedFacility, CostBreakdown, Shipment, ShipmentPlan};
use crate::engine::bounds::FacilityRange;
use crate::engine::builder::VariableLayout;
use crate::engine::ExtractionConfig;
use crate::error::EngineError;

/// Relative tolerance for demand-satisfaction checks on the raw assignment.
const DEMAND_TOLERANCE: f64 = 1e-6;

/// Relative slack allowed on capacity before it counts as an overflow.
const CAPACITY_TOLERANCE: f64 = 1e-6;

pub fn extract_plan(
    network: &Network,
    range: &FacilityRange,
    layout: &VariableLayout,
    solution: &Solution,
    config: &ExtractionConfig,
) -> Result<ShipmentPlan, EngineError> {
    let objective_value = solution.objective_value.ok_or_else(|| {
        EngineError::NumericIntegrity("optimal solution carries no objective value".to_string())
    })?;
    let values = &solution.variable_values;
    if values.len() != layout.num_variables() {
        return Err(EngineError::NumericIntegrity(format!(
            "solver returned {} variable values, model has {}",
            values.len(),
            layout.num_variables()
        )));
    }

    let facilities = network.facilities();
    let demand_points = network.demand_points();

    // Binary open decisions come back as floating approximations; round with
    // a fixed threshold.
    let opened: Vec<bool> = (0..facilities.len())
        .map(|f| values[layout.open(f)] > config.open_threshold)
        .collect();

    audit_raw_assignment(network, layout, values, &opened, config)?;

    let mut shipments = Vec::new();
    let mut transport_total = 0.0;
    for (f, facility) in facilities.iter().enumerate() {
        if !opened[f] {
            continue;
        }
        for (d, point) in demand_points.iter().enumerate() {
            let quantity = values[layout.flow(f, d)];
            if quantity <= config.flow_epsilon {
                continue;
            }
            let cost_per_kg = network.route_cost(f, d).ok_or_else(|| {
                EngineError::Configuration(format!(
                    "route {} -> {} is missing from the cost matrix",
                    facility.warehouse_id, point.customer_id
                ))
            })?;
            let cost = quantity * cost_per_kg;
            transport_total += cost;
            shipments.push(Shipment {
                from_warehouse: facility.warehouse_id.clone(),
                to_customer_id: point.customer_id.clone(),
                quantity_kg: quantity,
                cost,
            });
        }
    }

    let mut activated = Vec::new();
    let mut fixed_total = 0.0;
    for (f, facility) in facilities.iter().enumerate() {
        if !opened[f] {
            continue;
        }
        let outbound: f64 = (0..demand_points.len())
            .map(|d| values[layout.flow(f, d)])
            .sum();
        let utilization = outbound / facility.monthly_capacity;
        if outbound <= config.flow_epsilon {
            return Err(EngineError::NumericIntegrity(format!(
                "warehouse {} is activated but ships nothing",
                facility.warehouse_id
            )));
        }
        if utilization > 1.0 + CAPACITY_TOLERANCE {
            return Err(EngineError::NumericIntegrity(format!(
                "warehouse {} ships {:.2} kg over its {:.2} kg capacity",
                facility.warehouse_id, outbound, facility.monthly_capacity
            )));
        }
        fixed_total += facility.fixed_cost;
        debug!(
            "warehouse {} open: {:.0} kg shipped, {:.1}% of capacity",
            facility.warehouse_id,
            outbound,
            utilization * 100.0
        );
        activated.push(ActivatedFacility {
            warehouse_id: facility.warehouse_id.clone(),
            fixed_cost: facility.fixed_cost,
            monthly_capacity: facility.monthly_capacity,
            outbound_kg: outbound,
            utilization,
        });
    }

    let costs = CostBreakdown {
        fixed: fixed_total,
        transport: transport_total,
    };
    let tolerance = config.objective_tolerance * objective_value.abs().max(1.0);
    if (costs.total() - objective_value).abs() > tolerance {
        return Err(EngineError::NumericIntegrity(format!(
            "cost breakdown {:.4} disagrees with solver objective {:.4}",
            costs.total(),
            objective_value
        )));
    }

    info!(
        "optimal plan: {} warehouses open, ${:.2} fixed + ${:.2} transport",
        activated.len(),
        costs.fixed,
        costs.transport
    );

    Ok(ShipmentPlan {
        activated,
        shipments,
        costs,
        objective_value,
        min_facilities: range.min,
        max_facilities: range.max,
        solve_time_ms: solution.statistics.solve_time_ms,
        native_status: solution.native_status.clone(),
    })
}

/// Invariant audit on the raw assignment, before epsilon suppression: every
/// demand point receives exactly its demand, and closed facilities carry no
/// flow.
fn audit_raw_assignment(
    network: &Network,
    layout: &VariableLayout,
    values: &[f64],
    opened: &[bool],
    config: &ExtractionConfig,
) -> Result<(), EngineError> {
    for (d, point) in network.demand_points().iter().enumerate() {
        let inbound: f64 = (0..network.num_facilities())
            .map(|f| values[layout.flow(f, d)])
            .sum();
        let tolerance = DEMAND_TOLERANCE * point.monthly_demand_kg.max(1.0);
        if (inbound - point.monthly_demand_kg).abs() > tolerance {
            return Err(EngineError::NumericIntegrity(format!(
                "customer {} receives {:.6} kg against a demand of {:.6} kg",
                point.customer_id, inbound, point.monthly_demand_kg
            )));
        }
    }
    for (f, facility) in network.facilities().iter().enumerate() {
        if opened[f] {
            continue;
        }
        for (d, point) in network.demand_points().iter().enumerate() {
            if values[layout.flow(f, d)] > config.flow_epsilon {
                return Err(EngineError::NumericIntegrity(format!(
                    "closed warehouse {} ships to customer {}",
                    facility.warehouse_id, point.customer_id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::network::{DemandPoint, Facility, Route};

    fn network_2x2() -> Network {
        let customers = vec![
            DemandPoint {
                customer_id: "C1".to_string(),
                city: "Seattle".to_string(),
                region: "West".to_string(),
                monthly_demand_kg: 60.0,
            },
            DemandPoint {
                customer_id: "C2".to_string(),
                city: "Boston".to_string(),
                region: "Northeast".to_string(),
                monthly_demand_kg: 40.0,
            },
        ];
        let warehouses = vec![
            Facility {
                warehouse_id: "WA".to_string(),
                monthly_capacity: 100.0,
                fixed_cost: 1000.0,
            },
            Facility {
                warehouse_id: "WB".to_string(),
                monthly_capacity: 50.0,
                fixed_cost: 400.0,
            },
        ];
        let routes = vec![
            ("WA", "C1", 2.0),
            ("WA", "C2", 3.0),
            ("WB", "C1", 4.0),
            ("WB", "C2", 1.0),
        ]
        .into_iter()
        .map(|(w, c, cost)| Route {
            from_warehouse: w.to_string(),
            to_customer_id: c.to_string(),
            cost_per_kg: Some(cost),
            distance_miles: None,
        })
        .collect();
        Network::new(customers, warehouses, routes).unwrap()
    }

    fn layout() -> VariableLayout {
        VariableLayout::new(2, 2)
    }

    fn range() -> FacilityRange {
        FacilityRange { min: 1, max: 2 }
    }

    fn optimal(objective: f64, values: Vec<f64>) -> Solution {
        Solution::optimal(objective, values).with_native_status("Optimal")
    }

    #[test]
    fn extracts_plan_with_reconciled_costs() {
        // WA open, serving both customers: 1000 + 60*2 + 40*3 = 1240
        let solution = optimal(1240.0, vec![1.0, 0.0, 60.0, 40.0, 0.0, 0.0]);
        let plan = extract_plan(
            &network_2x2(),
            &range(),
            &layout(),
            &solution,
            &ExtractionConfig::default(),
        )
        .unwrap();

        assert_eq!(plan.activated_ids(), vec!["WA"]);
        assert_eq!(plan.shipments.len(), 2);
        assert!((plan.costs.fixed - 1000.0).abs() < 1e-9);
        assert!((plan.costs.transport - 240.0).abs() < 1e-9);
        assert!((plan.activated[0].utilization - 1.0).abs() < 1e-9);
        assert_eq!(plan.min_facilities, 1);
        assert_eq!(plan.max_facilities, 2);
    }

    #[test]
    fn near_one_binaries_round_up_and_noise_flows_are_suppressed() {
        let solution = optimal(1240.0, vec![0.999, 1e-9, 60.0, 40.0, 1e-8, 0.0]);
        let plan = extract_plan(
            &network_2x2(),
            &range(),
            &layout(),
            &solution,
            &ExtractionConfig::default(),
        )
        .unwrap();

        assert_eq!(plan.activated_ids(), vec!["WA"]);
        // the 1e-8 kg flow out of closed WB is solver noise below epsilon: dropped
        assert_eq!(plan.shipments.len(), 2);
    }

    #[test]
    fn objective_mismatch_is_an_integrity_error() {
        let solution = optimal(9999.0, vec![1.0, 0.0, 60.0, 40.0, 0.0, 0.0]);
        let err = extract_plan(
            &network_2x2(),
            &range(),
            &layout(),
            &solution,
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NumericIntegrity(_)));
    }

    #[test]
    fn activated_but_idle_facility_is_an_integrity_error() {
        // both open, WB idle; objective matches the breakdown it would imply
        let solution = optimal(1640.0, vec![1.0, 1.0, 60.0, 40.0, 0.0, 0.0]);
        let err = extract_plan(
            &network_2x2(),
            &range(),
            &layout(),
            &solution,
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NumericIntegrity(_)));
    }

    #[test]
    fn closed_facility_with_real_flow_is_an_integrity_error() {
        let solution = optimal(1240.0, vec![1.0, 0.0, 60.0, 30.0, 0.0, 10.0]);
        let err = extract_plan(
            &network_2x2(),
            &range(),
            &layout(),
            &solution,
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NumericIntegrity(_)));
    }

    #[test]
    fn unmet_demand_is_an_integrity_error() {
        let solution = optimal(1120.0, vec![1.0, 0.0, 60.0, 0.0, 0.0, 0.0]);
        let err = extract_plan(
            &network_2x2(),
            &range(),
            &layout(),
            &solution,
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NumericIntegrity(_)));
    }

    #[test]
    fn capacity_overflow_is_an_integrity_error() {
        // WB alone ships 100 kg against a 50 kg capacity
        let solution = optimal(580.0, vec![0.0, 1.0, 0.0, 0.0, 60.0, 40.0]);
        let err = extract_plan(
            &network_2x2(),
            &range(),
            &layout(),
            &solution,
            &ExtractionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::NumericIntegrity(_)));
    }
}
