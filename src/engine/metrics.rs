// Business metrics comparing the optimized plan against a naive baseline.

use serde::Serialize;

use crate::domain::network::Network;
use crate::domain::plan::ShipmentPlan;

/// Planning metrics for an optimized network.
///
/// The baseline (every fixed cost paid, mean route cost applied to every
/// kilogram) ignores actual routing. It is a rough comparison anchor for
/// savings reporting, not a lower bound on achievable cost.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkMetrics {
    pub total_demand_kg: f64,
    pub cost_per_kg: f64,
    pub baseline_cost: f64,
    pub savings: f64,
    pub savings_pct: f64,
    pub annual_savings: f64,
}

pub fn network_metrics(network: &Network, plan: &ShipmentPlan) -> NetworkMetrics {
    let total_demand_kg = network.total_demand();
    let total_cost = plan.costs.total();
    let cost_per_kg = if total_demand_kg > 0.0 {
        total_cost / total_demand_kg
    } else {
        0.0
    };

    let baseline_cost = network
        .facilities()
        .iter()
        .map(|f| f.fixed_cost)
        .sum::<f64>()
        + network.mean_route_cost() * total_demand_kg;
    let savings = baseline_cost - total_cost;
    let savings_pct = if baseline_cost > 0.0 {
        savings / baseline_cost * 100.0
    } else {
        0.0
    };

    NetworkMetrics {
        total_demand_kg,
        cost_per_kg,
        baseline_cost,
        savings,
        savings_pct,
        annual_savings: savings * 12.0,
    }
}
