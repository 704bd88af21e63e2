// Model builder: translate the network and the facility-count bounds into a
// mixed-integer program.

use itertools::iproduct;
use log::info;

use crate::domain::models::{
    Constraint, ObjectiveFunction, OptimizationProblem, SolverConfig, Variable,
};
use crate::domain::network::Network;
use crate::domain::value_objects::ConstraintType;
use crate::engine::bounds::FacilityRange;
use crate::error::EngineError;

/// Column layout of the CFLP decision variables: one binary open decision per
/// facility, then one continuous flow per (facility, demand point) pair.
#[derive(Debug, Clone, Copy)]
pub struct VariableLayout {
    num_facilities: usize,
    num_demand_points: usize,
}

impl VariableLayout {
    pub fn new(num_facilities: usize, num_demand_points: usize) -> Self {
        Self {
            num_facilities,
            num_demand_points,
        }
    }

    pub fn open(&self, facility: usize) -> usize {
        facility
    }

    pub fn flow(&self, facility: usize, demand_point: usize) -> usize {
        self.num_facilities + facility * self.num_demand_points + demand_point
    }

    pub fn num_variables(&self) -> usize {
        self.num_facilities * (1 + self.num_demand_points)
    }
}

/// Build the CFLP model.
///
/// Objective: minimize `Σ fixed_cost·open + Σ cost_per_kg·flow`. Constraints:
/// exact demand satisfaction per customer, capacity linkage per facility,
/// facility-count bounds, and a per-route `flow ≤ capacity·open` bound that
/// is implied by the linkage rows but kept to tighten the LP relaxation.
pub fn build_problem(
    network: &Network,
    range: &FacilityRange,
    solver_config: SolverConfig,
) -> Result<(OptimizationProblem, VariableLayout), EngineError> {
    let num_facilities = network.num_facilities();
    let num_demand_points = network.num_demand_points();
    if num_facilities == 0 || num_demand_points == 0 {
        return Err(EngineError::Configuration(
            "cannot build a model over empty tables".to_string(),
        ));
    }
    let layout = VariableLayout::new(num_facilities, num_demand_points);
    let num_vars = layout.num_variables();

    let mut variables = Vec::with_capacity(num_vars);
    let mut objective = vec![0.0; num_vars];
    for (f, facility) in network.facilities().iter().enumerate() {
        variables.push(Variable::binary(format!("open_{}", facility.warehouse_id)));
        objective[layout.open(f)] = facility.fixed_cost;
    }
    for (f, facility) in network.facilities().iter().enumerate() {
        for (d, point) in network.demand_points().iter().enumerate() {
            variables.push(Variable::continuous(format!(
                "ship_{}_{}",
                facility.warehouse_id, point.customer_id
            )));
            objective[layout.flow(f, d)] = network.route_cost(f, d).ok_or_else(|| {
                EngineError::Configuration(format!(
                    "route {} -> {} is missing from the cost matrix",
                    facility.warehouse_id, point.customer_id
                ))
            })?;
        }
    }

    let mut problem = OptimizationProblem::new(ObjectiveFunction::minimize(objective))
        .with_name("supply_chain_network_optimization")
        .with_variables(variables)
        .with_config(solver_config);

    // Demand satisfaction: inbound flow equals demand exactly, no shortfall.
    for (d, point) in network.demand_points().iter().enumerate() {
        let mut row = vec![0.0; num_vars];
        for f in 0..num_facilities {
            row[layout.flow(f, d)] = 1.0;
        }
        problem = problem.add_constraint(
            Constraint::new(ConstraintType::Equal, row, point.monthly_demand_kg)
                .with_name(format!("demand_{}", point.customer_id)),
        );
    }

    // Capacity linkage: outbound flow at most capacity, and zero when closed.
    for (f, facility) in network.facilities().iter().enumerate() {
        let mut row = vec![0.0; num_vars];
        for d in 0..num_demand_points {
            row[layout.flow(f, d)] = 1.0;
        }
        row[layout.open(f)] = -facility.monthly_capacity;
        problem = problem.add_constraint(
            Constraint::new(ConstraintType::LessThanOrEqual, row, 0.0)
                .with_name(format!("capacity_{}", facility.warehouse_id)),
        );
    }

    // Facility-count bounds from the feasible-range estimate.
    let mut count_row = vec![0.0; num_vars];
    for f in 0..num_facilities {
        count_row[layout.open(f)] = 1.0;
    }
    problem = problem
        .add_constraint(
            Constraint::new(
                ConstraintType::GreaterThanOrEqual,
                count_row.clone(),
                range.min as f64,
            )
            .with_name("min_open"),
        )
        .add_constraint(
            Constraint::new(ConstraintType::LessThanOrEqual, count_row, range.max as f64)
                .with_name("max_open"),
        );

    // Per-route redundancy of the capacity linkage.
    for (f, d) in iproduct!(0..num_facilities, 0..num_demand_points) {
        let facility = &network.facilities()[f];
        let mut row = vec![0.0; num_vars];
        row[layout.flow(f, d)] = 1.0;
        row[layout.open(f)] = -facility.monthly_capacity;
        problem = problem.add_constraint(
            Constraint::new(ConstraintType::LessThanOrEqual, row, 0.0).with_name(format!(
                "route_cap_{}_{}",
                facility.warehouse_id,
                network.demand_points()[d].customer_id
            )),
        );
    }

    info!(
        "model built: {} variables ({} binary), {} constraints",
        problem.num_variables(),
        problem.num_integer_variables(),
        problem.constraints.len()
    );
    Ok((problem, layout))
}
