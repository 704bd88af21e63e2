// Optimization pipeline: load -> range estimate -> build -> solve -> extract.
// Each stage runs to completion before the next; typed results flow between
// stages and nothing is kept in global state.

pub mod bounds;
pub mod builder;
pub mod extract;
pub mod metrics;

pub use bounds::FacilityRange;
pub use builder::{build_problem, VariableLayout};
pub use metrics::{network_metrics, NetworkMetrics};

use std::sync::Arc;

use log::info;

use crate::domain::models::SolverConfig;
use crate::domain::network::Network;
use crate::domain::plan::ShipmentPlan;
use crate::domain::solver_service::{SolverError, SolverService};
use crate::domain::value_objects::SolutionStatus;
use crate::error::EngineError;
use crate::solver::SolverFactory;

/// Threshold above which a relaxed binary counts as "open".
pub const DEFAULT_OPEN_THRESHOLD: f64 = 0.5;

/// Flows at or below this absolute quantity are treated as solver noise.
pub const DEFAULT_FLOW_EPSILON: f64 = 0.1;

/// Relative tolerance when reconciling the cost breakdown with the solver's
/// reported objective.
pub const DEFAULT_OBJECTIVE_TOLERANCE: f64 = 1e-4;

/// Extraction thresholds.
///
/// The defaults are hand-picked values for suppressing solver noise near
/// zero. They are tuning parameters, not correctness guarantees.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionConfig {
    pub open_threshold: f64,
    pub flow_epsilon: f64,
    pub objective_tolerance: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            open_threshold: DEFAULT_OPEN_THRESHOLD,
            flow_epsilon: DEFAULT_FLOW_EPSILON,
            objective_tolerance: DEFAULT_OBJECTIVE_TOLERANCE,
        }
    }
}

/// End-to-end CFLP optimization over a validated network.
pub struct OptimizationEngine {
    solver: Arc<dyn SolverService>,
    solver_config: SolverConfig,
    extraction: ExtractionConfig,
}

impl OptimizationEngine {
    /// Create an engine with the backend selected by the config.
    pub fn new(solver_config: SolverConfig) -> Result<Self, EngineError> {
        let solver = SolverFactory::create(solver_config.backend)?;
        Ok(Self::with_solver(solver, solver_config))
    }

    /// Create an engine with an explicit solver implementation.
    pub fn with_solver(solver: Arc<dyn SolverService>, solver_config: SolverConfig) -> Self {
        Self {
            solver,
            solver_config,
            extraction: ExtractionConfig::default(),
        }
    }

    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// Run the full pipeline and return the validated shipment plan.
    pub fn optimize(&self, network: &Network) -> Result<ShipmentPlan, EngineError> {
        let range = FacilityRange::estimate(network)?;
        let (problem, layout) = build_problem(network, &range, self.solver_config.clone())?;

        info!("solving '{}' with {}", problem.name, self.solver.name());
        let solution = self.solver.solve(&problem)?;
        info!(
            "solver finished: {} (native: {}) in {:.1} ms",
            solution.status, solution.native_status, solution.statistics.solve_time_ms
        );

        match solution.status {
            SolutionStatus::Optimal => {
                extract::extract_plan(network, &range, &layout, &solution, &self.extraction)
            }
            SolutionStatus::Infeasible => Err(EngineError::Infeasible {
                min_facilities: range.min,
                max_facilities: range.max,
            }),
            SolutionStatus::Unbounded => Err(EngineError::Solver(SolverError::ExecutionFailed(
                format!(
                    "solver reported unbounded ({}); the objective is bounded below by construction",
                    solution.native_status
                ),
            ))),
            SolutionStatus::TimeLimit => Err(EngineError::Solver(SolverError::TimeLimit(
                solution.native_status.clone(),
            ))),
            SolutionStatus::Error => Err(EngineError::Solver(SolverError::ExecutionFailed(
                solution.message.clone(),
            ))),
        }
    }
}
