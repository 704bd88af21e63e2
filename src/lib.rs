// Domain layer: network entities, the MILP problem model, and typed results
pub mod domain;

// Optimization pipeline: range estimation, model building, solving, extraction
pub mod engine;

// Error types shared across the pipeline
pub mod error;

// CSV boundary for the persisted table artifacts
pub mod io;

// Solver adapters: concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ActivatedFacility, Constraint, ConstraintType, CostBreakdown, DemandPoint, Facility, Network,
    ObjectiveFunction, OptimizationProblem, Route, Shipment, ShipmentPlan, Solution,
    SolutionStatus, SolverBackend, SolverConfig, SolverError, SolverService, Variable,
    VariableType,
};

pub use engine::{
    network_metrics, ExtractionConfig, FacilityRange, NetworkMetrics, OptimizationEngine,
};

pub use error::EngineError;

#[cfg(feature = "coin-cbc")]
pub use solver::CoinCbcSolver;
pub use solver::{HighsSolver, SolverFactory};
