use crate::domain::solver_service::{Result, SolverService};
use crate::domain::value_objects::SolverBackend;
use crate::solver::HighsSolver;
use std::sync::Arc;

#[cfg(not(feature = "coin-cbc"))]
use crate::domain::solver_service::SolverError;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend.
    ///
    /// Requesting a backend that was not compiled in is an error rather than
    /// a silent substitution.
    pub fn create(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Auto | SolverBackend::Highs => Ok(Arc::new(HighsSolver::new())),
            SolverBackend::CoinCbc => {
                #[cfg(feature = "coin-cbc")]
                {
                    Ok(Arc::new(crate::solver::CoinCbcSolver::new()))
                }
                #[cfg(not(feature = "coin-cbc"))]
                {
                    Err(SolverError::SolverNotAvailable(
                        "COIN-OR CBC support requires the `coin-cbc` feature".to_string(),
                    ))
                }
            }
        }
    }

    /// Get the default solver (HiGHS)
    pub fn default_solver() -> Arc<dyn SolverService> {
        Arc::new(HighsSolver::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_selects_a_mip_capable_solver() {
        let solver = SolverFactory::create(SolverBackend::Auto).unwrap();
        assert!(solver.supports_mip());
        assert_eq!(solver.name(), "HiGHS");
    }

    #[cfg(not(feature = "coin-cbc"))]
    #[test]
    fn missing_backend_is_reported_not_substituted() {
        let err = SolverFactory::create(SolverBackend::CoinCbc).unwrap_err();
        assert!(matches!(err, SolverError::SolverNotAvailable(_)));
    }
}
