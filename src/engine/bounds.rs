// Feasible-range estimation: how many facilities could jointly cover demand.

use float_ord::FloatOrd;
use log::{debug, info};

use crate::domain::network::Network;
use crate::error::EngineError;

/// Inclusive bounds on how many facilities may be activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilityRange {
    pub min: usize,
    pub max: usize,
}

impl FacilityRange {
    /// Estimate the facility-count range for a network.
    ///
    /// The maximum is the trivial one (every candidate). The minimum comes
    /// from greedily accumulating capacities in descending order until total
    /// demand is covered. This is an aggregate bound only: it guarantees
    /// enough capacity exists in the count, not that the solver can satisfy
    /// every point-to-point constraint with that many facilities.
    pub fn estimate(network: &Network) -> Result<Self, EngineError> {
        let total_demand = network.total_demand();
        let total_capacity = network.total_capacity();
        info!(
            "total monthly demand {:.0} kg against {:.0} kg of candidate capacity",
            total_demand, total_capacity
        );
        if total_capacity < total_demand {
            return Err(EngineError::CapacityShortfall {
                total_capacity,
                total_demand,
            });
        }

        let mut capacities: Vec<f64> = network
            .facilities()
            .iter()
            .map(|f| f.monthly_capacity)
            .collect();
        capacities.sort_by_key(|&c| std::cmp::Reverse(FloatOrd(c)));

        let max = capacities.len();
        // Aggregate sufficiency was checked above, so the greedy scan always
        // terminates with min <= max even if float summation order differs.
        let mut min = max;
        let mut running = 0.0;
        for (i, capacity) in capacities.iter().enumerate() {
            running += capacity;
            debug!("{} warehouses reach {:.0} kg of capacity", i + 1, running);
            if running >= total_demand {
                min = i + 1;
                break;
            }
        }

        info!("warehouse count bounded to {min}..={max}");
        Ok(Self { min, max })
    }

    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }
}
