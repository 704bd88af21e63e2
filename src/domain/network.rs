// Immutable network entities: demand points, candidate facilities, and the
// dense route-cost matrix between them.

use std::collections::HashMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One logical customer with its aggregated monthly demand.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemandPoint {
    pub customer_id: String,
    pub city: String,
    pub region: String,
    pub monthly_demand_kg: f64,
}

/// One candidate warehouse.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Facility {
    pub warehouse_id: String,
    pub monthly_capacity: f64,
    pub fixed_cost: f64,
}

/// One observed or estimated route. An absent `cost_per_kg` means the route
/// was never observed; it is estimated from `distance_miles` when the network
/// is assembled. Absence is marked, never encoded as zero.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Route {
    pub from_warehouse: String,
    pub to_customer_id: String,
    pub cost_per_kg: Option<f64>,
    pub distance_miles: Option<f64>,
}

/// Validated, immutable view of the three input tables.
///
/// Construction performs all loader-contract validation and the route-cost
/// gap fill; a `Network` that exists holds a dense facility × demand-point
/// cost matrix with no missing entries.
#[derive(Debug, Clone)]
pub struct Network {
    demand_points: Vec<DemandPoint>,
    facilities: Vec<Facility>,
    /// cost_per_kg[facility][demand point]
    cost_per_kg: Vec<Vec<f64>>,
}

impl Network {
    pub fn new(
        demand_points: Vec<DemandPoint>,
        facilities: Vec<Facility>,
        routes: Vec<Route>,
    ) -> Result<Self, EngineError> {
        if demand_points.is_empty() {
            return Err(EngineError::Configuration(
                "demand-point table is empty".to_string(),
            ));
        }
        if facilities.is_empty() {
            return Err(EngineError::Configuration(
                "facility table is empty".to_string(),
            ));
        }
        if routes.is_empty() {
            return Err(EngineError::Configuration(
                "route table is empty".to_string(),
            ));
        }

        let demand_index = index_of(demand_points.iter().map(|d| &d.customer_id), "customer")?;
        let facility_index = index_of(facilities.iter().map(|f| &f.warehouse_id), "warehouse")?;

        for point in &demand_points {
            if !point.monthly_demand_kg.is_finite() || point.monthly_demand_kg < 0.0 {
                return Err(EngineError::Configuration(format!(
                    "customer {} has invalid monthly demand {}",
                    point.customer_id, point.monthly_demand_kg
                )));
            }
        }
        for facility in &facilities {
            if !facility.monthly_capacity.is_finite() || facility.monthly_capacity <= 0.0 {
                return Err(EngineError::Configuration(format!(
                    "warehouse {} has non-positive capacity {}",
                    facility.warehouse_id, facility.monthly_capacity
                )));
            }
            if !facility.fixed_cost.is_finite() || facility.fixed_cost < 0.0 {
                return Err(EngineError::Configuration(format!(
                    "warehouse {} has invalid fixed cost {}",
                    facility.warehouse_id, facility.fixed_cost
                )));
            }
        }

        let cost_per_kg = fill_cost_matrix(
            &routes,
            &facility_index,
            &demand_index,
            facilities.len(),
            demand_points.len(),
        )?;

        info!(
            "network loaded: {} customers, {} candidate warehouses, {} routes",
            demand_points.len(),
            facilities.len(),
            facilities.len() * demand_points.len()
        );

        Ok(Self {
            demand_points,
            facilities,
            cost_per_kg,
        })
    }

    pub fn demand_points(&self) -> &[DemandPoint] {
        &self.demand_points
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn num_demand_points(&self) -> usize {
        self.demand_points.len()
    }

    pub fn num_facilities(&self) -> usize {
        self.facilities.len()
    }

    /// Cost per kg on the (facility, demand point) route, by index.
    pub fn route_cost(&self, facility: usize, demand_point: usize) -> Option<f64> {
        self.cost_per_kg.get(facility)?.get(demand_point).copied()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand_points.iter().map(|d| d.monthly_demand_kg).sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.facilities.iter().map(|f| f.monthly_capacity).sum()
    }

    /// Unweighted mean cost per kg over the dense route matrix.
    pub fn mean_route_cost(&self) -> f64 {
        let n = (self.num_facilities() * self.num_demand_points()) as f64;
        self.cost_per_kg.iter().flatten().sum::<f64>() / n
    }
}

fn index_of<'a>(
    ids: impl Iterator<Item = &'a String>,
    kind: &str,
) -> Result<HashMap<String, usize>, EngineError> {
    let mut index = HashMap::new();
    for (i, id) in ids.enumerate() {
        if index.insert(id.clone(), i).is_some() {
            return Err(EngineError::Configuration(format!(
                "duplicate {kind} id '{id}'"
            )));
        }
    }
    Ok(index)
}

/// Densify the route table: observed costs are taken as-is, unobserved ones
/// are estimated as `distance × (mean observed cost / mean observed
/// distance)` over the routes where both values are present.
fn fill_cost_matrix(
    routes: &[Route],
    facility_index: &HashMap<String, usize>,
    demand_index: &HashMap<String, usize>,
    num_facilities: usize,
    num_demand_points: usize,
) -> Result<Vec<Vec<f64>>, EngineError> {
    let mut observed: Vec<Vec<Option<f64>>> = vec![vec![None; num_demand_points]; num_facilities];
    let mut distances: Vec<Vec<Option<f64>>> = vec![vec![None; num_demand_points]; num_facilities];
    let mut seen: Vec<Vec<bool>> = vec![vec![false; num_demand_points]; num_facilities];

    for route in routes {
        let f = *facility_index.get(&route.from_warehouse).ok_or_else(|| {
            EngineError::Configuration(format!(
                "route references unknown warehouse '{}'",
                route.from_warehouse
            ))
        })?;
        let d = *demand_index.get(&route.to_customer_id).ok_or_else(|| {
            EngineError::Configuration(format!(
                "route references unknown customer '{}'",
                route.to_customer_id
            ))
        })?;
        if seen[f][d] {
            return Err(EngineError::Configuration(format!(
                "duplicate route {} -> {}",
                route.from_warehouse, route.to_customer_id
            )));
        }
        seen[f][d] = true;

        if let Some(cost) = route.cost_per_kg {
            if !cost.is_finite() || cost < 0.0 {
                return Err(EngineError::Configuration(format!(
                    "route {} -> {} has invalid cost per kg {}",
                    route.from_warehouse, route.to_customer_id, cost
                )));
            }
            observed[f][d] = Some(cost);
        }
        if let Some(distance) = route.distance_miles {
            if !distance.is_finite() || distance < 0.0 {
                return Err(EngineError::Configuration(format!(
                    "route {} -> {} has invalid distance {}",
                    route.from_warehouse, route.to_customer_id, distance
                )));
            }
            distances[f][d] = Some(distance);
        }
    }

    // Cost-per-mile rate from routes where both cost and distance are known.
    // Computed lazily: only needed when some route cost is actually missing.
    let estimation_rate = || -> Option<f64> {
        let mut cost_sum = 0.0;
        let mut distance_sum = 0.0;
        let mut count = 0usize;
        for f in 0..num_facilities {
            for d in 0..num_demand_points {
                if let (Some(cost), Some(distance)) = (observed[f][d], distances[f][d]) {
                    cost_sum += cost;
                    distance_sum += distance;
                    count += 1;
                }
            }
        }
        if count == 0 || distance_sum <= 0.0 {
            None
        } else {
            Some((cost_sum / count as f64) / (distance_sum / count as f64))
        }
    };

    let mut rate: Option<f64> = None;
    let mut filled = 0usize;
    let mut matrix = vec![vec![0.0; num_demand_points]; num_facilities];
    for (fid, f) in facility_index.iter() {
        for (did, d) in demand_index.iter() {
            matrix[*f][*d] = match observed[*f][*d] {
                Some(cost) => cost,
                None => {
                    let distance = distances[*f][*d].ok_or_else(|| {
                        EngineError::Configuration(format!(
                            "route {fid} -> {did} is missing and has no distance to estimate from"
                        ))
                    })?;
                    let per_mile = match rate {
                        Some(r) => r,
                        None => {
                            let r = estimation_rate().ok_or_else(|| {
                                EngineError::Configuration(
                                    "cannot estimate missing route costs: no route has both cost and distance"
                                        .to_string(),
                                )
                            })?;
                            rate = Some(r);
                            r
                        }
                    };
                    filled += 1;
                    distance * per_mile
                }
            };
        }
    }

    if filled > 0 {
        debug!("filled {filled} unobserved route costs from distances");
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str, demand: f64) -> DemandPoint {
        DemandPoint {
            customer_id: id.to_string(),
            city: id.to_string(),
            region: "West".to_string(),
            monthly_demand_kg: demand,
        }
    }

    fn warehouse(id: &str, capacity: f64, fixed_cost: f64) -> Facility {
        Facility {
            warehouse_id: id.to_string(),
            monthly_capacity: capacity,
            fixed_cost,
        }
    }

    fn route(from: &str, to: &str, cost: Option<f64>, distance: Option<f64>) -> Route {
        Route {
            from_warehouse: from.to_string(),
            to_customer_id: to.to_string(),
            cost_per_kg: cost,
            distance_miles: distance,
        }
    }

    #[test]
    fn dense_observed_costs_pass_through() {
        let network = Network::new(
            vec![customer("C1", 10.0), customer("C2", 20.0)],
            vec![warehouse("W1", 100.0, 500.0)],
            vec![
                route("W1", "C1", Some(2.0), Some(100.0)),
                route("W1", "C2", Some(3.0), None),
            ],
        )
        .unwrap();
        assert_eq!(network.route_cost(0, 0), Some(2.0));
        assert_eq!(network.route_cost(0, 1), Some(3.0));
        assert!((network.mean_route_cost() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn missing_cost_is_estimated_from_distance() {
        let network = Network::new(
            vec![customer("C1", 10.0), customer("C2", 20.0)],
            vec![warehouse("W1", 100.0, 500.0)],
            vec![
                route("W1", "C1", Some(2.0), Some(100.0)),
                route("W1", "C2", None, Some(50.0)),
            ],
        )
        .unwrap();
        // rate = mean cost / mean distance = 2.0 / 100.0
        assert!((network.route_cost(0, 1).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unfillable_gap_is_fatal() {
        let err = Network::new(
            vec![customer("C1", 10.0)],
            vec![warehouse("W1", 100.0, 500.0)],
            vec![route("W1", "C1", None, Some(50.0))],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn absent_route_row_is_fatal() {
        let err = Network::new(
            vec![customer("C1", 10.0), customer("C2", 20.0)],
            vec![warehouse("W1", 100.0, 500.0)],
            vec![route("W1", "C1", Some(2.0), Some(100.0))],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = Network::new(
            vec![customer("C1", 10.0), customer("C1", 20.0)],
            vec![warehouse("W1", 100.0, 500.0)],
            vec![route("W1", "C1", Some(2.0), None)],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn unknown_route_endpoint_rejected() {
        let err = Network::new(
            vec![customer("C1", 10.0)],
            vec![warehouse("W1", 100.0, 500.0)],
            vec![route("W9", "C1", Some(2.0), None)],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn non_positive_capacity_rejected() {
        let err = Network::new(
            vec![customer("C1", 10.0)],
            vec![warehouse("W1", 0.0, 500.0)],
            vec![route("W1", "C1", Some(2.0), None)],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn negative_route_cost_rejected() {
        let err = Network::new(
            vec![customer("C1", 10.0)],
            vec![warehouse("W1", 100.0, 500.0)],
            vec![route("W1", "C1", Some(-1.0), None)],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }

    #[test]
    fn empty_tables_rejected() {
        let err = Network::new(vec![], vec![warehouse("W1", 100.0, 500.0)], vec![]).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
    }
}
