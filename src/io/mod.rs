// CSV boundary for the persisted table artifacts.
//
// Readers accept the column layout of the upstream data-preparation step:
// empty cost/distance fields parse as absent, never as zero.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::network::{DemandPoint, Facility, Route};
use crate::domain::plan::Shipment;
use crate::error::EngineError;

/// Read the demand-point table (`customer_id, city, region,
/// monthly_demand_kg`).
pub fn read_demand_points(path: impl AsRef<Path>) -> Result<Vec<DemandPoint>, EngineError> {
    read_table(File::open(path)?)
}

/// Read the facility table (`warehouse_id, monthly_capacity, fixed_cost`).
pub fn read_facilities(path: impl AsRef<Path>) -> Result<Vec<Facility>, EngineError> {
    read_table(File::open(path)?)
}

/// Read the route table (`from_warehouse, to_customer_id, cost_per_kg,
/// distance_miles`).
pub fn read_routes(path: impl AsRef<Path>) -> Result<Vec<Route>, EngineError> {
    read_table(File::open(path)?)
}

/// Write the optimized shipment table (`from_warehouse, to_customer_id,
/// quantity_kg, cost`).
pub fn write_shipments(
    path: impl AsRef<Path>,
    shipments: &[Shipment],
) -> Result<(), EngineError> {
    write_shipments_to(File::create(path)?, shipments)
}

fn read_table<T: DeserializeOwned>(reader: impl Read) -> Result<Vec<T>, EngineError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

fn write_shipments_to(writer: impl Write, shipments: &[Shipment]) -> Result<(), EngineError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for shipment in shipments {
        csv_writer.serialize(shipment)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_demand_points() {
        let data = "customer_id,city,region,monthly_demand_kg\n\
                    CUST_SEATTLE,Seattle,West,1200.5\n";
        let rows: Vec<DemandPoint> = read_table(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id, "CUST_SEATTLE");
        assert!((rows[0].monthly_demand_kg - 1200.5).abs() < 1e-12);
    }

    #[test]
    fn parses_integer_facility_columns_as_floats() {
        let data = "warehouse_id,monthly_capacity,fixed_cost\n\
                    WH_CHI,8000,30000\n";
        let rows: Vec<Facility> = read_table(data.as_bytes()).unwrap();
        assert!((rows[0].monthly_capacity - 8000.0).abs() < 1e-12);
        assert!((rows[0].fixed_cost - 30000.0).abs() < 1e-12);
    }

    #[test]
    fn empty_route_fields_parse_as_absent() {
        let data = "from_warehouse,to_customer_id,cost_per_kg,distance_miles\n\
                    WH_CHI,CUST_SEATTLE,2.5,2000\n\
                    WH_CHI,CUST_BOSTON,,980\n";
        let rows: Vec<Route> = read_table(data.as_bytes()).unwrap();
        assert_eq!(rows[0].cost_per_kg, Some(2.5));
        assert_eq!(rows[1].cost_per_kg, None);
        assert_eq!(rows[1].distance_miles, Some(980.0));
    }

    #[test]
    fn malformed_rows_are_reported() {
        let data = "customer_id,city,region,monthly_demand_kg\n\
                    CUST_SEATTLE,Seattle,West,not-a-number\n";
        let err = read_table::<DemandPoint>(data.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::Table(_)));
    }

    #[test]
    fn writes_shipments_with_header() {
        let shipments = vec![Shipment {
            from_warehouse: "WH_CHI".to_string(),
            to_customer_id: "CUST_SEATTLE".to_string(),
            quantity_kg: 120.0,
            cost: 300.0,
        }];
        let mut buffer = Vec::new();
        write_shipments_to(&mut buffer, &shipments).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("from_warehouse,to_customer_id,quantity_kg,cost\n"));
        assert!(text.contains("WH_CHI,CUST_SEATTLE,120.0,300.0"));
    }
}
