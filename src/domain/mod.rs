// Domain module: business entities, the MILP problem model, and results

pub mod models;
pub mod network;
pub mod plan;
pub mod solver_service;
pub mod value_objects;

pub use models::*;
pub use network::*;
pub use plan::*;
pub use solver_service::*;
pub use value_objects::*;
