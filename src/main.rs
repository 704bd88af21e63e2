use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use chainopt::{
    io, network_metrics, EngineError, Network, OptimizationEngine, SolverBackend, SolverConfig,
};

/// Supply-chain network optimizer: decides which warehouses to run and how to
/// route monthly demand at minimum fixed-plus-transport cost.
#[derive(Debug, Parser)]
#[command(name = "chainopt", version, about)]
struct Args {
    /// Demand-point table (customer_id, city, region, monthly_demand_kg)
    #[arg(long, value_name = "CSV")]
    customers: PathBuf,

    /// Candidate facility table (warehouse_id, monthly_capacity, fixed_cost)
    #[arg(long, value_name = "CSV")]
    warehouses: PathBuf,

    /// Route cost table (from_warehouse, to_customer_id, cost_per_kg, distance_miles)
    #[arg(long, value_name = "CSV")]
    routes: PathBuf,

    /// MILP backend: auto, highs, or cbc
    #[arg(long, default_value = "auto")]
    backend: SolverBackend,

    /// Solve time limit in seconds
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<f64>,

    /// Where to write the optimized shipment table
    #[arg(long, value_name = "CSV")]
    shipments_out: Option<PathBuf>,

    /// Show solver output and per-stage detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), EngineError> {
    let demand_points = io::read_demand_points(&args.customers)?;
    let facilities = io::read_facilities(&args.warehouses)?;
    let routes = io::read_routes(&args.routes)?;
    let network = Network::new(demand_points, facilities, routes)?;

    let engine = OptimizationEngine::new(SolverConfig {
        backend: args.backend,
        time_limit: args.time_limit,
        verbose: args.verbose,
    })?;
    let plan = engine.optimize(&network)?;

    print!("{}", plan.summary());

    let metrics = network_metrics(&network, &plan);
    println!("Cost per kg:      ${:.4}", metrics.cost_per_kg);
    println!(
        "Baseline cost:    ${:.2} (naive all-warehouses estimate)",
        metrics.baseline_cost
    );
    println!(
        "Monthly savings:  ${:.2} ({:.1}%)",
        metrics.savings, metrics.savings_pct
    );
    println!("Annual savings:   ${:.2}", metrics.annual_savings);

    if let Some(path) = &args.shipments_out {
        io::write_shipments(path, &plan.shipments)?;
        println!("Shipment table written to {}", path.display());
    }

    Ok(())
}
