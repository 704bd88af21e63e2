// HiGHS solver adapter
// Translates the domain problem to the HiGHS row-problem API

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, SolutionStatus, VariableType},
};
use highs::{Col, HighsModelStatus, RowProblem, Sense};
use std::time::Instant;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let num_vars = problem.num_variables();
        let num_binary = problem
            .variables
            .iter()
            .filter(|v| matches!(v.variable_type, VariableType::Binary))
            .count() as u32;

        let mut pb = RowProblem::default();
        let mut cols: Vec<Col> = Vec::with_capacity(num_vars);
        for (i, var_def) in problem.variables.iter().enumerate() {
            let obj_coeff = problem.objective.coefficients[i];
            let lower = var_def.lower_bound;
            let col = match var_def.variable_type {
                VariableType::Binary => {
                    pb.add_integer_column(obj_coeff, lower..=var_def.upper_bound.unwrap_or(1.0))
                }
                VariableType::Continuous => match var_def.upper_bound {
                    Some(upper) => pb.add_column(obj_coeff, lower..=upper),
                    None => pb.add_column(obj_coeff, lower..),
                },
            };
            cols.push(col);
        }

        for constraint in &problem.constraints {
            let terms: Vec<(Col, f64)> = constraint
                .coefficients
                .iter()
                .enumerate()
                .filter(|(_, &coeff)| coeff != 0.0)
                .map(|(i, &coeff)| (cols[i], coeff))
                .collect();

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=constraint.bound, terms);
                }
                ConstraintType::Equal => {
                    pb.add_row(constraint.bound..=constraint.bound, terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(constraint.bound.., terms);
                }
            }
        }

        let mut model = pb.optimise(Sense::Minimise);
        if let Some(limit) = problem.solver_config.time_limit {
            model.set_option("time_limit", limit);
        }
        model.set_option("output_flag", problem.solver_config.verbose);

        let solved = model.solve();
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let native_status = format!("{:?}", solved.status());

        let statistics = SolverStatistics {
            solve_time_ms: solve_time,
            num_variables: num_vars as u32,
            num_constraints: problem.constraints.len() as u32,
            num_binary_vars: num_binary,
        };

        match solved.status() {
            HighsModelStatus::Optimal => {
                let sol = solved.get_solution();
                let variable_values: Vec<f64> = cols.iter().map(|&c| sol[c]).collect();

                let mut objective = 0.0;
                for (i, &coeff) in problem.objective.coefficients.iter().enumerate() {
                    objective += coeff * variable_values[i];
                }

                let mut solution = DomainSolution::optimal(objective, variable_values)
                    .with_native_status(native_status)
                    .with_statistics(statistics);
                solution.message = format!("Optimal solution found for '{}'", problem.name);
                Ok(solution)
            }
            HighsModelStatus::Infeasible => Ok(DomainSolution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_native_status(native_status)
            .with_statistics(statistics)),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(DomainSolution::new(
                    SolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
                .with_native_status(native_status)
                .with_statistics(statistics))
            }
            HighsModelStatus::ReachedTimeLimit => Ok(DomainSolution::new(
                SolutionStatus::TimeLimit,
                "Time limit reached before optimality was proven",
            )
            .with_native_status(native_status)
            .with_statistics(statistics)),
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
