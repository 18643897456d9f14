use orviz_solver::{LpProblem, Problem, SolveError, TransportationProblem, TspInstance};
use thiserror::Error;
use tracing::debug;

use crate::parser::{ParseError, Parser};
use crate::request::ProblemRequest;

/// Variables accepted by the graphical method
const LP_VARIABLES: usize = 2;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Parse error in '{input}': {source}")]
    Parse {
        input: String,
        #[source]
        source: ParseError,
    },
    #[error("Unknown variable x{index} in '{input}': only x1 and x2 can be solved graphically")]
    UnknownVariable { index: usize, input: String },
    #[error(transparent)]
    Invalid(#[from] SolveError),
    #[cfg(feature = "serde")]
    #[error("Invalid request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns client requests into validated solver models
pub struct Compiler {
    /// Tolerance used when validating balance and symmetry
    tolerance: f64,
}

impl Default for Compiler {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Read a JSON request from disk
    #[cfg(feature = "serde")]
    pub fn load_file(&self, path: impl AsRef<std::path::Path>) -> Result<ProblemRequest, CompileError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Ok(ProblemRequest::from_json(&source)?)
    }

    pub fn compile(&self, request: &ProblemRequest) -> Result<Problem, CompileError> {
        let problem = match request {
            ProblemRequest::Standard { objective, constraints } => {
                Problem::Lp(self.compile_lp(objective, constraints.as_slice())?)
            }
            ProblemRequest::Transportation { supply, demand, costs } => {
                let problem = TransportationProblem::new(supply.clone(), demand.clone(), costs.clone());
                problem.validate(self.tolerance)?;
                Problem::Transportation(problem)
            }
            ProblemRequest::Tsp { cities, distances } => {
                let instance = TspInstance::new(cities.clone(), distances.clone());
                instance.validate(self.tolerance)?;
                Problem::Tsp(instance)
            }
        };
        debug!(kind = request.kind(), "request compiled");
        Ok(problem)
    }

    /// Parse the objective and constraints of a two-variable LP.
    /// Constraints are named `c1, c2, ...` after their position.
    pub fn compile_lp<S: AsRef<str>>(&self, objective: &str, constraints: &[S]) -> Result<LpProblem, CompileError> {
        let parsed_objective = Parser::parse_objective(objective).map_err(|source| CompileError::Parse {
            input: objective.to_string(),
            source,
        })?;
        check_variables(parsed_objective.expr.max_variable(), objective)?;

        let variables = (1..=LP_VARIABLES).map(|k| format!("x{}", k)).collect();
        let mut problem = LpProblem::new(variables);
        problem.set_objective(parsed_objective.expr.dense(LP_VARIABLES), parsed_objective.direction);

        for (i, text) in constraints.iter().enumerate() {
            let text = text.as_ref();
            let parsed = Parser::parse_constraint(text).map_err(|source| CompileError::Parse {
                input: text.to_string(),
                source,
            })?;
            check_variables(parsed.expr.max_variable(), text)?;
            problem.add_constraint(format!("c{}", i + 1), parsed.expr.dense(LP_VARIABLES), parsed.op, parsed.rhs);
        }

        debug!(
            direction = %problem.objective.direction,
            constraints = problem.num_constraints(),
            "lp compiled"
        );
        Ok(problem)
    }
}

fn check_variables(max_variable: Option<usize>, input: &str) -> Result<(), CompileError> {
    match max_variable {
        Some(index) if index > LP_VARIABLES => Err(CompileError::UnknownVariable {
            index,
            input: input.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orviz_solver::{ConstraintOp, Direction, GraphicalSolver, Solution, SolverConfig, VamSolver, solve};

    #[test]
    fn test_compile_lp() {
        let problem = Compiler::new()
            .compile_lp("3x1 + 2x2", &["2x1 + x2 <= 8", "x2 >= 1"])
            .unwrap();

        assert_eq!(problem.variables, vec!["x1".to_string(), "x2".to_string()]);
        assert_eq!(problem.objective.coefficients, vec![3.0, 2.0]);
        assert_eq!(problem.objective.direction, Direction::Maximize);
        assert_eq!(problem.constraints.len(), 2);
        assert_eq!(problem.constraints[0].name, "c1");
        assert_eq!(problem.constraints[1].coefficients, vec![0.0, 1.0]);
        assert_eq!(problem.constraints[1].op, ConstraintOp::Ge);
        assert_eq!(problem.constraints[1].rhs, 1.0);
    }

    #[test]
    fn test_compile_and_solve() {
        let request = ProblemRequest::Standard {
            objective: "3x1 + 2x2".to_string(),
            constraints: ["2x1 + x2 <= 8", "x1 + 2x2 <= 10", "x1 >= 0", "x2 >= 0"]
                .map(String::from)
                .to_vec(),
        };
        let problem = Compiler::new().compile(&request).unwrap();
        let solution = solve(&problem, &SolverConfig::default()).unwrap();

        match solution {
            Solution::Lp(lp) => {
                assert!((lp.optimum.x1 - 2.0).abs() < 1e-6);
                assert!((lp.optimum.x2 - 4.0).abs() < 1e-6);
                assert!((lp.objective_value - 14.0).abs() < 1e-6);
            }
            other => panic!("Expected LP solution, got {:?}", other),
        }
    }

    #[test]
    fn test_third_variable_rejected() {
        let err = Compiler::new()
            .compile_lp("x1 + x2", &["x1 + x3 <= 4"])
            .unwrap_err();
        match err {
            CompileError::UnknownVariable { index, input } => {
                assert_eq!(index, 3);
                assert_eq!(input, "x1 + x3 <= 4");
            }
            other => panic!("Expected unknown variable, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_keeps_input() {
        let err = Compiler::new().compile_lp("3x1 + 2x2", &["x1 <> 5"]).unwrap_err();
        match err {
            CompileError::Parse { input, source } => {
                assert_eq!(input, "x1 <> 5");
                assert!(matches!(source, ParseError::UnknownOperator { .. }));
            }
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimize_objective() {
        let problem = Compiler::new()
            .compile_lp("minimize: x1 + x2", &["x1 + x2 >= 2"])
            .unwrap();
        let solution = GraphicalSolver::new().solve(&problem).unwrap();
        assert!((solution.objective_value - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unbalanced_request_rejected() {
        let request = ProblemRequest::Transportation {
            supply: vec![10.0],
            demand: vec![5.0],
            costs: vec![vec![1.0]],
        };
        let err = Compiler::new().compile(&request).unwrap_err();
        assert!(matches!(err, CompileError::Invalid(SolveError::Unbalanced { .. })));
    }

    #[test]
    fn test_transportation_request() {
        let request = ProblemRequest::Transportation {
            supply: vec![20.0, 30.0, 25.0],
            demand: vec![15.0, 25.0, 35.0],
            costs: vec![
                vec![8.0, 6.0, 10.0],
                vec![9.0, 12.0, 13.0],
                vec![14.0, 9.0, 16.0],
            ],
        };
        let problem = match Compiler::new().compile(&request).unwrap() {
            Problem::Transportation(p) => p,
            other => panic!("Expected transportation problem, got {:?}", other),
        };
        let solution = VamSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.total_cost, 755.0);
    }
}
