use crate::error::SolveError;
use crate::graphical::GraphicalSolver;
use crate::problem::Problem;
use crate::solution::Solution;
use crate::transport::VamSolver;
use crate::tsp::TspSolver;

/// Settings shared by the three solvers
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Tolerance for floating point comparisons
    pub tolerance: f64,
    /// Largest TSP instance solved exactly
    pub exact_threshold: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            exact_threshold: 10,
        }
    }
}

impl SolverConfig {
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_exact_threshold(mut self, cities: usize) -> Self {
        self.exact_threshold = cities;
        self
    }

    pub fn graphical(&self) -> GraphicalSolver {
        GraphicalSolver::new().with_tolerance(self.tolerance)
    }

    pub fn vam(&self) -> VamSolver {
        VamSolver::new().with_tolerance(self.tolerance)
    }

    pub fn tsp(&self) -> TspSolver {
        TspSolver::new()
            .with_tolerance(self.tolerance)
            .with_exact_threshold(self.exact_threshold)
    }
}

/// Solve any problem kind with the matching solver.
pub fn solve(problem: &Problem, config: &SolverConfig) -> Result<Solution, SolveError> {
    match problem {
        Problem::Lp(p) => config.graphical().solve(p).map(Solution::Lp),
        Problem::Transportation(p) => config.vam().solve(p).map(Solution::Transportation),
        Problem::Tsp(p) => config.tsp().solve(p).map(Solution::Tsp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{TransportationProblem, TspInstance};

    #[test]
    fn test_dispatch_by_problem_kind() {
        let config = SolverConfig::default();

        let transport = Problem::Transportation(TransportationProblem::new(
            vec![5.0, 5.0],
            vec![10.0],
            vec![vec![1.0], vec![2.0]],
        ));
        match solve(&transport, &config).unwrap() {
            Solution::Transportation(s) => assert_eq!(s.total_cost, 15.0),
            other => panic!("Expected transportation solution, got {:?}", other),
        }

        let tsp = Problem::Tsp(TspInstance::new(
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 3.0], vec![2.0, 3.0, 0.0]],
        ));
        match solve(&tsp, &config.with_exact_threshold(0)).unwrap() {
            Solution::Tsp(s) => assert!(!s.is_exact()),
            other => panic!("Expected tsp solution, got {:?}", other),
        }
    }
}
