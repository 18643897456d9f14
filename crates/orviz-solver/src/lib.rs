mod config;
mod error;
mod graphical;
mod problem;
mod solution;
mod transport;
mod tsp;

pub use config::{SolverConfig, solve};
pub use error::SolveError;
pub use graphical::GraphicalSolver;
pub use problem::{Constraint, ConstraintOp, Direction, LpProblem, Objective, Problem, TransportationProblem, TspInstance};
pub use solution::{
    AllocationStep, BoundaryLine, CornerPoint, LpSolution, PenaltyLine, Solution, Tour, TourEdge, TransportationSolution,
    TspMethod, TspSolution,
};
pub use transport::VamSolver;
pub use tsp::TspSolver;
