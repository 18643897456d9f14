use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("No feasible point satisfies every constraint")]
    Infeasible,
    #[error("Transportation problem is unbalanced: total supply {supply} != total demand {demand}")]
    Unbalanced { supply: f64, demand: f64 },
    #[error("Invalid instance: {0}")]
    InvalidInstance(String),
}
