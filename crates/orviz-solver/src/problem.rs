use std::collections::HashSet;
use std::fmt;

use crate::error::SolveError;

/// Represents a two-variable linear programming problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function coefficients and direction
    pub objective: Objective,
    /// Constraints, in input order
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to maximize or minimize
    pub direction: Direction,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Maximize,
    Minimize,
}

impl Direction {
    /// Returns true if `candidate` is strictly better than `incumbent` by more than `tolerance`.
    pub fn improves(self, candidate: f64, incumbent: f64, tolerance: f64) -> bool {
        match self {
            Direction::Maximize => candidate > incumbent + tolerance,
            Direction::Minimize => candidate < incumbent - tolerance,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Maximize => write!(f, "maximize"),
            Direction::Minimize => write!(f, "minimize"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side value at `point`.
    pub fn lhs(&self, point: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(point)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Checks the constraint at `point`, scaling the tolerance with the magnitude of the rhs.
    pub fn is_satisfied(&self, point: &[f64], tolerance: f64) -> bool {
        self.op.holds(self.lhs(point), self.rhs, tolerance * (1.0 + self.rhs.abs()))
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn holds(self, lhs: f64, rhs: f64, slack: f64) -> bool {
        match self {
            ConstraintOp::Le => lhs <= rhs + slack,
            ConstraintOp::Ge => lhs >= rhs - slack,
            ConstraintOp::Eq => (lhs - rhs).abs() <= slack,
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOp::Le => write!(f, "<="),
            ConstraintOp::Ge => write!(f, ">="),
            ConstraintOp::Eq => write!(f, "="),
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                direction: Direction::Maximize,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, direction: Direction) {
        self.objective = Objective { coefficients, direction };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value at `point`.
    pub fn evaluate(&self, point: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(point)
            .map(|(c, x)| c * x)
            .sum()
    }
}

/// A transportation problem: sources with supply, destinations with demand, and per-unit costs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TransportationProblem {
    pub supply: Vec<f64>,
    pub demand: Vec<f64>,
    /// Rows are sources, columns are destinations
    pub costs: Vec<Vec<f64>>,
}

impl TransportationProblem {
    pub fn new(supply: Vec<f64>, demand: Vec<f64>, costs: Vec<Vec<f64>>) -> Self {
        Self { supply, demand, costs }
    }

    pub fn num_sources(&self) -> usize {
        self.supply.len()
    }

    pub fn num_destinations(&self) -> usize {
        self.demand.len()
    }

    pub fn total_supply(&self) -> f64 {
        self.supply.iter().sum()
    }

    pub fn total_demand(&self) -> f64 {
        self.demand.iter().sum()
    }

    /// Checks shape, value ranges and balance.
    pub fn validate(&self, tolerance: f64) -> Result<(), SolveError> {
        if self.supply.is_empty() || self.demand.is_empty() {
            return Err(SolveError::InvalidInstance(
                "supply and demand must each have at least one entry".to_string(),
            ));
        }
        if self.costs.len() != self.supply.len() {
            return Err(SolveError::InvalidInstance(format!(
                "cost matrix has {} rows but there are {} sources",
                self.costs.len(),
                self.supply.len()
            )));
        }
        for (i, row) in self.costs.iter().enumerate() {
            if row.len() != self.demand.len() {
                return Err(SolveError::InvalidInstance(format!(
                    "cost row {} has {} columns but there are {} destinations",
                    i,
                    row.len(),
                    self.demand.len()
                )));
            }
            if let Some(c) = row.iter().find(|c| !c.is_finite()) {
                return Err(SolveError::InvalidInstance(format!("cost row {} contains {}", i, c)));
            }
        }
        for (label, values) in [("supply", &self.supply), ("demand", &self.demand)] {
            if let Some(v) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
                return Err(SolveError::InvalidInstance(format!(
                    "{} values must be finite and non-negative, found {}",
                    label, v
                )));
            }
        }

        let supply = self.total_supply();
        let demand = self.total_demand();
        if (supply - demand).abs() > tolerance * (1.0 + supply.abs().max(demand.abs())) {
            return Err(SolveError::Unbalanced { supply, demand });
        }
        Ok(())
    }
}

/// A symmetric TSP instance over labelled cities.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TspInstance {
    pub cities: Vec<String>,
    pub distances: Vec<Vec<f64>>,
}

impl TspInstance {
    pub fn new(cities: Vec<String>, distances: Vec<Vec<f64>>) -> Self {
        Self { cities, distances }
    }

    pub fn num_cities(&self) -> usize {
        self.cities.len()
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from][to]
    }

    /// Checks that the matrix is square, zero on the diagonal and symmetric.
    pub fn validate(&self, tolerance: f64) -> Result<(), SolveError> {
        let n = self.distances.len();
        if n == 0 {
            return Err(SolveError::InvalidInstance("distance matrix is empty".to_string()));
        }
        if self.cities.len() != n {
            return Err(SolveError::InvalidInstance(format!(
                "{} city labels for a {}x{} distance matrix",
                self.cities.len(),
                n,
                n
            )));
        }
        let mut seen = HashSet::new();
        for city in &self.cities {
            if !seen.insert(city.as_str()) {
                return Err(SolveError::InvalidInstance(format!("duplicate city label '{}'", city)));
            }
        }
        for (i, row) in self.distances.iter().enumerate() {
            if row.len() != n {
                return Err(SolveError::InvalidInstance(format!(
                    "distance row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
        }
        for i in 0..n {
            if self.distances[i][i].abs() > tolerance {
                return Err(SolveError::InvalidInstance(format!(
                    "distance from '{}' to itself is {}",
                    self.cities[i], self.distances[i][i]
                )));
            }
            for j in 0..n {
                let d = self.distances[i][j];
                if !d.is_finite() || d < 0.0 {
                    return Err(SolveError::InvalidInstance(format!(
                        "distance ({}, {}) must be finite and non-negative, found {}",
                        i, j, d
                    )));
                }
                let back = self.distances[j][i];
                if (d - back).abs() > tolerance * (1.0 + d.abs().max(back.abs())) {
                    return Err(SolveError::InvalidInstance(format!(
                        "distances are not symmetric: ({}, {}) = {} but ({}, {}) = {}",
                        i, j, d, j, i, back
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Any of the three problem kinds, ready to solve.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub enum Problem {
    Lp(LpProblem),
    Transportation(TransportationProblem),
    Tsp(TspInstance),
}
