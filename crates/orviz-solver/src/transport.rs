use tracing::{debug, trace};

use crate::error::SolveError;
use crate::problem::TransportationProblem;
use crate::solution::{AllocationStep, PenaltyLine, TransportationSolution};

/// Vogel's Approximation Method for balanced transportation problems.
///
/// Produces a feasible basic allocation that is usually close to optimal.
/// It is not the transportation simplex and gives no optimality guarantee.
#[derive(Debug, Clone, Copy)]
pub struct VamSolver {
    /// Tolerance for the balance check and for treating a remainder as exhausted
    tolerance: f64,
}

impl Default for VamSolver {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

/// Remaining quantities and active flags for every row and column.
/// Lines are deactivated in place, never removed, so indices stay stable.
struct Ledger {
    supply: Vec<f64>,
    demand: Vec<f64>,
    row_active: Vec<bool>,
    col_active: Vec<bool>,
}

impl Ledger {
    fn active_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.row_active.len()).filter(|&i| self.row_active[i])
    }

    fn active_cols(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.col_active.len()).filter(|&j| self.col_active[j])
    }

    fn is_open(&self) -> bool {
        self.row_active.iter().any(|&a| a) && self.col_active.iter().any(|&a| a)
    }
}

impl VamSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn solve(&self, problem: &TransportationProblem) -> Result<TransportationSolution, SolveError> {
        problem.validate(self.tolerance)?;

        let costs = &problem.costs;
        let m = problem.num_sources();
        let n = problem.num_destinations();
        let exhausted = self.tolerance * (1.0 + problem.total_supply());

        let mut ledger = Ledger {
            supply: problem.supply.clone(),
            demand: problem.demand.clone(),
            row_active: problem.supply.iter().map(|&s| s > exhausted).collect(),
            col_active: problem.demand.iter().map(|&d| d > exhausted).collect(),
        };
        let mut allocation = vec![vec![0.0; n]; m];
        let mut steps: Vec<AllocationStep> = Vec::new();
        let mut running_cost = 0.0;

        while ledger.is_open() {
            let Some((selected, line_penalty)) = self.select_line(costs, &ledger) else {
                break;
            };
            let (i, j) = match selected {
                PenaltyLine::Row(i) => (i, cheapest(ledger.active_cols(), |j| costs[i][j])),
                PenaltyLine::Column(j) => (cheapest(ledger.active_rows(), |i| costs[i][j]), j),
            };

            let quantity = ledger.supply[i].min(ledger.demand[j]);
            allocation[i][j] += quantity;
            ledger.supply[i] -= quantity;
            ledger.demand[j] -= quantity;
            running_cost += quantity * costs[i][j];

            trace!(row = i, column = j, quantity, penalty = line_penalty, ?selected, "allocate");
            steps.push(AllocationStep {
                row: i,
                column: j,
                quantity,
                unit_cost: costs[i][j],
                running_cost,
                selected,
                penalty: line_penalty,
                degenerate: false,
            });

            let row_done = ledger.supply[i] <= exhausted;
            let col_done = ledger.demand[j] <= exhausted;
            if row_done {
                ledger.supply[i] = 0.0;
                ledger.row_active[i] = false;
            }
            if col_done {
                ledger.demand[j] = 0.0;
                ledger.col_active[j] = false;
            }

            // Row and column closed together: keep the basis at m + n - 1 cells
            // with a zero allocation next to the exhausted cell.
            if row_done && col_done && ledger.is_open() {
                let cell = (i, cheapest(ledger.active_cols(), |c| costs[i][c]));
                trace!(row = cell.0, column = cell.1, "degenerate zero allocation");
                steps.push(AllocationStep {
                    row: cell.0,
                    column: cell.1,
                    quantity: 0.0,
                    unit_cost: costs[cell.0][cell.1],
                    running_cost,
                    selected,
                    penalty: line_penalty,
                    degenerate: true,
                });
            }
        }

        let total_cost: f64 = allocation
            .iter()
            .zip(costs)
            .flat_map(|(a, c)| a.iter().zip(c).map(|(q, u)| q * u))
            .sum();

        debug!(
            sources = m,
            destinations = n,
            steps = steps.len(),
            total_cost,
            "vogel approximation finished"
        );

        Ok(TransportationSolution {
            allocation,
            steps,
            total_cost,
        })
    }

    /// The line with the largest penalty. Rows are scanned before columns,
    /// each in index order, and only a strictly larger penalty replaces the incumbent.
    fn select_line(&self, costs: &[Vec<f64>], ledger: &Ledger) -> Option<(PenaltyLine, f64)> {
        let rows = ledger.active_rows().filter_map(|i| {
            penalty(ledger.active_cols().map(|j| costs[i][j])).map(|p| (PenaltyLine::Row(i), p))
        });
        let cols = ledger.active_cols().filter_map(|j| {
            penalty(ledger.active_rows().map(|i| costs[i][j])).map(|p| (PenaltyLine::Column(j), p))
        });

        let mut best: Option<(PenaltyLine, f64)> = None;
        for (line, p) in rows.chain(cols) {
            let better = match best {
                Some((_, b)) => p > b + self.tolerance,
                None => true,
            };
            if better {
                best = Some((line, p));
            }
        }
        best
    }
}

/// Difference between the two smallest costs, or the cost itself when only one remains.
fn penalty(costs: impl Iterator<Item = f64>) -> Option<f64> {
    let mut lowest = f64::INFINITY;
    let mut second = f64::INFINITY;
    let mut count = 0;
    for c in costs {
        count += 1;
        if c < lowest {
            second = lowest;
            lowest = c;
        } else if c < second {
            second = c;
        }
    }
    match count {
        0 => None,
        1 => Some(lowest),
        _ => Some(second - lowest),
    }
}

/// Index with the minimum cost; the first one wins ties.
fn cheapest(indices: impl Iterator<Item = usize>, cost: impl Fn(usize) -> f64) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for k in indices {
        let c = cost(k);
        let better = match best {
            Some((_, b)) => c < b,
            None => true,
        };
        if better {
            best = Some((k, c));
        }
    }
    best.map(|(k, _)| k).unwrap_or(0)
}
