use tracing::{debug, trace};

use crate::error::SolveError;
use crate::problem::TspInstance;
use crate::solution::{Tour, TourEdge, TspMethod, TspSolution};

/// Symmetric TSP solver: exhaustive search up to `exact_threshold` cities,
/// nearest-neighbor construction above it.
///
/// The exact search is factorial in the number of cities. Keep the threshold small.
#[derive(Debug, Clone, Copy)]
pub struct TspSolver {
    /// Largest instance solved exactly
    exact_threshold: usize,
    /// Tolerance for the symmetry and diagonal checks
    tolerance: f64,
}

impl Default for TspSolver {
    fn default() -> Self {
        Self {
            exact_threshold: 10,
            tolerance: 1e-9,
        }
    }
}

impl TspSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exact_threshold(mut self, cities: usize) -> Self {
        self.exact_threshold = cities;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn exact_threshold(&self) -> usize {
        self.exact_threshold
    }

    pub fn solve(&self, instance: &TspInstance) -> Result<TspSolution, SolveError> {
        instance.validate(self.tolerance)?;

        let n = instance.num_cities();
        let (tour, method) = if n <= self.exact_threshold {
            (exact_tour(&instance.distances), TspMethod::Exact)
        } else {
            (nearest_neighbor_tour(&instance.distances), TspMethod::NearestNeighbor)
        };

        let edges = tour
            .order
            .windows(2)
            .map(|w| TourEdge {
                from: w[0],
                to: w[1],
                distance: instance.distance(w[0], w[1]),
            })
            .collect();

        debug!(cities = n, ?method, length = tour.length, "tsp solve finished");

        Ok(TspSolution { tour, method, edges })
    }
}

/// Depth-first search over every ordering of cities 1..n, in lexicographic order.
struct ExactSearch<'a> {
    distances: &'a [Vec<f64>],
    path: Vec<usize>,
    visited: Vec<bool>,
    best: Option<(Vec<usize>, f64)>,
    pruned: u64,
}

impl ExactSearch<'_> {
    fn extend(&mut self, current: usize, length: f64) {
        let n = self.distances.len();
        if self.path.len() == n {
            let total = length + self.distances[current][0];
            let better = match &self.best {
                Some((_, b)) => total < *b,
                None => true,
            };
            if better {
                self.best = Some((self.path.clone(), total));
            }
            return;
        }

        for next in 1..n {
            if self.visited[next] {
                continue;
            }
            let partial = length + self.distances[current][next];
            // Distances are non-negative, so no completion of this prefix can be strictly shorter
            if let Some((_, b)) = &self.best {
                if partial >= *b {
                    self.pruned += 1;
                    continue;
                }
            }
            self.visited[next] = true;
            self.path.push(next);
            self.extend(next, partial);
            self.path.pop();
            self.visited[next] = false;
        }
    }
}

/// The shortest tour; the first one in lexicographic order wins ties.
fn exact_tour(distances: &[Vec<f64>]) -> Tour {
    let n = distances.len();
    let mut visited = vec![false; n];
    visited[0] = true;
    let mut search = ExactSearch {
        distances,
        path: vec![0],
        visited,
        best: None,
        pruned: 0,
    };
    search.extend(0, 0.0);
    trace!(pruned = search.pruned, "exact search finished");

    let (mut order, length) = search.best.unwrap_or_else(|| (vec![0], 0.0));
    order.push(0);
    Tour { order, length }
}

/// Greedy tour from city 0, always moving to the closest unvisited city (lowest index on ties).
fn nearest_neighbor_tour(distances: &[Vec<f64>]) -> Tour {
    let n = distances.len();
    let mut visited = vec![false; n];
    visited[0] = true;
    let mut order = Vec::with_capacity(n + 1);
    order.push(0);
    let mut current = 0;
    let mut length = 0.0;

    while order.len() < n {
        let mut nearest: Option<(usize, f64)> = None;
        for k in (0..n).filter(|&k| !visited[k]) {
            let d = distances[current][k];
            let closer = match nearest {
                Some((_, best)) => d < best,
                None => true,
            };
            if closer {
                nearest = Some((k, d));
            }
        }
        let Some((next, d)) = nearest else {
            break;
        };
        visited[next] = true;
        order.push(next);
        length += d;
        current = next;
    }

    length += distances[current][0];
    order.push(0);
    Tour { order, length }
}
