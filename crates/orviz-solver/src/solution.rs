/// The result of solving an LP problem graphically
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpSolution {
    /// The optimal corner point
    pub optimum: CornerPoint,
    /// Optimal objective value
    pub objective_value: f64,
    /// Every distinct intersection of boundary lines, feasible or not, in enumeration order
    pub corner_points: Vec<CornerPoint>,
    /// Boundary lines the corner points were generated from
    pub lines: Vec<BoundaryLine>,
    /// Other feasible corners with the same objective value.
    /// When non-empty the whole edge between them and the optimum is optimal.
    pub alternate_optima: Vec<CornerPoint>,
    /// Which constraints are binding (tight) at the optimum
    pub binding_constraints: Vec<String>,
}

impl LpSolution {
    pub fn feasible_points(&self) -> impl Iterator<Item = &CornerPoint> {
        self.corner_points.iter().filter(|p| p.feasible)
    }

    /// Feasible corners ordered counter-clockwise around their centroid,
    /// i.e. the outline of the feasible region.
    pub fn feasible_region(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = self.feasible_points().map(|p| (p.x1, p.x2)).collect();
        if points.len() < 3 {
            return points;
        }
        let n = points.len() as f64;
        let cx = points.iter().map(|p| p.0).sum::<f64>() / n;
        let cy = points.iter().map(|p| p.1).sum::<f64>() / n;
        points.sort_by(|a, b| {
            let ta = (a.1 - cy).atan2(a.0 - cx);
            let tb = (b.1 - cy).atan2(b.0 - cx);
            ta.total_cmp(&tb)
        });
        points
    }

    pub fn has_multiple_optima(&self) -> bool {
        !self.alternate_optima.is_empty()
    }
}

/// A vertex candidate produced by intersecting two boundary lines
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerPoint {
    pub x1: f64,
    pub x2: f64,
    /// Objective value at this point
    pub value: f64,
    /// Whether the point satisfies every constraint
    pub feasible: bool,
    /// Indices into `LpSolution::lines` of the two lines meeting here
    pub lines: (usize, usize),
}

/// The line `a*x1 + b*x2 = c`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLine {
    pub label: String,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// True for the injected non-negativity axes
    pub implicit: bool,
}

impl BoundaryLine {
    /// Intersection with `other`, or None when the lines are parallel or coincident.
    /// Parallelism is judged relative to the coefficient magnitudes, so rescaling
    /// either line does not change the answer.
    pub fn intersect(&self, other: &BoundaryLine, tolerance: f64) -> Option<(f64, f64)> {
        let det = self.a * other.b - other.a * self.b;
        let scale = (self.a.abs() + self.b.abs()) * (other.a.abs() + other.b.abs());
        if det.abs() <= tolerance * scale {
            return None;
        }
        let x1 = (self.c * other.b - other.c * self.b) / det;
        let x2 = (self.a * other.c - other.a * self.c) / det;
        Some((x1, x2))
    }
}

/// The result of Vogel's Approximation Method
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TransportationSolution {
    /// Shipped quantity per (source, destination)
    pub allocation: Vec<Vec<f64>>,
    /// Allocations in the order they were made
    pub steps: Vec<AllocationStep>,
    /// Sum of allocation * cost over all cells
    pub total_cost: f64,
}

impl TransportationSolution {
    /// Non-zero shipments as (source, destination, quantity).
    pub fn shipments(&self) -> Vec<(usize, usize, f64)> {
        let mut out = Vec::new();
        for (i, row) in self.allocation.iter().enumerate() {
            for (j, &q) in row.iter().enumerate() {
                if q > 0.0 {
                    out.push((i, j, q));
                }
            }
        }
        out
    }

    /// Cells in the basis, including degenerate zero allocations.
    pub fn basic_cells(&self) -> Vec<(usize, usize)> {
        self.steps.iter().map(|s| (s.row, s.column)).collect()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationStep {
    pub row: usize,
    pub column: usize,
    pub quantity: f64,
    /// Per-unit cost of the cell
    pub unit_cost: f64,
    /// Total cost allocated so far, this step included
    pub running_cost: f64,
    /// The row or column whose penalty selected this cell
    pub selected: PenaltyLine,
    pub penalty: f64,
    /// A zero allocation recorded when a row and column were exhausted together
    pub degenerate: bool,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyLine {
    Row(usize),
    Column(usize),
}

/// A closed tour: starts and ends at city 0
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub order: Vec<usize>,
    pub length: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TourEdge {
    pub from: usize,
    pub to: usize,
    pub distance: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TspMethod {
    /// Exhaustive search, globally optimal
    Exact,
    /// Nearest-neighbor construction
    NearestNeighbor,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TspSolution {
    pub tour: Tour,
    pub method: TspMethod,
    /// Tour edges in travel order
    pub edges: Vec<TourEdge>,
}

impl TspSolution {
    pub fn is_exact(&self) -> bool {
        self.method == TspMethod::Exact
    }
}

/// Any of the three solution kinds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub enum Solution {
    Lp(LpSolution),
    Transportation(TransportationSolution),
    Tsp(TspSolution),
}
