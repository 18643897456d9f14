use tracing::{debug, trace};

use crate::error::SolveError;
use crate::problem::LpProblem;
use crate::solution::{BoundaryLine, CornerPoint, LpSolution};

/// Corner-point solver for linear programs in exactly two variables.
///
/// Every constraint boundary is intersected with every other one (plus the
/// non-negativity axes). Feasible intersections are the vertices of the
/// feasible region and the best of them is the optimum. Unboundedness is not
/// detected: on an unbounded region the best enumerated vertex is returned.
#[derive(Debug, Clone, Copy)]
pub struct GraphicalSolver {
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for GraphicalSolver {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl GraphicalSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn solve(&self, problem: &LpProblem) -> Result<LpSolution, SolveError> {
        self.validate(problem)?;

        let lines = self.boundary_lines(problem);
        let corner_points = self.enumerate_corners(problem, &lines);

        let direction = problem.objective.direction;
        let mut best: Option<CornerPoint> = None;
        for point in corner_points.iter().filter(|p| p.feasible) {
            let better = match &best {
                Some(b) => direction.improves(point.value, b.value, self.scaled(b.value)),
                None => true,
            };
            if better {
                best = Some(*point);
            }
        }
        let Some(optimum) = best else {
            debug!(
                lines = lines.len(),
                candidates = corner_points.len(),
                "no feasible corner point"
            );
            return Err(SolveError::Infeasible);
        };

        let slack = self.scaled(optimum.value);
        let alternate_optima: Vec<CornerPoint> = corner_points
            .iter()
            .filter(|p| p.feasible && p.lines != optimum.lines && (p.value - optimum.value).abs() <= slack)
            .copied()
            .collect();

        let at = [optimum.x1, optimum.x2];
        let binding_constraints = problem
            .constraints
            .iter()
            .filter(|c| (c.lhs(&at) - c.rhs).abs() <= self.scaled(c.rhs))
            .map(|c| c.name.clone())
            .collect();

        debug!(
            lines = lines.len(),
            candidates = corner_points.len(),
            feasible = corner_points.iter().filter(|p| p.feasible).count(),
            x1 = optimum.x1,
            x2 = optimum.x2,
            value = optimum.value,
            "graphical solve finished"
        );

        Ok(LpSolution {
            optimum,
            objective_value: optimum.value,
            corner_points,
            lines,
            alternate_optima,
            binding_constraints,
        })
    }

    fn validate(&self, problem: &LpProblem) -> Result<(), SolveError> {
        if problem.num_variables() != 2 {
            return Err(SolveError::InvalidInstance(format!(
                "the graphical method needs exactly 2 variables, got {}",
                problem.num_variables()
            )));
        }
        if problem.objective.coefficients.len() != 2 {
            return Err(SolveError::InvalidInstance(format!(
                "objective has {} coefficients, expected 2",
                problem.objective.coefficients.len()
            )));
        }
        if problem.objective.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SolveError::InvalidInstance("objective coefficients must be finite".to_string()));
        }
        for c in &problem.constraints {
            if c.coefficients.len() != 2 {
                return Err(SolveError::InvalidInstance(format!(
                    "constraint {} has {} coefficients, expected 2",
                    c.name,
                    c.coefficients.len()
                )));
            }
            if c.coefficients.iter().any(|v| !v.is_finite()) || !c.rhs.is_finite() {
                return Err(SolveError::InvalidInstance(format!(
                    "constraint {} has a non-finite value",
                    c.name
                )));
            }
        }
        Ok(())
    }

    /// Constraint boundaries followed by whichever non-negativity axes are not already among them.
    fn boundary_lines(&self, problem: &LpProblem) -> Vec<BoundaryLine> {
        let tol = self.tolerance;
        let mut lines: Vec<BoundaryLine> = problem
            .constraints
            .iter()
            .filter(|c| c.coefficients[0].abs() > tol || c.coefficients[1].abs() > tol)
            .map(|c| BoundaryLine {
                label: c.name.clone(),
                a: c.coefficients[0],
                b: c.coefficients[1],
                c: c.rhs,
                implicit: false,
            })
            .collect();

        let has_x1_axis = lines.iter().any(|l| l.b.abs() <= tol && l.c.abs() <= tol);
        let has_x2_axis = lines.iter().any(|l| l.a.abs() <= tol && l.c.abs() <= tol);
        if !has_x1_axis {
            lines.push(BoundaryLine {
                label: format!("{} >= 0", problem.variables[0]),
                a: 1.0,
                b: 0.0,
                c: 0.0,
                implicit: true,
            });
        }
        if !has_x2_axis {
            lines.push(BoundaryLine {
                label: format!("{} >= 0", problem.variables[1]),
                a: 0.0,
                b: 1.0,
                c: 0.0,
                implicit: true,
            });
        }
        lines
    }

    fn enumerate_corners(&self, problem: &LpProblem, lines: &[BoundaryLine]) -> Vec<CornerPoint> {
        let mut corners: Vec<CornerPoint> = Vec::new();
        for i in 0..lines.len() {
            for j in (i + 1)..lines.len() {
                let Some((x1, x2)) = lines[i].intersect(&lines[j], self.tolerance) else {
                    continue;
                };
                if !x1.is_finite() || !x2.is_finite() {
                    continue;
                }
                let (x1, x2) = (self.snap(x1), self.snap(x2));
                if corners.iter().any(|p| self.same_point((p.x1, p.x2), (x1, x2))) {
                    continue;
                }
                let feasible = self.is_feasible(problem, x1, x2);
                let value = problem.evaluate(&[x1, x2]);
                trace!(x1, x2, value, feasible, first = %lines[i].label, second = %lines[j].label, "corner point");
                corners.push(CornerPoint {
                    x1,
                    x2,
                    value,
                    feasible,
                    lines: (i, j),
                });
            }
        }
        corners
    }

    fn is_feasible(&self, problem: &LpProblem, x1: f64, x2: f64) -> bool {
        x1 >= -self.tolerance
            && x2 >= -self.tolerance
            && problem
                .constraints
                .iter()
                .all(|c| c.is_satisfied(&[x1, x2], self.tolerance))
    }

    fn same_point(&self, a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() <= self.scaled(a.0) && (a.1 - b.1).abs() <= self.scaled(a.1)
    }

    fn snap(&self, v: f64) -> f64 {
        if v.abs() <= self.tolerance { 0.0 } else { v }
    }

    fn scaled(&self, magnitude: f64) -> f64 {
        self.tolerance * (1.0 + magnitude.abs())
    }
}
