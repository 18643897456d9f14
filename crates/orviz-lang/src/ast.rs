use std::collections::BTreeMap;
use std::fmt;

use orviz_solver::{ConstraintOp, Direction};

/// A linear expression: coefficients keyed by 1-based variable index, plus a constant.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: BTreeMap<usize, f64>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `coefficient` to variable `index`; repeated variables are summed.
    pub fn add_term(&mut self, index: usize, coefficient: f64) {
        *self.terms.entry(index).or_insert(0.0) += coefficient;
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    pub fn coefficient(&self, index: usize) -> f64 {
        self.terms.get(&index).copied().unwrap_or(0.0)
    }

    /// Highest variable index that appears, if any.
    pub fn max_variable(&self) -> Option<usize> {
        self.terms.keys().next_back().copied()
    }

    pub fn has_variables(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Dense coefficient vector for variables `1..=n`.
    pub fn dense(&self, n: usize) -> Vec<f64> {
        (1..=n).map(|k| self.coefficient(k)).collect()
    }

    /// `self - other`, keeping every variable that appears on either side.
    pub fn minus(&self, other: &LinearExpr) -> LinearExpr {
        let mut out = self.clone();
        for (&k, &c) in &other.terms {
            out.add_term(k, -c);
        }
        out.constant -= other.constant;
        out
    }
}

impl fmt::Display for LinearExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (&k, &c) in &self.terms {
            let magnitude = c.abs();
            match (first, c < 0.0) {
                (true, true) => write!(f, "-")?,
                (true, false) => {}
                (false, true) => write!(f, " - ")?,
                (false, false) => write!(f, " + ")?,
            }
            if magnitude != 1.0 {
                write!(f, "{}", magnitude)?;
            }
            write!(f, "x{}", k)?;
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)?;
        } else if self.constant != 0.0 {
            let sign = if self.constant < 0.0 { "-" } else { "+" };
            write!(f, " {} {}", sign, self.constant.abs())?;
        }
        Ok(())
    }
}

/// `expr op rhs`, with every variable on the left and every constant folded into `rhs`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedConstraint {
    pub expr: LinearExpr,
    pub op: ConstraintOp,
    pub rhs: f64,
}

impl fmt::Display for ParsedConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.expr, self.op, self.rhs)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedObjective {
    pub direction: Direction,
    pub expr: LinearExpr,
}

impl fmt::Display for ParsedObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction, self.expr)
    }
}
