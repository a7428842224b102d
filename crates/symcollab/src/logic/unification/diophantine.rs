//! Homogeneous linear Diophantine systems over the naturals
//!
//! AC unification reduces to finding the minimal non-negative, non-zero
//! solutions of `A·v = 0`. Every other solution is a sum of minimal ones, so
//! the minimal solutions form the basis from which unifiers are assembled.
//!
//! ## Algorithm
//!
//! Contejean–Devie completion. Starting from the unit vectors, a frontier of
//! candidate vectors is grown one unit at a time:
//!
//! 1. Candidates that solve the system move to the basis.
//! 2. A non-solution `p` is extended by `e_j` only when the defect `A·e_j`
//!    points back towards the origin, i.e. `⟨A·p, A·e_j⟩ < 0`.
//! 3. Extensions that dominate a basis vector are discarded.
//!
//! The frontier empties after finitely many rounds and the basis is then
//! exactly the set of minimal solutions.

use crate::error::{Result, UnificationError};
use std::collections::HashSet;
use tracing::{debug, trace};

/// A solution vector, one entry per column
pub type Solution = Vec<u32>;

/// `rows · v = 0` with `columns` unknowns
#[derive(Debug, Clone, Default)]
pub struct HomogeneousSystem {
    rows: Vec<Vec<i64>>,
    columns: usize,
}

impl HomogeneousSystem {
    pub fn new(columns: usize) -> Self {
        HomogeneousSystem {
            rows: Vec::new(),
            columns,
        }
    }

    /// Add one equation. Rows shorter than the column count are padded with
    /// zeros; longer rows are rejected.
    pub fn add_row(&mut self, mut row: Vec<i64>) -> Result<()> {
        if row.len() > self.columns {
            return Err(UnificationError::ArityMismatch(self.columns, row.len()));
        }
        row.resize(self.columns, 0);
        if row.iter().any(|&c| c != 0) {
            self.rows.push(row);
        }
        Ok(())
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// The defect `A·v`
    pub fn evaluate(&self, v: &[u32]) -> Vec<i64> {
        self.rows
            .iter()
            .map(|row| row.iter().zip(v).map(|(&a, &x)| a * i64::from(x)).sum())
            .collect()
    }

    pub fn is_solution(&self, v: &[u32]) -> bool {
        v.iter().any(|&x| x > 0) && self.evaluate(v).iter().all(|&d| d == 0)
    }

    fn column_defect(&self, j: usize) -> Vec<i64> {
        self.rows.iter().map(|row| row[j]).collect()
    }

    /// All minimal non-zero solutions, in the order they are found.
    ///
    /// Fails with `SearchLimit` when a frontier grows beyond `max_frontier`.
    pub fn minimal_solutions(&self, max_frontier: usize) -> Result<Vec<Solution>> {
        let n = self.columns;
        let unit_defects: Vec<Vec<i64>> = (0..n).map(|j| self.column_defect(j)).collect();

        let mut basis: Vec<Solution> = Vec::new();
        let mut frontier: Vec<Solution> = (0..n)
            .map(|j| {
                let mut e = vec![0; n];
                e[j] = 1;
                e
            })
            .collect();

        let mut round = 0usize;
        while !frontier.is_empty() {
            round += 1;
            trace!(round, frontier = frontier.len(), basis = basis.len(), "completion round");

            let mut open = Vec::with_capacity(frontier.len());
            for candidate in frontier {
                if self.is_solution(&candidate) {
                    basis.push(candidate);
                } else {
                    open.push(candidate);
                }
            }

            let mut seen: HashSet<Solution> = HashSet::new();
            let mut next = Vec::new();
            for p in &open {
                let defect = self.evaluate(p);
                for (j, unit) in unit_defects.iter().enumerate() {
                    if dot(&defect, unit) >= 0 {
                        continue;
                    }
                    let mut q = p.clone();
                    q[j] += 1;
                    if basis.iter().any(|b| dominates(&q, b)) {
                        continue;
                    }
                    if seen.insert(q.clone()) {
                        next.push(q);
                    }
                }
            }

            if next.len() > max_frontier {
                return Err(UnificationError::SearchLimit(format!(
                    "diophantine frontier exceeded {} candidates",
                    max_frontier
                )));
            }
            frontier = next;
        }

        debug!(
            rows = self.rows.len(),
            columns = n,
            solutions = basis.len(),
            "solved homogeneous system"
        );
        Ok(basis)
    }
}

fn dot(a: &[i64], b: &[i64]) -> i64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `v >= w` componentwise
fn dominates(v: &[u32], w: &[u32]) -> bool {
    v.iter().zip(w).all(|(a, b)| a >= b)
}
