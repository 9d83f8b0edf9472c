//! Correlation matrices across numeric and boolean variables

use super::stats;
use crate::frame::{Column, ValueKind};

/// Square matrix; `None` marks a pair without enough complete, varying observations
pub type Matrix = Vec<Vec<Option<f64>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Correlations {
    pub names: Vec<String>,
    pub pearson: Matrix,
    pub spearman: Matrix,
}

impl Correlations {
    /// Compute both matrices; `None` when fewer than two columns qualify
    pub fn compute(columns: &[Column]) -> Option<Self> {
        let numeric: Vec<(&str, Vec<Option<f64>>)> = columns
            .iter()
            .filter(|c| {
                matches!(
                    c.kind(),
                    Some(ValueKind::Int | ValueKind::Float | ValueKind::Bool)
                )
            })
            .map(|c| {
                let values = c
                    .values
                    .iter()
                    .map(|v| v.as_f64().filter(|x| x.is_finite()))
                    .collect();
                (c.name.as_str(), values)
            })
            .collect();
        if numeric.len() < 2 {
            return None;
        }

        let size = numeric.len();
        let mut pearson = vec![vec![None; size]; size];
        let mut spearman = vec![vec![None; size]; size];
        for i in 0..size {
            for j in i..size {
                let (xs, ys) = complete_pairs(&numeric[i].1, &numeric[j].1);
                let p = stats::pearson(&xs, &ys);
                let s = stats::spearman(&xs, &ys);
                pearson[i][j] = p;
                pearson[j][i] = p;
                spearman[i][j] = s;
                spearman[j][i] = s;
            }
        }

        Some(Self {
            names: numeric.iter().map(|(name, _)| (*name).to_string()).collect(),
            pearson,
            spearman,
        })
    }

    /// Off-diagonal pairs whose |Pearson| reaches `threshold`, upper triangle only
    pub fn strong_pairs(&self, threshold: f64) -> Vec<(&str, &str, f64)> {
        let mut pairs = Vec::new();
        for (i, row) in self.pearson.iter().enumerate() {
            for (j, cell) in row.iter().enumerate().skip(i + 1) {
                if let Some(r) = cell {
                    if r.abs() >= threshold {
                        pairs.push((self.names[i].as_str(), self.names[j].as_str(), *r));
                    }
                }
            }
        }
        pairs
    }
}

fn complete_pairs(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip()
}
