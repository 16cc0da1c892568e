use log::warn;

use crate::fv_core::record::{Field, SolutionRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exceedance {
    pub field: Field,
    pub index: usize,
    pub x: f64,
    pub value: f64,
}

/// Per-field summary of a deviation record at one frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationReport {
    pub time: f64,
    pub max_abs: [f64; 3],
    pub l1: [f64; 3],
    pub exceeded: Vec<Exceedance>,
}

impl DeviationReport {
    pub fn max_abs_of(&self, field: Field) -> f64 {
        Field::SOLUTION
            .iter()
            .position(|&f| f == field)
            .map_or(0.0, |i| self.max_abs[i])
    }

    pub fn worst(&self) -> f64 {
        self.max_abs.iter().cloned().fold(0.0, f64::max)
    }

    pub fn is_clean(&self) -> bool {
        self.exceeded.is_empty()
    }
}

/// L1 norm of a deviation, weighted by the mesh spacing.
fn calc_err(x: &[f64], d: &[f64]) -> f64 {
    if x.len() < 2 {
        return d.iter().map(|v| v.abs()).sum();
    }
    let dx = (x[x.len() - 1] - x[0]) / (x.len() - 1) as f64;
    d.iter().map(|v| dx * v.abs()).sum()
}

/// Flags every point whose absolute deviation is above `threshold` and logs
/// the worst point of each offending field. Never fails.
pub fn check_deviation(deviation: &SolutionRecord, threshold: f64, time: f64) -> DeviationReport {
    let mut max_abs = [0.0; 3];
    let mut l1 = [0.0; 3];
    let mut exceeded = Vec::new();

    for (k, field) in Field::SOLUTION.into_iter().enumerate() {
        let values = deviation.get(field);
        l1[k] = calc_err(deviation.x.as_slice(), values.as_slice());

        let mut worst: Option<Exceedance> = None;
        for (index, &value) in values.iter().enumerate() {
            let abs = value.abs();
            if abs > max_abs[k] {
                max_abs[k] = abs;
            }
            if abs > threshold {
                let hit = Exceedance {
                    field,
                    index,
                    x: deviation.x[index],
                    value,
                };
                if worst.map_or(true, |w| abs > w.value.abs()) {
                    worst = Some(hit);
                }
                exceeded.push(hit);
            }
        }

        if let Some(w) = worst {
            warn!(
                "t = {:.2}: {} deviation {:e} at x = {:.4} (index {}) exceeds {:e}",
                time,
                field.key(),
                w.value,
                w.x,
                w.index,
                threshold
            );
        }
    }

    DeviationReport {
        time,
        max_abs,
        l1,
        exceeded,
    }
}
