extern crate nalgebra as na;

use crate::error::{Result, SodError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    X,
    Rho,
    U,
    P,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::X, Field::Rho, Field::U, Field::P];

    /// Fields carrying the gas state, i.e. everything but the positions.
    pub const SOLUTION: [Field; 3] = [Field::Rho, Field::U, Field::P];

    pub fn key(&self) -> &'static str {
        match self {
            Field::X => "x",
            Field::Rho => "rho",
            Field::U => "u",
            Field::P => "p",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Field::X => "Position",
            Field::Rho => "Density",
            Field::U => "Velocity",
            Field::P => "Pressure",
        }
    }
}

/// A sampled solution at one instant: one value per mesh point and field.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionRecord {
    pub x: na::DVector<f64>,
    pub rho: na::DVector<f64>,
    pub u: na::DVector<f64>,
    pub p: na::DVector<f64>,
}

/// Per-point output of the analytic solver: `(x, rho, u, p)`.
pub type AnalyticPoint = (f64, f64, f64, f64);

/// Per-point output of the analytic solver variant without positions.
pub type AnalyticTriple = (f64, f64, f64);

impl SolutionRecord {
    pub fn new(
        x: na::DVector<f64>,
        rho: na::DVector<f64>,
        u: na::DVector<f64>,
        p: na::DVector<f64>,
    ) -> Result<Self> {
        let n = x.len();
        for (field, len) in [(Field::Rho, rho.len()), (Field::U, u.len()), (Field::P, p.len())] {
            if len != n {
                return Err(SodError::ShapeMismatch {
                    field: field.key(),
                    base: n,
                    target: len,
                });
            }
        }
        Ok(SolutionRecord { x, rho, u, p })
    }

    /// Repacks analytic tuples; positions come from `x` rather than the
    /// tuples, which may live on a shifted mesh.
    pub fn from_points(x: &[f64], points: &[AnalyticPoint]) -> Result<Self> {
        if x.len() != points.len() {
            return Err(SodError::ShapeMismatch {
                field: Field::X.key(),
                base: x.len(),
                target: points.len(),
            });
        }
        let rho: Vec<f64> = points.iter().map(|pt| pt.1).collect();
        let u: Vec<f64> = points.iter().map(|pt| pt.2).collect();
        let p: Vec<f64> = points.iter().map(|pt| pt.3).collect();

        Self::new(
            na::DVector::from_column_slice(x),
            na::DVector::from_vec(rho),
            na::DVector::from_vec(u),
            na::DVector::from_vec(p),
        )
    }

    pub fn from_triples(x: &[f64], triples: &[AnalyticTriple]) -> Result<Self> {
        if x.len() != triples.len() {
            return Err(SodError::ShapeMismatch {
                field: Field::X.key(),
                base: x.len(),
                target: triples.len(),
            });
        }
        Self::new(
            na::DVector::from_column_slice(x),
            na::DVector::from_iterator(triples.len(), triples.iter().map(|t| t.0)),
            na::DVector::from_iterator(triples.len(), triples.iter().map(|t| t.1)),
            na::DVector::from_iterator(triples.len(), triples.iter().map(|t| t.2)),
        )
    }

    pub fn get(&self, field: Field) -> &na::DVector<f64> {
        match field {
            Field::X => &self.x,
            Field::Rho => &self.rho,
            Field::U => &self.u,
            Field::P => &self.p,
        }
    }

    pub fn keys(&self) -> [&'static str; 4] {
        Field::ALL.map(|f| f.key())
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Pointwise `target - base` for every solution field. Positions are taken
/// from `base`.
pub fn deviation(base: &SolutionRecord, target: &SolutionRecord) -> Result<SolutionRecord> {
    for field in Field::ALL {
        let (nb, nt) = (base.get(field).len(), target.get(field).len());
        if nb != nt {
            return Err(SodError::ShapeMismatch {
                field: field.key(),
                base: nb,
                target: nt,
            });
        }
    }

    Ok(SolutionRecord {
        x: base.x.clone(),
        rho: &target.rho - &base.rho,
        u: &target.u - &base.u,
        p: &target.p - &base.p,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SolutionRecord {
        SolutionRecord::new(
            na::DVector::from_vec(vec![0.0, 0.5, 1.0]),
            na::DVector::from_vec(vec![1.0, 0.5, 0.125]),
            na::DVector::from_vec(vec![0.0, 0.9, 0.0]),
            na::DVector::from_vec(vec![1.0, 0.3, 0.1]),
        )
        .unwrap()
    }

    #[test]
    fn identical_records_have_zero_deviation() {
        let record = sample_record();
        let dev = deviation(&record, &record.clone()).unwrap();
        for field in Field::SOLUTION {
            assert!(dev.get(field).iter().all(|&d| d == 0.0));
        }
        assert_eq!(dev.x, record.x);
    }

    #[test]
    fn deviation_is_target_minus_base() {
        let base = sample_record();
        let mut target = base.clone();
        target.p[1] = 0.25;
        target.rho[2] = 0.2;
        let dev = deviation(&base, &target).unwrap();
        assert!((dev.p[1] - (-0.05)).abs() < 1e-15);
        assert!((dev.rho[2] - 0.075).abs() < 1e-15);
        assert_eq!(dev.u[1], 0.0);
    }

    #[test]
    fn length_mismatch_is_reported() {
        let base = sample_record();
        let target = SolutionRecord::new(
            na::DVector::from_vec(vec![0.0, 1.0]),
            na::DVector::from_vec(vec![1.0, 0.125]),
            na::DVector::from_vec(vec![0.0, 0.0]),
            na::DVector::from_vec(vec![1.0, 0.1]),
        )
        .unwrap();
        match deviation(&base, &target) {
            Err(SodError::ShapeMismatch { field, base, target }) => {
                assert_eq!(field, "x");
                assert_eq!((base, target), (3, 2));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unequal_fields_are_rejected() {
        let result = SolutionRecord::new(
            na::DVector::from_vec(vec![0.0, 1.0]),
            na::DVector::from_vec(vec![1.0]),
            na::DVector::from_vec(vec![0.0, 0.0]),
            na::DVector::from_vec(vec![1.0, 0.1]),
        );
        assert!(matches!(
            result,
            Err(SodError::ShapeMismatch { field: "rho", .. })
        ));
    }

    #[test]
    fn points_are_repacked_with_supplied_positions() {
        let x = [0.0, 1.0];
        let points = [(-0.5, 1.0, 0.0, 1.0), (0.5, 0.125, 0.0, 0.1)];
        let record = SolutionRecord::from_points(&x, &points).unwrap();
        assert_eq!(record.keys(), ["x", "rho", "u", "p"]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.x.as_slice(), &[0.0, 1.0]);
        assert_eq!(record.rho.as_slice(), &[1.0, 0.125]);
        assert_eq!(record.p.as_slice(), &[1.0, 0.1]);

        let triples = [(1.0, 0.0, 1.0), (0.125, 0.0, 0.1)];
        let from_triples = SolutionRecord::from_triples(&x, &triples).unwrap();
        assert_eq!(from_triples, record);
    }
}
