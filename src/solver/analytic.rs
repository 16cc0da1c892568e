//! Exact solution of the Riemann problem for the one-dimensional Euler
//! equations with a polytropic gas.
//!
//! The star pressure is found with Newton-Raphson iterations on the pressure
//! function, starting from the two-rarefaction estimate. The complete wave
//! pattern (left wave, contact, right wave) is then sampled along the rays
//! `(x - x_diaphragm) / t`.

use log::debug;

use crate::error::{Result, SodError};
use crate::fv_core::condition::{InitialCondition, RiemannProblem};
use crate::fv_core::mesh::Mesh;
use crate::fv_core::record::{AnalyticPoint, AnalyticTriple};
use crate::fv_core::state::{GasLaw, PrimitiveState};

const PRESSURE_TOL: f64 = 1e-14;
const MAX_ITERATIONS: usize = 100;

/// Pressure and velocity between the left and right waves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarState {
    pub p: f64,
    pub u: f64,
}

pub struct AnalyticSolver {
    problem: RiemannProblem,
    a_l: f64,
    a_r: f64,
}

impl AnalyticSolver {
    pub fn new(problem: RiemannProblem) -> Result<Self> {
        problem.validate()?;
        let gamma = problem.gas.gamma;
        Ok(AnalyticSolver {
            a_l: problem.left.sound_speed(gamma),
            a_r: problem.right.sound_speed(gamma),
            problem,
        })
    }

    /// Value and derivative of the pressure function across the wave
    /// bounding `state`.
    fn pressure_function(p: f64, state: &PrimitiveState, a: f64, gas: &GasLaw) -> (f64, f64) {
        if p > state.p {
            // shock
            let a_k = gas.tdgp1() / state.rho;
            let b_k = gas.gm1dgp1() * state.p;
            let q = (a_k / (p + b_k)).sqrt();
            let f = (p - state.p) * q;
            let df = q * (1.0 - 0.5 * (p - state.p) / (b_k + p));
            (f, df)
        } else {
            // rarefaction
            let ratio = p / state.p;
            let f = gas.tdgm1() * a * (ratio.powf(gas.gm1d2g()) - 1.0);
            let df = ratio.powf(-gas.gp1d2g()) / (state.rho * a);
            (f, df)
        }
    }

    fn initial_guess(&self) -> f64 {
        let (left, right, gas) = (&self.problem.left, &self.problem.right, &self.problem.gas);
        let z = gas.gm1d2g();
        let num = self.a_l + self.a_r - 0.5 * gas.gm1() * (right.u - left.u);
        let denom = self.a_l * left.p.powf(-z) + self.a_r * right.p.powf(-z);
        let p_tr = (num / denom).powf(1.0 / z);
        if p_tr.is_finite() && p_tr > 0.0 {
            p_tr
        } else {
            0.5 * (left.p + right.p)
        }
    }

    pub fn star_state(&self) -> Result<StarState> {
        let (left, right, gas) = (&self.problem.left, &self.problem.right, &self.problem.gas);
        let du = right.u - left.u;

        if gas.tdgm1() * (self.a_l + self.a_r) <= du {
            return Err(SodError::Vacuum);
        }

        let mut p_old = self.initial_guess();
        for iteration in 1..=MAX_ITERATIONS {
            let (f_l, df_l) = Self::pressure_function(p_old, left, self.a_l, gas);
            let (f_r, df_r) = Self::pressure_function(p_old, right, self.a_r, gas);
            let mut p = p_old - (f_l + f_r + du) / (df_l + df_r);
            if p <= 0.0 {
                p = PRESSURE_TOL;
            }
            let change = 2.0 * (p - p_old).abs() / (p + p_old);
            p_old = p;
            if change <= PRESSURE_TOL {
                let (f_l, _) = Self::pressure_function(p, left, self.a_l, gas);
                let (f_r, _) = Self::pressure_function(p, right, self.a_r, gas);
                let u = 0.5 * (left.u + right.u) + 0.5 * (f_r - f_l);
                debug!("star state p = {p}, u = {u} after {iteration} iterations");
                return Ok(StarState { p, u });
            }
        }
        Err(SodError::NoConvergence(MAX_ITERATIONS))
    }

    /// State on the ray `s = (x - x_diaphragm) / t`.
    fn sample_ray(&self, star: &StarState, s: f64) -> PrimitiveState {
        let (left, right, gas) = (&self.problem.left, &self.problem.right, &self.problem.gas);
        let gamma = gas.gamma;

        if s < star.u {
            let p_ratio = star.p / left.p;
            if star.p > left.p {
                let s_l = left.u - self.a_l * (gas.gp1d2g() * p_ratio + gas.gm1d2g()).sqrt();
                if s < s_l {
                    *left
                } else {
                    let rho =
                        left.rho * (p_ratio + gas.gm1dgp1()) / (gas.gm1dgp1() * p_ratio + 1.0);
                    PrimitiveState::new(rho, star.u, star.p)
                }
            } else {
                let s_head = left.u - self.a_l;
                let a_star = self.a_l * p_ratio.powf(gas.gm1d2g());
                let s_tail = star.u - a_star;
                if s < s_head {
                    *left
                } else if s < s_tail {
                    let u = gas.tdgp1() * (self.a_l + 0.5 * gas.gm1() * left.u + s);
                    let a = gas.tdgp1() * (self.a_l + 0.5 * gas.gm1() * (left.u - s));
                    let rho = left.rho * (a / self.a_l).powf(gas.tdgm1());
                    let p = left.p * (a / self.a_l).powf(1.0 / gas.gm1d2g());
                    PrimitiveState::new(rho, u, p)
                } else {
                    PrimitiveState::new(left.rho * p_ratio.powf(1.0 / gamma), star.u, star.p)
                }
            }
        } else {
            let p_ratio = star.p / right.p;
            if star.p > right.p {
                let s_r = right.u + self.a_r * (gas.gp1d2g() * p_ratio + gas.gm1d2g()).sqrt();
                if s < s_r {
                    let rho =
                        right.rho * (p_ratio + gas.gm1dgp1()) / (gas.gm1dgp1() * p_ratio + 1.0);
                    PrimitiveState::new(rho, star.u, star.p)
                } else {
                    *right
                }
            } else {
                let s_head = right.u + self.a_r;
                let a_star = self.a_r * p_ratio.powf(gas.gm1d2g());
                let s_tail = star.u + a_star;
                if s < s_tail {
                    PrimitiveState::new(right.rho * p_ratio.powf(1.0 / gamma), star.u, star.p)
                } else if s < s_head {
                    let u = gas.tdgp1() * (-self.a_r + 0.5 * gas.gm1() * right.u + s);
                    let a = gas.tdgp1() * (self.a_r - 0.5 * gas.gm1() * (right.u - s));
                    let rho = right.rho * (a / self.a_r).powf(gas.tdgm1());
                    let p = right.p * (a / self.a_r).powf(1.0 / gas.gm1d2g());
                    PrimitiveState::new(rho, u, p)
                } else {
                    *right
                }
            }
        }
    }

    fn sample_with(&self, star: &StarState, x: f64, t: f64) -> PrimitiveState {
        if t <= 0.0 {
            return self.problem.state_at(x);
        }
        self.sample_ray(star, (x - self.problem.diaphragm_x) / t)
    }

    pub fn sample(&self, x: f64, t: f64) -> Result<PrimitiveState> {
        let star = self.star_state()?;
        Ok(self.sample_with(&star, x, t))
    }

    /// One `(x, rho, u, p)` tuple per mesh point.
    pub fn get_analytic_solution(&self, mesh: &dyn Mesh, t: f64) -> Result<Vec<AnalyticPoint>> {
        let star = self.star_state()?;
        Ok(mesh
            .grid_points()
            .iter()
            .map(|&x| {
                let state = self.sample_with(&star, x, t);
                (x, state.rho, state.u, state.p)
            })
            .collect())
    }

    /// Same as [`get_analytic_solution`](Self::get_analytic_solution)
    /// without the positions.
    pub fn get_analytic_triples(&self, mesh: &dyn Mesh, t: f64) -> Result<Vec<AnalyticTriple>> {
        Ok(self
            .get_analytic_solution(mesh, t)?
            .into_iter()
            .map(|(_, rho, u, p)| (rho, u, p))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fv_core::mesh::Mesh1d;
    use approx::assert_relative_eq;

    fn solver(left: PrimitiveState, right: PrimitiveState) -> AnalyticSolver {
        AnalyticSolver::new(RiemannProblem {
            left,
            right,
            gas: GasLaw { gamma: 1.4 },
            diaphragm_x: 0.0,
        })
        .unwrap()
    }

    fn sod() -> AnalyticSolver {
        solver(
            PrimitiveState::new(1.0, 0.0, 1.0),
            PrimitiveState::new(0.125, 0.0, 0.1),
        )
    }

    #[test]
    fn sod_star_state() {
        let star = sod().star_state().unwrap();
        assert_relative_eq!(star.p, 0.30313, epsilon = 1e-5);
        assert_relative_eq!(star.u, 0.92745, epsilon = 1e-5);
    }

    #[test]
    fn sod_profile_regions_at_t_0_2() {
        let s = sod();
        let t = 0.2;
        // undisturbed left and right gas
        assert_eq!(s.sample(-0.4, t).unwrap(), PrimitiveState::new(1.0, 0.0, 1.0));
        assert_eq!(s.sample(0.45, t).unwrap(), PrimitiveState::new(0.125, 0.0, 0.1));
        // left star region, between rarefaction tail and contact
        let star_l = s.sample(0.1, t).unwrap();
        assert_relative_eq!(star_l.rho, 0.42632, epsilon = 1e-5);
        // right star region, between contact and shock
        let star_r = s.sample(0.3, t).unwrap();
        assert_relative_eq!(star_r.rho, 0.26557, epsilon = 1e-5);
        assert_relative_eq!(star_r.p, star_l.p, epsilon = 1e-14);
        // inside the rarefaction fan, velocity is linear in x / t
        let fan = s.sample(-0.1, t).unwrap();
        assert_relative_eq!(fan.u, (1.4_f64.sqrt() - 0.5) / 1.2, epsilon = 1e-12);
    }

    #[test]
    fn t_zero_returns_initial_discontinuity() {
        let mesh = Mesh1d::linspace(-0.5, 0.5, 5).unwrap();
        let points = sod().get_analytic_solution(&mesh, 0.0).unwrap();
        let rho: Vec<f64> = points.iter().map(|p| p.1).collect();
        assert_eq!(rho, vec![1.0, 1.0, 0.125, 0.125, 0.125]);
        assert_eq!(points[0].0, -0.5);
    }

    #[test]
    fn triples_drop_positions() {
        let mesh = Mesh1d::linspace(-0.5, 0.5, 9).unwrap();
        let points = sod().get_analytic_solution(&mesh, 0.1).unwrap();
        let triples = sod().get_analytic_triples(&mesh, 0.1).unwrap();
        assert_eq!(points.len(), triples.len());
        for (pt, tr) in points.iter().zip(&triples) {
            assert_eq!((pt.1, pt.2, pt.3), *tr);
        }
    }

    #[test]
    fn symmetric_shocks_stop_the_gas() {
        let s = solver(
            PrimitiveState::new(1.0, 1.0, 1.0),
            PrimitiveState::new(1.0, -1.0, 1.0),
        );
        let star = s.star_state().unwrap();
        assert!(star.p > 1.0);
        assert_relative_eq!(star.u, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn strong_expansion_generates_vacuum() {
        let s = solver(
            PrimitiveState::new(1.0, -10.0, 0.4),
            PrimitiveState::new(1.0, 10.0, 0.4),
        );
        assert!(matches!(s.star_state(), Err(SodError::Vacuum)));
    }
}
