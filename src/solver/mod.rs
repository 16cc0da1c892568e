pub mod analytic;
pub mod reference;

use crate::config::{AnalyticOutput, SodConfig};
use crate::error::Result;
use crate::fv_core::condition::RiemannProblem;
use crate::fv_core::mesh::{Mesh, Mesh1d};
use crate::fv_core::record::SolutionRecord;

use analytic::AnalyticSolver;

/// Produces a solution record on the tube mesh at time `t`.
pub trait ShockTubeSolver {
    fn name(&self) -> &str;

    fn solve(&self, config: &SodConfig, t: f64) -> Result<SolutionRecord>;
}

pub struct AnalyticAdapter;

pub struct ReferenceAdapter;

impl ShockTubeSolver for AnalyticAdapter {
    fn name(&self) -> &str {
        "analytic"
    }

    fn solve(&self, config: &SodConfig, t: f64) -> Result<SolutionRecord> {
        let tube = &config.tube;
        let mesh = Mesh1d::linspace(tube.x_left, tube.x_right(), config.mesh_points)?;
        let shifted_mesh = mesh.shifted(-tube.x_shift);

        let problem = RiemannProblem {
            left: config.left,
            right: config.right,
            gas: config.gas,
            diaphragm_x: tube.diaphragm_x,
        }
        .translated(-tube.x_shift);

        let solver = AnalyticSolver::new(problem)?;
        match config.analytic_output {
            AnalyticOutput::Points => {
                let points = solver.get_analytic_solution(&shifted_mesh, t)?;
                SolutionRecord::from_points(mesh.grid_points(), &points)
            }
            AnalyticOutput::Triples => {
                let triples = solver.get_analytic_triples(&shifted_mesh, t)?;
                SolutionRecord::from_triples(mesh.grid_points(), &triples)
            }
        }
    }
}

impl ShockTubeSolver for ReferenceAdapter {
    fn name(&self) -> &str {
        "reference"
    }

    fn solve(&self, config: &SodConfig, t: f64) -> Result<SolutionRecord> {
        let tube = &config.tube;
        let solution = reference::solve(
            (config.left.p, config.left.rho, config.left.u),
            (config.right.p, config.right.rho, config.right.u),
            (tube.x_left, tube.x_right(), tube.diaphragm_x),
            t,
            config.gas.gamma,
            config.mesh_points,
        )?;
        solution.values.to_record()
    }
}
