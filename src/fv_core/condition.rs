use crate::error::Result;
use crate::fv_core::state::{GasLaw, PrimitiveState};

pub trait InitialCondition {
    fn state_at(&self, x: f64) -> PrimitiveState;
}

/// Two constant states separated by a diaphragm at `diaphragm_x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiemannProblem {
    pub left: PrimitiveState,
    pub right: PrimitiveState,
    pub gas: GasLaw,
    pub diaphragm_x: f64,
}

impl RiemannProblem {
    pub fn validate(&self) -> Result<()> {
        self.left.validate("left")?;
        self.right.validate("right")?;
        self.gas.validate()
    }

    pub fn translated(&self, shift: f64) -> Self {
        RiemannProblem {
            diaphragm_x: self.diaphragm_x + shift,
            ..*self
        }
    }
}

impl InitialCondition for RiemannProblem {
    fn state_at(&self, x: f64) -> PrimitiveState {
        if x < self.diaphragm_x {
            self.left
        } else {
            self.right
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fv_core::mesh::{Mesh, Mesh1d};

    fn sod() -> RiemannProblem {
        RiemannProblem {
            left: PrimitiveState::new(1.0, 0.0, 1.0),
            right: PrimitiveState::new(0.125, 0.0, 0.1),
            gas: GasLaw { gamma: 1.4 },
            diaphragm_x: 0.5,
        }
    }

    #[test]
    fn initial_states_split_at_diaphragm() {
        let mesh = Mesh1d::linspace(0.0, 1.0, 5).unwrap();
        let states: Vec<PrimitiveState> =
            mesh.grid_points().iter().map(|&x| sod().state_at(x)).collect();
        let rho: Vec<f64> = states.iter().map(|s| s.rho).collect();
        let p: Vec<f64> = states.iter().map(|s| s.p).collect();
        assert_eq!(rho, vec![1.0, 1.0, 0.125, 0.125, 0.125]);
        assert_eq!(p, vec![1.0, 1.0, 0.1, 0.1, 0.1]);
        assert!(states.iter().all(|s| s.u == 0.0));
    }

    #[test]
    fn translation_moves_only_the_diaphragm() {
        let moved = sod().translated(-0.5);
        assert_eq!(moved.diaphragm_x, 0.0);
        assert_eq!(moved.left, sod().left);
        assert_eq!(moved.state_at(-0.1), sod().left);
        assert_eq!(moved.state_at(0.0), sod().right);
    }
}
