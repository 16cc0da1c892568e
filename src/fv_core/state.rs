use serde::{Deserialize, Serialize};

use crate::error::{Result, SodError};

/// Primitive variables of an ideal gas: density, velocity and pressure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveState {
    pub rho: f64,
    pub u: f64,
    pub p: f64,
}

impl PrimitiveState {
    pub fn new(rho: f64, u: f64, p: f64) -> Self {
        PrimitiveState { rho, u, p }
    }

    pub fn sound_speed(&self, gamma: f64) -> f64 {
        (gamma * self.p / self.rho).sqrt()
    }

    pub fn validate(&self, side: &str) -> Result<()> {
        if !(self.rho > 0.0) || !(self.p > 0.0) {
            return Err(SodError::Config(format!(
                "{} state needs positive density and pressure, got rho = {}, p = {}",
                side, self.rho, self.p
            )));
        }
        if !self.u.is_finite() {
            return Err(SodError::Config(format!(
                "{} state velocity is not finite",
                side
            )));
        }
        Ok(())
    }
}

/// Polytropic gas law, p = (gamma - 1) rho e.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasLaw {
    pub gamma: f64,
}

impl GasLaw {
    pub fn validate(&self) -> Result<()> {
        if !(self.gamma > 1.0) {
            return Err(SodError::Config(format!(
                "gamma must be greater than 1, got {}",
                self.gamma
            )));
        }
        Ok(())
    }

    pub fn gm1(&self) -> f64 {
        self.gamma - 1.0
    }

    pub fn gp1(&self) -> f64 {
        self.gamma + 1.0
    }

    /// (gamma - 1) / (2 gamma)
    pub fn gm1d2g(&self) -> f64 {
        0.5 * self.gm1() / self.gamma
    }

    /// (gamma + 1) / (2 gamma)
    pub fn gp1d2g(&self) -> f64 {
        0.5 * self.gp1() / self.gamma
    }

    /// 2 / (gamma + 1)
    pub fn tdgp1(&self) -> f64 {
        2.0 / self.gp1()
    }

    /// 2 / (gamma - 1)
    pub fn tdgm1(&self) -> f64 {
        2.0 / self.gm1()
    }

    /// (gamma - 1) / (gamma + 1)
    pub fn gm1dgp1(&self) -> f64 {
        self.gm1() / self.gp1()
    }

    pub fn internal_energy(&self, state: &PrimitiveState) -> f64 {
        state.p / (state.rho * self.gm1())
    }
}
