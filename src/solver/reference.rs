//! Shock tube calculator: solves the shock-tube equation for the pressure
//! behind the shock and builds the five-region wave pattern inside a tube of
//! given geometry.
//!
//! Regions are numbered from the high pressure side: 1 undisturbed driver
//! gas, 2 rarefaction fan, 3 expanded driver gas, 4 shocked gas, 5
//! undisturbed driven gas. When the right state has the higher pressure the
//! problem is solved mirrored, and the reported regions still run left to
//! right along the tube, so the rarefaction becomes region 4.
//!
//! Both gases are assumed to be initially at rest; given velocities are only
//! carried through the undisturbed regions.

extern crate nalgebra as na;

use log::warn;

use crate::error::{Result, SodError};
use crate::fv_core::record::SolutionRecord;
use crate::fv_core::state::PrimitiveState;

const MAX_ITERATIONS: usize = 200;

/// `(p, rho, u)`
pub type StateTuple = (f64, f64, f64);

/// `(x_left, x_right, x_diaphragm)`
pub type Geometry = (f64, f64, f64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavePositions {
    pub head_of_rarefaction: f64,
    pub foot_of_rarefaction: f64,
    pub contact_discontinuity: f64,
    pub shock: f64,
}

impl WavePositions {
    pub fn describe(&self) -> [(&'static str, f64); 4] {
        [
            ("Head of Rarefaction", self.head_of_rarefaction),
            ("Foot of Rarefaction", self.foot_of_rarefaction),
            ("Contact Discontinuity", self.contact_discontinuity),
            ("Shock", self.shock),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Region {
    State(PrimitiveState),
    Rarefaction,
}

/// Regions 1 to 5 ordered left to right along the tube.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStates {
    pub regions: [Region; 5],
}

impl RegionStates {
    /// 1-based lookup, matching the region numbering.
    pub fn region(&self, number: usize) -> Option<&Region> {
        number.checked_sub(1).and_then(|i| self.regions.get(i))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceValues {
    pub x: na::DVector<f64>,
    pub p: na::DVector<f64>,
    pub rho: na::DVector<f64>,
    pub u: na::DVector<f64>,
    pub energy: na::DVector<f64>,
}

impl ReferenceValues {
    pub fn to_record(&self) -> Result<SolutionRecord> {
        SolutionRecord::new(
            self.x.clone(),
            self.rho.clone(),
            self.u.clone(),
            self.p.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceSolution {
    pub positions: WavePositions,
    pub regions: RegionStates,
    pub values: ReferenceValues,
}

struct Regions {
    driver: PrimitiveState,
    expanded: PrimitiveState,
    shocked: PrimitiveState,
    driven: PrimitiveState,
    shock_speed: f64,
}

fn sound_speed(gamma: f64, p: f64, rho: f64) -> f64 {
    (gamma * p / rho).sqrt()
}

fn shock_tube_function(
    p4: f64,
    driver: &PrimitiveState,
    driven: &PrimitiveState,
    gamma: f64,
) -> f64 {
    let z = p4 / driven.p - 1.0;
    let c1 = sound_speed(gamma, driver.p, driver.rho);
    let c5 = sound_speed(gamma, driven.p, driven.rho);
    let gm1 = gamma - 1.0;
    let gp1 = gamma + 1.0;
    let g2 = 2.0 * gamma;

    let base = 1.0 - gm1 / g2 * (c5 / c1) * z / (1.0 + gp1 / g2 * z).sqrt();
    let fact = if base > 0.0 { base.powf(g2 / gm1) } else { 0.0 };
    driver.p * fact - p4
}

/// Illinois variant of regula falsi on `[driven.p, driver.p]`, where the
/// shock tube function changes sign.
fn solve_post_shock_pressure(
    driver: &PrimitiveState,
    driven: &PrimitiveState,
    gamma: f64,
) -> Result<f64> {
    let f = |p: f64| shock_tube_function(p, driver, driven, gamma);

    let (mut a, mut b) = (driven.p, driver.p);
    let (mut fa, mut fb) = (f(a), f(b));
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }

    let mut side = 0i8;
    let mut c_prev = f64::NAN;
    for _ in 0..MAX_ITERATIONS {
        let c = (a * fb - b * fa) / (fb - fa);
        let fc = f(c);
        if fc == 0.0 || (c - c_prev).abs() <= 2.0 * f64::EPSILON * c.abs() {
            return Ok(c);
        }
        c_prev = c;
        if fc.signum() == fb.signum() {
            b = c;
            fb = fc;
            if side == 1 {
                fa *= 0.5;
            }
            side = 1;
        } else {
            a = c;
            fa = fc;
            if side == -1 {
                fb *= 0.5;
            }
            side = -1;
        }
        if (b - a).abs() <= 4.0 * f64::EPSILON * b.abs().max(a.abs()) {
            return Ok(0.5 * (a + b));
        }
    }
    Err(SodError::NoConvergence(MAX_ITERATIONS))
}

fn calculate_regions(
    driver: PrimitiveState,
    driven: PrimitiveState,
    gamma: f64,
) -> Result<Regions> {
    let p4 = if driver.p == driven.p {
        driven.p
    } else {
        solve_post_shock_pressure(&driver, &driven, gamma)?
    };

    let z = p4 / driven.p - 1.0;
    let c5 = sound_speed(gamma, driven.p, driven.rho);
    let gmfac1 = 0.5 * (gamma - 1.0) / gamma;
    let gmfac2 = 0.5 * (gamma + 1.0) / gamma;
    let fact = (1.0 + gmfac2 * z).sqrt();

    let u4 = c5 * z / (gamma * fact);
    let rho4 = driven.rho * (1.0 + gmfac2 * z) / (1.0 + gmfac1 * z);
    let shock_speed = c5 * fact;

    let rho3 = driver.rho * (p4 / driver.p).powf(1.0 / gamma);

    Ok(Regions {
        driver,
        expanded: PrimitiveState::new(rho3, u4, p4),
        shocked: PrimitiveState::new(rho4, u4, p4),
        driven,
        shock_speed,
    })
}

fn calc_positions(mirrored: bool, regions: &Regions, xi: f64, t: f64, gamma: f64) -> WavePositions {
    let c1 = sound_speed(gamma, regions.driver.p, regions.driver.rho);
    let c3 = sound_speed(gamma, regions.expanded.p, regions.expanded.rho);
    let u3 = regions.expanded.u;
    let sign = if mirrored { -1.0 } else { 1.0 };

    WavePositions {
        head_of_rarefaction: xi - sign * c1 * t,
        foot_of_rarefaction: xi + sign * (u3 - c3) * t,
        contact_discontinuity: xi + sign * u3 * t,
        shock: xi + sign * regions.shock_speed * t,
    }
}

fn region_states(mirrored: bool, regions: &Regions) -> RegionStates {
    let mirror = |s: PrimitiveState| PrimitiveState::new(s.rho, -s.u, s.p);
    if mirrored {
        RegionStates {
            regions: [
                Region::State(regions.driven),
                Region::State(mirror(regions.shocked)),
                Region::State(mirror(regions.expanded)),
                Region::Rarefaction,
                Region::State(regions.driver),
            ],
        }
    } else {
        RegionStates {
            regions: [
                Region::State(regions.driver),
                Region::Rarefaction,
                Region::State(regions.expanded),
                Region::State(regions.shocked),
                Region::State(regions.driven),
            ],
        }
    }
}

fn rarefaction_state(
    driver: &PrimitiveState,
    c1: f64,
    x: f64,
    xi: f64,
    t: f64,
    gamma: f64,
    mirrored: bool,
) -> PrimitiveState {
    let gm1 = gamma - 1.0;
    let (u, fact) = if mirrored {
        let u = -2.0 / (gamma + 1.0) * (c1 + (xi - x) / t);
        (u, 1.0 + 0.5 * gm1 * u / c1)
    } else {
        let u = 2.0 / (gamma + 1.0) * (c1 + (x - xi) / t);
        (u, 1.0 - 0.5 * gm1 * u / c1)
    };
    PrimitiveState::new(
        driver.rho * fact.powf(2.0 / gm1),
        u,
        driver.p * fact.powf(2.0 * gamma / gm1),
    )
}

fn create_arrays(
    mirrored: bool,
    geometry: Geometry,
    positions: &WavePositions,
    regions: &Regions,
    npts: usize,
    gamma: f64,
    t: f64,
) -> ReferenceValues {
    let (xl, xr, xi) = geometry;
    let WavePositions {
        head_of_rarefaction: xhd,
        foot_of_rarefaction: xft,
        contact_discontinuity: xcd,
        shock: xsh,
    } = *positions;
    let c1 = sound_speed(gamma, regions.driver.p, regions.driver.rho);
    let mirror = |s: PrimitiveState| PrimitiveState::new(s.rho, -s.u, s.p);

    let dx = (xr - xl) / (npts - 1) as f64;
    let x: Vec<f64> = (0..npts)
        .map(|i| if i == npts - 1 { xr } else { xl + i as f64 * dx })
        .collect();

    let states: Vec<PrimitiveState> = x
        .iter()
        .map(|&x| {
            if !mirrored {
                if x < xhd {
                    regions.driver
                } else if x < xft {
                    rarefaction_state(&regions.driver, c1, x, xi, t, gamma, false)
                } else if x < xcd {
                    regions.expanded
                } else if x < xsh {
                    regions.shocked
                } else {
                    regions.driven
                }
            } else if x < xsh {
                regions.driven
            } else if x < xcd {
                mirror(regions.shocked)
            } else if x < xft {
                mirror(regions.expanded)
            } else if x < xhd {
                rarefaction_state(&regions.driver, c1, x, xi, t, gamma, true)
            } else {
                regions.driver
            }
        })
        .collect();

    let n = states.len();
    ReferenceValues {
        x: na::DVector::from_vec(x),
        p: na::DVector::from_iterator(n, states.iter().map(|s| s.p)),
        rho: na::DVector::from_iterator(n, states.iter().map(|s| s.rho)),
        u: na::DVector::from_iterator(n, states.iter().map(|s| s.u)),
        energy: na::DVector::from_iterator(
            n,
            states.iter().map(|s| s.p / (s.rho * (gamma - 1.0))),
        ),
    }
}

pub fn solve(
    left_state: StateTuple,
    right_state: StateTuple,
    geometry: Geometry,
    t: f64,
    gamma: f64,
    npts: usize,
) -> Result<ReferenceSolution> {
    let (pl, rhol, ul) = left_state;
    let (pr, rhor, ur) = right_state;
    let (xl, xr, xi) = geometry;

    if xl >= xr {
        return Err(SodError::Config(format!(
            "tube left end {} has to be less than right end {}",
            xl, xr
        )));
    }
    if xi >= xr || xi <= xl {
        return Err(SodError::Config(format!(
            "diaphragm {} has to lie between {} and {}",
            xi, xl, xr
        )));
    }
    if npts < 2 {
        return Err(SodError::Config(format!("need at least 2 points, got {}", npts)));
    }
    if !(gamma > 1.0) {
        return Err(SodError::Config(format!("gamma must exceed 1, got {}", gamma)));
    }

    let left = PrimitiveState::new(rhol, ul, pl);
    let right = PrimitiveState::new(rhor, ur, pr);
    left.validate("left")?;
    right.validate("right")?;
    if ul != 0.0 || ur != 0.0 {
        warn!("shock tube calculator assumes gas at rest, got u_left = {ul}, u_right = {ur}");
    }

    let mirrored = pl < pr;
    let regions = if mirrored {
        calculate_regions(right, left, gamma)?
    } else {
        calculate_regions(left, right, gamma)?
    };

    let positions = calc_positions(mirrored, &regions, xi, t, gamma);
    let region_states = region_states(mirrored, &regions);
    let values = create_arrays(mirrored, geometry, &positions, &regions, npts, gamma, t);

    Ok(ReferenceSolution {
        positions,
        regions: region_states,
        values,
    })
}
