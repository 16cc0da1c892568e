use std::ops::Index;

use crate::error::{Result, SodError};

pub trait Mesh {
    fn get_dx(&self) -> f64;

    fn get_cell(&self, i: usize) -> f64;

    fn get_length(&self) -> usize;

    fn grid_points(&self) -> &[f64];
}

/// Equally spaced nodes including both end points.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh1d {
    dx: f64,
    num_points: usize,
    grid_points: Vec<f64>,
}

impl Mesh1d {
    pub fn linspace(x_start: f64, x_end: f64, num_points: usize) -> Result<Self> {
        if num_points < 2 {
            return Err(SodError::Config(format!(
                "a mesh needs at least 2 points, got {}",
                num_points
            )));
        }
        if !(x_end > x_start) {
            return Err(SodError::Config(format!(
                "mesh end {} must be greater than start {}",
                x_end, x_start
            )));
        }
        let dx = (x_end - x_start) / (num_points - 1) as f64;
        let grid_points: Vec<f64> = (0..num_points)
            .map(|i| {
                if i == num_points - 1 {
                    x_end
                } else {
                    x_start + i as f64 * dx
                }
            })
            .collect();
        Ok(Mesh1d {
            dx,
            num_points,
            grid_points,
        })
    }

    pub fn shifted(&self, shift: f64) -> Self {
        Mesh1d {
            dx: self.dx,
            num_points: self.num_points,
            grid_points: self.grid_points.iter().map(|&x| x + shift).collect(),
        }
    }
}

impl Mesh for Mesh1d {
    fn get_dx(&self) -> f64 {
        self.dx
    }

    fn get_cell(&self, i: usize) -> f64 {
        self.grid_points[i]
    }

    fn get_length(&self) -> usize {
        self.num_points
    }

    fn grid_points(&self) -> &[f64] {
        &self.grid_points
    }
}

impl Index<usize> for Mesh1d {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.grid_points[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linspace_includes_both_ends() {
        let mesh = Mesh1d::linspace(0.0, 1.0, 50).unwrap();
        assert_eq!(mesh.get_length(), 50);
        assert_eq!(mesh[0], 0.0);
        assert_eq!(mesh[49], 1.0);
        assert_abs_diff_eq!(mesh.get_dx(), 1.0 / 49.0, epsilon = 1e-15);
        assert_abs_diff_eq!(mesh.get_cell(7), 7.0 / 49.0, epsilon = 1e-15);
    }

    #[test]
    fn shifted_mesh_keeps_spacing() {
        let mesh = Mesh1d::linspace(0.0, 1.0, 11).unwrap();
        let shifted = mesh.shifted(-0.5);
        assert_eq!(shifted.get_length(), 11);
        assert_eq!(shifted.get_dx(), mesh.get_dx());
        for (a, b) in mesh.grid_points().iter().zip(shifted.grid_points()) {
            assert_abs_diff_eq!(a - 0.5, *b, epsilon = 1e-15);
        }
    }

    #[test]
    fn degenerate_meshes_are_rejected() {
        assert!(Mesh1d::linspace(0.0, 1.0, 1).is_err());
        assert!(Mesh1d::linspace(1.0, 1.0, 10).is_err());
    }
}
