use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SodError};
use crate::fv_core::state::{GasLaw, PrimitiveState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TubeConfig {
    pub x_left: f64,
    pub length: f64,
    /// Initial position of the diaphragm separating the two gas states.
    pub diaphragm_x: f64,
    /// The analytic solver works on a mesh translated by `-x_shift`.
    pub x_shift: f64,
}

impl TubeConfig {
    pub fn x_right(&self) -> f64 {
        self.x_left + self.length
    }
}

impl Default for TubeConfig {
    fn default() -> Self {
        TubeConfig {
            x_left: 0.0,
            length: 1.0,
            diaphragm_x: 0.5,
            x_shift: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub step: f64,
    pub total: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            step: 0.01,
            total: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Animation,
    Snapshot,
    None,
}

/// Container of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    /// png frames encoded by ffmpeg
    Mp4,
    Gif,
}

/// Shape of the analytic solver output before it is repacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticOutput {
    /// `(x, rho, u, p)` per mesh point
    Points,
    /// `(rho, u, p)` per mesh point
    Triples,
}

const OUTPUT_STEM: &str = "1d-sod-tube";

/// Upper bound on `total / step`.
pub const MAX_FRAMES: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub format: VideoFormat,
    pub deviation_panel: bool,
    /// Defaults to `1d-sod-tube` with the extension of the mode. An empty
    /// string opens an interactive gnuplot window (snapshot mode only).
    pub output: Option<String>,
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub width: u32,
    pub height: u32,
    pub snapshot_time: f64,
    /// Also echo the gnuplot commands of every frame to this file.
    pub script: Option<String>,
}

impl RenderConfig {
    pub fn output_path(&self) -> String {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let ext = match (self.mode, self.format) {
            (RenderMode::Snapshot, _) => "png",
            (_, VideoFormat::Mp4) => "mp4",
            (_, VideoFormat::Gif) => "gif",
        };
        format!("{}.{}", OUTPUT_STEM, ext)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            mode: RenderMode::Animation,
            format: VideoFormat::Mp4,
            deviation_panel: false,
            output: None,
            fps: 15,
            bitrate_kbps: 1800,
            width: 1600,
            height: 1000,
            snapshot_time: 0.2,
            script: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub print_tables: bool,
    pub csv_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SodConfig {
    pub tube: TubeConfig,
    pub left: PrimitiveState,
    pub right: PrimitiveState,
    pub gas: GasLaw,
    pub time: TimeConfig,
    pub mesh_points: usize,
    pub analytic_output: AnalyticOutput,
    pub deviation_threshold: f64,
    pub render: RenderConfig,
    pub report: ReportConfig,
}

impl Default for SodConfig {
    fn default() -> Self {
        SodConfig {
            tube: TubeConfig::default(),
            left: PrimitiveState {
                rho: 1.0,
                u: 0.0,
                p: 1.0,
            },
            right: PrimitiveState {
                rho: 0.125,
                u: 0.0,
                p: 0.1,
            },
            gas: GasLaw { gamma: 1.4 },
            time: TimeConfig::default(),
            mesh_points: 50,
            analytic_output: AnalyticOutput::Points,
            deviation_threshold: 1e-9,
            render: RenderConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl SodConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: SodConfig = serde_json::from_reader(reader)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let tube = &self.tube;
        if !(tube.length > 0.0) {
            return Err(SodError::Config(format!(
                "tube length must be positive, got {}",
                tube.length
            )));
        }
        if tube.diaphragm_x <= tube.x_left || tube.diaphragm_x >= tube.x_right() {
            return Err(SodError::Config(format!(
                "diaphragm at {} is outside the tube ({}, {})",
                tube.diaphragm_x,
                tube.x_left,
                tube.x_right()
            )));
        }
        self.left.validate("left")?;
        self.right.validate("right")?;
        self.gas.validate()?;
        if self.mesh_points < 2 {
            return Err(SodError::Config(format!(
                "at least 2 mesh points are required, got {}",
                self.mesh_points
            )));
        }
        if !(self.time.step > 0.0) || self.time.total < self.time.step {
            return Err(SodError::Config(format!(
                "time step {} and total elapse {} give no frames",
                self.time.step, self.time.total
            )));
        }
        let frames = self.time.total / self.time.step;
        if !frames.is_finite() || frames > MAX_FRAMES as f64 {
            return Err(SodError::Config(format!(
                "time step {} and total elapse {} give more than {} frames",
                self.time.step, self.time.total, MAX_FRAMES
            )));
        }
        let render = &self.render;
        if render.fps == 0 || render.bitrate_kbps == 0 {
            return Err(SodError::Config(
                "fps and bitrate must be positive".to_string(),
            ));
        }
        if render.width == 0 || render.height == 0 {
            return Err(SodError::Config(format!(
                "frame size {}x{} is empty",
                render.width, render.height
            )));
        }
        if !(render.snapshot_time >= 0.0) || !render.snapshot_time.is_finite() {
            return Err(SodError::Config(format!(
                "snapshot time must be non-negative, got {}",
                render.snapshot_time
            )));
        }
        if !(self.deviation_threshold >= 0.0) {
            return Err(SodError::Config(format!(
                "deviation threshold must be non-negative, got {}",
                self.deviation_threshold
            )));
        }
        Ok(())
    }

    pub fn frame_times(&self) -> Vec<f64> {
        let total_steps = (self.time.total / self.time.step) as usize;
        (0..total_steps)
            .map(|idx| self.time.step * idx as f64)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_classic_sod_setup() {
        let config = SodConfig::default();
        assert_eq!(config.tube.x_right(), 1.0);
        assert_eq!(config.left, PrimitiveState { rho: 1.0, u: 0.0, p: 1.0 });
        assert_eq!(config.right, PrimitiveState { rho: 0.125, u: 0.0, p: 0.1 });
        assert_eq!(config.gas.gamma, 1.4);
        assert_eq!(config.mesh_points, 50);
        assert_eq!(config.deviation_threshold, 1e-9);
        assert_eq!(config.render.output_path(), "1d-sod-tube.mp4");
        assert_eq!(config.render.bitrate_kbps, 1800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn output_extension_follows_the_mode() {
        let mut render = RenderConfig::default();
        render.format = VideoFormat::Gif;
        assert_eq!(render.output_path(), "1d-sod-tube.gif");
        render.mode = RenderMode::Snapshot;
        assert_eq!(render.output_path(), "1d-sod-tube.png");
        render.output = Some("shock.png".to_string());
        assert_eq!(render.output_path(), "shock.png");
    }

    #[test]
    fn oversized_time_grid_is_rejected() {
        let mut config = SodConfig::default();
        config.time.step = 1e-12;
        config.time.total = 1e6;
        assert!(matches!(config.validate(), Err(SodError::Config(_))));

        let mut config = SodConfig::default();
        config.time.total = 500.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_frame_size_is_rejected() {
        let mut config = SodConfig::default();
        config.render.width = 0;
        assert!(config.validate().is_err());

        let mut config = SodConfig::default();
        config.render.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn frame_times_follow_step_count() {
        let config = SodConfig::default();
        let times = config.frame_times();
        assert_eq!(times.len(), 200);
        assert_eq!(times[0], 0.0);
        assert!((times[199] - 1.99).abs() < 1e-12);
    }

    #[test]
    fn diaphragm_outside_tube_is_rejected() {
        let mut config = SodConfig::default();
        config.tube.diaphragm_x = 1.5;
        assert!(matches!(config.validate(), Err(SodError::Config(_))));
    }

    #[test]
    fn too_few_mesh_points_are_rejected() {
        let mut config = SodConfig::default();
        config.mesh_points = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"mesh_points": 100, "analytic_output": "triples", "render": {{"mode": "snapshot"}}, "time": {{"total": 0.5}}}}"#
        )
        .unwrap();

        let config = SodConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.mesh_points, 100);
        assert_eq!(config.render.mode, RenderMode::Snapshot);
        assert_eq!(config.render.output_path(), "1d-sod-tube.png");
        assert_eq!(config.analytic_output, AnalyticOutput::Triples);
        assert_eq!(config.render.fps, 15);
        assert_eq!(config.time.step, 0.01);
        assert_eq!(config.frame_times().len(), 50);
        assert_eq!(config.tube, TubeConfig::default());
    }
}
