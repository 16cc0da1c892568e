use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::config::{RenderMode, SodConfig};
use crate::deviation::{check_deviation, DeviationReport};
use crate::error::Result;
use crate::fv_core::record::{deviation, SolutionRecord};
use crate::render::{render_animation, render_snapshot, write_script, RenderSettings};
use crate::report::{
    print_deviation_summary, print_record_table, write_frame_csv, write_summary_csv,
};
use crate::solver::{AnalyticAdapter, ReferenceAdapter, ShockTubeSolver};

/// Both solutions and their deviation at one instant.
#[derive(Debug, Clone)]
pub struct Frame {
    pub time: f64,
    pub base: SolutionRecord,
    pub target: SolutionRecord,
    pub deviation: SolutionRecord,
    pub report: DeviationReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: usize,
    pub frames_exceeding: usize,
    pub worst_deviation: f64,
}

impl RunSummary {
    fn from_frames(frames: &[Frame]) -> Self {
        RunSummary {
            frames: frames.len(),
            frames_exceeding: frames.iter().filter(|f| !f.report.is_clean()).count(),
            worst_deviation: frames
                .iter()
                .map(|f| f.report.worst())
                .fold(0.0, f64::max),
        }
    }
}

pub fn compute_frame<B, T>(config: &SodConfig, base: &B, target: &T, t: f64) -> Result<Frame>
where
    B: ShockTubeSolver + ?Sized,
    T: ShockTubeSolver + ?Sized,
{
    let base_values = base.solve(config, t)?;
    let target_values = target.solve(config, t)?;
    let dev = deviation(&base_values, &target_values)?;
    let report = check_deviation(&dev, config.deviation_threshold, t);

    Ok(Frame {
        time: t,
        base: base_values,
        target: target_values,
        deviation: dev,
        report,
    })
}

pub(crate) fn progress_bar(len: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} frames (eta: {eta}) {msg}",
            )?
            .progress_chars("█░"),
    );
    Ok(pb)
}

pub fn run_frames<B, T>(
    config: &SodConfig,
    times: &[f64],
    base: &B,
    target: &T,
    quiet: bool,
) -> Result<Vec<Frame>>
where
    B: ShockTubeSolver + ?Sized,
    T: ShockTubeSolver + ?Sized,
{
    let pb = progress_bar(times.len() as u64, quiet)?;

    let mut frames = Vec::with_capacity(times.len());
    for &t in times {
        frames.push(compute_frame(config, base, target, t)?);
        pb.inc(1);
    }
    pb.finish_with_message("done");

    info!(
        "compared {} solver against {} solver over {} frames",
        target.name(),
        base.name(),
        frames.len()
    );
    Ok(frames)
}

fn export_csv(frames: &[Frame], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for (idx, frame) in frames.iter().enumerate() {
        write_frame_csv(dir.join(format!("frame_{:04}.csv", idx)), frame)?;
    }
    write_summary_csv(dir.join("summary.csv"), frames)?;
    info!("wrote {} frame tables to {}", frames.len(), dir.display());
    Ok(())
}

/// Snapshot mode only needs the frame at `render.snapshot_time`.
fn comparison_times(config: &SodConfig) -> Vec<f64> {
    match config.render.mode {
        RenderMode::Snapshot => vec![config.render.snapshot_time],
        RenderMode::Animation | RenderMode::None => config.frame_times(),
    }
}

pub fn run(config: &SodConfig) -> Result<RunSummary> {
    config.validate()?;
    info!(
        "Sod tube [{}, {}], diaphragm at {}, {} mesh points, gamma = {}",
        config.tube.x_left,
        config.tube.x_right(),
        config.tube.diaphragm_x,
        config.mesh_points,
        config.gas.gamma
    );

    let times = comparison_times(config);
    let frames = run_frames(config, &times, &AnalyticAdapter, &ReferenceAdapter, false)?;
    let summary = RunSummary::from_frames(&frames);

    let settings = RenderSettings::from_config(config);
    if let Some(path) = &config.render.script {
        write_script(&frames, &settings, path)?;
    }
    match config.render.mode {
        RenderMode::Animation => render_animation(&frames, &settings)?,
        RenderMode::Snapshot => match frames.first() {
            Some(frame) => render_snapshot(frame, &settings)?,
            None => warn!("no frame to render"),
        },
        RenderMode::None => {}
    }

    if config.report.print_tables {
        for frame in &frames {
            print_record_table(&format!("base, t = {:.2}", frame.time), &frame.base);
            print_record_table(&format!("target, t = {:.2}", frame.time), &frame.target);
        }
        print_deviation_summary(&frames);
    }

    if let Some(dir) = &config.report.csv_dir {
        export_csv(&frames, Path::new(dir))?;
    }

    if summary.frames_exceeding > 0 {
        warn!(
            "{} of {} frames deviate by more than {:e} (worst {:e})",
            summary.frames_exceeding,
            summary.frames,
            config.deviation_threshold,
            summary.worst_deviation
        );
    } else {
        info!(
            "all {} frames agree within {:e} (worst {:e})",
            summary.frames, config.deviation_threshold, summary.worst_deviation
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fv_core::record::Field;

    fn quick_config() -> SodConfig {
        let mut config = SodConfig::default();
        config.time.total = 0.2;
        config.time.step = 0.05;
        config.render.mode = RenderMode::None;
        config
    }

    #[test]
    fn frames_follow_the_time_grid() {
        let config = quick_config();
        let times = config.frame_times();
        let frames =
            run_frames(&config, &times, &AnalyticAdapter, &ReferenceAdapter, true).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].time, 0.0);
        assert!((frames[3].time - 0.15).abs() < 1e-12);
        for frame in &frames {
            assert_eq!(frame.base.len(), 50);
            assert_eq!(frame.deviation.len(), 50);
            assert!(frame.report.is_clean());
        }
    }

    #[test]
    fn identical_solvers_give_zero_deviation() {
        let config = quick_config();
        let frame = compute_frame(&config, &ReferenceAdapter, &ReferenceAdapter, 0.1).unwrap();
        for field in Field::SOLUTION {
            assert!(frame.deviation.get(field).iter().all(|&d| d == 0.0));
        }
        assert_eq!(frame.report.worst(), 0.0);
    }

    #[test]
    fn run_exports_csv_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = quick_config();
        config.report.csv_dir = Some(dir.path().to_string_lossy().into_owned());

        let summary = run(&config).unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.frames_exceeding, 0);
        assert!(summary.worst_deviation < 1e-9);
        assert!(dir.path().join("frame_0000.csv").exists());
        assert!(dir.path().join("frame_0003.csv").exists());
        assert!(dir.path().join("summary.csv").exists());
    }

    #[test]
    fn invalid_config_stops_the_run() {
        let mut config = quick_config();
        config.mesh_points = 0;
        assert!(run(&config).is_err());
    }

    #[test]
    fn snapshot_mode_compares_a_single_instant() {
        let mut config = quick_config();
        config.time.step = 0.001;
        config.render.mode = RenderMode::Snapshot;
        config.render.snapshot_time = 0.17;
        assert_eq!(comparison_times(&config), vec![0.17]);

        config.render.mode = RenderMode::None;
        assert_eq!(comparison_times(&config).len(), 200);
    }

    #[test]
    fn run_writes_the_gnuplot_script() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sod.gnuplot");
        let mut config = quick_config();
        config.render.script = Some(path.to_string_lossy().into_owned());

        run(&config).unwrap();
        let script = String::from_utf8_lossy(&std::fs::read(&path).unwrap()).into_owned();
        assert!(script.contains("Time: 0.15"));
    }
}
