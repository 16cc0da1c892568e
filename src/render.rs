//! gnuplot rendering of comparison frames.
//!
//! Each frame becomes one multiplot page: a row of target panels, a row of
//! base panels and optionally a row with the deviation of every field. Every
//! panel is placed on the page grid explicitly, so later pages keep the
//! layout of the first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;

use gnuplot::{AutoOption, AxesCommon, Caption, Coordinate, Figure, PointSize, PointSymbol};
use log::{debug, info};

use crate::compare::{progress_bar, Frame};
use crate::config::{SodConfig, VideoFormat};
use crate::error::{Result, SodError};
use crate::fv_core::record::{Field, SolutionRecord};

/// Panel order within a row.
const PANEL_FIELDS: [Field; 3] = [Field::P, Field::Rho, Field::U];

const FFMPEG: &str = "ffmpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLayout {
    Comparison,
    WithDeviation,
}

impl PanelLayout {
    pub fn rows(&self) -> u32 {
        match self {
            PanelLayout::Comparison => 2,
            PanelLayout::WithDeviation => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub layout: PanelLayout,
    pub format: VideoFormat,
    pub output: String,
    pub fps: u32,
    pub bitrate_kbps: u32,
    pub width: u32,
    pub height: u32,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl RenderSettings {
    pub fn from_config(config: &SodConfig) -> Self {
        RenderSettings {
            layout: if config.render.deviation_panel {
                PanelLayout::WithDeviation
            } else {
                PanelLayout::Comparison
            },
            format: config.render.format,
            output: config.render.output_path(),
            fps: config.render.fps,
            bitrate_kbps: config.render.bitrate_kbps,
            width: config.render.width,
            height: config.render.height,
            x_range: (config.tube.x_left, config.tube.x_right()),
            y_range: (0.0, 1.1),
        }
    }

    /// gif delay in hundredths of a second.
    pub fn frame_delay(&self) -> u32 {
        (100 / self.fps.max(1)).max(1)
    }

    fn png_terminal(&self) -> String {
        format!("pngcairo size {},{}", self.width, self.height)
    }
}

enum Series {
    Base,
    Target,
    Deviation,
}

impl Series {
    fn label(&self) -> &'static str {
        match self {
            Series::Base => "base",
            Series::Target => "target",
            Series::Deviation => "deviation",
        }
    }
}

fn draw_row(
    fig: &mut Figure,
    record: &SolutionRecord,
    series: Series,
    row: u32,
    time: f64,
    settings: &RenderSettings,
) {
    let symbol = match series {
        Series::Base => 'O',
        Series::Target => 'S',
        Series::Deviation => 'x',
    };
    let rows = settings.layout.rows();
    let cols = PANEL_FIELDS.len() as u32;

    for (col, field) in PANEL_FIELDS.iter().enumerate() {
        let title = format!("{} ({})", field.title(), series.label());
        let time_label = format!("Time: {:.2}", time);
        let ax = fig.axes2d();
        ax.set_pos_grid(rows, cols, row * cols + col as u32)
            .set_title(&title, &[])
            .set_x_range(
                AutoOption::Fix(settings.x_range.0),
                AutoOption::Fix(settings.x_range.1),
            )
            .label(&time_label, Coordinate::Graph(0.1), Coordinate::Graph(0.08), &[]);

        match series {
            Series::Deviation => {
                ax.set_y_range(AutoOption::Auto, AutoOption::Auto);
            }
            _ => {
                ax.set_y_range(
                    AutoOption::Fix(settings.y_range.0),
                    AutoOption::Fix(settings.y_range.1),
                );
            }
        }

        ax.points(
            record.x.iter(),
            record.get(*field).iter(),
            &[PointSymbol(symbol), PointSize(0.6), Caption(series.label())],
        );
    }
}

fn draw_page(fig: &mut Figure, frame: &Frame, settings: &RenderSettings) {
    draw_row(fig, &frame.target, Series::Target, 0, frame.time, settings);
    draw_row(fig, &frame.base, Series::Base, 1, frame.time, settings);
    if settings.layout == PanelLayout::WithDeviation {
        draw_row(fig, &frame.deviation, Series::Deviation, 2, frame.time, settings);
    }
}

/// Builds the figure with one page per frame.
pub fn build_figure(frames: &[Frame], settings: &RenderSettings) -> Figure {
    let mut fig = Figure::new();
    for (idx, frame) in frames.iter().enumerate() {
        if idx > 0 {
            fig.new_page();
        }
        draw_page(&mut fig, frame, settings);
    }
    fig
}

/// Runs gnuplot on the figure and waits until it exits.
fn launch(fig: &mut Figure) -> Result<()> {
    let mut gnuplot = fig
        .show()
        .map_err(|e| SodError::Render(format!("could not start gnuplot: {}", e)))?;
    let status = gnuplot.wait()?;
    if !status.success() {
        return Err(SodError::Render(format!("gnuplot exited with {}", status)));
    }
    Ok(())
}

fn write_png(frame: &Frame, settings: &RenderSettings, path: &Path) -> Result<()> {
    let mut fig = build_figure(std::slice::from_ref(frame), settings);
    fig.set_terminal(&settings.png_terminal(), &path.to_string_lossy());
    launch(&mut fig)
}

/// Arguments for encoding `frame_%05d.png` in `frame_dir` into the output.
fn ffmpeg_args(frame_dir: &Path, settings: &RenderSettings) -> Vec<String> {
    let pattern = frame_dir.join("frame_%05d.png");
    vec![
        "-y".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-framerate".to_string(),
        settings.fps.to_string(),
        "-i".to_string(),
        pattern.to_string_lossy().into_owned(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-b:v".to_string(),
        format!("{}k", settings.bitrate_kbps),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-vf".to_string(),
        "scale=trunc(iw/2)*2:trunc(ih/2)*2".to_string(),
        settings.output.clone(),
    ]
}

fn encode_mp4(frame_dir: &Path, settings: &RenderSettings) -> Result<()> {
    let args = ffmpeg_args(frame_dir, settings);
    debug!("{} {}", FFMPEG, args.join(" "));
    let output = Command::new(FFMPEG)
        .args(&args)
        .output()
        .map_err(|e| SodError::Render(format!("could not run {}: {}", FFMPEG, e)))?;
    if !output.status.success() {
        return Err(SodError::Render(format!(
            "{} exited with {}: {}",
            FFMPEG,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

fn render_mp4(frames: &[Frame], settings: &RenderSettings) -> Result<()> {
    let frame_dir = tempfile::tempdir()?;
    let pb = progress_bar(frames.len() as u64, false)?;
    for (idx, frame) in frames.iter().enumerate() {
        let path = frame_dir.path().join(format!("frame_{:05}.png", idx));
        write_png(frame, settings, &path)?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    encode_mp4(frame_dir.path(), settings)
}

fn render_gif(frames: &[Frame], settings: &RenderSettings) -> Result<()> {
    let mut fig = build_figure(frames, settings);
    let terminal = format!(
        "gif animate optimize delay {} size {},{}",
        settings.frame_delay(),
        settings.width,
        settings.height
    );
    fig.set_terminal(&terminal, &settings.output);
    launch(&mut fig)
}

/// Animation of all frames in the configured format.
pub fn render_animation(frames: &[Frame], settings: &RenderSettings) -> Result<()> {
    if frames.is_empty() {
        return Err(SodError::Render("no frames to animate".to_string()));
    }
    if settings.output.is_empty() {
        return Err(SodError::Render("animation needs an output file".to_string()));
    }
    match settings.format {
        VideoFormat::Mp4 => render_mp4(frames, settings)?,
        VideoFormat::Gif => render_gif(frames, settings)?,
    }
    info!("wrote {} frames to {}", frames.len(), settings.output);
    Ok(())
}

/// Single frame as png, or in a gnuplot window when the output is empty.
pub fn render_snapshot(frame: &Frame, settings: &RenderSettings) -> Result<()> {
    if settings.output.is_empty() {
        let mut fig = build_figure(std::slice::from_ref(frame), settings);
        return launch(&mut fig);
    }
    write_png(frame, settings, Path::new(&settings.output))?;
    info!("wrote snapshot at t = {:.2} to {}", frame.time, settings.output);
    Ok(())
}

/// Writes the gnuplot commands to `path` without running gnuplot.
pub fn write_script<P: AsRef<Path>>(
    frames: &[Frame],
    settings: &RenderSettings,
    path: P,
) -> Result<()> {
    let fig = build_figure(frames, settings);
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    fig.echo(&mut file);
    file.flush()?;
    info!("wrote gnuplot script to {}", path.as_ref().display());
    Ok(())
}
