use std::path::Path;

use csv::Writer;
use prettytable::{row, Table};
use serde::Serialize;

use crate::compare::Frame;
use crate::error::Result;
use crate::fv_core::record::{Field, SolutionRecord};

#[derive(Serialize)]
struct FrameRow {
    x: f64,
    rho_base: f64,
    u_base: f64,
    p_base: f64,
    rho_target: f64,
    u_target: f64,
    p_target: f64,
    d_rho: f64,
    d_u: f64,
    d_p: f64,
}

#[derive(Serialize)]
struct SummaryRow {
    time: f64,
    max_d_rho: f64,
    max_d_u: f64,
    max_d_p: f64,
    l1_d_rho: f64,
    l1_d_u: f64,
    l1_d_p: f64,
    exceeded: usize,
}

pub fn format_record_table(record: &SolutionRecord) -> Table {
    let mut table = Table::new();
    table.add_row(row!["x", "rho", "u", "p"]);
    for i in 0..record.len() {
        table.add_row(row![
            format!("{:.6}", record.x[i]),
            format!("{:.6}", record.rho[i]),
            format!("{:.6}", record.u[i]),
            format!("{:.6}", record.p[i])
        ]);
    }
    table
}

pub fn print_record_table(title: &str, record: &SolutionRecord) {
    println!("____________________{}____________________", title);
    format_record_table(record).printstd();
}

pub fn format_deviation_summary(frames: &[Frame]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["t", "max |d rho|", "max |d u|", "max |d p|", "exceeded"]);
    for frame in frames {
        let report = &frame.report;
        table.add_row(row![
            format!("{:.2}", frame.time),
            format!("{:.3e}", report.max_abs_of(Field::Rho)),
            format!("{:.3e}", report.max_abs_of(Field::U)),
            format!("{:.3e}", report.max_abs_of(Field::P)),
            report.exceeded.len()
        ]);
    }
    table
}

pub fn print_deviation_summary(frames: &[Frame]) {
    println!("____________________DEVIATION____________________");
    format_deviation_summary(frames).printstd();
}

pub fn write_frame_csv<P: AsRef<Path>>(path: P, frame: &Frame) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    let (base, target, dev) = (&frame.base, &frame.target, &frame.deviation);

    for i in 0..base.len() {
        let row = FrameRow {
            x: base.x[i],
            rho_base: base.rho[i],
            u_base: base.u[i],
            p_base: base.p[i],
            rho_target: target.rho[i],
            u_target: target.u[i],
            p_target: target.p[i],
            d_rho: dev.rho[i],
            d_u: dev.u[i],
            d_p: dev.p[i],
        };
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary_csv<P: AsRef<Path>>(path: P, frames: &[Frame]) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for frame in frames {
        let report = &frame.report;
        let row = SummaryRow {
            time: frame.time,
            max_d_rho: report.max_abs[0],
            max_d_u: report.max_abs[1],
            max_d_p: report.max_abs[2],
            l1_d_rho: report.l1[0],
            l1_d_u: report.l1[1],
            l1_d_p: report.l1[2],
            exceeded: report.exceeded.len(),
        };
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compute_frame;
    use crate::config::SodConfig;
    use crate::solver::{AnalyticAdapter, ReferenceAdapter};

    fn frame_at(t: f64) -> Frame {
        compute_frame(&SodConfig::default(), &AnalyticAdapter, &ReferenceAdapter, t).unwrap()
    }

    #[test]
    fn record_table_has_header_and_one_row_per_point() {
        let frame = frame_at(0.1);
        let table = format_record_table(&frame.base);
        assert_eq!(table.len(), 51);
        let rendered = table.to_string();
        assert!(rendered.contains("rho"));
        assert!(rendered.contains("1.000000"));
    }

    #[test]
    fn frame_csv_has_all_columns() {
        let frame = frame_at(0.2);
        let file = tempfile::NamedTempFile::new().unwrap();
        write_frame_csv(file.path(), &frame).unwrap();

        let mut rdr = csv::Reader::from_path(file.path()).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.len(), 10);
        assert_eq!(&headers[0], "x");
        assert_eq!(&headers[9], "d_p");
        assert_eq!(rdr.records().count(), 50);
    }

    #[test]
    fn summary_csv_has_one_row_per_frame() {
        let frames = vec![frame_at(0.0), frame_at(0.1)];
        let file = tempfile::NamedTempFile::new().unwrap();
        write_summary_csv(file.path(), &frames).unwrap();

        let mut rdr = csv::Reader::from_path(file.path()).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "0.1");
        assert_eq!(&rows[1][7], "0");
        assert_eq!(format_deviation_summary(&frames).len(), 3);
    }
}
