//! Series output formatting shared by the commands

use std::io::Write;

use anyhow::Result;
use plotline_query::{OutputFormat, QueryResult};

/// Cap on table column width
const MAX_WIDTH: usize = 50;

/// Write a converted result in the requested format
pub fn write_result(out: &mut impl Write, result: &QueryResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(out, result),
        OutputFormat::Json => write_json(out, result),
        OutputFormat::Csv => write_csv(out, result),
    }
}

/// One line per point, grouped by series
fn write_table(out: &mut impl Write, result: &QueryResult) -> Result<()> {
    if result.iter().all(|s| s.is_empty()) {
        writeln!(out, "(empty result)")?;
        return Ok(());
    }

    let headers = ["series", "timestamp_ms", "value"];
    let rows: Vec<[String; 3]> = result
        .iter()
        .flat_map(|series| {
            series.points.iter().map(|p| {
                [
                    series.name.clone(),
                    format_number(p.timestamp_ms),
                    p.value.map(format_number).unwrap_or_else(|| "NULL".to_string()),
                ]
            })
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len()).min(MAX_WIDTH);
        }
    }

    let header: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:width$}", h, width = *w))
        .collect();
    writeln!(out, "{}", header.join(" | "))?;

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", sep.join("-+-"))?;

    for row in &rows {
        let values: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(s, w)| truncate(s, *w))
            .collect();
        writeln!(out, "{}", values.join(" | "))?;
    }

    Ok(())
}

fn write_json(out: &mut impl Write, result: &QueryResult) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, result)?;
    writeln!(out)?;
    Ok(())
}

/// `series,timestamp_ms,value` with an empty value for nulls
fn write_csv(out: &mut impl Write, result: &QueryResult) -> Result<()> {
    writeln!(out, "series,timestamp_ms,value")?;

    for series in result {
        let name = csv_escape(&series.name);
        for p in &series.points {
            let value = p.value.map(format_number).unwrap_or_default();
            writeln!(out, "{},{},{}", name, format_number(p.timestamp_ms), value)?;
        }
    }

    Ok(())
}

/// Print whole numbers without a trailing `.0`
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let cut: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        format!("{:width$}", s, width = width)
    }
}

/// Quote if contains comma, newline, or quote
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('\n') || s.contains('"') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
