//! Markdown rendering of a document for `--print`.

use sheetcalc_core::Document;
use sheetcalc_engine::chart::{ChartData, ChartKind, ChartSpec, parse_chart_spec};
use sheetcalc_engine::engine::{CellRef, parse_leading_number};
use std::io::Write;

const BAR_WIDTH: usize = 40;

/// Write the populated part of the grid as a markdown table, followed by a
/// section for every chart cell.
pub fn write_markdown<W: Write>(w: &mut W, doc: &Document) -> std::io::Result<()> {
    writeln!(w, "# {}", doc.name)?;
    writeln!(w)?;

    let Some((min, max)) = populated_bounds(doc) else {
        writeln!(w, "*Empty spreadsheet*")?;
        return Ok(());
    };

    write!(w, "|   |")?;
    for col in min.col..=max.col {
        write!(w, " {} |", CellRef::col_to_letters(col))?;
    }
    writeln!(w)?;
    write!(w, "|---|")?;
    for _ in min.col..=max.col {
        write!(w, "---|")?;
    }
    writeln!(w)?;

    let mut charts: Vec<(CellRef, ChartSpec)> = Vec::new();
    for row in min.row..=max.row {
        write!(w, "| {} |", row + 1)?;
        for col in min.col..=max.col {
            let cell_ref = CellRef::new(col, row);
            let display = doc.get_cell_display(&cell_ref);
            match parse_chart_spec(display) {
                Some(spec) => {
                    write!(w, " [{} chart] |", spec.kind.as_tag())?;
                    charts.push((cell_ref, spec));
                }
                None => write!(w, " {} |", escape_markdown(display))?,
            }
        }
        writeln!(w)?;
    }

    for (cell_ref, spec) in charts {
        writeln!(w)?;
        writeln!(w, "## {} chart of {} ({})", spec.kind.as_tag(), spec.range, cell_ref)?;
        writeln!(w)?;
        writeln!(w, "```")?;
        let data = ChartData::from_spec(&spec, |c| {
            parse_leading_number(doc.get_cell_display(c)).filter(|n| n.is_finite())
        });
        render_chart_ascii(w, &data)?;
        writeln!(w, "```")?;
    }
    Ok(())
}

fn populated_bounds(doc: &Document) -> Option<(CellRef, CellRef)> {
    let mut cells = doc.populated_cells().map(|(r, _)| *r);
    let first = cells.next()?;
    let (mut min, mut max) = (first, first);
    for c in cells {
        min = CellRef::new(min.col.min(c.col), min.row.min(c.row));
        max = CellRef::new(max.col.max(c.col), max.row.max(c.row));
    }
    Some((min, max))
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}

fn render_chart_ascii<W: Write>(w: &mut W, data: &ChartData) -> std::io::Result<()> {
    let peak = data
        .rows
        .iter()
        .flat_map(|r| r.values.iter().copied())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));

    match data.spec.kind {
        ChartKind::Bar | ChartKind::Line => {
            for row in &data.rows {
                for (series, value) in row.values.iter().enumerate() {
                    let len = if peak > 0.0 {
                        ((value.abs() / peak) * BAR_WIDTH as f64).round() as usize
                    } else {
                        0
                    };
                    // Lines plot a point at the value, bars fill up to it.
                    let plot = match data.spec.kind {
                        ChartKind::Bar => "#".repeat(len),
                        _ => format!("{}*", " ".repeat(len)),
                    };
                    let label = if data.series_count() > 1 {
                        format!("{} [{}]", row.label, series + 1)
                    } else {
                        row.label.clone()
                    };
                    writeln!(w, "{label:>12} | {plot} {value}")?;
                }
            }
        }
        ChartKind::Pie => {
            let total: f64 = data
                .rows
                .iter()
                .flat_map(|r| r.values.iter().copied())
                .filter(|v| *v > 0.0)
                .sum();
            for row in &data.rows {
                let value: f64 = row.values.iter().copied().filter(|v| *v > 0.0).sum();
                let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
                writeln!(w, "{:>12} | {share:5.1}%", row.label)?;
            }
        }
    }

    if data.skipped > 0 {
        writeln!(w, "Note: {} non-numeric cell(s) plotted as 0", data.skipped)?;
    }
    Ok(())
}
