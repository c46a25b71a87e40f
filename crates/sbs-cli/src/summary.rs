//! Terminal tables for mappings, projections and statistics.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sbs_core::{StatusSummary, TransitionOutcome};
use sbs_ingest::MappingReport;
use sbs_model::{Field, RowId, RowStatus};

use crate::session::RowView;

/// Message shown instead of a table when no channel is enabled.
pub const NO_CHANNEL_MESSAGE: &str = "select at least one channel";

pub fn mapping_table(report: &MappingReport, columns: &[String]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Column"),
        header_cell("Effect"),
    ]);
    apply_table_style(&mut table);
    for field in Field::ALL {
        let column = report
            .fields
            .get(field)
            .and_then(|index| columns.get(index));
        let row = match column {
            Some(name) => vec![
                Cell::new(field.as_str()),
                Cell::new(name),
                dim_cell("-"),
            ],
            None => vec![
                Cell::new(field.as_str()),
                Cell::new("not found").fg(Color::Yellow),
                Cell::new(gap_effect(field)).fg(Color::Yellow),
            ],
        };
        table.add_row(row);
    }
    table
}

fn gap_effect(field: Field) -> &'static str {
    match field {
        Field::Contact => "contact dedup disabled",
        Field::Category => "category filter and tabs disabled",
        Field::Channel => "channel filter disabled",
        Field::Name | Field::Url => "excluded from search",
    }
}

/// Projection table: row id, board columns, then the display columns.
pub fn projection_table(headers: &[String], rows: &[RowView], limit: Option<usize>) -> Table {
    let mut table = Table::new();
    let mut header = vec![
        header_cell("Row"),
        header_cell("Status"),
        header_cell("Product"),
        header_cell("Channel"),
    ];
    header.extend(headers.iter().map(|name| header_cell(name)));
    table.set_header(header);
    apply_table_style(&mut table);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    for row in &rows[..shown] {
        let mut cells = vec![
            Cell::new(row.id),
            status_cell(row.status),
            optional_cell(row.product.as_deref()),
            optional_cell(row.channel.as_deref()),
        ];
        cells.extend(row.values.iter().map(Cell::new));
        table.add_row(cells);
    }
    if shown < rows.len() {
        let mut cells = vec![dim_cell("…"), dim_cell(format!("{} more", rows.len() - shown))];
        cells.extend((0..headers.len() + 2).map(|_| dim_cell("")));
        table.add_row(cells);
    }
    table
}

/// One-line status bar.
pub fn stats_line(summary: &StatusSummary) -> String {
    summary.to_string()
}

/// `row 3: Undecided -> Selected, completed 4, 9`
pub fn describe_outcome(row: RowId, outcome: Option<&TransitionOutcome>) -> String {
    let Some(outcome) = outcome else {
        return format!("row {row}: unchanged");
    };
    let mut line = format!("row {row}: {} -> {}", outcome.old, outcome.new);
    if !outcome.completed.is_empty() {
        let completed: Vec<String> = outcome.completed.iter().map(ToString::to_string).collect();
        line.push_str(&format!(", completed {}", completed.join(", ")));
    }
    if !outcome.released.is_empty() {
        let released: Vec<String> = outcome
            .released
            .iter()
            .map(|(row, status)| format!("{row} ({status})"))
            .collect();
        line.push_str(&format!(", released {}", released.join(", ")));
    }
    line
}

pub fn print_projection(headers: &[String], rows: &[RowView], limit: Option<usize>) {
    println!("{}", projection_table(headers, rows, limit));
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn status_cell(status: RowStatus) -> Cell {
    let cell = Cell::new(status.label());
    match status {
        RowStatus::Selected => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        RowStatus::Waiting => cell.fg(Color::Yellow),
        RowStatus::Excluded => cell.fg(Color::Red),
        RowStatus::Completed => cell.fg(Color::DarkGrey),
        RowStatus::Undecided => cell,
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
