use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use rios_cli::pipeline::{FromRiosOutcome, ToRiosOutcome};
use rios_convert::{ConversionLog, LogLevel};

pub fn print_to_rios_summary(outcome: &ToRiosOutcome) {
    let response = &outcome.response;
    for path in &outcome.written {
        println!("Wrote: {}", path.display());
    }
    let stats = response.stats;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rows"),
        header_cell("Skipped"),
        header_cell("Fields"),
        header_cell("Pages"),
        header_cell("Questions"),
        header_cell("Calculations"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(stats.rows),
        count_cell(stats.skipped, Color::Yellow),
        Cell::new(stats.fields),
        Cell::new(stats.pages),
        Cell::new(stats.questions),
        Cell::new(stats.calculations),
    ]);
    println!("{table}");
    print_log_table(&response.logs);
    if let Some(failure) = &response.failure {
        eprintln!("error: {failure}");
    }
}

pub fn print_from_rios_summary(outcome: &FromRiosOutcome) {
    let response = &outcome.response;
    if let Some(path) = &outcome.outfile {
        println!("Wrote: {}", path.display());
        println!("REDCap rows: {}", response.rows.len().saturating_sub(1));
    }
    print_log_table(&response.logs);
    if let Some(failure) = &response.failure {
        eprintln!("error: {failure}");
    }
}

/// Warnings and errors only; info entries are already in the trace output.
fn print_log_table(log: &ConversionLog) {
    let entries: Vec<_> = log
        .entries()
        .iter()
        .filter(|entry| entry.level != LogLevel::Info)
        .collect();
    if entries.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Level"), header_cell("Message")]);
    apply_log_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for entry in entries {
        table.add_row(vec![level_cell(entry.level), Cell::new(&entry.message)]);
    }
    println!();
    println!("Messages:");
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_log_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(9)),
        ColumnConstraint::UpperBoundary(Width::Percentage(90)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn level_cell(level: LogLevel) -> Cell {
    match level {
        LogLevel::Error => Cell::new(level.as_str())
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        LogLevel::Warning => Cell::new(level.as_str()).fg(Color::Yellow),
        LogLevel::Info => dim_cell(level.as_str()),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
