use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use referral_model::{ANCHOR_TABLE, JOINED_TABLE, PipelineConfig};

use crate::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Input: {}", result.input_dir.display());
    println!("Output: {}", result.output_dir.display());
    println!("Reference time: {}", result.reference_time);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows in"),
        header_cell("Rows out"),
        header_cell("Duplicates"),
        header_cell("Valid"),
        header_cell("Invalid"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    for summary in &result.tables {
        table.add_row(vec![
            Cell::new(&summary.name).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(summary.rows_in),
            Cell::new(summary.rows_out),
            count_cell(summary.duplicates_dropped, Color::Yellow),
            dim_cell("-"),
            dim_cell("-"),
            path_cell(&summary.output, &result.output_dir),
        ]);
    }
    let main = &result.main_table;
    table.add_row(vec![
        Cell::new(JOINED_TABLE).fg(Color::Cyan).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(main.rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(main.valid, Color::Green),
        count_cell(main.invalid, Color::Red),
        path_cell(&main.output, &result.output_dir),
    ]);
    println!("{table}");

    if !result.ignored.is_empty() {
        eprintln!("Ignored files:");
        for path in &result.ignored {
            eprintln!("- {}", path.display());
        }
    }
}

/// One line of the `referral tables` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub table: String,
    pub datetime_columns: String,
    pub numeric_columns: String,
    pub unique_key: String,
    pub join: String,
}

/// Describe every configured table, in name order.
pub fn table_rows(config: &PipelineConfig) -> Vec<TableRow> {
    config
        .tables
        .iter()
        .map(|(name, schema)| {
            let numeric: Vec<String> = schema
                .numeric_columns
                .iter()
                .map(|(column, width)| format!("{column}:{width}"))
                .collect();
            let join = if name == ANCHOR_TABLE {
                "anchor".to_string()
            } else {
                config
                    .join_plan
                    .step_for(name)
                    .map_or_else(|| "-".to_string(), |step| format!("{} = {}", step.left_on, step.right_on))
            };
            TableRow {
                table: name.to_string(),
                datetime_columns: or_dash(schema.datetime_columns.join(", ")),
                numeric_columns: or_dash(numeric.join(", ")),
                unique_key: schema.unique_key.clone().unwrap_or_else(|| "-".to_string()),
                join,
            }
        })
        .collect()
}

pub fn print_tables(config: &PipelineConfig) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Datetime columns"),
        header_cell("Numeric columns"),
        header_cell("Unique key"),
        header_cell("Join"),
    ]);
    apply_table_style(&mut table);
    for row in table_rows(config) {
        table.add_row(vec![
            Cell::new(row.table).fg(Color::Blue).add_attribute(Attribute::Bold),
            Cell::new(row.datetime_columns),
            Cell::new(row.numeric_columns),
            Cell::new(row.unique_key),
            Cell::new(row.join),
        ]);
    }
    println!("{table}");
}

fn or_dash(value: String) -> String {
    if value.is_empty() { "-".to_string() } else { value }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn path_cell(path: &Path, base: &Path) -> Cell {
    let shown = path.strip_prefix(base).unwrap_or(path);
    Cell::new(shown.display())
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
