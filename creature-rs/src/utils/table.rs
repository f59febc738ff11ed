//! Table formatting utilities

use glam::{Vec2, Vec3};
use prettytable::{Cell, Row, Table};

/// Create a table with headers
pub fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let header_cells: Vec<Cell> = headers
        .into_iter()
        .map(|h| Cell::new(h).style_spec("b"))
        .collect();
    table.set_titles(Row::new(header_cells));

    table
}

/// Add a row to a table
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    let row_cells: Vec<Cell> = cells.into_iter().map(|s| Cell::new(&s)).collect();
    table.add_row(Row::new(row_cells));
}

/// Format a 2D point as `(x, y)`
pub fn format_vec2(v: Vec2) -> String {
    format!("({:.3}, {:.3})", v.x, v.y)
}

/// Axis-aligned bounds of a point set, ignoring z
pub fn bounds(points: &[Vec3]) -> Option<(Vec2, Vec2)> {
    let first = points.first()?.truncate();
    Some(points.iter().fold((first, first), |(min, max), p| {
        let p = p.truncate();
        (min.min(p), max.max(p))
    }))
}
