use std::fmt::Display;

/// Formats a row-major grid compactly, for debugging.
///
/// With `with_axes`, a header row with the 1-based column numbers is added
/// and every row is prefixed by its number. All cells are left-aligned and
/// padded to the widest value.
///
/// Returns `None` if `values` is not a rectangle of the given width.
pub fn format_grid<T: Display>(values: &[T], width: usize, with_axes: bool) -> Option<String> {
    if width == 0 || values.len() % width != 0 {
        return None;
    }
    let mut cells: Vec<String> = Vec::with_capacity(values.len() + width);
    if with_axes {
        cells.extend((1..=width).map(|col| col.to_string()));
    }
    cells.extend(values.iter().map(|value| value.to_string()));
    let cell_width = cells.iter().map(|cell| cell.chars().count()).max().unwrap_or(0);

    let rows: Vec<String> = cells
        .chunks(width)
        .enumerate()
        .map(|(i, row)| {
            let label = with_axes.then(|| if i > 0 { i.to_string() } else { String::from(" ") });
            label
                .iter()
                .chain(row)
                .map(|cell| format!("{:<cell_width$}", cell))
                .collect::<Vec<String>>()
                .join(" ")
        })
        .collect();
    Some(rows.join("\n"))
}
