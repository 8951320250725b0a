//! Plain-text tables for diff code blocks

use console::measure_text_width;

/// Column separator
const SEPARATOR: &str = "  ";

/// Render rows as left-aligned columns
///
/// Every column is padded to its widest cell, cells are joined with two
/// spaces and trailing whitespace is trimmed from each row.
///
/// ```
/// use bloat_ci::report::table::render_table;
///
/// let rows = vec![
///     vec!["- Size".to_string(), "1 MB".to_string(), String::new()],
///     vec!["+ Size".to_string(), "1.1 MB".to_string(), "+102.4 KB".to_string()],
/// ];
/// assert_eq!(render_table(&rows), "- Size  1 MB\n+ Size  1.1 MB  +102.4 KB");
/// ```
pub fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| measure_text_width(cell))
                .max()
                .unwrap_or(0)
        })
        .collect();

    rows.iter()
        .map(|row| {
            let mut line = String::new();
            for (col, cell) in row.iter().enumerate() {
                if col > 0 {
                    line.push_str(SEPARATOR);
                }
                line.push_str(cell);
                let pad = widths[col].saturating_sub(measure_text_width(cell));
                line.extend(std::iter::repeat(' ').take(pad));
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_columns_are_aligned_to_widest_cell() {
        let rows = vec![row(&["- serde", "10 KB"]), row(&["+ regex_syntax", "9 KB"])];
        assert_eq!(
            render_table(&rows),
            "- serde         10 KB\n+ regex_syntax  9 KB"
        );
    }

    #[test]
    fn test_empty_trailing_cells_are_trimmed() {
        let rows = vec![row(&["Size", "1 MB", ""]), row(&["Text size", "512 KB", ""])];
        assert_eq!(render_table(&rows), "Size       1 MB\nText size  512 KB");
    }

    #[test]
    fn test_no_rows_renders_empty_string() {
        assert_eq!(render_table(&[]), "");
    }

    #[test]
    fn test_ragged_rows() {
        let rows = vec![row(&["a"]), row(&["bbb", "c"])];
        assert_eq!(render_table(&rows), "a\nbbb  c");
    }
}
