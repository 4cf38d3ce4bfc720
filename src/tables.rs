//! In-memory tables rendered with `tabled`.
//!
//! Rows are added in display order. Separators and auto-merged columns are
//! resolved before handing the cells to tabled, so the renderer only sees
//! plain text.

use tabled::{builder::Builder, settings::Style};

use crate::{error::CliError, format::OutputFormat, print::Printer};

#[derive(Debug, Clone, PartialEq)]
enum Row {
    Cells(Vec<String>),
    Separator,
}

/// A table with a header, rows and optional separators.
#[derive(Debug, Clone, Default)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
    auto_merge: Vec<usize>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_header<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = columns.into_iter().map(Into::into).collect();
    }

    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(Row::Cells(cells.into_iter().map(Into::into).collect()));
    }

    /// Add a horizontal rule between two groups of rows.
    pub fn add_separator(&mut self) {
        self.rows.push(Row::Separator);
    }

    /// Blank out a cell when it repeats the cell right above it.
    ///
    /// Merging restarts after every separator.
    pub fn enable_auto_merge_on_columns(&mut self, columns: &[usize]) {
        self.auto_merge = columns.to_vec();
    }

    fn column_count(&self) -> usize {
        self.rows
            .iter()
            .filter_map(|row| match row {
                Row::Cells(cells) => Some(cells.len()),
                Row::Separator => None,
            })
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    fn cells(&self) -> Vec<Vec<String>> {
        let columns = self.column_count();
        let mut merged = Vec::with_capacity(self.rows.len());
        let mut previous: Option<&Vec<String>> = None;
        for row in &self.rows {
            match row {
                Row::Cells(cells) => {
                    let mut out: Vec<String> = (0..columns)
                        .map(|i| cells.get(i).cloned().unwrap_or_default())
                        .collect();
                    if let Some(above) = previous {
                        for &column in &self.auto_merge {
                            if column < columns && above.get(column) == cells.get(column) {
                                out[column].clear();
                            }
                        }
                    }
                    previous = Some(cells);
                    merged.push(out);
                }
                Row::Separator => {
                    previous = None;
                    merged.push(Vec::new());
                }
            }
        }

        let widths: Vec<usize> = (0..columns)
            .map(|i| {
                merged
                    .iter()
                    .filter_map(|row| row.get(i))
                    .chain(self.header.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        merged
            .into_iter()
            .map(|row| {
                if row.is_empty() {
                    widths.iter().map(|w| "-".repeat(*w)).collect()
                } else {
                    row
                }
            })
            .collect()
    }

    /// Render the table in the style of the given output format.
    pub fn render(&self, output_format: OutputFormat) -> String {
        let mut builder = Builder::default();
        if !self.header.is_empty() {
            builder.push_record(self.header.clone());
        }
        for row in self.cells() {
            builder.push_record(row);
        }
        let mut table = builder.build();
        match output_format {
            OutputFormat::Pretty => table.with(Style::modern()),
            _ => table.with(Style::blank()),
        };
        let mut rendered = table.to_string();
        rendered.push('\n');
        rendered
    }

    /// Write the rendered table to stdout.
    pub fn display(&self, p: &mut Printer) -> Result<(), CliError> {
        let rendered = self.render(p.output_format());
        p.outputf(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::testing::printer;

    fn lines(rendered: &str) -> Vec<String> {
        rendered.lines().map(|l| l.trim_end().to_string()).collect()
    }

    #[test]
    fn renders_header_and_rows_in_order() {
        let mut table = Table::new();
        table.set_header(["ID", "NAME"]);
        table.add_row(["z1", "first"]);
        table.add_row(["z2", "second"]);
        let rendered = table.render(OutputFormat::None);
        let lines = lines(&rendered);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("ID") && lines[0].contains("NAME"));
        assert!(lines[1].contains("z1") && lines[1].contains("first"));
        assert!(lines[2].contains("z2") && lines[2].contains("second"));
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn auto_merge_blanks_repeated_cells_until_a_separator() {
        let mut table = Table::new();
        table.set_header(["OFFERING", "PLAN"]);
        table.enable_auto_merge_on_columns(&[0]);
        table.add_row(["redis", "small"]);
        table.add_row(["redis", "large"]);
        table.add_separator();
        table.add_row(["redis", "huge"]);
        let cells = table.cells();
        assert_eq!(cells[0], vec!["redis", "small"]);
        assert_eq!(cells[1], vec!["", "large"]);
        // Separators span the full column width, header included.
        assert_eq!(cells[2], vec!["--------", "-----"]);
        assert_eq!(cells[3], vec!["redis", "huge"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let mut table = Table::new();
        table.set_header(["A", "B", "C"]);
        table.add_row(["1"]);
        assert_eq!(table.cells()[0], vec!["1", "", ""]);
    }

    #[test]
    fn pretty_format_draws_borders() {
        let mut table = Table::new();
        table.set_header(["ID"]);
        table.add_row(["z1"]);
        let plain = table.render(OutputFormat::None);
        let pretty = table.render(OutputFormat::Pretty);
        assert!(!plain.contains('│'));
        assert!(pretty.contains('│'));
    }

    #[test]
    fn display_writes_to_stdout() {
        let (mut p, stdout, stderr) = printer("");
        let mut table = Table::new();
        table.set_header(["ID"]);
        table.add_row(["z1"]);
        table.display(&mut p).unwrap();
        assert!(stdout.contents().contains("z1"));
        assert_eq!(stderr.contents(), "");
    }
}
