use ndarray::Array2;
use unicode_width::UnicodeWidthStr;

use std::fmt;

pub struct BorderStyle {
    horizontal: char,
    vertical: char,

    down_and_left: char,
    down_and_right: char,

    up_and_right: char,
    up_and_left: char,

    vertical_and_right: char,
    vertical_and_left: char,

    up_and_horizontal: char,
    down_and_horizontal: char,

    vertical_and_horizontal: char,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            horizontal: '─',
            vertical: '│',

            down_and_left: '┐',
            down_and_right: '┌',

            up_and_right: '└',
            up_and_left: '┘',

            vertical_and_right: '├',
            vertical_and_left: '┤',

            up_and_horizontal: '┴',
            down_and_horizontal: '┬',

            vertical_and_horizontal: '┼',
        }
    }
}

impl BorderStyle {
    /// Plain ASCII borders for terminals without box-drawing glyphs.
    pub fn ascii() -> Self {
        Self {
            horizontal: '-',
            vertical: '|',
            down_and_left: '+',
            down_and_right: '+',
            up_and_right: '+',
            up_and_left: '+',
            vertical_and_right: '+',
            vertical_and_left: '+',
            up_and_horizontal: '+',
            down_and_horizontal: '+',
            vertical_and_horizontal: '+',
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, Default)]
pub struct PrintTableCell {
    data: String,
    width: usize,
}

impl PrintTableCell {
    pub fn new<T: ToString>(data: T) -> Self {
        let data = data.to_string();
        let width = UnicodeWidthStr::width(data.as_str());
        Self { data, width }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn padded(&self, width: usize, align: Align) -> String {
        let fill = width.saturating_sub(self.width);
        let (left, right) = match align {
            Align::Left => (0, fill),
            Align::Right => (fill, 0),
            Align::Center => (fill / 2, fill - fill / 2),
        };
        format!("{}{}{}", " ".repeat(left), self.data, " ".repeat(right))
    }
}

/// A grid of cells drawn with box borders. Horizontal rules are drawn below the rows
/// registered with [`PrintTable::with_rule_after`].
pub struct PrintTable {
    cells: Array2<PrintTableCell>,
    align: Vec<Align>,
    rules: Vec<usize>,
    border: BorderStyle,
}

impl PrintTable {
    pub fn new(cells: Array2<PrintTableCell>) -> Self {
        let align = vec![Align::Right; cells.ncols()];
        Self {
            cells,
            align,
            rules: Vec::new(),
            border: BorderStyle::default(),
        }
    }

    /// Builds the grid from rows of text; short rows are padded with empty cells.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Self {
        let n_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        let cells = Array2::from_shape_fn((rows.len(), n_cols), |(i, j)| {
            rows[i].get(j).map(PrintTableCell::new).unwrap_or_default()
        });
        Self::new(cells)
    }

    pub fn with_rule_after(mut self, row: usize) -> Self {
        self.rules.push(row);
        self
    }

    pub fn with_alignment(mut self, col: usize, align: Align) -> Self {
        self.align[col] = align;
        self
    }

    pub fn with_border(mut self, border: BorderStyle) -> Self {
        self.border = border;
        self
    }

    pub fn col_widths(&self) -> Vec<usize> {
        self.cells
            .columns()
            .into_iter()
            .map(|col| col.iter().fold(0, |l, cell| std::cmp::max(l, cell.width())))
            .collect::<Vec<usize>>()
    }

    fn write_rule(
        &self,
        f: &mut fmt::Formatter,
        widths: &[usize],
        (left, middle, right): (char, char, char),
    ) -> fmt::Result {
        let segments: Vec<String> = widths
            .iter()
            .map(|w| self.border.horizontal.to_string().repeat(w + 2))
            .collect();
        writeln!(f, "{}{}{}", left, segments.join(&middle.to_string()), right)
    }
}

impl fmt::Display for PrintTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let widths = self.col_widths();
        let b = &self.border;
        self.write_rule(f, &widths, (b.down_and_right, b.down_and_horizontal, b.down_and_left))?;
        let n_rows = self.cells.nrows();
        for (i, row) in self.cells.rows().into_iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .zip(widths.iter().zip(&self.align))
                .map(|(cell, (w, align))| format!(" {} ", cell.padded(*w, *align)))
                .collect();
            let vertical = b.vertical.to_string();
            writeln!(f, "{}{}{}", vertical, cells.join(&vertical), vertical)?;
            if i + 1 < n_rows && self.rules.contains(&i) {
                self.write_rule(
                    f,
                    &widths,
                    (b.vertical_and_right, b.vertical_and_horizontal, b.vertical_and_left),
                )?;
            }
        }
        self.write_rule(f, &widths, (b.up_and_right, b.up_and_horizontal, b.up_and_left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> PrintTable {
        PrintTable::from_rows(vec![
            vec!["BV".to_string(), "B".to_string()],
            vec!["x".to_string(), "10".to_string()],
            vec!["s1".to_string()],
        ])
    }

    #[test]
    fn test_col_widths() {
        assert_eq!(grid().col_widths(), vec![2, 2]);
        let wide = PrintTable::from_rows(vec![vec!["≤".to_string(), "Zj-Cj".to_string()]]);
        assert_eq!(wide.col_widths(), vec![1, 5]);
    }

    #[test]
    fn test_render() {
        let table = grid().with_rule_after(0).with_alignment(0, Align::Left);
        let expected = "\
┌────┬────┐
│ BV │  B │
├────┼────┤
│ x  │ 10 │
│ s1 │    │
└────┴────┘
";
        assert_eq!(table.to_string(), expected);
    }

    #[test]
    fn test_ascii_border() {
        let table = PrintTable::from_rows(vec![vec!["a".to_string()]]).with_border(BorderStyle::ascii());
        assert_eq!(table.to_string(), "+---+\n| a |\n+---+\n");
    }
}
