use colored::{Color, Colorize};
use serde::Serialize;
use serde_json::Value;

/// How a column pulls its text out of a row.
pub enum Accessor<T> {
    /// Top-level field of the row's serialized form.
    Field(&'static str),
    /// Derived text computed from the row.
    Compute(Box<dyn Fn(&T) -> String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// One column of a terminal table.
pub struct Column<T> {
    header: String,
    accessor: Accessor<T>,
    align: Align,
    max_width: Option<usize>,
    tint: Option<fn(&T) -> Option<Color>>,
}

impl<T> Column<T> {
    pub fn field(header: &str, name: &'static str) -> Self {
        Self::with(header, Accessor::Field(name))
    }

    pub fn compute(header: &str, f: impl Fn(&T) -> String + 'static) -> Self {
        Self::with(header, Accessor::Compute(Box::new(f)))
    }

    fn with(header: &str, accessor: Accessor<T>) -> Self {
        Self {
            header: header.to_string(),
            accessor,
            align: Align::Left,
            max_width: None,
            tint: None,
        }
    }

    pub fn right(mut self) -> Self {
        self.align = Align::Right;
        self
    }

    /// Truncate cells longer than `width` characters.
    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Color a cell after padding, so alignment is unaffected.
    pub fn tint(mut self, f: fn(&T) -> Option<Color>) -> Self {
        self.tint = Some(f);
        self
    }
}

/// Text of a JSON value as shown in a cell: strings unquoted, null empty,
/// arrays joined with ", ".
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| cell_text(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn truncate(text: String, max: Option<usize>) -> String {
    match max {
        Some(max) if max > 0 && text.chars().count() > max => {
            let mut cut: String = text.chars().take(max - 1).collect();
            cut.push('…');
            cut
        }
        _ => text,
    }
}

/// Resolve every cell once. A row is serialized only if some column reads
/// a field from it.
fn resolve<T: Serialize>(columns: &[Column<T>], rows: &[T]) -> Vec<Vec<String>> {
    let needs_fields = columns
        .iter()
        .any(|c| matches!(c.accessor, Accessor::Field(_)));

    rows.iter()
        .map(|row| {
            let serialized = if needs_fields {
                serde_json::to_value(row).ok()
            } else {
                None
            };
            columns
                .iter()
                .map(|col| {
                    let text = match &col.accessor {
                        Accessor::Field(name) => {
                            cell_text(serialized.as_ref().and_then(|v| v.get(*name)))
                        }
                        Accessor::Compute(f) => f(row),
                    };
                    truncate(text.replace('\n', " "), col.max_width)
                })
                .collect()
        })
        .collect()
}

fn pad(text: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{text:<width$}"),
        Align::Right => format!("{text:>width$}"),
    }
}

/// Render the table as lines: header, rule, then one line per row.
pub fn render<T: Serialize>(columns: &[Column<T>], rows: &[T]) -> Vec<String> {
    let cells = resolve(columns, rows);

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| pad(&col.header, *w, col.align).bold().to_string())
        .collect();
    lines.push(format!("  {}", header.join("  ")).trim_end().to_string());

    let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    lines.push(format!("  {}", "─".repeat(rule_len)));

    for (row, texts) in rows.iter().zip(&cells) {
        let rendered: Vec<String> = columns
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((col, text), w)| {
                let padded = pad(text, *w, col.align);
                match col.tint.and_then(|f| f(row)) {
                    Some(color) => padded.color(color).to_string(),
                    None => padded,
                }
            })
            .collect();
        lines.push(format!("  {}", rendered.join("  ")).trim_end().to_string());
    }
    lines
}

/// Print a table to stdout.
pub fn print<T: Serialize>(columns: &[Column<T>], rows: &[T]) {
    for line in render(columns, rows) {
        println!("{line}");
    }
}
