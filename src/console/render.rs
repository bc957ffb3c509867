//! Output rendering for the console.
//!
//! This module provides the output format type and the formatting functions used
//! to print rows, single records and report results.

use crate::models::{QueryReport, RowData, Value};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Output format for row listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ASCII table format (like MySQL CLI)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Pretty-printed JSON array
    Json,
}

/// Sink for everything the console shows the operator.
pub trait Renderer {
    fn banner(&mut self, title: &str) -> io::Result<()>;
    fn menu(&mut self, entries: &[(&str, &str)]) -> io::Result<()>;
    fn tables(&mut self, tables: &[String]) -> io::Result<()>;
    fn rows(&mut self, rows: &[RowData]) -> io::Result<()>;
    fn row(&mut self, row: Option<&RowData>) -> io::Result<()>;
    fn error(&mut self, message: &str) -> io::Result<()>;
    fn success(&mut self, message: &str) -> io::Result<()>;
    fn message(&mut self, message: &str) -> io::Result<()>;
    fn query_result(&mut self, report: &QueryReport) -> io::Result<()>;
}

/// Renders to a terminal (or any writer) in the configured [`OutputFormat`].
pub struct TerminalRenderer<W> {
    out: W,
    format: OutputFormat,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self { out, format }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn format_rows(&self, rows: &[RowData]) -> String {
        match self.format {
            OutputFormat::Table => format_as_table(rows),
            OutputFormat::Markdown => format_as_markdown(rows),
            OutputFormat::Json => format_as_json(rows),
        }
    }
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(io::stdout(), format)
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn banner(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(title.width() + 6);
        writeln!(self.out, "{}\n   {}\n{}\n", rule, title, rule)
    }

    fn menu(&mut self, entries: &[(&str, &str)]) -> io::Result<()> {
        writeln!(self.out, "\nMenu:")?;
        for (key, label) in entries {
            writeln!(self.out, "{}. {}", key, label)?;
        }
        Ok(())
    }

    fn tables(&mut self, tables: &[String]) -> io::Result<()> {
        writeln!(self.out, "\nDatabase tables:")?;
        for table in tables {
            writeln!(self.out, " - {}", table)?;
        }
        Ok(())
    }

    fn rows(&mut self, rows: &[RowData]) -> io::Result<()> {
        if rows.is_empty() {
            return writeln!(self.out, "No records.");
        }
        let text = self.format_rows(rows);
        writeln!(self.out, "\n{}", text)
    }

    fn row(&mut self, row: Option<&RowData>) -> io::Result<()> {
        match row {
            Some(row) => {
                let text = self.format_rows(std::slice::from_ref(row));
                writeln!(self.out, "\nRecord:\n{}", text)
            }
            None => writeln!(self.out, "Record not found."),
        }
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "[ERROR] {}", message)
    }

    fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "[OK] {}", message)
    }

    fn message(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "[INFO] {}", message)
    }

    fn query_result(&mut self, report: &QueryReport) -> io::Result<()> {
        writeln!(self.out, "\n=== {} ===", report.title)?;
        self.rows(&report.rows)?;
        if let Some(ms) = report.execution_time_ms {
            writeln!(self.out, "\nExecution time: {:.2} ms", ms)?;
        }
        if !report.plan.is_empty() {
            writeln!(self.out, "\n--- Query plan ---\n{}", report.plan)?;
        }
        Ok(())
    }
}

pub fn format_value(value: &Value) -> String {
    value.to_string()
}

fn column_names(rows: &[RowData]) -> Vec<&str> {
    rows.first()
        .map(|row| row.columns().collect())
        .unwrap_or_default()
}

pub fn format_as_table(rows: &[RowData]) -> String {
    let columns = column_names(rows);
    if columns.is_empty() {
        return "Empty set".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.width()).collect();
    for row in rows {
        for (i, col) in columns.iter().enumerate() {
            if let Some(value) = row.get(col) {
                widths[i] = widths[i].max(format_value(value).width());
            }
        }
    }

    let mut output = String::new();
    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("| {} ", pad_center(col, *w)))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for row in rows {
        let row_str: String = columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| {
                let value = row.get(col).unwrap_or(&Value::Null);
                let formatted = format_value(value);
                if value.is_numeric() {
                    format!("| {} ", pad_left(&formatted, *w))
                } else {
                    format!("| {} ", pad_right(&formatted, *w))
                }
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&separator);

    let row_text = if rows.len() == 1 { "row" } else { "rows" };
    output.push_str(&format!("{} {} in set", rows.len(), row_text));

    output
}

pub fn format_as_markdown(rows: &[RowData]) -> String {
    let columns = column_names(rows);
    if columns.is_empty() {
        return "*Empty set*".to_string();
    }

    let mut output = String::new();

    let header: String = columns
        .iter()
        .map(|c| format!("| {} ", c))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);

    let sep: String = columns.iter().map(|_| "|---").collect::<String>() + "|\n";
    output.push_str(&sep);

    for row in rows {
        let row_str: String = columns
            .iter()
            .map(|col| {
                let value = row.get(col).unwrap_or(&Value::Null);
                format!("| {} ", format_value(value).replace('|', "\\|"))
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&row_str);
    }

    output.push_str(&format!("\n*{} rows*", rows.len()));

    output
}

pub fn format_as_json(rows: &[RowData]) -> String {
    serde_json::to_string_pretty(rows).unwrap_or_else(|e| format!("<unserializable rows: {}>", e))
}

// `format!` width specifiers count chars, not display columns.
fn pad_right(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(text.width())))
}

fn pad_left(text: &str, width: usize) -> String {
    format!("{}{}", " ".repeat(width.saturating_sub(text.width())), text)
}

fn pad_center(text: &str, width: usize) -> String {
    let total = width.saturating_sub(text.width());
    let left = total / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(total - left))
}
