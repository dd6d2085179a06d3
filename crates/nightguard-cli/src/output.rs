//! Output formatting for nightguard (table, json, csv)

use clap::ValueEnum;
use colored::Colorize;
use nightguard_client::{ApiResponse, UnitSystem};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub units: UnitSystem,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, units: UnitSystem, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self {
            format,
            units,
            quiet,
        }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print data in the configured format
    pub fn print<T: Tabled + Serialize>(&self, data: &[T]) {
        match self.format {
            OutputFormat::Table => {
                if data.is_empty() {
                    if !self.quiet {
                        println!("No data");
                    }
                } else {
                    let table = Table::new(data).to_string();
                    println!("{}", table);
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(data).unwrap_or_else(|_| "[]".to_string())
                );
            }
            OutputFormat::Csv => {
                print_csv(data);
            }
        }
    }

    /// Print key-value pairs
    pub fn print_kv(&self, pairs: &[(&str, String)]) {
        match self.format {
            OutputFormat::Table => {
                for (key, value) in pairs {
                    println!("{}: {}", key.bold(), value);
                }
            }
            OutputFormat::Json => {
                let map: std::collections::BTreeMap<&str, &str> =
                    pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Csv => {
                let keys: Vec<&str> = pairs.iter().map(|(k, _)| *k).collect();
                println!("{}", keys.join(","));
                let values: Vec<String> = pairs.iter().map(|(_, v)| escape_csv(v)).collect();
                println!("{}", values.join(","));
            }
        }
    }

    /// Print the signals of a response payload
    pub fn print_signals(&self, response: &ApiResponse) {
        self.print(&signal_rows(response, self.units));
    }
}

/// Print data as CSV, columns in table order
fn print_csv<T: Tabled>(data: &[T]) {
    for line in csv_lines(data) {
        println!("{}", line);
    }
}

/// CSV header and rows, using the same columns and order as the table
fn csv_lines<T: Tabled>(data: &[T]) -> Vec<String> {
    if data.is_empty() {
        return Vec::new();
    }

    let header: Vec<String> = T::headers().iter().map(|h| escape_csv(h)).collect();
    let mut lines = vec![header.join(",")];
    for item in data {
        let values: Vec<String> = item.fields().iter().map(|v| escape_csv(v)).collect();
        lines.push(values.join(","));
    }
    lines
}

/// Escape a value for CSV output
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Format a JSON value for display
pub fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "-".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        serde_json::Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten a payload into display rows in the requested unit system
pub fn signal_rows(response: &ApiResponse, units: UnitSystem) -> Vec<SignalRow> {
    response
        .signals()
        .into_iter()
        .map(|signal| {
            let status = signal.status.converted(units);
            SignalRow {
                signal: signal.name,
                value: format_value(&status.value),
                unit: status.unit.unwrap_or_default(),
                timestamp: status
                    .timestamp
                    .map(|t| t.display())
                    .unwrap_or_default(),
            }
        })
        .collect()
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Vehicle display for vehicles command
#[derive(Debug, Tabled, Serialize)]
pub struct VehicleRow {
    #[tabled(rename = "VIN")]
    pub vin: String,
}

/// Signal display for resource reads
#[derive(Debug, Tabled, Serialize)]
pub struct SignalRow {
    #[tabled(rename = "Signal")]
    pub signal: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Timestamp")]
    pub timestamp: String,
}
