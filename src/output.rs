// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes, plus the status table.

use crate::diagnostics::Warning;
use crate::operation::ClusterDisplay;
use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

const HEADERS: [&str; 7] = [
    "ID",
    "Role",
    "Host",
    "Ports",
    "Status",
    "Data Dir",
    "Deploy Dir",
];

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.emit_json("success", message, None),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    nodes: None,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print a list of node ids under a heading.
    pub fn nodes(&self, heading: &str, nodes: &[String]) {
        match self.mode {
            OutputMode::Json => self.emit_json("nodes", heading, Some(nodes)),
            OutputMode::Normal | OutputMode::Quiet => {
                if nodes.is_empty() {
                    return;
                }
                println!("{heading}");
                for node in nodes {
                    println!("  {node}");
                }
            }
        }
    }

    /// Print collected warnings (suppressed in quiet mode).
    pub fn warnings(&self, warnings: &[Warning]) {
        if self.mode != OutputMode::Normal || warnings.is_empty() {
            return;
        }
        eprintln!("Warnings:");
        for warning in warnings {
            eprintln!("  {}", warning.message);
        }
    }

    /// Print the cluster status table, or the whole display as JSON.
    pub fn display(&self, display: &ClusterDisplay) {
        if self.mode == OutputMode::Json {
            if let Ok(json) = serde_json::to_string(display) {
                println!("{json}");
            }
            return;
        }
        if self.mode == OutputMode::Normal {
            println!("Cluster name:    {}", display.name);
            println!("Cluster version: {}", display.version);
        }
        print!("{}", render_table(display));
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    fn emit_json(&self, event: &str, message: &str, nodes: Option<&[String]>) {
        let event = JsonEvent {
            event,
            message,
            nodes,
            duration_secs: self.duration(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            println!("{json}");
        }
    }
}

/// Render rows as left-aligned columns separated by two spaces.
pub fn render_table(display: &ClusterDisplay) -> String {
    let cells: Vec<[String; 7]> = display
        .rows
        .iter()
        .map(|row| {
            [
                row.id.clone(),
                row.role.clone(),
                row.host.clone(),
                row.ports.clone(),
                row.status.to_string(),
                row.data_dir.clone(),
                row.deploy_dir.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let headers = HEADERS.map(str::to_string);
    let separators = widths.map(|w| "-".repeat(w));
    for line in std::iter::once(&headers)
        .chain(std::iter::once(&separators))
        .chain(&cells)
    {
        let padded: Vec<String> = line
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::InstanceStatus;
    use crate::operation::DisplayRow;

    #[test]
    fn table_columns_are_aligned() {
        let display = ClusterDisplay {
            name: "prod".to_string(),
            version: "v4.0.0".to_string(),
            rows: vec![
                DisplayRow {
                    id: "10.0.1.1:2379".to_string(),
                    role: "pd".to_string(),
                    host: "10.0.1.1".to_string(),
                    ports: "2379/2380".to_string(),
                    status: InstanceStatus::Healthy,
                    data_dir: "/data/pd-2379".to_string(),
                    deploy_dir: "/deploy/pd-2379".to_string(),
                },
                DisplayRow {
                    id: "10.0.1.7:4000".to_string(),
                    role: "tidb".to_string(),
                    host: "10.0.1.7".to_string(),
                    ports: "4000/10080".to_string(),
                    status: InstanceStatus::Unresolved,
                    data_dir: "-".to_string(),
                    deploy_dir: "/deploy/tidb-4000".to_string(),
                },
            ],
        };

        let table = render_table(&display);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID             Role  Host"));
        assert!(lines[3].starts_with("10.0.1.7:4000  tidb  10.0.1.7"));
        let status_col = lines[0].find("Status").unwrap();
        assert_eq!(&lines[2][status_col..status_col + 7], "Healthy");
        assert_eq!(&lines[3][status_col..status_col + 1], "-");
    }
}
