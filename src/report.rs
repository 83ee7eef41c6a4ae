//! Rendering, writing and reading the sight-angle report.
//!
//! The text report has one `"<yards>: <degrees>"` line per distance in
//! ascending order. How unreachable distances appear is set by
//! [`NotFoundPolicy`].

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SightError};
use crate::sweep::AngleTable;

/// Text written in place of an angle for an unreachable distance.
pub const NOT_FOUND_TEXT: &str = "No suitable angle found";

/// How distances without a solution are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotFoundPolicy {
    /// Write `"<yards>: No suitable angle found"`.
    #[default]
    Explicit,
    /// Leave the distance out of the report.
    Omit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    pub format: ReportFormat,
    pub policy: NotFoundPolicy,
    /// Fixed number of decimals for angles; `None` prints the shortest
    /// representation that round-trips.
    pub decimals: Option<usize>,
}

/// One report entry, as serialized to JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub distance_yards: u32,
    pub angle_deg: Option<f64>,
}

fn rows(table: &AngleTable, policy: NotFoundPolicy) -> Vec<ReportRow> {
    table
        .iter()
        .map(|(&distance_yards, outcome)| ReportRow {
            distance_yards,
            angle_deg: outcome.angle(),
        })
        .filter(|row| row.angle_deg.is_some() || policy == NotFoundPolicy::Explicit)
        .collect()
}

fn format_angle(angle: f64, decimals: Option<usize>) -> String {
    match decimals {
        Some(places) => format!("{angle:.places$}"),
        None => format!("{angle}"),
    }
}

/// Render the table in the requested format.
pub fn render(table: &AngleTable, options: &ReportOptions) -> Result<String> {
    let rows = rows(table, options.policy);
    let mut out = String::new();

    match options.format {
        ReportFormat::Text => {
            for row in &rows {
                match row.angle_deg {
                    Some(angle) => out.push_str(&format!(
                        "{}: {}\n",
                        row.distance_yards,
                        format_angle(angle, options.decimals)
                    )),
                    None => out.push_str(&format!("{}: {NOT_FOUND_TEXT}\n", row.distance_yards)),
                }
            }
        }
        ReportFormat::Json => {
            out = serde_json::to_string_pretty(&rows)?;
            out.push('\n');
        }
        ReportFormat::Csv => {
            out.push_str("distance_yards,angle_deg\n");
            for row in &rows {
                let angle = row
                    .angle_deg
                    .map(|a| format_angle(a, options.decimals))
                    .unwrap_or_default();
                out.push_str(&format!("{},{}\n", row.distance_yards, angle));
            }
        }
    }

    Ok(out)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `contents` to `path` through a sibling temporary file and a rename,
/// so the destination is either the old file or the complete new one.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp = temp_path_for(path);
    let io_err = |source| SightError::Io {
        path: path.to_path_buf(),
        source,
    };

    let written = File::create(&temp).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()
    });

    if let Err(source) = written.and_then(|_| fs::rename(&temp, path)) {
        // Best effort; the temporary file may never have been created.
        let _ = fs::remove_file(&temp);
        return Err(io_err(source));
    }

    debug!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}

/// Render the table and write it to `path`, replacing any previous report.
pub fn write_report(path: &Path, table: &AngleTable, options: &ReportOptions) -> Result<()> {
    let contents = render(table, options)?;
    write_atomic(path, &contents)?;
    info!(path = %path.display(), entries = table.len(), "sight table saved");
    Ok(())
}

/// Parse a text report back into distance → angle.
///
/// Explicit not-found lines map to `None`. Blank lines are skipped.
pub fn parse_report(text: &str) -> Result<BTreeMap<u32, Option<f64>>> {
    let mut angles = BTreeMap::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || SightError::ReportParse {
            line: index + 1,
            content: raw.to_string(),
        };

        let (key, value) = line.split_once(':').ok_or_else(malformed)?;
        let distance: u32 = key.trim().parse().map_err(|_| malformed())?;
        let value = value.trim();

        let angle = if value == NOT_FOUND_TEXT {
            None
        } else {
            Some(value.parse::<f64>().map_err(|_| malformed())?)
        };
        angles.insert(distance, angle);
    }

    Ok(angles)
}

/// Read and parse a text report from disk.
pub fn read_report(path: &Path) -> Result<BTreeMap<u32, Option<f64>>> {
    let text = fs::read_to_string(path).map_err(|source| SightError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_report(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::AngleOutcome;

    fn sample_table() -> AngleTable {
        let mut table = AngleTable::new();
        table.insert(12, AngleOutcome::Found { angle_deg: 6.8, iterations: 9 });
        table.insert(10, AngleOutcome::Found { angle_deg: 5.2, iterations: 7 });
        table.insert(11, AngleOutcome::NotFound { iterations: 21 });
        table
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "arrow-sight-{}-{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_text_report_explicit_policy() {
        let text = render(&sample_table(), &ReportOptions::default()).unwrap();
        assert_eq!(text, "10: 5.2\n11: No suitable angle found\n12: 6.8\n");
    }

    #[test]
    fn test_text_report_omit_policy() {
        let options = ReportOptions {
            policy: NotFoundPolicy::Omit,
            ..Default::default()
        };
        let text = render(&sample_table(), &options).unwrap();
        assert_eq!(text, "10: 5.2\n12: 6.8\n");
    }

    #[test]
    fn test_fixed_decimals() {
        let options = ReportOptions {
            decimals: Some(3),
            ..Default::default()
        };
        let text = render(&sample_table(), &options).unwrap();
        assert!(text.starts_with("10: 5.200\n"));
    }

    #[test]
    fn test_json_report() {
        let options = ReportOptions {
            format: ReportFormat::Json,
            ..Default::default()
        };
        let json = render(&sample_table(), &options).unwrap();
        let rows: Vec<ReportRow> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], ReportRow { distance_yards: 10, angle_deg: Some(5.2) });
        assert_eq!(rows[1].angle_deg, None);
    }

    #[test]
    fn test_csv_report() {
        let options = ReportOptions {
            format: ReportFormat::Csv,
            policy: NotFoundPolicy::Explicit,
            decimals: None,
        };
        let csv = render(&sample_table(), &options).unwrap();
        assert_eq!(csv, "distance_yards,angle_deg\n10,5.2\n11,\n12,6.8\n");
    }

    #[test]
    fn test_parse_report() {
        let parsed = parse_report("10: 5.2\n\n11: No suitable angle found\n12: 6.8\n").unwrap();
        assert_eq!(parsed.get(&10), Some(&Some(5.2)));
        assert_eq!(parsed.get(&11), Some(&None));
        assert_eq!(parsed.get(&12), Some(&Some(6.8)));
    }

    #[test]
    fn test_parse_report_rejects_garbage() {
        match parse_report("10: 5.2\nnot a line\n") {
            Err(SightError::ReportParse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(parse_report("ten: 5.2").is_err());
        assert!(parse_report("10: five").is_err());
    }

    #[test]
    fn test_write_report_overwrites_and_cleans_up() {
        let dir = scratch_dir("write");
        let path = dir.join("angles.txt");
        fs::write(&path, "stale contents\n").unwrap();

        write_report(&path, &sample_table(), &ReportOptions::default()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "10: 5.2\n11: No suitable angle found\n12: 6.8\n");
        assert!(!temp_path_for(&path).exists());

        let parsed = read_report(&path).unwrap();
        assert_eq!(parsed.len(), 3);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let path = scratch_dir("missing").join("no-such-dir").join("angles.txt");
        let err = write_report(&path, &sample_table(), &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, SightError::Io { .. }));
        assert!(!path.exists());
    }
}
