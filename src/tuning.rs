use std::path::{Path, PathBuf};
use thiserror::Error;

/// Engine knobs that are not worth a CLI flag each. Loaded from a `key=value` file.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineTuning {
    /// Hard ceiling on a run's lifetime, in seconds.
    pub max_run_secs: f32,
    pub scatter_char_limit: usize,
    pub popout_char_limit: usize,
    pub orbit_char_limit: usize,
    pub scroll_lines: usize,
    pub accelerate_lines: usize,
    pub popout_stagger_secs: f32,
    pub orbit_stagger_secs: f32,
    pub accelerate_stagger_secs: f32,
    pub trigger_queue_capacity: usize,
}

impl Default for EngineTuning {
    fn default() -> Self {
        Self {
            max_run_secs: 8.0,
            scatter_char_limit: 2000,
            popout_char_limit: 50,
            orbit_char_limit: 100,
            scroll_lines: 100,
            accelerate_lines: 5,
            popout_stagger_secs: 0.05,
            orbit_stagger_secs: 0.02,
            accelerate_stagger_secs: 0.25,
            trigger_queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuningError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl EngineTuning {
    /// Missing path or missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, TuningError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(TuningError::Io(err.to_string())),
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, TuningError> {
        let mut tuning = Self::default();
        let mut seen: Vec<&str> = Vec::new();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(TuningError::Parse {
                    line: line_no,
                    message: "expected <key>=<value>".to_string(),
                });
            };
            let key = key_raw.trim();
            let value = value_raw.trim();
            if seen.contains(&key) {
                return Err(TuningError::Parse {
                    line: line_no,
                    message: format!("duplicate '{key}' field"),
                });
            }
            seen.push(key);

            match key {
                "max_run_secs" => tuning.max_run_secs = parse_secs(value, line_no, key)?,
                "scatter_char_limit" => tuning.scatter_char_limit = parse_count(value, line_no, key)?,
                "popout_char_limit" => tuning.popout_char_limit = parse_count(value, line_no, key)?,
                "orbit_char_limit" => tuning.orbit_char_limit = parse_count(value, line_no, key)?,
                "scroll_lines" => tuning.scroll_lines = parse_count(value, line_no, key)?,
                "accelerate_lines" => tuning.accelerate_lines = parse_count(value, line_no, key)?,
                "popout_stagger_secs" => tuning.popout_stagger_secs = parse_secs(value, line_no, key)?,
                "orbit_stagger_secs" => tuning.orbit_stagger_secs = parse_secs(value, line_no, key)?,
                "accelerate_stagger_secs" => {
                    tuning.accelerate_stagger_secs = parse_secs(value, line_no, key)?
                }
                "trigger_queue_capacity" => {
                    tuning.trigger_queue_capacity = parse_count(value, line_no, key)?
                }
                _ => {}
            }
        }
        Ok(tuning)
    }
}

pub fn tuning_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("code_splash").join("tuning.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("code_splash")
            .join("tuning.txt"),
    )
}

fn parse_secs(raw: &str, line: usize, key: &str) -> Result<f32, TuningError> {
    match raw.parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(TuningError::Parse {
            line,
            message: format!("{key} must be a non-negative number of seconds"),
        }),
    }
}

fn parse_count(raw: &str, line: usize, key: &str) -> Result<usize, TuningError> {
    match raw.parse::<usize>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(TuningError::Parse {
            line,
            message: format!("{key} must be a positive integer"),
        }),
    }
}
