//! Configuration module for the depth chart replay

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::chart::ChartFrame;
use crate::error::{DepthChartError, Result};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path of the JSON snapshot file to replay
    pub snapshot_path: String,

    /// Date onto which wide-row `Time` values are placed
    pub session_date: NaiveDate,

    /// Chart geometry handed to the rendering adapter
    pub chart_width: f64,
    pub chart_height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,

    /// Animation tick period in milliseconds
    pub frame_interval_ms: u64,

    /// Ticks spent animating from one snapshot to the next
    pub frames_per_step: u32,

    /// Bind to the nearest snapshot instead of interpolating
    pub snap_mode: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |key: &str| lookup(key).map(|raw| raw.trim().to_string());

        let config = Self {
            snapshot_path: parse("SNAPSHOT_PATH").unwrap_or(defaults.snapshot_path),
            session_date: parse_or("SESSION_DATE", parse("SESSION_DATE"), defaults.session_date)?,
            chart_width: parse_or("CHART_WIDTH", parse("CHART_WIDTH"), defaults.chart_width)?,
            chart_height: parse_or("CHART_HEIGHT", parse("CHART_HEIGHT"), defaults.chart_height)?,
            margin_left: parse_or("MARGIN_LEFT", parse("MARGIN_LEFT"), defaults.margin_left)?,
            margin_right: parse_or("MARGIN_RIGHT", parse("MARGIN_RIGHT"), defaults.margin_right)?,
            margin_top: parse_or("MARGIN_TOP", parse("MARGIN_TOP"), defaults.margin_top)?,
            margin_bottom: parse_or(
                "MARGIN_BOTTOM",
                parse("MARGIN_BOTTOM"),
                defaults.margin_bottom,
            )?,
            frame_interval_ms: parse_or(
                "FRAME_INTERVAL_MS",
                parse("FRAME_INTERVAL_MS"),
                defaults.frame_interval_ms,
            )?,
            frames_per_step: parse_or(
                "FRAMES_PER_STEP",
                parse("FRAMES_PER_STEP"),
                defaults.frames_per_step,
            )?,
            snap_mode: parse_or("SNAP_MODE", parse("SNAP_MODE"), defaults.snap_mode)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject geometry and timing values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chart_width - self.margin_left - self.margin_right <= 0.0 {
            return Err(DepthChartError::ConfigError(format!(
                "chart width {} leaves no drawing area after margins",
                self.chart_width
            )));
        }
        if self.chart_height - self.margin_top - self.margin_bottom <= 0.0 {
            return Err(DepthChartError::ConfigError(format!(
                "chart height {} leaves no drawing area after margins",
                self.chart_height
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(DepthChartError::ConfigError(
                "FRAME_INTERVAL_MS must be positive".to_string(),
            ));
        }
        if self.frames_per_step == 0 {
            return Err(DepthChartError::ConfigError(
                "FRAMES_PER_STEP must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Chart frame derived from the configured geometry
    pub fn chart_frame(&self) -> ChartFrame {
        ChartFrame {
            width: self.chart_width,
            height: self.chart_height,
            margin_left: self.margin_left,
            margin_right: self.margin_right,
            margin_top: self.margin_top,
            margin_bottom: self.margin_bottom,
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) if !value.is_empty() => value.parse().map_err(|e: T::Err| {
            DepthChartError::ConfigError(format!("{key}={value}: {e}"))
        }),
        _ => Ok(default),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: "snapshots.json".to_string(),
            session_date: Utc::now().date_naive(),
            chart_width: 1000.0,
            chart_height: 600.0,
            margin_left: 150.0,
            margin_right: 150.0,
            margin_top: 40.0,
            margin_bottom: 40.0,
            frame_interval_ms: 16,
            frames_per_step: 30,
            snap_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.snapshot_path, "snapshots.json");
        assert_eq!(config.chart_width, 1000.0);
        assert_eq!(config.frames_per_step, 30);
        assert!(!config.snap_mode);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("SNAPSHOT_PATH", "/data/book.json"),
            ("SESSION_DATE", "2024-03-01"),
            ("CHART_WIDTH", "1200"),
            ("SNAP_MODE", "true"),
        ]))
        .unwrap();
        assert_eq!(config.snapshot_path, "/data/book.json");
        assert_eq!(
            config.session_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(config.chart_width, 1200.0);
        assert!(config.snap_mode);
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let err = Config::from_lookup(lookup(&[("FRAME_INTERVAL_MS", "soon")])).unwrap_err();
        assert!(matches!(err, DepthChartError::ConfigError(_)));
    }

    #[test]
    fn test_margins_must_leave_area() {
        let err = Config::from_lookup(lookup(&[("CHART_WIDTH", "200")])).unwrap_err();
        assert!(matches!(err, DepthChartError::ConfigError(_)));
    }
}
