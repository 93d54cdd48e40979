use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SplitError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// A single point of a track. Elevation is carried through untouched; it
/// plays no part in distance or split decisions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    #[serde(flatten)]
    pub coord: Coordinate,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub elevation: Option<f64>,
}

/// A `<trk>` element as it appeared in the uploaded document, points in
/// document order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTrack {
    pub name: Option<String>,
    pub points: Vec<TrackPoint>,
}

/// A finalized track with derived statistics. `duration_s` is `None` when
/// fewer than two points carry timestamps; callers must not conflate that
/// with a zero-length duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: usize,
    pub name: String,
    pub distance_m: f64,
    pub duration_s: Option<f64>,
    pub point_count: usize,
    pub start: TrackPoint,
    pub end: TrackPoint,
    pub points: Vec<TrackPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    ByTags,
    ByTimeDistance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_max_time_gap_s")]
    pub max_time_gap_s: f64,
    #[serde(default = "default_max_distance_m")]
    pub max_distance_m: f64,
    /// When `true`, a time gap splits even if the displacement exceeds
    /// `max_distance_m`. Off by default: a gap paired with a large jump is
    /// treated as measurement noise, not a stop.
    #[serde(default)]
    pub split_on_jump: bool,
}

impl SplitConfig {
    pub fn validate(&self) -> Result<(), SplitError> {
        if !(self.max_time_gap_s > 0.0) {
            return Err(SplitError::InvalidConfiguration(format!(
                "max_time_gap_s must be positive, got {}",
                self.max_time_gap_s
            )));
        }
        if !(self.max_distance_m >= 0.0) {
            return Err(SplitError::InvalidConfiguration(format!(
                "max_distance_m must be non-negative, got {}",
                self.max_distance_m
            )));
        }
        Ok(())
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_time_gap_s: default_max_time_gap_s(),
            max_distance_m: default_max_distance_m(),
            split_on_jump: false,
        }
    }
}

fn default_max_time_gap_s() -> f64 {
    3_600.0
}

// One nautical mile.
fn default_max_distance_m() -> f64 {
    1_852.0
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SplitRequest {
    pub gpx_base64: String,
    pub mode: SplitMode,
    #[serde(default)]
    pub config: SplitConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SplitResponse {
    pub tracks: Vec<TrackPayload>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackPayload {
    pub id: usize,
    pub name: String,
    pub distance_m: f64,
    pub duration_s: Option<f64>,
    pub point_count: usize,
    pub start: TrackPoint,
    pub end: TrackPoint,
    pub points: Vec<TrackPoint>,
    pub gpx_base64: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportRequest {
    pub name: String,
    pub points: Vec<TrackPoint>,
}
