use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, TrackSegment, Waypoint};
use time::OffsetDateTime;

use crate::error::SplitError;
use crate::models::TrackPoint;

/// Renders a single-track GPX 1.1 document containing exactly the given
/// points in order. Re-parsing the output reproduces the points.
pub fn render_gpx(name: &str, points: &[TrackPoint]) -> Result<Vec<u8>, SplitError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some("gpx-splitter".into()),
        ..Default::default()
    };
    let mut track = gpx::Track {
        name: Some(name.into()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    for waypoint in points.iter().map(to_waypoint) {
        segment.points.push(waypoint);
    }
    track.segments.push(segment);
    gpx.tracks.push(track);

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(buffer)
}

pub fn encode_gpx_base64(name: &str, points: &[TrackPoint]) -> Result<String, SplitError> {
    Ok(BASE64.encode(render_gpx(name, points)?))
}

fn to_waypoint(point: &TrackPoint) -> Waypoint {
    let mut waypoint = Waypoint::new(Point::new(point.coord.lon, point.coord.lat));
    waypoint.elevation = point.elevation;
    waypoint.time = point.time.and_then(to_gpx_time);
    waypoint
}

// gpx wraps time::OffsetDateTime; chrono timestamps cross over via unix nanos.
fn to_gpx_time(ts: chrono::DateTime<chrono::Utc>) -> Option<gpx::Time> {
    let nanos = ts.timestamp_nanos_opt()?;
    OffsetDateTime::from_unix_timestamp_nanos(nanos as i128)
        .ok()
        .map(Into::into)
}
