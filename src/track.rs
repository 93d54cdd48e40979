use crate::distance::distance_m;
use crate::error::SplitError;
use crate::models::{Track, TrackPoint};

/// Builds a finalized [`Track`] from an ordered point sequence.
///
/// `id` is the track's 1-based position in the result set and seeds the
/// fallback name; place-name enrichment happens outside this crate.
pub fn assemble(
    points: Vec<TrackPoint>,
    suggested_name: Option<String>,
    id: usize,
) -> Result<Track, SplitError> {
    let (Some(&start), Some(&end)) = (points.first(), points.last()) else {
        return Err(SplitError::EmptyPointSet);
    };

    let mut total_m = 0.0;
    for pair in points.windows(2) {
        total_m += distance_m(pair[0].coord, pair[1].coord)?;
    }

    let name = suggested_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Track {id}"));

    Ok(Track {
        id,
        name,
        distance_m: total_m,
        duration_s: duration_s(&points),
        point_count: points.len(),
        start,
        end,
        points,
    })
}

/// Elapsed seconds between the first and last timestamped points, `None`
/// unless at least two points carry timestamps.
fn duration_s(points: &[TrackPoint]) -> Option<f64> {
    let mut stamped = points.iter().filter_map(|p| p.time);
    let first = stamped.next()?;
    let last = stamped.last()?;
    Some(((last - first).num_milliseconds() as f64 / 1000.0).max(0.0))
}
