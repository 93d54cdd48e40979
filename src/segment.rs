use crate::distance::distance_m;
use crate::error::SplitError;
use crate::models::{SplitConfig, TrackPoint};

/// Segmenter output. Concatenating the segments in order reproduces the
/// input sequence exactly; no segment is empty.
#[derive(Debug, Default)]
pub struct Segmentation {
    pub segments: Vec<Vec<TrackPoint>>,
    pub warnings: Vec<String>,
}

/// Folds an ordered point sequence into contiguous segments, closing the
/// open segment whenever a consecutive pair trips [`splits_track`].
pub fn segment(points: &[TrackPoint], cfg: &SplitConfig) -> Result<Segmentation, SplitError> {
    cfg.validate()?;

    let mut out = Segmentation::default();
    let Some(&first) = points.first() else {
        return Ok(out);
    };

    let mut current = vec![first];
    let mut prev = first;
    for (i, &point) in points.iter().enumerate().skip(1) {
        let gap_s = match (prev.time, point.time) {
            (Some(earlier), Some(later)) => {
                let gap = (later - earlier).num_milliseconds() as f64 / 1000.0;
                if gap < 0.0 {
                    let message = format!(
                        "point {i}: timestamp precedes its predecessor by {:.1}s, gap treated as 0",
                        -gap
                    );
                    tracing::warn!("{message}");
                    out.warnings.push(message);
                    Some(0.0)
                } else {
                    Some(gap)
                }
            }
            _ => None,
        };
        let leap_m = distance_m(prev.coord, point.coord)?;

        if splits_track(gap_s, leap_m, cfg) {
            out.segments.push(std::mem::take(&mut current));
        }
        current.push(point);
        prev = point;
    }
    out.segments.push(current);

    Ok(out)
}

/// Split decision for one consecutive pair. A pair with an unknown time gap
/// never splits. A gap over the threshold splits only while the displacement
/// stays within `max_distance_m`: a gap paired with a large jump reads as
/// noise, not a stop, unless `split_on_jump` overrides that policy.
pub fn splits_track(gap_s: Option<f64>, leap_m: f64, cfg: &SplitConfig) -> bool {
    match gap_s {
        Some(gap) if gap > cfg.max_time_gap_s => {
            cfg.split_on_jump || leap_m <= cfg.max_distance_m
        }
        _ => false,
    }
}
