use crate::error::SplitError;
use crate::gpx_parse;
use crate::models::{SplitConfig, SplitMode, Track, TrackPoint};
use crate::segment;
use crate::track::assemble;

#[derive(Debug, Default)]
pub struct SplitOutcome {
    pub tracks: Vec<Track>,
    pub warnings: Vec<String>,
}

/// Runs the whole pipeline on one uploaded document: parse, optionally
/// re-segment by time/distance gaps, then assemble the final tracks.
///
/// Both modes conserve points: the output tracks concatenated in order
/// reproduce the document's valid points exactly.
pub fn split_document(
    bytes: &[u8],
    mode: SplitMode,
    cfg: &SplitConfig,
) -> Result<SplitOutcome, SplitError> {
    // Threshold errors surface before any parsing work happens.
    if mode == SplitMode::ByTimeDistance {
        cfg.validate()?;
    }

    let parsed = gpx_parse::parse(bytes)?;
    let mut warnings = parsed.warnings;

    let tracks = match mode {
        SplitMode::ByTags => parsed
            .tracks
            .into_iter()
            .enumerate()
            .map(|(i, raw)| assemble(raw.points, raw.name, i + 1))
            .collect::<Result<Vec<_>, _>>()?,
        SplitMode::ByTimeDistance => {
            let points: Vec<TrackPoint> = parsed
                .tracks
                .into_iter()
                .flat_map(|raw| raw.points)
                .collect();
            let segmentation = segment::segment(&points, cfg)?;
            warnings.extend(segmentation.warnings);
            segmentation
                .segments
                .into_iter()
                .enumerate()
                .map(|(i, points)| assemble(points, None, i + 1))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    tracing::info!(?mode, tracks = tracks.len(), "split GPX document");
    Ok(SplitOutcome { tracks, warnings })
}
