use chrono::{DateTime, NaiveDateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::SplitError;
use crate::models::{Coordinate, RawTrack, TrackPoint};

/// Parser output: one `RawTrack` per usable `<trk>` element, plus the
/// warnings collected while degrading bad points or timestamps.
#[derive(Debug, Default)]
pub struct ParsedDocument {
    pub tracks: Vec<RawTrack>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum TextField {
    TrackName,
    Elevation,
    Time,
}

/// Parses a GPX byte stream into raw tracks, in document order.
///
/// The parse is deliberately lenient at the point level: a `<trkpt>` with a
/// missing or unparseable lat/lon is skipped, and a malformed `<ele>` or
/// `<time>` degrades to an absent value, each with a recorded warning.
/// Structural problems (bad UTF-8, ill-formed markup, truncated documents)
/// fail the whole parse.
pub fn parse(bytes: &[u8]) -> Result<ParsedDocument, SplitError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SplitError::MalformedDocument(format!("not valid UTF-8: {e}")))?;

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut tracks: Vec<RawTrack> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let mut depth: i64 = 0;
    let mut saw_element = false;

    let mut trk_no: usize = 0;
    let mut trk_depth: i64 = 0;
    let mut in_trk = false;
    let mut track_name: Option<String> = None;
    let mut points: Vec<TrackPoint> = Vec::new();

    let mut pt_no: usize = 0;
    let mut in_trkpt = false;
    let mut cur_coord: Option<Coordinate> = None;
    let mut cur_time: Option<DateTime<Utc>> = None;
    let mut cur_ele: Option<f64> = None;

    let mut text_field: Option<TextField> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| SplitError::MalformedDocument(e.to_string()))?
        {
            Event::Start(e) => {
                saw_element = true;
                depth += 1;
                text_field = None;
                // Element names are matched by local name so prefixed
                // documents (gpx:trk) parse the same as unprefixed ones.
                match e.local_name().as_ref() {
                    b"trk" if !in_trk => {
                        in_trk = true;
                        trk_no += 1;
                        trk_depth = depth;
                        pt_no = 0;
                        track_name = None;
                        points = Vec::new();
                    }
                    b"trkpt" if in_trk && !in_trkpt => {
                        in_trkpt = true;
                        pt_no += 1;
                        cur_time = None;
                        cur_ele = None;
                        cur_coord = point_coord(&e);
                        if cur_coord.is_none() {
                            let message = format!(
                                "track {trk_no}: skipping point {pt_no} with missing or invalid lat/lon"
                            );
                            tracing::warn!("{message}");
                            warnings.push(message);
                        }
                    }
                    b"name" if in_trk && !in_trkpt && depth == trk_depth + 1 => {
                        text_field = Some(TextField::TrackName);
                    }
                    b"ele" if in_trkpt => text_field = Some(TextField::Elevation),
                    b"time" if in_trkpt => text_field = Some(TextField::Time),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                saw_element = true;
                if e.local_name().as_ref() == b"trkpt" && in_trk && !in_trkpt {
                    pt_no += 1;
                    match point_coord(&e) {
                        Some(coord) => points.push(TrackPoint {
                            coord,
                            time: None,
                            elevation: None,
                        }),
                        None => {
                            let message = format!(
                                "track {trk_no}: skipping point {pt_no} with missing or invalid lat/lon"
                            );
                            tracing::warn!("{message}");
                            warnings.push(message);
                        }
                    }
                }
            }
            Event::Text(t) => {
                let (Some(field), Ok(value)) = (text_field, t.unescape()) else {
                    continue;
                };
                let value = value.trim();
                match field {
                    TextField::TrackName => {
                        if !value.is_empty() && track_name.is_none() {
                            track_name = Some(value.to_string());
                        }
                    }
                    TextField::Elevation if cur_coord.is_some() => {
                        cur_ele = value.parse().ok();
                        if cur_ele.is_none() {
                            let message = format!(
                                "track {trk_no}: point {pt_no}: unparseable elevation {value:?}, treated as absent"
                            );
                            tracing::warn!("{message}");
                            warnings.push(message);
                        }
                    }
                    TextField::Time if cur_coord.is_some() => {
                        cur_time = parse_timestamp(value);
                        if cur_time.is_none() {
                            let message = format!(
                                "track {trk_no}: point {pt_no}: unparseable timestamp {value:?}, treated as absent"
                            );
                            tracing::warn!("{message}");
                            warnings.push(message);
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                depth -= 1;
                text_field = None;
                match e.local_name().as_ref() {
                    b"trkpt" if in_trkpt => {
                        if let Some(coord) = cur_coord.take() {
                            points.push(TrackPoint {
                                coord,
                                time: cur_time.take(),
                                elevation: cur_ele.take(),
                            });
                        }
                        in_trkpt = false;
                    }
                    b"trk" if in_trk && depth + 1 == trk_depth => {
                        if points.is_empty() {
                            let message = format!("track {trk_no} has no usable points, dropped");
                            tracing::warn!("{message}");
                            warnings.push(message);
                        } else {
                            tracks.push(RawTrack {
                                name: track_name.take(),
                                points: std::mem::take(&mut points),
                            });
                        }
                        in_trk = false;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element {
        return Err(SplitError::MalformedDocument(
            "document contains no XML elements".into(),
        ));
    }
    if depth != 0 {
        return Err(SplitError::MalformedDocument(
            "unexpected end of document".into(),
        ));
    }
    if tracks.is_empty() {
        return Err(SplitError::NoTracksFound);
    }

    tracing::debug!(
        tracks = tracks.len(),
        warnings = warnings.len(),
        "parsed GPX document"
    );
    Ok(ParsedDocument { tracks, warnings })
}

fn point_coord(e: &BytesStart) -> Option<Coordinate> {
    let lat = attr_f64(e, "lat")?;
    let lon = attr_f64(e, "lon")?;
    Some(Coordinate { lat, lon })
}

fn attr_f64(e: &BytesStart, name: &str) -> Option<f64> {
    let attr = e.try_get_attribute(name).ok().flatten()?;
    let value = attr.unescape_value().ok()?;
    value.trim().parse().ok()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Bare local-less timestamps show up in the wild; read them as UTC.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
