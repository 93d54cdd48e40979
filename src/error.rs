use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("malformed GPX document: {0}")]
    MalformedDocument(String),
    #[error("no tracks found in GPX document")]
    NoTracksFound,
    #[error("invalid split configuration: {0}")]
    InvalidConfiguration(String),
    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("cannot assemble a track from an empty point set")]
    EmptyPointSet,
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
}
