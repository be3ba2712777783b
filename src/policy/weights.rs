//! Persistence of learned ADP weights as a flat JSON array.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use super::adp::{FEATURE_COUNT, ValueWeights};

/// Failure to read or write a weights file.
#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("cannot access weights file \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid weights JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected 4 weights, got {0}")]
    Length(usize),
    #[error("weight {index} is not finite")]
    NonFinite { index: usize },
}

/// Parses weights from a JSON array of exactly [`FEATURE_COUNT`] finite numbers.
///
/// # Errors
///
/// Returns a `WeightsError` if the JSON is malformed, has the wrong length,
/// or contains non-finite values.
pub fn from_json_str(s: &str) -> Result<ValueWeights, WeightsError> {
    let raw: Vec<f64> = serde_json::from_str(s)?;
    let weights: [f64; FEATURE_COUNT] = raw
        .as_slice()
        .try_into()
        .map_err(|_| WeightsError::Length(raw.len()))?;
    if let Some(index) = weights.iter().position(|w| !w.is_finite()) {
        return Err(WeightsError::NonFinite { index });
    }
    Ok(ValueWeights(weights))
}

/// Writes `weights` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns a `WeightsError` if a weight is not finite (JSON cannot carry it)
/// or if serialization or the write fails.
pub fn save(weights: &ValueWeights, path: &Path) -> Result<(), WeightsError> {
    if let Some(index) = weights.as_slice().iter().position(|w| !w.is_finite()) {
        return Err(WeightsError::NonFinite { index });
    }
    let json = serde_json::to_string(weights)?;
    fs::write(path, json).map_err(|source| WeightsError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Reads weights from `path`.
///
/// # Errors
///
/// Returns a `WeightsError` if the file cannot be read or is invalid.
pub fn load(path: &Path) -> Result<ValueWeights, WeightsError> {
    let content = fs::read_to_string(path).map_err(|source| WeightsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    from_json_str(&content)
}

/// Reads weights from `path`, falling back to zeros when the file does not exist.
///
/// # Errors
///
/// Returns a `WeightsError` if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<ValueWeights, WeightsError> {
    match load(path) {
        Err(WeightsError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "weights file not found, using zero weights");
            Ok(ValueWeights::zeros())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("energy_city_{}_{name}", std::process::id()))
    }

    #[test]
    fn save_then_load_restores_weights() {
        let path = temp_path("weights.json");
        let weights = ValueWeights([0.25, -1.5, 3.0, 1e-7]);
        save(&weights, &path).expect("save should succeed");
        let loaded = load(&path).expect("load should succeed");
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, weights);
    }

    #[test]
    fn large_magnitude_weights_restore_exactly() {
        let path = temp_path("large_weights.json");
        let weights = ValueWeights([
            -1.0698874236962841e224,
            3.141592653589793e17,
            -2.718281828459045e-9,
            1.7976931348623157e308,
        ]);
        save(&weights, &path).unwrap();
        let loaded = load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, weights);
    }

    #[test]
    fn non_finite_weights_are_not_saved() {
        let path = temp_path("nan_weights.json");
        let err = save(&ValueWeights([1.0, f64::NAN, 0.0, 0.0]), &path).unwrap_err();
        assert!(matches!(err, WeightsError::NonFinite { index: 1 }));
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_yields_zero_weights() {
        let path = temp_path("does_not_exist.json");
        let weights = load_or_default(&path).expect("missing file is not an error");
        assert_eq!(weights, ValueWeights::zeros());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = from_json_str("[1.0, 2.0, 3.0]").expect_err("must fail");
        assert!(matches!(err, WeightsError::Length(3)));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = from_json_str("{\"weights\": 1}").expect_err("must fail");
        assert!(matches!(err, WeightsError::Json(_)));
    }
}
