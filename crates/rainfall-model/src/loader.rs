//! Locating and deserializing trained artifacts.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::error::ArtifactError;

/// Subdirectories of the base directory searched after the base itself
const FALLBACK_SUBDIRS: [&str; 2] = ["models", "data"];

/// Fallback locations for `primary`: the same file name in `base_dir`,
/// `base_dir/models` and `base_dir/data`, in that order.
pub fn candidate_paths(primary: &Path, base_dir: &Path) -> Vec<PathBuf> {
    let Some(file_name) = primary.file_name() else {
        return Vec::new();
    };

    std::iter::once(base_dir.join(file_name))
        .chain(
            FALLBACK_SUBDIRS
                .iter()
                .map(|subdir| base_dir.join(subdir).join(file_name)),
        )
        .collect()
}

/// First existing location for the artifact, primary path first.
pub fn locate(primary: &Path, desc: &str, base_dir: &Path) -> Result<PathBuf, ArtifactError> {
    if primary.is_file() {
        return Ok(primary.to_path_buf());
    }

    let candidates = candidate_paths(primary, base_dir);
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        tracing::info!(
            "{} not at {}; using fallback {}",
            desc,
            primary.display(),
            found.display()
        );
        return Ok(found.clone());
    }

    Err(ArtifactError::not_found(desc, primary, candidates))
}

/// Locate and deserialize one artifact.
pub fn load_artifact<T>(primary: &Path, desc: &str, base_dir: &Path) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
{
    let path = locate(primary, desc, base_dir)?;

    let bytes = std::fs::read(&path).map_err(|source| ArtifactError::Io {
        desc: desc.to_string(),
        path: path.clone(),
        source,
    })?;

    let artifact = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        desc: desc.to_string(),
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Loaded {} from {}", desc, path.display());
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::ScalerArtifact;

    const SCALER_JSON: &str = r#"{"kind": "standard", "mean": [0.0], "scale": [1.0]}"#;

    #[test]
    fn test_candidate_order() {
        let candidates = candidate_paths(Path::new("/elsewhere/scaler.json"), Path::new("/app"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/app/scaler.json"),
                PathBuf::from("/app/models/scaler.json"),
                PathBuf::from("/app/data/scaler.json"),
            ]
        );
    }

    #[test]
    fn test_primary_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("primary").join("scaler.json");
        std::fs::create_dir_all(primary.parent().unwrap()).unwrap();
        std::fs::write(&primary, SCALER_JSON).unwrap();
        std::fs::write(dir.path().join("scaler.json"), "not json").unwrap();

        assert_eq!(locate(&primary, "Scaler", dir.path()).unwrap(), primary);
    }

    #[test]
    fn test_fallback_to_models_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("models")).unwrap();
        std::fs::write(dir.path().join("models").join("scaler.json"), SCALER_JSON).unwrap();

        let scaler: ScalerArtifact =
            load_artifact(Path::new("/missing/scaler.json"), "Scaler", dir.path()).unwrap();
        assert!(matches!(scaler, ScalerArtifact::Standard { .. }));
    }

    #[test]
    fn test_fallback_to_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        let expected = dir.path().join("data").join("scaler.json");
        std::fs::write(&expected, SCALER_JSON).unwrap();

        assert_eq!(
            locate(Path::new("/missing/scaler.json"), "Scaler", dir.path()).unwrap(),
            expected
        );
    }

    #[test]
    fn test_not_found_enumerates_all_paths() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate(Path::new("/missing/rainfall.json"), "Model", dir.path()).unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Model not found. Tried: /missing/rainfall.json and ["));
        for candidate in candidate_paths(Path::new("rainfall.json"), dir.path()) {
            assert!(message.contains(&candidate.display().to_string()), "{}", message);
        }
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, "{ nope").unwrap();

        let err = load_artifact::<ScalerArtifact>(&path, "Scaler", dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
        assert!(err.to_string().starts_with("Scaler at "));
    }
}
