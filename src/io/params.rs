//! JSON parameter and prior files.
//!
//! A parameter file is a flat object of name/value pairs, e.g.
//! `{"fracPol1": 0.3, "psi01_deg": 45.0, ...}`; key order is preserved.
//!
//! Prior exports carry the model, a timestamp and each prior's bounds,
//! boundary condition and label.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::{ModelKind, ParamMap};
use crate::error::AppError;
use crate::prior::{Prior, PriorDict};

/// A saved prior specification (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorFile {
    pub tool: String,
    pub generated: DateTime<Local>,
    pub model: ModelKind,
    pub priors: Vec<Prior>,
}

/// Read a parameter JSON file.
pub fn read_params_json(path: &Path) -> Result<ParamMap, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open parameter JSON '{}': {e}", path.display()))
    })?;
    let params: ParamMap = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid parameter JSON: {e}")))?;
    Ok(params)
}

/// Write a parameter JSON file.
pub fn write_params_json(path: &Path, params: &ParamMap) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create parameter JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, params)
        .map_err(|e| AppError::new(2, format!("Failed to write parameter JSON: {e}")))?;
    Ok(())
}

/// Write a model's prior specification.
pub fn write_priors_json(path: &Path, model: ModelKind, priors: &PriorDict) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create prior JSON '{}': {e}", path.display()))
    })?;

    let out = PriorFile {
        tool: "qufit".to_string(),
        generated: Local::now(),
        model,
        priors: priors.iter().cloned().collect(),
    };

    serde_json::to_writer_pretty(file, &out)
        .map_err(|e| AppError::new(2, format!("Failed to write prior JSON: {e}")))?;
    Ok(())
}

/// Read a prior specification written by [`write_priors_json`].
///
/// Every prior's bounds are validated, so hand-edited files fail here rather
/// than when sampled.
pub fn read_priors_json(path: &Path) -> Result<PriorFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open prior JSON '{}': {e}", path.display())))?;
    let priors: PriorFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid prior JSON: {e}")))?;
    for prior in &priors.priors {
        prior.validate()?;
    }
    Ok(priors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::priors;
    use crate::prior::Boundary;

    #[test]
    fn params_keep_their_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.json");
        let params: ParamMap = [("RM1_radm2", 12.5), ("fracPol1", 0.3), ("psi01_deg", 170.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        write_params_json(&path, &params).unwrap();
        let back = read_params_json(&path).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), vec!["RM1_radm2", "fracPol1", "psi01_deg"]);
        assert_eq!(back, params);
    }

    #[test]
    fn malformed_params_are_input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"fracPol1": "high"}"#).unwrap();
        assert_eq!(read_params_json(&path).unwrap_err().exit_code(), 2);
        assert_eq!(
            read_params_json(&dir.path().join("missing.json")).unwrap_err().exit_code(),
            2
        );
    }

    #[test]
    fn prior_export_keeps_boundaries_and_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("priors.json");
        write_priors_json(&path, ModelKind::M111, &priors(ModelKind::M111)).unwrap();

        let back = read_priors_json(&path).unwrap();
        assert_eq!(back.model, ModelKind::M111);
        assert_eq!(back.priors.len(), 12);
        assert_eq!(back.priors[3].name, "psi01_deg");
        assert_eq!(back.priors[3].boundary, Some(Boundary::Periodic));
        assert!(back.priors[11].is_constraint());
    }

    /// Export the m6 priors, apply `edit` to the JSON and write it back.
    fn edited_prior_file(edit: impl FnOnce(&mut serde_json::Value)) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("priors.json");
        write_priors_json(&path, ModelKind::M6, &priors(ModelKind::M6)).unwrap();
        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        edit(&mut json);
        std::fs::write(&path, json.to_string()).unwrap();
        dir
    }

    #[test]
    fn inverted_bounds_are_rejected_on_load() {
        let dir = edited_prior_file(|json| {
            json["priors"][0]["minimum"] = serde_json::json!(2.0);
        });
        let err = read_priors_json(&dir.path().join("priors.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("fracPol1"));
    }

    #[test]
    fn unknown_boundary_is_rejected_on_load() {
        let dir = edited_prior_file(|json| {
            json["priors"][2]["boundary"] = serde_json::json!("reflective");
        });
        let err = read_priors_json(&dir.path().join("priors.json")).unwrap_err();
        assert!(err.to_string().starts_with("Invalid prior JSON"));
    }
}
