//! Detail lookup backed by a JSON array file

use std::fs;
use std::path::{Path, PathBuf};

use garage_domain::repository::DetailLookup;
use garage_types::{LookupError, VehicleDetails};
use serde_json::Value;
use tracing::debug;

/// Reads `[{"id": ..., ...}, ...]` on every lookup so edits show up immediately
pub struct FileDetailLookup {
    path: PathBuf,
}

impl FileDetailLookup {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DetailLookup for FileDetailLookup {
    fn find_details(&self, vehicle_id: &str) -> Result<Option<VehicleDetails>, LookupError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| LookupError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        let document: Value = serde_json::from_str(&content)
            .map_err(|e| LookupError::InvalidResponse(format!("{}: {}", self.path.display(), e)))?;

        let Value::Array(entries) = document else {
            return Err(LookupError::InvalidResponse(format!(
                "{} does not contain a JSON array",
                self.path.display()
            )));
        };

        let Some(entry) = entries
            .into_iter()
            .find(|e| e.get("id").and_then(Value::as_str) == Some(vehicle_id))
        else {
            debug!("No details for {} in {}", vehicle_id, self.path.display());
            return Ok(None);
        };

        serde_json::from_value(entry)
            .map(Some)
            .map_err(|e| LookupError::InvalidResponse(format!("details for {}: {}", vehicle_id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn lookup_with(content: &str) -> (tempfile::TempDir, FileDetailLookup) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("details.json");
        fs::write(&path, content).unwrap();
        (dir, FileDetailLookup::new(path))
    }

    #[test]
    fn test_find_details() {
        let (_dir, lookup) = lookup_with(
            r#"[
                {"id": "carro1", "marketValue": 35000, "recallPending": false, "dicaManutencao": "Calibrar pneus"},
                {"id": "cam1", "recallPending": true, "recallReason": "Freio", "nextServiceDue": "2024-09-01"},
                null,
                {"model": "no id"}
            ]"#,
        );

        let fusca = lookup.find_details("carro1").unwrap().unwrap();
        assert_eq!(fusca.market_value, Some(35000.0));
        assert_eq!(fusca.recall_pending, Some(false));
        assert_eq!(fusca.extra["dicaManutencao"], "Calibrar pneus");

        let truck = lookup.find_details("cam1").unwrap().unwrap();
        assert_eq!(truck.recall_reason.as_deref(), Some("Freio"));
        assert_eq!(truck.next_service_due.unwrap().to_string(), "2024-09-01");

        assert_eq!(lookup.find_details("carro2").unwrap(), None);
    }

    #[test]
    fn test_lookup_failures() {
        let missing = FileDetailLookup::new(PathBuf::from("/nonexistent/details.json"));
        assert!(matches!(
            missing.find_details("x"),
            Err(LookupError::Unavailable(_))
        ));

        let (_dir, broken) = lookup_with("{ not json");
        assert!(matches!(
            broken.find_details("x"),
            Err(LookupError::InvalidResponse(_))
        ));

        let (_dir, object) = lookup_with(r#"{"id": "carro1"}"#);
        assert!(matches!(
            object.find_details("carro1"),
            Err(LookupError::InvalidResponse(_))
        ));
    }
}
