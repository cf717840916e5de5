//! Lenient reconstruction of persisted vehicle records
//!
//! Records are read field by field so that one bad record is dropped on its
//! own instead of failing the whole blob.

use garage_types::{parse_date, parse_timestamp, MaintenanceRecord, Vehicle, VehicleKind};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// A persisted record that could not be turned back into a vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Key of the record inside the blob
    pub key: String,
    pub reason: String,
}

/// Deserialize null as default value
fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::deserialize(deserializer).map(|opt| opt.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredVehicle {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    vehicle_type: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    color: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    license_plate: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    license_expiry: Option<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    running: bool,
    #[serde(default, deserialize_with = "null_to_default")]
    speed: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    turbo_engaged: bool,
    #[serde(default, deserialize_with = "null_to_default")]
    cargo_capacity: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    cargo_load: f64,
    #[serde(default, deserialize_with = "null_to_default")]
    maintenance: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMaintenance {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    service_type: Option<String>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    description: Option<String>,
}

/// Rebuild one vehicle from its persisted form
pub(crate) fn reconstruct(key: &str, value: Value) -> Result<Vehicle, SkippedRecord> {
    let skip = |reason: String| SkippedRecord {
        key: key.to_string(),
        reason,
    };

    let stored: StoredVehicle =
        serde_json::from_value(value).map_err(|e| skip(format!("malformed record: {}", e)))?;

    let id = non_empty(stored.id).ok_or_else(|| skip("missing id".to_string()))?;
    let model = non_empty(stored.model).ok_or_else(|| skip("missing model".to_string()))?;
    let tag = non_empty(stored.vehicle_type)
        .ok_or_else(|| skip("missing vehicle type".to_string()))?;

    let kind = match tag.as_str() {
        "SportsCar" => VehicleKind::SportsCar {
            turbo_engaged: stored.turbo_engaged,
        },
        "Truck" => {
            let capacity = non_negative(stored.cargo_capacity);
            let load = non_negative(stored.cargo_load);
            if load > capacity {
                debug!("Record {}: cargo {} over capacity {}, clamped", key, load, capacity);
            }
            VehicleKind::Truck {
                cargo_capacity: capacity,
                cargo_load: load.min(capacity),
            }
        }
        "Car" => VehicleKind::Car,
        other => {
            debug!("Record {}: unknown vehicle type '{}', loading as Car", key, other);
            VehicleKind::Car
        }
    };

    let mut vehicle = Vehicle::new(id, model, kind);
    vehicle.color = stored.color;
    vehicle.image = non_empty(stored.image);
    vehicle.license_plate = stored.license_plate;
    vehicle.year = stored.year;
    vehicle.license_expiry = stored.license_expiry.as_deref().and_then(parse_date);
    vehicle.running = stored.running;
    vehicle.speed = non_negative(stored.speed);

    for entry in stored.maintenance {
        match maintenance_record(entry) {
            Some(record) => vehicle.add_maintenance(record),
            None => debug!("Record {}: dropped invalid maintenance entry", key),
        }
    }

    Ok(vehicle)
}

fn maintenance_record(value: Value) -> Option<MaintenanceRecord> {
    let stored: StoredMaintenance = serde_json::from_value(value).ok()?;
    let timestamp = parse_timestamp(stored.timestamp.as_deref()?)?;
    MaintenanceRecord::new(
        timestamp,
        stored.service_type.as_deref()?,
        stored.cost,
        stored.description.as_deref(),
    )
    .ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reconstruct_truck() {
        let v = reconstruct(
            "cam1",
            json!({
                "id": "cam1",
                "model": "Scania 113",
                "vehicleType": "Truck",
                "cargoCapacity": 20000.0,
                "cargoLoad": 5000.0,
                "licenseExpiry": "2023-01-10",
                "turboEngaged": true
            }),
        )
        .unwrap();

        assert_eq!(
            v.kind,
            VehicleKind::Truck {
                cargo_capacity: 20000.0,
                cargo_load: 5000.0
            }
        );
        assert_eq!(v.license_expiry.unwrap().to_string(), "2023-01-10");
        assert_eq!(v.speed, 0.0);
        assert!(!v.running);
    }

    #[test]
    fn test_variant_fields_default() {
        let v = reconstruct(
            "s",
            json!({"id": "s", "model": "Maverick", "vehicleType": "SportsCar", "speed": null}),
        )
        .unwrap();
        assert_eq!(v.kind, VehicleKind::sports_car());
        assert_eq!(v.speed, 0.0);
    }

    #[test]
    fn test_unknown_tag_is_car() {
        let v = reconstruct(
            "x",
            json!({"id": "x", "model": "Kombi", "vehicleType": "Van", "cargoCapacity": 10}),
        )
        .unwrap();
        assert_eq!(v.kind, VehicleKind::Car);
    }

    #[test]
    fn test_required_fields() {
        let missing_model = reconstruct("a", json!({"id": "a", "vehicleType": "Car"}));
        assert_eq!(missing_model.unwrap_err().reason, "missing model");

        let missing_tag = reconstruct("b", json!({"id": "b", "model": "Fusca"}));
        assert!(missing_tag.is_err());

        let blank_id = reconstruct("c", json!({"id": " ", "model": "Fusca", "vehicleType": "Car"}));
        assert!(blank_id.is_err());
    }

    #[test]
    fn test_wrong_field_type_skips_record() {
        let err = reconstruct(
            "a",
            json!({"id": "a", "model": "Fusca", "vehicleType": "Car", "speed": "fast"}),
        )
        .unwrap_err();
        assert_eq!(err.key, "a");
        assert!(err.reason.starts_with("malformed record"));

        assert!(reconstruct("b", json!("not an object")).is_err());
    }

    #[test]
    fn test_invalid_maintenance_dropped_individually() {
        let v = reconstruct(
            "a",
            json!({
                "id": "a",
                "model": "Fusca",
                "vehicleType": "Car",
                "maintenance": [
                    {"timestamp": "2024-02-01T10:00:00Z", "serviceType": "Oil", "cost": 120.0},
                    {"timestamp": "garbage", "serviceType": "Brakes"},
                    {"timestamp": "2024-01-01", "serviceType": ""},
                    {"serviceType": "No date"},
                    {"timestamp": "2023-12-01T08:00:00Z", "serviceType": "Tyres", "cost": -5.0},
                    {"timestamp": "2023-11-15T10:00:00Z", "serviceType": "Troca Pneu"},
                    42
                ]
            }),
        )
        .unwrap();

        let kinds: Vec<_> = v.maintenance.iter().map(|m| m.service_type.as_str()).collect();
        assert_eq!(kinds, vec!["Troca Pneu", "Oil"]);
    }

    #[test]
    fn test_truck_load_clamped_to_capacity() {
        let v = reconstruct(
            "t",
            json!({"id": "t", "model": "Volvo", "vehicleType": "Truck", "cargoCapacity": 100, "cargoLoad": 150}),
        )
        .unwrap();
        assert_eq!(
            v.kind,
            VehicleKind::Truck {
                cargo_capacity: 100.0,
                cargo_load: 100.0
            }
        );
    }
}
