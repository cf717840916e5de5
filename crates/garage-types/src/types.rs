//! Vehicle and maintenance types

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed set of vehicle kinds with their kind-specific fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "vehicleType")]
pub enum VehicleKind {
    Car,
    SportsCar {
        #[serde(rename = "turboEngaged", default)]
        turbo_engaged: bool,
    },
    Truck {
        #[serde(rename = "cargoCapacity", default)]
        cargo_capacity: f64,
        #[serde(rename = "cargoLoad", default)]
        cargo_load: f64,
    },
}

impl VehicleKind {
    pub fn sports_car() -> Self {
        VehicleKind::SportsCar {
            turbo_engaged: false,
        }
    }

    pub fn truck(cargo_capacity: f64) -> Self {
        VehicleKind::Truck {
            cargo_capacity,
            cargo_load: 0.0,
        }
    }

    /// Tag written to the persisted record
    pub fn tag(&self) -> &'static str {
        match self {
            VehicleKind::Car => "Car",
            VehicleKind::SportsCar { .. } => "SportsCar",
            VehicleKind::Truck { .. } => "Truck",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VehicleKind::Car => "Car",
            VehicleKind::SportsCar { .. } => "Sports car",
            VehicleKind::Truck { .. } => "Truck",
        }
    }

    /// Capability check: turbo is sports-car only, cargo is truck only
    pub fn supports(&self, action: &VehicleAction) -> bool {
        match action {
            VehicleAction::ToggleTurbo => matches!(self, VehicleKind::SportsCar { .. }),
            VehicleAction::LoadCargo(_) | VehicleAction::UnloadCargo(_) => {
                matches!(self, VehicleKind::Truck { .. })
            }
            _ => true,
        }
    }

    /// Image used when the user supplies none or the supplied one is unreadable
    pub fn placeholder_image(&self) -> &'static str {
        match self {
            VehicleKind::Car => "default_car.png",
            VehicleKind::SportsCar { .. } => "default_sport.png",
            VehicleKind::Truck { .. } => "default_truck.png",
        }
    }
}

/// A serviced or scheduled maintenance entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub timestamp: DateTime<Utc>,
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MaintenanceRecord {
    /// Build a validated record. Service type is trimmed and must be non-empty,
    /// cost must be non-negative, blank descriptions become `None`.
    pub fn new(
        timestamp: DateTime<Utc>,
        service_type: &str,
        cost: Option<f64>,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let service_type = service_type.trim();
        if service_type.is_empty() {
            return Err(ValidationError::MissingField("service type"));
        }
        if let Some(c) = cost {
            if !c.is_finite() || c < 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: "cost",
                    value: c.to_string(),
                });
            }
        }
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            timestamp,
            service_type: service_type.to_string(),
            cost,
            description,
        })
    }

    /// One-line summary, e.g. "Oil change on 2024-03-01 10:00 (R$ 120.00)"
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} on {}",
            self.service_type,
            self.timestamp.format("%Y-%m-%d %H:%M")
        );
        if let Some(cost) = self.cost {
            s.push_str(&format!(" (R$ {:.2})", cost));
        }
        if let Some(ref d) = self.description {
            s.push_str(&format!(" - {}", d));
        }
        s
    }
}

/// Parse a maintenance timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` / `YYYY-MM-DD HH:MM[:SS]` (read as UTC)
/// and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a licence expiry date. Full timestamps keep only their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// A vehicle in the garage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    /// Unique identifier, chosen by the caller
    pub id: String,
    /// Model name (e.g., "Fusca", "Scania 113")
    pub model: String,
    #[serde(default)]
    pub color: String,
    /// Opaque image reference: a data URI or a placeholder file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Licence / permit expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub running: bool,
    /// Current speed in km/h
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub maintenance: Vec<MaintenanceRecord>,
    #[serde(flatten)]
    pub kind: VehicleKind,
}

impl Vehicle {
    pub fn new(id: impl Into<String>, model: impl Into<String>, kind: VehicleKind) -> Self {
        Self {
            id: id.into(),
            model: model.into(),
            color: String::new(),
            image: None,
            license_plate: String::new(),
            year: None,
            license_expiry: None,
            running: false,
            speed: 0.0,
            maintenance: Vec::new(),
            kind,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_license_plate(mut self, plate: impl Into<String>) -> Self {
        self.license_plate = plate.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_license_expiry(mut self, expiry: NaiveDate) -> Self {
        self.license_expiry = Some(expiry);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Insert a record keeping the history ordered by timestamp
    pub fn add_maintenance(&mut self, record: MaintenanceRecord) {
        let pos = self
            .maintenance
            .partition_point(|m| m.timestamp <= record.timestamp);
        self.maintenance.insert(pos, record);
    }

    pub fn supports(&self, action: &VehicleAction) -> bool {
        self.kind.supports(action)
    }

    /// Image reference to show: the stored one or the kind's placeholder
    pub fn image_or_placeholder(&self) -> &str {
        self.image
            .as_deref()
            .unwrap_or_else(|| self.kind.placeholder_image())
    }
}

/// Everything a user can ask a vehicle to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleAction {
    Start,
    Stop,
    Accelerate,
    Brake,
    Honk,
    ToggleTurbo,
    LoadCargo(f64),
    UnloadCargo(f64),
}

impl VehicleAction {
    pub fn name(&self) -> &'static str {
        match self {
            VehicleAction::Start => "start",
            VehicleAction::Stop => "stop",
            VehicleAction::Accelerate => "accelerate",
            VehicleAction::Brake => "brake",
            VehicleAction::Honk => "honk",
            VehicleAction::ToggleTurbo => "turbo",
            VehicleAction::LoadCargo(_) => "load",
            VehicleAction::UnloadCargo(_) => "unload",
        }
    }
}

/// Extended attributes provided by the detail lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetails {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall_pending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_service_due: Option<NaiveDate>,
    /// Any further attributes, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
