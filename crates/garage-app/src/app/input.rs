//! User input for new vehicles, edits and maintenance, validated before it
//! reaches the store

use std::path::PathBuf;

use chrono::NaiveDate;
use garage_infra::{image_data_uri, resolve_image};
use garage_store::VehicleUpdate;
use garage_types::{
    parse_date, parse_timestamp, MaintenanceRecord, ValidationError, Vehicle, VehicleKind,
};

type Validated<T> = std::result::Result<T, ValidationError>;

/// Fields of the add-vehicle form
#[derive(Debug, Clone, Default)]
pub struct NewVehicle {
    pub model: String,
    /// car, sports car or truck
    pub kind: String,
    /// Required for trucks
    pub cargo_capacity: Option<f64>,
    pub color: String,
    pub license_plate: String,
    pub year: Option<i32>,
    pub license_expiry: Option<String>,
    pub image: Option<PathBuf>,
}

impl NewVehicle {
    /// Validate and build the vehicle under `id`
    pub fn into_vehicle(self, id: String) -> Validated<Vehicle> {
        let model = self.model.trim();
        if model.is_empty() {
            return Err(ValidationError::MissingField("model"));
        }
        let kind = parse_kind(&self.kind, self.cargo_capacity)?;
        if let Some(year) = self.year {
            check_year(year)?;
        }
        let license_expiry = self
            .license_expiry
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(expiry)
            .transpose()?;

        let image = resolve_image(self.image.as_deref(), &kind);
        let mut vehicle = Vehicle::new(id, model, kind)
            .with_color(self.color.trim())
            .with_license_plate(self.license_plate.trim().to_uppercase())
            .with_image(image);
        vehicle.year = self.year;
        vehicle.license_expiry = license_expiry;
        Ok(vehicle)
    }
}

/// Fields of the edit form; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct VehicleEdit {
    pub model: Option<String>,
    pub color: Option<String>,
    pub license_plate: Option<String>,
    pub year: Option<i32>,
    pub license_expiry: Option<String>,
    pub cargo_capacity: Option<f64>,
    pub image: Option<PathBuf>,
}

impl VehicleEdit {
    /// Validate into a store update. An image that cannot be read rejects the
    /// whole edit; the vehicle keeps its current picture.
    pub fn into_update(self) -> Validated<VehicleUpdate> {
        if let Some(year) = self.year {
            check_year(year)?;
        }
        let license_expiry = self.license_expiry.as_deref().map(expiry).transpose()?;
        let image = self
            .image
            .as_deref()
            .map(|path| {
                image_data_uri(path).map_err(|e| ValidationError::InvalidValue {
                    field: "image",
                    value: format!("{} ({})", path.display(), e),
                })
            })
            .transpose()?;

        Ok(VehicleUpdate {
            model: self.model,
            color: self.color,
            image,
            license_plate: self.license_plate,
            year: self.year,
            license_expiry,
            cargo_capacity: self.cargo_capacity,
        })
    }
}

/// Fields of the schedule-maintenance form
#[derive(Debug, Clone, Default)]
pub struct MaintenanceInput {
    pub timestamp: String,
    pub service_type: String,
    pub cost: Option<String>,
    pub description: Option<String>,
}

impl MaintenanceInput {
    pub fn into_record(self) -> Validated<MaintenanceRecord> {
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            if self.timestamp.trim().is_empty() {
                ValidationError::MissingField("date")
            } else {
                ValidationError::InvalidValue {
                    field: "date",
                    value: self.timestamp.clone(),
                }
            }
        })?;

        let cost = match self.cost.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.replace(',', ".").parse::<f64>().map_err(|_| {
                ValidationError::InvalidValue {
                    field: "cost",
                    value: raw.to_string(),
                }
            })?),
        };

        MaintenanceRecord::new(
            timestamp,
            &self.service_type,
            cost,
            self.description.as_deref(),
        )
    }
}

/// Map a user-facing kind name to a variant
pub fn parse_kind(raw: &str, cargo_capacity: Option<f64>) -> Validated<VehicleKind> {
    let normalized: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    match normalized.as_str() {
        "car" => Ok(VehicleKind::Car),
        "sportscar" | "sport" | "sports" => Ok(VehicleKind::sports_car()),
        "truck" => match cargo_capacity {
            Some(c) if c.is_finite() && c > 0.0 => Ok(VehicleKind::truck(c)),
            Some(c) => Err(ValidationError::InvalidValue {
                field: "cargo capacity",
                value: c.to_string(),
            }),
            None => Err(ValidationError::MissingField("cargo capacity")),
        },
        "" => Err(ValidationError::MissingField("vehicle type")),
        _ => Err(ValidationError::InvalidValue {
            field: "vehicle type",
            value: raw.to_string(),
        }),
    }
}

fn check_year(year: i32) -> Validated<()> {
    if (1886..=2100).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "year",
            value: year.to_string(),
        })
    }
}

fn expiry(raw: &str) -> Validated<NaiveDate> {
    parse_date(raw).ok_or_else(|| ValidationError::InvalidValue {
        field: "licence expiry",
        value: raw.to_string(),
    })
}
