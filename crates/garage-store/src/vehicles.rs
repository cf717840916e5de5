//! Vehicle store over a single persisted blob

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use garage_types::{Error, Result, StoreError, ValidationError, Vehicle, VehicleKind};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::blob::BlobStorage;
use crate::defaults::default_fleet;
use crate::record::{reconstruct, SkippedRecord};

/// Key of the blob holding the whole garage. Changing it abandons saved data.
pub const STORAGE_KEY: &str = "garage_data_v1";

/// Where the vehicles in memory came from after a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Defaults,
}

/// What happened during [`VehicleStore::load`]
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub source: LoadSource,
    /// Set when the blob was not valid garage data and got discarded
    pub corrupt: Option<StoreError>,
    /// Set when the blob could not be read at all. It is left untouched and
    /// the store refuses writes until a later load succeeds.
    pub read_error: Option<StoreError>,
    pub skipped: Vec<SkippedRecord>,
    /// Set when the default fleet could not be written back
    pub persist_error: Option<String>,
}

/// Field changes for an edit. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleUpdate {
    pub model: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    pub license_plate: Option<String>,
    pub year: Option<i32>,
    pub license_expiry: Option<NaiveDate>,
    /// Trucks only
    pub cargo_capacity: Option<f64>,
}

impl VehicleUpdate {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && !self.has_non_image_changes()
    }

    pub fn has_non_image_changes(&self) -> bool {
        self.model.is_some()
            || self.color.is_some()
            || self.license_plate.is_some()
            || self.year.is_some()
            || self.license_expiry.is_some()
            || self.cargo_capacity.is_some()
    }

    /// Apply the changes to `vehicle`, leaving it untouched on error
    pub fn apply(&self, vehicle: &mut Vehicle) -> std::result::Result<(), ValidationError> {
        let model = match &self.model {
            Some(m) if m.trim().is_empty() => return Err(ValidationError::MissingField("model")),
            Some(m) => Some(m.trim().to_string()),
            None => None,
        };

        let kind = match (self.cargo_capacity, &vehicle.kind) {
            (None, kind) => kind.clone(),
            (Some(capacity), VehicleKind::Truck { cargo_load, .. }) => {
                if !capacity.is_finite() || capacity < 0.0 || capacity < *cargo_load {
                    return Err(ValidationError::InvalidValue {
                        field: "cargo capacity",
                        value: capacity.to_string(),
                    });
                }
                VehicleKind::Truck {
                    cargo_capacity: capacity,
                    cargo_load: *cargo_load,
                }
            }
            (Some(capacity), _) => {
                return Err(ValidationError::InvalidValue {
                    field: "cargo capacity",
                    value: format!("{} (not a truck)", capacity),
                })
            }
        };

        vehicle.kind = kind;
        if let Some(model) = model {
            vehicle.model = model;
        }
        if let Some(ref color) = self.color {
            vehicle.color = color.trim().to_string();
        }
        if let Some(ref image) = self.image {
            vehicle.image = Some(image.clone());
        }
        if let Some(ref plate) = self.license_plate {
            vehicle.license_plate = plate.trim().to_uppercase();
        }
        if let Some(year) = self.year {
            vehicle.year = Some(year);
        }
        if let Some(expiry) = self.license_expiry {
            vehicle.license_expiry = Some(expiry);
        }
        Ok(())
    }
}

/// Result of a successful [`VehicleStore::update`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The new image did not fit in storage; everything else was saved
    pub image_dropped: bool,
}

/// Persistent store for the garage's vehicles
pub struct VehicleStore<S: BlobStorage> {
    storage: S,
    vehicles: HashMap<String, Vehicle>,
    /// Read failure from the last load; blocks writes over the unread blob
    unreadable: Option<String>,
}

impl<S: BlobStorage> VehicleStore<S> {
    /// Create an empty store over `storage`. Call [`load`](Self::load) to read it.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            vehicles: HashMap::new(),
            unreadable: None,
        }
    }

    /// Create a store and load it
    pub fn open(storage: S) -> (Self, LoadReport) {
        let mut store = Self::new(storage);
        let report = store.load();
        (store, report)
    }

    /// Replace the in-memory garage with the persisted one.
    ///
    /// Never fails: an absent, corrupt or empty blob yields the default fleet,
    /// which is written back right away. A blob that cannot be read is kept
    /// as it is and the defaults stay in memory only.
    pub fn load(&mut self) -> LoadReport {
        self.vehicles.clear();
        self.unreadable = None;
        let mut report = LoadReport {
            source: LoadSource::Persisted,
            corrupt: None,
            read_error: None,
            skipped: Vec::new(),
            persist_error: None,
        };

        match self.storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Map<String, Value>>(&raw) {
                Ok(records) => {
                    for (key, value) in records {
                        match reconstruct(&key, value) {
                            Ok(vehicle) => {
                                self.vehicles.insert(vehicle.id.clone(), vehicle);
                            }
                            Err(skipped) => {
                                warn!("Skipping stored vehicle {}: {}", skipped.key, skipped.reason);
                                report.skipped.push(skipped);
                            }
                        }
                    }
                    debug!("Loaded {} vehicles from storage", self.vehicles.len());
                }
                Err(e) => self.discard_corrupt(StoreError::Corrupt(e.to_string()), &mut report),
            },
            Ok(None) => info!("No saved garage found"),
            Err(e @ StoreError::Corrupt(_)) => self.discard_corrupt(e, &mut report),
            Err(e) => {
                error!("Failed to read saved garage, leaving it untouched: {}", e);
                self.unreadable = Some(e.to_string());
                report.read_error = Some(e);
            }
        }

        if self.vehicles.is_empty() {
            info!("Initialising garage with default vehicles");
            report.source = LoadSource::Defaults;
            for vehicle in default_fleet() {
                self.vehicles.insert(vehicle.id.clone(), vehicle);
            }
            if self.unreadable.is_none() {
                if let Err(e) = self.save() {
                    error!("Failed to save default garage: {}", e);
                    report.persist_error = Some(e.to_string());
                }
            }
        }

        report
    }

    fn discard_corrupt(&mut self, err: StoreError, report: &mut LoadReport) {
        warn!("Stored garage is corrupt, resetting to defaults: {}", err);
        if let Err(e) = self.storage.remove(STORAGE_KEY) {
            warn!("Failed to discard corrupt garage data: {}", e);
        }
        report.corrupt = Some(err);
    }

    /// Write the whole garage as one blob
    pub fn save(&mut self) -> Result<()> {
        if let Some(ref reason) = self.unreadable {
            return Err(StoreError::Read(format!(
                "saved garage could not be read, not overwriting it ({})",
                reason
            ))
            .into());
        }
        let ordered: BTreeMap<&str, &Vehicle> = self
            .vehicles
            .iter()
            .map(|(id, v)| (id.as_str(), v))
            .collect();
        let json = serde_json::to_string(&ordered)?;
        self.storage.write(STORAGE_KEY, &json)?;
        debug!("Saved {} vehicles ({} bytes)", ordered.len(), json.len());
        Ok(())
    }

    /// Add a vehicle, replacing any vehicle with the same id
    pub fn add(&mut self, vehicle: Vehicle) -> Result<()> {
        let id = vehicle.id.clone();
        let previous = self.vehicles.insert(id.clone(), vehicle);
        if let Err(e) = self.save() {
            match previous {
                Some(prev) => self.vehicles.insert(id, prev),
                None => self.vehicles.remove(&id),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Remove a vehicle by ID. Unknown ids return `false` without writing.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(removed) = self.vehicles.remove(id) else {
            return Ok(false);
        };
        if let Err(e) = self.save() {
            self.vehicles.insert(id.to_string(), removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Edit a vehicle's fields.
    ///
    /// When the write runs out of quota and the edit carries a new image along
    /// with other changes, the image alone is reverted and the write retried once.
    pub fn update(&mut self, id: &str, update: &VehicleUpdate) -> Result<UpdateOutcome> {
        let current = self.get(id).ok_or_else(|| Error::VehicleNotFound(id.to_string()))?;
        let old_image = current.image.clone();
        let mut staged = current.clone();
        update.apply(&mut staged)?;

        let previous = self.vehicles.insert(id.to_string(), staged);
        let err = match self.save() {
            Ok(()) => return Ok(UpdateOutcome::default()),
            Err(e) => e,
        };

        if err.is_quota() && update.image.is_some() && update.has_non_image_changes() {
            warn!("Storage full, saving edit of {} without the new image", id);
            if let Some(v) = self.vehicles.get_mut(id) {
                v.image = old_image;
            }
            match self.save() {
                Ok(()) => {
                    return Ok(UpdateOutcome {
                        image_dropped: true,
                    })
                }
                Err(retry_err) => {
                    self.restore(id, previous);
                    return Err(retry_err);
                }
            }
        }

        self.restore(id, previous);
        Err(err)
    }

    /// Run `f` on a copy of the vehicle and persist the result.
    ///
    /// If `f` fails nothing changes. If the write fails the vehicle is restored.
    pub fn modify<T, E, F>(&mut self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Vehicle) -> std::result::Result<T, E>,
        E: Into<Error>,
    {
        let current = self.get(id).ok_or_else(|| Error::VehicleNotFound(id.to_string()))?;
        let mut staged = current.clone();
        let value = f(&mut staged).map_err(Into::into)?;
        if staged == *current {
            return Ok(value);
        }

        let previous = self.vehicles.insert(id.to_string(), staged);
        if let Err(e) = self.save() {
            self.restore(id, previous);
            return Err(e);
        }
        Ok(value)
    }

    fn restore(&mut self, id: &str, previous: Option<Vehicle>) {
        match previous {
            Some(prev) => self.vehicles.insert(id.to_string(), prev),
            None => self.vehicles.remove(id),
        };
    }

    pub fn get(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Get all vehicles sorted by model
    pub fn all(&self) -> Vec<&Vehicle> {
        let mut vehicles: Vec<_> = self.vehicles.values().collect();
        vehicles.sort_by(|a, b| a.model.cmp(&b.model).then_with(|| a.id.cmp(&b.id)));
        vehicles
    }

    pub fn count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vehicles.contains_key(id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
