//! The garage context: the vehicle store plus the trip planner

use chrono::{DateTime, TimeZone, Utc};
use garage_domain::repository::{DetailLookup, ForecastProvider};
use garage_domain::service::{
    apply_action, licence_alerts, maintenance_reminders, upcoming_maintenance, ActionOutcome,
    LicenceAlert, MaintenanceReminder, ScheduledService,
};
use garage_store::{BlobStorage, LoadReport, UpdateOutcome, VehicleStore};
use garage_types::{
    Error, LookupError, MaintenanceRecord, Result, Vehicle, VehicleAction, VehicleDetails,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::input::{MaintenanceInput, NewVehicle, VehicleEdit};
use super::trip_planner::{Completion, TripForecast, TripPlanner};

/// Everything that needs the user's attention
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertsDashboard {
    pub licences: Vec<LicenceAlert>,
    pub reminders: Vec<MaintenanceReminder>,
    pub upcoming: Vec<ScheduledService>,
}

impl AlertsDashboard {
    pub fn is_empty(&self) -> bool {
        self.licences.is_empty() && self.reminders.is_empty() && self.upcoming.is_empty()
    }
}

pub struct Garage<S: BlobStorage> {
    store: VehicleStore<S>,
    planner: TripPlanner,
}

impl<S: BlobStorage> Garage<S> {
    /// Open the garage over `storage`, loading saved vehicles or the default fleet
    pub fn open(storage: S) -> (Self, LoadReport) {
        let (store, report) = VehicleStore::open(storage);
        if let Some(ref reason) = report.corrupt {
            warn!("Saved garage was corrupt and has been reset: {}", reason);
        }
        if let Some(ref err) = report.read_error {
            warn!("Saved garage could not be read, showing default vehicles: {}", err);
        }
        let garage = Self {
            store,
            planner: TripPlanner::new(),
        };
        (garage, report)
    }

    pub fn store(&self) -> &VehicleStore<S> {
        &self.store
    }

    pub fn planner(&self) -> &TripPlanner {
        &self.planner
    }

    /// All vehicles sorted by model
    pub fn vehicles(&self) -> Vec<&Vehicle> {
        self.store.all()
    }

    pub fn vehicle(&self, id: &str) -> Result<&Vehicle> {
        self.store
            .get(id)
            .ok_or_else(|| Error::VehicleNotFound(id.to_string()))
    }

    /// Validate and add a new vehicle under a fresh id
    pub fn add_vehicle(&mut self, input: NewVehicle) -> Result<Vehicle> {
        let id = format!("v{}", Uuid::new_v4().simple());
        let vehicle = input.into_vehicle(id)?;
        self.store.add(vehicle.clone())?;
        info!("Added {} ({})", vehicle.model, vehicle.id);
        Ok(vehicle)
    }

    pub fn edit_vehicle(&mut self, id: &str, edit: VehicleEdit) -> Result<UpdateOutcome> {
        self.vehicle(id)?;
        let update = edit.into_update()?;
        if update.is_empty() {
            return Ok(UpdateOutcome::default());
        }
        let outcome = self.store.update(id, &update)?;
        if outcome.image_dropped {
            warn!("Edit of {} saved without the new image: storage is full", id);
        }
        Ok(outcome)
    }

    pub fn remove_vehicle(&mut self, id: &str) -> Result<bool> {
        let removed = self.store.remove(id)?;
        if removed {
            info!("Removed {}", id);
        }
        Ok(removed)
    }

    /// Perform an action and persist the vehicle's new state
    pub fn act(&mut self, id: &str, action: VehicleAction) -> Result<ActionOutcome> {
        self.store.modify(id, |v| apply_action(v, action))
    }

    pub fn schedule_maintenance(
        &mut self,
        id: &str,
        input: MaintenanceInput,
    ) -> Result<MaintenanceRecord> {
        let record = input.into_record()?;
        let stored = record.clone();
        self.store.modify(id, move |v| {
            v.add_maintenance(record);
            Ok::<_, Error>(())
        })?;
        info!("Scheduled {} for {}", stored.summary(), id);
        Ok(stored)
    }

    /// Drop a vehicle's whole maintenance history, returning how many records went
    pub fn clear_maintenance(&mut self, id: &str) -> Result<usize> {
        self.store.modify(id, |v| {
            let count = v.maintenance.len();
            v.maintenance.clear();
            Ok::<_, Error>(count)
        })
    }

    /// Licence alerts, reminders for today and tomorrow, and the future schedule
    pub fn alerts<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> AlertsDashboard {
        let vehicles = self.store.all();
        AlertsDashboard {
            licences: licence_alerts(vehicles.iter().copied(), now.date_naive()),
            reminders: maintenance_reminders(vehicles.iter().copied(), now),
            upcoming: upcoming_maintenance(vehicles.iter().copied(), now.with_timezone(&Utc)),
        }
    }

    /// Extended details for a vehicle. Lookup failures count as "no details".
    pub fn details(&self, id: &str, lookup: &impl DetailLookup) -> Result<Option<VehicleDetails>> {
        self.vehicle(id)?;
        match lookup.find_details(id) {
            Ok(details) => Ok(details),
            Err(e) => {
                warn!("Detail lookup for {} failed: {}", id, e);
                Ok(None)
            }
        }
    }

    /// Fetch the forecast for `city` and return the first `days` days
    pub async fn plan_trip<P: ForecastProvider>(
        &mut self,
        provider: &P,
        city: &str,
        days: i64,
    ) -> Result<TripForecast> {
        let city = city.trim();
        let ticket = self.planner.begin(city)?;
        let result = provider.fetch_forecast(city).await;
        if self.planner.complete(ticket, result)? == Completion::Superseded {
            warn!("Forecast for {} was superseded", city);
        }
        self.forecast(days)
    }

    /// Re-slice the cached forecast without fetching again
    pub fn forecast(&self, days: i64) -> Result<TripForecast> {
        self.planner
            .view(days)
            .ok_or_else(|| LookupError::Unavailable("no forecast loaded".to_string()).into())
    }
}
