//! Domain services

pub mod alerts;
pub mod driving;
pub mod forecast;

pub use alerts::{
    licence_alerts, maintenance_reminders, upcoming_maintenance, LicenceAlert, LicenceStatus,
    MaintenanceReminder, ScheduledService,
};
pub use driving::{apply_action, ActionOutcome};
pub use forecast::{aggregate_by_day, parse_window, windowed_view, NoData};
