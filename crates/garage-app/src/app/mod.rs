//! Use cases over the garage

mod garage;
mod input;
mod trip_planner;

pub use garage::{AlertsDashboard, Garage};
pub use input::{MaintenanceInput, NewVehicle, VehicleEdit};
pub use trip_planner::{Completion, Ticket, TripForecast, TripPlanner};
