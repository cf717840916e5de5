//! The fleet a fresh garage starts with

use chrono::{NaiveDate, TimeZone, Utc};
use garage_types::{MaintenanceRecord, Vehicle, VehicleKind};

/// Fusca, Maverick and Scania 113, with one past tyre change on the Fusca
pub fn default_fleet() -> Vec<Vehicle> {
    let mut fusca = Vehicle::new("carro1", "Fusca", VehicleKind::Car)
        .with_color("Azul")
        .with_license_plate("ABC1234")
        .with_year(1975);
    fusca.license_expiry = NaiveDate::from_ymd_opt(2024, 12, 31);
    if let Some(ts) = Utc.with_ymd_and_hms(2023, 11, 15, 10, 0, 0).single() {
        if let Ok(record) = MaintenanceRecord::new(ts, "Troca Pneu", Some(250.0), None) {
            fusca.add_maintenance(record);
        }
    }

    let mut maverick = Vehicle::new("carro2", "Maverick", VehicleKind::sports_car())
        .with_color("Laranja")
        .with_license_plate("DEF5678")
        .with_year(1974);
    maverick.license_expiry = NaiveDate::from_ymd_opt(2025, 6, 1);

    let mut scania = Vehicle::new("cam1", "Scania 113", VehicleKind::truck(20000.0))
        .with_color("Vermelho")
        .with_license_plate("GHI9012")
        .with_year(1995);
    scania.license_expiry = NaiveDate::from_ymd_opt(2023, 1, 10);

    vec![fusca, maverick, scania]
}
