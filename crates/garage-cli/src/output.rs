//! Output formatting module

use garage_app::app::{AlertsDashboard, TripForecast};
use garage_domain::service::{ActionOutcome, LicenceStatus};
use garage_types::{MaintenanceRecord, OutputFormat, Result, Vehicle, VehicleDetails, VehicleKind};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

#[derive(Serialize)]
struct ActionReport<'a> {
    outcome: &'a ActionOutcome,
    vehicle: &'a Vehicle,
}

fn kind_details(kind: &VehicleKind) -> String {
    match kind {
        VehicleKind::Car => String::new(),
        VehicleKind::SportsCar { turbo_engaged } => {
            format!("turbo {}", if *turbo_engaged { "on" } else { "off" })
        }
        VehicleKind::Truck {
            cargo_capacity,
            cargo_load,
        } => format!("cargo {:.0}/{:.0} kg", cargo_load, cargo_capacity),
    }
}

/// Image references are usually long data URIs; show only what they are
fn image_summary(image: &str) -> String {
    match image.strip_prefix("data:") {
        Some(rest) => {
            let mime = rest.split(';').next().unwrap_or("image");
            format!("embedded {} ({} bytes)", mime, image.len())
        }
        None => image.to_string(),
    }
}

pub fn output_vehicles(output_format: OutputFormat, vehicles: &[&Vehicle]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(vehicles);
    }

    if vehicles.is_empty() {
        println!("No vehicles in the garage");
        return Ok(());
    }

    println!(
        "{:<36} {:<18} {:<11} {:<10} {:<9} {:>6}  {}",
        "ID", "Model", "Type", "Plate", "State", "km/h", "Details"
    );
    println!("{}", "-".repeat(110));
    for v in vehicles {
        println!(
            "{:<36} {:<18} {:<11} {:<10} {:<9} {:>6.0}  {}",
            v.id,
            v.model,
            v.kind.label(),
            v.license_plate,
            if v.running { "running" } else { "off" },
            v.speed,
            kind_details(&v.kind)
        );
    }
    println!("\n{} vehicles", vehicles.len());
    Ok(())
}

pub fn output_vehicle(output_format: OutputFormat, v: &Vehicle) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(v);
    }

    println!("\n{} ({})", v.model, v.id);
    println!("{}", "=".repeat(v.model.len() + v.id.len() + 3));
    println!("Type:           {}", v.kind.label());
    println!("Color:          {}", v.color);
    println!("License plate:  {}", v.license_plate);
    if let Some(year) = v.year {
        println!("Year:           {}", year);
    }
    match v.license_expiry {
        Some(date) => println!("Licence until:  {}", date),
        None => println!("Licence until:  (not set)"),
    }
    println!("Image:          {}", image_summary(v.image_or_placeholder()));
    println!(
        "State:          {}, {:.0} km/h",
        if v.running { "running" } else { "off" },
        v.speed
    );
    let extra = kind_details(&v.kind);
    if !extra.is_empty() {
        println!("                {}", extra);
    }

    println!("\nMaintenance:");
    if v.maintenance.is_empty() {
        println!("  (none)");
    }
    for m in &v.maintenance {
        println!("  - {}", m.summary());
    }
    Ok(())
}

pub fn output_action(output_format: OutputFormat, outcome: &ActionOutcome, v: &Vehicle) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&ActionReport {
            outcome,
            vehicle: v,
        });
    }

    println!("{}", outcome.message);
    println!(
        "  {}: {}, {:.0} km/h {}",
        v.id,
        if v.running { "running" } else { "off" },
        v.speed,
        kind_details(&v.kind)
    );
    Ok(())
}

pub fn output_maintenance(output_format: OutputFormat, vehicle_id: &str, record: &MaintenanceRecord) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(record);
    }
    println!("Scheduled for {}: {}", vehicle_id, record.summary());
    Ok(())
}

pub fn output_dashboard(output_format: OutputFormat, dashboard: &AlertsDashboard) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(dashboard);
    }

    println!("\nLicence alerts");
    println!("==============");
    if dashboard.licences.is_empty() {
        println!("  No licences expired or expiring soon");
    }
    for a in &dashboard.licences {
        let when = match a.status {
            LicenceStatus::Expired => format!("expired {} days ago", -a.days_remaining),
            LicenceStatus::ExpiringSoon if a.days_remaining == 0 => "expires today".to_string(),
            LicenceStatus::ExpiringSoon => format!("expires in {} days", a.days_remaining),
        };
        println!(
            "  [{}] {} ({}) - {} on {}",
            a.status.label(),
            a.model,
            a.license_plate,
            when,
            a.expires_on
        );
    }

    println!("\nDue today / tomorrow");
    println!("====================");
    if dashboard.reminders.is_empty() {
        println!("  Nothing due");
    }
    for r in &dashboard.reminders {
        println!(
            "  {} {} - {} ({})",
            if r.is_today { "TODAY   " } else { "TOMORROW" },
            r.due_at.format("%H:%M"),
            r.service_type,
            r.model
        );
    }

    println!("\nScheduled maintenance");
    println!("=====================");
    if dashboard.upcoming.is_empty() {
        println!("  No future services scheduled");
    }
    for s in &dashboard.upcoming {
        println!("  {} - {}", s.model, s.record.summary());
    }
    Ok(())
}

pub fn output_details(output_format: OutputFormat, vehicle: &Vehicle, details: Option<&VehicleDetails>) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&details);
    }

    let Some(d) = details else {
        println!("No extended details for {} ({})", vehicle.model, vehicle.id);
        return Ok(());
    };

    println!("\nDetails for {} ({})", vehicle.model, vehicle.id);
    if let Some(value) = d.market_value {
        println!("Market value:   R$ {:.2}", value);
    }
    match d.recall_pending {
        Some(true) => println!(
            "Recall:         PENDING - {}",
            d.recall_reason.as_deref().unwrap_or("no reason given")
        ),
        Some(false) => println!("Recall:         none"),
        None => {}
    }
    if let Some(date) = d.next_service_due {
        println!("Next service:   {}", date);
    }
    for (key, value) in &d.extra {
        let shown = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("{:<15} {}", format!("{}:", key), shown);
    }
    Ok(())
}

pub fn output_forecast(output_format: OutputFormat, forecast: &TripForecast) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(forecast);
    }

    println!("\nForecast for {}", forecast.city);
    println!("{}", "=".repeat(forecast.city.len() + 13));
    for day in &forecast.days {
        println!(
            "{}  {:>5.1}°C / {:>5.1}°C  {:<4} {}",
            day.date.format("%a %d/%m"),
            day.temp_min,
            day.temp_max,
            day.icon,
            day.description
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_summary() {
        assert_eq!(image_summary("default_car.png"), "default_car.png");
        assert_eq!(
            image_summary("data:image/png;base64,AAAA"),
            "embedded image/png (26 bytes)"
        );
    }

    #[test]
    fn test_kind_details() {
        assert_eq!(kind_details(&VehicleKind::Car), "");
        assert_eq!(kind_details(&VehicleKind::sports_car()), "turbo off");
        assert_eq!(
            kind_details(&VehicleKind::Truck {
                cargo_capacity: 20000.0,
                cargo_load: 1500.0
            }),
            "cargo 1500/20000 kg"
        );
    }
}
