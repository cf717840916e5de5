//! Command handlers

use std::path::PathBuf;

use chrono::Local;
use garage_app::app::{Garage, MaintenanceInput, NewVehicle, VehicleEdit};
use garage_app::config::Config;
use garage_app::repository::{open_detail_lookup, open_forecast_client, open_garage};
use garage_domain::service::parse_window;
use garage_infra::FileBlobStorage;
use garage_store::{LoadReport, LoadSource};
use garage_types::{OutputFormat, Result};
use tracing::debug;

use crate::cli::{Cli, Commands, MaintenanceCommand};
use crate::output::{
    output_action, output_dashboard, output_details, output_forecast, output_maintenance,
    output_vehicle, output_vehicles,
};

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::List => {
            let garage = open(&config)?;
            output_vehicles(output_format, &garage.vehicles())
        }

        Commands::Show { id } => {
            let garage = open(&config)?;
            output_vehicle(output_format, garage.vehicle(&id)?)
        }

        Commands::Add {
            model,
            kind,
            capacity,
            color,
            plate,
            year,
            expiry,
            image,
        } => {
            let input = NewVehicle {
                model,
                kind,
                cargo_capacity: capacity,
                color,
                license_plate: plate,
                year,
                license_expiry: expiry,
                image,
            };
            cmd_add(&config, input, output_format)
        }

        Commands::Edit {
            id,
            model,
            color,
            plate,
            year,
            expiry,
            capacity,
            image,
        } => {
            let edit = VehicleEdit {
                model,
                color,
                license_plate: plate,
                year,
                license_expiry: expiry,
                cargo_capacity: capacity,
                image,
            };
            cmd_edit(&config, &id, edit, output_format)
        }

        Commands::Remove { id } => {
            let mut garage = open(&config)?;
            if garage.remove_vehicle(&id)? {
                println!("Removed {}", id);
            } else {
                println!("No vehicle with ID {}", id);
            }
            Ok(())
        }

        Commands::Action { id, action, amount } => {
            let action = action.into_action(amount)?;
            let mut garage = open(&config)?;
            let outcome = garage.act(&id, action)?;
            output_action(output_format, &outcome, garage.vehicle(&id)?)
        }

        Commands::Maintenance { command } => cmd_maintenance(&config, command, output_format),

        Commands::Alerts => {
            let garage = open(&config)?;
            output_dashboard(output_format, &garage.alerts(&Local::now()))
        }

        Commands::Details { id } => {
            let garage = open(&config)?;
            let lookup = open_detail_lookup(&config)?;
            let details = garage.details(&id, &lookup)?;
            output_details(output_format, garage.vehicle(&id)?, details.as_ref())
        }

        Commands::Forecast { city, days } => {
            let days = match days {
                Some(raw) => parse_window(&raw),
                None => config.default_forecast_days,
            };
            cmd_forecast(&config, &city, days, output_format).await
        }

        Commands::Config {
            show,
            set_data_dir,
            set_quota,
            set_api_key,
            set_lang,
            set_days,
            set_details_file,
            set_output,
            reset,
        } => cmd_config(
            show,
            set_data_dir,
            set_quota,
            set_api_key,
            set_lang,
            set_days,
            set_details_file,
            set_output,
            reset,
        ),
    }
}

/// Open the garage and tell the user about anything odd in the saved data
fn open(config: &Config) -> Result<Garage<FileBlobStorage>> {
    let (garage, report) = open_garage(config)?;
    report_load(&report);
    Ok(garage)
}

fn report_load(report: &LoadReport) {
    if let Some(ref reason) = report.corrupt {
        eprintln!(
            "Warning: saved garage data was corrupt and has been reset to the default vehicles ({})",
            reason
        );
    }
    if let Some(ref err) = report.read_error {
        eprintln!(
            "Warning: saved garage data could not be read ({}). Showing the default vehicles; changes will not be saved.",
            err
        );
    }
    for skipped in &report.skipped {
        eprintln!(
            "Warning: skipped saved vehicle {}: {}",
            skipped.key, skipped.reason
        );
    }
    if let Some(ref err) = report.persist_error {
        eprintln!("Warning: default vehicles could not be saved: {}", err);
    }
    if report.source == LoadSource::Defaults {
        debug!("Garage initialised with default vehicles");
    }
}

fn cmd_add(config: &Config, input: NewVehicle, output_format: OutputFormat) -> Result<()> {
    let mut garage = open(config)?;
    let vehicle = garage.add_vehicle(input)?;

    if output_format == OutputFormat::Json {
        return output_vehicle(output_format, &vehicle);
    }
    println!("Added {} with ID {}", vehicle.model, vehicle.id);
    Ok(())
}

fn cmd_edit(config: &Config, id: &str, edit: VehicleEdit, output_format: OutputFormat) -> Result<()> {
    let mut garage = open(config)?;
    let outcome = garage.edit_vehicle(id, edit)?;

    if outcome.image_dropped {
        eprintln!(
            "Warning: storage is full. Changes were saved, but the new image was not. Try a smaller image."
        );
    }
    if output_format == OutputFormat::Json {
        return output_vehicle(output_format, garage.vehicle(id)?);
    }
    println!("Updated {}", id);
    Ok(())
}

fn cmd_maintenance(
    config: &Config,
    command: MaintenanceCommand,
    output_format: OutputFormat,
) -> Result<()> {
    let mut garage = open(config)?;
    match command {
        MaintenanceCommand::Add {
            id,
            date,
            service_type,
            cost,
            description,
        } => {
            let input = MaintenanceInput {
                timestamp: date,
                service_type,
                cost,
                description,
            };
            let record = garage.schedule_maintenance(&id, input)?;
            output_maintenance(output_format, &id, &record)
        }
        MaintenanceCommand::Clear { id } => {
            let count = garage.clear_maintenance(&id)?;
            println!("Cleared {} maintenance records from {}", count, id);
            Ok(())
        }
    }
}

async fn cmd_forecast(
    config: &Config,
    city: &str,
    days: i64,
    output_format: OutputFormat,
) -> Result<()> {
    let client = open_forecast_client(config)?;
    let mut garage = open(config)?;
    let forecast = garage.plan_trip(&client, city, days).await?;
    output_forecast(output_format, &forecast)
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    show: bool,
    set_data_dir: Option<PathBuf>,
    set_quota: Option<usize>,
    set_api_key: Option<String>,
    set_lang: Option<String>,
    set_days: Option<i64>,
    set_details_file: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(dir) = set_data_dir {
        config.data_dir = Some(dir);
        modified = true;
    }

    if let Some(quota) = set_quota {
        config.storage_quota_bytes = quota;
        modified = true;
    }

    if let Some(key) = set_api_key {
        config.openweather_api_key = Some(key).filter(|k| !k.trim().is_empty());
        modified = true;
    }

    if let Some(lang) = set_lang {
        config.forecast_lang = lang;
        modified = true;
    }

    if let Some(days) = set_days {
        config.default_forecast_days = days;
        modified = true;
    }

    if let Some(path) = set_details_file {
        config.details_file = Some(path);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
