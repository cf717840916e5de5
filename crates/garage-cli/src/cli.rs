//! CLI definition using clap

use clap::{Parser, Subcommand, ValueEnum};
use garage_types::{OutputFormat, ValidationError, VehicleAction};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "garage")]
#[command(version)]
#[command(about = "Manage a small vehicle fleet: maintenance, licence alerts and trip forecasts")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Data directory override
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all vehicles
    List,

    /// Show one vehicle with its maintenance history
    Show {
        /// Vehicle ID
        id: String,
    },

    /// Add a vehicle
    Add {
        /// Model name (e.g., "Fusca")
        model: String,

        /// Vehicle type: car, sports-car or truck
        #[arg(long, short = 'k', default_value = "car")]
        kind: String,

        /// Cargo capacity in kg (trucks only)
        #[arg(long)]
        capacity: Option<f64>,

        #[arg(long, default_value = "")]
        color: String,

        /// License plate
        #[arg(long, default_value = "")]
        plate: String,

        #[arg(long)]
        year: Option<i32>,

        /// Licence expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<String>,

        /// Image file to embed
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit a vehicle's details
    Edit {
        /// Vehicle ID
        id: String,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// License plate
        #[arg(long)]
        plate: Option<String>,

        #[arg(long)]
        year: Option<i32>,

        /// Licence expiry date (YYYY-MM-DD)
        #[arg(long)]
        expiry: Option<String>,

        /// Cargo capacity in kg (trucks only)
        #[arg(long)]
        capacity: Option<f64>,

        /// Image file to embed
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Remove a vehicle
    Remove {
        /// Vehicle ID
        id: String,
    },

    /// Make a vehicle do something
    Action {
        /// Vehicle ID
        id: String,

        action: ActionArg,

        /// Cargo amount in kg (load / unload)
        amount: Option<f64>,
    },

    /// Schedule or clear maintenance
    Maintenance {
        #[command(subcommand)]
        command: MaintenanceCommand,
    },

    /// Show licence alerts, maintenance due today/tomorrow and the schedule
    Alerts,

    /// Look up extended details for a vehicle
    Details {
        /// Vehicle ID
        id: String,
    },

    /// Weather forecast for a trip destination
    Forecast {
        /// City name (e.g., "Curitiba" or "Curitiba,BR")
        city: String,

        /// Number of days to show ("all" or 0 for every day). Uses config value if not specified.
        #[arg(long, short = 'd')]
        days: Option<String>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set data directory
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set storage quota in bytes
        #[arg(long)]
        set_quota: Option<usize>,

        /// Set OpenWeatherMap API key
        #[arg(long)]
        set_api_key: Option<String>,

        /// Set forecast language (e.g., pt_br, en)
        #[arg(long)]
        set_lang: Option<String>,

        /// Set default number of forecast days (0 = all)
        #[arg(long)]
        set_days: Option<i64>,

        /// Set vehicle details file
        #[arg(long)]
        set_details_file: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum MaintenanceCommand {
    /// Record or schedule a service
    Add {
        /// Vehicle ID
        id: String,

        /// Date and time (YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339)
        #[arg(long)]
        date: String,

        /// Service type (e.g., "Troca de óleo")
        #[arg(long = "type", short = 't')]
        service_type: String,

        /// Cost in R$
        #[arg(long)]
        cost: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a vehicle's maintenance history
    Clear {
        /// Vehicle ID
        id: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    Start,
    Stop,
    Accelerate,
    Brake,
    Honk,
    Turbo,
    Load,
    Unload,
}

impl ActionArg {
    pub fn into_action(self, amount: Option<f64>) -> Result<VehicleAction, ValidationError> {
        let amount = || amount.ok_or(ValidationError::MissingField("amount"));
        Ok(match self {
            ActionArg::Start => VehicleAction::Start,
            ActionArg::Stop => VehicleAction::Stop,
            ActionArg::Accelerate => VehicleAction::Accelerate,
            ActionArg::Brake => VehicleAction::Brake,
            ActionArg::Honk => VehicleAction::Honk,
            ActionArg::Turbo => VehicleAction::ToggleTurbo,
            ActionArg::Load => VehicleAction::LoadCargo(amount()?),
            ActionArg::Unload => VehicleAction::UnloadCargo(amount()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_action_with_amount() {
        let cli = Cli::try_parse_from(["garage", "action", "cam1", "load", "500"]).unwrap();
        match cli.command {
            Commands::Action { id, action, amount } => {
                assert_eq!(id, "cam1");
                assert_eq!(
                    action.into_action(amount).unwrap(),
                    VehicleAction::LoadCargo(500.0)
                );
            }
            _ => panic!("expected action"),
        }
    }

    #[test]
    fn test_cargo_actions_need_amount() {
        assert_eq!(
            ActionArg::Unload.into_action(None),
            Err(ValidationError::MissingField("amount"))
        );
        assert_eq!(ActionArg::Turbo.into_action(None).unwrap(), VehicleAction::ToggleTurbo);
    }

    #[test]
    fn test_parse_maintenance_add() {
        let cli = Cli::try_parse_from([
            "garage", "-f", "json", "maintenance", "add", "carro1", "--date", "2024-07-01", "-t",
            "Óleo", "--cost", "120",
        ])
        .unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Commands::Maintenance {
                command: MaintenanceCommand::Add { .. }
            }
        ));
    }
}
