//! Radview CLI - command-line client for the radon monitoring platform.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing::debug;

/// Radview CLI - manage your radon sensors and dashboards.
#[derive(Parser)]
#[command(name = "radview")]
#[command(about = "Radview client for radon sensor monitoring")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login,

    /// Logout and clear the stored session
    Logout,

    /// Register a new account
    Register,

    /// Check authentication status
    Status,

    /// Manage radon sensors
    Devices {
        #[command(subcommand)]
        command: DeviceCommands,
    },

    /// Show the dashboard for a sensor
    Dashboard {
        /// EUI-64 serial number
        serial_number: String,
    },

    /// Manage the user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Password management
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },
}

#[derive(Subcommand)]
enum DeviceCommands {
    /// List registered sensors
    List,
    /// Register a sensor to this account
    Add {
        /// Display name
        name: String,
        /// EUI-64 serial number
        serial_number: String,
    },
    /// Show one sensor
    Show {
        /// Device id
        id: i64,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update address, phone, or alert emails
    Update {
        /// New postal address
        #[arg(long)]
        address: Option<String>,
        /// New phone number
        #[arg(long)]
        phone: Option<String>,
        /// Enable or disable threshold alert emails
        #[arg(long)]
        alert_emails: Option<bool>,
    },
}

#[derive(Subcommand)]
enum PasswordCommands {
    /// Change the password of the logged-in account
    Change,
    /// Request a password reset email
    Reset {
        /// Account email
        email: String,
    },
    /// Confirm a password reset with the emailed link parts
    Confirm {
        /// The uid from the reset link
        uid: String,
        /// The token from the reset link
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    radview_config::init_logging(&cli.log_level);

    let app = commands::build_app()?;
    debug!(api_base_url = %app.config.api_base_url, "Client configured");
    let format = cli.format;

    match cli.command {
        Commands::Login => commands::auth::login(&app, &format).await?,
        Commands::Logout => commands::auth::logout(&app, &format)?,
        Commands::Register => commands::auth::register(&app, &format).await?,
        Commands::Status => commands::auth::status(&app, &format).await?,
        Commands::Devices { command } => match command {
            DeviceCommands::List => commands::devices::list(&app, &format).await?,
            DeviceCommands::Add {
                name,
                serial_number,
            } => commands::devices::add(&app, &name, &serial_number, &format).await?,
            DeviceCommands::Show { id } => commands::devices::show(&app, id, &format).await?,
        },
        Commands::Dashboard { serial_number } => {
            commands::devices::dashboard(&app, &serial_number, &format).await?
        }
        Commands::Profile { command } => match command {
            ProfileCommands::Show => commands::profile::show(&app, &format).await?,
            ProfileCommands::Update {
                address,
                phone,
                alert_emails,
            } => commands::profile::update(&app, address, phone, alert_emails, &format).await?,
        },
        Commands::Password { command } => match command {
            PasswordCommands::Change => commands::profile::change_password(&app, &format).await?,
            PasswordCommands::Reset { email } => {
                commands::profile::reset(&app, &email, &format).await?
            }
            PasswordCommands::Confirm { uid, token } => {
                commands::profile::confirm_reset(&app, &uid, &token, &format).await?
            }
        },
    }

    Ok(())
}
