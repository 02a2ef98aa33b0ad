use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use equipment::drivers::printserver::{PrintServerApi, PrintServerSettings, DEFAULT_PORT};
use equipment::drivers::DriverKind;
use equipment::model::{EquipmentResponse, Task};
use equipment::services::{ConfigService, Profile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Drive receipt printers and cash registers
#[derive(Parser)]
#[command(name = "equipment")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.equipment/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a task list from a JSON file
    Print {
        /// Saved profile (default profile when omitted)
        #[arg(long)]
        profile: Option<String>,

        /// JSON file with a task array or {"taskTable": [...]}
        #[arg(long)]
        tasks: PathBuf,
    },

    /// Print a single test line
    TestPrint {
        #[arg(long)]
        profile: Option<String>,
    },

    /// Manage saved driver profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Query a print server directly
    Server {
        /// Server address, with or without scheme
        host: String,

        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,

        #[command(subcommand)]
        command: ServerCommand,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Add or replace a profile
    Set {
        name: String,

        #[arg(long, value_enum)]
        kind: DriverKind,

        /// Driver settings as JSON
        #[arg(long)]
        settings: String,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },

    /// List saved profiles
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ServerCommand {
    /// Check the server answers
    Hi,
    /// Server version
    Version,
    /// Supported device types
    Devices,
    /// Models and drivers for a device type
    Models { type_id: i32 },
    /// Settings schema of a driver
    Settings { driver_id: String },
    /// Taxes known to the device behind compressed settings
    Taxes { setting_zip: String },
    /// Expand compressed settings back into editable form
    Extract { setting_zip: String },
    /// Build compressed settings for a driver, optionally saving a profile
    Configure {
        driver_id: String,

        /// Device type the driver belongs to
        #[arg(long)]
        type_id: i32,

        /// Setting override, repeatable
        #[arg(long = "set", value_name = "ID=VALUE", value_parser = parse_setting)]
        edits: Vec<(String, String)>,

        /// Save the result as a print-server profile with this name
        #[arg(long)]
        save: Option<String>,
    },
}

fn parse_setting(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => {
            Ok((id.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected ID=VALUE, got '{}'", raw)),
    }
}

/// Task files come either bare or wrapped like the print server request
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskFile {
    Bare(Vec<Task>),
    Table {
        #[serde(rename = "taskTable")]
        task_table: Vec<Task>,
    },
}

pub fn load_tasks(path: &Path) -> anyhow::Result<Vec<Task>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let file: TaskFile = serde_json::from_str(&content)
        .with_context(|| format!("Invalid task file {}", path.display()))?;
    Ok(match file {
        TaskFile::Bare(tasks) => tasks,
        TaskFile::Table { task_table } => task_table,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report(response: &EquipmentResponse) -> anyhow::Result<()> {
    if response.is_success() {
        println!("OK");
        return Ok(());
    }
    let code = response
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| response.result_code.to_string());
    bail!("{} ({})", response.result_info, code)
}

impl Cli {
    fn config_service(&self) -> anyhow::Result<ConfigService> {
        match &self.config {
            Some(path) => Ok(ConfigService::with_path(path.clone())),
            None => Ok(ConfigService::new()?),
        }
    }

    /// Run one job and release the device; the process exits right after
    fn execute(&self, profile: Option<&str>, tasks: &[Task]) -> anyhow::Result<()> {
        let config = self.config_service()?.load()?;
        let profile = config.profile(profile)?;
        let mut driver = profile.open()?;
        info!("Executing {} task(s) with {}", tasks.len(), driver.name());
        report(&driver.execute(tasks, true)?)
    }

    pub fn run(self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Print { profile, tasks } => {
                let tasks = load_tasks(tasks)?;
                self.execute(profile.as_deref(), &tasks)
            }
            Commands::TestPrint { profile } => {
                self.execute(profile.as_deref(), &[Task::text("Test print")])
            }
            Commands::Profile { command } => self.run_profile(command),
            Commands::Server {
                host,
                port,
                command,
            } => self.run_server(host, *port, command),
        }
    }

    fn run_server(&self, host: &str, port: u16, command: &ServerCommand) -> anyhow::Result<()> {
        let api = PrintServerApi::new(host, port)?;
        match command {
            ServerCommand::Hi => print_json(&api.hi()?),
            ServerCommand::Version => print_json(&api.version()?),
            ServerCommand::Devices => print_json(&api.device_types()?),
            ServerCommand::Models { type_id } => print_json(&api.models(*type_id)?),
            ServerCommand::Settings { driver_id } => print_json(&api.device_settings(driver_id)?),
            ServerCommand::Taxes { setting_zip } => print_json(&api.taxes(setting_zip)?),
            ServerCommand::Extract { setting_zip } => {
                print_json(&api.extract_device_settings(setting_zip)?)
            }
            ServerCommand::Configure {
                driver_id,
                type_id,
                edits,
                save,
            } => {
                let setting_zip = api.configure(driver_id, *type_id, edits)?;
                println!("{}", setting_zip);
                if let Some(name) = save {
                    let settings = PrintServerSettings {
                        url: host.to_string(),
                        port,
                        setting_zip,
                    };
                    let profile = Profile {
                        kind: DriverKind::PrintServer,
                        settings: serde_json::to_value(&settings)?,
                    };
                    let service = self.config_service()?;
                    service.update(|config| config.set_profile(name, profile))?;
                    eprintln!("Saved profile '{}' in {}", name, service.path().display());
                }
                Ok(())
            }
        }
    }

    fn run_profile(&self, command: &ProfileCommand) -> anyhow::Result<()> {
        let service = self.config_service()?;
        match command {
            ProfileCommand::Set {
                name,
                kind,
                settings,
                default,
            } => {
                let settings: serde_json::Value =
                    serde_json::from_str(settings).context("Settings must be valid JSON")?;
                let profile = Profile {
                    kind: *kind,
                    settings,
                };
                // fail before saving a profile the driver cannot read
                profile.open()?;
                service.update(|config| {
                    config.set_profile(name, profile);
                    if *default {
                        config.default_profile = Some(name.clone());
                    }
                })?;
                println!("Saved profile '{}' in {}", name, service.path().display());
                Ok(())
            }
            ProfileCommand::List { json } => {
                let config = service.load()?;
                if *json {
                    return print_json(&config.profiles);
                }
                if config.profiles.is_empty() {
                    println!("No profiles");
                }
                for (name, profile) in &config.profiles {
                    let marker = if config.default_profile.as_deref() == Some(name.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    println!("{} {:<20} {}", marker, name, profile.kind);
                }
                Ok(())
            }
        }
    }
}
