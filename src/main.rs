//! elecam - command-line front end for the action camera controller
//!
//! ```bash
//! elecam configure --stream-url http://192.168.1.254:8192 --host 192.168.1.254
//! elecam photo
//! elecam record start
//! elecam mode photo
//! elecam test --host 192.168.1.254 --port 8080
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use elecam_control::{
    camera_controller::CommandOutcome,
    command_client::CommandResult,
    settings_store::{CameraSettings, DEFAULT_COMMAND_PORT},
    state::{AppConfig, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "elecam")]
#[command(about = "Control a network-attached action camera")]
struct Args {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save camera connection settings
    Configure {
        /// Video stream address
        #[arg(long)]
        stream_url: String,
        /// Command endpoint hostname or IP
        #[arg(long)]
        host: String,
        /// Command endpoint port
        #[arg(long, default_value_t = DEFAULT_COMMAND_PORT)]
        port: u16,
    },
    /// Show saved settings and controller state
    Show,
    /// Take a photo
    Photo,
    /// Start or stop recording
    Record {
        #[arg(value_enum)]
        action: RecordAction,
    },
    /// Switch capture mode
    Mode {
        #[arg(value_enum)]
        mode: CaptureMode,
    },
    /// Test the connection (defaults to the saved settings)
    Test {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RecordAction {
    Start,
    Stop,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CaptureMode {
    Record,
    Photo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "elecam_control=info,elecam=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = AppConfig::default();
    tracing::debug!(
        settings_path = %config.settings_path.display(),
        command_timeout_secs = config.command_timeout.as_secs(),
        "Configuration loaded"
    );

    let state = AppState::initialize(config).await?;
    let controller = &state.controller;

    match args.command {
        Command::Configure {
            stream_url,
            host,
            port,
        } => {
            let settings = CameraSettings {
                stream_url,
                command_host: host,
                command_port: port,
            };
            controller
                .update_camera_settings(settings)
                .await
                .context("saving camera settings")?;
            println!("Settings saved to {}", state.settings_store.path().display());
        }
        Command::Show => {
            let snapshot = controller.state();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                match &snapshot.settings {
                    Some(s) => {
                        println!("stream url:   {}", s.stream_url);
                        println!("command host: {}", s.command_host);
                        println!("command port: {}", s.command_port);
                    }
                    None => println!("Camera is not configured (run `elecam configure`)"),
                }
            }
        }
        Command::Photo => report(controller.take_photo().await, args.json)?,
        Command::Record { action } => {
            let outcome = match action {
                RecordAction::Start => controller.start_recording().await,
                RecordAction::Stop => controller.stop_recording().await,
            };
            report(outcome, args.json)?
        }
        Command::Mode { mode } => {
            let outcome = controller
                .set_record_mode(matches!(mode, CaptureMode::Record))
                .await;
            report(outcome, args.json)?
        }
        Command::Test { host, port } => {
            let saved = controller.state().settings;
            let settings = match (saved, host) {
                (saved, Some(host)) => CameraSettings {
                    stream_url: saved
                        .as_ref()
                        .map(|s| s.stream_url.clone())
                        .unwrap_or_else(|| format!("http://{}", host)),
                    command_port: port
                        .or(saved.as_ref().map(|s| s.command_port))
                        .unwrap_or(DEFAULT_COMMAND_PORT),
                    command_host: host,
                },
                (Some(saved), None) => CameraSettings {
                    command_port: port.unwrap_or(saved.command_port),
                    ..saved
                },
                (None, None) => bail!("Camera is not configured; pass --host or run `elecam configure`"),
            };
            let result = controller.test_camera_connection(settings).await;
            print_result(&result, args.json)?;
            if !result.success {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn report(outcome: CommandOutcome, json: bool) -> anyhow::Result<()> {
    match outcome {
        CommandOutcome::Completed(result) => {
            print_result(&result, json)?;
            if !result.success {
                std::process::exit(1);
            }
        }
        CommandOutcome::Busy => println!("Another command is in progress"),
        CommandOutcome::SettingsRequired => {
            eprintln!("Camera settings are missing or invalid; run `elecam configure`");
            std::process::exit(2);
        }
    }
    Ok(())
}

fn print_result(result: &CommandResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else {
        let status = if result.success { "OK" } else { "FAILED" };
        println!("{}: {}", status, result.message.as_deref().unwrap_or_default());
    }
    Ok(())
}
