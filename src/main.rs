// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{crate_version, Parser, Subcommand};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use kebord::bank::{self, DirectoryAssets};
use kebord::catalog::{Catalog, Category};
use kebord::config::{self, Audio, Settings};
use kebord::controller::Controller;
use kebord::dispatcher::Dispatcher;
use kebord::generator::{self, Generator};
use kebord::session::Session;
use kebord::status::Notification;
use kebord::{audio, util};

const SYSTEMD_SERVICE: &str = r#"
[Unit]
Description=mechanical keyboard click feedback

[Service]
Type=simple
Restart=on-failure
EnvironmentFile=-%h/.config/default/kebord
ExecStart=/usr/local/bin/kebord start "$KEBORD_CONFIG"

[Install]
WantedBy=default.target
Alias=kebord.service
"#;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Mechanical keyboard clicks for any keyboard."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start will run kebord from a configuration file.
    Start {
        /// The path to the kebord config.
        config_path: PathBuf,
    },
    /// Plays clicks through a device without a configuration file.
    Play {
        /// The device name to play through. "default" picks the host's default output.
        device_name: String,
        /// The directory holding the sound files.
        assets: PathBuf,
        /// Where key events come from: global or console.
        #[arg(short, long)]
        driver: Option<config::Controller>,
        /// The profile to start with.
        #[arg(short, long)]
        profile: Option<String>,
        /// The starting volume in [0, 1].
        #[arg(short, long)]
        volume: Option<f32>,
        /// Start with clicks enabled.
        #[arg(short, long)]
        enabled: bool,
    },
    /// Lists the sound profiles and, given an asset directory, verifies they load.
    Profiles {
        /// The directory holding the sound files.
        #[arg(short, long)]
        assets: Option<PathBuf>,
    },
    /// Lists the available audio output devices.
    Devices {},
    /// Synthesizes sound files for the profiles.
    Generate {
        /// The profile to generate, or "all".
        #[arg(short, long, default_value = "all")]
        profile: String,
        /// Sound duration in seconds.
        #[arg(short, long, default_value_t = generator::DEFAULT_DURATION)]
        duration: f32,
        /// Base frequency in Hz.
        #[arg(short, long, default_value_t = generator::DEFAULT_FREQUENCY)]
        frequency: f32,
        /// The output directory.
        #[arg(short, long, default_value = "assets")]
        output: PathBuf,
    },
    /// Prints a default configuration to stdout.
    Config {},
    /// Prints a systemd user service definition to stdout.
    Systemd {},
}

/// Prints notifications until the engine goes away.
fn present(controller: &mut Controller) {
    let mut notifications = controller.subscribe();
    tokio::spawn(async move {
        loop {
            match notifications.recv().await {
                Ok(notification) => print_notification(&notification),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return,
            }
        }
    });
}

fn print_notification(notification: &Notification) {
    println!("{}", notification);
}

async fn list_profiles(assets: Option<&Path>) {
    let catalog = Arc::new(Catalog::builtin());

    let Some(assets) = assets else {
        for category in [
            Category::Classic,
            Category::Mechanical,
            Category::Vintage,
            Category::Special,
        ] {
            println!("{}:", category);
            for profile in catalog.profiles().iter().filter(|p| p.category() == category) {
                println!("- {}: {}", profile.id(), profile.label());
            }
        }
        return;
    };

    let report = bank::load(
        catalog.clone(),
        Arc::new(DirectoryAssets::new(assets)),
        config::DEFAULT_SAMPLE_RATE,
    )
    .await;

    println!(
        "Profiles in {} (loaded {}/{}):",
        assets.display(),
        report.loaded(),
        report.total()
    );
    for (id, sound) in report.bank.slots() {
        match sound {
            Some(sound) => println!("- {}: {} ms", id, sound.duration().as_millis()),
            None => {
                let reason = report
                    .failures
                    .iter()
                    .find(|(failed, _)| failed == id)
                    .map(|(_, e)| e.to_string())
                    .unwrap_or_default();
                println!("- {}: unavailable ({})", id, reason);
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start { config_path } => {
            let mut controller = config::init_controller(&config_path)?;
            present(&mut controller);
            controller.join().await?;
        }
        Commands::Play {
            device_name,
            assets,
            driver,
            profile,
            volume,
            enabled,
        } => {
            let mut session = Session::new(Arc::new(Catalog::builtin()));
            if let Some(profile) = profile {
                if !session.set_profile(&profile) {
                    return Err(format!("unknown profile {}", profile).into());
                }
            }
            if let Some(volume) = volume {
                if !session.set_volume(volume) {
                    return Err(format!("invalid volume {}", volume).into());
                }
            }
            session.set_enabled(enabled);

            let driver = driver.unwrap_or_default();
            let mut controller = config::start_controller(
                session,
                Dispatcher::new(driver.default_hotkeys()),
                &Audio::new(&device_name),
                &assets,
                driver.driver()?,
            )?;
            present(&mut controller);
            controller.join().await?;
        }
        Commands::Profiles { assets } => list_profiles(assets.as_deref()).await,
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Generate {
            profile,
            duration,
            frequency,
            output,
        } => {
            let catalog = Catalog::builtin();
            let generator = Generator::new(generator::DEFAULT_SAMPLE_RATE, duration, frequency)?;
            let paths = if profile == "all" {
                generator.generate_all(&catalog, &output)?
            } else {
                let profile = catalog
                    .get(&profile)
                    .ok_or_else(|| format!("unknown profile {}", profile))?;
                vec![generator.generate(profile, &output)?]
            };

            println!("Generated {} sounds in {}:", paths.len(), output.display());
            for path in paths {
                println!("- {}", util::filename_display(&path));
            }
        }
        Commands::Config {} => {
            print!("{}", serde_yml::to_string(&Settings::default())?);
        }
        Commands::Systemd {} => {
            println!("{}", SYSTEMD_SERVICE)
        }
    }

    Ok(())
}
