// Copyright (C) 2024 Michael Wilson <mike@mdwn.dev>
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

use tracing::{info, warn};

use crate::audio::route::SystemDetector;
use crate::bank::{AssetSource, DirectoryAssets};
use crate::catalog::Catalog;
use crate::controller::Driver;
use crate::dispatcher::Dispatcher;
use crate::engine::Engine;
use crate::playback::Playback;
use crate::session::Session;

mod audio;
mod controller;
mod error;
mod hotkeys;
mod settings;

pub use self::audio::{Audio, RouteGain, DEFAULT_DEVICE, DEFAULT_SAMPLE_RATE};
pub use self::controller::Controller;
pub use self::error::ConfigError;
pub use self::hotkeys::Hotkeys;
pub use self::settings::Settings;

/// Initializes the engine and controller from the given config file and returns the controller.
pub fn init_controller(path: &Path) -> Result<crate::controller::Controller, Box<dyn Error>> {
    let settings = Settings::deserialize(path)?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut session = Session::new(Arc::new(Catalog::builtin()));
    settings.apply(&mut session);
    let dispatcher = Dispatcher::new(settings.hotkeys()?);

    start_controller(
        session,
        dispatcher,
        settings.audio(),
        &settings.assets(&base),
        settings.controller().driver()?,
    )
}

/// Opens the output and starts a controller around a new engine.
///
/// An output that can't be opened is not an error: the engine runs silently and
/// reports why.
pub fn start_controller(
    session: Session,
    dispatcher: Dispatcher,
    audio_config: &Audio,
    assets: &Path,
    driver: Arc<dyn Driver>,
) -> Result<crate::controller::Controller, Box<dyn Error>> {
    let engine = match crate::audio::get_output(audio_config) {
        Ok(output) => {
            info!(output = %output, "Audio output ready.");
            let engine = Engine::new(session, dispatcher, Playback::new(output));
            match audio_config.route_gain() {
                Some(route_gain) => engine.with_route_gain(
                    Arc::new(SystemDetector::new(audio_config.device())),
                    route_gain.clone(),
                ),
                None => engine,
            }
        }
        Err(e) => {
            warn!(err = %e, device = audio_config.device(), "Unable to open audio output");
            Engine::new(session, dispatcher, Playback::silent()).audio_unavailable(&e.to_string())
        }
    };

    let assets: Arc<dyn AssetSource> = Arc::new(DirectoryAssets::new(assets));
    Ok(crate::controller::Controller::new(engine, Some(assets), driver))
}
