// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
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

//! Detects whether the output goes to speakers or headphones.

use std::{fmt, fs, sync::Arc, time::Duration};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, span, warn, Instrument, Level};

/// The ALSA card list.
const CARDS: &str = "/proc/asound/cards";

/// Names that give away headphones or a headset.
const HEADPHONE_HINTS: [&str; 5] = [
    "headphone",
    "headset",
    "usb audio",
    "usb-audio",
    "usb_audio",
];

/// Where the output ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Speakers,
    Headphones,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Speakers => write!(f, "speakers"),
            Route::Headphones => write!(f, "headphones"),
        }
    }
}

/// True when a device name or card list mentions headphones.
pub fn mentions_headphones(text: &str) -> bool {
    let text = text.to_lowercase();
    HEADPHONE_HINTS.iter().any(|hint| text.contains(hint))
}

/// Works out the current route. Detection may block briefly.
pub trait RouteDetector: Send + Sync {
    fn detect(&self) -> Route;
}

/// Detects headphones from the output device's name and the host's sound cards.
pub struct SystemDetector {
    device: String,
}

impl SystemDetector {
    pub fn new(device: &str) -> SystemDetector {
        SystemDetector {
            device: device.to_string(),
        }
    }
}

impl RouteDetector for SystemDetector {
    fn detect(&self) -> Route {
        if mentions_headphones(&self.device) {
            return Route::Headphones;
        }

        match fs::read_to_string(CARDS) {
            Ok(cards) if mentions_headphones(&cards) => Route::Headphones,
            Ok(_) => Route::Speakers,
            Err(e) => {
                debug!(err = %e, path = CARDS, "Unable to read sound cards");
                Route::Speakers
            }
        }
    }
}

/// Polls the detector and publishes the route whenever it changes.
///
/// The first detection happens right away. Polling stops once the receiver is dropped.
pub fn monitor(
    detector: Arc<dyn RouteDetector>,
    interval: Duration,
) -> (watch::Receiver<Option<Route>>, JoinHandle<()>) {
    let (route_tx, route_rx) = watch::channel(None);
    let span = span!(Level::INFO, "route monitor");

    let handle = tokio::spawn(
        async move {
            info!(interval = ?interval, "Watching the output route.");
            let mut ticks = tokio::time::interval(interval);
            loop {
                ticks.tick().await;
                if route_tx.is_closed() {
                    break;
                }

                let detector = detector.clone();
                let route = match tokio::task::spawn_blocking(move || detector.detect()).await {
                    Ok(route) => route,
                    Err(e) => {
                        warn!(err = %e, "Route detection failed");
                        continue;
                    }
                };
                route_tx.send_if_modified(|current| {
                    if *current == Some(route) {
                        return false;
                    }
                    *current = Some(route);
                    true
                });
            }
        }
        .instrument(span),
    );

    (route_rx, handle)
}
