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
use std::io;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{error, info};

use crate::bank::AssetSource;
use crate::engine::Engine;
use crate::status::{Notification, Status};

pub use crate::engine::{Action, Input};

pub mod console;
#[cfg(feature = "global")]
pub mod global;

/// How many inputs may queue up before drivers block.
const INPUT_CAPACITY: usize = 64;

/// A source of inputs for the engine.
pub trait Driver: Send + Sync + 'static {
    /// Starts producing inputs. The driver stops when it has nothing left to send
    /// or when the engine goes away.
    fn monitor_events(&self, inputs_tx: Sender<Input>) -> JoinHandle<Result<(), io::Error>>;
}

/// Runs an engine fed by a driver.
pub struct Controller {
    handle: JoinHandle<Result<(), io::Error>>,
    /// Held for presentation actions. Dropped on join.
    inputs_tx: Option<Sender<Input>>,
    notifications: broadcast::Sender<Notification>,
    /// Subscribed before the engine started, handed to the first subscriber.
    first_subscriber: Option<broadcast::Receiver<Notification>>,
    status: watch::Receiver<Status>,
}

impl Controller {
    /// Starts the engine and the driver. Must be called from within a tokio runtime.
    pub fn new(
        engine: Engine,
        assets: Option<Arc<dyn AssetSource>>,
        driver: Arc<dyn Driver>,
    ) -> Controller {
        let (inputs_tx, inputs_rx) = mpsc::channel(INPUT_CAPACITY);
        let notifications = engine.notifier();
        let first_subscriber = Some(notifications.subscribe());
        let status = engine.status();

        let driver_handle = driver.monitor_events(inputs_tx.clone());
        let handle = tokio::spawn(async move {
            engine.run(assets, inputs_rx).await;
            let result = driver_handle.await.map_err(io::Error::other)?;
            match &result {
                Ok(()) => info!("Driver stopped."),
                Err(e) => error!(err = %e, "Driver failed"),
            }
            result
        });

        Controller {
            handle,
            inputs_tx: Some(inputs_tx),
            notifications,
            first_subscriber,
            status,
        }
    }

    /// Subscribes to engine notifications. The first subscriber receives everything
    /// since the controller started; later ones only what follows.
    pub fn subscribe(&mut self) -> broadcast::Receiver<Notification> {
        self.first_subscriber
            .take()
            .unwrap_or_else(|| self.notifications.subscribe())
    }

    /// Watches the engine's status.
    pub fn status(&self) -> watch::Receiver<Status> {
        self.status.clone()
    }

    /// Sends a presentation action to the engine.
    pub async fn act(&self, action: Action) -> Result<(), mpsc::error::SendError<Input>> {
        match &self.inputs_tx {
            Some(inputs_tx) => inputs_tx.send(Input::Action(action)).await,
            None => Err(mpsc::error::SendError(Input::Action(action))),
        }
    }

    /// Waits for the engine to finish. The engine finishes once the driver stops,
    /// and a driver that stopped because it failed is reported as an error.
    pub async fn join(mut self) -> Result<(), Box<dyn Error>> {
        drop(self.inputs_tx.take());
        self.handle.await??;
        Ok(())
    }
}
