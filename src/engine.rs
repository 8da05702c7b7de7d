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

//! The session event loop.
//!
//! The engine owns the session, the sound bank and the playback engine. All of them
//! are only touched from the engine's own task, so none of them need locks.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, info, span, warn, Instrument, Level};

use crate::audio::route::{self, Route, RouteDetector};
use crate::bank::{self, AssetSource, LoadReport, SoundBank};
use crate::catalog::Catalog;
use crate::config::RouteGain;
use crate::dispatcher::{Command, Dispatch, Dispatcher};
use crate::keys::KeyEvent;
use crate::playback::Playback;
use crate::session::Session;
use crate::status::{BankStatus, Notification, Status};

/// Capacity of the notification channel. Slow subscribers skip old notifications.
const NOTIFICATION_CAPACITY: usize = 64;

/// Requests from the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Selects a profile and previews it when enabled.
    SelectProfile(String),
    SetEnabled(bool),
    ToggleEnabled,
    SetVolume(f32),
    /// Plays the current profile once.
    TestSound,
}

/// Everything the engine consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Key(KeyEvent),
    Action(Action),
}

/// Scales playback by the detected output route.
struct Routing {
    detector: Arc<dyn RouteDetector>,
    gain: RouteGain,
    current: Option<Route>,
}

/// The state of the bank as seen by the engine.
enum BankState {
    Loading,
    Ready(SoundBank),
}

pub struct Engine {
    catalog: Arc<Catalog>,
    session: Session,
    dispatcher: Dispatcher,
    playback: Playback,
    bank: BankState,
    /// Set when no output could be opened.
    unavailable: Option<String>,
    routing: Option<Routing>,
    notifications: broadcast::Sender<Notification>,
    status: watch::Sender<Status>,
}

impl Engine {
    /// Creates an engine. The bank starts out loading.
    pub fn new(session: Session, dispatcher: Dispatcher, playback: Playback) -> Engine {
        let catalog = session.catalog().clone();
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (status, _) = watch::channel(Status {
            profile: session.profile().to_string(),
            enabled: session.enabled(),
            volume: session.volume(),
            bank: BankStatus::Loading,
            silent: playback.is_silent(),
            route: None,
        });

        Engine {
            catalog,
            session,
            dispatcher,
            playback,
            bank: BankState::Loading,
            unavailable: None,
            routing: None,
            notifications,
            status,
        }
    }

    /// Marks the audio output as unavailable. The engine will run silently and
    /// announce the reason once when it starts.
    pub fn audio_unavailable(mut self, reason: &str) -> Engine {
        self.playback = Playback::silent();
        self.unavailable = Some(reason.to_string());
        self.publish_status();
        self
    }

    /// Scales playback by whether the output goes to speakers or headphones. The
    /// detector is polled while the engine runs.
    pub fn with_route_gain(mut self, detector: Arc<dyn RouteDetector>, gain: RouteGain) -> Engine {
        self.routing = Some(Routing {
            detector,
            gain,
            current: None,
        });
        self
    }

    /// Subscribes to notifications. Receivers only see notifications sent after they subscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// A sender that can be used to subscribe later.
    pub fn notifier(&self) -> broadcast::Sender<Notification> {
        self.notifications.clone()
    }

    /// Watches the status snapshot.
    pub fn status(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn snapshot(&self) -> Status {
        Status {
            profile: self.session.profile().to_string(),
            enabled: self.session.enabled(),
            volume: self.session.volume(),
            bank: match &self.bank {
                BankState::Loading => BankStatus::Loading,
                BankState::Ready(bank) => BankStatus::Ready {
                    loaded: bank.loaded(),
                    total: bank.total(),
                },
            },
            silent: self.playback.is_silent(),
            route: self.routing.as_ref().and_then(|routing| routing.current),
        }
    }

    fn publish_status(&self) {
        self.status.send_replace(self.snapshot());
    }

    fn notify(&self, notification: Notification) {
        info!(%notification, "Notification.");
        // No subscribers is fine.
        let _ = self.notifications.send(notification);
    }

    /// Runs the loop until every input sender is gone.
    ///
    /// The bank is loaded from the asset source in the background of the loop. Without an
    /// output (or without assets) nothing is loaded and the bank is empty.
    pub async fn run(
        mut self,
        assets: Option<Arc<dyn AssetSource>>,
        mut inputs: mpsc::Receiver<Input>,
    ) {
        let span = span!(Level::INFO, "engine");

        async move {
            info!(
                profile = self.session.profile(),
                enabled = self.session.enabled(),
                volume = self.session.volume(),
                "Engine started."
            );

            if let Some(reason) = self.unavailable.clone() {
                self.notify(Notification::AudioUnavailable { reason });
            }

            let catalog = self.catalog.clone();
            let sample_rate = self.playback.sample_rate();
            let loading = async move {
                match (assets, sample_rate) {
                    (Some(assets), Some(sample_rate)) => {
                        Some(bank::load(catalog, assets, sample_rate).await)
                    }
                    _ => None,
                }
            };
            tokio::pin!(loading);
            let mut loading_done = false;

            let (mut route_rx, route_task) = match &self.routing {
                Some(routing) if !self.playback.is_silent() => {
                    let (route_rx, task) =
                        route::monitor(routing.detector.clone(), routing.gain.poll_interval());
                    (route_rx, Some(task))
                }
                _ => (watch::channel(None).1, None),
            };
            let mut routing = route_task.is_some();

            loop {
                tokio::select! {
                    report = &mut loading, if !loading_done => {
                        loading_done = true;
                        self.finish_loading(report);
                    }
                    changed = route_rx.changed(), if routing => match changed {
                        Ok(()) => {
                            let route = *route_rx.borrow_and_update();
                            if let Some(route) = route {
                                self.apply_route(route);
                            }
                        }
                        Err(_) => routing = false,
                    },
                    input = inputs.recv() => match input {
                        Some(input) => self.handle_input(input),
                        None => break,
                    },
                }
            }

            if let Some(task) = route_task {
                task.abort();
            }
            info!("Engine closing.");
        }
        .instrument(span)
        .await
    }

    /// Installs the result of loading the bank. None means nothing was loaded.
    pub fn finish_loading(&mut self, report: Option<LoadReport>) {
        match report {
            Some(report) => {
                let (loaded, total) = (report.loaded(), report.total());
                self.bank = BankState::Ready(report.bank);
                self.notify(Notification::AssetsReady { loaded, total });
            }
            None => {
                debug!("No sounds loaded, running silently.");
                self.bank = BankState::Ready(SoundBank::empty(self.catalog.clone()));
            }
        }
        self.publish_status();
    }

    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Key(event) => {
                self.handle_key(&event);
            }
            Input::Action(action) => self.apply_action(action),
        }
    }

    /// Dispatches a key event and applies the resulting command.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Dispatch {
        let dispatch = self.dispatcher.dispatch(event, &self.session);
        if let Some(command) = &dispatch.command {
            self.apply_command(command);
        }
        dispatch
    }

    fn apply_command(&mut self, command: &Command) {
        match command {
            Command::Toggle => self.toggle_enabled(),
            Command::NextProfile => {
                self.session.next_profile();
                self.profile_changed();
            }
            Command::PreviousProfile => {
                self.session.previous_profile();
                self.profile_changed();
            }
            Command::Trigger(request) => {
                self.play(&request.profile, request.gain);
            }
        }
    }

    /// Applies a presentation action.
    pub fn apply_action(&mut self, action: Action) {
        debug!(action = ?action, "Applying action.");
        match action {
            Action::SelectProfile(id) => {
                if !self.session.set_profile(&id) {
                    warn!(profile = id, "Unknown profile");
                    return;
                }
                self.profile_changed();
                if self.session.enabled() {
                    let current = self.session.profile().to_string();
                    self.play(&current, self.session.volume());
                }
            }
            Action::SetEnabled(enabled) => {
                if self.session.enabled() != enabled {
                    self.session.set_enabled(enabled);
                    self.notify(Notification::EnabledChanged(enabled));
                    self.publish_status();
                }
            }
            Action::ToggleEnabled => self.toggle_enabled(),
            Action::SetVolume(volume) => {
                if !self.session.set_volume(volume) {
                    warn!(volume, "Ignoring invalid volume");
                    return;
                }
                self.notify(Notification::VolumeChanged(self.session.volume()));
                self.publish_status();
            }
            Action::TestSound => {
                if !self.session.enabled() {
                    return;
                }
                let current = self.session.profile().to_string();
                if !self.is_loaded(&current) {
                    self.notify(Notification::SoundUnavailable { id: current });
                    return;
                }
                self.play(&current, self.session.volume());
            }
        }
    }

    /// Applies the output gain for a route. Only changes are announced.
    pub fn apply_route(&mut self, route: Route) {
        let Some(routing) = self.routing.as_mut() else {
            debug!(%route, "Route gain is off, ignoring route.");
            return;
        };
        if routing.current == Some(route) {
            return;
        }

        routing.current = Some(route);
        let gain = routing.gain.gain(route);
        self.playback.set_output_gain(gain);
        self.notify(Notification::RouteChanged { route, gain });
        self.publish_status();
    }

    fn toggle_enabled(&mut self) {
        let enabled = self.session.toggle_enabled();
        self.notify(Notification::EnabledChanged(enabled));
        self.publish_status();
    }

    fn profile_changed(&mut self) {
        let id = self.session.profile().to_string();
        let label = self
            .catalog
            .get(&id)
            .map(|profile| profile.label().to_string())
            .unwrap_or_default();
        self.notify(Notification::ProfileChanged { id, label });
        self.publish_status();
    }

    fn is_loaded(&self, id: &str) -> bool {
        match &self.bank {
            BankState::Loading => false,
            BankState::Ready(bank) => bank.is_loaded(id),
        }
    }

    /// Plays the profile's sound if the bank is ready and holds it.
    fn play(&self, id: &str, gain: f32) -> bool {
        match &self.bank {
            BankState::Loading => false,
            BankState::Ready(bank) => self.playback.play(bank.get(id), gain),
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("session", &self.session)
            .field("playback", &self.playback)
            .field("status", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use super::*;
    use crate::audio::mock;
    use crate::bank::{LoadedSound, MemoryAssets};
    use crate::catalog::test_catalog;
    use crate::keys::Modifiers;
    use crate::testutil::write_wav;

    /// A bank where each loaded profile's sound has a distinct frame count.
    fn bank_with(catalog: &Arc<Catalog>, loaded: &[(&str, usize)]) -> LoadReport {
        let mut bank = SoundBank::empty(catalog.clone());
        for (id, frames) in loaded {
            bank.insert(id, LoadedSound::new(vec![0.1; *frames], 1, 44100));
        }
        LoadReport {
            bank,
            failures: Vec::new(),
        }
    }

    fn engine(ids: &[&str], loaded: &[(&str, usize)]) -> (Engine, mock::Output) {
        let catalog = Arc::new(test_catalog(ids));
        let output = mock::Output::get("mock", 44100);
        let mut engine = Engine::new(
            Session::new(catalog.clone()),
            Dispatcher::default(),
            Playback::new(Arc::new(output.clone())),
        );
        engine.finish_loading(Some(bank_with(&catalog, loaded)));
        (engine, output)
    }

    /// Always reports the same route.
    struct FixedRoute(Route);

    impl RouteDetector for FixedRoute {
        fn detect(&self) -> Route {
            self.0
        }
    }

    fn next_profile() -> KeyEvent {
        KeyEvent::new("ArrowUp").with_modifiers(Modifiers::SHIFT)
    }

    #[test]
    fn test_end_to_end_sequence() {
        let (mut engine, output) = engine(&["a", "b", "c"], &[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!("a", engine.session().profile());
        assert!(!engine.session().enabled());

        engine.handle_key(&KeyEvent::new("Space"));
        assert!(engine.session().enabled());

        engine.handle_key(&KeyEvent::new("KeyX"));
        engine.handle_key(&next_profile());
        assert_eq!("b", engine.session().profile());

        engine.handle_key(&KeyEvent::new("KeyY"));
        engine.handle_key(&next_profile());
        assert_eq!("c", engine.session().profile());
        engine.handle_key(&next_profile());
        assert_eq!("a", engine.session().profile());

        assert_eq!(
            vec![
                mock::Play {
                    frames: 1,
                    channels: 1,
                    gain: 0.5
                },
                mock::Play {
                    frames: 2,
                    channels: 1,
                    gain: 0.5
                },
            ],
            output.plays()
        );
    }

    #[test]
    fn test_disabled_never_plays() {
        let (mut engine, output) = engine(&["a"], &[("a", 1)]);
        for _ in 0..20 {
            engine.handle_key(&KeyEvent::new("KeyQ"));
        }
        assert_eq!(0, output.play_count());
    }

    #[test]
    fn test_one_play_per_key_at_volume() {
        let (mut engine, output) = engine(&["a"], &[("a", 1)]);
        engine.apply_action(Action::SetEnabled(true));
        engine.apply_action(Action::SetVolume(0.25));

        for code in ["KeyA", "KeyB", "Enter", "ArrowUp"] {
            engine.handle_key(&KeyEvent::new(code));
        }
        let plays = output.plays();
        assert_eq!(4, plays.len());
        assert!(plays.iter().all(|play| play.gain == 0.25));
    }

    #[test]
    fn test_repeats_never_play_or_toggle() {
        let (mut engine, output) = engine(&["a"], &[("a", 1)]);

        engine.handle_key(&KeyEvent::new("Space").repeated());
        assert!(!engine.session().enabled());

        engine.apply_action(Action::SetEnabled(true));
        engine.handle_key(&KeyEvent::new("Space").repeated());
        engine.handle_key(&KeyEvent::new("KeyA").repeated());
        assert!(engine.session().enabled());
        assert_eq!(0, output.play_count());
    }

    #[test]
    fn test_text_entry_is_ignored() {
        let (mut engine, output) = engine(&["a"], &[("a", 1)]);
        engine.apply_action(Action::SetEnabled(true));

        let dispatch = engine.handle_key(&KeyEvent::new("Space").in_text_entry());
        assert!(!dispatch.consumed);
        engine.handle_key(&KeyEvent::new("KeyA").in_text_entry());
        assert!(engine.session().enabled());
        assert_eq!(0, output.play_count());
    }

    #[test]
    fn test_missing_sound_is_silent() {
        let (mut engine, output) = engine(&["a", "b"], &[("a", 1)]);
        engine.apply_action(Action::SetEnabled(true));

        engine.apply_action(Action::SelectProfile("b".to_string()));
        engine.handle_key(&KeyEvent::new("KeyA"));
        assert_eq!("b", engine.session().profile());
        assert_eq!(0, output.play_count());
    }

    #[test]
    fn test_select_profile_previews_when_enabled() {
        let (mut engine, output) = engine(&["a", "b"], &[("a", 1), ("b", 2)]);

        engine.apply_action(Action::SelectProfile("b".to_string()));
        assert_eq!(0, output.play_count());

        engine.apply_action(Action::SetEnabled(true));
        engine.apply_action(Action::SelectProfile("a".to_string()));
        assert_eq!(1, output.plays()[0].frames);

        engine.apply_action(Action::SelectProfile("zzz".to_string()));
        assert_eq!("a", engine.session().profile());
        assert_eq!(1, output.play_count());
    }

    #[test]
    fn test_test_sound() {
        let (mut engine, output) = engine(&["a", "b"], &[("a", 1)]);
        let mut notifications = engine.subscribe();

        engine.apply_action(Action::TestSound);
        assert_eq!(0, output.play_count());

        engine.apply_action(Action::SetEnabled(true));
        engine.apply_action(Action::TestSound);
        assert_eq!(1, output.play_count());

        engine.apply_action(Action::SelectProfile("b".to_string()));
        engine.apply_action(Action::TestSound);
        assert_eq!(1, output.play_count());

        let mut received = Vec::new();
        while let Ok(notification) = notifications.try_recv() {
            received.push(notification);
        }
        assert_eq!(
            Some(&Notification::SoundUnavailable {
                id: "b".to_string()
            }),
            received.last()
        );
    }

    #[test]
    fn test_nothing_plays_while_loading() {
        let catalog = Arc::new(test_catalog(&["a"]));
        let output = mock::Output::get("mock", 44100);
        let mut engine = Engine::new(
            Session::new(catalog),
            Dispatcher::default(),
            Playback::new(Arc::new(output.clone())),
        );

        engine.handle_key(&KeyEvent::new("Space"));
        engine.handle_key(&next_profile());
        engine.handle_key(&KeyEvent::new("KeyA"));
        assert!(engine.session().enabled());
        assert_eq!(0, output.play_count());
        assert_eq!(BankStatus::Loading, engine.status().borrow().bank);
    }

    #[test]
    fn test_status_tracks_changes() {
        let (mut engine, _output) = engine(&["a", "b"], &[("a", 1)]);
        let status = engine.status();

        engine.handle_key(&KeyEvent::new("Space"));
        engine.apply_action(Action::SetVolume(1.7));
        engine.handle_key(&next_profile());

        let status = status.borrow();
        assert_eq!("b", status.profile);
        assert!(status.enabled);
        assert_eq!(1.0, status.volume);
        assert_eq!(BankStatus::Ready { loaded: 1, total: 2 }, status.bank);
        assert!(!status.silent);
    }

    #[test]
    fn test_route_gain() {
        let (engine, output) = engine(&["a"], &[("a", 1)]);
        let mut engine = engine.with_route_gain(
            Arc::new(FixedRoute(Route::Speakers)),
            RouteGain::default(),
        );
        let mut notifications = engine.subscribe();
        engine.apply_action(Action::SetEnabled(true));

        engine.apply_route(Route::Headphones);
        engine.apply_route(Route::Headphones);
        engine.handle_key(&KeyEvent::new("KeyA"));
        assert_eq!(Some(Route::Headphones), engine.status().borrow().route);

        engine.apply_route(Route::Speakers);
        engine.handle_key(&KeyEvent::new("KeyB"));

        let gains: Vec<f32> = output.plays().iter().map(|play| play.gain).collect();
        assert_eq!(2, gains.len());
        assert!((gains[0] - 0.05).abs() < 1e-6);
        assert!((gains[1] - 0.4).abs() < 1e-6);

        assert_eq!(
            Notification::EnabledChanged(true),
            notifications.try_recv().unwrap()
        );
        assert_eq!(
            Notification::RouteChanged {
                route: Route::Headphones,
                gain: 0.1
            },
            notifications.try_recv().unwrap()
        );
        assert_eq!(
            Notification::RouteChanged {
                route: Route::Speakers,
                gain: 0.8
            },
            notifications.try_recv().unwrap()
        );
        assert!(notifications.try_recv().is_err());
    }

    #[test]
    fn test_route_ignored_without_route_gain() {
        let (mut engine, output) = engine(&["a"], &[("a", 1)]);
        let mut notifications = engine.subscribe();
        engine.apply_action(Action::SetEnabled(true));

        engine.apply_route(Route::Headphones);
        engine.handle_key(&KeyEvent::new("KeyA"));

        assert_eq!(0.5, output.plays()[0].gain);
        assert_eq!(None, engine.status().borrow().route);
        assert_eq!(
            Notification::EnabledChanged(true),
            notifications.try_recv().unwrap()
        );
        assert!(notifications.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_detects_headphones() -> Result<(), Box<dyn Error>> {
        let catalog = Arc::new(test_catalog(&["a"]));
        let output = mock::Output::get("mock", 44100);
        let mut session = Session::new(catalog);
        session.set_enabled(true);
        let engine = Engine::new(
            session,
            Dispatcher::default(),
            Playback::new(Arc::new(output.clone())),
        )
        .with_route_gain(
            Arc::new(FixedRoute(Route::Headphones)),
            RouteGain::default(),
        );
        let mut status = engine.status();

        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("keyboard_a.wav");
        write_wav(path.clone(), vec![vec![0i16, 100, 200]], 44100, 16)?;
        let mut assets = MemoryAssets::new();
        assets.insert("keyboard_a.wav", std::fs::read(path)?);

        let (inputs_tx, inputs_rx) = mpsc::channel(16);
        let handle = tokio::spawn(engine.run(Some(Arc::new(assets)), inputs_rx));

        status
            .wait_for(|status| {
                status.route == Some(Route::Headphones)
                    && matches!(status.bank, BankStatus::Ready { .. })
            })
            .await?;
        inputs_tx.send(Input::Key(KeyEvent::new("KeyA"))).await?;
        drop(inputs_tx);
        handle.await?;

        let plays = output.plays();
        assert_eq!(1, plays.len());
        assert!((plays[0].gain - 0.05).abs() < 1e-6);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_loads_and_plays() -> Result<(), Box<dyn Error>> {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("keyboard_a.wav");
        write_wav(path.clone(), vec![vec![0i16, 100, 200]], 44100, 16)?;
        let mut assets = MemoryAssets::new();
        assets.insert("keyboard_a.wav", std::fs::read(path)?);

        let catalog = Arc::new(test_catalog(&["a", "b"]));
        let output = mock::Output::get("mock", 44100);
        let engine = Engine::new(
            Session::new(catalog),
            Dispatcher::default(),
            Playback::new(Arc::new(output.clone())),
        );
        let mut notifications = engine.subscribe();
        let mut status = engine.status();

        let (inputs_tx, inputs_rx) = mpsc::channel(16);
        let handle = tokio::spawn(engine.run(Some(Arc::new(assets)), inputs_rx));

        status
            .wait_for(|status| matches!(status.bank, BankStatus::Ready { .. }))
            .await?;
        assert_eq!(
            Notification::AssetsReady {
                loaded: 1,
                total: 2
            },
            notifications.recv().await?
        );

        inputs_tx.send(Input::Key(KeyEvent::new("Space"))).await?;
        inputs_tx.send(Input::Key(KeyEvent::new("KeyJ"))).await?;
        inputs_tx
            .send(Input::Action(Action::SetVolume(0.75)))
            .await?;
        inputs_tx.send(Input::Key(KeyEvent::new("KeyK"))).await?;
        drop(inputs_tx);
        handle.await?;

        let plays = output.plays();
        assert_eq!(2, plays.len());
        assert_eq!(3, plays[0].frames);
        assert_eq!(0.5, plays[0].gain);
        assert_eq!(0.75, plays[1].gain);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_without_audio() -> Result<(), Box<dyn Error>> {
        let catalog = Arc::new(test_catalog(&["a"]));
        let engine = Engine::new(
            Session::new(catalog),
            Dispatcher::default(),
            Playback::silent(),
        )
        .audio_unavailable("no device");
        let mut notifications = engine.subscribe();
        let status = engine.status();

        let (inputs_tx, inputs_rx) = mpsc::channel(16);
        let handle = tokio::spawn(engine.run(Some(Arc::new(MemoryAssets::new())), inputs_rx));
        inputs_tx.send(Input::Key(KeyEvent::new("Space"))).await?;
        drop(inputs_tx);
        handle.await?;

        assert_eq!(
            Notification::AudioUnavailable {
                reason: "no device".to_string()
            },
            notifications.recv().await?
        );
        assert_eq!(
            Notification::EnabledChanged(true),
            notifications.recv().await?
        );
        let status = status.borrow();
        assert!(status.silent);
        assert!(status.enabled);
        Ok(())
    }
}
