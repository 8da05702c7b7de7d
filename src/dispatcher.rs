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

//! Classifies key events into control hotkeys or typing triggers.

use crate::keys::{Hotkey, KeyEvent, Modifiers, Origin};
use crate::session::Session;

/// A request to play a profile's sound once at the given gain.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub profile: String,
    pub gain: f32,
}

/// A discrete command produced by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Flip the enabled flag.
    Toggle,
    /// Advance to the next profile in catalog order.
    NextProfile,
    /// Move to the previous profile in catalog order.
    PreviousProfile,
    /// Play a click.
    Trigger(PlaybackRequest),
}

/// The outcome of dispatching a single key event.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub command: Option<Command>,
    /// True when the event was claimed by a control hotkey and should not propagate.
    pub consumed: bool,
}

impl Dispatch {
    fn ignored() -> Dispatch {
        Dispatch {
            command: None,
            consumed: false,
        }
    }

    fn consumed(command: Option<Command>) -> Dispatch {
        Dispatch {
            command,
            consumed: true,
        }
    }

    fn with_command(mut self, command: Command) -> Dispatch {
        self.command = Some(command);
        self
    }
}

/// The control hotkey bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkeys {
    pub toggle: Hotkey,
    pub next: Hotkey,
    pub previous: Hotkey,
}

impl Hotkeys {
    /// Bindings for a system-wide hook. The hook sees every key typed into every
    /// application and can't swallow any of them, so none of these fire while typing.
    pub fn global() -> Hotkeys {
        let mut ctrl_shift = Modifiers::SHIFT;
        ctrl_shift.ctrl = true;
        Hotkeys {
            toggle: Hotkey::new("KeyS", ctrl_shift),
            ..Hotkeys::default()
        }
    }

    /// The first binding that would fire while typing ordinary text.
    pub fn typing_chord(&self) -> Option<&Hotkey> {
        [&self.toggle, &self.next, &self.previous]
            .into_iter()
            .find(|hotkey| hotkey.is_typing_chord())
    }
}

impl Default for Hotkeys {
    fn default() -> Self {
        Hotkeys {
            toggle: Hotkey::new("Space", Modifiers::NONE),
            next: Hotkey::new("ArrowUp", Modifiers::SHIFT),
            previous: Hotkey::new("ArrowDown", Modifiers::SHIFT),
        }
    }
}

/// Maps key events to commands. The dispatcher holds no session state of its own.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    hotkeys: Hotkeys,
}

impl Dispatcher {
    pub fn new(hotkeys: Hotkeys) -> Dispatcher {
        Dispatcher { hotkeys }
    }

    /// Classifies a key-down event against the current session.
    pub fn dispatch(&self, event: &KeyEvent, session: &Session) -> Dispatch {
        if event.origin == Origin::TextEntry {
            return Dispatch::ignored();
        }

        if self.hotkeys.toggle.matches(event) {
            if event.repeat {
                return Dispatch::consumed(None);
            }
            return Dispatch::consumed(Some(Command::Toggle));
        }
        if self.hotkeys.next.matches(event) {
            return Dispatch::consumed(Some(Command::NextProfile));
        }
        if self.hotkeys.previous.matches(event) {
            return Dispatch::consumed(Some(Command::PreviousProfile));
        }

        if event.repeat || !session.enabled() {
            return Dispatch::ignored();
        }

        Dispatch::ignored().with_command(Command::Trigger(PlaybackRequest {
            profile: session.profile().to_string(),
            gain: session.volume(),
        }))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::{test_catalog, Catalog};

    fn enabled_session() -> Session {
        let mut session = Session::new(Arc::new(Catalog::builtin()));
        session.set_enabled(true);
        session
    }

    #[test]
    fn test_text_entry_is_ignored() {
        let dispatcher = Dispatcher::default();
        let session = enabled_session();

        for event in [
            KeyEvent::new("KeyA").in_text_entry(),
            KeyEvent::new("Space").in_text_entry(),
            KeyEvent::new("ArrowUp")
                .with_modifiers(Modifiers::SHIFT)
                .in_text_entry(),
        ] {
            assert_eq!(Dispatch::ignored(), dispatcher.dispatch(&event, &session));
        }
    }

    #[test]
    fn test_toggle() {
        let dispatcher = Dispatcher::default();
        let session = Session::new(Arc::new(Catalog::builtin()));

        let dispatch = dispatcher.dispatch(&KeyEvent::new("Space"), &session);
        assert_eq!(Some(Command::Toggle), dispatch.command);
        assert!(dispatch.consumed);

        let dispatch = dispatcher.dispatch(&KeyEvent::new("Space").repeated(), &session);
        assert_eq!(None, dispatch.command);
        assert!(dispatch.consumed);
    }

    #[test]
    fn test_extra_modifiers_still_match() {
        let dispatcher = Dispatcher::default();
        let session = Session::new(Arc::new(test_catalog(&["a", "b"])));

        let shift_space = KeyEvent::new("Space").with_modifiers(Modifiers::SHIFT);
        assert_eq!(
            Some(Command::Toggle),
            dispatcher.dispatch(&shift_space, &session).command
        );

        let mut ctrl_shift = Modifiers::SHIFT;
        ctrl_shift.ctrl = true;
        let up = KeyEvent::new("ArrowUp").with_modifiers(ctrl_shift);
        assert_eq!(
            Some(Command::NextProfile),
            dispatcher.dispatch(&up, &session).command
        );
    }

    #[test]
    fn test_global_bindings_leave_typing_alone() {
        let dispatcher = Dispatcher::new(Hotkeys::global());
        let session = enabled_session();

        assert_eq!(
            Some(&Hotkey::new("Space", Modifiers::NONE)),
            Hotkeys::default().typing_chord()
        );
        assert_eq!(None, Hotkeys::global().typing_chord());

        for code in ["Space", "KeyS", "Enter"] {
            let dispatch = dispatcher.dispatch(&KeyEvent::new(code), &session);
            assert!(!dispatch.consumed);
            assert!(matches!(dispatch.command, Some(Command::Trigger(_))));
        }
        let capital_s = KeyEvent::new("KeyS").with_modifiers(Modifiers::SHIFT);
        assert!(!dispatcher.dispatch(&capital_s, &session).consumed);

        let mut ctrl_shift = Modifiers::SHIFT;
        ctrl_shift.ctrl = true;
        let toggle = KeyEvent::new("KeyS").with_modifiers(ctrl_shift);
        assert_eq!(
            Some(Command::Toggle),
            dispatcher.dispatch(&toggle, &session).command
        );
    }

    #[test]
    fn test_profile_hotkeys_allow_repeats() {
        let dispatcher = Dispatcher::default();
        let session = Session::new(Arc::new(test_catalog(&["a", "b"])));

        let up = KeyEvent::new("ArrowUp").with_modifiers(Modifiers::SHIFT);
        assert_eq!(
            Some(Command::NextProfile),
            dispatcher.dispatch(&up, &session).command
        );
        assert_eq!(
            Some(Command::NextProfile),
            dispatcher.dispatch(&up.repeated(), &session).command
        );

        let down = KeyEvent::new("ArrowDown").with_modifiers(Modifiers::SHIFT);
        let dispatch = dispatcher.dispatch(&down, &session);
        assert_eq!(Some(Command::PreviousProfile), dispatch.command);
        assert!(dispatch.consumed);
    }

    #[test]
    fn test_unshifted_arrow_is_typing() {
        let dispatcher = Dispatcher::default();
        let session = enabled_session();

        let dispatch = dispatcher.dispatch(&KeyEvent::new("ArrowUp"), &session);
        assert!(!dispatch.consumed);
        assert!(matches!(dispatch.command, Some(Command::Trigger(_))));
    }

    #[test]
    fn test_typing_trigger() {
        let dispatcher = Dispatcher::default();
        let mut session = enabled_session();
        session.set_volume(0.8);
        session.set_profile("thock");

        let dispatch = dispatcher.dispatch(&KeyEvent::new("KeyQ"), &session);
        assert_eq!(
            Some(Command::Trigger(PlaybackRequest {
                profile: "thock".to_string(),
                gain: 0.8,
            })),
            dispatch.command
        );
        assert!(!dispatch.consumed);
    }

    #[test]
    fn test_idle_paths() {
        let dispatcher = Dispatcher::default();
        let mut session = enabled_session();

        assert_eq!(
            Dispatch::ignored(),
            dispatcher.dispatch(&KeyEvent::new("KeyQ").repeated(), &session)
        );

        session.set_enabled(false);
        assert_eq!(
            Dispatch::ignored(),
            dispatcher.dispatch(&KeyEvent::new("KeyQ"), &session)
        );
    }

    #[test]
    fn test_custom_hotkeys() {
        let dispatcher = Dispatcher::new(Hotkeys {
            toggle: "Ctrl+KeyK".parse().unwrap(),
            next: "Alt+KeyN".parse().unwrap(),
            previous: "Alt+KeyP".parse().unwrap(),
        });
        let session = enabled_session();

        // Space is ordinary typing once rebound.
        assert!(matches!(
            dispatcher.dispatch(&KeyEvent::new("Space"), &session).command,
            Some(Command::Trigger(_))
        ));

        let mut ctrl = Modifiers::NONE;
        ctrl.ctrl = true;
        assert_eq!(
            Some(Command::Toggle),
            dispatcher
                .dispatch(&KeyEvent::new("KeyK").with_modifiers(ctrl), &session)
                .command
        );
    }
}
