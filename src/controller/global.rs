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
use std::io;

use rdev::{EventType, Key};
use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{debug, info, span, Level};

use super::Input;
use crate::keys::KeyTracker;

/// A driver that hooks the keyboard system-wide.
///
/// Every key press anywhere on the desktop becomes a global key event. The hook
/// can't tell whether a text field has focus, so nothing is marked as text entry.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

/// Maps an rdev key onto a DOM-style key code.
pub fn key_code(key: Key) -> String {
    let code = match key {
        Key::UpArrow => "ArrowUp",
        Key::DownArrow => "ArrowDown",
        Key::LeftArrow => "ArrowLeft",
        Key::RightArrow => "ArrowRight",
        Key::Return => "Enter",
        Key::KpReturn => "NumpadEnter",
        Key::Alt => "AltLeft",
        Key::AltGr => "AltRight",
        Key::BackQuote => "Backquote",
        Key::SemiColon => "Semicolon",
        Key::BackSlash => "Backslash",
        Key::Dot => "Period",
        Key::LeftBracket => "BracketLeft",
        Key::RightBracket => "BracketRight",
        Key::Num0 => "Digit0",
        Key::Num1 => "Digit1",
        Key::Num2 => "Digit2",
        Key::Num3 => "Digit3",
        Key::Num4 => "Digit4",
        Key::Num5 => "Digit5",
        Key::Num6 => "Digit6",
        Key::Num7 => "Digit7",
        Key::Num8 => "Digit8",
        Key::Num9 => "Digit9",
        // The rest already share their DOM names, e.g. KeyA, Space, ShiftLeft.
        other => return format!("{:?}", other),
    };
    code.to_string()
}

impl super::Driver for Driver {
    fn monitor_events(&self, inputs_tx: Sender<Input>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "global driver");
            let _enter = span.enter();

            info!("Global keyboard hook started.");

            let mut tracker = KeyTracker::new();
            // Only returns if the hook could not be installed.
            rdev::listen(move |event| match event.event_type {
                EventType::KeyPress(key) => {
                    let event = tracker.press(&key_code(key));
                    if inputs_tx.blocking_send(Input::Key(event)).is_err() {
                        debug!("Engine is gone, dropping key event.");
                    }
                }
                EventType::KeyRelease(key) => tracker.release(&key_code(key)),
                _ => {}
            })
            .map_err(|e| io::Error::other(format!("unable to hook the keyboard: {:?}", e)))
        })
    }
}
