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
use std::io;
use std::str::FromStr;

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{info, span, warn, Level};

use super::{Action, Input};
use crate::keys::{Hotkey, KeyEvent, KeyParseError};

const TOGGLE: &str = ":toggle";
const ENABLE: &str = ":enable";
const DISABLE: &str = ":disable";
const VOLUME: &str = ":volume";
const PROFILE: &str = ":profile";
const TEST: &str = ":test";

const REPEAT: &str = "repeat";
const TEXT_ENTRY: &str = "input";

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ConsoleError {
    #[error("{0} needs a value")]
    MissingValue(&'static str),

    #[error("invalid volume {0}")]
    InvalidVolume(String),

    #[error("unknown command {0}")]
    UnknownCommand(String),

    #[error("unknown key flag {0}")]
    UnknownFlag(String),

    #[error(transparent)]
    Key(#[from] KeyParseError),
}

/// Parses one console line. Blank lines yield nothing.
///
/// Lines starting with a colon are actions. Anything else is a key chord
/// optionally followed by `repeat` and/or `input`.
pub fn parse_line(line: &str) -> Result<Option<Input>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(None);
    };

    if first.starts_with(':') {
        let action = match first.to_lowercase().as_str() {
            TOGGLE => Action::ToggleEnabled,
            ENABLE => Action::SetEnabled(true),
            DISABLE => Action::SetEnabled(false),
            TEST => Action::TestSound,
            VOLUME => {
                let value = words.next().ok_or(ConsoleError::MissingValue(VOLUME))?;
                let volume = value
                    .parse::<f32>()
                    .map_err(|_| ConsoleError::InvalidVolume(value.to_string()))?;
                Action::SetVolume(volume)
            }
            PROFILE => {
                let id = words.next().ok_or(ConsoleError::MissingValue(PROFILE))?;
                Action::SelectProfile(id.to_string())
            }
            _ => return Err(ConsoleError::UnknownCommand(first.to_string())),
        };
        return Ok(Some(Input::Action(action)));
    }

    let chord = Hotkey::from_str(first)?;
    let mut event = KeyEvent::new(chord.code()).with_modifiers(chord.modifiers());
    for flag in words {
        event = match flag.to_lowercase().as_str() {
            REPEAT => event.repeated(),
            TEXT_ENTRY => event.in_text_entry(),
            _ => return Err(ConsoleError::UnknownFlag(flag.to_string())),
        };
    }
    Ok(Some(Input::Key(event)))
}

/// A driver that reads keys and commands from standard input.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }

    /// Handles one line of input. Returns false once the reader is exhausted.
    fn monitor_io<R, W>(
        inputs_tx: &Sender<Input>,
        mut reader: R,
        mut writer: W,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
        W: io::Write,
    {
        write!(writer, "> ")?;
        writer.flush()?;
        let mut line = String::default();
        if reader.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        match parse_line(&line) {
            Ok(Some(input)) => inputs_tx.blocking_send(input).map_err(io::Error::other)?,
            Ok(None) => {}
            Err(e) => warn!(err = %e, line = line.trim(), "Unrecognized input"),
        }
        Ok(true)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

impl super::Driver for Driver {
    fn monitor_events(&self, inputs_tx: Sender<Input>) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "console driver");
            let _enter = span.enter();

            info!("Console driver started.");

            while Self::monitor_io(&inputs_tx, io::stdin().lock(), io::stdout())? {}

            info!("Standard input closed.");
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, BufReader};

    use tokio::sync::mpsc;

    use super::*;
    use crate::keys::Modifiers;

    fn get_input(line: &str) -> Result<(bool, Option<Input>), io::Error> {
        let (sender, mut receiver) = mpsc::channel::<Input>(1);

        let reader = BufReader::new(line.as_bytes());
        let mut writer: Vec<u8> = Vec::new();
        let more = Driver::monitor_io(&sender, reader, &mut writer)?;
        assert_eq!(b"> ".to_vec(), writer);

        // Force the sender to close.
        drop(sender);
        Ok((more, receiver.blocking_recv()))
    }

    #[test]
    fn test_actions() {
        assert_eq!(
            Ok(Some(Input::Action(Action::ToggleEnabled))),
            parse_line(":toggle")
        );
        assert_eq!(
            Ok(Some(Input::Action(Action::SetEnabled(true)))),
            parse_line(" :ENABLE ")
        );
        assert_eq!(
            Ok(Some(Input::Action(Action::SetEnabled(false)))),
            parse_line(":disable")
        );
        assert_eq!(
            Ok(Some(Input::Action(Action::SetVolume(0.25)))),
            parse_line(":volume 0.25")
        );
        assert_eq!(
            Ok(Some(Input::Action(Action::SelectProfile("red".to_string())))),
            parse_line(":profile red")
        );
        assert_eq!(Ok(Some(Input::Action(Action::TestSound))), parse_line(":test"));

        assert_eq!(
            Err(ConsoleError::MissingValue(VOLUME)),
            parse_line(":volume")
        );
        assert_eq!(
            Err(ConsoleError::InvalidVolume("loud".to_string())),
            parse_line(":volume loud")
        );
        assert_eq!(
            Err(ConsoleError::UnknownCommand(":quit".to_string())),
            parse_line(":quit")
        );
    }

    #[test]
    fn test_keys() {
        assert_eq!(Ok(None), parse_line("   "));
        assert_eq!(
            Ok(Some(Input::Key(
                KeyEvent::new("ArrowUp").with_modifiers(Modifiers::SHIFT)
            ))),
            parse_line("Shift+ArrowUp")
        );
        assert_eq!(
            Ok(Some(Input::Key(KeyEvent::new("KeyX").repeated()))),
            parse_line("x repeat")
        );
        assert_eq!(
            Ok(Some(Input::Key(KeyEvent::new("KeyA").in_text_entry()))),
            parse_line("KeyA input")
        );
        assert_eq!(
            Ok(Some(Input::Key(
                KeyEvent::new("Space").repeated().in_text_entry()
            ))),
            parse_line("space repeat input")
        );
        assert_eq!(
            Err(ConsoleError::UnknownFlag("twice".to_string())),
            parse_line("a twice")
        );
        assert!(matches!(
            parse_line("Hyper+a"),
            Err(ConsoleError::Key(KeyParseError::UnknownModifier(_)))
        ));
    }

    #[test]
    fn test_monitor_io() -> Result<(), io::Error> {
        assert_eq!(
            (true, Some(Input::Action(Action::TestSound))),
            get_input(":test\n")?
        );
        assert_eq!((true, Some(Input::Key(KeyEvent::new("KeyQ")))), get_input("q\n")?);
        assert_eq!((true, None), get_input("Hyper+q\n")?);
        assert_eq!((true, None), get_input("\n")?);
        assert_eq!((false, None), get_input("")?);
        Ok(())
    }
}
