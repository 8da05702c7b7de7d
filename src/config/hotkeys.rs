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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dispatcher;
use crate::keys::{Hotkey, KeyParseError};

/// The control hotkeys as chord strings, e.g. "Shift+ArrowUp". Unset chords fall
/// back to the controller's defaults.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Hotkeys {
    /// Toggles clicks on and off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    toggle: Option<String>,
    /// Moves to the next profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next: Option<String>,
    /// Moves to the previous profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    previous: Option<String>,
}

fn parse_or(chord: &Option<String>, default: Hotkey) -> Result<Hotkey, KeyParseError> {
    match chord {
        Some(chord) => Hotkey::from_str(chord),
        None => Ok(default),
    }
}

impl Hotkeys {
    /// Parses the chords into dispatcher bindings, filling gaps from the defaults.
    pub fn to_hotkeys(
        &self,
        defaults: dispatcher::Hotkeys,
    ) -> Result<dispatcher::Hotkeys, KeyParseError> {
        Ok(dispatcher::Hotkeys {
            toggle: parse_or(&self.toggle, defaults.toggle)?,
            next: parse_or(&self.next, defaults.next)?,
            previous: parse_or(&self.previous, defaults.previous)?,
        })
    }
}

impl From<&dispatcher::Hotkeys> for Hotkeys {
    fn from(hotkeys: &dispatcher::Hotkeys) -> Self {
        Hotkeys {
            toggle: Some(hotkeys.toggle.to_string()),
            next: Some(hotkeys.next.to_string()),
            previous: Some(hotkeys.previous.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use config::{Config, File, FileFormat};

    use super::*;
    use crate::keys::Modifiers;

    #[test]
    fn test_defaults_round_trip() {
        for defaults in [dispatcher::Hotkeys::default(), dispatcher::Hotkeys::global()] {
            assert_eq!(
                defaults,
                Hotkeys::from(&defaults).to_hotkeys(dispatcher::Hotkeys::default()).unwrap()
            );
            assert_eq!(
                defaults,
                Hotkeys::default().to_hotkeys(defaults.clone()).unwrap()
            );
        }
    }

    #[test]
    fn test_partial_override() {
        let hotkeys: Hotkeys = Config::builder()
            .add_source(File::from_str("toggle: Ctrl+Alt+k", FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let hotkeys = hotkeys.to_hotkeys(dispatcher::Hotkeys::global()).unwrap();
        assert_eq!("KeyK", hotkeys.toggle.code());
        assert_eq!(
            Modifiers {
                ctrl: true,
                alt: true,
                ..Modifiers::NONE
            },
            hotkeys.toggle.modifiers()
        );
        assert_eq!(dispatcher::Hotkeys::global().next, hotkeys.next);
    }

    #[test]
    fn test_bad_chord() {
        let hotkeys = Hotkeys {
            toggle: Some("Super+".to_string()),
            ..Hotkeys::default()
        };
        assert!(hotkeys.to_hotkeys(dispatcher::Hotkeys::default()).is_err());
    }
}
