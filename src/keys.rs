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

//! Key events, modifier state and hotkey chords.
//!
//! Keys are identified by DOM-style physical key codes ("Space", "KeyX", "ArrowUp"),
//! regardless of the driver that produced them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing hotkey chords.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("empty key chord")]
    Empty,

    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("key chord '{0}' has no key")]
    MissingKey(String),
}

/// The modifier keys held while a key was pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Modifiers::NONE
    }

    /// True when every modifier in `other` is also held here.
    pub fn contains(&self, other: Modifiers) -> bool {
        (self.shift || !other.shift)
            && (self.ctrl || !other.ctrl)
            && (self.alt || !other.alt)
            && (self.meta || !other.meta)
    }

    /// Applies a modifier name (Shift, Ctrl, Alt, Meta and aliases) to this set.
    fn apply(&mut self, name: &str) -> Result<(), KeyParseError> {
        match name.to_ascii_lowercase().as_str() {
            "shift" => self.shift = true,
            "ctrl" | "control" => self.ctrl = true,
            "alt" | "option" => self.alt = true,
            "meta" | "super" | "cmd" | "win" => self.meta = true,
            _ => return Err(KeyParseError::UnknownModifier(name.to_string())),
        }
        Ok(())
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        let mut first = true;
        for (held, name) in names {
            if !held {
                continue;
            }
            if !first {
                write!(f, "+")?;
            }
            write!(f, "{}", name)?;
            first = false;
        }
        Ok(())
    }
}

/// Where a key event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The event is not destined for a text entry control.
    Global,
    /// The event targets a text entry control and must not trigger anything.
    TextEntry,
}

/// A single key-down event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: String,
    pub modifiers: Modifiers,
    /// True when the event was synthesized by holding the key down.
    pub repeat: bool,
    pub origin: Origin,
}

impl KeyEvent {
    /// Creates a global, non-repeat key event without modifiers.
    pub fn new(code: &str) -> KeyEvent {
        KeyEvent {
            code: code.to_string(),
            modifiers: Modifiers::NONE,
            repeat: false,
            origin: Origin::Global,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> KeyEvent {
        self.modifiers = modifiers;
        self
    }

    pub fn repeated(mut self) -> KeyEvent {
        self.repeat = true;
        self
    }

    pub fn in_text_entry(mut self) -> KeyEvent {
        self.origin = Origin::TextEntry;
        self
    }
}

/// Normalizes a key name into its DOM-style code.
pub fn normalize_code(name: &str) -> String {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return format!("Key{}", c.to_ascii_uppercase());
        }
        if c.is_ascii_digit() {
            return format!("Digit{}", c);
        }
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "space" => "Space",
        "enter" | "return" => "Enter",
        "tab" => "Tab",
        "esc" | "escape" => "Escape",
        "backspace" => "Backspace",
        "up" | "arrowup" => "ArrowUp",
        "down" | "arrowdown" => "ArrowDown",
        "left" | "arrowleft" => "ArrowLeft",
        "right" | "arrowright" => "ArrowRight",
        _ => return name.to_string(),
    };
    code.to_string()
}

/// True for keys that produce or edit text when typed.
fn is_typing_key(code: &str) -> bool {
    code.starts_with("Key")
        || code.starts_with("Digit")
        || matches!(
            code,
            "Space"
                | "Enter"
                | "Tab"
                | "Backspace"
                | "Minus"
                | "Equal"
                | "BracketLeft"
                | "BracketRight"
                | "Backslash"
                | "Semicolon"
                | "Quote"
                | "Backquote"
                | "Comma"
                | "Period"
                | "Slash"
        )
}

/// A key code plus the modifiers that must be held with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hotkey {
    code: String,
    modifiers: Modifiers,
}

impl Hotkey {
    pub fn new(code: &str, modifiers: Modifiers) -> Hotkey {
        Hotkey {
            code: code.to_string(),
            modifiers,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// True when the event's code matches and the binding's modifiers are all held.
    ///
    /// Extra held modifiers don't prevent a match, so a bare binding fires
    /// whatever is held.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.code == event.code && event.modifiers.contains(self.modifiers)
    }

    /// True when the chord fires while typing ordinary text: a text key with
    /// nothing but Shift.
    pub fn is_typing_chord(&self) -> bool {
        !(self.modifiers.ctrl || self.modifiers.alt || self.modifiers.meta)
            && is_typing_key(&self.code)
    }
}

impl FromStr for Hotkey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chord = s.trim();
        if chord.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let parts: Vec<&str> = chord.split('+').map(str::trim).collect();
        let (key, modifier_names) = match parts.split_last() {
            Some((key, modifiers)) if !key.is_empty() => (key, modifiers),
            _ => return Err(KeyParseError::MissingKey(chord.to_string())),
        };

        let mut modifiers = Modifiers::NONE;
        for name in modifier_names {
            modifiers.apply(name)?;
        }

        Ok(Hotkey {
            code: normalize_code(key),
            modifiers,
        })
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}+{}", self.modifiers, self.code)
        }
    }
}

/// Marks the modifier a key code represents, if any, as held.
fn hold_modifier(code: &str, modifiers: &mut Modifiers) {
    match code {
        "ShiftLeft" | "ShiftRight" => modifiers.shift = true,
        "ControlLeft" | "ControlRight" => modifiers.ctrl = true,
        "AltLeft" | "AltRight" => modifiers.alt = true,
        "MetaLeft" | "MetaRight" => modifiers.meta = true,
        _ => {}
    }
}

/// Turns raw press/release notifications into key events.
///
/// A press of a key that is already held is reported as a repeat, and the
/// modifier state is derived from whichever modifier keys are held.
#[derive(Debug, Default)]
pub struct KeyTracker {
    held: HashSet<String>,
}

impl KeyTracker {
    pub fn new() -> KeyTracker {
        KeyTracker::default()
    }

    /// Records a key press and returns the resulting event.
    pub fn press(&mut self, code: &str) -> KeyEvent {
        let repeat = !self.held.insert(code.to_string());
        KeyEvent {
            code: code.to_string(),
            modifiers: self.modifiers(),
            repeat,
            origin: Origin::Global,
        }
    }

    /// Records a key release.
    pub fn release(&mut self, code: &str) {
        self.held.remove(code);
    }

    /// The modifiers implied by the currently held keys.
    pub fn modifiers(&self) -> Modifiers {
        let mut modifiers = Modifiers::NONE;
        for code in &self.held {
            hold_modifier(code, &mut modifiers);
        }
        modifiers
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.held.contains(code)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_hotkeys() {
        let hotkey: Hotkey = "Shift+ArrowUp".parse().unwrap();
        assert_eq!("ArrowUp", hotkey.code());
        assert_eq!(Modifiers::SHIFT, hotkey.modifiers());

        let hotkey: Hotkey = "space".parse().unwrap();
        assert_eq!("Space", hotkey.code());
        assert!(hotkey.modifiers().is_empty());

        let hotkey: Hotkey = "ctrl + alt + x".parse().unwrap();
        assert_eq!("KeyX", hotkey.code());
        assert!(hotkey.modifiers().ctrl && hotkey.modifiers().alt);
        assert!(!hotkey.modifiers().shift);

        let hotkey: Hotkey = "Super+5".parse().unwrap();
        assert_eq!("Digit5", hotkey.code());
        assert!(hotkey.modifiers().meta);

        let hotkey: Hotkey = "F13".parse().unwrap();
        assert_eq!("F13", hotkey.code());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Err(KeyParseError::Empty), "  ".parse::<Hotkey>());
        assert_eq!(
            Err(KeyParseError::UnknownModifier("Hyper".to_string())),
            "Hyper+x".parse::<Hotkey>()
        );
        assert_eq!(
            Err(KeyParseError::MissingKey("Shift+".to_string())),
            "Shift+".parse::<Hotkey>()
        );
    }

    #[test]
    fn test_display_round_trips() {
        for chord in ["Space", "Shift+ArrowDown", "Ctrl+Alt+KeyK"] {
            let hotkey: Hotkey = chord.parse().unwrap();
            assert_eq!(chord, hotkey.to_string());
        }
    }

    #[test]
    fn test_held_modifier_match() {
        let mut ctrl_shift = Modifiers::SHIFT;
        ctrl_shift.ctrl = true;

        let hotkey: Hotkey = "Shift+ArrowUp".parse().unwrap();
        assert!(hotkey.matches(&KeyEvent::new("ArrowUp").with_modifiers(Modifiers::SHIFT)));
        assert!(hotkey.matches(&KeyEvent::new("ArrowUp").with_modifiers(ctrl_shift)));
        assert!(!hotkey.matches(&KeyEvent::new("ArrowUp")));
        assert!(!hotkey.matches(&KeyEvent::new("ArrowDown").with_modifiers(Modifiers::SHIFT)));

        let hotkey: Hotkey = "Space".parse().unwrap();
        assert!(hotkey.matches(&KeyEvent::new("Space")));
        assert!(hotkey.matches(&KeyEvent::new("Space").with_modifiers(Modifiers::SHIFT)));

        let hotkey: Hotkey = "Ctrl+Shift+s".parse().unwrap();
        assert!(hotkey.matches(&KeyEvent::new("KeyS").with_modifiers(ctrl_shift)));
        assert!(!hotkey.matches(&KeyEvent::new("KeyS").with_modifiers(Modifiers::SHIFT)));
    }

    #[test]
    fn test_typing_chords() {
        for chord in ["Space", "x", "Shift+KeyS", "Enter", "Shift+5", "Comma"] {
            assert!(chord.parse::<Hotkey>().unwrap().is_typing_chord(), "{}", chord);
        }
        for chord in ["Ctrl+Shift+KeyS", "Shift+ArrowUp", "F12", "Alt+Space", "Escape"] {
            assert!(!chord.parse::<Hotkey>().unwrap().is_typing_chord(), "{}", chord);
        }
    }

    #[test]
    fn test_key_tracker() {
        let mut tracker = KeyTracker::new();

        let event = tracker.press("KeyA");
        assert!(!event.repeat);
        assert_eq!(Origin::Global, event.origin);

        let event = tracker.press("KeyA");
        assert!(event.repeat);

        tracker.release("KeyA");
        assert!(!tracker.is_held("KeyA"));
        assert!(!tracker.press("KeyA").repeat);
    }

    #[test]
    fn test_key_tracker_modifiers() {
        let mut tracker = KeyTracker::new();
        tracker.press("ShiftLeft");
        let event = tracker.press("ArrowUp");
        assert_eq!(Modifiers::SHIFT, event.modifiers);

        tracker.release("ShiftLeft");
        tracker.release("ArrowUp");
        let event = tracker.press("ArrowUp");
        assert!(event.modifiers.is_empty());
    }
}
