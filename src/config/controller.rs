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
use std::{error::Error, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::controller::{console, Driver};
use crate::dispatcher::Hotkeys;

/// Allows users to pick where key events come from.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Controller {
    /// A system-wide keyboard hook.
    Global,
    /// Lines typed on standard input.
    Console,
}

impl Controller {
    /// Creates the driver for this controller.
    pub fn driver(&self) -> Result<Arc<dyn Driver>, Box<dyn Error>> {
        match self {
            #[cfg(feature = "global")]
            Controller::Global => Ok(Arc::new(crate::controller::global::Driver::new())),
            #[cfg(not(feature = "global"))]
            Controller::Global => Err("built without the global keyboard hook".into()),
            Controller::Console => Ok(Arc::new(console::Driver::new())),
        }
    }

    /// The hotkeys used when the configuration doesn't name any.
    pub fn default_hotkeys(&self) -> Hotkeys {
        match self {
            Controller::Global => Hotkeys::global(),
            Controller::Console => Hotkeys::default(),
        }
    }

    /// True when the driver sees keys typed into other applications.
    pub fn sees_typing(&self) -> bool {
        *self == Controller::Global
    }
}

impl Default for Controller {
    fn default() -> Self {
        if cfg!(feature = "global") {
            Controller::Global
        } else {
            Controller::Console
        }
    }
}

impl std::str::FromStr for Controller {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "global" => Ok(Controller::Global),
            "console" => Ok(Controller::Console),
            _ => Err(format!("unknown controller {}", s)),
        }
    }
}
