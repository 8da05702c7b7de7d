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
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::decoder::DecodeError;

/// Errors raised while fetching or decoding a single asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset {0} not found")]
    NotFound(String),

    #[error("unable to read asset {asset}: {source}")]
    Io {
        asset: String,
        #[source]
        source: io::Error,
    },

    #[error("unable to decode asset {asset}: {source}")]
    Decode {
        asset: String,
        #[source]
        source: DecodeError,
    },

    #[error("loading asset {asset} was interrupted: {reason}")]
    Interrupted { asset: String, reason: String },
}

/// Somewhere asset bytes can be fetched from.
pub trait AssetSource: fmt::Display + Send + Sync {
    /// Fetches the complete contents of the named asset.
    fn fetch(&self, asset: &str) -> Result<Vec<u8>, AssetError>;

    /// Returns false when the source as a whole cannot be reached.
    fn is_available(&self) -> bool {
        true
    }
}

/// Assets stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    dir: PathBuf,
}

impl DirectoryAssets {
    pub fn new(dir: &Path) -> DirectoryAssets {
        DirectoryAssets {
            dir: dir.to_path_buf(),
        }
    }
}

impl AssetSource for DirectoryAssets {
    fn fetch(&self, asset: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.dir.join(asset);
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AssetError::NotFound(path.display().to_string()),
            _ => AssetError::Io {
                asset: path.display().to_string(),
                source: e,
            },
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

impl fmt::Display for DirectoryAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir.display())
    }
}

/// Assets held in memory, keyed by asset name.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> MemoryAssets {
        MemoryAssets::default()
    }

    pub fn insert(&mut self, asset: &str, bytes: Vec<u8>) {
        self.assets.insert(asset.to_string(), bytes);
    }
}

impl AssetSource for MemoryAssets {
    fn fetch(&self, asset: &str) -> Result<Vec<u8>, AssetError> {
        self.assets
            .get(asset)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(asset.to_string()))
    }
}

impl fmt::Display for MemoryAssets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory ({} assets)", self.assets.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_directory_assets() {
        let tempdir = tempfile::tempdir().unwrap();
        fs::write(tempdir.path().join("a.wav"), b"abc").unwrap();

        let assets = DirectoryAssets::new(tempdir.path());
        assert!(assets.is_available());
        assert_eq!(b"abc".to_vec(), assets.fetch("a.wav").unwrap());
        assert!(matches!(
            assets.fetch("b.wav"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_missing_directory() {
        let tempdir = tempfile::tempdir().unwrap();
        let assets = DirectoryAssets::new(&tempdir.path().join("nope"));
        assert!(!assets.is_available());
        assert!(assets.fetch("a.wav").is_err());
    }

    #[test]
    fn test_memory_assets() {
        let mut assets = MemoryAssets::new();
        assets.insert("x.wav", vec![1, 2, 3]);
        assert_eq!(vec![1, 2, 3], assets.fetch("x.wav").unwrap());
        assert!(matches!(
            assets.fetch("y.wav"),
            Err(AssetError::NotFound(_))
        ));
    }
}
