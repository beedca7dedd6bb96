// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Grouped key/value settings file.
//!
//! Settings are stored as named groups of string entries. The file is YAML,
//! or JSON when the path ends in `.json`. Typed access parses entries on
//! read and falls back to the caller's default when an entry is missing or
//! malformed.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Entries of a single group.
pub type Group = BTreeMap<String, String>;

/// An entry as found on disk. Hand-edited files may hold bare numbers or
/// booleans where the store itself writes strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<RawValue> for String {
    fn from(value: RawValue) -> Self {
        match value {
            RawValue::Bool(v) => v.to_string(),
            RawValue::Int(v) => v.to_string(),
            RawValue::Float(v) => v.to_string(),
            RawValue::Text(v) => v,
        }
    }
}

type RawGroups = BTreeMap<String, BTreeMap<String, RawValue>>;

fn into_groups(raw: RawGroups) -> BTreeMap<String, Group> {
    raw.into_iter()
        .map(|(name, entries)| (name, entries.into_iter().map(|(k, v)| (k, v.into())).collect()))
        .collect()
}

const APP_DIR: &str = "scanlite";
const FILENAME: &str = "scanliterc.yaml";

/// Settings file contents, optionally bound to a path on disk.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    groups: BTreeMap<String, Group>,
}

impl ConfigStore {
    /// Store that never touches the disk.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(FILENAME);
        path
    }

    /// Load the store from `path`. A missing file gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let groups = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {:?}", path))?;
            let raw: RawGroups = if is_json(&path) {
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse JSON from {:?}", path))?
            } else if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_yaml::from_str(&contents)
                    .with_context(|| format!("Failed to parse YAML from {:?}", path))?
            };
            into_groups(raw)
        } else {
            log::info!("Settings file {:?} not found, using defaults", path);
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            groups,
        })
    }

    /// Empty store that will be written to `path` on sync.
    pub fn empty_at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            groups: BTreeMap::new(),
        }
    }

    /// Raw entry, if present.
    pub fn entry(&self, group: &str, key: &str) -> Option<&str> {
        self.groups.get(group)?.get(key).map(String::as_str)
    }

    /// Parse an entry, returning `default` when absent or unparsable.
    pub fn read_entry<T: FromStr>(&self, group: &str, key: &str, default: T) -> T {
        match self.entry(group, key) {
            Some(raw) => match raw.trim().parse() {
                Ok(value) => value,
                Err(_) => {
                    log::warn!("Ignoring malformed setting [{}] {}={:?}", group, key, raw);
                    default
                }
            },
            None => default,
        }
    }

    /// String entry, returning `default` when absent.
    pub fn read_string(&self, group: &str, key: &str, default: &str) -> String {
        self.entry(group, key).unwrap_or(default).to_string()
    }

    pub fn write_entry<T: Display>(&mut self, group: &str, key: &str, value: T) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// All entries of a group; empty when the group does not exist.
    pub fn entry_map(&self, group: &str) -> Group {
        self.groups.get(group).cloned().unwrap_or_default()
    }

    /// Replace a whole group.
    pub fn replace_group(&mut self, group: &str, entries: Group) {
        self.groups.insert(group.to_string(), entries);
    }

    /// Write the store to its file. In-memory stores do nothing.
    pub fn sync(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
            }
        }

        let contents = if is_json(path) {
            serde_json::to_string_pretty(&self.groups)?
        } else {
            serde_yaml::to_string(&self.groups)?
        };
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        log::debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}
