//! Address List Store
//!
//! Thread-safe blacklist/whitelist used by the threat detector.
//! Backed by DashSet so membership checks never contend with writers.
//!
//! - The two lists are disjoint: adding to one removes from the other
//! - Mutations touching both sets are serialized by one store-wide mutex
//! - Entries never expire; they change only through add/remove
//! - JSON import/export for operators who keep lists on disk

use dashmap::DashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::SEED_BLACKLIST;

/// On-disk form of both lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressListSnapshot {
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default)]
    pub whitelist: Vec<String>,
}

/// Blacklist/whitelist membership authority
#[derive(Clone, Default)]
pub struct AddressListStore {
    blacklist: Arc<DashSet<String>>,
    whitelist: Arc<DashSet<String>>,
    /// Held for every mutation; reads never take it
    writer: Arc<Mutex<()>>,
}

impl AddressListStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the known malicious addresses
    pub fn seeded() -> Self {
        let store = Self::new();
        for address in SEED_BLACKLIST {
            store.blacklist.insert(address.to_string());
        }
        debug!("🗂️ Address lists seeded with {} blacklist entries", store.blacklist.len());
        store
    }

    fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add_to_blacklist(&self, address: &str) {
        let _writer = self.lock_writer();
        self.whitelist.remove(address);
        if self.blacklist.insert(address.to_string()) {
            info!("⛔ BLACKLIST ADD: {}", address);
        }
    }

    pub fn add_to_whitelist(&self, address: &str) {
        let _writer = self.lock_writer();
        self.blacklist.remove(address);
        if self.whitelist.insert(address.to_string()) {
            info!("✅ WHITELIST ADD: {}", address);
        }
    }

    /// Returns true if the address was present
    pub fn remove_from_blacklist(&self, address: &str) -> bool {
        let _writer = self.lock_writer();
        let removed = self.blacklist.remove(address).is_some();
        if removed {
            info!("🗑️ BLACKLIST REMOVE: {}", address);
        }
        removed
    }

    /// Returns true if the address was present
    pub fn remove_from_whitelist(&self, address: &str) -> bool {
        let _writer = self.lock_writer();
        let removed = self.whitelist.remove(address).is_some();
        if removed {
            info!("🗑️ WHITELIST REMOVE: {}", address);
        }
        removed
    }

    #[inline]
    pub fn is_blacklisted(&self, address: &str) -> bool {
        self.blacklist.contains(address)
    }

    #[inline]
    pub fn is_whitelisted(&self, address: &str) -> bool {
        self.whitelist.contains(address)
    }

    /// First blacklisted address among `addresses`, if any
    pub fn first_blacklisted<'a>(
        &self,
        addresses: impl IntoIterator<Item = &'a str>,
    ) -> Option<&'a str> {
        addresses.into_iter().find(|a| self.is_blacklisted(a))
    }

    pub fn blacklist_len(&self) -> usize {
        self.blacklist.len()
    }

    pub fn whitelist_len(&self) -> usize {
        self.whitelist.len()
    }

    /// Sorted copy of both lists
    pub fn snapshot(&self) -> AddressListSnapshot {
        let _writer = self.lock_writer();
        let mut blacklist: Vec<String> = self.blacklist.iter().map(|a| a.key().clone()).collect();
        let mut whitelist: Vec<String> = self.whitelist.iter().map(|a| a.key().clone()).collect();
        blacklist.sort();
        whitelist.sort();
        AddressListSnapshot { blacklist, whitelist }
    }

    /// Merge a snapshot into the store; returns entries applied
    ///
    /// Blacklist entries are applied last, so an address present in both
    /// lists of the snapshot ends up blacklisted.
    pub fn merge(&self, snapshot: &AddressListSnapshot) -> usize {
        for address in &snapshot.whitelist {
            self.add_to_whitelist(address);
        }
        for address in &snapshot.blacklist {
            self.add_to_blacklist(address);
        }
        snapshot.blacklist.len() + snapshot.whitelist.len()
    }

    /// Load and merge a JSON address list file
    pub fn load_json(&self, path: &Path) -> AppResult<usize> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::AddressListIo,
                format!("Failed to read address list {}", path.display()),
                e,
            )
        })?;
        let snapshot: AddressListSnapshot = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorCode::AddressListIo,
                format!("Malformed address list {}", path.display()),
                e,
            )
        })?;

        let applied = self.merge(&snapshot);
        info!("📥 Loaded {} address list entries from {}", applied, path.display());
        Ok(applied)
    }

    /// Write both lists as pretty JSON
    pub fn export_json(&self, path: &Path) -> AppResult<()> {
        let json = serde_json::to_string_pretty(&self.snapshot()).map_err(|e| {
            AppError::with_source(ErrorCode::AddressListIo, "Failed to encode address lists", e)
        })?;
        std::fs::write(path, json).map_err(|e| {
            AppError::with_source(
                ErrorCode::AddressListIo,
                format!("Failed to write address list {}", path.display()),
                e,
            )
        })?;
        info!("📤 Address lists exported to {}", path.display());
        Ok(())
    }
}
