// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes raw paths to their owning root and applies ignore rules.

use super::actor::{Actor, Addr};
use super::sync::SyncMsg;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tether_adapters::{walk, Skipper};
use tether_core::Mapping;

#[derive(Debug)]
pub enum FilterMsg {
    /// Perform the initial filtered walk of every local root.
    Scan,
    /// A debounced batch of raw (absolute) paths.
    Paths(BTreeSet<PathBuf>),
}

pub struct IgnoreFilter {
    mapping: Mapping,
    /// One compiled skipper per mapping entry, in mapping order.
    skippers: Vec<Skipper>,
    downstream: Addr<SyncMsg>,
}

impl IgnoreFilter {
    pub fn new(mapping: Mapping, skippers: Vec<Skipper>, downstream: Addr<SyncMsg>) -> Self {
        debug_assert_eq!(mapping.len(), skippers.len());
        Self { mapping, skippers, downstream }
    }

    fn scan(&self) {
        for (entry, skipper) in self.mapping.entries().iter().zip(&self.skippers) {
            match walk(&entry.local, skipper) {
                Ok(entries) => {
                    tracing::info!(
                        root = %entry.local.display(),
                        entries = entries.len(),
                        "local scan"
                    );
                    for (sub, sig) in entries {
                        self.downstream.send(SyncMsg::LocalScanned {
                            root: entry.local.clone(),
                            sub,
                            sig,
                        });
                    }
                }
                Err(e) => {
                    tracing::error!(root = %entry.local.display(), error = %e, "local scan failed");
                }
            }
        }
        self.downstream.send(SyncMsg::LocalScanComplete);
    }

    fn route(&self, values: BTreeSet<PathBuf>) {
        // Every root appears in the map, empty or not, so the sync engine
        // sees all roots each cycle.
        let mut events: IndexMap<PathBuf, BTreeSet<PathBuf>> = self
            .mapping
            .entries()
            .iter()
            .map(|e| (e.local.clone(), BTreeSet::new()))
            .collect();

        for (entry, skipper) in self.mapping.entries().iter().zip(&self.skippers) {
            for value in &values {
                let Ok(sub) = value.strip_prefix(&entry.local) else { continue };
                if sub.as_os_str().is_empty() {
                    continue;
                }
                let is_dir = std::fs::symlink_metadata(value).map(|m| m.is_dir()).unwrap_or(false);
                if skipper.allows(sub, is_dir) {
                    if let Some(set) = events.get_mut(&entry.local) {
                        set.insert(sub.to_path_buf());
                    }
                }
            }
        }

        self.downstream.send(SyncMsg::Events(events));
    }
}

#[async_trait]
impl Actor for IgnoreFilter {
    type Msg = FilterMsg;

    async fn handle(&mut self, msg: FilterMsg) {
        match msg {
            FilterMsg::Scan => self.scan(),
            FilterMsg::Paths(values) => self.route(values),
        }
    }
}

#[cfg(test)]
#[path = "skip_tests.rs"]
mod tests;
