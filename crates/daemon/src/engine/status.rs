// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing status aggregation.
//!
//! Collapses progress signals into one `(icon, tooltip)` pair with a
//! 100 ms flicker window: the first change applies immediately, later
//! ones within the window only overwrite the pending state.

use super::actor::{Actor, Addr, Scheduler};
use async_trait::async_trait;
use std::time::Duration;
use tether_core::Clock;

pub const ICON_INIT: &str = "blue-tick";
pub const ICON_SYNCING: &str = "blue-sync";
pub const ICON_DONE: &str = "green-tick";
pub const ICON_ERROR: &str = "red-cross";
pub const ICON_GREY: &str = "grey-dash";

const FLICKER_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum StatusMsg {
    /// A sync cycle started streaming work.
    Syncing,
    /// The completion barrier was acked with nothing left in flight.
    Done,
    /// Transport trouble; reconnecting.
    Error(String),
    /// The session gave up.
    Greyed(String),
    /// Progress counters, accumulated until the next Done.
    FilesAndBytes { files: u64, bytes: u64 },
    /// Scheduled end of a flicker window.
    Debounce,
}

/// The outside world's view: a tray-like icon and tooltip.
pub trait StatusSink: Send + 'static {
    fn set_image(&mut self, token: &str);
    fn set_tooltip(&mut self, text: &str);
}

/// Production sink: the status surface is the log.
pub struct LogSink;

impl StatusSink for LogSink {
    fn set_image(&mut self, token: &str) {
        tracing::info!(icon = token, "status icon");
    }

    fn set_tooltip(&mut self, text: &str) {
        tracing::info!(tooltip = text, "status tooltip");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IconState {
    image: &'static str,
    tooltip: String,
}

pub struct StatusView<C: Clock, S: StatusSink> {
    clock: C,
    sink: S,
    self_addr: Addr<StatusMsg>,
    sched: Scheduler,
    icon: IconState,
    pending: Option<IconState>,
    debouncing: bool,
    files: u64,
    bytes: u64,
}

impl<C: Clock, S: StatusSink> StatusView<C, S> {
    pub fn new(clock: C, mut sink: S, self_addr: Addr<StatusMsg>, sched: Scheduler) -> Self {
        let icon = IconState { image: ICON_INIT, tooltip: "tether ready".to_string() };
        sink.set_image(icon.image);
        sink.set_tooltip(&icon.tooltip);
        Self {
            clock,
            sink,
            self_addr,
            sched,
            icon,
            pending: None,
            debouncing: false,
            files: 0,
            bytes: 0,
        }
    }

    fn proposed(&mut self, msg: StatusMsg) -> Option<IconState> {
        match msg {
            StatusMsg::Syncing => Some(IconState {
                image: ICON_SYNCING,
                tooltip: "Syncing files".to_string(),
            }),
            StatusMsg::Done => {
                let tooltip = format!(
                    "Syncing Complete\n{} files {} bytes\n{}",
                    self.files,
                    self.bytes,
                    local_timestamp(self.clock.epoch_ms()),
                );
                self.files = 0;
                self.bytes = 0;
                Some(IconState { image: ICON_DONE, tooltip })
            }
            StatusMsg::Error(tooltip) => Some(IconState { image: ICON_ERROR, tooltip }),
            StatusMsg::Greyed(tooltip) => Some(IconState { image: ICON_GREY, tooltip }),
            StatusMsg::FilesAndBytes { .. } | StatusMsg::Debounce => None,
        }
    }

    fn propose(&mut self, next: IconState) {
        if self.debouncing {
            self.pending = Some(next);
            return;
        }
        let changed = next.image != self.icon.image;
        self.apply(next);
        if changed {
            self.debouncing = true;
            self.sched.send_after(&self.self_addr, StatusMsg::Debounce, FLICKER_WINDOW);
        }
    }

    fn apply(&mut self, next: IconState) {
        if next.image != self.icon.image {
            self.sink.set_image(next.image);
        }
        if next.tooltip != self.icon.tooltip {
            self.sink.set_tooltip(&next.tooltip);
        }
        self.icon = next;
    }
}

#[async_trait]
impl<C: Clock, S: StatusSink> Actor for StatusView<C, S> {
    type Msg = StatusMsg;

    async fn handle(&mut self, msg: StatusMsg) {
        match msg {
            StatusMsg::FilesAndBytes { files, bytes } => {
                self.files += files;
                self.bytes += bytes;
            }
            StatusMsg::Debounce => {
                self.debouncing = false;
                if let Some(next) = self.pending.take() {
                    self.propose(next);
                }
            }
            other => {
                if let Some(next) = self.proposed(other) {
                    self.propose(next);
                }
            }
        }
    }
}

fn local_timestamp(epoch_ms: u64) -> String {
    use chrono::TimeZone;
    match chrono::Local.timestamp_millis_opt(epoch_ms as i64) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => String::new(),
    }
}

#[cfg(any(test, feature = "test-support"))]
mod recording {
    use super::StatusSink;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorded {
        images: Vec<String>,
        tooltips: Vec<String>,
    }

    /// Test sink that remembers every icon and tooltip it was shown.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        inner: Arc<Mutex<Recorded>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn images(&self) -> Vec<String> {
            self.inner.lock().images.clone()
        }

        pub fn tooltips(&self) -> Vec<String> {
            self.inner.lock().tooltips.clone()
        }

        pub fn last_image(&self) -> Option<String> {
            self.inner.lock().images.last().cloned()
        }

        pub fn last_tooltip(&self) -> Option<String> {
            self.inner.lock().tooltips.last().cloned()
        }
    }

    impl StatusSink for RecordingSink {
        fn set_image(&mut self, token: &str) {
            self.inner.lock().images.push(token.to_string());
        }

        fn set_tooltip(&mut self, text: &str) {
            self.inner.lock().tooltips.push(text.to_string());
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use recording::RecordingSink;

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
