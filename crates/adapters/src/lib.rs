// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tether-adapters: the engine's view of the outside world.
//!
//! Everything here is consumed through a narrow interface so the sync
//! engine itself stays free of process, filesystem-walk, and notification
//! concerns: the agent launcher, the filtered file walker, the ignore-rule
//! compiler, the block hasher, the raw filesystem-event bridge, and the
//! desktop notifier.

pub mod agent;
pub mod hasher;
pub mod notify;
pub mod skipper;
pub mod walker;
pub mod watcher;

pub use agent::{AgentPipes, LaunchError, Launcher, ProcessLauncher};
#[cfg(any(test, feature = "test-support"))]
pub use agent::{FakeAgent, FakeLauncher};
pub use hasher::{block_digest, read_block, signature_of};
pub use notify::{DesktopNotifyAdapter, NotifyAdapter, NotifyError};
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
pub use skipper::{Skipper, SkipperError};
pub use walker::{walk, WalkError};
pub use watcher::watch_roots;
