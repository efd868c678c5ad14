// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response vocabulary: what the agent sends back.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tether_core::Signature;

/// Response from the agent.
///
/// The agent acks remote messages strictly in receive order, so an `Ack`
/// always matches the oldest unacked message in the daemon's replay
/// buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    #[serde(rename = "resp:ack")]
    Ack,

    /// One node of a [`FullScan`](crate::Rpc::FullScan) enumeration.
    #[serde(rename = "resp:scanned")]
    Scanned { base: PathBuf, sub: PathBuf, sig: Signature },

    /// Non-fatal agent-side error report.
    #[serde(rename = "resp:error")]
    Error { message: String },
}
