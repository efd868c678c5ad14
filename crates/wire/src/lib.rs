// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC protocol for agent communication.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod response;
mod rpc;
mod wire;

pub use response::Response;
pub use rpc::Rpc;
pub use wire::{decode, encode, read_message, write_message, ProtocolError, MAX_FRAME_LEN};
pub use wire::{read_response, read_rpc, write_response, write_rpc};
