// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! gw-wire: the wire envelope, category projection and event sink that sit
//! between a harness runtime and the control plane's event bus.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;
mod projection;
mod sink;

pub use envelope::{WireEnvelope, WIRE_MARKER};
pub use projection::{normalize_category, project, StructuredProjection, DEFAULT_SCHEMA_VERSION};
pub use sink::{ChunkCallback, RunEventSink};
