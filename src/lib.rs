//! Sliding-window data-link protocol suite: Go-Back-N (cumulative-ACK,
//! NAK-assisted, and ACK-less/piggyback-only variants) and Selective
//! Repeat, sharing a common window-management core and event-loop
//! skeleton.

#![forbid(unsafe_code, unused_must_use)]
#![warn(clippy::all, missing_docs)]

/// Common channel / loss-model config used by the simulation harness.
pub mod common;

/// Gilbert-Elliot bit-error-rate channel model.
pub mod channel;

/// Synchronous discrete-event scheduler backing the simulated timer
/// service.
pub mod event_loop;

/// The protocol core: sequence arithmetic, frame codec, sender/receiver
/// windows, variant policies, and the event-loop skeleton.
pub mod core;

/// Simulated physical/network layers used by the simulation driver and
/// integration tests.
pub mod layers;

/// End-to-end simulation driver wiring an `Endpoint` pair over a lossy
/// channel for all four variants.
pub mod simulation;

pub use channel::GilbertElliotChannel;
