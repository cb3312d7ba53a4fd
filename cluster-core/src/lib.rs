#![no_std]

// Shared bridge logic between a telemetry stream and an instrument cluster.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library: the frame decoder, the turn-signal controller,
// and the cluster capability trait all operate on caller-supplied monotonic
// timestamps and bounded buffers.

pub mod blinker;
pub mod bridge;
pub mod clock;
pub mod cluster;
pub mod frame;
