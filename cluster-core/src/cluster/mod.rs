//! Instrument-cluster capability surface.
//!
//! The physical cluster sits behind a vendor driver that owns the hardware
//! bus, gauge encodings, and the clock-face wire format. The bridge only
//! needs the calls below; targets supply an implementation backed by the
//! real driver, while tests and the emulator substitute in-memory panels.

use crate::blinker::{LampCommand, Side};
use crate::frame::{ClockTime, Gear};

/// Abstraction over the cluster driver's per-cycle control calls.
///
/// Every setter is idempotent on the driver side; the bridge re-asserts the
/// full panel state each cycle rather than tracking deltas.
pub trait ClusterDriver {
    /// Commands one turn-signal lamp on or off.
    fn set_blinker(&mut self, side: Side, command: LampCommand);

    /// Updates the clock face.
    fn set_time(&mut self, clock: ClockTime);

    /// Updates the outdoor-temperature readout.
    fn set_outdoor_temp(&mut self, celsius: i16);

    /// Updates the coolant-temperature gauge.
    fn set_coolant_temp(&mut self, celsius: i16);

    /// Updates the speedometer.
    fn set_speed(&mut self, speed: u16);

    /// Updates the fuel gauge.
    fn set_gas_level(&mut self, percent: u8);

    /// Updates the tachometer.
    fn set_rpm(&mut self, rpm: u16);

    /// Updates the gear position readout.
    fn set_gear(&mut self, gear: Gear);

    /// Feeds the odometer's mileage tracking.
    fn set_mileage(&mut self, mileage: u32);

    /// Enables or disables the chime.
    fn set_chime(&mut self, enabled: bool);

    /// Updates the backlight brightness.
    fn set_brightness(&mut self, level: u8);

    /// Lights or clears the high-beam indicator.
    fn set_high_beam(&mut self, enabled: bool);

    /// Lights or clears the fog-light indicator.
    fn set_fog(&mut self, enabled: bool);

    /// Lights or clears the brake warning.
    fn set_brake(&mut self, enabled: bool);
}

/// Cluster driver that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopClusterDriver;

impl NoopClusterDriver {
    /// Creates a new no-op cluster driver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ClusterDriver for NoopClusterDriver {
    fn set_blinker(&mut self, _: Side, _: LampCommand) {}

    fn set_time(&mut self, _: ClockTime) {}

    fn set_outdoor_temp(&mut self, _: i16) {}

    fn set_coolant_temp(&mut self, _: i16) {}

    fn set_speed(&mut self, _: u16) {}

    fn set_gas_level(&mut self, _: u8) {}

    fn set_rpm(&mut self, _: u16) {}

    fn set_gear(&mut self, _: Gear) {}

    fn set_mileage(&mut self, _: u32) {}

    fn set_chime(&mut self, _: bool) {}

    fn set_brightness(&mut self, _: u8) {}

    fn set_high_beam(&mut self, _: bool) {}

    fn set_fog(&mut self, _: bool) {}

    fn set_brake(&mut self, _: bool) {}
}
