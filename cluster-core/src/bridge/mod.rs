//! Per-cycle bridge between the telemetry stream and the cluster driver.
//!
//! The owning poll loop hands the bridge one telemetry line and one monotonic
//! timestamp per cycle. The bridge decodes the frame, advances both blink
//! channels, and forwards every remaining field straight to the driver. A
//! frame that fails to decode propagates before any driver call is made, so
//! a skipped cycle leaves the panel in its previous state.

use core::ops::Add;
use core::time::Duration;

use crate::blinker::{Side, TurnSignalController};
use crate::clock::MonotonicInstant;
use crate::cluster::ClusterDriver;
use crate::frame::{FrameError, TelemetrySnapshot, decode_frame};

/// Owns the blink controller and the cluster driver for the process lifetime.
pub struct ClusterBridge<D, TInstant> {
    driver: D,
    blinkers: TurnSignalController<TInstant>,
}

impl<D, TInstant> ClusterBridge<D, TInstant>
where
    D: ClusterDriver,
    TInstant: MonotonicInstant + Add<Duration, Output = TInstant>,
{
    /// Creates a bridge wrapping the provided driver, with both blink
    /// channels idle.
    #[must_use]
    pub const fn new(driver: D) -> Self {
        Self {
            driver,
            blinkers: TurnSignalController::new(),
        }
    }

    /// Accesses the wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Read-only view of the blink controller.
    #[must_use]
    pub fn blinkers(&self) -> &TurnSignalController<TInstant> {
        &self.blinkers
    }

    /// Services one polling cycle from a raw telemetry line.
    ///
    /// # Errors
    ///
    /// Returns the decode failure without touching the driver or the blink
    /// channels; the caller skips the cycle and retries on the next frame.
    pub fn service_line(&mut self, line: &str, now: TInstant) -> Result<(), FrameError> {
        let snapshot = decode_frame(line)?;
        self.apply(&snapshot, now);
        Ok(())
    }

    /// Applies one decoded snapshot to the driver.
    ///
    /// Both blink channels are advanced with the cycle timestamp, then every
    /// pass-through field is re-asserted. Lamp commands are delivered every
    /// cycle, including `Off` re-assertions.
    pub fn apply(&mut self, snapshot: &TelemetrySnapshot, now: TInstant) {
        let left = self.blinkers.update(Side::Left, snapshot.left_turn, now);
        self.driver.set_blinker(Side::Left, left);

        let right = self.blinkers.update(Side::Right, snapshot.right_turn, now);
        self.driver.set_blinker(Side::Right, right);

        self.driver.set_time(snapshot.clock);
        self.driver.set_outdoor_temp(snapshot.oil_temp);
        self.driver.set_coolant_temp(snapshot.coolant_temp);
        self.driver.set_speed(snapshot.speed);
        self.driver.set_gas_level(snapshot.fuel_percent);
        self.driver.set_rpm(snapshot.rpm);
        self.driver.set_gear(snapshot.gear);
        self.driver.set_mileage(snapshot.mileage);
        self.driver.set_chime(snapshot.chime);
        self.driver.set_brightness(snapshot.brightness);
        self.driver.set_high_beam(snapshot.high_beam);
        self.driver.set_fog(snapshot.fog);
        self.driver.set_brake(snapshot.brake);
    }
}
