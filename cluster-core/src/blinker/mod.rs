//! Turn-signal blink state machine.
//!
//! The telemetry stream carries the stalk position as a raw on/off flag per
//! side and expects the bridge to synthesize the visible blink cadence. Each
//! side owns an independent [`BlinkChannel`]; the controller is re-invoked
//! once per side per polling cycle with the sampled request and the cycle
//! timestamp, and answers with the lamp command to assert this cycle.
//!
//! Timing rules:
//! - A request edge (Off→On or On→Off) re-arms the channel immediately, so a
//!   blink period always starts from the lit phase the instant the stalk is
//!   engaged, wherever the edge falls inside a cadence window.
//! - While the request stays On, the lamp flips whenever at least
//!   [`BLINK_INTERVAL`] has elapsed since the last toggle. The recorded
//!   toggle instant advances to the scheduled 500 ms boundary rather than the
//!   sample time, so poll jitter never accumulates into cadence drift. A
//!   sample arriving more than a full interval late re-anchors the cadence at
//!   the sample time instead.
//! - While the request stays Off, the channel forces the lamp off and
//!   re-asserts `Off` every cycle; the command is idempotent.

use core::ops::Add;
use core::time::Duration;

use crate::clock::MonotonicInstant;

/// Half-period of the synthesized blink cadence.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Raw turn-signal request sampled from one telemetry frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TurnRequest {
    Off,
    On,
}

impl TurnRequest {
    /// Returns `true` when the stalk requests this side.
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, TurnRequest::On)
    }
}

/// Boolean lamp instruction forwarded to the cluster driver each cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LampCommand {
    Off,
    On,
}

impl LampCommand {
    const fn from_active(active: bool) -> Self {
        if active { LampCommand::On } else { LampCommand::Off }
    }

    /// Returns `true` when the lamp is commanded on.
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, LampCommand::On)
    }
}

/// Identifies one of the two turn-signal channels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

/// Per-side blink state.
///
/// The channel records the last sampled request, whether the lamp is
/// currently commanded on, and the instants of the last request edge and the
/// last lamp toggle. State persists across cycles and is only re-armed by a
/// request edge.
#[derive(Copy, Clone, Debug)]
pub struct BlinkChannel<TInstant> {
    request: TurnRequest,
    active: bool,
    last_edge_at: Option<TInstant>,
    last_toggle_at: Option<TInstant>,
}

impl<TInstant> BlinkChannel<TInstant>
where
    TInstant: MonotonicInstant + Add<Duration, Output = TInstant>,
{
    /// Creates an idle channel with no recorded edges.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            request: TurnRequest::Off,
            active: false,
            last_edge_at: None,
            last_toggle_at: None,
        }
    }

    /// Returns the most recently sampled request.
    #[must_use]
    pub const fn request(&self) -> TurnRequest {
        self.request
    }

    /// Returns `true` when the lamp is currently commanded on.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the instant of the last request edge, if one was observed.
    #[must_use]
    pub const fn last_edge_at(&self) -> Option<TInstant> {
        self.last_edge_at
    }

    /// Advances the channel with the request sampled at `now` and returns the
    /// lamp command to assert this cycle.
    pub fn update(&mut self, request: TurnRequest, now: TInstant) -> LampCommand {
        if request != self.request {
            self.request = request;
            self.active = request.is_on();
            self.last_edge_at = Some(now);
            self.last_toggle_at = Some(now);
        }

        match request {
            TurnRequest::On => {
                if let Some(last) = self.last_toggle_at
                    && now.saturating_duration_since(last) >= BLINK_INTERVAL
                {
                    self.active = !self.active;
                    let scheduled = last + BLINK_INTERVAL;
                    self.last_toggle_at =
                        if now.saturating_duration_since(scheduled) >= BLINK_INTERVAL {
                            // Stalled for over a full interval; restart the
                            // cadence here instead of replaying missed flips.
                            Some(now)
                        } else {
                            Some(scheduled)
                        };
                }
                LampCommand::from_active(self.active)
            }
            TurnRequest::Off => {
                self.active = false;
                LampCommand::Off
            }
        }
    }
}

impl<TInstant> Default for BlinkChannel<TInstant>
where
    TInstant: MonotonicInstant + Add<Duration, Output = TInstant>,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the left and right blink channels for the process lifetime.
pub struct TurnSignalController<TInstant> {
    left: BlinkChannel<TInstant>,
    right: BlinkChannel<TInstant>,
}

impl<TInstant> TurnSignalController<TInstant>
where
    TInstant: MonotonicInstant + Add<Duration, Output = TInstant>,
{
    /// Creates a controller with both channels idle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: BlinkChannel::new(),
            right: BlinkChannel::new(),
        }
    }

    /// Read-only view of one channel's state.
    #[must_use]
    pub const fn channel(&self, side: Side) -> &BlinkChannel<TInstant> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Advances one side with the request sampled at `now`.
    ///
    /// Called once per side per cycle. The two sides share no state, so the
    /// processing order between them does not affect either side's output.
    pub fn update(
        &mut self,
        side: Side,
        request: TurnRequest,
        now: TInstant,
    ) -> LampCommand {
        match side {
            Side::Left => self.left.update(request, now),
            Side::Right => self.right.update(request, now),
        }
    }
}

impl<TInstant> Default for TurnSignalController<TInstant>
where
    TInstant: MonotonicInstant + Add<Duration, Output = TInstant>,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MillisInstant;

    fn at(millis: u64) -> MillisInstant {
        MillisInstant::from_millis(millis)
    }

    #[test]
    fn idle_channel_emits_off_every_cycle() {
        let mut channel = BlinkChannel::new();

        for millis in [0, 90, 700, 5_000] {
            assert_eq!(channel.update(TurnRequest::Off, at(millis)), LampCommand::Off);
            assert!(!channel.is_active());
        }
        assert_eq!(channel.last_edge_at(), None);
    }

    #[test]
    fn engage_edge_lights_lamp_immediately() {
        let mut channel = BlinkChannel::new();

        channel.update(TurnRequest::Off, at(0));
        assert_eq!(channel.update(TurnRequest::On, at(440)), LampCommand::On);
        assert_eq!(channel.last_edge_at(), Some(at(440)));
    }

    #[test]
    fn lamp_toggles_on_the_half_second_grid() {
        let mut channel = BlinkChannel::new();

        assert_eq!(channel.update(TurnRequest::On, at(0)), LampCommand::On);
        assert_eq!(channel.update(TurnRequest::On, at(499)), LampCommand::On);
        assert_eq!(channel.update(TurnRequest::On, at(500)), LampCommand::Off);
        assert_eq!(channel.update(TurnRequest::On, at(999)), LampCommand::Off);
        assert_eq!(channel.update(TurnRequest::On, at(1_000)), LampCommand::On);
    }

    #[test]
    fn late_samples_do_not_drift_the_cadence() {
        let mut channel = BlinkChannel::new();

        assert_eq!(channel.update(TurnRequest::On, at(10)), LampCommand::On);
        assert_eq!(channel.update(TurnRequest::On, at(400)), LampCommand::On);
        // Boundary at 510 crossed late; toggle instant stays on the grid.
        assert_eq!(channel.update(TurnRequest::On, at(520)), LampCommand::Off);
        assert_eq!(channel.update(TurnRequest::On, at(1_010)), LampCommand::On);
    }

    #[test]
    fn stall_longer_than_an_interval_reanchors_the_cadence() {
        let mut channel = BlinkChannel::new();

        channel.update(TurnRequest::On, at(0));
        // 1.2 s gap: one flip, cadence restarts at the sample time.
        assert_eq!(channel.update(TurnRequest::On, at(1_200)), LampCommand::Off);
        assert_eq!(channel.update(TurnRequest::On, at(1_600)), LampCommand::Off);
        assert_eq!(channel.update(TurnRequest::On, at(1_700)), LampCommand::On);
    }

    #[test]
    fn repeated_sample_at_same_instant_is_idempotent() {
        let mut channel = BlinkChannel::new();

        channel.update(TurnRequest::On, at(0));
        assert_eq!(channel.update(TurnRequest::On, at(500)), LampCommand::Off);
        assert_eq!(channel.update(TurnRequest::On, at(500)), LampCommand::Off);
    }

    #[test]
    fn release_edge_forces_off_and_rearms() {
        let mut channel = BlinkChannel::new();

        assert_eq!(channel.update(TurnRequest::On, at(0)), LampCommand::On);
        assert_eq!(channel.update(TurnRequest::Off, at(120)), LampCommand::Off);
        // Re-engage immediately after release: starts lit regardless of
        // elapsed time.
        assert_eq!(channel.update(TurnRequest::On, at(130)), LampCommand::On);
    }

    #[test]
    fn controller_sides_are_independent() {
        let mut controller = TurnSignalController::new();

        assert_eq!(
            controller.update(Side::Left, TurnRequest::On, at(0)),
            LampCommand::On
        );
        assert_eq!(
            controller.update(Side::Right, TurnRequest::Off, at(0)),
            LampCommand::Off
        );
        assert_eq!(
            controller.update(Side::Left, TurnRequest::On, at(600)),
            LampCommand::Off
        );
        // The right channel never saw an edge; its state is untouched by the
        // left channel's toggles.
        assert_eq!(
            controller.update(Side::Right, TurnRequest::Off, at(600)),
            LampCommand::Off
        );
        assert!(!controller.channel(Side::Right).is_active());
        assert!(controller.channel(Side::Right).last_edge_at().is_none());
    }
}
