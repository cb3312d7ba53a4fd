//! Replay session: an in-memory cluster panel fed by the bridge.

use std::fmt::Write as _;
use std::time::Instant as HostInstant;

use cluster_core::blinker::{LampCommand, Side};
use cluster_core::bridge::ClusterBridge;
use cluster_core::clock::MillisInstant;
use cluster_core::cluster::ClusterDriver;
use cluster_core::frame::{ClockTime, Gear};

/// Owns the bridge and the session clock for one emulator run.
pub struct Session {
    bridge: ClusterBridge<PanelState, MillisInstant>,
    started_at: HostInstant,
    frames_applied: usize,
    frames_rejected: usize,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bridge: ClusterBridge::new(PanelState::default()),
            started_at: HostInstant::now(),
            frames_applied: 0,
            frames_rejected: 0,
        }
    }

    /// Services one frame, timestamping it with the host clock.
    pub fn handle_frame(&mut self, line: &str) -> String {
        let elapsed = self.started_at.elapsed();
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.handle_frame_at(line, millis)
    }

    /// Services one frame at an explicit session timestamp.
    ///
    /// The demo profile and tests use this to keep the blink cadence
    /// deterministic.
    pub fn handle_frame_at(&mut self, line: &str, millis: u64) -> String {
        let now = MillisInstant::from_millis(millis);
        match self.bridge.service_line(line, now) {
            Ok(()) => {
                self.frames_applied += 1;
                self.bridge.driver().render()
            }
            Err(err) => {
                self.frames_rejected += 1;
                format!("frame rejected: {err}")
            }
        }
    }

    /// One-line session statistics.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{applied} frames applied, {rejected} rejected.",
            applied = self.frames_applied,
            rejected = self.frames_rejected
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest value of every panel element, as asserted by the bridge.
#[derive(Debug)]
struct PanelState {
    left_lamp: LampCommand,
    right_lamp: LampCommand,
    clock: Option<ClockTime>,
    outdoor_temp: i16,
    coolant_temp: i16,
    speed: u16,
    fuel_percent: u8,
    rpm: u16,
    gear: Option<Gear>,
    mileage: u32,
    chime: bool,
    brightness: u8,
    high_beam: bool,
    fog: bool,
    brake: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            left_lamp: LampCommand::Off,
            right_lamp: LampCommand::Off,
            clock: None,
            outdoor_temp: 0,
            coolant_temp: 0,
            speed: 0,
            fuel_percent: 0,
            rpm: 0,
            gear: None,
            mileage: 0,
            chime: false,
            brightness: 0,
            high_beam: false,
            fog: false,
            brake: false,
        }
    }
}

impl PanelState {
    fn render(&self) -> String {
        let left = if self.left_lamp.is_on() { '<' } else { ' ' };
        let right = if self.right_lamp.is_on() { '>' } else { ' ' };
        let gear = self.gear.map_or('-', Gear::indicator);
        let clock = self.clock.map_or_else(
            || "--:--".to_string(),
            |clock| format!("{:02}:{:02}", clock.hour(), clock.minute()),
        );

        let mut line = format!(
            "[{left}|{right}] {speed:>3} km/h {rpm:>4} rpm gear {gear} fuel {fuel:>3}% \
             coolant {coolant:>3}C oil {oil:>3}C {clock} odo {mileage} bri {brightness:>3}",
            speed = self.speed,
            rpm = self.rpm,
            fuel = self.fuel_percent,
            coolant = self.coolant_temp,
            oil = self.outdoor_temp,
            mileage = self.mileage,
            brightness = self.brightness,
        );

        for (lit, tag) in [
            (self.high_beam, "HIGH-BEAM"),
            (self.fog, "FOG"),
            (self.brake, "BRAKE"),
            (self.chime, "CHIME"),
        ] {
            if lit {
                let _ = write!(line, " {tag}");
            }
        }

        line
    }
}

impl ClusterDriver for PanelState {
    fn set_blinker(&mut self, side: Side, command: LampCommand) {
        match side {
            Side::Left => self.left_lamp = command,
            Side::Right => self.right_lamp = command,
        }
    }

    fn set_time(&mut self, clock: ClockTime) {
        self.clock = Some(clock);
    }

    fn set_outdoor_temp(&mut self, celsius: i16) {
        self.outdoor_temp = celsius;
    }

    fn set_coolant_temp(&mut self, celsius: i16) {
        self.coolant_temp = celsius;
    }

    fn set_speed(&mut self, speed: u16) {
        self.speed = speed;
    }

    fn set_gas_level(&mut self, percent: u8) {
        self.fuel_percent = percent;
    }

    fn set_rpm(&mut self, rpm: u16) {
        self.rpm = rpm;
    }

    fn set_gear(&mut self, gear: Gear) {
        self.gear = Some(gear);
    }

    fn set_mileage(&mut self, mileage: u32) {
        self.mileage = mileage;
    }

    fn set_chime(&mut self, enabled: bool) {
        self.chime = enabled;
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }

    fn set_high_beam(&mut self, enabled: bool) {
        self.high_beam = enabled;
    }

    fn set_fog(&mut self, enabled: bool) {
        self.fog = enabled;
    }

    fn set_brake(&mut self, enabled: bool) {
        self.brake = enabled;
    }
}

/// Scripted drive fed through the bridge in demo mode: pull away, signal
/// left, cruise, signal right, brake to a stop. One frame per 100 ms cycle.
#[must_use]
pub fn demo_profile(seconds: u64) -> Vec<(u64, String)> {
    let cycles = seconds.saturating_mul(10);
    let mut frames = Vec::new();

    for cycle in 0..cycles {
        let millis = cycle * 100;
        let second = millis / 1_000;

        let speed = (cycle * 2).min(90);
        let rpm = 900 + (cycle * 35) % 2_600;
        let gear = if speed == 0 { 'N' } else { 'D' };
        let left = u8::from((1..4).contains(&second));
        let right = u8::from((5..7).contains(&second));
        let brake = u8::from(cycle + 5 >= cycles);
        let mileage = 120_345 + cycle / 10;

        frames.push((
            millis,
            format!("88,{speed},{rpm},61,14,{gear},{left},{right},9,41,{mileage},0,70,0,0,{brake}"),
        ));
    }

    frames
}
