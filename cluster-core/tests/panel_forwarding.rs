use cluster_core::blinker::{LampCommand, Side};
use cluster_core::bridge::ClusterBridge;
use cluster_core::clock::MillisInstant;
use cluster_core::cluster::ClusterDriver;
use cluster_core::frame::{ClockTime, FrameError, Gear};

const FRAME: &str = "90,120,3000,55,18,D,1,0,13,37,123456,0,80,1,0,1";

fn at(millis: u64) -> MillisInstant {
    MillisInstant::from_millis(millis)
}

/// Records every driver call in arrival order.
#[derive(Debug, Default)]
struct RecordingPanel {
    calls: Vec<PanelCall>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PanelCall {
    Blinker(Side, LampCommand),
    Time(ClockTime),
    OutdoorTemp(i16),
    CoolantTemp(i16),
    Speed(u16),
    GasLevel(u8),
    Rpm(u16),
    Gear(Gear),
    Mileage(u32),
    Chime(bool),
    Brightness(u8),
    HighBeam(bool),
    Fog(bool),
    Brake(bool),
}

impl ClusterDriver for RecordingPanel {
    fn set_blinker(&mut self, side: Side, command: LampCommand) {
        self.calls.push(PanelCall::Blinker(side, command));
    }

    fn set_time(&mut self, clock: ClockTime) {
        self.calls.push(PanelCall::Time(clock));
    }

    fn set_outdoor_temp(&mut self, celsius: i16) {
        self.calls.push(PanelCall::OutdoorTemp(celsius));
    }

    fn set_coolant_temp(&mut self, celsius: i16) {
        self.calls.push(PanelCall::CoolantTemp(celsius));
    }

    fn set_speed(&mut self, speed: u16) {
        self.calls.push(PanelCall::Speed(speed));
    }

    fn set_gas_level(&mut self, percent: u8) {
        self.calls.push(PanelCall::GasLevel(percent));
    }

    fn set_rpm(&mut self, rpm: u16) {
        self.calls.push(PanelCall::Rpm(rpm));
    }

    fn set_gear(&mut self, gear: Gear) {
        self.calls.push(PanelCall::Gear(gear));
    }

    fn set_mileage(&mut self, mileage: u32) {
        self.calls.push(PanelCall::Mileage(mileage));
    }

    fn set_chime(&mut self, enabled: bool) {
        self.calls.push(PanelCall::Chime(enabled));
    }

    fn set_brightness(&mut self, level: u8) {
        self.calls.push(PanelCall::Brightness(level));
    }

    fn set_high_beam(&mut self, enabled: bool) {
        self.calls.push(PanelCall::HighBeam(enabled));
    }

    fn set_fog(&mut self, enabled: bool) {
        self.calls.push(PanelCall::Fog(enabled));
    }

    fn set_brake(&mut self, enabled: bool) {
        self.calls.push(PanelCall::Brake(enabled));
    }
}

#[test]
fn one_cycle_asserts_the_full_panel() {
    let mut bridge = ClusterBridge::new(RecordingPanel::default());

    bridge
        .service_line(FRAME, at(0))
        .expect("frame should decode");

    let calls = &bridge.driver().calls;
    assert_eq!(
        calls.as_slice(),
        &[
            PanelCall::Blinker(Side::Left, LampCommand::On),
            PanelCall::Blinker(Side::Right, LampCommand::Off),
            PanelCall::Time(ClockTime::new(13, 37).unwrap()),
            PanelCall::OutdoorTemp(18),
            PanelCall::CoolantTemp(64),
            PanelCall::Speed(120),
            PanelCall::GasLevel(55),
            PanelCall::Rpm(3_000),
            PanelCall::Gear(Gear::new('D')),
            PanelCall::Mileage(123_456),
            PanelCall::Chime(false),
            PanelCall::Brightness(80),
            PanelCall::HighBeam(true),
            PanelCall::Fog(false),
            PanelCall::Brake(true),
        ]
    );
}

#[test]
fn off_lamp_is_reasserted_every_cycle() {
    let mut bridge = ClusterBridge::new(RecordingPanel::default());

    for cycle in 0..3u64 {
        bridge
            .service_line(FRAME, at(cycle * 100))
            .expect("frame should decode");
    }

    let right_commands: Vec<_> = bridge
        .driver()
        .calls
        .iter()
        .filter_map(|call| match call {
            PanelCall::Blinker(Side::Right, command) => Some(*command),
            _ => None,
        })
        .collect();

    assert_eq!(
        right_commands,
        vec![LampCommand::Off, LampCommand::Off, LampCommand::Off]
    );
}

#[test]
fn rejected_frame_performs_no_driver_calls() {
    let mut bridge = ClusterBridge::new(RecordingPanel::default());

    let err = bridge
        .service_line("90,120,3000,55,18,D,3,0,13,37,0,0,80,0,0,0", at(0))
        .expect_err("invalid turn flag should be rejected");

    assert_eq!(err, FrameError::InvalidFlag { field: "left-turn" });
    assert!(bridge.driver().calls.is_empty());
}

#[test]
fn blink_cadence_survives_a_skipped_cycle() {
    let mut bridge = ClusterBridge::new(RecordingPanel::default());

    bridge.service_line(FRAME, at(0)).unwrap();
    bridge
        .service_line("garbage", at(250))
        .expect_err("garbage line should be rejected");
    bridge.service_line(FRAME, at(510)).unwrap();

    let left_commands: Vec<_> = bridge
        .driver()
        .calls
        .iter()
        .filter_map(|call| match call {
            PanelCall::Blinker(Side::Left, command) => Some(*command),
            _ => None,
        })
        .collect();

    // The lit phase started at 0 and the skipped cycle merely delayed the
    // next toggle decision to the 510 ms sample.
    assert_eq!(left_commands, vec![LampCommand::On, LampCommand::Off]);
}
