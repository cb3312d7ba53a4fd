//! Telemetry frame decoding.
//!
//! The simulation host streams one frame per polling cycle: sixteen fields in
//! a fixed order, comma-delimited, with the final field terminated by a
//! newline. The decoder turns one such line into a [`TelemetrySnapshot`] or
//! rejects it as a whole; no partially decoded frame ever reaches the bridge.
//!
//! Field order on the wire: coolant temp, speed, rpm, fuel %, oil temp, gear
//! letter, left-turn flag, right-turn flag, hour, minute, mileage, chime
//! flag, brightness, high-beam flag, fog flag, brake flag.

use core::fmt;

use heapless::Vec;
use winnow::ascii::{digit1, line_ending};
use winnow::combinator::{opt, terminated};
use winnow::token::take_till;
use winnow::{ModalResult, Parser};

use crate::blinker::TurnRequest;

/// Upper bound on one frame's wire length, including slack for wide mileage
/// and temperature values.
pub const MAX_FRAME_BYTES: usize = 128;

/// Gauge scale applied to the raw coolant field, as a percentage. The host
/// reports game-engine units; the cluster gauge expects 72% of that value,
/// rounded toward negative infinity.
const COOLANT_GAUGE_PERCENT: i64 = 72;

/// Gear indicator letter shown on the cluster.
///
/// The host sends free-form text for this field; only the first character is
/// displayed, matching the cluster's single-character gear position readout.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Gear(char);

impl Gear {
    /// Wraps an indicator character.
    #[must_use]
    pub const fn new(indicator: char) -> Self {
        Self(indicator)
    }

    /// Returns the character to display.
    #[must_use]
    pub const fn indicator(self) -> char {
        self.0
    }
}

/// Wall-clock time carried by the frame for the cluster's clock face.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Builds a clock value, rejecting out-of-range components.
    #[must_use]
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour <= 23 && minute <= 59 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Hour component, 0–23.
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Minute component, 0–59.
    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }
}

/// One fully decoded telemetry frame.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TelemetrySnapshot {
    /// Coolant temperature in gauge units, already scaled from engine units.
    pub coolant_temp: i16,
    /// Vehicle speed.
    pub speed: u16,
    /// Engine speed in revolutions per minute.
    pub rpm: u16,
    /// Fuel level as a percentage.
    pub fuel_percent: u8,
    /// Oil temperature, displayed on the outdoor-temperature readout.
    pub oil_temp: i16,
    /// Gear indicator letter.
    pub gear: Gear,
    /// Raw left turn-signal request.
    pub left_turn: TurnRequest,
    /// Raw right turn-signal request.
    pub right_turn: TurnRequest,
    /// Wall-clock time for the clock face.
    pub clock: ClockTime,
    /// Odometer reading for mileage tracking.
    pub mileage: u32,
    /// Chime request flag.
    pub chime: bool,
    /// Backlight brightness level.
    pub brightness: u8,
    /// High-beam indicator flag.
    pub high_beam: bool,
    /// Fog-light indicator flag.
    pub fog: bool,
    /// Brake warning flag.
    pub brake: bool,
}

/// Reason a frame was rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FrameError {
    /// Line did not match the sixteen-field frame layout.
    Malformed { offset: usize },
    /// Numeric field exceeded the range its gauge can represent.
    FieldOutOfRange { field: &'static str },
    /// Flag field held something other than `0` or `1`.
    InvalidFlag { field: &'static str },
    /// Clock fields were outside 0–23 hours or 0–59 minutes.
    InvalidClock { hour: i64, minute: i64 },
    /// Gear field carried no indicator character.
    EmptyGear,
    /// Frame bytes were not valid UTF-8.
    InvalidEncoding { valid_up_to: usize },
    /// Assembler dropped a line longer than [`MAX_FRAME_BYTES`].
    LineOverflow,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Malformed { offset } => {
                write!(f, "frame layout mismatch at byte {offset}")
            }
            FrameError::FieldOutOfRange { field } => {
                write!(f, "{field} field out of range")
            }
            FrameError::InvalidFlag { field } => {
                write!(f, "{field} flag is not 0 or 1")
            }
            FrameError::InvalidClock { hour, minute } => {
                write!(f, "clock {hour}:{minute} out of range")
            }
            FrameError::EmptyGear => f.write_str("gear field is empty"),
            FrameError::InvalidEncoding { valid_up_to } => {
                write!(f, "frame is not UTF-8 after byte {valid_up_to}")
            }
            FrameError::LineOverflow => {
                write!(f, "line exceeded {MAX_FRAME_BYTES} bytes")
            }
        }
    }
}

/// Raw field values as they appear on the wire, before range validation.
struct RawFrame<'s> {
    coolant_temp: i64,
    speed: i64,
    rpm: i64,
    fuel_percent: i64,
    oil_temp: i64,
    gear: &'s str,
    left_turn: i64,
    right_turn: i64,
    hour: i64,
    minute: i64,
    mileage: i64,
    chime: i64,
    brightness: i64,
    high_beam: i64,
    fog: i64,
    brake: i64,
}

/// Signed decimal integer as the host writes it. The host zero-pads clock
/// fields (`09`, `05`), so this takes any digit run rather than canonical
/// decimal notation.
fn wire_int(input: &mut &str) -> ModalResult<i64> {
    (opt('-'), digit1)
        .take()
        .try_map(str::parse::<i64>)
        .parse_next(input)
}

fn numeric_field(input: &mut &str) -> ModalResult<i64> {
    terminated(wire_int, ',').parse_next(input)
}

fn text_field<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    terminated(take_till(0.., ','), ',').parse_next(input)
}

fn last_numeric_field(input: &mut &str) -> ModalResult<i64> {
    terminated(wire_int, opt(line_ending)).parse_next(input)
}

fn raw_frame<'s>(input: &mut &'s str) -> ModalResult<RawFrame<'s>> {
    let coolant_temp = numeric_field(input)?;
    let speed = numeric_field(input)?;
    let rpm = numeric_field(input)?;
    let fuel_percent = numeric_field(input)?;
    let oil_temp = numeric_field(input)?;
    let gear = text_field(input)?;
    let left_turn = numeric_field(input)?;
    let right_turn = numeric_field(input)?;
    let hour = numeric_field(input)?;
    let minute = numeric_field(input)?;
    let mileage = numeric_field(input)?;
    let chime = numeric_field(input)?;
    let brightness = numeric_field(input)?;
    let high_beam = numeric_field(input)?;
    let fog = numeric_field(input)?;
    let brake = last_numeric_field(input)?;

    Ok(RawFrame {
        coolant_temp,
        speed,
        rpm,
        fuel_percent,
        oil_temp,
        gear,
        left_turn,
        right_turn,
        hour,
        minute,
        mileage,
        chime,
        brightness,
        high_beam,
        fog,
        brake,
    })
}

fn narrow<T>(value: i64, field: &'static str) -> Result<T, FrameError>
where
    T: TryFrom<i64>,
{
    T::try_from(value).map_err(|_| FrameError::FieldOutOfRange { field })
}

fn flag(value: i64, field: &'static str) -> Result<bool, FrameError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(FrameError::InvalidFlag { field }),
    }
}

fn turn_flag(value: i64, field: &'static str) -> Result<TurnRequest, FrameError> {
    flag(value, field).map(|on| if on { TurnRequest::On } else { TurnRequest::Off })
}

fn clock(hour: i64, minute: i64) -> Result<ClockTime, FrameError> {
    let invalid = FrameError::InvalidClock { hour, minute };
    let hour = u8::try_from(hour).map_err(|_| invalid)?;
    let minute = u8::try_from(minute).map_err(|_| invalid)?;
    ClockTime::new(hour, minute).ok_or(invalid)
}

fn validate(raw: &RawFrame<'_>) -> Result<TelemetrySnapshot, FrameError> {
    let scaled_coolant = raw
        .coolant_temp
        .checked_mul(COOLANT_GAUGE_PERCENT)
        .ok_or(FrameError::FieldOutOfRange { field: "coolant" })?
        .div_euclid(100);
    let gear = raw.gear.chars().next().ok_or(FrameError::EmptyGear)?;

    Ok(TelemetrySnapshot {
        coolant_temp: narrow(scaled_coolant, "coolant")?,
        speed: narrow(raw.speed, "speed")?,
        rpm: narrow(raw.rpm, "rpm")?,
        fuel_percent: narrow(raw.fuel_percent, "fuel")?,
        oil_temp: narrow(raw.oil_temp, "oil")?,
        gear: Gear::new(gear),
        left_turn: turn_flag(raw.left_turn, "left-turn")?,
        right_turn: turn_flag(raw.right_turn, "right-turn")?,
        clock: clock(raw.hour, raw.minute)?,
        mileage: narrow(raw.mileage, "mileage")?,
        chime: flag(raw.chime, "chime")?,
        brightness: narrow(raw.brightness, "brightness")?,
        high_beam: flag(raw.high_beam, "high-beam")?,
        fog: flag(raw.fog, "fog")?,
        brake: flag(raw.brake, "brake")?,
    })
}

/// Decodes one telemetry line into a snapshot.
///
/// The trailing newline is optional; the transport may hand over either the
/// raw line or a pre-trimmed one.
///
/// # Errors
///
/// Returns a [`FrameError`] when the line does not hold exactly sixteen
/// well-formed fields, or when a field fails range or flag validation.
pub fn decode_frame(line: &str) -> Result<TelemetrySnapshot, FrameError> {
    let raw = raw_frame
        .parse(line)
        .map_err(|err| FrameError::Malformed {
            offset: err.offset(),
        })?;

    validate(&raw)
}

/// Bounded accumulator turning a transport byte stream into decoded frames.
///
/// Bytes are buffered until a newline terminates the frame. A line that
/// outgrows [`MAX_FRAME_BYTES`] is discarded through its terminator and
/// reported as [`FrameError::LineOverflow`], after which assembly resumes
/// with the next line.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8, MAX_FRAME_BYTES>,
    discarding: bool,
}

impl FrameAssembler {
    /// Creates an empty assembler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            discarding: false,
        }
    }

    /// Feeds one byte from the transport.
    ///
    /// Returns `Some` when the byte completes a frame: either the decoded
    /// snapshot or the reason the buffered line was rejected. Returns `None`
    /// while a frame is still being accumulated.
    pub fn push_byte(&mut self, byte: u8) -> Option<Result<TelemetrySnapshot, FrameError>> {
        if byte == b'\n' {
            if self.discarding {
                self.discarding = false;
                return Some(Err(FrameError::LineOverflow));
            }
            let result = decode_buffered(&self.buffer);
            self.buffer.clear();
            return Some(result);
        }

        if self.discarding {
            return None;
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.discarding = true;
        }
        None
    }
}

fn decode_buffered(buffer: &[u8]) -> Result<TelemetrySnapshot, FrameError> {
    let text = core::str::from_utf8(buffer).map_err(|err| FrameError::InvalidEncoding {
        valid_up_to: err.valid_up_to(),
    })?;
    decode_frame(text.strip_suffix('\r').unwrap_or(text))
}
