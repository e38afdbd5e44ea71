//! Sky positions and proper motions of candidate targets.

use std::fmt;
use std::str::FromStr;

use qtty::Degrees;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{float_or, string_or, Parsed, RawRecord};

/// Equinox assumed when a record does not provide one.
pub const DEFAULT_EQUINOX: &str = "J2000";

/// Epoch (Julian year) assumed when a record does not provide one.
pub const DEFAULT_EPOCH: f64 = 2000.0;

/// Celestial reference frame of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frame {
    Icrs,
    Fk5,
    Fk4,
}

impl Default for Frame {
    fn default() -> Self {
        Frame::Icrs
    }
}

impl FromStr for Frame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "icrs" => Ok(Frame::Icrs),
            "fk5" => Ok(Frame::Fk5),
            "fk4" => Ok(Frame::Fk4),
            other => Err(format!("Unknown reference frame: {}", other)),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frame::Icrs => "icrs",
            Frame::Fk5 => "fk5",
            Frame::Fk4 => "fk4",
        };
        f.write_str(name)
    }
}

/// Equatorial position of a target.
///
/// `equinox` and `epoch` are always populated; records that omit them get
/// [`DEFAULT_EQUINOX`] and [`DEFAULT_EPOCH`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ra: Degrees,
    pub dec: Degrees,
    pub frame: Frame,
    pub equinox: String,
    /// Epoch of the coordinates as a Julian year.
    pub epoch: f64,
}

impl Position {
    /// Position in the given frame with default equinox and epoch.
    pub fn new(ra: Degrees, dec: Degrees, frame: Frame) -> Self {
        Self {
            ra,
            dec,
            frame,
            equinox: DEFAULT_EQUINOX.to_string(),
            epoch: DEFAULT_EPOCH,
        }
    }

    /// Build a position from the `position`, `frame`, `equinox` and `epoch`
    /// fields of a raw target record.
    ///
    /// Returns `None` when the coordinates or the frame cannot be parsed.
    pub fn from_record(record: &RawRecord) -> Option<Self> {
        let (ra, dec) = match record.get("position")? {
            Value::String(text) => parse_coordinates(text)?,
            Value::Array(pair) if pair.len() == 2 => {
                let ra = pair[0].as_f64()?;
                let dec = pair[1].as_f64()?;
                checked_degrees(ra, dec)?
            }
            _ => return None,
        };

        let frame = match record.get("frame") {
            None | Some(Value::Null) => Frame::default(),
            Some(Value::String(name)) => name.parse().ok()?,
            Some(_) => return None,
        };

        Some(Self {
            ra,
            dec,
            frame,
            equinox: string_or(record, "equinox", DEFAULT_EQUINOX).into_value(),
            epoch: float_or(record, "epoch", DEFAULT_EPOCH).into_value(),
        })
    }
}

/// Proper motion in milliarcseconds per Julian year.
///
/// The RA component is the on-sky rate (already multiplied by cos δ).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProperMotion {
    pub ra_mas_per_year: f64,
    pub dec_mas_per_year: f64,
}

impl ProperMotion {
    pub fn new(ra_mas_per_year: f64, dec_mas_per_year: f64) -> Self {
        Self {
            ra_mas_per_year,
            dec_mas_per_year,
        }
    }

    /// Read `proper_motion` from a raw record.
    ///
    /// Accepts `"<dra> <ddec>"` or a two-element numeric array; anything else
    /// yields a zero proper motion.
    pub fn from_record(record: &RawRecord) -> Parsed<Self> {
        let pair = match record.get("proper_motion") {
            Some(Value::String(text)) => {
                let mut parts = text.split_whitespace().map(str::parse::<f64>);
                match (parts.next(), parts.next()) {
                    (Some(Ok(ra)), Some(Ok(dec))) => Some((ra, dec)),
                    _ => None,
                }
            }
            Some(Value::Array(items)) if items.len() == 2 => {
                items[0].as_f64().zip(items[1].as_f64())
            }
            _ => None,
        };

        match pair {
            Some((ra, dec)) => Parsed::given(Self::new(ra, dec)),
            None => Parsed::fallback(Self::default()),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.ra_mas_per_year == 0.0 && self.dec_mas_per_year == 0.0
    }
}

fn checked_degrees(ra: f64, dec: f64) -> Option<(Degrees, Degrees)> {
    if !(0.0..360.0).contains(&ra) || !(-90.0..=90.0).contains(&dec) {
        return None;
    }
    Some((Degrees::new(ra), Degrees::new(dec)))
}

/// Parse a sexagesimal or decimal token into its magnitude in the token's
/// leading unit (hours for RA, degrees for Dec).
fn parse_sexagesimal(token: &str) -> Option<f64> {
    let token = token.trim();
    let (sign, body) = match token.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, token.strip_prefix('+').unwrap_or(token)),
    };

    let normalized: String = body
        .chars()
        .map(|c| match c {
            ':' | 'h' | 'd' | 'm' | 's' | '°' | '\'' | '"' => ' ',
            other => other,
        })
        .collect();

    let parts = normalized
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| *p < 0.0) {
        return None;
    }

    let magnitude = parts
        .iter()
        .zip([1.0, 60.0, 3600.0])
        .map(|(value, divisor)| value / divisor)
        .sum::<f64>();

    Some(sign * magnitude)
}

/// Parse a coordinate string into (RA, Dec) in degrees.
///
/// Supported forms:
/// - decimal degrees: `"150.25 -20.5"`
/// - colon sexagesimal, RA in hours: `"10:01:00 -20:30:00"`
/// - unit sexagesimal: `"10h01m00s -20d30m00s"`
/// - space-separated sexagesimal: `"10 01 00 -20 30 00"`
pub fn parse_coordinates(text: &str) -> Option<(Degrees, Degrees)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let (ra_token, dec_token) = match tokens.len() {
        2 => (tokens[0].to_string(), tokens[1].to_string()),
        6 => (tokens[..3].join(":"), tokens[3..].join(":")),
        _ => return None,
    };

    if let (Ok(ra), Ok(dec)) = (ra_token.parse::<f64>(), dec_token.parse::<f64>()) {
        return checked_degrees(ra, dec);
    }

    let ra_hours = parse_sexagesimal(&ra_token)?;
    let dec_degrees = parse_sexagesimal(&dec_token)?;
    checked_degrees(ra_hours * 15.0, dec_degrees)
}
