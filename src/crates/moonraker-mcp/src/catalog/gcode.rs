//! G-code composition for temperature commands

use crate::error::DispatchError;
use std::fmt;
use tooling::validation::Validator;

/// Reports current temperatures.
pub const READ_TEMPERATURES: &str = "M105";

/// Heaters that accept a target temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heater {
    Nozzle,
    Bed,
    Enclosure,
}

impl Heater {
    pub const NAMES: &'static [&'static str] = &["nozzle", "bed", "enclosure"];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nozzle" => Some(Heater::Nozzle),
            "bed" => Some(Heater::Bed),
            "enclosure" => Some(Heater::Enclosure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Heater::Nozzle => "nozzle",
            Heater::Bed => "bed",
            Heater::Enclosure => "enclosure",
        }
    }

    /// Set-temperature command (no wait)
    pub fn command(&self) -> &'static str {
        match self {
            Heater::Nozzle => "M104",
            Heater::Bed => "M140",
            Heater::Enclosure => "M141",
        }
    }

    /// Full G-code line setting this heater to `target`
    ///
    /// Rejects negative targets.
    pub fn set_temperature(&self, target: f64) -> Result<String, DispatchError> {
        let target = Validator::new(target, "temperature").min(0.0).validate()?;
        Ok(format!("{} S{}", self.command(), format_temperature(target)))
    }
}

impl fmt::Display for Heater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a temperature for G-code
///
/// Whole numbers keep one decimal (`210` becomes `210.0`); anything else uses
/// the shortest exact decimal form.
pub fn format_temperature(value: f64) -> String {
    // -0.0 + 0.0 is +0.0
    let value = value + 0.0;
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
