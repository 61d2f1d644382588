use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::DomainError;

/// Audio input device as enumerated by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Backend-assigned device index.
    pub index: u32,
    /// Human-readable device name.
    pub name: String,
}

/// The backend has shipped both `{"index":0,"name":"Mic"}` and `[0, "Mic"]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireDevice {
    Object { index: u32, name: String },
    Pair(u32, String),
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WireDevice::deserialize(deserializer)? {
            WireDevice::Object { index, name } | WireDevice::Pair(index, name) => {
                Device { index, name }
            }
        })
    }
}

/// Whether the operator's device choice has been accepted by the backend.
///
/// Transitions once, `Unselected -> DeviceConfirmed`, and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    #[default]
    Unselected,
    DeviceConfirmed,
}

impl SessionState {
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, SessionState::DeviceConfirmed)
    }
}

/// Body of `POST /api/use_device`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UseDeviceRequest {
    pub device_id: DeviceId,
}

/// Numeric device id as sent on the wire.
///
/// Operator input may be any numeric literal ("1.5", "-2", "1e3"), which the
/// backend coerces itself, so integral values go out as JSON integers and the
/// rest as floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceId {
    Integer(i64),
    Float(f64),
}

impl DeviceId {
    fn from_f64(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            DeviceId::Integer(value as i64)
        } else {
            DeviceId::Float(value)
        }
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceId::Integer(v) => write!(f, "{}", v),
            DeviceId::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Validate operator input the way a numeric text field does: trimmed,
/// non-empty, finite decimal number.
///
/// Stricter than a lenient `Number()`-style coercion in four places: blank input
/// (which `Number` reads as `0`), `Infinity` (serialized as `null`), and the
/// `0x`/`0b` radix prefixes are all rejected instead of being sent on.
pub fn parse_device_index(raw: &str) -> Result<DeviceId, DomainError> {
    let invalid = || DomainError::InvalidDeviceIndex {
        input: raw.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    // Rust accepts "inf" and "NaN" as floats; an operator typing them did not
    // mean a device.
    let value: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }

    Ok(DeviceId::from_f64(value))
}
