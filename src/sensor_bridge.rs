// src/sensor_bridge.rs - Barbell motion sensor identifiers and payload decoding
use crate::error::{Result, TrackingError};
use uuid::{uuid, Uuid};

pub const SENSOR_DEVICE_NAME: &str = "VBT-Barbell";
pub const SENSOR_SERVICE_UUID: Uuid = uuid!("4fafc201-1fb5-459e-8fcc-c5c9c331914b");
pub const ACCEL_CHARACTERISTIC_UUID: Uuid = uuid!("beb5483e-36e1-4688-b7f5-ea07361b26a8");

/// Decode one characteristic notification. The sensor sends the acceleration
/// magnitude in m/s^2 as decimal text.
pub fn decode_accel_payload(payload: &[u8]) -> Result<f64> {
    let text = std::str::from_utf8(payload)?;
    let trimmed = text.trim_matches(|c: char| c.is_whitespace() || c == '\0');

    let value: f64 = trimmed
        .parse()
        .map_err(|_| TrackingError::PayloadValue(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(TrackingError::PayloadValue(trimmed.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_reading() {
        assert_eq!(decode_accel_payload(b"11.42").unwrap(), 11.42);
    }

    #[test]
    fn tolerates_padding() {
        assert_eq!(decode_accel_payload(b" 9.81\r\n\0").unwrap(), 9.81);
        assert_eq!(decode_accel_payload(b"-3").unwrap(), -3.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_accel_payload(b"abc"), Err(TrackingError::PayloadValue(_))));
        assert!(matches!(decode_accel_payload(b"inf"), Err(TrackingError::PayloadValue(_))));
        assert!(matches!(decode_accel_payload(b""), Err(TrackingError::PayloadValue(_))));
        assert!(matches!(
            decode_accel_payload(&[0xff, 0xfe]),
            Err(TrackingError::PayloadEncoding(_))
        ));
    }

    #[test]
    fn identifiers_are_stable() {
        assert_eq!(SENSOR_DEVICE_NAME, "VBT-Barbell");
        assert_eq!(
            SENSOR_SERVICE_UUID.to_string(),
            "4fafc201-1fb5-459e-8fcc-c5c9c331914b"
        );
        assert_eq!(
            ACCEL_CHARACTERISTIC_UUID.to_string(),
            "beb5483e-36e1-4688-b7f5-ea07361b26a8"
        );
    }
}
