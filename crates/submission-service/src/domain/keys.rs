//! Wire types for submitted keys.
//!
//! The request body is a protobuf `SubmissionPayload`:
//!
//! ```text
//! message SubmissionPayload {
//!   repeated TemporaryExposureKey keys = 1;
//! }
//! message TemporaryExposureKey {
//!   bytes key_data = 1;
//!   int32 transmission_risk_level = 2;
//!   int32 rolling_start_interval_number = 3;
//!   int32 rolling_period = 4;
//! }
//! ```

use key_persistence::DiagnosisKey;

/// A key as submitted by a client. Only lives for the duration of one request.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TemporaryExposureKey {
    #[prost(bytes = "vec", tag = "1")]
    pub key_data: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub transmission_risk_level: i32,
    #[prost(int32, tag = "3")]
    pub rolling_start_interval_number: i32,
    #[prost(int32, tag = "4")]
    pub rolling_period: i32,
}

/// Request body of a submission.
#[derive(Clone, PartialEq, prost::Message)]
pub struct SubmissionPayload {
    #[prost(message, repeated, tag = "1")]
    pub keys: Vec<TemporaryExposureKey>,
}

/// Map an accepted submission key to its persisted form.
pub fn from_submission(key: TemporaryExposureKey) -> DiagnosisKey {
    DiagnosisKey::new(
        key.key_data,
        key.rolling_start_interval_number,
        key.rolling_period,
        key.transmission_risk_level,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_from_submission_copies_every_field() {
        let key = TemporaryExposureKey {
            key_data: vec![7; 16],
            transmission_risk_level: 5,
            rolling_start_interval_number: 2_650_000,
            rolling_period: 144,
        };

        let record = from_submission(key);

        assert_eq!(record.key_data(), &[7; 16]);
        assert_eq!(record.transmission_risk_level(), 5);
        assert_eq!(record.rolling_start_interval_number(), 2_650_000);
        assert_eq!(record.rolling_period(), 144);
    }

    #[test]
    fn test_payload_decodes_from_wire_bytes() {
        // field 1, length-delimited, containing one key with key_data "ab" and risk 3
        let key = TemporaryExposureKey {
            key_data: b"ab".to_vec(),
            transmission_risk_level: 3,
            rolling_start_interval_number: 0,
            rolling_period: 0,
        };
        let bytes = SubmissionPayload { keys: vec![key.clone()] }.encode_to_vec();
        assert_eq!(bytes, vec![0x0a, 0x06, 0x0a, 0x02, b'a', b'b', 0x10, 0x03]);

        let decoded = SubmissionPayload::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.keys, vec![key]);
    }

    #[test]
    fn test_garbage_body_fails_to_decode() {
        assert!(SubmissionPayload::decode(&b"\xff\xff\xff"[..]).is_err());
    }
}
