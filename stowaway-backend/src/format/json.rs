use bytes::Bytes;
use stowaway_core::{Raw, Snapshot};

use super::{Format, FormatError};

/// JSON format (default)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl Format for JsonFormat {
    fn serialize(&self, snapshot: &Snapshot) -> Result<Raw, FormatError> {
        serde_json::to_vec(snapshot)
            .map(Bytes::from)
            .map_err(|e| FormatError::Serialize(Box::new(e)))
    }

    fn deserialize(&self, data: &[u8]) -> Result<Snapshot, FormatError> {
        serde_json::from_slice(data).map_err(|e| FormatError::Deserialize(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, StatusCode};

    #[test]
    fn snapshot_keeps_status_headers_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/css"));
        headers.append("vary", HeaderValue::from_static("accept"));
        headers.append("vary", HeaderValue::from_static("accept-encoding"));
        let snapshot = Snapshot::new(StatusCode::OK, headers, "body { margin: 0 }");

        let raw = JsonFormat.serialize(&snapshot).unwrap();
        let decoded = JsonFormat.deserialize(&raw).unwrap();

        assert_eq!(decoded, snapshot);
        assert_eq!(decoded.headers().get_all("vary").iter().count(), 2);
    }

    #[test]
    fn garbage_is_a_deserialize_error() {
        let err = JsonFormat.deserialize(b"not json").unwrap_err();
        assert!(matches!(err, FormatError::Deserialize(_)));
    }
}
