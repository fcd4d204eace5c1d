// SPDX-FileCopyrightText: 2026 Journeymap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the collector API.

use journeymap_core::TrackingEvent;
use serde::Serialize;

/// Payload POSTed to `{api_url}/api/events`.
///
/// The API key rides in the body as well as the `Authorization` header;
/// the collector accepts either, and older collector versions only read
/// the body field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPayload<'a> {
    pub events: &'a [TrackingEvent],
    pub api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeymap_core::SessionId;
    use serde_json::Map;

    #[test]
    fn payload_serializes_camel_case() {
        let events = vec![TrackingEvent::new(
            "page_view",
            Map::new(),
            SessionId("s-1".into()),
        )];
        let payload = EventsPayload {
            events: &events,
            api_key: "jm_test",
            tracking_id: Some("site-1"),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["apiKey"], "jm_test");
        assert_eq!(json["trackingId"], "site-1");
        assert_eq!(json["events"][0]["eventType"], "page_view");
    }

    #[test]
    fn tracking_id_omitted_when_unset() {
        let payload = EventsPayload {
            events: &[],
            api_key: "jm_test",
            tracking_id: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("trackingId").is_none());
    }
}
