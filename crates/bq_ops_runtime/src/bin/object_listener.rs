use std::collections::HashMap;
use std::io::Read;
use std::process::exit;

use base64::Engine as _;
use bq_ops_core::contract::ObjectNotification;
use bq_ops_runtime::adapters::bigquery::BigQueryClient;
use bq_ops_runtime::handlers::ingest::{run_event_ingest, DatasetTarget};
use serde::Deserialize;
use serde_json::json;

/// Pub/Sub push envelope wrapping a storage-change notification.
#[derive(Debug, Deserialize)]
struct PushEnvelope {
    message: PushMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushMessage {
    data: String,
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    attributes: HashMap<String, String>,
}

#[derive(Debug, PartialEq, Eq)]
struct DecodedEvent {
    notification: ObjectNotification,
    event_id: Option<String>,
    event_type: Option<String>,
}

fn decode_push_envelope(raw: &str) -> Result<DecodedEvent, String> {
    let envelope: PushEnvelope =
        serde_json::from_str(raw).map_err(|error| format!("malformed push envelope: {error}"))?;

    let payload = base64::engine::general_purpose::STANDARD
        .decode(envelope.message.data.as_bytes())
        .map_err(|error| format!("push message data is not valid base64: {error}"))?;
    let notification: ObjectNotification = serde_json::from_slice(&payload)
        .map_err(|error| format!("invalid object notification payload: {error}"))?;

    Ok(DecodedEvent {
        notification,
        event_id: envelope.message.message_id,
        event_type: envelope.message.attributes.get("eventType").cloned(),
    })
}

fn main() {
    let mut raw = String::new();
    if let Err(error) = std::io::stdin().read_to_string(&mut raw) {
        eprintln!("failed to read event from stdin: {error}");
        exit(1);
    }

    let event = match decode_push_envelope(&raw) {
        Ok(event) => event,
        Err(error) => {
            eprintln!("{error}");
            exit(1);
        }
    };

    let project = require_env("GCP_PROJECT");
    let dataset = require_env("DATASET");
    let access_token = require_env("GCP_ACCESS_TOKEN");

    eprintln!(
        "{}",
        json!({
            "component": "object_listener",
            "event": "notification_received",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": {
                "event_id": event.event_id,
                "event_type": event.event_type,
                "bucket": event.notification.bucket,
                "object": event.notification.name,
                "metageneration": event.notification.metageneration,
                "created": event.notification.time_created,
                "updated": event.notification.updated,
                "content_type": event.notification.content_type,
            },
        })
    );

    let bigquery = BigQueryClient::new(&project, &access_token);
    let target = DatasetTarget { project, dataset };

    match run_event_ingest(&target, &event.notification, &bigquery) {
        Ok(Some(report)) => println!(
            "Loaded data to table {}, num rows {}",
            report.table_id, report.row_count
        ),
        Ok(None) => println!("skipped {}: not a csv object.", event.notification.name),
        Err(error) => {
            eprintln!("{error}");
            exit(1);
        }
    }
}

fn require_env(name: &str) -> String {
    match std::env::var(name) {
        Ok(value) => value,
        Err(_) => {
            eprintln!("{name} must be configured");
            exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope_with(payload: serde_json::Value) -> String {
        let data =
            base64::engine::general_purpose::STANDARD.encode(payload.to_string().as_bytes());
        json!({
            "message": {
                "data": data,
                "messageId": "event-123",
                "attributes": {"eventType": "OBJECT_FINALIZE"}
            },
            "subscription": "projects/proj/subscriptions/gcs-notifications"
        })
        .to_string()
    }

    #[test]
    fn decodes_notification_from_push_envelope() {
        let raw = envelope_with(json!({
            "bucket": "reports-inbound",
            "name": "2024-03-01 revenue.csv",
            "contentType": "text/csv"
        }));

        let event = decode_push_envelope(&raw).expect("envelope should decode");
        assert_eq!(event.event_id.as_deref(), Some("event-123"));
        assert_eq!(event.event_type.as_deref(), Some("OBJECT_FINALIZE"));
        assert_eq!(event.notification.bucket, "reports-inbound");
        assert_eq!(event.notification.name, "2024-03-01 revenue.csv");
        assert!(event.notification.is_csv());
    }

    #[test]
    fn rejects_envelope_without_message() {
        let error = decode_push_envelope("{}").expect_err("missing message should fail");
        assert!(error.contains("malformed push envelope"));
    }

    #[test]
    fn rejects_non_base64_data() {
        let raw = json!({
            "message": {"data": "not base64!!"}
        })
        .to_string();

        let error = decode_push_envelope(&raw).expect_err("bad base64 should fail");
        assert!(error.contains("not valid base64"));
    }

    #[test]
    fn rejects_data_that_is_not_a_notification() {
        let data = base64::engine::general_purpose::STANDARD.encode(b"[1, 2, 3]");
        let raw = json!({
            "message": {"data": data}
        })
        .to_string();

        let error = decode_push_envelope(&raw).expect_err("non-notification payload should fail");
        assert!(error.contains("invalid object notification payload"));
    }
}
