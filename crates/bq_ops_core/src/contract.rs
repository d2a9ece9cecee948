use serde::{Deserialize, Serialize};

use crate::naming::Partition;

/// Content type accepted by the event-triggered loader. Anything else on a
/// storage notification is a no-op, not an error.
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Upper bound on jobs enumerated when no explicit ids are supplied.
pub const MAX_LISTED_JOBS: usize = 1_000;

/// Day-granularity time-partitioning directive attached to a load job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePartitioning {
    #[serde(rename = "type")]
    pub partition_type: String,
    pub field: String,
}

/// Load-job configuration, constructed fresh per file and never mutated
/// after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadJobConfig {
    pub create_disposition: String,
    pub write_disposition: String,
    pub schema_update_options: Vec<String>,
    pub autodetect: bool,
    pub skip_leading_rows: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_partitioning: Option<TimePartitioning>,
}

impl LoadJobConfig {
    /// Append-mode config with schema auto-detection and relaxation. Only a
    /// `Day` inference attaches a partitioning directive; `Month` and `Na`
    /// loads land unpartitioned.
    pub fn for_partition(partition: Partition) -> Self {
        let time_partitioning = match partition {
            Partition::Day => Some(TimePartitioning {
                partition_type: "DAY".to_string(),
                field: "date".to_string(),
            }),
            Partition::Month | Partition::Na => None,
        };

        Self {
            create_disposition: "CREATE_IF_NEEDED".to_string(),
            write_disposition: "WRITE_APPEND".to_string(),
            schema_update_options: vec![
                "ALLOW_FIELD_ADDITION".to_string(),
                "ALLOW_FIELD_RELAXATION".to_string(),
            ],
            autodetect: true,
            skip_leading_rows: 1,
            time_partitioning,
        }
    }
}

/// Storage-change notification payload, as delivered inside a Pub/Sub push
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectNotification {
    pub bucket: String,
    pub name: String,
    #[serde(default)]
    pub metageneration: Option<String>,
    #[serde(default)]
    pub time_created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ObjectNotification {
    pub fn is_csv(&self) -> bool {
        self.content_type.as_deref() == Some(CSV_CONTENT_TYPE)
    }
}

/// Acknowledgement echoed by the warehouse for an accepted cancellation
/// request. Acceptance only; whether the job actually stops is not verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAck {
    pub location: String,
    pub job_id: String,
}

/// Per-object outcome reported after a completed load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub object_name: String,
    pub table_id: String,
    pub row_count: u64,
}

/// Source URI addressing an object for a load job.
pub fn object_uri(bucket: &str, object_name: &str) -> String {
    format!("gs://{bucket}/{object_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_partition_attaches_directive() {
        let config = LoadJobConfig::for_partition(Partition::Day);
        let value = serde_json::to_value(&config).expect("config should serialize");

        assert_eq!(value["createDisposition"], "CREATE_IF_NEEDED");
        assert_eq!(value["writeDisposition"], "WRITE_APPEND");
        assert_eq!(
            value["schemaUpdateOptions"],
            serde_json::json!(["ALLOW_FIELD_ADDITION", "ALLOW_FIELD_RELAXATION"])
        );
        assert_eq!(value["autodetect"], true);
        assert_eq!(value["skipLeadingRows"], 1);
        assert_eq!(value["timePartitioning"]["type"], "DAY");
        assert_eq!(value["timePartitioning"]["field"], "date");
    }

    #[test]
    fn month_and_unknown_partitions_attach_no_directive() {
        for partition in [Partition::Month, Partition::Na] {
            let value = serde_json::to_value(LoadJobConfig::for_partition(partition))
                .expect("config should serialize");
            assert!(value.get("timePartitioning").is_none());
        }
    }

    #[test]
    fn notification_decodes_camel_case_payload() {
        let payload = serde_json::json!({
            "bucket": "reports-inbound",
            "name": "2024-03-01 revenue.csv",
            "metageneration": "1",
            "timeCreated": "2024-03-01T06:00:00Z",
            "updated": "2024-03-01T06:00:00Z",
            "contentType": "text/csv"
        });

        let notification: ObjectNotification =
            serde_json::from_value(payload).expect("notification should decode");
        assert_eq!(notification.bucket, "reports-inbound");
        assert!(notification.is_csv());
        assert_eq!(notification.time_created.as_deref(), Some("2024-03-01T06:00:00Z"));
    }

    #[test]
    fn non_csv_notification_fails_the_gate() {
        let notification = ObjectNotification {
            bucket: "b".to_string(),
            name: "archive.zip".to_string(),
            metageneration: None,
            time_created: None,
            updated: None,
            content_type: Some("application/zip".to_string()),
        };
        assert!(!notification.is_csv());
    }

    #[test]
    fn object_uri_prefixes_the_bucket() {
        assert_eq!(
            object_uri("reports-inbound", "inbound/report.csv"),
            "gs://reports-inbound/inbound/report.csv"
        );
    }
}
