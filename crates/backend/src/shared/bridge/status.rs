use chrono::{DateTime, Utc};
use contracts::system::bridge::{
    BridgeStatus, LibraryStats, QueueStatus, ServiceFlags, STATUS_OFFLINE,
};
use serde_json::{Map, Value};

use super::client::BridgeClient;
use crate::shared::format::format_uptime;
use crate::shared::logger::LogStore;

/// Keys the canonical status shape consumes; everything else goes to `data`.
const CANONICAL_KEYS: &[&str] = &[
    "status",
    "uptime",
    "uptime_seconds",
    "uptime_string",
    "version",
    "message",
    "queue_status",
    "queue_size",
    "browser_status",
    "library_stats",
    "services",
    "last_check",
];

/// Bridge status merged with log store reachability. Never fails.
pub async fn compose_status(
    bridge: &BridgeClient,
    store: &dyn LogStore,
    status_path: &str,
    stale_after_secs: i64,
) -> BridgeStatus {
    let (payload, ping) = tokio::join!(bridge.get_json(status_path), store.ping());
    let now = Utc::now();

    if let Err(e) = &ping {
        tracing::warn!(kind = ?e.kind, "Log store ping failed: {}", e.message);
    }

    match payload {
        Ok(payload) => narrow_status(payload, ping.is_ok(), now, stale_after_secs),
        Err(e) => {
            tracing::warn!("Bridge status unavailable at {}: {}", bridge.base_url(), e);
            BridgeStatus::unreachable(now.to_rfc3339(), e.to_string())
        }
    }
}

/// Validate an untyped status payload into `BridgeStatus`.
pub fn narrow_status(
    payload: Value,
    store_reachable: bool,
    now: DateTime<Utc>,
    stale_after_secs: i64,
) -> BridgeStatus {
    let last_check = now.to_rfc3339();
    let Value::Object(mut fields) = payload else {
        return BridgeStatus::unreachable(last_check, "Bridge returned a malformed status payload");
    };

    // current_time is the bridge's naive local clock, so only an offset-carrying
    // last_updated can be compared with ours
    let reported_at = fields
        .get("last_updated")
        .and_then(Value::as_str)
        .and_then(parse_timestamp);
    if let Some(reported_at) = reported_at {
        if (now - reported_at).num_seconds() > stale_after_secs {
            let mut status = BridgeStatus::unreachable(last_check, "Service status is stale");
            status.status = STATUS_OFFLINE.to_string();
            status.services.database = store_reachable;
            status.data = Some(fields);
            return status;
        }
    }

    let uptime = fields
        .get("uptime_seconds")
        .and_then(Value::as_f64)
        .or_else(|| fields.get("uptime").and_then(Value::as_f64))
        .unwrap_or(0.0);
    let uptime_display = ["uptime_string", "uptime"]
        .iter()
        .find_map(|key| fields.get(*key).and_then(Value::as_str).map(String::from))
        .or_else(|| (uptime > 0.0).then(|| format_uptime(uptime as u64)));

    let queue_status = fields
        .get("queue_status")
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<QueueStatus>(v.clone()).ok())
        .or_else(|| {
            fields.get("queue_size").and_then(Value::as_u64).map(|n| QueueStatus {
                total_queued: n,
                ..Default::default()
            })
        });

    let library_stats = fields
        .get("library_stats")
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<LibraryStats>(v.clone()).ok());

    let mut services = fields
        .get("services")
        .and_then(|v| serde_json::from_value::<ServiceFlags>(v.clone()).ok())
        .unwrap_or_default();
    services.database |= store_reachable;

    let status = BridgeStatus {
        status: string_field(&fields, "status").unwrap_or_else(|| "unknown".to_string()),
        uptime,
        uptime_display,
        version: string_field(&fields, "version").unwrap_or_else(|| "unknown".to_string()),
        last_check,
        message: string_field(&fields, "message"),
        queue_status,
        browser_status: string_field(&fields, "browser_status"),
        library_stats,
        services,
        data: None,
    };

    fields.retain(|key, _| !CANONICAL_KEYS.contains(&key.as_str()));
    BridgeStatus {
        data: (!fields.is_empty()).then_some(fields),
        ..status
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(String::from)
}

/// Timestamps with an explicit offset only. Naive values carry no zone and are ignored.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .or_else(|_| DateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f%:z"))
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::logger::store::testing::FakeLogStore;
    use crate::shared::logger::StoreErrorKind;
    use contracts::system::bridge::STATUS_UNREACHABLE;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_narrow_maps_bridge_fields() {
        let payload = json!({
            "status": "running",
            "version": "0.8.1",
            "uptime_seconds": 3725.0,
            "uptime": "1h 2m 5s",
            "start_time": "2026-03-01T10:57:55",
            "current_time": "2026-03-01T11:59:58",
            "queue_size": 4,
            "browser_status": "initialized",
            "automatic_processing": true,
            "show_subscription": false
        });

        let status = narrow_status(payload, true, now(), 30);
        assert_eq!(status.status, "running");
        assert_eq!(status.version, "0.8.1");
        assert_eq!(status.uptime, 3725.0);
        assert_eq!(status.uptime_display.as_deref(), Some("1h 2m 5s"));
        assert_eq!(status.queue_status.unwrap().total_queued, 4);
        assert_eq!(status.browser_status.as_deref(), Some("initialized"));
        assert!(status.services.database);
        assert!(!status.services.trakt);

        let data = status.data.unwrap();
        assert_eq!(data["automatic_processing"], true);
        assert!(data.contains_key("start_time"));
        assert!(!data.contains_key("status"));
    }

    #[test]
    fn test_stale_status_is_offline() {
        let payload = json!({
            "status": "running",
            "last_updated": "2026-03-01T11:58:00Z",
            "services": { "database": true, "overseerr": true }
        });
        let status = narrow_status(payload, false, now(), 30);
        assert_eq!(status.status, STATUS_OFFLINE);
        assert_eq!(status.message.as_deref(), Some("Service status is stale"));
        assert!(!status.services.overseerr);
    }

    #[test]
    fn test_services_flags_are_taken_from_payload() {
        let payload = json!({
            "status": "running",
            "services": { "database": false, "overseerr": true, "realdebrid": true, "trakt": false }
        });
        let status = narrow_status(payload, false, now(), 30);
        assert_eq!(
            status.services,
            ServiceFlags { database: false, overseerr: true, realdebrid: true, trakt: false }
        );
        assert!(status.data.is_none());
    }

    #[test]
    fn test_malformed_payload_is_not_trusted() {
        let status = narrow_status(json!("running"), true, now(), 30);
        assert_eq!(status.status, STATUS_UNREACHABLE);
        assert_eq!(status.services, ServiceFlags::default());
    }

    #[test]
    fn test_naive_clock_behind_utc_is_not_stale() {
        // Bridge west of UTC: its local clock reads five hours behind ours
        let payload = json!({
            "status": "running",
            "current_time": "2026-03-01T07:00:00.123456",
            "last_updated": "2026-03-01 06:59:50",
        });
        let status = narrow_status(payload, true, now(), 30);
        assert_eq!(status.status, "running");
        assert!(status.message.is_none());
        assert!(status.data.unwrap().contains_key("current_time"));
    }

    #[test]
    fn test_fresh_offset_timestamp_is_running() {
        let payload = json!({ "status": "running", "last_updated": "2026-03-01T14:59:50+03:00" });
        let status = narrow_status(payload, true, now(), 30);
        assert_eq!(status.status, "running");
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2026-03-01T11:59:58+03:00").is_some());
        assert!(parse_timestamp("2026-03-01T11:59:58.5Z").is_some());
        assert!(parse_timestamp("2026-03-01 11:59:58+00:00").is_some());
        assert!(parse_timestamp("2026-03-01T11:59:58.123456").is_none());
        assert!(parse_timestamp("2026-03-01 11:59:58").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_bridge_reports_all_services_down() {
        let client = BridgeClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let store = FakeLogStore::default();

        let status = compose_status(&client, &store, "/status", 30).await;
        assert_eq!(status.status, STATUS_UNREACHABLE);
        assert_eq!(status.services, ServiceFlags::default());
        assert!(status.message.is_some());
    }

    #[tokio::test]
    async fn test_store_ping_sets_database_flag() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/status");
            then.status(200).json_body(json!({ "status": "running", "version": "0.8.1" }));
        });
        let client = BridgeClient::new(server.base_url(), Duration::from_secs(5)).unwrap();

        let up = compose_status(&client, &FakeLogStore::default(), "/status", 30).await;
        assert_eq!(up.status, "running");
        assert!(up.services.database);

        let down = FakeLogStore::failing(StoreErrorKind::Unavailable);
        let status = compose_status(&client, &down, "/status", 30).await;
        assert!(!status.services.database);
    }

    #[tokio::test]
    async fn test_bridge_error_status_is_unreachable() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/status");
            then.status(500).body("internal error");
        });
        let client = BridgeClient::new(server.base_url(), Duration::from_secs(5)).unwrap();

        let status = compose_status(&client, &FakeLogStore::default(), "/status", 30).await;
        assert_eq!(status.status, STATUS_UNREACHABLE);
        assert!(status.message.unwrap().contains("500"));
    }
}
