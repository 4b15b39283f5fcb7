use chrono::FixedOffset;
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::TableLayout;
use crate::models::alert::{
    FireEvent, NotifiedStatus, EVENT_COL_LAT, EVENT_COL_LNG, EVENT_COL_REGION, EVENT_COL_STATUS,
    EVENT_COL_TIMESTAMP,
};
use crate::models::responsible::Responsible;
use crate::notify::{alert_body, alert_subject, maps_link, Notifier, NotifyError};
use crate::store::{RowStore, StoreError};
use crate::timestamp::{self, TimestampError};

/// Raw query parameters as received. Presence and non-emptiness are checked
/// here, not at the HTTP layer, so the store observably gets zero calls on
/// bad input.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    pub region_id: Option<String>,
    pub timestamp: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Event persisted and the responsible party notified.
    Notified {
        row: usize,
        email: String,
        maps_link: String,
    },
    /// Byte-identical repeat of an existing event; nothing was written.
    Duplicate { row: usize },
    /// Event persisted, but the region has no directory entry.
    Unroutable { row: usize },
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("missing or empty parameter: {0}")]
    MissingParam(&'static str),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Sequences one alert end-to-end: validate, dedup, persist, resolve,
/// notify, finalize. Persistence comes before resolution and dispatch on
/// purpose: the event of record must survive a routing or delivery failure,
/// and the status column, not the HTTP response, says whether we notified.
pub struct AlertProcessor {
    store: Arc<dyn RowStore>,
    notifier: Arc<dyn Notifier>,
    layout: TableLayout,
    reference_offset: FixedOffset,
    // The store cannot serialize concurrent writers itself, so the dedup
    // read and the append run under a per-region lock.
    region_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AlertProcessor {
    pub fn new(
        store: Arc<dyn RowStore>,
        notifier: Arc<dyn Notifier>,
        layout: TableLayout,
        reference_offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            notifier,
            layout,
            reference_offset,
            region_locks: Mutex::new(HashMap::new()),
        }
    }

    pub async fn process(&self, request: &AlertRequest) -> Result<AlertOutcome, ProcessError> {
        // Validating
        let region = require("regionId", request.region_id.as_deref())?;
        let raw_timestamp = require("timestamp", request.timestamp.as_deref())?;
        let lat = require("lat", request.lat.as_deref())?;
        let lng = require("lng", request.lng.as_deref())?;
        let normalized = timestamp::normalize(raw_timestamp, self.reference_offset)?;
        info!(region, timestamp = %normalized, state = "validated");

        // Deduplicating + Persisting, serialized per region
        let lock = self.region_lock(region);
        let row = {
            let _guard = lock.lock().await;
            let rows = self.store.read_all(&self.layout.events_table).await?;
            if let Some(existing) = find_duplicate(&rows, region, &normalized, lat, lng) {
                info!(region, row = existing, state = "duplicate");
                return Ok(AlertOutcome::Duplicate { row: existing });
            }

            let event = FireEvent::pending(region, &normalized, lat, lng);
            let row = self
                .store
                .append(&self.layout.events_table, event.into_row())
                .await?;
            info!(region, row, state = "persisted");
            row
        };

        // Resolving
        let directory = self.store.read_all(&self.layout.responsibles_table).await?;
        let Some(email) = resolve(&directory, region) else {
            self.store
                .set_cell(
                    &self.layout.events_table,
                    row,
                    EVENT_COL_STATUS,
                    NotifiedStatus::NoResponsibleFound.as_str(),
                )
                .await?;
            warn!(region, row, state = "unroutable");
            return Ok(AlertOutcome::Unroutable { row });
        };

        // Notifying. On dispatch failure the status stays empty: the record
        // exists but notification is unconfirmed, which is the follow-up
        // signal operators look for.
        let subject = alert_subject(region);
        let body = alert_body(region, &normalized, lat, lng);
        self.notifier.send(&email, &subject, &body).await?;

        // Finalizing
        self.store
            .set_cell(
                &self.layout.events_table,
                row,
                EVENT_COL_STATUS,
                NotifiedStatus::Notified.as_str(),
            )
            .await?;
        info!(region, row, email = %email, state = "notified");

        Ok(AlertOutcome::Notified {
            row,
            email,
            maps_link: maps_link(lat, lng),
        })
    }

    fn region_lock(&self, region: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.region_locks.lock();
        locks.entry(region.to_string()).or_default().clone()
    }
}

fn require<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, ProcessError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ProcessError::MissingParam(name)),
    }
}

/// First data row matching the quadruple exactly, in stored order. String
/// equality is intentional: a byte-identical retry is a no-op, while any
/// reformatting (even `-22.9` vs `-22.90`) counts as a new event.
fn find_duplicate(
    rows: &[Vec<String>],
    region: &str,
    timestamp: &str,
    lat: &str,
    lng: &str,
) -> Option<usize> {
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| {
            row.get(EVENT_COL_REGION).map(String::as_str) == Some(region)
                && row.get(EVENT_COL_TIMESTAMP).map(String::as_str) == Some(timestamp)
                && row.get(EVENT_COL_LAT).map(String::as_str) == Some(lat)
                && row.get(EVENT_COL_LNG).map(String::as_str) == Some(lng)
        })
        .map(|(index, _)| index)
}

/// First directory row for the region wins; duplicate entries further down
/// are ignored, matching how the directory has always been read.
fn resolve(rows: &[Vec<String>], region: &str) -> Option<String> {
    rows.iter()
        .skip(1)
        .filter_map(|row| Responsible::from_row(row))
        .find(|r| r.region == region)
        .map(|r| r.email)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_row(region: &str, ts: &str, lat: &str, lng: &str) -> Vec<String> {
        vec![
            region.into(),
            ts.into(),
            lat.into(),
            lng.into(),
            String::new(),
        ]
    }

    fn history() -> Vec<Vec<String>> {
        vec![
            vec!["region".into(), "timestamp".into(), "lat".into(), "lng".into(), "notified_status".into()],
            event_row("EEEG", "08/12/2025 17:00:00", "-21.45", "-41.05"),
            event_row("PARNASO", "08/12/2025 17:00:00", "-22.45", "-42.99"),
        ]
    }

    #[test]
    fn test_find_duplicate_exact_match() {
        let rows = history();
        assert_eq!(
            find_duplicate(&rows, "PARNASO", "08/12/2025 17:00:00", "-22.45", "-42.99"),
            Some(2)
        );
    }

    #[test]
    fn test_find_duplicate_ignores_header() {
        let rows = history();
        assert_eq!(find_duplicate(&rows, "region", "timestamp", "lat", "lng"), None);
    }

    #[test]
    fn test_reformatted_coordinate_is_not_a_duplicate() {
        let rows = history();
        assert_eq!(
            find_duplicate(&rows, "EEEG", "08/12/2025 17:00:00", "-21.450", "-41.05"),
            None
        );
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let rows = vec![
            vec!["region".into(), "email".into()],
            vec!["EEEG".into(), "guarda@eeeg.rj.gov.br".into()],
            vec!["EEEG".into(), "segunda@eeeg.rj.gov.br".into()],
        ];
        assert_eq!(resolve(&rows, "EEEG").as_deref(), Some("guarda@eeeg.rj.gov.br"));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let rows = vec![
            vec!["region".into(), "email".into()],
            vec!["EEEG".into(), "guarda@eeeg.rj.gov.br".into()],
        ];
        assert_eq!(resolve(&rows, "eeeg"), None);
    }

    #[test]
    fn test_require_rejects_empty() {
        assert!(require("lat", Some("")).is_err());
        assert!(require("lat", None).is_err());
        assert_eq!(require("lat", Some("-21.4")).unwrap(), "-21.4");
    }
}
