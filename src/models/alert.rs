/// Column positions inside the event-history table. The header row sits at
/// index 0 and is never treated as data.
pub const EVENT_COL_REGION: usize = 0;
pub const EVENT_COL_TIMESTAMP: usize = 1;
pub const EVENT_COL_LAT: usize = 2;
pub const EVENT_COL_LNG: usize = 3;
pub const EVENT_COL_STATUS: usize = 4;

pub const EVENT_HEADER: [&str; 5] = ["region", "timestamp", "lat", "lng", "notified_status"];

/// Notification outcome recorded on an event row. The status is written
/// exactly once, after the row is created; a row still pending after a
/// dispatch failure is the signal for manual follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifiedStatus {
    Pending,
    Notified,
    NoResponsibleFound,
}

impl NotifiedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifiedStatus::Pending => "",
            NotifiedStatus::Notified => "notified",
            NotifiedStatus::NoResponsibleFound => "no-responsible-found",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" => Some(NotifiedStatus::Pending),
            "notified" => Some(NotifiedStatus::Notified),
            "no-responsible-found" => Some(NotifiedStatus::NoResponsibleFound),
            _ => None,
        }
    }
}

/// One fire event as stored in the history table. Coordinates keep the exact
/// string the caller supplied; dedup is byte equality, not numeric equality.
#[derive(Debug, Clone)]
pub struct FireEvent {
    pub region: String,
    pub timestamp: String,
    pub lat: String,
    pub lng: String,
    pub status: NotifiedStatus,
}

impl FireEvent {
    pub fn pending(region: &str, timestamp: &str, lat: &str, lng: &str) -> Self {
        Self {
            region: region.to_string(),
            timestamp: timestamp.to_string(),
            lat: lat.to_string(),
            lng: lng.to_string(),
            status: NotifiedStatus::Pending,
        }
    }

    pub fn into_row(self) -> Vec<String> {
        vec![
            self.region,
            self.timestamp,
            self.lat,
            self.lng,
            self.status.as_str().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            NotifiedStatus::Pending,
            NotifiedStatus::Notified,
            NotifiedStatus::NoResponsibleFound,
        ] {
            assert_eq!(NotifiedStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(NotifiedStatus::parse("sent"), None);
    }

    #[test]
    fn test_pending_event_row_matches_layout() {
        let row = FireEvent::pending("EEEG", "08/12/2025 17:00:00", "-21.45", "-41.05").into_row();
        assert_eq!(row.len(), EVENT_HEADER.len());
        assert_eq!(row[EVENT_COL_REGION], "EEEG");
        assert_eq!(row[EVENT_COL_STATUS], "");
    }
}
