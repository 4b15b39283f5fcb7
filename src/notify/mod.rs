use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub mod smtp;

pub use smtp::SmtpNotifier;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notification address: {0}")]
    InvalidAddress(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivery collaborator. The processor only builds content and calls this;
/// a failed dispatch must surface as an error, never be swallowed.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Uses the raw coordinate strings exactly as supplied by the caller.
pub fn maps_link(lat: &str, lng: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={},{}",
        lat, lng
    )
}

pub fn alert_subject(region: &str) -> String {
    format!("Alerta de queimada - {}", region)
}

pub fn alert_body(region: &str, timestamp: &str, lat: &str, lng: &str) -> String {
    format!(
        "Novo foco de queimada detectado.\n\n\
         Regiao: {}\n\
         Data/hora: {}\n\
         Coordenadas: {}, {}\n\
         Mapa: {}\n",
        region,
        timestamp,
        lat,
        lng,
        maps_link(lat, lng)
    )
}

/// Dev-mode notifier: writes the alert to the log instead of delivering it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(to, subject, "notification (log backend)\n{}", body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_link_keeps_raw_coordinates() {
        assert_eq!(
            maps_link("-21.45", "-41.050"),
            "https://www.google.com/maps/search/?api=1&query=-21.45,-41.050"
        );
    }

    #[test]
    fn test_alert_body_carries_all_fields() {
        let body = alert_body("EEEG", "08/12/2025 17:00:00", "-21.45", "-41.05");
        assert!(body.contains("EEEG"));
        assert!(body.contains("08/12/2025 17:00:00"));
        assert!(body.contains("-21.45, -41.05"));
        assert!(body.contains("query=-21.45,-41.05"));
    }
}
