use anyhow::{bail, Result};
use dotenvy::dotenv;
use std::env;

/// Names of the two collaborator tables. Built once at startup and handed to
/// the processor; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub events_table: String,
    pub responsibles_table: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_host: String,
    pub http_port: u16,
    pub store_backend: String,
    pub notifier_backend: String,
    pub database_url: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
    pub layout: TableLayout,
    pub tz_offset_hours: i32,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let http_host = env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        let store_backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".to_string());
        let notifier_backend = env::var("NOTIFIER_BACKEND").unwrap_or_else(|_| "smtp".to_string());
        if !matches!(store_backend.as_str(), "postgres" | "memory") {
            bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{store_backend}'");
        }
        if !matches!(notifier_backend.as_str(), "smtp" | "log") {
            bail!("NOTIFIER_BACKEND must be 'smtp' or 'log', got '{notifier_backend}'");
        }

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "queimadas".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "queimadas".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "queimadas".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "465".to_string())
            .parse()
            .unwrap_or(465);
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_default();
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_default();
        let smtp_from =
            env::var("SMTP_FROM").unwrap_or_else(|_| "alertas@queimadas.local".to_string());

        let layout = TableLayout {
            events_table: env::var("EVENTS_TABLE").unwrap_or_else(|_| "queimadas".to_string()),
            responsibles_table: env::var("RESPONSIBLES_TABLE")
                .unwrap_or_else(|_| "responsaveis".to_string()),
        };

        // Detection timestamps arrive in UTC; stored timestamps use this offset.
        let tz_offset_hours = env::var("TZ_OFFSET_HOURS")
            .unwrap_or_else(|_| "-3".to_string())
            .parse()
            .unwrap_or(-3);
        if !(-12..=14).contains(&tz_offset_hours) {
            bail!("TZ_OFFSET_HOURS must be between -12 and 14, got {tz_offset_hours}");
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            http_host,
            http_port,
            store_backend,
            notifier_backend,
            database_url,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_from,
            layout,
            tz_offset_hours,
            log_level,
        })
    }
}
