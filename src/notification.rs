//! Administrator notifications - Outbound alerts sent when an employee reaches the
//! computer quota.
//!
//! The engine only depends on the [`Notifier`] trait; [`HttpNotifier`] delivers a JSON
//! payload to the configured endpoint with a single `POST`.

use crate::config::settings::NotificationSettings;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::{future::Future, time::Duration};
use thiserror::Error;
use tracing::{debug, instrument};

/// Severity level attached to quota notifications.
pub const WARNING: &str = "warning";

/// Failure while delivering a notification.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("error building notification client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("error sending notification request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("error sending notification request: unexpected status code {status}")]
    UnexpectedStatus { status: u16 },

    #[error("malformed notification response: {message}")]
    MalformedResponse { message: String },
}

/// Wire payload understood by the notification service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification<'a> {
    #[serde(rename = "employeeAbbreviation")]
    pub employee_abbreviation: &'a str,
    /// Severity, always [`WARNING`] for quota alerts
    pub level: &'a str,
    /// Free-form text shown to the administrator
    pub message: &'a str,
}

/// Something that can alert a system administrator.
pub trait Notifier: Send + Sync {
    /// Delivers `message` about the employee identified by `employee_abbreviation`.
    fn notify_system_administrator(
        &self,
        employee_abbreviation: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

/// Notifier that posts to an HTTP endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    /// Builds a notifier for `settings.url` with a bounded request timeout.
    pub fn new(settings: &NotificationSettings) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(NotificationError::Client)?;
        Ok(Self {
            client,
            url: settings.url.clone(),
        })
    }

    /// The endpoint notifications are posted to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Notifier for HttpNotifier {
    #[instrument(skip(self, message), fields(url = %self.url))]
    async fn notify_system_administrator(
        &self,
        employee_abbreviation: &str,
        message: &str,
    ) -> Result<(), NotificationError> {
        let payload = Notification {
            employee_abbreviation,
            level: WARNING,
            message,
        };

        let resp = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(NotificationError::Transport)?;

        if resp.status() != StatusCode::OK {
            return Err(NotificationError::UnexpectedStatus {
                status: resp.status().as_u16(),
            });
        }

        // The body is not used, but it must be a JSON object.
        let body: serde_json::Value =
            resp.json()
                .await
                .map_err(|e| NotificationError::MalformedResponse {
                    message: e.to_string(),
                })?;
        if !body.is_object() {
            return Err(NotificationError::MalformedResponse {
                message: format!("expected a JSON object, got {body}"),
            });
        }

        debug!("administrator notified");
        Ok(())
    }
}
