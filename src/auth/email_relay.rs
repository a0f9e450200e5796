use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::EmailRelayConfig;

/// Delivers password reset links by email.
#[async_trait::async_trait]
pub trait EmailRelay: Send + Sync {
    fn get_name(&self) -> &str;
    async fn send_reset_link(&self, to_email: &str, reset_link: &str) -> Result<(), String>;
}

/// Build the relay described by the configuration, or a disabled one.
pub fn create_email_relay(config: Option<&EmailRelayConfig>) -> Arc<dyn EmailRelay> {
    match config {
        Some(config) => Arc::new(EmailJsRelay::new(config)),
        None => {
            info!("No email relay configured; password reset emails are disabled");
            Arc::new(DisabledRelay)
        }
    }
}

/// Sends through the EmailJS REST API with a template that takes
/// `to_email` and `reset_link` parameters.
pub struct EmailJsRelay {
    config: EmailRelayConfig,
    http: reqwest::Client,
}

impl EmailJsRelay {
    pub fn new(config: &EmailRelayConfig) -> Self {
        info!(
            "Creating EmailJS relay for service '{}', template '{}', timeout {} ms",
            config.service_id, config.template_id, config.timeout_in_ms
        );
        Self {
            config: config.clone(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_in_ms))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl EmailRelay for EmailJsRelay {
    fn get_name(&self) -> &str {
        "emailjs"
    }

    async fn send_reset_link(&self, to_email: &str, reset_link: &str) -> Result<(), String> {
        let body = json!({
            "service_id": self.config.service_id,
            "template_id": self.config.template_id,
            "user_id": self.config.public_key,
            "template_params": {
                "to_email": to_email,
                "reset_link": reset_link,
            },
        });

        debug!("Sending reset email through {}", self.config.url);
        let response = self
            .http
            .post(&self.config.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Error sending request: {}", e))?;

        if response.status().is_success() {
            info!(
                event_name = "auth.password_reset.email_sent",
                event_domain = "auth",
                relay = self.get_name(),
                "Password reset email sent"
            );
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                event_name = "auth.password_reset.email_failed",
                event_domain = "auth",
                relay = self.get_name(),
                status = status.as_u16(),
                "Email relay refused the message: {}",
                text
            );
            Err(format!("Unexpected status code: {}", status))
        }
    }
}

/// Refuses to send; the reset flow reports the missing relay to the user.
pub struct DisabledRelay;

#[async_trait::async_trait]
impl EmailRelay for DisabledRelay {
    fn get_name(&self) -> &str {
        "disabled"
    }

    async fn send_reset_link(&self, _to_email: &str, _reset_link: &str) -> Result<(), String> {
        Err("Email relay is not configured".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config(url: String) -> EmailRelayConfig {
        EmailRelayConfig {
            url,
            service_id: "service_x".to_string(),
            template_id: "template_y".to_string(),
            public_key: "pk_z".to_string(),
            timeout_in_ms: 2000,
        }
    }

    #[tokio::test]
    async fn emailjs_payload_carries_template_params() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/api/v1.0/email/send")
            .match_body(Matcher::Json(json!({
                "service_id": "service_x",
                "template_id": "template_y",
                "user_id": "pk_z",
                "template_params": {
                    "to_email": "ana@example.com",
                    "reset_link": "http://localhost:5173/reset-password/abc"
                }
            })))
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let relay = EmailJsRelay::new(&config(format!("{}/api/v1.0/email/send", server.url())));
        relay
            .send_reset_link("ana@example.com", "http://localhost:5173/reset-password/abc")
            .await
            .unwrap();
        m.assert_async().await;
    }

    #[tokio::test]
    async fn emailjs_rejection_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/send")
            .with_status(400)
            .with_body("The Public Key is invalid")
            .create_async()
            .await;

        let relay = EmailJsRelay::new(&config(format!("{}/send", server.url())));
        assert!(relay.send_reset_link("a@b.c", "link").await.is_err());
    }

    #[tokio::test]
    async fn unreachable_relay_times_out_with_configured_limit() {
        // accepts the connection but never answers
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/send", listener.local_addr().unwrap());

        let mut slow = config(url);
        slow.timeout_in_ms = 200;
        let relay = EmailJsRelay::new(&slow);

        let started = std::time::Instant::now();
        let err = relay.send_reset_link("a@b.c", "link").await.unwrap_err();
        assert!(err.starts_with("Error sending request"), "{}", err);
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(listener);
    }

    #[tokio::test]
    async fn missing_config_yields_disabled_relay() {
        let relay = create_email_relay(None);
        assert_eq!(relay.get_name(), "disabled");
        assert!(relay.send_reset_link("a@b.c", "link").await.is_err());
    }
}
