use crate::Notifier;
use async_trait::async_trait;
use phonebot_models::MailgunConfig;
use std::time::Duration;
use tracing::{error, info, instrument};

pub struct MailgunNotifier {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunNotifier {
    pub fn new(config: MailgunConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.config.base_url.trim_end_matches('/'),
            self.config.domain
        )
    }

    pub fn from_address(&self) -> String {
        format!("{} <postmaster@{}>", self.config.from_name, self.config.domain)
    }
}

#[async_trait]
impl Notifier for MailgunNotifier {
    #[instrument(skip(self, text))]
    async fn send_email(&self, to: &str, subject: &str, text: &str) -> bool {
        let from = self.from_address();
        let form = [("from", from.as_str()), ("to", to), ("subject", subject), ("text", text)];

        let result = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(&self.config.api_key))
            .form(&form)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(response) => {
                info!(to = %to, status = %response.status(), "Mailgun accepted e-mail");
                true
            }
            Err(e) => {
                error!(to = %to, error = %e, "Mailgun delivery failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Form, http::HeaderMap, http::StatusCode, routing::post, Router};
    use std::collections::HashMap;

    fn config(base_url: String) -> MailgunConfig {
        MailgunConfig {
            base_url,
            domain: "mg.example.com".to_string(),
            api_key: "key-123".to_string(),
            from_name: "Chatty.io Notifications".to_string(),
            timeout_secs: 5,
        }
    }

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_urls() {
        let notifier = MailgunNotifier::new(config("https://api.mailgun.net/".into())).unwrap();
        assert_eq!(
            notifier.messages_url(),
            "https://api.mailgun.net/v3/mg.example.com/messages"
        );
        assert_eq!(
            notifier.from_address(),
            "Chatty.io Notifications <postmaster@mg.example.com>"
        );
    }

    #[tokio::test]
    async fn test_posts_form_with_basic_auth() {
        let app = Router::new().route(
            "/v3/mg.example.com/messages",
            post(|headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                // "api:key-123" in base64
                if auth == "Basic YXBpOmtleS0xMjM="
                    && form.get("to").map(String::as_str) == Some("owner@example.com")
                    && form.get("subject").map(String::as_str) == Some("New lead")
                {
                    StatusCode::OK
                } else {
                    StatusCode::BAD_REQUEST
                }
            }),
        );
        let base = spawn(app).await;
        let notifier = MailgunNotifier::new(config(base)).unwrap();
        assert!(notifier.send_email("owner@example.com", "New lead", "body").await);
        assert!(!notifier.send_email("someone@example.com", "New lead", "body").await);
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_false() {
        let notifier = MailgunNotifier::new(config("http://127.0.0.1:9".into())).unwrap();
        assert!(!notifier.send_email("owner@example.com", "subject", "text").await);
    }
}
