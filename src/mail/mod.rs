use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MailConfig;
use crate::database::models::MessageFields;

const RELAY_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay returned {0}")]
    Rejected(reqwest::StatusCode),

    #[error("No recipient configured (MAIL_TO)")]
    NoRecipient,
}

/// Outbound transactional mail to the site owner.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), MailError>;
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// POSTs `{from, to, subject, html}` to an HTTP mail relay.
pub struct HttpRelayMailer {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
    from: String,
    to: String,
}

impl HttpRelayMailer {
    pub fn new(url: String, token: Option<String>, from: String, to: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(RELAY_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http,
            url,
            token,
            from,
            to,
        }
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), MailError> {
        let body = RelayRequest {
            from: &self.from,
            to: &self.to,
            subject,
            html: html_body,
        };

        let mut req = self.http.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(MailError::Rejected(resp.status()));
        }
        debug!("Mail relay accepted '{}'", subject);
        Ok(())
    }
}

/// Used when no relay is configured: the message only reaches the log.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, subject: &str, html_body: &str) -> Result<(), MailError> {
        info!(subject, bytes = html_body.len(), "Mail relay not configured; message logged only");
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match &config.relay_url {
        Some(url) => {
            let to = config.to.clone().ok_or(MailError::NoRecipient)?;
            info!("Sending contact mail through relay {}", url);
            Ok(Arc::new(HttpRelayMailer::new(
                url.clone(),
                config.relay_token.clone(),
                config.from.clone(),
                to,
            )))
        }
        None => Ok(Arc::new(LogMailer)),
    }
}

pub const CONTACT_SUBJECT: &str = "Email From Client";

/// HTML body for a contact-form submission. Every field is escaped.
pub fn render_contact_html(message: &MessageFields) -> String {
    let field = |value: &Option<String>| html_escape(value.as_deref().unwrap_or(""));
    format!(
        "<h1>New Message from Client</h1>\n\
         <p><strong>Name:</strong> {}</p>\n\
         <p><strong>Email:</strong> {}</p>\n\
         <p><strong>Phone:</strong> {}</p>\n\
         <p><strong>Company Name:</strong> {}</p>\n\
         <p><strong>Message:</strong> {}</p>\n",
        field(&message.name),
        field(&message.email),
        field(&message.phone),
        field(&message.company_name),
        field(&message.message),
    )
}

pub fn html_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
