// src/notify/email.rs
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use lettre::message::{header, Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::existing_files;

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSender {
    /// Build from SMTP_* / NOTIFY_EMAIL_* env vars. Returns `None` when
    /// SMTP_HOST is unset: delivery is optional and the run proceeds without it.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(host) = std::env::var("SMTP_HOST") else {
            return Ok(None);
        };
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let from_addr = std::env::var("NOTIFY_EMAIL_FROM").context("NOTIFY_EMAIL_FROM missing")?;
        let to_addr = std::env::var("NOTIFY_EMAIL_TO").context("NOTIFY_EMAIL_TO missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid NOTIFY_EMAIL_TO")?;

        Ok(Some(Self { mailer, from, to }))
    }

    /// Send a run summary with the produced files attached. Paths that do
    /// not exist are skipped.
    pub async fn send_files(&self, summary_lines: &[String], files: &[PathBuf]) -> Result<()> {
        let subject = format!("rankwatch report {}", Utc::now().format("%Y-%m-%d %H:%M UTC"));
        let body = summary_lines.join("\n");

        let mut multipart = MultiPart::mixed().singlepart(
            SinglePart::builder()
                .header(header::ContentType::TEXT_PLAIN)
                .body(body),
        );

        for path in existing_files(files) {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "export.csv".to_string());
            let content = tokio::fs::read(path)
                .await
                .with_context(|| format!("reading attachment {}", path.display()))?;
            let content_type =
                header::ContentType::parse("text/csv").context("attachment content type")?;
            multipart = multipart.singlepart(Attachment::new(filename).body(content, content_type));
        }

        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .multipart(multipart)
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }
}
