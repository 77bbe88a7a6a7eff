use core::fmt;
use std::env;
use std::path::Path;

use anyhow::Context as _;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MessageBuilder, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::transport::smtp::SmtpTransport;
use lettre::{Address, Message};
use log::info;
use thiserror::Error;

use crate::certificate::Certificate;
use crate::input::MailSettings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    #[error("environment variable `{variable}` must be set to send emails")]
    Missing { variable: String },
}

/// The account certificates are sent from.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Looks up the variables named in `settings`. Empty values count as
    /// missing.
    pub fn from_lookup(
        settings: &MailSettings,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CredentialsError> {
        let require = |variable: &str| {
            lookup(variable)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| CredentialsError::Missing {
                    variable: variable.to_string(),
                })
        };

        Ok(Self::new(
            require(settings.email_var())?,
            require(settings.password_var())?,
        ))
    }

    pub fn from_env(settings: &MailSettings) -> Result<Self, CredentialsError> {
        Self::from_lookup(settings, |variable| env::var(variable).ok())
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<hidden>")
            .finish()
    }
}

/// Loads `path` into the environment if it exists. Variables that are already
/// set are kept.
pub fn load_env_file(path: &Path) -> anyhow::Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }

    dotenvy::from_path(path).with_context(|| format!("failed to load `{}`", path.display()))?;
    info!("loaded environment from {}", path.display());

    Ok(true)
}

#[must_use]
pub fn certificate_subject(certificate: &Certificate<'_>) -> String {
    format!(
        "{} Certificate of Attendance - {} - {}",
        certificate.club().short_name(),
        certificate.attendee().name(),
        certificate.event().date()
    )
}

#[must_use]
pub fn certificate_body(certificate: &Certificate<'_>) -> String {
    let club = certificate.club().name();
    let event = certificate.event();

    format!(
        concat!(
            "Dear {name},\n",
            "\n",
            "Please find attached your Certificate of Attendance for the {club} presentation:\n",
            "\n",
            "Speaker: {speaker}\n",
            "Topic: {topic}\n",
            "Date: {date}\n",
            "\n",
            "Thank you for attending this presentation.\n",
            "\n",
            "Best regards,\n",
            "{club}",
        ),
        name = certificate.attendee().name(),
        club = club,
        speaker = event.speaker(),
        topic = event.topic(),
        date = event.date(),
    )
}

/// Sender and SMTP account.
#[derive(Debug, Clone)]
pub struct Mail {
    settings: MailSettings,
    sender: Mailbox,
    credentials: Credentials,
}

impl Mail {
    pub fn new(
        settings: &MailSettings,
        sender_name: &str,
        credentials: Credentials,
    ) -> anyhow::Result<Self> {
        let address = credentials
            .email()
            .parse::<Address>()
            .with_context(|| format!("`{}` is not a valid email address", credentials.email()))?;

        Ok(Self {
            settings: settings.clone(),
            sender: Mailbox::new(Some(sender_name.to_string()), address),
            credentials,
        })
    }

    #[must_use]
    pub fn builder(&self) -> MessageBuilder {
        MessageBuilder::new().from(self.sender.clone())
    }

    pub fn to_transport(&self) -> anyhow::Result<SmtpTransport> {
        let host = self.settings.host();
        let builder = {
            if self.settings.use_starttls() {
                SmtpTransport::starttls_relay(host)
            } else {
                SmtpTransport::relay(host)
            }
        }
        .with_context(|| format!("invalid smtp host `{}`", host))?;

        Ok(builder
            .port(self.settings.port())
            .credentials(SmtpCredentials::new(
                self.credentials.email.clone(),
                self.credentials.password.clone(),
            ))
            .build())
    }

    /// The email for one attendee with their certificate attached.
    pub fn certificate_message(
        &self,
        certificate: &Certificate<'_>,
        email: &str,
        pdf: Vec<u8>,
    ) -> anyhow::Result<Message> {
        let recipient = Mailbox::new(
            Some(certificate.attendee().name().to_string()),
            email
                .parse()
                .with_context(|| format!("`{}` is not a valid email address", email))?,
        );

        let attachment = Attachment::new(certificate.file_name())
            .body(pdf, ContentType::parse("application/pdf")?);

        Ok(self
            .builder()
            .to(recipient)
            .subject(certificate_subject(certificate))
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(certificate_body(certificate)))
                    .singlepart(attachment),
            )?)
    }
}
