use core::fmt;
use std::path::{Path, PathBuf};

use derive_more::Display;
use lettre::Transport;
use log::{error, info, warn};

use crate::certificate::{write_certificate, Certificate, CertificateRenderer};
use crate::input::{Attendee, Branding, Club, Event};
use crate::mail::Mail;

/// What happened to a single attendee during a run.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DeliveryOutcome {
    #[display("sent")]
    Sent,
    #[display("no email address")]
    MissingEmail,
    #[display("rendering failed: {}", _0)]
    RenderFailed(String),
    #[display("sending failed: {}", _0)]
    SendFailed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    generated: usize,
    outcomes: Vec<(String, DeliveryOutcome)>,
}

impl DeliveryReport {
    fn push(&mut self, name: &str, outcome: DeliveryOutcome) {
        self.outcomes.push((name.to_string(), outcome));
    }

    /// The number of certificates that were written.
    #[must_use]
    pub fn generated(&self) -> usize {
        self.generated
    }

    /// One entry per attendee, in the order they were processed.
    #[must_use]
    pub fn outcomes(&self) -> &[(String, DeliveryOutcome)] {
        &self.outcomes
    }

    fn count(&self, predicate: impl Fn(&DeliveryOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }

    #[must_use]
    pub fn sent(&self) -> usize {
        self.count(|outcome| *outcome == DeliveryOutcome::Sent)
    }

    #[must_use]
    pub fn missing_email(&self) -> usize {
        self.count(|outcome| *outcome == DeliveryOutcome::MissingEmail)
    }

    #[must_use]
    pub fn render_failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::RenderFailed(_)))
    }

    #[must_use]
    pub fn send_failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeliveryOutcome::SendFailed(_)))
    }
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully generated {} certificates and sent {} emails",
            self.generated,
            self.sent()
        )
    }
}

/// The result of writing certificates without sending them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    written: Vec<PathBuf>,
    failed: Vec<(String, String)>,
}

impl GenerationReport {
    #[must_use]
    pub fn generated(&self) -> usize {
        self.written.len()
    }

    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Attendee names with the reason their certificate could not be written.
    #[must_use]
    pub fn failures(&self) -> &[(String, String)] {
        &self.failed
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Successfully generated {} certificates", self.generated())?;

        if !self.failed.is_empty() {
            write!(f, ", {} failed", self.failed.len())?;
        }

        Ok(())
    }
}

/// Certificates for every attendee of one event.
///
/// Attendees are processed one after another. A failure for one attendee is
/// logged and recorded, it never stops the batch.
pub struct CertificateBatch<'a, R> {
    renderer: R,
    event: &'a Event,
    club: &'a Club,
    branding: &'a Branding,
    output_dir: &'a Path,
}

impl<'a, R: CertificateRenderer> CertificateBatch<'a, R> {
    #[must_use]
    pub fn new(
        renderer: R,
        event: &'a Event,
        club: &'a Club,
        branding: &'a Branding,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            renderer,
            event,
            club,
            branding,
            output_dir,
        }
    }

    fn certificate<'b>(&'b self, attendee: &'b Attendee) -> Certificate<'b> {
        Certificate::new(attendee, self.event, self.club, self.branding)
    }

    fn write(&self, certificate: &Certificate<'_>) -> Result<(PathBuf, Vec<u8>), String> {
        let name = certificate.attendee().name();

        match write_certificate(&self.renderer, certificate, self.output_dir) {
            Ok(written) => {
                info!("Generated certificate for {}", name);
                Ok(written)
            }
            Err(e) => {
                error!("failed to generate certificate for {}: {:?}", name, e);
                Err(format!("{:#}", e))
            }
        }
    }

    pub fn generate_all(&self, attendees: &[Attendee]) -> GenerationReport {
        let mut report = GenerationReport::default();

        for attendee in attendees {
            match self.write(&self.certificate(attendee)) {
                Ok((path, _)) => report.written.push(path),
                Err(reason) => report.failed.push((attendee.name().to_string(), reason)),
            }
        }

        report
    }

    /// Writes every certificate and emails it to its attendee.
    pub fn deliver<T>(&self, attendees: &[Attendee], mail: &Mail, transport: &T) -> DeliveryReport
    where
        T: Transport,
        T::Error: fmt::Display,
    {
        let mut report = DeliveryReport::default();

        for attendee in attendees {
            let name = attendee.name();
            let certificate = self.certificate(attendee);

            let pdf = match self.write(&certificate) {
                Ok((_, pdf)) => pdf,
                Err(reason) => {
                    report.push(name, DeliveryOutcome::RenderFailed(reason));
                    continue;
                }
            };
            report.generated += 1;

            let Some(email) = attendee.email() else {
                warn!("no email address for {}, the certificate is not sent", name);
                report.push(name, DeliveryOutcome::MissingEmail);
                continue;
            };

            let result = mail
                .certificate_message(&certificate, email, pdf)
                .and_then(|message| {
                    transport
                        .send(&message)
                        .map_err(|e| anyhow::anyhow!("{}", e))
                });

            match result {
                Ok(_) => {
                    info!("Email sent to {} ({})", name, email);
                    report.push(name, DeliveryOutcome::Sent);
                }
                Err(e) => {
                    error!("failed to send email to {}: {:?}", name, e);
                    report.push(name, DeliveryOutcome::SendFailed(format!("{:#}", e)));
                }
            }
        }

        report
    }
}
