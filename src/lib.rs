mod latex_string;
mod tex_render;
mod utils;

pub mod certificate;
pub mod delivery;
pub mod input;
pub mod mail;
pub mod notice;
pub mod select;
pub mod time;

use core::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDateTime;
use lettre::Transport;
use log::info;

use crate::certificate::{CertificateRenderer, LatexRenderer};
use crate::delivery::{CertificateBatch, DeliveryReport, GenerationReport};
use crate::input::{Attendee, Config, Event};
use crate::mail::{Credentials, Mail};
use crate::notice::{LunchMessage, NoticeFields, NoticeTemplate};
use crate::select::SelectionPolicy;

/// What to put into a meeting notice and where to write it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeRequest {
    spreadsheet: PathBuf,
    output: PathBuf,
    bio: String,
    lunch: LunchMessage,
}

impl NoticeRequest {
    #[must_use]
    pub fn new(spreadsheet: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            spreadsheet: spreadsheet.into(),
            output: output.into(),
            bio: String::new(),
            lunch: LunchMessage::BringYourOwn,
        }
    }

    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    #[must_use]
    pub fn with_lunch(mut self, lunch: LunchMessage) -> Self {
        self.lunch = lunch;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeOutcome {
    Written { date: String, output: PathBuf },
    NoUpcomingEvent,
}

/// Writes the notice for the next meeting after `now`.
pub fn generate_notice(
    config: &Config,
    request: &NoticeRequest,
    now: NaiveDateTime,
) -> anyhow::Result<NoticeOutcome> {
    let events = input::load_notice_events(&request.spreadsheet)
        .with_context(|| format!("failed to load events from `{}`", request.spreadsheet.display()))?;

    let Some(event) = SelectionPolicy::NextUpcoming.select(&events, now) else {
        info!("No future events found in the spreadsheet.");
        return Ok(NoticeOutcome::NoUpcomingEvent);
    };

    let fields = NoticeFields::new(event, config.club(), &request.bio, request.lunch);
    let notice = NoticeTemplate::embedded()?.render(&fields);

    utils::write(&request.output, notice)
        .with_context(|| format!("failed to write `{}`", request.output.display()))?;

    let date = event.date().iso();
    info!(
        "Generated notice for {} event and saved to {}",
        date,
        request.output.display()
    );

    Ok(NoticeOutcome::Written {
        date,
        output: request.output.clone(),
    })
}

/// The renderer that compiles certificates with LaTeX, set up from `config`.
#[must_use]
pub fn latex_renderer(config: &Config) -> LatexRenderer {
    let mut renderer = LatexRenderer::new(config.branding());

    if let Some(path) = config.latex_mk_path() {
        renderer = renderer.with_latex_mk_path(path);
    }

    if let Some(path) = config.preserve_dir() {
        renderer = renderer.with_preserve_dir(path);
    }

    renderer
}

/// Reads the sender account from the environment, after loading the env file.
pub fn mail_from_env(config: &Config) -> anyhow::Result<Mail> {
    mail::load_env_file(config.mail().env_file())?;
    let credentials = Credentials::from_env(config.mail())?;

    Mail::new(config.mail(), config.club().name(), credentials)
}

fn select_event(calendar: &Path, now: NaiveDateTime) -> anyhow::Result<Event> {
    let events = input::load_certificate_events(calendar)
        .with_context(|| format!("failed to load events from `{}`", calendar.display()))?;

    let event = SelectionPolicy::MostRecent
        .select(&events, now)
        .ok_or_else(|| anyhow::anyhow!("no events found in `{}`", calendar.display()))?;

    info!(
        "Issuing certificates for \"{}\" by {} on {}",
        event.topic(),
        event.speaker(),
        event.date()
    );

    Ok(event.clone())
}

fn load_attendees(config: &Config) -> anyhow::Result<Vec<Attendee>> {
    let attendance = config.attendance()?;

    input::load_attendance(attendance)
        .with_context(|| format!("failed to load attendance from `{}`", attendance.display()))
}

fn prepare_output_dir(config: &Config) -> anyhow::Result<&Path> {
    let output_dir = config.output_dir();
    utils::create_dir_all(output_dir)
        .with_context(|| format!("failed to create `{}`", output_dir.display()))?;

    Ok(output_dir)
}

/// Writes a certificate for every attendee of the most recent event.
pub fn make_certificates(
    config: &Config,
    renderer: impl CertificateRenderer,
    now: NaiveDateTime,
) -> anyhow::Result<GenerationReport> {
    let attendees = load_attendees(config)?;
    let event = select_event(config.calendar()?, now)?;
    let output_dir = prepare_output_dir(config)?;

    let batch = CertificateBatch::new(
        renderer,
        &event,
        config.club(),
        config.branding(),
        output_dir,
    );
    let report = batch.generate_all(&attendees);

    info!("{}", report);

    Ok(report)
}

/// Writes a certificate for every attendee of the most recent event and emails
/// it to them.
pub fn send_certificates<T>(
    config: &Config,
    renderer: impl CertificateRenderer,
    mail: &Mail,
    transport: &T,
    now: NaiveDateTime,
) -> anyhow::Result<DeliveryReport>
where
    T: Transport,
    T::Error: fmt::Display,
{
    let roster_path = config.roster()?;
    let roster = input::load_roster(roster_path)
        .with_context(|| format!("failed to load roster from `{}`", roster_path.display()))?;

    let mut attendees = load_attendees(config)?;
    roster.assign_emails(&mut attendees);

    let event = select_event(config.calendar()?, now)?;
    let output_dir = prepare_output_dir(config)?;

    let batch = CertificateBatch::new(
        renderer,
        &event,
        config.club(),
        config.branding(),
        output_dir,
    );
    let report = batch.deliver(&attendees, mail, transport);

    info!("{}", report);

    Ok(report)
}
