//! Generating and emailing certificates for the most recent meeting.

use club_clerk::delivery::DeliveryOutcome;
use club_clerk::input::MailSettings;
use club_clerk::mail::{Credentials, Mail};
use club_clerk::{make_certificates, send_certificates};

use lettre::transport::stub::StubTransport;
use pretty_assertions::assert_eq;

mod common;

use common::{at, FakeRenderer, Workspace};

fn mail() -> Mail {
    Mail::new(
        &MailSettings::default(),
        "Little Rock Engineers Club",
        Credentials::new("clerk@example.com", "app-password"),
    )
    .expect("sender should be valid")
}

#[test]
fn test_make_certificates_for_most_recent_event() {
    let workspace = Workspace::new();
    let config = workspace.config().build();

    let report = make_certificates(&config, FakeRenderer, at(2025, 10, 20)).unwrap();

    assert_eq!(report.generated(), 3);
    assert!(report.failures().is_empty());

    let output_dir = workspace.output_dir();
    for file in [
        "COA_Jon_Doe_10-15-2025.pdf",
        "COA_Mary_Smith_10-15-2025.pdf",
        "COA_Ann_Lee_10-15-2025.pdf",
    ] {
        assert!(output_dir.join(file).exists(), "{} should exist", file);
    }

    assert_eq!(
        std::fs::read(output_dir.join("COA_Ann_Lee_10-15-2025.pdf")).unwrap(),
        b"%PDF Ann Lee"
    );
}

#[test]
fn test_send_certificates() {
    let workspace = Workspace::new();
    let config = workspace.config().build();
    let transport = StubTransport::new_ok();

    let report =
        send_certificates(&config, FakeRenderer, &mail(), &transport, at(2025, 10, 20)).unwrap();

    assert_eq!(
        report.outcomes(),
        [
            ("Jon Doe".to_string(), DeliveryOutcome::Sent),
            ("Mary Smith".to_string(), DeliveryOutcome::MissingEmail),
            ("Ann Lee".to_string(), DeliveryOutcome::Sent),
        ]
    );
    assert_eq!(
        report.to_string(),
        "Successfully generated 3 certificates and sent 2 emails"
    );

    let messages = transport.messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0]
        .1
        .contains("Subject: LREC Certificate of Attendance - Jon Doe - 10/15/2025"));
    assert_eq!(
        messages[1].0.to(),
        ["ann@example.com".parse::<lettre::Address>().unwrap()]
    );
}

#[test]
fn test_smtp_failures_are_counted_separately() {
    let workspace = Workspace::new();
    let config = workspace.config().build();

    let report = send_certificates(
        &config,
        FakeRenderer,
        &mail(),
        &StubTransport::new_error(),
        at(2025, 10, 20),
    )
    .unwrap();

    assert_eq!(report.generated(), 3);
    assert_eq!(report.sent(), 0);
    assert_eq!(report.send_failed(), 2);
    assert_eq!(report.missing_email(), 1);
}

#[test]
fn test_latest_event_when_none_is_past() {
    let workspace = Workspace::new();
    let config = workspace.config().build();

    make_certificates(&config, FakeRenderer, at(2025, 1, 1)).unwrap();

    assert!(workspace
        .output_dir()
        .join("COA_Jon_Doe_11-19-2025.pdf")
        .exists());
}

#[test]
fn test_missing_roster_is_fatal() {
    let workspace = Workspace::new();
    let mut builder = workspace.config();
    builder.roster(workspace.path().join("missing.csv"));
    let config = builder.build();

    let result = send_certificates(
        &config,
        FakeRenderer,
        &mail(),
        &StubTransport::new_ok(),
        at(2025, 10, 20),
    );

    assert!(result.is_err());
    assert!(!workspace.output_dir().exists());
}
