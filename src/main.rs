use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, error, info};
use seahorse::{App, Command, Context, Flag, FlagType};

use club_clerk::input::Config;
use club_clerk::notice::LunchMessage;
use club_clerk::{generate_notice, NoticeOutcome, NoticeRequest};

fn set_env_if_absent<K: AsRef<OsStr>, V: AsRef<OsStr>>(var: K, default: impl FnOnce() -> V) {
    if env::var(var.as_ref()).is_err() {
        env::set_var(var, default());
    }
}

fn main() {
    set_env_if_absent("RUST_APP_LOG", || "info");
    color_backtrace::install();
    pretty_env_logger::init_custom_env("RUST_APP_LOG");

    run();
}

/// Logs the error chain and ends the process with a non-zero exit code.
fn exit_on_error(result: anyhow::Result<()>) {
    if let Err(e) = result {
        error!("{:?}", e);
        ::std::process::exit(1);
    }
}

trait ContextExt {
    fn context(&self) -> &Context;

    fn optional_string_flag(&self, name: &str) -> Option<String> {
        self.context().string_flag(name).ok()
    }

    fn optional_path_flag(&self, name: &str) -> Option<PathBuf> {
        self.optional_string_flag(name).map(PathBuf::from)
    }
}

impl ContextExt for Context {
    fn context(&self) -> &Context {
        self
    }
}

/// Loads the config file (or the defaults) and applies the command line
/// overrides.
fn build_config(context: &Context) -> anyhow::Result<Config> {
    let file = context.optional_path_flag("config");
    let mut builder = Config::load(file.as_deref())?;

    if let Some(path) = context.optional_path_flag("attendance") {
        builder.attendance(path);
    }

    if let Some(path) = context.optional_path_flag("roster") {
        builder.roster(path);
    }

    if let Some(path) = context.optional_path_flag("calendar") {
        builder.calendar(path);
    }

    if let Some(path) = context.optional_path_flag("output-dir") {
        builder.output_dir(path);
    }

    if let Some(path) = context.optional_path_flag("preserve-dir") {
        builder.preserve_dir(path);
    }

    let config = builder.build();

    info!("finished building config");

    Ok(config)
}

fn notice(context: &Context) -> anyhow::Result<()> {
    let spreadsheet = match context.args.as_slice() {
        [spreadsheet] => Path::new(spreadsheet),
        _ => return Err(anyhow::anyhow!("expected exactly one spreadsheet path")),
    };

    if let Some(template) = context.optional_path_flag("template") {
        debug!(
            "ignoring --template `{}`, the built-in template is used",
            template.display()
        );
    }

    let config = build_config(context)?;
    let output = context
        .optional_path_flag("output")
        .unwrap_or_else(|| PathBuf::from("notices.txt"));

    let request = NoticeRequest::new(spreadsheet, output)
        .with_bio(context.optional_string_flag("bio").unwrap_or_default())
        .with_lunch(LunchMessage::from(context.bool_flag("lunch-provided")));

    if let NoticeOutcome::Written { output, .. } =
        generate_notice(&config, &request, Local::now().naive_local())?
    {
        debug!("notice written to {}", output.display());
    }

    Ok(())
}

fn certificates(context: &Context) -> anyhow::Result<()> {
    let config = build_config(context)?;
    let renderer = club_clerk::latex_renderer(&config);

    club_clerk::make_certificates(&config, renderer, Local::now().naive_local())?;

    Ok(())
}

fn send(context: &Context) -> anyhow::Result<()> {
    let config = build_config(context)?;
    let mail = club_clerk::mail_from_env(&config)?;
    let transport = mail.to_transport()?;
    let renderer = club_clerk::latex_renderer(&config);

    club_clerk::send_certificates(
        &config,
        renderer,
        &mail,
        &transport,
        Local::now().naive_local(),
    )?;

    Ok(())
}

fn config_flag() -> Flag {
    Flag::new("config", FlagType::String)
        .description("[optional] Path to the club config file. Default: the built-in LREC settings")
}

fn certificate_flags(command: Command) -> Command {
    command
        .flag(config_flag())
        .flag(Flag::new("attendance", FlagType::String).description(
            "[optional] Path to the attendance workbook. Default: `paths.attendance` from the config",
        ))
        .flag(Flag::new("calendar", FlagType::String).description(
            "[optional] Path to the calendar workbook. Default: `paths.calendar` from the config",
        ))
        .flag(Flag::new("output-dir", FlagType::String).description(
            "[optional] Where the certificates are written to. Default: `temp_certificates`",
        ))
        .flag(Flag::new("preserve-dir", FlagType::String).description(
            "[optional] Copies the LaTeX working directory here if compiling fails",
        ))
}

fn run() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "club-clerk".to_string());

    let notice_command = Command::new("notice")
        .usage(format!("{} notice [args] <spreadsheet>", program))
        .description("Writes the notice for the next upcoming meeting.")
        .flag(Flag::new("bio", FlagType::String).description("[optional] A short bio of the speaker."))
        .flag(
            Flag::new("lunch-provided", FlagType::Bool)
                .description("[optional] Announces that lunch will be provided. Default: false"),
        )
        .flag(
            Flag::new("output", FlagType::String)
                .alias("o")
                .description("[optional] Path to the notice file. Default: `notices.txt`"),
        )
        .flag(Flag::new("template", FlagType::String).description("[optional] Currently ignored."))
        .flag(config_flag())
        .action(|context: &Context| exit_on_error(notice(context)));

    let certificates_command = certificate_flags(
        Command::new("certificates")
            .usage(format!("{} certificates [args]", program))
            .description("Writes a certificate for every attendee of the most recent meeting."),
    )
    .action(|context: &Context| exit_on_error(certificates(context)));

    let send_command = certificate_flags(
        Command::new("send")
            .usage(format!("{} send [args]", program))
            .description("Writes the certificates and emails them to the attendees."),
    )
    .flag(Flag::new("roster", FlagType::String).description(
        "[optional] Path to the roster workbook. Default: `paths.roster` from the config",
    ))
    .action(|context: &Context| exit_on_error(send(context)));

    let app = App::new(env!("CARGO_PKG_NAME"))
        .description(env!("CARGO_PKG_DESCRIPTION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .usage(format!("{} [command] [args]", program))
        .command(notice_command)
        .command(certificates_command)
        .command(send_command);

    app.run(args);
}
