// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Odontogram and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Odontogram CLI entrypoint.
//!
//! Opens one patient's chart over a folder-backed remote store and reads editing commands from
//! stdin. Autosave runs in the background; `quit` or end of input flushes pending edits to the
//! local cache.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use odontogram::bridge::FolderBridge;
use odontogram::config::EditorConfig;
use odontogram::dates::format_display;
use odontogram::model::{Mode, PatientId, Surface, Symbol, ToothId, ToothState};
use odontogram::selection::geometry::Rect;
use odontogram::selection::{MenuAction, SelectionEvent};
use odontogram::store::{FileStore, LocalCache, WriteDurability};
use odontogram::sync::{EditorSession, TickOutcome};

/// How often the autosave scheduler is polled.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

const CELL: f32 = 48.0;

#[derive(Parser, Debug)]
#[command(name = "odontogram")]
#[command(about = "Line-driven dental chart editor")]
struct Args {
    /// Patient whose chart is opened
    patient: String,

    /// Directory holding one chart document per patient
    #[arg(long, value_name = "DIR", default_value = "odontogram-data")]
    data_dir: PathBuf,

    /// Directory for the local cache of unsaved edits (default: <data-dir>/.cache)
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// TOML file overriding editor defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sync files and directories on every write
    #[arg(long)]
    durable_writes: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Surface(ToothId, Surface),
    Body(ToothId),
    DoubleClick(ToothId, Surface),
    Choose(MenuAction),
    Outside,
    Observations(String),
    Date(String),
    Show(Option<ToothId>),
    Status,
    Save,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut args = rest.split_whitespace();

    let tooth = |raw: Option<&str>| -> Result<ToothId, String> {
        raw.ok_or_else(|| "missing tooth".to_owned())?
            .parse()
            .map_err(|err| format!("{err}"))
    };
    let surface = |raw: Option<&str>| -> Result<Surface, String> {
        raw.ok_or_else(|| "missing surface".to_owned())?
            .parse()
            .map_err(|err| format!("{err}"))
    };

    let command = match head {
        "surface" => Command::Surface(tooth(args.next())?, surface(args.next())?),
        "body" => Command::Body(tooth(args.next())?),
        "dbl" => Command::DoubleClick(tooth(args.next())?, surface(args.next())?),
        "choose" => Command::Choose(parse_action(args.next().unwrap_or_default())?),
        "outside" => Command::Outside,
        "obs" => Command::Observations(rest.to_owned()),
        "date" => Command::Date(rest.to_owned()),
        "show" => Command::Show(args.next().map(|raw| tooth(Some(raw))).transpose()?),
        "status" => Command::Status,
        "save" => Command::Save,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}, try `help`")),
    };
    Ok(command)
}

fn parse_action(raw: &str) -> Result<MenuAction, String> {
    let action = match raw {
        "absent" => MenuAction::Absent,
        "extraction" => MenuAction::Extraction,
        "clear" => MenuAction::Clear,
        "cancel" => MenuAction::Cancel,
        "anterior" => MenuAction::Color(Mode::Anterior),
        "required" => MenuAction::Color(Mode::Required),
        "" => return Err("missing menu action".to_owned()),
        symbol => MenuAction::Symbol(symbol.parse::<Symbol>().map_err(|err| format!("{err}"))?),
    };
    Ok(action)
}

/// Screen cell of a tooth in the usual chart arrangement: upper permanent, upper deciduous,
/// lower deciduous, lower permanent, each row split at the midline.
fn anchor_for(tooth: ToothId) -> Rect {
    let position = f32::from(tooth.position());
    let (row, column) = match tooth.quadrant() {
        1 => (0.0, 8.0 - position),
        2 => (0.0, 7.0 + position),
        5 => (1.0, 8.0 - position),
        6 => (1.0, 7.0 + position),
        8 => (2.0, 8.0 - position),
        7 => (2.0, 7.0 + position),
        4 => (3.0, 8.0 - position),
        _ => (3.0, 7.0 + position),
    };
    Rect::new(16.0 + column * CELL, 16.0 + row * (CELL + 16.0), CELL, CELL)
}

fn describe_tooth(tooth: ToothId, state: &ToothState) -> String {
    if state.absent() {
        return format!("{tooth}: absent");
    }
    let marks = state
        .surfaces()
        .map(|(surface, mark)| {
            let code = mark.encode().unwrap_or_else(|| "-".to_owned());
            format!("{surface}={code}")
        })
        .collect::<Vec<_>>();
    format!("{tooth}: {}", marks.join(" "))
}

const HELP: &str = "\
commands:
  surface <tooth> <surface>   open the menu for one surface
  body <tooth>                click the tooth body (twice quickly toggles absent)
  dbl <tooth> <surface>       double-click a surface to clear it
  choose <action>             absent | extraction | clear | cancel | anterior | required | <symbol>
  outside                     click outside the menu
  obs <text>                  set observations
  date <DD/MM/YYYY>           set the chart date
  show [tooth]                print the chart or one tooth
  status                      print the save status
  save                        save now
  quit                        close the chart";

async fn run_command<B, S>(session: &mut EditorSession<B, S>, command: Command) -> bool
where
    B: odontogram::bridge::PersistenceBridge,
    S: odontogram::store::KeyValueStore,
{
    let now = Utc::now();
    let event = match command {
        Command::Surface(tooth, surface) => Some(SelectionEvent::SurfaceClicked {
            tooth,
            surface,
            anchor: anchor_for(tooth),
        }),
        Command::Body(tooth) => Some(SelectionEvent::ToothBodyClicked {
            tooth,
            anchor: anchor_for(tooth),
            at: now,
        }),
        Command::DoubleClick(tooth, surface) => {
            Some(SelectionEvent::SurfaceDoubleClicked { tooth, surface })
        }
        Command::Choose(action) => Some(SelectionEvent::Choose(action)),
        Command::Outside => Some(SelectionEvent::OutsideClick),
        Command::Observations(text) => {
            session.set_observations(text, now);
            None
        }
        Command::Date(raw) => {
            session.set_display_date(&raw, now);
            println!("date: {}", format_display(session.snapshot().date()));
            None
        }
        Command::Show(Some(tooth)) => {
            let state = session.snapshot().tooth(tooth);
            println!("{}", describe_tooth(tooth, &state));
            None
        }
        Command::Show(None) => {
            let chart = session.snapshot();
            println!(
                "patient {} on {}",
                chart.patient_id(),
                format_display(chart.date())
            );
            if !chart.observations().is_empty() {
                println!("observations: {}", chart.observations());
            }
            for (tooth, state) in chart.teeth() {
                if !state.is_untouched() {
                    println!("{}", describe_tooth(*tooth, state));
                }
            }
            None
        }
        Command::Status => {
            println!("{}", session.status());
            None
        }
        Command::Save => {
            match session.save_now(now).await {
                Ok(()) => println!("saved"),
                Err(err) => println!("save failed: {err}"),
            }
            None
        }
        Command::Help => {
            println!("{HELP}");
            None
        }
        Command::Quit => return false,
    };

    if let Some(event) = event {
        if let Some(result) = session.handle(event, now) {
            for &tooth in &result.delta.updated {
                let state = session.snapshot().tooth(tooth);
                println!("{}", describe_tooth(tooth, &state));
            }
        }
        match session.selection().offered_actions().as_slice() {
            [] => {}
            actions => println!("menu: {actions:?}"),
        }
    }
    true
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("ODONTOGRAM_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = EditorConfig::load_optional(args.config.as_deref())?;
    let patient_id = PatientId::new(args.patient)?;
    let durability = if args.durable_writes {
        WriteDurability::Durable
    } else {
        WriteDurability::BestEffort
    };

    let cache_dir = args
        .cache_dir
        .unwrap_or_else(|| args.data_dir.join(".cache"));
    let bridge = FolderBridge::new(&args.data_dir).with_durability(durability);
    let cache = LocalCache::new(FileStore::new(cache_dir).with_durability(durability));

    let mut session = EditorSession::open(patient_id, bridge, cache, &config, Utc::now()).await;
    info!(patient = %session.patient_id(), source = ?session.source(), "chart opened");
    println!(
        "opened {} ({}), type `help` for commands",
        session.patient_id(),
        session.status()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(command) => {
                        if !run_command(&mut session, command).await {
                            break;
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
            _ = ticker.tick() => {
                if session.tick(Utc::now()).await == TickOutcome::Saved {
                    println!("autosaved");
                }
            }
        }
    }

    session.close(Utc::now());
    Ok(())
}

fn main() {
    let args = Args::parse();
    setup_tracing();

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| -> Box<dyn Error> { Box::new(err) })
        .and_then(|runtime| runtime.block_on(run(args)));

    if let Err(err) = result {
        eprintln!("odontogram: {err}");
        std::process::exit(1);
    }
}
