//! attnviz - terminal host for the attention tutorial engine
//!
//! Reads line commands from stdin, pumps wall-clock time into the engine on a
//! fixed frame interval, and prints the mounted panel whenever it changes.
//!
//! Examples:
//!   attnviz --tab flash --seq 2048
//!   attnviz --tab performance --json
//!   RUST_LOG=attnviz=debug attnviz --settings ./settings.json
//!
//! Settings are read from the OS config dir (attnviz/settings.json) unless
//! `--settings` points somewhere else; command-line flags win over the file.

use std::path::PathBuf;
use std::time::Duration;

use attnviz::settings::Settings;
use attnviz::tutorial::{Event, Outcome, Tutorial};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod command;
mod error;
mod paths;
mod view;

use command::{parse_command, Command, USAGE};
use error::TermError;
use paths::AppPaths;

const DEFAULT_FRAME_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    settings_path: Option<PathBuf>,
    overrides: Settings,
    frame_ms: u64,
    json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            settings_path: None,
            overrides: Settings::default(),
            frame_ms: DEFAULT_FRAME_MS,
            json: false,
        }
    }
}

fn usage() -> String {
    [
        "Usage: attnviz [options]",
        "",
        "Options:",
        "  --settings <path>   settings file (default: OS config dir)",
        "  --tab <id>          basic | matrix | standard | flash | flash2 | performance",
        "  --seq <n>           sequence length (128..4096)",
        "  --head <n>          head dimension (32..128)",
        "  --ceiling <n>       performance series ceiling (1024..16384)",
        "  --frame-ms <n>      how often elapsed time is fed to the engine",
        "  --json              print panel output as JSON lines",
        "",
        USAGE,
    ]
    .join("\n")
}

fn parse_args<I>(args: I) -> Result<Options, TermError>
where
    I: IntoIterator<Item = String>,
{
    let mut opts = Options::default();
    let mut args = args.into_iter();
    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| TermError::Usage(format!("{name} needs a value\n\n{}", usage())))
        };
        match flag.as_str() {
            "--settings" => opts.settings_path = Some(PathBuf::from(value("--settings")?)),
            "--tab" => opts.overrides.tab = Some(value("--tab")?),
            "--seq" => opts.overrides.sequence_length = Some(number("--seq", &value("--seq")?)?),
            "--head" => opts.overrides.head_dimension = Some(number("--head", &value("--head")?)?),
            "--ceiling" => {
                opts.overrides.series_ceiling = Some(number("--ceiling", &value("--ceiling")?)?)
            }
            "--frame-ms" => {
                let ms = number("--frame-ms", &value("--frame-ms")?)?;
                opts.frame_ms = u64::from(ms.max(1));
            }
            "--json" => opts.json = true,
            "-h" | "--help" => return Err(TermError::Usage(usage())),
            other => {
                return Err(TermError::Usage(format!(
                    "unknown option `{other}`\n\n{}",
                    usage()
                )))
            }
        }
    }
    Ok(opts)
}

fn number(flag: &str, raw: &str) -> Result<u32, TermError> {
    raw.parse()
        .map_err(|_| TermError::Usage(format!("{flag} expects a whole number, got `{raw}`")))
}

fn load_settings(opts: &Options) -> Result<Settings, TermError> {
    let file = match &opts.settings_path {
        Some(path) => Settings::load(path)?,
        None => {
            let path = AppPaths::new()?.settings_file();
            if path.exists() {
                match Settings::load(&path) {
                    Ok(s) => {
                        info!(path = %path.display(), "settings loaded");
                        s
                    }
                    Err(e) => {
                        warn!(path = %path.display(), "ignoring unreadable settings: {e}");
                        Settings::default()
                    }
                }
            } else {
                Settings::default()
            }
        }
    };
    Ok(opts.overrides.clone().merged_over(file))
}

fn print_panel(tutorial: &Tutorial, json: bool) -> Result<(), TermError> {
    let Some(out) = tutorial.render() else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string(&out)?);
    } else {
        print!("{}", view::render_text(&out));
    }
    Ok(())
}

fn print_outcome(tutorial: &Tutorial, outcome: Outcome, json: bool) -> Result<(), TermError> {
    if !outcome.needs_redraw() {
        return Ok(());
    }
    if outcome.config_changed || outcome.tab_switched || json {
        return print_panel(tutorial, json);
    }
    if let Some(panel) = tutorial.panel() {
        println!("{}", view::tick_line(tutorial.now_ms(), panel));
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), TermError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(TermError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(e) => return Err(e),
    };
    let settings = load_settings(&opts)?;

    let mut tutorial = Tutorial::new(settings.configuration());
    tutorial.subscribe(|config, change| {
        info!(?change, tab = %config.active_tab, "parameters changed");
    });
    if settings.series_ceiling.is_some() {
        tutorial.handle(Event::SetSeriesCeiling(settings.series_ceiling()));
    }
    print_panel(&tutorial, opts.json)?;

    let mut frame = time::interval(Duration::from_millis(opts.frame_ms));
    frame.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = Instant::now();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = frame.tick() => {
                let elapsed = last.elapsed().as_millis() as u64;
                last += Duration::from_millis(elapsed);
                let outcome = tutorial.handle(Event::Elapsed { ms: elapsed });
                print_outcome(&tutorial, outcome, opts.json)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Engine(event))) => {
                        let outcome = tutorial.handle(event);
                        print_outcome(&tutorial, outcome, opts.json)?;
                    }
                    Ok(Some(Command::Show)) => print_panel(&tutorial, opts.json)?,
                    Ok(Some(Command::Series)) => {
                        match tutorial.render().and_then(|out| out.series) {
                            Some(series) => print!("{}", view::series_table(&series)),
                            None => println!("no series on this tab; try `tab performance`"),
                        }
                    }
                    Ok(Some(Command::Help)) => println!("{USAGE}"),
                    Ok(Some(Command::Quit)) => break,
                    Err(e) => eprintln!("{e}"),
                }
            }
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(parse_args(Vec::new()).unwrap(), Options::default());
    }

    #[test]
    fn flags_fill_the_overrides() {
        let opts = parse_args(args(&[
            "--tab", "flash", "--seq", "2048", "--head", "128", "--ceiling", "8192", "--json",
            "--frame-ms", "0",
        ]))
        .unwrap();
        assert_eq!(opts.overrides.tab.as_deref(), Some("flash"));
        assert_eq!(opts.overrides.sequence_length, Some(2048));
        assert_eq!(opts.overrides.head_dimension, Some(128));
        assert_eq!(opts.overrides.series_ceiling, Some(8192));
        assert!(opts.json);
        assert_eq!(opts.frame_ms, 1);
    }

    #[test]
    fn bad_flags_are_usage_errors() {
        let cases: [&[&str]; 4] = [&["--seq"], &["--seq", "x"], &["--verbose"], &["--help"]];
        for bad in cases {
            assert!(matches!(parse_args(args(bad)), Err(TermError::Usage(_))));
        }
    }

    #[test]
    fn explicit_settings_file_is_merged_under_flags() {
        let dir = std::env::temp_dir().join(format!("attnviz-term-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.json");
        std::fs::write(&path, r#"{"sequence_length": 1024, "tab": "matrix"}"#).unwrap();

        let opts = parse_args(args(&["--settings", path.to_str().unwrap(), "--tab", "flash2"]))
            .unwrap();
        let merged = load_settings(&opts).unwrap();
        let cfg = merged.configuration();
        assert_eq!(cfg.sequence_length, 1024);
        assert_eq!(cfg.active_tab, attnviz::config::TabId::RefinedTiled);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_explicit_settings_file_is_an_error() {
        let opts = parse_args(args(&["--settings", "/nonexistent/attnviz.json"])).unwrap();
        assert!(matches!(
            load_settings(&opts),
            Err(TermError::Engine(attnviz::Error::Io(_)))
        ));
    }
}
