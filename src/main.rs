// SPDX-License-Identifier: MIT
//
// toot-kiosk: a Mastodon kiosk.
//
// The home timeline's newest post fills the terminal, avatars drawn in
// half blocks. Every new notification comes out of a receipt printer.
// Enter opens a composer; Enter again posts.
//
//   kiosk-feed  → model, polling, dedup, layout, output strategies, REST
//   kiosk-term  → canvas, diff renderer, raw terminal, input, event loop
//   kiosk-print → ESC/POS printer
//
// `register` and `login` set up the credential files `run` needs.

mod app;
mod config;
mod display;
mod images;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use kiosk_feed::mastodon::{self, ClientCredentials, MastodonClient, UserCredentials};
use kiosk_print::EscPos;
use kiosk_term::event_loop::{EventLoop, LoopConfig};

use crate::app::{Kiosk, Outputs};
use crate::config::Config;
use crate::display::TermDisplay;
use crate::images::HttpImages;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "toot-kiosk", version, about)]
struct Cli {
    /// Config file [default: ./toot-kiosk.toml when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Register this kiosk as an application on the server.
    Register,
    /// Log in and store an access token.
    Login { user: String, password: String },
    /// Show the timeline and print notifications until Escape.
    Run,
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("toot-kiosk: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    logging::init(&config.log)?;

    match &cli.command {
        Command::Register => register(&config),
        Command::Login { user, password } => login(&config, user, password),
        Command::Run => run(&config),
    }
}

fn register(config: &Config) -> Result<()> {
    let server = &config.server;
    mastodon::register_app(&server.base_url, &server.app_name, &server.client_credentials)
        .with_context(|| format!("registering with {}", server.base_url))?;
    info!(base_url = %server.base_url, "application registered");
    println!(
        "registered {} at {}; credentials in {}",
        server.app_name,
        server.base_url,
        server.client_credentials.display()
    );
    Ok(())
}

fn login(config: &Config, user: &str, password: &str) -> Result<()> {
    let server = &config.server;
    let client = ClientCredentials::load(&server.client_credentials)
        .context("loading client credentials (run `toot-kiosk register` first)")?;
    mastodon::log_in(&client, user, password, &server.user_credentials)
        .with_context(|| format!("logging in as {user}"))?;
    info!(user, base_url = %client.base_url, "logged in");
    println!("logged in; token in {}", server.user_credentials.display());
    Ok(())
}

fn run(config: &Config) -> Result<()> {
    let credentials = UserCredentials::load(&config.server.user_credentials)
        .context("loading user credentials (run `toot-kiosk login` first)")?;
    let service = MastodonClient::new(credentials).context("building the Mastodon client")?;
    let printer = EscPos::open(&config.printer.device)
        .with_context(|| format!("opening printer {}", config.printer.device.display()))?;
    let images = HttpImages::new()?;

    let mut event_loop = EventLoop::new(LoopConfig {
        tick: config.poll.tick(),
    });
    let size = event_loop.size();
    let outputs = Outputs {
        display: TermDisplay::new(
            size.cols,
            size.rows,
            config.display.background(),
            config.display.foreground(),
        ),
        printer,
        images,
        display_layout: config.display.layout(),
        printer_layout: config.printer.layout(),
    };
    let mut kiosk = Kiosk::new(service, outputs, config.poll.interval());

    info!(
        base_url = %config.server.base_url,
        interval_secs = config.poll.interval_secs,
        cols = size.cols,
        rows = size.rows,
        "kiosk running"
    );
    event_loop.run(&mut kiosk)?;
    info!("kiosk stopped");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["toot-kiosk", "run"]).unwrap();
        assert_eq!(cli.command, Command::Run);
        assert_eq!(cli.config, None);

        let cli =
            Cli::try_parse_from(["toot-kiosk", "login", "alice", "hunter2", "--config", "k.toml"])
                .unwrap();
        assert_eq!(
            cli.command,
            Command::Login {
                user: "alice".into(),
                password: "hunter2".into(),
            }
        );
        assert_eq!(cli.config, Some(PathBuf::from("k.toml")));
    }

    #[test]
    fn rejects_bad_invocations() {
        assert!(Cli::try_parse_from(["toot-kiosk"]).is_err());
        assert!(Cli::try_parse_from(["toot-kiosk", "login", "alice"]).is_err());
        assert!(Cli::try_parse_from(["toot-kiosk", "dance"]).is_err());
    }
}
