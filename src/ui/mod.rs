//! Interactive dashboard session
//!
//! A readline loop over [`session::SessionState`]: every accepted input
//! change re-runs fetch, compute and render for the current dashboard.

pub mod readline;
pub mod session;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;

use crate::cli::formatters::{format_banner, format_error};
use crate::config::Config;
use crate::dashboard::{BannerLevel, DashboardKind, Mode};
use crate::dispatcher::{render_portfolio, render_projection, today, OutputOptions};
use crate::error::DashboardError;
use crate::sources::PriceSource;
use session::{completions, Outcome, SessionCommand, SessionState};

/// Render the current dashboard of a session
pub async fn render_state<S: PriceSource>(
    source: &S,
    state: &SessionState,
    output: &OutputOptions,
) -> Result<String, DashboardError> {
    match state.mode() {
        Mode::Portfolio => render_portfolio(source, state.kind, &state.portfolio, output).await,
        Mode::Projection => render_projection(source, state.kind, &state.projection, output).await,
    }
}

async fn render_and_print<S: PriceSource>(source: &S, state: &SessionState, output: &OutputOptions) {
    match render_state(source, state, output).await {
        Ok(text) => println!("{}", text),
        Err(err) => print!("{}", format_error(&err)),
    }
}

/// Launch the interactive REPL on `kind`.
pub async fn launch_session<S: PriceSource>(
    source: &S,
    kind: DashboardKind,
    config: &Config,
) -> Result<()> {
    println!("{}", "marketdash - Interactive Mode".bold());
    println!(
        "Type {} for commands, {} to leave",
        "help".cyan(),
        "exit".cyan()
    );

    let output = OutputOptions {
        json: false,
        display: config.display.clone(),
    };
    let mut state = SessionState::new(kind, today());
    let mut rl = readline::Readline::new(completions(), None)?;

    render_and_print(source, &state, &output).await;

    loop {
        let prompt = format!("{}> ", state.kind);
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let outcome = SessionCommand::parse(trimmed).and_then(|cmd| state.apply(cmd));
                match outcome {
                    Ok(Outcome::Render) => render_and_print(source, &state, &output).await,
                    Ok(Outcome::Help) => println!("{}", state.help()),
                    Ok(Outcome::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Err(err) => println!("{}", format_banner(BannerLevel::Warning, &err.to_string())),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("{} {}", "Error:".red().bold(), err);
                break;
            }
        }
    }

    Ok(())
}
