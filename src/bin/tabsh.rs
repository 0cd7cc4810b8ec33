//! tabsh CLI
//!
//! Interactive table shell. Runs a script file when one is given, reads piped
//! stdin line by line, and otherwise opens a line editor.

use anyhow::Context;
use clap::Parser;
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use tabsh::shell::{self, Outcome, Session, FAREWELL, INTRO};
use tabsh::telemetry::init_tracing;
use tabsh::Config;

/// tabsh - filter, reshape and export CSV tables from a command line
#[derive(Parser)]
#[command(name = "tabsh")]
#[command(version)]
struct Cli {
    /// Script of commands to run instead of the interactive prompt
    script: Option<PathBuf>,

    /// Config file (defaults to ~/.tabsh/config.json when present)
    #[arg(long, env = "TABSH_CONFIG")]
    config: Option<String>,

    /// Log filter directives, written to stderr
    #[arg(long, env = "TABSH_LOG", default_value = "warn")]
    log_level: String,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli
        .config
        .as_deref()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()));
    let config = Config::load(config_path.as_deref()).context("failed to load config")?;
    let mut session = Session::new(config);

    let stdout = io::stdout();
    match cli.script {
        Some(path) => {
            let file = File::open(&path)
                .with_context(|| format!("cannot open script {}", path.display()))?;
            shell::run(&mut session, BufReader::new(file), &mut stdout.lock())?;
        }
        None if !io::stdin().is_terminal() => {
            shell::run(&mut session, io::stdin().lock(), &mut stdout.lock())?;
        }
        None => cmd_interactive(&mut session)?,
    }

    Ok(())
}

fn cmd_interactive(session: &mut Session) -> anyhow::Result<()> {
    let mut rl = DefaultEditor::new()?;
    println!("{}", INTRO.bright_white());

    loop {
        match rl.readline(&session.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(line.as_str());
                }
                match session.execute(&line) {
                    Ok(Outcome::Silent) => {}
                    Ok(Outcome::Message(message)) => println!("{}", message),
                    Ok(Outcome::Exit(message)) => {
                        println!("{}", message);
                        break;
                    }
                    Err(e) => println!("{} {}", "✗".red(), format!("Error: {}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted (type EXIT to quit)");
            }
            Err(ReadlineError::Eof) => {
                println!("{}", FAREWELL);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
