//! Interpreter session.
//!
//! Defines the command surface:
//! - [`Command`]: parsed verb plus arguments
//! - [`Session`]: owns the current table and project, dispatches commands
//! - [`run`]: read-eval-print loop over any line source

pub mod command;
pub mod render;

pub use command::{Command, Verb};
pub use render::render_table;

use crate::config::Config;
use crate::export::{CsvCodec, JsonExporter};
use crate::project::report::export_report;
use crate::project::{Project, Task};
use crate::query::{apply_update, dedupe, filter, group, join, select, sort};
use crate::telemetry::command_span;
use crate::types::{CommandError, Result, Table};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

pub const INTRO: &str = "tabsh: table shell. Type HELP for commands, EXIT to quit.";
pub const FAREWELL: &str = "Bye.";

/// Result of one successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Silent,
    Message(String),
    Exit(String),
}

/// One interpreter session: the current table, the current project and the
/// literal of the last FILTER.
#[derive(Debug)]
pub struct Session {
    config: Config,
    table: Option<Table>,
    project: Option<Project>,
    last_filter_value: Option<String>,
    seq: usize,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            table: None,
            project: None,
            last_filter_value: None,
            seq: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Prompt for the next command: `N > `.
    pub fn prompt(&self) -> String {
        format!("{} > ", self.seq + 1)
    }

    /// Parse and run one input line. Blank lines are `Outcome::Silent` and do
    /// not advance the command counter.
    pub fn execute(&mut self, line: &str) -> Result<Outcome> {
        if line.trim().is_empty() {
            return Ok(Outcome::Silent);
        }
        self.seq += 1;

        let command = Command::parse(line)?.ok_or_else(|| CommandError::syntax("empty command"))?;
        let span = command_span(command.verb().as_str(), self.seq);
        let _guard = span.enter();
        self.dispatch(command)
    }

    /// Run a parsed command. On error the session is unchanged.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Load { path } => {
                let table = self.codec().load(resolve(&path))?;
                info!(rows = table.len(), columns = table.width(), "loaded {}", path);
                let message = format!(
                    "Loaded {} rows x {} columns from {}",
                    table.len(),
                    table.width(),
                    path
                );
                self.table = Some(table);
                Ok(Outcome::Message(message))
            }
            Command::Filter { predicate, token } => {
                let table = filter(self.current()?, &predicate)?;
                let message = format!("{} rows match {}", table.len(), predicate);
                self.table = Some(table);
                self.last_filter_value = Some(token);
                Ok(Outcome::Message(message))
            }
            Command::Select { columns } => {
                let table = select(self.current()?, &columns)?;
                self.replace(table, "selected")
            }
            Command::SortBy { column, order } => {
                let table = sort(self.current()?, &column, order)?;
                self.replace(table, "sorted")
            }
            Command::GroupBy { column } => {
                let table = group(self.current()?, &column)?;
                self.replace(table, "grouped")
            }
            Command::Update(statement) => {
                let (table, count) = apply_update(self.current()?, &statement)?;
                self.table = Some(table);
                Ok(Outcome::Message(format!("{} rows updated", count)))
            }
            Command::Join { path, column } => {
                let current = self.current()?;
                let other = self.codec().load(resolve(&path))?;
                let table = join(current, &other, &column)?;
                self.replace(table, "joined")
            }
            Command::RemoveDuplicates { column } => {
                let table = dedupe(self.current()?, &column)?;
                self.replace(table, "deduplicated")
            }
            Command::Show => Ok(Outcome::Message(render_table(
                self.current()?,
                self.config.show_max_rows,
            ))),
            Command::Save { path } => {
                self.codec().save(self.current()?, resolve(&path))?;
                Ok(Outcome::Message(format!("Saved to {}", path)))
            }
            Command::ExportJson { path } => {
                let path = path.unwrap_or_else(|| self.default_export_name());
                JsonExporter::export(self.current()?, resolve(&path), self.config.pretty_json)?;
                Ok(Outcome::Message(format!("Exported to {}", path)))
            }
            Command::CreateProject { name } => {
                let message = format!("Project '{}' created", name);
                self.project = Some(Project::new(name));
                Ok(Outcome::Message(message))
            }
            Command::AddTask {
                name,
                deadline,
                priority,
            } => {
                let status = self.config.default_task_status.clone();
                let message = format!("Task '{}' added", name);
                self.project_mut()?
                    .add_task(Task::new(name, deadline, priority, status))?;
                Ok(Outcome::Message(message))
            }
            Command::Assign { task, person } => {
                let message = format!("Task '{}' assigned to {}", task, person);
                self.project_mut()?.assign(&task, person)?;
                Ok(Outcome::Message(message))
            }
            Command::SetStatus { task, status } => {
                let message = format!("Task '{}' is now '{}'", task, status);
                self.project_mut()?.set_status(&task, status)?;
                Ok(Outcome::Message(message))
            }
            Command::ExportReport { format, path } => {
                let project = self
                    .project
                    .as_ref()
                    .ok_or_else(|| CommandError::state(NO_PROJECT))?;
                export_report(project, format, resolve(&path), self.config.delimiter_byte())?;
                Ok(Outcome::Message(format!("Report written to {}", path)))
            }
            Command::Help { verb } => Ok(Outcome::Message(help(verb))),
            Command::Exit => Ok(Outcome::Exit(FAREWELL.to_string())),
        }
    }

    fn codec(&self) -> CsvCodec {
        CsvCodec::new(self.config.delimiter_byte())
    }

    fn current(&self) -> Result<&Table> {
        self.table
            .as_ref()
            .ok_or_else(|| CommandError::state("no data loaded, use LOAD first"))
    }

    fn project_mut(&mut self) -> Result<&mut Project> {
        self.project
            .as_mut()
            .ok_or_else(|| CommandError::state(NO_PROJECT))
    }

    fn replace(&mut self, table: Table, what: &str) -> Result<Outcome> {
        let message = format!(
            "{} rows x {} columns {}",
            table.len(),
            table.width(),
            what
        );
        self.table = Some(table);
        Ok(Outcome::Message(message))
    }

    fn default_export_name(&self) -> String {
        match &self.last_filter_value {
            Some(value) => format!(
                "{}{}.json",
                self.config.filtered_export_prefix,
                value.to_lowercase()
            ),
            None => self.config.default_export_name.clone(),
        }
    }
}

const NO_PROJECT: &str = "no project, use CREATE_PROJECT first";

fn resolve(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Verb listing, or usage of one verb.
pub fn help(verb: Option<Verb>) -> String {
    match verb {
        Some(verb) => format!("{}\n  {}", verb.usage(), verb.summary()),
        None => {
            let width = Verb::ALL
                .iter()
                .map(|v| v.as_str().len())
                .max()
                .unwrap_or(0);
            Verb::ALL
                .iter()
                .map(|v| format!("{:<width$}  {}", v.as_str(), v.summary(), width = width))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Feed every line of `input` to the session, writing results to `out`.
///
/// Command errors are written as `Error: ...` and the loop continues. Stops at
/// EXIT or end of input; both print the farewell line.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        match session.execute(&line) {
            Ok(Outcome::Silent) => {}
            Ok(Outcome::Message(message)) => writeln!(out, "{}", message)?,
            Ok(Outcome::Exit(message)) => {
                writeln!(out, "{}", message)?;
                return Ok(());
            }
            Err(e) => {
                debug!(kind = ?e.kind(), "command failed");
                writeln!(out, "Error: {}", e)?;
            }
        }
    }
    writeln!(out, "{}", FAREWELL)
}
