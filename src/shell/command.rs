//! Command grammar: one verb followed by a verb-specific argument string.

use crate::project::report::ReportFormat;
use crate::query::{parse_column_list, parse_update, split_condition, unquote, Order};
use crate::query::{Predicate, UpdateStatement};
use crate::types::{Cell, CommandError, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Command verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Load,
    Filter,
    Select,
    SortBy,
    GroupBy,
    Update,
    Join,
    RemoveDuplicates,
    Show,
    Save,
    ExportJson,
    CreateProject,
    AddTask,
    Assign,
    SetStatus,
    ExportReport,
    Help,
    Exit,
}

impl Verb {
    pub const ALL: [Verb; 18] = [
        Verb::Load,
        Verb::Filter,
        Verb::Select,
        Verb::SortBy,
        Verb::GroupBy,
        Verb::Update,
        Verb::Join,
        Verb::RemoveDuplicates,
        Verb::Show,
        Verb::Save,
        Verb::ExportJson,
        Verb::CreateProject,
        Verb::AddTask,
        Verb::Assign,
        Verb::SetStatus,
        Verb::ExportReport,
        Verb::Help,
        Verb::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Filter => "FILTER",
            Self::Select => "SELECT",
            Self::SortBy => "SORT_BY",
            Self::GroupBy => "GROUP_BY",
            Self::Update => "UPDATE",
            Self::Join => "JOIN",
            Self::RemoveDuplicates => "REMOVE_DUPLICATES",
            Self::Show => "SHOW",
            Self::Save => "SAVE",
            Self::ExportJson => "EXPORT_JSON",
            Self::CreateProject => "CREATE_PROJECT",
            Self::AddTask => "ADD_TASK",
            Self::Assign => "ASSIGN",
            Self::SetStatus => "SET_STATUS",
            Self::ExportReport => "EXPORT_REPORT",
            Self::Help => "HELP",
            Self::Exit => "EXIT",
        }
    }

    /// Look a verb up by name, ignoring case. `?` is HELP.
    pub fn lookup(word: &str) -> Option<Verb> {
        if word == "?" {
            return Some(Verb::Help);
        }
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(word))
    }

    pub fn usage(self) -> &'static str {
        match self {
            Self::Load => "LOAD \"path\"",
            Self::Filter => "FILTER column OP value   (OP: >=, <=, !=, =, >, <)",
            Self::Select => "SELECT col1, col2, ...",
            Self::SortBy => "SORT_BY column [ASC|DESC]",
            Self::GroupBy => "GROUP_BY column",
            Self::Update => "UPDATE column = expr WHERE column2 = value   (WHERE in capitals)",
            Self::Join => "JOIN \"other.csv\" ON \"column\"",
            Self::RemoveDuplicates => "REMOVE_DUPLICATES column",
            Self::Show => "SHOW",
            Self::Save => "SAVE \"path\"",
            Self::ExportJson => "EXPORT_JSON [\"path\"]",
            Self::CreateProject => "CREATE_PROJECT \"name\"",
            Self::AddTask => "ADD_TASK \"name\" \"deadline\" \"priority\"",
            Self::Assign => "ASSIGN \"task\" \"person\"",
            Self::SetStatus => "SET_STATUS \"task\" \"status\"",
            Self::ExportReport => "EXPORT_REPORT \"csv\"|\"pdf\" \"path\"",
            Self::Help => "HELP [verb]",
            Self::Exit => "EXIT",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Self::Load => "Load a CSV file as the current table.",
            Self::Filter => "Keep the rows matching a condition.",
            Self::Select => "Keep only the listed columns, in order.",
            Self::SortBy => "Sort rows by one column.",
            Self::GroupBy => "One row per value, summing numeric columns.",
            Self::Update => "Overwrite a column where another column equals a value (text or number).",
            Self::Join => "Inner join with another CSV file on a shared column.",
            Self::RemoveDuplicates => "Keep the first row for each value of a column.",
            Self::Show => "Print the current table.",
            Self::Save => "Write the current table to a CSV file.",
            Self::ExportJson => "Write the current table to a JSON file.",
            Self::CreateProject => "Start a new, empty project.",
            Self::AddTask => "Add a task to the project.",
            Self::Assign => "Assign a task to someone.",
            Self::SetStatus => "Change a task's status.",
            Self::ExportReport => "Write the project report as CSV or PDF.",
            Self::Help => "List commands, or describe one.",
            Self::Exit => "Leave the interpreter.",
        }
    }
}

/// Parsed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load { path: String },
    Filter { predicate: Predicate, token: String },
    Select { columns: Vec<String> },
    SortBy { column: String, order: Order },
    GroupBy { column: String },
    Update(UpdateStatement),
    Join { path: String, column: String },
    RemoveDuplicates { column: String },
    Show,
    Save { path: String },
    ExportJson { path: Option<String> },
    CreateProject { name: String },
    AddTask { name: String, deadline: String, priority: String },
    Assign { task: String, person: String },
    SetStatus { task: String, status: String },
    ExportReport { format: ReportFormat, path: String },
    Help { verb: Option<Verb> },
    Exit,
}

impl Command {
    /// Parse one input line. Returns `None` for a blank line.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError` for an unknown verb or a malformed argument
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, arg) = match line.find(char::is_whitespace) {
            Some(i) => (&line[..i], line[i..].trim()),
            None => (line, ""),
        };
        let verb = Verb::lookup(word).ok_or_else(|| {
            CommandError::syntax(format!("unknown command '{}' (type HELP)", word))
        })?;

        Self::parse_args(verb, arg).map(Some)
    }

    fn parse_args(verb: Verb, arg: &str) -> Result<Command> {
        let usage = || CommandError::syntax(format!("usage: {}", verb.usage()));

        let command = match verb {
            Verb::Load => Command::Load {
                path: required(arg).ok_or_else(usage)?,
            },
            Verb::Filter => {
                let (column, operator, token) = split_condition(arg)?;
                Command::Filter {
                    predicate: Predicate::new(column, operator, Cell::literal(token)),
                    token: token.to_string(),
                }
            }
            Verb::Select => {
                if arg.is_empty() {
                    return Err(usage());
                }
                Command::Select {
                    columns: parse_column_list(arg),
                }
            }
            Verb::SortBy => {
                let words = split_words(arg)?;
                match words.as_slice() {
                    [column] => Command::SortBy {
                        column: column.clone(),
                        order: Order::Asc,
                    },
                    [column, direction] => Command::SortBy {
                        column: column.clone(),
                        order: Order::from_token(Some(direction.as_str())),
                    },
                    _ => return Err(usage()),
                }
            }
            Verb::GroupBy => Command::GroupBy {
                column: required(arg).ok_or_else(usage)?,
            },
            Verb::Update => Command::Update(parse_update(arg)?),
            Verb::Join => {
                let words = split_words(arg)?;
                match words.as_slice() {
                    [path, on, column] if on.eq_ignore_ascii_case("on") => Command::Join {
                        path: path.clone(),
                        column: column.clone(),
                    },
                    _ => return Err(usage()),
                }
            }
            Verb::RemoveDuplicates => Command::RemoveDuplicates {
                column: required(arg).ok_or_else(usage)?,
            },
            Verb::Show => Command::Show,
            Verb::Save => Command::Save {
                path: required(arg).ok_or_else(usage)?,
            },
            Verb::ExportJson => Command::ExportJson {
                path: required(arg),
            },
            Verb::CreateProject => Command::CreateProject {
                name: required(arg).ok_or_else(usage)?,
            },
            Verb::AddTask => match quoted_args(arg)?.as_slice() {
                [name, deadline, priority, ..] => Command::AddTask {
                    name: name.clone(),
                    deadline: deadline.clone(),
                    priority: priority.clone(),
                },
                _ => return Err(usage()),
            },
            Verb::Assign => match quoted_args(arg)?.as_slice() {
                [task, person, ..] => Command::Assign {
                    task: task.clone(),
                    person: person.clone(),
                },
                _ => return Err(usage()),
            },
            Verb::SetStatus => match quoted_args(arg)?.as_slice() {
                [task, status, ..] => Command::SetStatus {
                    task: task.clone(),
                    status: status.clone(),
                },
                _ => return Err(usage()),
            },
            Verb::ExportReport => match quoted_args(arg)?.as_slice() {
                [format, path, ..] => Command::ExportReport {
                    format: format.parse()?,
                    path: path.clone(),
                },
                _ => return Err(usage()),
            },
            Verb::Help => Command::Help {
                verb: match required(arg) {
                    Some(word) => Some(Verb::lookup(&word).ok_or_else(|| {
                        CommandError::syntax(format!("no help for '{}'", word))
                    })?),
                    None => None,
                },
            },
            Verb::Exit => Command::Exit,
        };

        Ok(command)
    }

    pub fn verb(&self) -> Verb {
        match self {
            Command::Load { .. } => Verb::Load,
            Command::Filter { .. } => Verb::Filter,
            Command::Select { .. } => Verb::Select,
            Command::SortBy { .. } => Verb::SortBy,
            Command::GroupBy { .. } => Verb::GroupBy,
            Command::Update(_) => Verb::Update,
            Command::Join { .. } => Verb::Join,
            Command::RemoveDuplicates { .. } => Verb::RemoveDuplicates,
            Command::Show => Verb::Show,
            Command::Save { .. } => Verb::Save,
            Command::ExportJson { .. } => Verb::ExportJson,
            Command::CreateProject { .. } => Verb::CreateProject,
            Command::AddTask { .. } => Verb::AddTask,
            Command::Assign { .. } => Verb::Assign,
            Command::SetStatus { .. } => Verb::SetStatus,
            Command::ExportReport { .. } => Verb::ExportReport,
            Command::Help { .. } => Verb::Help,
            Command::Exit => Verb::Exit,
        }
    }
}

/// Whole argument, unquoted; `None` if nothing is left.
fn required(arg: &str) -> Option<String> {
    let value = unquote(arg);
    (!value.is_empty()).then(|| value.to_string())
}

/// Every double-quoted string in `arg`, in order.
pub fn quoted_args(arg: &str) -> Result<Vec<String>> {
    static QUOTED: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    let re = QUOTED
        .get_or_init(|| Regex::new(r#""([^"]*)""#))
        .as_ref()
        .map_err(|e| CommandError::syntax(e.to_string()))?;
    Ok(re
        .captures_iter(arg)
        .map(|c| c[1].to_string())
        .collect())
}

/// Split on whitespace, keeping single- or double-quoted words together.
///
/// # Errors
///
/// Returns `SyntaxError` on an unterminated quote
pub fn split_words(arg: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut chars = arg.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut word = String::new();
            loop {
                match chars.next() {
                    Some(d) if d == c => break,
                    Some(d) => word.push(d),
                    None => return Err(CommandError::syntax("unterminated quote")),
                }
            }
            words.push(word);
        } else {
            let mut word = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_whitespace() {
                    break;
                }
                word.push(d);
                chars.next();
            }
            words.push(word);
        }
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Operator;

    fn parse(line: &str) -> Command {
        Command::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_unknown() {
        assert!(Command::parse("   ").unwrap().is_none());
        assert!(Command::parse("DROP table").is_err());
    }

    #[test]
    fn test_verbs_are_case_insensitive() {
        assert_eq!(parse("show"), Command::Show);
        assert_eq!(parse("Exit"), Command::Exit);
        assert_eq!(parse("?"), Command::Help { verb: None });
        assert_eq!(
            parse("help sort_by"),
            Command::Help {
                verb: Some(Verb::SortBy)
            }
        );
    }

    #[test]
    fn test_load_strips_quotes() {
        assert_eq!(
            parse(r#"LOAD "data/sales.csv""#),
            Command::Load {
                path: "data/sales.csv".into()
            }
        );
        assert!(Command::parse("LOAD").is_err());
    }

    #[test]
    fn test_filter_keeps_token() {
        match parse("FILTER region = North") {
            Command::Filter { predicate, token } => {
                assert_eq!(predicate.operator, Operator::Eq);
                assert_eq!(predicate.literal, Cell::String("North".into()));
                assert_eq!(token, "North");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_sort_by() {
        assert_eq!(
            parse("SORT_BY age"),
            Command::SortBy {
                column: "age".into(),
                order: Order::Asc
            }
        );
        assert_eq!(
            parse(r#"SORT_BY "unit price" desc"#),
            Command::SortBy {
                column: "unit price".into(),
                order: Order::Desc
            }
        );
        assert!(Command::parse("SORT_BY a b c").is_err());
    }

    #[test]
    fn test_join() {
        assert_eq!(
            parse(r#"JOIN "other.csv" ON "id""#),
            Command::Join {
                path: "other.csv".into(),
                column: "id".into()
            }
        );
        assert!(Command::parse(r#"JOIN "other.csv" "id""#).is_err());
    }

    #[test]
    fn test_task_commands() {
        assert_eq!(
            parse(r#"ADD_TASK "Write docs" "2024-07-01" "high""#),
            Command::AddTask {
                name: "Write docs".into(),
                deadline: "2024-07-01".into(),
                priority: "high".into()
            }
        );
        assert!(Command::parse(r#"ADD_TASK "only" "two""#).is_err());
        assert_eq!(
            parse(r#"SET_STATUS "Write docs" "Concluída""#),
            Command::SetStatus {
                task: "Write docs".into(),
                status: "Concluída".into()
            }
        );
        assert!(Command::parse(r#"EXPORT_REPORT "xlsx" "r.xlsx""#).is_err());
    }

    #[test]
    fn test_export_json_optional_path() {
        assert_eq!(parse("EXPORT_JSON"), Command::ExportJson { path: None });
        assert_eq!(
            parse(r#"EXPORT_JSON "out.json""#),
            Command::ExportJson {
                path: Some("out.json".into())
            }
        );
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words(r#" a  "b c" 'd' "#).unwrap(),
            vec!["a", "b c", "d"]
        );
        assert!(split_words(r#""open"#).is_err());
    }
}
