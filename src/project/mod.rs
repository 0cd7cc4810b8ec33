//! Project and task tracking.
//!
//! A project is a name plus an ordered list of tasks. Tasks are appended,
//! looked up by exact name (first match wins) and mutated in place; they are
//! never removed.

pub mod report;

use crate::types::{CommandError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Status given to a task when it is created.
pub const DEFAULT_STATUS: &str = "Não iniciada";

/// One tracked work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique key within the project
    pub name: String,
    /// Free-form deadline
    pub deadline: String,
    /// Free-form priority
    pub priority: String,
    pub assigned_to: Option<String>,
    /// Free-form status text, no transition rules
    pub status: String,
    /// Names of tasks this one depends on
    pub dependencies: BTreeSet<String>,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        deadline: impl Into<String>,
        priority: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            deadline: deadline.into(),
            priority: priority.into(),
            assigned_to: None,
            status: status.into(),
            dependencies: BTreeSet::new(),
        }
    }
}

/// Named list of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    tasks: Vec<Task>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Append a task.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if a task with the same name exists
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.task(&task.name).is_some() {
            return Err(CommandError::state(format!(
                "task '{}' already exists in project '{}'",
                task.name, self.name
            )));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Set who a task is assigned to.
    ///
    /// # Errors
    ///
    /// Returns `ColumnError` if the task does not exist
    pub fn assign(&mut self, task: &str, person: impl Into<String>) -> Result<()> {
        self.task_mut(task)?.assigned_to = Some(person.into());
        Ok(())
    }

    /// Replace a task's status.
    ///
    /// # Errors
    ///
    /// Returns `ColumnError` if the task does not exist
    pub fn set_status(&mut self, task: &str, status: impl Into<String>) -> Result<()> {
        self.task_mut(task)?.status = status.into();
        Ok(())
    }

    fn task_mut(&mut self, name: &str) -> Result<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| CommandError::column(format!("task '{}' not found", name)))
    }
}
