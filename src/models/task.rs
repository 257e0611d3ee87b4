// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task checklist model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub const EXERCISE_CATEGORY: &str = "Exercise";
pub const PRACTICE_CATEGORY: &str = "Practice";

/// Task identifier. Clients send either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        TaskId::Number(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        TaskId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct TaskItem {
    pub id: TaskId,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

impl TaskItem {
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            completed: false,
        }
    }
}

/// Tasks grouped by category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "client/src/generated/")
)]
pub struct TaskBoard(BTreeMap<String, Vec<TaskItem>>);

impl Default for TaskBoard {
    fn default() -> Self {
        let mut categories = BTreeMap::new();
        categories.insert(EXERCISE_CATEGORY.to_string(), Vec::new());
        categories.insert(PRACTICE_CATEGORY.to_string(), Vec::new());
        Self(categories)
    }
}

impl TaskBoard {
    /// Insert (or replace) a whole category.
    pub fn with_category(mut self, category: &str, items: Vec<TaskItem>) -> Self {
        self.0.insert(category.to_string(), items);
        self
    }

    pub fn category(&self, category: &str) -> Option<&[TaskItem]> {
        self.0.get(category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[TaskItem])> {
        self.0.iter().map(|(name, items)| (name.as_str(), items.as_slice()))
    }

    /// True when every task in every category is completed.
    ///
    /// An empty board is complete.
    pub fn all_completed(&self) -> bool {
        self.0
            .values()
            .all(|items| items.iter().all(|task| task.completed))
    }

    /// Flip one task. Returns the new `completed` value, or `None` if the
    /// category or id is unknown.
    pub fn toggle(&mut self, category: &str, id: &TaskId) -> Option<bool> {
        let task = self
            .0
            .get_mut(category)?
            .iter_mut()
            .find(|task| &task.id == id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    pub fn task_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}
