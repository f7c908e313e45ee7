// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::Deserialize;

/// One row of a list: name + phone for contacts, task + status for to-dos.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub primary: String,
    pub secondary: String,
}

impl Record {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Backlog,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [Self; 3] = [Self::Backlog, Self::InProgress, Self::Done];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::InProgress => "InProgress",
            Self::Done => "Done",
        }
    }

    /// Accepts the display label or the compact identifier.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Backlog" => Some(Self::Backlog),
            "In Progress" | "InProgress" => Some(Self::InProgress),
            "Done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|status| *status == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListVariant {
    Tasks,
    Contacts,
}

impl ListVariant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Contacts => "contacts",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Tasks => "To-Do List",
            Self::Contacts => "Contact List",
        }
    }

    pub const fn headers(self) -> [&'static str; 2] {
        match self {
            Self::Tasks => ["Task", "Status"],
            Self::Contacts => ["Name", "Phone"],
        }
    }

    pub const fn primary_placeholder(self) -> &'static str {
        match self {
            Self::Tasks => "New Task",
            Self::Contacts => "Contact Name",
        }
    }

    pub const fn secondary_placeholder(self) -> &'static str {
        match self {
            Self::Tasks => "Status",
            Self::Contacts => "Phone Number",
        }
    }

    pub const fn supports_edit(self) -> bool {
        matches!(self, Self::Tasks)
    }

    pub const fn supports_remove(self) -> bool {
        matches!(self, Self::Contacts)
    }

    pub const fn supports_persistence(self) -> bool {
        matches!(self, Self::Tasks)
    }

    pub const fn noun(self) -> &'static str {
        match self {
            Self::Tasks => "task",
            Self::Contacts => "contact",
        }
    }

    pub const fn missing_input_message(self) -> &'static str {
        match self {
            Self::Tasks => "Please enter a task and select its status.",
            Self::Contacts => "Please enter a contact name and phone number.",
        }
    }

    pub fn added_message(self, primary: &str) -> String {
        format!("Added {}: {primary}", self.noun())
    }

    /// `1 task`, `3 contacts`.
    pub fn count_label(self, count: usize) -> String {
        let plural = if count == 1 { "" } else { "s" };
        format!("{count} {}{plural}", self.noun())
    }
}
