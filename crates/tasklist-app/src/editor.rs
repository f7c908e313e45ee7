// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::TaskStatus;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("status {0:?} is not one of Backlog, In Progress, Done")]
    UnknownStatus(String),
    #[error("status editor is already closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskUpdated {
    pub index: usize,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Confirmed(TaskUpdated),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Open,
    Confirmed,
    Cancelled,
}

/// Modal status editor for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditWorkflow {
    target_index: usize,
    selected: TaskStatus,
    phase: EditPhase,
}

impl EditWorkflow {
    pub fn open(target_index: usize, current: TaskStatus) -> Self {
        Self {
            target_index,
            selected: current,
            phase: EditPhase::Open,
        }
    }

    pub fn open_raw(target_index: usize, current: &str) -> Result<Self, EditorError> {
        let status = TaskStatus::parse(current)
            .ok_or_else(|| EditorError::UnknownStatus(current.to_owned()))?;
        Ok(Self::open(target_index, status))
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn selected(&self) -> TaskStatus {
        self.selected
    }

    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == EditPhase::Open
    }

    pub fn options(&self) -> &'static [TaskStatus] {
        &TaskStatus::ALL
    }

    pub fn select(&mut self, status: TaskStatus) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.selected = status;
        Ok(())
    }

    pub fn select_next(&mut self) -> Result<(), EditorError> {
        self.rotate(1)
    }

    pub fn select_previous(&mut self) -> Result<(), EditorError> {
        self.rotate(-1)
    }

    pub fn confirm(&mut self) -> Result<TaskUpdated, EditorError> {
        self.ensure_open()?;
        self.phase = EditPhase::Confirmed;
        Ok(TaskUpdated {
            index: self.target_index,
            status: self.selected,
        })
    }

    pub fn cancel(&mut self) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.phase = EditPhase::Cancelled;
        Ok(())
    }

    fn rotate(&mut self, delta: isize) -> Result<(), EditorError> {
        self.ensure_open()?;
        let options = TaskStatus::ALL;
        let len = options.len() as isize;
        let next = (self.selected.position() as isize + delta).rem_euclid(len) as usize;
        self.selected = options[next];
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), EditorError> {
        if self.phase != EditPhase::Open {
            return Err(EditorError::Closed);
        }
        Ok(())
    }
}
