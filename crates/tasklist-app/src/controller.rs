// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::{EditOutcome, EditWorkflow, ListVariant, Record, RecordStore, StoreError};

pub const REMOVE_CONTACT_PROMPT: &str = "Are you sure you want to remove the selected contact?";

/// The display side of a list window. Calls are synchronous: `confirm` and
/// `open_modal` return only once the user has answered or closed the modal.
pub trait Surface {
    fn render(&mut self, records: &[Record]);
    fn notify(&mut self, message: &str);
    fn confirm(&mut self, prompt: &str) -> bool;
    fn open_modal(&mut self, editor: &mut EditWorkflow) -> EditOutcome;
}

/// Reads and writes the full record set at a path.
pub trait Persistence {
    fn load(&self, path: &Path) -> Result<Vec<Record>>;
    fn save(&self, path: &Path, records: &[Record]) -> Result<()>;
}

/// Owns the record store for the lifetime of a window and applies user intents
/// to it. While an editor is open the controller is exclusively borrowed by
/// `on_request_edit`, so a second edit cannot start until the first closes.
pub struct ListController<P> {
    variant: ListVariant,
    store: RecordStore,
    persistence: P,
}

impl<P: Persistence> ListController<P> {
    pub fn new(variant: ListVariant, persistence: P) -> Self {
        Self {
            variant,
            store: RecordStore::new(),
            persistence,
        }
    }

    pub fn variant(&self) -> ListVariant {
        self.variant
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn records(&self) -> &[Record] {
        self.store.all()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn on_add_record<S: Surface>(&mut self, surface: &mut S, primary: &str, secondary: &str) {
        if primary.trim().is_empty() || secondary.is_empty() {
            warn!(variant = self.variant.as_str(), "add rejected: missing input");
            surface.notify(self.variant.missing_input_message());
            return;
        }

        let index = self.store.append(Record::new(primary, secondary));
        debug!(variant = self.variant.as_str(), index, "row added");
        surface.render(self.store.all());
        surface.notify(&self.variant.added_message(primary));
    }

    pub fn on_request_edit<S: Surface>(
        &mut self,
        surface: &mut S,
        selected: Option<usize>,
    ) -> Result<()> {
        if !self.variant.supports_edit() {
            surface.notify(&format!("{} rows cannot be edited", self.variant.noun()));
            return Ok(());
        }
        let Some(index) = selected else {
            surface.notify("Please select a task to edit.");
            return Ok(());
        };
        let record = self.store.get(index).ok_or(StoreError::IndexOutOfBounds {
            index,
            len: self.store.len(),
        })?;

        let mut editor = EditWorkflow::open_raw(index, &record.secondary)?;
        debug!(index, status = editor.selected().as_str(), "status editor opened");
        match surface.open_modal(&mut editor) {
            EditOutcome::Confirmed(update) => {
                self.on_edit_confirmed(surface, update.index, update.status.label())?;
            }
            EditOutcome::Cancelled => {
                debug!(index, "status editor cancelled");
            }
        }
        Ok(())
    }

    pub fn on_edit_confirmed<S: Surface>(
        &mut self,
        surface: &mut S,
        index: usize,
        secondary: &str,
    ) -> Result<(), StoreError> {
        self.store.replace_secondary_at(index, secondary)?;
        debug!(index, secondary, "row updated");
        surface.render(self.store.all());
        surface.notify(&format!("Task status updated to: {secondary}"));
        Ok(())
    }

    pub fn on_request_remove<S: Surface>(
        &mut self,
        surface: &mut S,
        selected: Option<usize>,
    ) -> Result<()> {
        if !self.variant.supports_remove() {
            surface.notify(&format!("{} rows cannot be removed", self.variant.noun()));
            return Ok(());
        }
        let Some(index) = selected else {
            surface.notify("Please select a row to be removed.");
            return Ok(());
        };
        if index >= self.store.len() {
            return Err(StoreError::IndexOutOfBounds {
                index,
                len: self.store.len(),
            }
            .into());
        }

        if !surface.confirm(REMOVE_CONTACT_PROMPT) {
            debug!(index, "remove declined");
            return Ok(());
        }

        self.store.remove_at(index)?;
        debug!(index, "row removed");
        surface.render(self.store.all());
        surface.notify("Contact removed.");
        Ok(())
    }

    /// Appends every record from `path` in file order. Nothing is appended
    /// when the file cannot be read or decoded.
    pub fn on_startup_load<S: Surface>(&mut self, surface: &mut S, path: &Path) -> Result<usize> {
        self.ensure_persistent()?;
        let records = self.persistence.load(path)?;
        let count = records.len();
        self.store.extend(records);
        info!(path = %path.display(), count, "records loaded");
        surface.render(self.store.all());
        Ok(count)
    }

    pub fn on_save_requested<S: Surface>(&mut self, surface: &mut S, path: &Path) -> Result<()> {
        self.ensure_persistent()?;
        self.persistence.save(path, self.store.all())?;
        let count = self.store.len();
        info!(path = %path.display(), count, "records saved");
        surface.notify(&format!(
            "Saved {} to {}",
            self.variant.count_label(count),
            path.display()
        ));
        Ok(())
    }

    fn ensure_persistent(&self) -> Result<()> {
        if !self.variant.supports_persistence() {
            bail!(
                "the {} list has no file storage; run the tasks list to load or save CSV",
                self.variant.noun()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ListController, Persistence, Surface};
    use crate::{EditOutcome, EditWorkflow, ListVariant, Record, StoreError, TaskStatus};
    use anyhow::Result;
    use std::cell::RefCell;
    use std::path::Path;

    #[derive(Default)]
    struct NoteSurface {
        notes: Vec<String>,
        renders: usize,
        answer: bool,
        pick: Option<TaskStatus>,
    }

    impl Surface for NoteSurface {
        fn render(&mut self, _records: &[Record]) {
            self.renders += 1;
        }

        fn notify(&mut self, message: &str) {
            self.notes.push(message.to_owned());
        }

        fn confirm(&mut self, _prompt: &str) -> bool {
            self.answer
        }

        fn open_modal(&mut self, editor: &mut EditWorkflow) -> EditOutcome {
            match self.pick {
                Some(status) => {
                    let _ = editor.select(status);
                    editor
                        .confirm()
                        .map(EditOutcome::Confirmed)
                        .unwrap_or(EditOutcome::Cancelled)
                }
                None => {
                    let _ = editor.cancel();
                    EditOutcome::Cancelled
                }
            }
        }
    }

    #[derive(Default)]
    struct Scratch {
        saved: RefCell<Vec<Record>>,
    }

    impl Persistence for Scratch {
        fn load(&self, _path: &Path) -> Result<Vec<Record>> {
            Ok(self.saved.borrow().clone())
        }

        fn save(&self, _path: &Path, records: &[Record]) -> Result<()> {
            *self.saved.borrow_mut() = records.to_vec();
            Ok(())
        }
    }

    #[test]
    fn add_trims_primary_only_for_validation() {
        let mut controller = ListController::new(ListVariant::Tasks, Scratch::default());
        let mut surface = NoteSurface::default();

        controller.on_add_record(&mut surface, "   ", "Backlog");
        controller.on_add_record(&mut surface, "Buy milk", "");
        assert!(controller.records().is_empty());
        assert_eq!(surface.renders, 0);

        controller.on_add_record(&mut surface, " Buy milk ", "Backlog");
        assert_eq!(controller.records(), &[Record::new(" Buy milk ", "Backlog")]);
        assert_eq!(
            surface.notes.last().map(String::as_str),
            Some("Added task:  Buy milk ")
        );
    }

    #[test]
    fn edit_applies_selected_status() -> Result<()> {
        let mut controller = ListController::new(ListVariant::Tasks, Scratch::default());
        let mut surface = NoteSurface {
            pick: Some(TaskStatus::InProgress),
            ..NoteSurface::default()
        };
        controller.on_add_record(&mut surface, "Paint fence", "Backlog");

        controller.on_request_edit(&mut surface, Some(0))?;
        assert_eq!(controller.records()[0].secondary, "In Progress");
        assert_eq!(
            surface.notes.last().map(String::as_str),
            Some("Task status updated to: In Progress")
        );
        Ok(())
    }

    #[test]
    fn edit_with_stale_index_is_an_index_error() {
        let mut controller = ListController::new(ListVariant::Tasks, Scratch::default());
        let mut surface = NoteSurface::default();
        let error = controller
            .on_request_edit(&mut surface, Some(2))
            .expect_err("empty list has no row 2");
        assert_eq!(
            error.downcast_ref::<StoreError>(),
            Some(&StoreError::IndexOutOfBounds { index: 2, len: 0 })
        );
    }

    #[test]
    fn contacts_cannot_save() {
        let mut controller = ListController::new(ListVariant::Contacts, Scratch::default());
        let mut surface = NoteSurface::default();
        let error = controller
            .on_save_requested(&mut surface, Path::new("contacts.csv"))
            .expect_err("contacts have no storage");
        assert!(error.to_string().contains("no file storage"));
    }

    #[test]
    fn save_then_load_into_fresh_controller() -> Result<()> {
        let mut controller = ListController::new(ListVariant::Tasks, Scratch::default());
        let mut surface = NoteSurface::default();
        controller.on_add_record(&mut surface, "Buy milk", "Backlog");
        controller.on_save_requested(&mut surface, Path::new("todos.csv"))?;
        assert_eq!(
            surface.notes.last().map(String::as_str),
            Some("Saved 1 task to todos.csv")
        );

        let saved = controller.persistence().saved.borrow().clone();
        let mut fresh = ListController::new(
            ListVariant::Tasks,
            Scratch {
                saved: RefCell::new(saved),
            },
        );
        let loaded = fresh.on_startup_load(&mut surface, Path::new("todos.csv"))?;
        assert_eq!(loaded, 1);
        assert_eq!(fresh.records(), controller.records());
        Ok(())
    }
}
