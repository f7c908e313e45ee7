// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use tasklist_app::{EditOutcome, EditWorkflow, Persistence, Record, Surface, TaskStatus};

const TASK_VERBS: [&str; 12] = [
    "Buy", "Call", "Fix", "Paint", "Email", "Clean", "Book", "Return", "Renew", "Plan", "Sort",
    "Water",
];

const TASK_OBJECTS: [&str; 14] = [
    "milk",
    "the dentist",
    "the gutter",
    "the fence",
    "Jordan",
    "the garage",
    "flights",
    "library books",
    "passport",
    "the garden",
    "receipts",
    "the plants",
    "oil change",
    "taxes",
];

const FIRST_NAMES: [&str; 12] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Rowan", "Hayden",
];

const LAST_NAMES: [&str; 12] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "O'Brien", "Brooks",
];

/// Field values that need CSV quoting or sit on its edges.
const AWKWARD_FIELDS: [&str; 10] = [
    "milk, eggs, bread",
    "say \"hi\"",
    "\"quoted\"",
    "line one\nline two",
    "crlf\r\nend",
    " padded ",
    ",",
    "\"",
    "trailing comma,",
    "tab\there",
];

/// What a scripted modal does when the controller opens a status editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalScript {
    Keep,
    Select(TaskStatus),
    Cancel,
}

/// Surface double that records every call and answers prompts from queues.
/// An empty confirm queue answers "no"; an empty modal queue cancels.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub notifications: Vec<String>,
    pub renders: Vec<Vec<Record>>,
    pub prompts: Vec<String>,
    pub opened_editors: Vec<(usize, TaskStatus)>,
    confirm_answers: VecDeque<bool>,
    modal_scripts: VecDeque<ModalScript>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_confirm(mut self, answer: bool) -> Self {
        self.confirm_answers.push_back(answer);
        self
    }

    pub fn script_modal(mut self, script: ModalScript) -> Self {
        self.modal_scripts.push_back(script);
        self
    }

    pub fn last_notification(&self) -> Option<&str> {
        self.notifications.last().map(String::as_str)
    }

    pub fn last_render(&self) -> Option<&[Record]> {
        self.renders.last().map(Vec::as_slice)
    }
}

impl Surface for RecordingSurface {
    fn render(&mut self, records: &[Record]) {
        self.renders.push(records.to_vec());
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_owned());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_owned());
        self.confirm_answers.pop_front().unwrap_or(false)
    }

    fn open_modal(&mut self, editor: &mut EditWorkflow) -> EditOutcome {
        self.opened_editors
            .push((editor.target_index(), editor.selected()));
        let script = self.modal_scripts.pop_front().unwrap_or(ModalScript::Cancel);
        let result = match script {
            ModalScript::Keep => editor.confirm().map(EditOutcome::Confirmed),
            ModalScript::Select(status) => editor
                .select(status)
                .and_then(|()| editor.confirm())
                .map(EditOutcome::Confirmed),
            ModalScript::Cancel => editor.cancel().map(|()| EditOutcome::Cancelled),
        };
        result.unwrap_or(EditOutcome::Cancelled)
    }
}

/// Path-keyed in-memory storage with switchable failures.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    files: RefCell<BTreeMap<PathBuf, Vec<Record>>>,
    fail_saves: bool,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, records: Vec<Record>) -> Self {
        self.files.borrow_mut().insert(path.into(), records);
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn file(&self, path: &Path) -> Option<Vec<Record>> {
        self.files.borrow().get(path).cloned()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self, path: &Path) -> Result<Vec<Record>> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .with_context(|| format!("read {}: no such file", path.display()))
    }

    fn save(&self, path: &Path, records: &[Record]) -> Result<()> {
        if self.fail_saves {
            bail!("write {}: disk full", path.display());
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), records.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator of task and contact rows.
#[derive(Debug, Clone)]
pub struct ListFaker {
    rng: DeterministicRng,
}

impl ListFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn task(&mut self) -> Record {
        let verb = self.pick(&TASK_VERBS);
        let object = self.pick(&TASK_OBJECTS);
        let status = TaskStatus::ALL[self.rng.int_n(TaskStatus::ALL.len())];
        Record::new(format!("{verb} {object}"), status.label())
    }

    pub fn contact(&mut self) -> Record {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        let phone = format!(
            "555-{:03}-{:04}",
            self.rng.int_n(1_000),
            self.rng.int_n(10_000)
        );
        Record::new(format!("{first} {last}"), phone)
    }

    /// A row whose fields exercise CSV quoting.
    pub fn awkward(&mut self) -> Record {
        let primary = self.pick(&AWKWARD_FIELDS);
        let secondary = self.pick(&AWKWARD_FIELDS);
        Record::new(primary, secondary)
    }

    pub fn tasks(&mut self, count: usize) -> Vec<Record> {
        (0..count).map(|_| self.task()).collect()
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

pub fn awkward_fields() -> &'static [&'static str] {
    &AWKWARD_FIELDS
}

pub fn temp_csv_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("todos.csv");
    Ok((dir, path))
}
