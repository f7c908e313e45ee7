// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tasklist_app::{
    EditOutcome, EditWorkflow, ListController, ListVariant, Persistence, Record, Surface,
    TaskStatus,
};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const CURSOR: &str = "▏";
const PICK_MARK: &str = "▸";

/// Where keyboard input comes from. The terminal implementation polls
/// crossterm; tests feed a fixed script.
pub trait KeySource {
    /// `Ok(None)` means no key arrived before the poll interval elapsed.
    fn next_key(&mut self) -> Result<Option<KeyEvent>>;
}

pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn next_key(&mut self) -> Result<Option<KeyEvent>> {
        if !event::poll(POLL_INTERVAL).context("poll event")? {
            return Ok(None);
        }
        match event::read().context("read event")? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: VecDeque<KeyEvent>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn next_key(&mut self) -> Result<Option<KeyEvent>> {
        self.keys
            .pop_front()
            .map(Some)
            .ok_or_else(|| anyhow!("key script exhausted"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Primary,
    Secondary,
    Table,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Table,
            Self::Table => Self::Primary,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Primary => Self::Table,
            Self::Secondary => Self::Primary,
            Self::Table => Self::Secondary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Overlay {
    None,
    Help,
    Confirm(String),
    Editor { index: usize, selected: TaskStatus },
}

/// A user action decoded from one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add { primary: String, secondary: String },
    Edit(Option<usize>),
    Remove(Option<usize>),
    Save,
    Quit,
    Redraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Added,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewData {
    variant: ListVariant,
    rows: Vec<Record>,
    primary: String,
    secondary: String,
    status_choice: TaskStatus,
    focus: Focus,
    selected_row: Option<usize>,
    status_line: Option<String>,
    overlay: Overlay,
}

impl ViewData {
    pub fn new(variant: ListVariant) -> Self {
        Self {
            variant,
            rows: Vec::new(),
            primary: String::new(),
            secondary: String::new(),
            status_choice: TaskStatus::Backlog,
            focus: Focus::Primary,
            selected_row: None,
            status_line: None,
            overlay: Overlay::None,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected_row
    }

    pub fn status_line(&self) -> Option<&str> {
        self.status_line.as_deref()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    fn secondary_value(&self) -> String {
        match self.variant {
            ListVariant::Tasks => self.status_choice.label().to_owned(),
            ListVariant::Contacts => self.secondary.clone(),
        }
    }

    fn set_rows(&mut self, records: &[Record]) {
        self.rows = records.to_vec();
        self.selected_row = match self.selected_row {
            _ if self.rows.is_empty() => None,
            Some(row) => Some(row.min(self.rows.len() - 1)),
            None => None,
        };
    }

    fn clear_inputs(&mut self) {
        self.primary.clear();
        self.secondary.clear();
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected_row = None;
            return;
        }
        let last = self.rows.len() as isize - 1;
        let next = match self.selected_row {
            Some(row) => (row as isize + delta).clamp(0, last),
            None if delta < 0 => last,
            None => 0,
        };
        self.selected_row = Some(next as usize);
    }

    fn rotate_status_choice(&mut self, delta: isize) {
        let len = TaskStatus::ALL.len() as isize;
        let next = (self.status_choice.position() as isize + delta).rem_euclid(len) as usize;
        self.status_choice = TaskStatus::ALL[next];
    }
}

/// Maps one key press in the main window to an intent, applying pure view
/// changes (typing, focus, selection) along the way.
pub fn intent_for_key(view: &mut ViewData, key: KeyEvent) -> Intent {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('q') => Intent::Quit,
            KeyCode::Char('s') => Intent::Save,
            _ => Intent::Redraw,
        };
    }

    if view.overlay == Overlay::Help {
        view.overlay = Overlay::None;
        return Intent::Redraw;
    }

    match key.code {
        KeyCode::Tab => {
            view.focus = view.focus.next();
            return Intent::Redraw;
        }
        KeyCode::BackTab => {
            view.focus = view.focus.previous();
            return Intent::Redraw;
        }
        _ => {}
    }

    match view.focus {
        Focus::Primary => match key.code {
            KeyCode::Enter => add_intent(view),
            KeyCode::Backspace => {
                view.primary.pop();
                Intent::Redraw
            }
            KeyCode::Char(ch) => {
                view.primary.push(ch);
                Intent::Redraw
            }
            _ => Intent::Redraw,
        },
        Focus::Secondary => match (view.variant, key.code) {
            (_, KeyCode::Enter) => add_intent(view),
            (ListVariant::Tasks, KeyCode::Right | KeyCode::Down | KeyCode::Char('j' | ' ')) => {
                view.rotate_status_choice(1);
                Intent::Redraw
            }
            (ListVariant::Tasks, KeyCode::Left | KeyCode::Up | KeyCode::Char('k')) => {
                view.rotate_status_choice(-1);
                Intent::Redraw
            }
            (ListVariant::Contacts, KeyCode::Backspace) => {
                view.secondary.pop();
                Intent::Redraw
            }
            (ListVariant::Contacts, KeyCode::Char(ch)) => {
                view.secondary.push(ch);
                Intent::Redraw
            }
            _ => Intent::Redraw,
        },
        Focus::Table => match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                view.move_selection(1);
                Intent::Redraw
            }
            KeyCode::Up | KeyCode::Char('k') => {
                view.move_selection(-1);
                Intent::Redraw
            }
            KeyCode::Home | KeyCode::Char('g') => {
                view.move_selection(-(view.rows.len() as isize));
                Intent::Redraw
            }
            KeyCode::End | KeyCode::Char('G') => {
                view.move_selection(view.rows.len() as isize);
                Intent::Redraw
            }
            KeyCode::Esc => {
                view.selected_row = None;
                Intent::Redraw
            }
            KeyCode::Enter | KeyCode::Char('e') if view.variant.supports_edit() => {
                Intent::Edit(view.selected_row)
            }
            KeyCode::Char('d') | KeyCode::Delete if view.variant.supports_remove() => {
                Intent::Remove(view.selected_row)
            }
            KeyCode::Char('?') => {
                view.overlay = Overlay::Help;
                Intent::Redraw
            }
            _ => Intent::Redraw,
        },
    }
}

fn add_intent(view: &ViewData) -> Intent {
    Intent::Add {
        primary: view.primary.clone(),
        secondary: view.secondary_value(),
    }
}

pub fn apply_intent<P: Persistence, S: Surface>(
    controller: &mut ListController<P>,
    surface: &mut S,
    intent: Intent,
    csv_path: Option<&Path>,
) -> Result<Flow> {
    match intent {
        Intent::Add { primary, secondary } => {
            let before = controller.records().len();
            controller.on_add_record(surface, &primary, &secondary);
            if controller.records().len() > before {
                return Ok(Flow::Added);
            }
        }
        Intent::Edit(selected) => controller.on_request_edit(surface, selected)?,
        Intent::Remove(selected) => controller.on_request_remove(surface, selected)?,
        Intent::Save => match csv_path {
            Some(path) => controller.on_save_requested(surface, path)?,
            None => surface.notify("no CSV file for this list"),
        },
        Intent::Quit => return Ok(Flow::Quit),
        Intent::Redraw => {}
    }
    Ok(Flow::Continue)
}

/// Returns `Some(answer)` once the key settles a yes/no prompt.
pub fn confirm_answer_for_key(key: KeyEvent) -> Option<bool> {
    match key.code {
        KeyCode::Char('y' | 'Y') => Some(true),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(false),
        _ => None,
    }
}

/// Drives the editor state machine from one key press. Returns the outcome
/// once the editor has closed.
pub fn handle_editor_key(editor: &mut EditWorkflow, key: KeyEvent) -> Option<EditOutcome> {
    let step = match key.code {
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => editor.select_next().map(|()| None),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
            editor.select_previous().map(|()| None)
        }
        KeyCode::Char(digit @ '1'..='3') => {
            let index = digit as usize - '1' as usize;
            editor.select(TaskStatus::ALL[index]).map(|()| None)
        }
        KeyCode::Enter => editor
            .confirm()
            .map(|update| Some(EditOutcome::Confirmed(update))),
        KeyCode::Esc | KeyCode::Char('q') => editor.cancel().map(|()| Some(EditOutcome::Cancelled)),
        _ => Ok(None),
    };
    step.unwrap_or(Some(EditOutcome::Cancelled))
}

/// Display surface backed by a ratatui terminal. `confirm` and `open_modal`
/// run their own key loops and return only when the user has answered.
pub struct TerminalSurface<B: Backend, K: KeySource> {
    terminal: Terminal<B>,
    keys: K,
    view: ViewData,
}

impl<B: Backend, K: KeySource> TerminalSurface<B, K> {
    pub fn new(backend: B, keys: K, variant: ListVariant) -> Result<Self> {
        let terminal = Terminal::new(backend).context("create terminal")?;
        Ok(Self {
            terminal,
            keys,
            view: ViewData::new(variant),
        })
    }

    pub fn view(&self) -> &ViewData {
        &self.view
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn draw(&mut self) -> Result<()> {
        let view = &self.view;
        self.terminal
            .draw(|frame| render(frame, view))
            .map_err(|error| anyhow!("draw frame: {error}"))?;
        Ok(())
    }

    /// Runs the main window until the user quits.
    pub fn run<P: Persistence>(
        &mut self,
        controller: &mut ListController<P>,
        csv_path: Option<&Path>,
    ) -> Result<()> {
        loop {
            self.draw()?;
            let Some(key) = self.keys.next_key()? else {
                continue;
            };

            let intent = intent_for_key(&mut self.view, key);
            if intent != Intent::Redraw {
                debug!(?intent, "intent");
            }
            match apply_intent(controller, self, intent, csv_path) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Added) => self.view.clear_inputs(),
                Ok(Flow::Continue) => {}
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "action failed");
                    self.notify(&format!("error: {error:#}"));
                }
            }
        }
    }

    fn next_modal_key(&mut self) -> Result<KeyEvent> {
        loop {
            self.draw()?;
            if let Some(key) = self.keys.next_key()? {
                return Ok(key);
            }
        }
    }
}

impl<B: Backend, K: KeySource> Surface for TerminalSurface<B, K> {
    fn render(&mut self, records: &[Record]) {
        self.view.set_rows(records);
    }

    fn notify(&mut self, message: &str) {
        self.view.status_line = Some(message.to_owned());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.view.overlay = Overlay::Confirm(prompt.to_owned());
        let answer = loop {
            match self.next_modal_key() {
                Ok(key) => {
                    if let Some(answer) = confirm_answer_for_key(key) {
                        break answer;
                    }
                }
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "confirm prompt dismissed");
                    break false;
                }
            }
        };
        self.view.overlay = Overlay::None;
        answer
    }

    fn open_modal(&mut self, editor: &mut EditWorkflow) -> EditOutcome {
        let outcome = loop {
            self.view.overlay = Overlay::Editor {
                index: editor.target_index(),
                selected: editor.selected(),
            };
            match self.next_modal_key() {
                Ok(key) => {
                    if let Some(outcome) = handle_editor_key(editor, key) {
                        break outcome;
                    }
                }
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "status editor dismissed");
                    let _ = editor.cancel();
                    break EditOutcome::Cancelled;
                }
            }
        };
        self.view.overlay = Overlay::None;
        outcome
    }
}

/// Takes over the terminal, loads the task file when given, and runs the
/// window until ctrl+q. The terminal is restored on every exit path.
pub fn run_app<P: Persistence>(
    controller: &mut ListController<P>,
    csv_path: Option<PathBuf>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, terminal::EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(error).context("enter alternate screen");
    }

    let result = run_session(controller, csv_path.as_deref());

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn run_session<P: Persistence>(
    controller: &mut ListController<P>,
    csv_path: Option<&Path>,
) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut surface = TerminalSurface::new(backend, CrosstermKeys, controller.variant())?;

    if let Some(path) = csv_path
        && controller.variant().supports_persistence()
    {
        let count = controller.on_startup_load(&mut surface, path)?;
        surface.notify(&loaded_message(controller.variant(), count, path));
    } else {
        surface.render(controller.records());
    }

    surface.run(controller, csv_path)
}

fn loaded_message(variant: ListVariant, count: usize, path: &Path) -> String {
    format!("Loaded {} from {}", variant.count_label(count), path.display())
}

fn render(frame: &mut ratatui::Frame<'_>, view: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let inputs = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[1]);

    let title = Paragraph::new(format!("{} ({} rows)", view.variant.title(), view.rows.len()))
        .block(Block::default().title("tasklist").borders(Borders::ALL))
        .style(Style::default().fg(Color::White));
    frame.render_widget(title, layout[0]);

    frame.render_widget(
        input_widget(
            view.variant.primary_placeholder(),
            &view.primary,
            view.focus == Focus::Primary,
        ),
        inputs[0],
    );
    let secondary = match view.variant {
        ListVariant::Tasks => render_status_choice(view.status_choice),
        ListVariant::Contacts => view.secondary.clone(),
    };
    frame.render_widget(
        input_widget(
            view.variant.secondary_placeholder(),
            &secondary,
            view.focus == Focus::Secondary,
        ),
        inputs[1],
    );

    render_table(frame, layout[2], view);

    let status = Paragraph::new(status_text(view))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[3]);

    match &view.overlay {
        Overlay::None => {}
        Overlay::Help => {
            let area = centered_rect(70, 50, frame.area());
            frame.render_widget(Clear, area);
            let help = Paragraph::new(help_overlay_text(view.variant))
                .block(Block::default().title("help").borders(Borders::ALL));
            frame.render_widget(help, area);
        }
        Overlay::Confirm(prompt) => {
            let area = centered_rect(60, 25, frame.area());
            frame.render_widget(Clear, area);
            let confirm = Paragraph::new(format!("{prompt}\n\ny yes | n no"))
                .block(
                    Block::default()
                        .title("Remove Contact")
                        .borders(Borders::ALL)
                        .style(Style::default().fg(Color::Cyan)),
                );
            frame.render_widget(confirm, area);
        }
        Overlay::Editor { index, selected } => {
            let area = centered_rect(40, 35, frame.area());
            frame.render_widget(Clear, area);
            let editor = Paragraph::new(render_editor_text(*index, *selected, &view.rows)).block(
                Block::default()
                    .title("Edit Task Status")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
            frame.render_widget(editor, area);
        }
    }
}

fn input_widget<'a>(label: &'a str, value: &str, focused: bool) -> Paragraph<'a> {
    let text = if focused {
        format!("{value}{CURSOR}")
    } else {
        value.to_owned()
    };
    let style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Paragraph::new(text).block(Block::default().title(label).borders(Borders::ALL).style(style))
}

fn render_status_choice(choice: TaskStatus) -> String {
    format!("< {} >", choice.label())
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view: &ViewData) {
    let header = Row::new(view.variant.headers().map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = view.rows.iter().enumerate().map(|(index, record)| {
        let style = if Some(index) == view.selected_row {
            if view.focus == Focus::Table {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(Color::DarkGray)
            }
        } else {
            Style::default()
        };
        Row::new([
            Cell::from(record.primary.clone()),
            Cell::from(record.secondary.clone()),
        ])
        .style(style)
    });

    let border_style = if view.focus == Focus::Table {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let table = Table::new(rows, [Constraint::Percentage(60), Constraint::Percentage(40)])
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(view.variant.noun())
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(table, area);
}

fn render_editor_text(index: usize, selected: TaskStatus, rows: &[Record]) -> String {
    let task = rows
        .get(index)
        .map(|record| record.primary.as_str())
        .unwrap_or_default();
    let mut lines = vec![task.to_owned(), String::new()];
    for (position, status) in TaskStatus::ALL.iter().enumerate() {
        let mark = if *status == selected { PICK_MARK } else { " " };
        lines.push(format!("{mark} {} {}", position + 1, status.label()));
    }
    lines.push(String::new());
    lines.push("j/k pick | enter save | esc cancel".to_owned());
    lines.join("\n")
}

fn status_text(view: &ViewData) -> String {
    let hints = match (view.variant, view.focus) {
        (_, Focus::Primary) => "type | enter add | tab next | ctrl+q quit",
        (ListVariant::Tasks, Focus::Secondary) => {
            "j/k status | enter add | tab next | ctrl+s save | ctrl+q quit"
        }
        (ListVariant::Contacts, Focus::Secondary) => "type | enter add | tab next | ctrl+q quit",
        (ListVariant::Tasks, Focus::Table) => {
            "j/k row | e edit | esc clear | ctrl+s save | ? help | ctrl+q quit"
        }
        (ListVariant::Contacts, Focus::Table) => {
            "j/k row | d remove | esc clear | ? help | ctrl+q quit"
        }
    };
    match &view.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
}

fn help_overlay_text(variant: ListVariant) -> &'static str {
    match variant {
        ListVariant::Tasks => {
            "global: tab/shift+tab focus | ctrl+s save | ctrl+q quit\n\
task field: type | backspace | enter add\n\
status field: j/k or arrows cycle | enter add\n\
table: j/k g/G move | e or enter edit status | esc clear selection\n\
editor: j/k or 1-3 pick | enter save | esc cancel"
        }
        ListVariant::Contacts => {
            "global: tab/shift+tab focus | ctrl+q quit\n\
name/phone fields: type | backspace | enter add\n\
table: j/k g/G move | d remove (y/n) | esc clear selection"
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
