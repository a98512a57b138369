use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use open::that as open_path;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Table, Wrap};
use ratatui::Frame;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::RollError;
use crate::models::{Criterion, SortDirection, SortField};
use crate::session::{SaveTarget, Session};
use crate::sort::SortSource;
use crate::sync::{DeleteOutcome, InsertMode};

use super::forms::{
    ChoiceDialog, ChoicePurpose, PendingSave, PromptForm, PromptPurpose, VoterField, VoterForm,
};
use super::helpers::{
    centered_rect, header_row, record_row, records_phrase, surface_error, TABLE_WIDTHS,
};
use super::screens::{MainMenuItem, RecordView, SessionAction, SessionScreen};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Width of the operation menu on the session screen.
const MENU_WIDTH: u16 = 28;
/// Rows moved by PageUp / PageDown in the record table.
const PAGE: isize = 10;

/// High-level navigation states.
enum Screen {
    MainMenu { selected: usize },
    Session(SessionScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Prompt(PromptForm),
    Choice(ChoiceDialog),
    EnteringVoters(VoterForm),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    config: Config,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            screen: Screen::MainMenu { selected: 0 },
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Dispatch one key press. Returns `true` when the application should
    /// exit; an `Err` is fatal and ends the event loop.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Prompt(form) => self.handle_prompt(code, form)?,
            Mode::Choice(dialog) => self.handle_choice(code, dialog)?,
            Mode::EnteringVoters(form) => self.handle_voter_form(code, form)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match &mut self.screen {
            Screen::MainMenu { selected } => {
                let last = MainMenuItem::ALL.len() - 1;
                let item = match code {
                    KeyCode::Char('q') | KeyCode::Esc => Some(MainMenuItem::Quit),
                    KeyCode::Up => {
                        *selected = selected.saturating_sub(1);
                        None
                    }
                    KeyCode::Down => {
                        *selected = (*selected + 1).min(last);
                        None
                    }
                    KeyCode::Enter => Some(MainMenuItem::ALL[(*selected).min(last)]),
                    KeyCode::Char(ch) => digit_index(ch, MainMenuItem::ALL.len())
                        .map(|index| MainMenuItem::ALL[index]),
                    _ => None,
                };
                Ok(match item {
                    Some(MainMenuItem::CreateStore) => {
                        Mode::Prompt(PromptForm::new(PromptPurpose::OpenStore { create: true }))
                    }
                    Some(MainMenuItem::OpenStore) => Mode::Prompt(PromptForm::with_value(
                        PromptPurpose::OpenStore { create: false },
                        &self.config.default_store,
                    )),
                    Some(MainMenuItem::Quit) => {
                        *exit = true;
                        Mode::Normal
                    }
                    None => Mode::Normal,
                })
            }
            Screen::Session(screen) => {
                let action = match code {
                    KeyCode::Char('q') => {
                        *exit = true;
                        None
                    }
                    KeyCode::Esc => Some(SessionAction::Back),
                    KeyCode::Up => {
                        screen.move_selection(-1);
                        None
                    }
                    KeyCode::Down => {
                        screen.move_selection(1);
                        None
                    }
                    KeyCode::PageUp => {
                        screen.view.scroll_by(-PAGE);
                        None
                    }
                    KeyCode::PageDown => {
                        screen.view.scroll_by(PAGE);
                        None
                    }
                    KeyCode::Enter => Some(screen.current_action()),
                    KeyCode::Char(ch) => digit_index(ch, SessionAction::ALL.len())
                        .map(|index| SessionAction::ALL[index]),
                    _ => None,
                };
                match action {
                    Some(action) => self.run_session_action(action),
                    None => Ok(Mode::Normal),
                }
            }
        }
    }

    fn run_session_action(&mut self, action: SessionAction) -> Result<Mode> {
        self.clear_status();
        let Screen::Session(screen) = &mut self.screen else {
            return Ok(Mode::Normal);
        };
        if let Some(index) = SessionAction::ALL.iter().position(|a| *a == action) {
            screen.selected = index;
        }

        let mode = match action {
            SessionAction::ListAll => {
                self.show_all("All voters");
                Mode::Normal
            }
            SessionAction::SearchStreet => Mode::Prompt(PromptForm::new(PromptPurpose::SearchStreet)),
            SessionAction::SearchYear => Mode::Prompt(PromptForm::new(PromptPurpose::SearchYear)),
            SessionAction::SearchCity => Mode::Prompt(PromptForm::new(PromptPurpose::SearchCity)),
            SessionAction::Sort => Mode::Choice(ChoiceDialog::new(
                ChoicePurpose::SortSource,
                "Sort Source",
                vec!["Whole table".into(), "A saved file".into()],
            )),
            SessionAction::AddVoters => {
                screen.session.set_mode(InsertMode::Append);
                Mode::EnteringVoters(VoterForm::default())
            }
            SessionAction::Delete => {
                self.show_all("All voters");
                Mode::Prompt(PromptForm::new(PromptPurpose::DeleteId))
            }
            SessionAction::DisplayFile => Mode::Prompt(PromptForm::new(PromptPurpose::DisplayFile)),
            SessionAction::Back => {
                let name = screen.session.store_name();
                self.screen = Screen::MainMenu { selected: 0 };
                info!(store = %name, "closed database");
                self.set_status(format!("Closed {name}."), StatusKind::Info);
                Mode::Normal
            }
        };
        Ok(mode)
    }

    fn handle_prompt(&mut self, code: KeyCode, mut form: PromptForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status(format!("{} cancelled.", form.title()), StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                form.backspace();
                Ok(Mode::Prompt(form))
            }
            KeyCode::Enter => self.submit_prompt(form),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
                Ok(Mode::Prompt(form))
            }
            _ => Ok(Mode::Prompt(form)),
        }
    }

    fn submit_prompt(&mut self, mut form: PromptForm) -> Result<Mode> {
        let value = match form.validated(self.config.script) {
            Ok(value) => value,
            Err(err) => {
                let message = err.to_string();
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                return Ok(Mode::Prompt(form));
            }
        };

        match form.purpose.clone() {
            PromptPurpose::OpenStore { create } => self.open_store(form, &value, create),
            PromptPurpose::SearchStreet => self.run_search(Criterion::ByStreetSubstring(value)),
            PromptPurpose::SearchYear => {
                let year = value
                    .parse::<i32>()
                    .context("birth year must be a number")?;
                self.run_search(Criterion::ByBirthYear(year))
            }
            PromptPurpose::SearchCity => self.run_search(Criterion::ByBirthCity(value)),
            PromptPurpose::DeleteId => {
                let id = value
                    .parse::<i64>()
                    .context("voter ID must be a number")?;
                self.delete_voter(id);
                Ok(Mode::Normal)
            }
            PromptPurpose::DisplayFile => {
                self.display_file(&value);
                Ok(Mode::Normal)
            }
            PromptPurpose::SortFile => {
                let Some(screen) = self.session_screen() else {
                    return Ok(Mode::Normal);
                };
                match screen.session.file_source(&value) {
                    Ok(source) => Ok(sort_field_dialog(source)),
                    Err(err) => {
                        form.error = Some(err.to_string());
                        Ok(Mode::Prompt(form))
                    }
                }
            }
            PromptPurpose::SaveName(pending) => {
                Ok(self.save_pending(pending, SaveTarget::Custom(value)))
            }
        }
    }

    fn open_store(&mut self, mut form: PromptForm, name: &str, create: bool) -> Result<Mode> {
        match Session::open(&self.config, name, create) {
            Ok(session) => {
                let path = session.store_path().display().to_string();
                let mut screen = SessionScreen::new(session);
                let mode = if create {
                    screen.show(RecordView::new("All voters", Vec::new()));
                    self.set_status(
                        format!("Created {path}. Enter voters; Esc when done."),
                        StatusKind::Info,
                    );
                    Mode::EnteringVoters(VoterForm::default())
                } else {
                    let records = screen
                        .session
                        .list_all()
                        .with_context(|| format!("failed to read {path}"))?;
                    self.set_status(
                        format!("Opened {path}: {}.", records_phrase(records.len())),
                        StatusKind::Info,
                    );
                    screen.show(RecordView::new("All voters", records));
                    Mode::Normal
                };
                self.screen = Screen::Session(screen);
                Ok(mode)
            }
            Err(err @ (RollError::MissingStore { .. } | RollError::Validation(_))) => {
                let message = err.to_string();
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Ok(Mode::Prompt(form))
            }
            Err(err) => Err(anyhow::Error::new(err).context("failed to open database")),
        }
    }

    fn run_search(&mut self, criterion: Criterion) -> Result<Mode> {
        let Some(screen) = self.session_screen() else {
            return Ok(Mode::Normal);
        };
        let title = criterion.describe();
        match screen.session.search(&criterion) {
            Ok(records) if records.is_empty() => {
                screen.show(RecordView::new(title, records));
                self.set_status("No matching records.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            Ok(records) => {
                let count = records.len();
                screen.show(RecordView::new(title, records));
                self.set_status(
                    format!("Found {}. Save them?", records_phrase(count)),
                    StatusKind::Info,
                );
                Ok(offer_save(PendingSave::Search(criterion)))
            }
            Err(err) => {
                self.report(err.into());
                Ok(Mode::Normal)
            }
        }
    }

    fn delete_voter(&mut self, id: i64) {
        let Some(screen) = self.session_screen() else {
            return;
        };
        let outcome = screen.session.delete(id);
        match outcome {
            Ok(DeleteOutcome::Deleted {
                record,
                pruned,
                failed,
            }) => {
                self.show_all("All voters");
                let removed_from = pruned.iter().filter(|(_, p)| p.removed > 0).count();
                let kept: usize = pruned.iter().map(|(_, p)| p.retained_malformed).sum();
                let mut text = if failed.is_empty() {
                    format!("Deleted {id} ({record}); removed from {removed_from} file(s)")
                } else {
                    let names: Vec<&str> = failed.iter().map(|(name, _)| name.as_str()).collect();
                    format!("Deleted {id}, but could not update: {}", names.join(", "))
                };
                if kept > 0 {
                    text.push_str(&format!("; kept {kept} unparsable line(s)"));
                }
                text.push('.');
                let kind = if failed.is_empty() {
                    StatusKind::Info
                } else {
                    StatusKind::Error
                };
                self.set_status(text, kind);
            }
            Ok(DeleteOutcome::NotFound) => {
                self.set_status(RollError::NotFound { id }.to_string(), StatusKind::Error);
            }
            Err(err) => self.report(err.into()),
        }
    }

    fn display_file(&mut self, name: &str) {
        let Some(screen) = self.session_screen() else {
            return;
        };
        match screen.session.read_flat_file(name) {
            Ok((file_name, contents)) => {
                screen.last_file = Some(screen.session.file_path(&file_name));
                let count = contents.records.len();
                let skipped = contents.skipped.len();
                screen.show(RecordView::new(file_name.clone(), contents.records).with_skipped(skipped));
                if count == 0 {
                    self.set_status(
                        format!("{file_name} is empty or malformed."),
                        StatusKind::Error,
                    );
                } else if skipped > 0 {
                    self.set_status(
                        format!("{file_name}: {}, {skipped} line(s) skipped.", records_phrase(count)),
                        StatusKind::Info,
                    );
                } else {
                    self.set_status(
                        format!("{file_name}: {}.", records_phrase(count)),
                        StatusKind::Info,
                    );
                }
            }
            Err(err) => self.report(err.into()),
        }
    }

    fn handle_choice(&mut self, code: KeyCode, mut dialog: ChoiceDialog) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                let message = match dialog.purpose {
                    ChoicePurpose::OfferSave(_) | ChoicePurpose::SaveTarget(_) => "Not saved.",
                    _ => "Sort cancelled.",
                };
                self.set_status(message, StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Up => {
                dialog.move_selection(-1);
                Ok(Mode::Choice(dialog))
            }
            KeyCode::Down | KeyCode::Tab => {
                dialog.move_selection(1);
                Ok(Mode::Choice(dialog))
            }
            KeyCode::Enter => {
                let choice = dialog.selected;
                self.submit_choice(dialog.purpose, choice)
            }
            KeyCode::Char('y') | KeyCode::Char('Y')
                if matches!(dialog.purpose, ChoicePurpose::OfferSave(_)) =>
            {
                self.submit_choice(dialog.purpose, 0)
            }
            KeyCode::Char('n') | KeyCode::Char('N')
                if matches!(dialog.purpose, ChoicePurpose::OfferSave(_)) =>
            {
                self.submit_choice(dialog.purpose, 1)
            }
            KeyCode::Char(ch) => match dialog.option_for_digit(ch) {
                Some(choice) => self.submit_choice(dialog.purpose, choice),
                None => Ok(Mode::Choice(dialog)),
            },
            _ => Ok(Mode::Choice(dialog)),
        }
    }

    fn submit_choice(&mut self, purpose: ChoicePurpose, choice: usize) -> Result<Mode> {
        let mode = match purpose {
            ChoicePurpose::OfferSave(pending) => {
                if choice != 0 {
                    self.set_status("Not saved.", StatusKind::Info);
                    Mode::Normal
                } else if matches!(pending, PendingSave::Sorted { from_file: true, .. }) {
                    Mode::Prompt(PromptForm::new(PromptPurpose::SaveName(pending)))
                } else {
                    let default = default_file_name(&pending);
                    Mode::Choice(ChoiceDialog::new(
                        ChoicePurpose::SaveTarget(pending),
                        "Save To",
                        vec![format!("Default file ({default})"), "Custom name".into()],
                    ))
                }
            }
            ChoicePurpose::SaveTarget(pending) => {
                if choice == 0 {
                    self.save_pending(pending, SaveTarget::Default)
                } else {
                    Mode::Prompt(PromptForm::new(PromptPurpose::SaveName(pending)))
                }
            }
            ChoicePurpose::SortSource => {
                if choice == 0 {
                    sort_field_dialog(SortSource::LiveTable)
                } else {
                    Mode::Prompt(PromptForm::new(PromptPurpose::SortFile))
                }
            }
            ChoicePurpose::SortField(source) => {
                let field = SortField::ALL[choice.min(SortField::ALL.len() - 1)];
                Mode::Choice(ChoiceDialog::new(
                    ChoicePurpose::SortDirection(source, field),
                    format!("Sort by {}", field.label()),
                    vec![
                        SortDirection::Ascending.label().into(),
                        SortDirection::Descending.label().into(),
                    ],
                ))
            }
            ChoicePurpose::SortDirection(source, field) => {
                let direction = if choice == 0 {
                    SortDirection::Ascending
                } else {
                    SortDirection::Descending
                };
                self.run_sort(source, field, direction)
            }
        };
        Ok(mode)
    }

    fn run_sort(&mut self, source: SortSource, field: SortField, direction: SortDirection) -> Mode {
        let Some(screen) = self.session_screen() else {
            return Mode::Normal;
        };
        let outcome = match screen.session.sort(&source, field, direction) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report(err.into());
                return Mode::Normal;
            }
        };

        let from_file = matches!(source, SortSource::File(_));
        let title = match &source {
            SortSource::LiveTable => format!("Table by {} ({})", field.label(), direction.label()),
            SortSource::File(path) => format!(
                "{} by {} ({})",
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                field.label(),
                direction.label()
            ),
        };
        let count = outcome.records.len();
        let skipped = outcome.skipped.len();
        screen.show(RecordView::new(title, outcome.records.clone()).with_skipped(skipped));

        if count == 0 {
            self.set_status("Nothing to sort: no records found.", StatusKind::Error);
            return Mode::Normal;
        }
        self.set_status(
            format!("Sorted {}. Save them?", records_phrase(count)),
            StatusKind::Info,
        );
        offer_save(PendingSave::Sorted {
            field,
            records: outcome.records,
            from_file,
        })
    }

    fn save_pending(&mut self, pending: PendingSave, target: SaveTarget) -> Mode {
        let Some(screen) = self.session_screen() else {
            return Mode::Normal;
        };
        let result = match &pending {
            PendingSave::Search(criterion) => screen.session.save_search_results(criterion, &target),
            PendingSave::Sorted { field, records, .. } => {
                screen.session.save_sorted(*field, &target, records)
            }
        };
        match result {
            Ok(saved) => {
                screen.last_file = Some(saved.path.clone());
                self.set_status(
                    format!("Saved {} to {}.", records_phrase(saved.rows), saved.file_name),
                    StatusKind::Info,
                );
                Mode::Normal
            }
            Err(err) if err.is_validation() => {
                let message = err.to_string();
                let mut form = PromptForm::new(PromptPurpose::SaveName(pending));
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Mode::Prompt(form)
            }
            Err(err) => {
                self.report(err.into());
                Mode::Normal
            }
        }
    }

    fn handle_voter_form(&mut self, code: KeyCode, mut form: VoterForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.finish_entry(form.saved);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => self.save_voter(&mut form),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::EnteringVoters(form))
    }

    fn save_voter(&mut self, form: &mut VoterForm) {
        let Some(screen) = self.session_screen() else {
            return;
        };
        match screen.session.insert(&form.raw) {
            Ok(inserted) => {
                let mut text = format!("Stored {}: {}", inserted.record.id, inserted.record);
                if !inserted.sync.appended.is_empty() {
                    text.push_str(&format!("; updated {}", inserted.sync.appended.join(", ")));
                }
                let kind = if inserted.sync.failed.is_empty() {
                    StatusKind::Info
                } else {
                    let names: Vec<&str> = inserted
                        .sync
                        .failed
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect();
                    text.push_str(&format!("; could not update {}", names.join(", ")));
                    StatusKind::Error
                };
                form.reset();
                self.show_all("All voters");
                self.set_status(text, kind);
            }
            Err(err) => {
                let message = surface_error(&anyhow::Error::from(err));
                form.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    fn finish_entry(&mut self, saved: usize) {
        let Some(screen) = self.session_screen() else {
            return;
        };
        if screen.session.mode() == InsertMode::Create {
            screen.session.set_mode(InsertMode::Append);
        }
        self.show_all("All voters");
        self.set_status(
            format!("Voter entry finished: {} added.", records_phrase(saved)),
            StatusKind::Info,
        );
    }

    /// Open the file last displayed or written in the system viewer.
    pub(crate) fn handle_ctrl_o(&mut self) {
        let Screen::Session(screen) = &self.screen else {
            return;
        };
        let Some(path) = screen.last_file.clone() else {
            self.set_status("No file displayed or saved yet.", StatusKind::Error);
            return;
        };
        match open_path(&path) {
            Ok(()) => self.set_status(format!("Opened {}.", path.display()), StatusKind::Info),
            Err(err) => {
                warn!(file = %path.display(), error = %err, "failed to open file externally");
                self.set_status(format!("Failed to open file: {err}"), StatusKind::Error);
            }
        }
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::MainMenu { selected } => self.draw_main_menu(frame, content_area, *selected),
            Screen::Session(screen) => self.draw_session(frame, content_area, screen),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Prompt(form) => self.draw_prompt(frame, area, form),
            Mode::Choice(dialog) => self.draw_choice(frame, area, dialog),
            Mode::EnteringVoters(form) => self.draw_voter_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_main_menu(&self, frame: &mut Frame, area: Rect, selected: usize) {
        let popup_area = centered_rect(50, 50, area);
        let block = Block::default()
            .title("Voter Roll")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let workspace = Paragraph::new(Line::from(Span::styled(
            format!("Workspace: {}", self.config.workspace_dir.display()),
            Style::default().fg(Color::DarkGray),
        )))
        .wrap(Wrap { trim: true });
        frame.render_widget(workspace, chunks[0]);

        let items: Vec<ListItem> = MainMenuItem::ALL
            .iter()
            .enumerate()
            .map(|(index, item)| ListItem::new(format!("{}. {}", index + 1, item.label())))
            .collect();
        self.render_menu(frame, chunks[1], items, selected);
    }

    fn draw_session(&self, frame: &mut Frame, area: Rect, screen: &SessionScreen) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(MENU_WIDTH), Constraint::Min(0)])
            .split(area);

        let menu_block = Block::default()
            .title(screen.session.store_name())
            .borders(Borders::ALL);
        let menu_inner = menu_block.inner(chunks[0]);
        frame.render_widget(menu_block, chunks[0]);
        let items: Vec<ListItem> = SessionAction::ALL
            .iter()
            .enumerate()
            .map(|(index, action)| ListItem::new(format!("{}. {}", index + 1, action.label())))
            .collect();
        self.render_menu(frame, menu_inner, items, screen.selected);

        self.draw_records(frame, chunks[1], screen);
    }

    fn draw_records(&self, frame: &mut Frame, area: Rect, screen: &SessionScreen) {
        let view = &screen.view;
        let mut title = if view.title.is_empty() {
            "Voters".to_string()
        } else {
            view.title.clone()
        };
        title.push_str(&format!(" ({})", records_phrase(view.records.len())));
        if view.skipped > 0 {
            title.push_str(&format!(", {} skipped", view.skipped));
        }
        let block = Block::default().title(title).borders(Borders::ALL);

        if view.records.is_empty() {
            let message = Paragraph::new("No voters to show.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let rows: Vec<_> = view.records.iter().skip(view.scroll).map(record_row).collect();
        let table = Table::new(rows, TABLE_WIDTHS)
            .header(header_row(screen.session.script()))
            .column_spacing(1)
            .block(block);
        frame.render_widget(table, area);
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect, items: Vec<ListItem>, selected: usize) {
        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Prompt(_)) => &[("[Enter]", "Confirm"), ("[Esc]", "Cancel")],
            (_, Mode::Choice(_)) => &[
                ("[↑↓]", "Choose"),
                ("[1-9]", "Pick"),
                ("[Enter]", "Confirm"),
                ("[Esc]", "Cancel"),
            ],
            (_, Mode::EnteringVoters(_)) => &[
                ("[Tab/↑↓]", "Field"),
                ("[Enter]", "Store voter"),
                ("[Esc]", "Finish"),
            ],
            (Screen::Session(_), Mode::Normal) => &[
                ("[↑↓]", "Select"),
                ("[Enter/1-9]", "Run"),
                ("[PgUp/PgDn]", "Scroll"),
                ("[Ctrl+O]", "Open file"),
                ("[Esc]", "Close database"),
                ("[q]", "Quit"),
            ],
            (Screen::MainMenu { .. }, Mode::Normal) => &[
                ("[↑↓]", "Select"),
                ("[Enter/1-3]", "Choose"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (index, (key, label)) in hints.iter().enumerate() {
            spans.push(Span::styled(key.to_string(), key_style));
            let separator = if index + 1 == hints.len() { "" } else { "   " };
            spans.push(Span::raw(format!(" {label}{separator}")));
        }
        Line::from(spans)
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect, form: &PromptForm) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(),
            Line::from(Span::styled(
                format!("({})", form.hint()),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to confirm • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
        frame.set_cursor_position((inner.x + form.cursor_offset() as u16, inner.y));
    }

    fn draw_choice(&self, frame: &mut Frame, area: Rect, dialog: &ChoiceDialog) {
        let popup_area = centered_rect(50, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(dialog.title.clone())
            .borders(Borders::ALL);
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let items: Vec<ListItem> = dialog
            .options
            .iter()
            .enumerate()
            .map(|(index, option)| ListItem::new(format!("{}. {option}", index + 1)))
            .collect();
        self.render_menu(frame, inner, items, dialog.selected);
    }

    fn draw_voter_form(&self, frame: &mut Frame, area: Rect, form: &VoterForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let title = format!("New Voter ({} stored)", form.saved);
        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = VoterField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to store • Tab to switch • Esc when done",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (column, row) = form.cursor_offset();
        frame.set_cursor_position((inner.x + column as u16, inner.y + row as u16));
    }

    fn session_screen(&mut self) -> Option<&mut SessionScreen> {
        match &mut self.screen {
            Screen::Session(screen) => Some(screen),
            Screen::MainMenu { .. } => None,
        }
    }

    /// Replace the table pane with the whole `users` table.
    fn show_all(&mut self, title: &str) {
        let Some(screen) = self.session_screen() else {
            return;
        };
        match screen.session.list_all() {
            Ok(records) => screen.show(RecordView::new(title, records)),
            Err(err) => self.report(err.into()),
        }
    }

    fn report(&mut self, err: anyhow::Error) {
        warn!(error = %err, "operation failed");
        let message = surface_error(&err);
        self.set_status(message, StatusKind::Error);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}

fn digit_index(ch: char, len: usize) -> Option<usize> {
    let digit = ch.to_digit(10)? as usize;
    (1..=len).contains(&digit).then(|| digit - 1)
}

fn offer_save(pending: PendingSave) -> Mode {
    Mode::Choice(ChoiceDialog::new(
        ChoicePurpose::OfferSave(pending),
        "Save Results?",
        vec!["Yes".into(), "No".into()],
    ))
}

fn sort_field_dialog(source: SortSource) -> Mode {
    Mode::Choice(ChoiceDialog::new(
        ChoicePurpose::SortField(source),
        "Sort Field",
        SortField::ALL
            .iter()
            .map(|field| field.label().to_string())
            .collect(),
    ))
}

fn default_file_name(pending: &PendingSave) -> String {
    match pending {
        PendingSave::Search(criterion) => criterion
            .kind()
            .map(|kind| kind.default_file_name().to_string())
            .unwrap_or_default(),
        PendingSave::Sorted { field, .. } => field.cache_file_name(),
    }
}
