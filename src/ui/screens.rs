use std::path::PathBuf;

use crate::models::VoterRecord;
use crate::session::Session;

/// Entries of the start menu.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum MainMenuItem {
    CreateStore,
    OpenStore,
    Quit,
}

impl MainMenuItem {
    pub(crate) const ALL: [MainMenuItem; 3] = [
        MainMenuItem::CreateStore,
        MainMenuItem::OpenStore,
        MainMenuItem::Quit,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            MainMenuItem::CreateStore => "Create a new database",
            MainMenuItem::OpenStore => "Use an existing database",
            MainMenuItem::Quit => "Quit",
        }
    }
}

/// Operations offered while a store is open.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SessionAction {
    ListAll,
    SearchStreet,
    SearchYear,
    SearchCity,
    Sort,
    AddVoters,
    Delete,
    DisplayFile,
    Back,
}

impl SessionAction {
    pub(crate) const ALL: [SessionAction; 9] = [
        SessionAction::ListAll,
        SessionAction::SearchStreet,
        SessionAction::SearchYear,
        SessionAction::SearchCity,
        SessionAction::Sort,
        SessionAction::AddVoters,
        SessionAction::Delete,
        SessionAction::DisplayFile,
        SessionAction::Back,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SessionAction::ListAll => "Show all voters",
            SessionAction::SearchStreet => "Search by street",
            SessionAction::SearchYear => "Search by birth year",
            SessionAction::SearchCity => "Search by birth city",
            SessionAction::Sort => "Sort voters",
            SessionAction::AddVoters => "Add voters",
            SessionAction::Delete => "Delete a voter",
            SessionAction::DisplayFile => "Display a file",
            SessionAction::Back => "Back to main menu",
        }
    }
}

/// Records currently shown in the table pane.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordView {
    pub(crate) title: String,
    pub(crate) records: Vec<VoterRecord>,
    /// Lines skipped while parsing the file being shown.
    pub(crate) skipped: usize,
    pub(crate) scroll: usize,
}

impl RecordView {
    pub(crate) fn new(title: impl Into<String>, records: Vec<VoterRecord>) -> Self {
        Self {
            title: title.into(),
            records,
            skipped: 0,
            scroll: 0,
        }
    }

    pub(crate) fn with_skipped(mut self, skipped: usize) -> Self {
        self.skipped = skipped;
        self
    }

    pub(crate) fn scroll_by(&mut self, offset: isize) {
        let max = self.records.len().saturating_sub(1) as isize;
        self.scroll = (self.scroll as isize + offset).clamp(0, max.max(0)) as usize;
    }
}

/// State of the screen shown while a store is open.
pub(crate) struct SessionScreen {
    pub(crate) session: Session,
    pub(crate) selected: usize,
    pub(crate) view: RecordView,
    /// File most recently displayed or written, for opening externally.
    pub(crate) last_file: Option<PathBuf>,
}

impl SessionScreen {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            session,
            selected: 0,
            view: RecordView::default(),
            last_file: None,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let last = SessionAction::ALL.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    pub(crate) fn current_action(&self) -> SessionAction {
        SessionAction::ALL[self.selected.min(SessionAction::ALL.len() - 1)]
    }

    pub(crate) fn show(&mut self, view: RecordView) {
        self.view = view;
    }
}
