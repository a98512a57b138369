use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::builder::RawVoter;
use crate::models::{Criterion, Script, SortField, VoterRecord};
use crate::sort::SortSource;
use crate::validate::{Constraint, ValidationError};

/// Results waiting for the operator to decide where (or whether) to save.
#[derive(Clone, Debug)]
pub(crate) enum PendingSave {
    Search(Criterion),
    Sorted {
        field: SortField,
        records: Vec<VoterRecord>,
        from_file: bool,
    },
}

/// What a single-line prompt is collecting.
#[derive(Clone, Debug)]
pub(crate) enum PromptPurpose {
    OpenStore { create: bool },
    SearchStreet,
    SearchYear,
    SearchCity,
    DeleteId,
    DisplayFile,
    SortFile,
    SaveName(PendingSave),
}

impl PromptPurpose {
    fn title(&self) -> &'static str {
        match self {
            PromptPurpose::OpenStore { create: true } => "Create Database",
            PromptPurpose::OpenStore { create: false } => "Open Database",
            PromptPurpose::SearchStreet => "Search by Street",
            PromptPurpose::SearchYear => "Search by Birth Year",
            PromptPurpose::SearchCity => "Search by Birth City",
            PromptPurpose::DeleteId => "Delete Voter",
            PromptPurpose::DisplayFile => "Display File",
            PromptPurpose::SortFile => "Sort File",
            PromptPurpose::SaveName(_) => "Save As",
        }
    }

    /// Label shown before the input; doubles as the field name in errors.
    fn label(&self) -> &'static str {
        match self {
            PromptPurpose::OpenStore { .. } => "Database name",
            PromptPurpose::SearchStreet => "Street",
            PromptPurpose::SearchYear => "Birth year",
            PromptPurpose::SearchCity => "Birth city",
            PromptPurpose::DeleteId => "Voter ID",
            PromptPurpose::DisplayFile | PromptPurpose::SortFile | PromptPurpose::SaveName(_) => {
                "File name"
            }
        }
    }

    fn constraint(&self) -> Constraint {
        match self {
            PromptPurpose::OpenStore { .. }
            | PromptPurpose::DisplayFile
            | PromptPurpose::SortFile
            | PromptPurpose::SaveName(_) => Constraint::Filename,
            PromptPurpose::SearchStreet => Constraint::NonEmpty,
            PromptPurpose::SearchYear => Constraint::SearchYear,
            PromptPurpose::SearchCity => Constraint::Letters,
            PromptPurpose::DeleteId => Constraint::PositiveId,
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            PromptPurpose::OpenStore { .. } => "without the .db extension",
            PromptPurpose::DisplayFile | PromptPurpose::SortFile | PromptPurpose::SaveName(_) => {
                "without the .txt extension"
            }
            PromptPurpose::SearchStreet => "any part of the street name",
            PromptPurpose::SearchYear => "four digits",
            PromptPurpose::SearchCity => "exact city name",
            PromptPurpose::DeleteId => "positive number",
        }
    }
}

/// Single-line input dialog.
#[derive(Clone, Debug)]
pub(crate) struct PromptForm {
    pub(crate) purpose: PromptPurpose,
    pub(crate) value: String,
    pub(crate) error: Option<String>,
}

impl PromptForm {
    pub(crate) fn new(purpose: PromptPurpose) -> Self {
        Self {
            purpose,
            value: String::new(),
            error: None,
        }
    }

    /// Start with a suggested value already typed in.
    pub(crate) fn with_value(purpose: PromptPurpose, value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Self::new(purpose)
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        self.purpose.title()
    }

    pub(crate) fn label(&self) -> &'static str {
        self.purpose.label()
    }

    pub(crate) fn hint(&self) -> &'static str {
        self.purpose.hint()
    }

    /// Append a character, rejecting anything a numeric prompt cannot hold.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let numeric = matches!(
            self.purpose.constraint(),
            Constraint::PositiveId | Constraint::SearchYear
        );
        if numeric && !ch.is_ascii_digit() {
            return false;
        }
        self.value.push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value.pop();
    }

    /// Trimmed value, checked against the prompt's rule.
    pub(crate) fn validated(&self, script: Script) -> Result<String, ValidationError> {
        let value = self.value.trim();
        self.purpose.constraint().check(self.label(), value, script)?;
        Ok(value.to_string())
    }

    pub(crate) fn build_line(&self) -> Line<'static> {
        Line::from(vec![
            Span::raw(format!("{}: ", self.label())),
            Span::styled(self.value.clone(), Style::default().fg(Color::Yellow)),
        ])
    }

    /// Cursor column relative to the dialog's inner area.
    pub(crate) fn cursor_offset(&self) -> usize {
        self.label().chars().count() + 2 + self.value.chars().count()
    }
}

/// What a pick-one dialog decides.
#[derive(Clone, Debug)]
pub(crate) enum ChoicePurpose {
    OfferSave(PendingSave),
    SaveTarget(PendingSave),
    SortSource,
    SortField(SortSource),
    SortDirection(SortSource, SortField),
}

/// Vertical list of options; Enter or the option's number picks one.
#[derive(Clone, Debug)]
pub(crate) struct ChoiceDialog {
    pub(crate) purpose: ChoicePurpose,
    pub(crate) title: String,
    pub(crate) options: Vec<String>,
    pub(crate) selected: usize,
}

impl ChoiceDialog {
    pub(crate) fn new(purpose: ChoicePurpose, title: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            purpose,
            title: title.into(),
            options,
            selected: 0,
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.options.is_empty() {
            return;
        }
        let last = self.options.len() as isize - 1;
        self.selected = (self.selected as isize + offset).clamp(0, last) as usize;
    }

    /// Index of the option bound to a `1`-based digit key.
    pub(crate) fn option_for_digit(&self, ch: char) -> Option<usize> {
        let digit = ch.to_digit(10)? as usize;
        (1..=self.options.len()).contains(&digit).then(|| digit - 1)
    }
}

/// Fields of the voter entry form, in entry order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum VoterField {
    #[default]
    Surname,
    GivenName,
    Patronymic,
    BirthYear,
    Address,
    BirthCity,
}

impl VoterField {
    pub(crate) const ALL: [VoterField; 6] = [
        VoterField::Surname,
        VoterField::GivenName,
        VoterField::Patronymic,
        VoterField::BirthYear,
        VoterField::Address,
        VoterField::BirthCity,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            VoterField::Surname => "Surname",
            VoterField::GivenName => "Given name",
            VoterField::Patronymic => "Patronymic",
            VoterField::BirthYear => "Birth year",
            VoterField::Address => "Address",
            VoterField::BirthCity => "Birth city",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            VoterField::BirthYear => "<1930-2007>",
            VoterField::Address => "<street house apartment>",
            _ => "<required>",
        }
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or_default()
    }
}

/// Six-field form used for both the initial fill and later additions.
#[derive(Clone, Debug, Default)]
pub(crate) struct VoterForm {
    pub(crate) raw: RawVoter,
    pub(crate) active: VoterField,
    pub(crate) error: Option<String>,
    /// Voters stored since the form opened.
    pub(crate) saved: usize,
}

impl VoterForm {
    fn value(&self, field: VoterField) -> &String {
        match field {
            VoterField::Surname => &self.raw.surname,
            VoterField::GivenName => &self.raw.given_name,
            VoterField::Patronymic => &self.raw.patronymic,
            VoterField::BirthYear => &self.raw.birth_year,
            VoterField::Address => &self.raw.address,
            VoterField::BirthCity => &self.raw.birth_city,
        }
    }

    fn value_mut(&mut self, field: VoterField) -> &mut String {
        match field {
            VoterField::Surname => &mut self.raw.surname,
            VoterField::GivenName => &mut self.raw.given_name,
            VoterField::Patronymic => &mut self.raw.patronymic,
            VoterField::BirthYear => &mut self.raw.birth_year,
            VoterField::Address => &mut self.raw.address,
            VoterField::BirthCity => &mut self.raw.birth_city,
        }
    }

    pub(crate) fn next_field(&mut self) {
        let next = (self.active.index() + 1) % VoterField::ALL.len();
        self.active = VoterField::ALL[next];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = VoterField::ALL.len();
        let previous = (self.active.index() + len - 1) % len;
        self.active = VoterField::ALL[previous];
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        if self.active == VoterField::BirthYear && !ch.is_ascii_digit() {
            return false;
        }
        let field = self.active;
        self.value_mut(field).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Clear the inputs for the next voter, keeping the running count.
    pub(crate) fn reset(&mut self) {
        self.raw = RawVoter::default();
        self.active = VoterField::Surname;
        self.error = None;
        self.saved += 1;
    }

    pub(crate) fn build_line(&self, field: VoterField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;
        let display = if value.is_empty() {
            field.placeholder().to_string()
        } else {
            value.clone()
        };
        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{:<12}", format!("{}:", field.label()))),
            Span::styled(display, style),
        ])
    }

    /// Cursor position for the active field: (column, row) inside the form.
    pub(crate) fn cursor_offset(&self) -> (usize, usize) {
        let column = 12 + self.value(self.active).chars().count();
        (column, self.active.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_prompts_accept_digits_only() {
        let mut form = PromptForm::new(PromptPurpose::DeleteId);
        assert!(form.push_char('4'));
        assert!(!form.push_char('x'));
        assert!(!form.push_char('-'));
        assert_eq!(form.value, "4");

        let mut street = PromptForm::new(PromptPurpose::SearchStreet);
        assert!(street.push_char('Л'));
        assert!(street.push_char(' '));
    }

    #[test]
    fn prompt_validation_uses_the_purpose_rule() {
        let form = PromptForm::with_value(PromptPurpose::SearchYear, "1899");
        assert!(matches!(
            form.validated(Script::Cyrillic),
            Err(ValidationError::YearOutOfRange { .. })
        ));

        let form = PromptForm::with_value(PromptPurpose::SaveName(PendingSave::Search(
            Criterion::ByBirthYear(1990),
        )), " report_1 ");
        assert_eq!(form.validated(Script::Cyrillic).unwrap(), "report_1");

        let form = PromptForm::with_value(PromptPurpose::DeleteId, "0");
        assert!(form.validated(Script::Cyrillic).is_err());
    }

    #[test]
    fn choice_digits_map_to_options() {
        let dialog = ChoiceDialog::new(
            ChoicePurpose::SortSource,
            "Sort",
            vec!["Table".into(), "File".into()],
        );
        assert_eq!(dialog.option_for_digit('1'), Some(0));
        assert_eq!(dialog.option_for_digit('2'), Some(1));
        assert_eq!(dialog.option_for_digit('3'), None);
        assert_eq!(dialog.option_for_digit('0'), None);
    }

    #[test]
    fn voter_form_cycles_fields_and_filters_year() {
        let mut form = VoterForm::default();
        form.previous_field();
        assert_eq!(form.active, VoterField::BirthCity);
        form.next_field();
        assert_eq!(form.active, VoterField::Surname);

        form.active = VoterField::BirthYear;
        assert!(form.push_char('1'));
        assert!(!form.push_char('a'));
        assert_eq!(form.raw.birth_year, "1");

        form.reset();
        assert_eq!(form.raw, RawVoter::default());
        assert_eq!(form.saved, 1);
    }
}
