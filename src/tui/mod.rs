//! Headless terminal questionnaire wizard.
//!
//! Layout:
//! - Centered "survey window" frame titled with the survey name
//! - Left banner panel
//! - Main content panel with classic wizard pages (consent, one page per
//!   section, review, confirmation)
//! - Bottom button row: [ Back ] [ Next ] [ Cancel ]
//! - Confirm-cancel modal
//!
//! All survey logic lives in the library; this module only binds widgets to
//! the session API and writes every edit straight back into the response
//! store. Logging is file-only in TUI mode (stdout logging is disabled) to
//! avoid corrupting the terminal UI.

use crate::api::{export, SurveySession};
use crate::config::AppConfig;
use crate::questionnaire::{catalog, InputKind, QuestionPath};
use crate::render::{self, FormItem};
use crate::schema::Schema;
use crate::session::store::AnswerValue;
use crate::session::{Action, Step};
use crate::storage::ResponseTable;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::info;
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const WINDOW_WIDTH: u16 = 100;
const WINDOW_HEIGHT: u16 = 32;
const BANNER_WIDTH: u16 = 22;

/// Form rows visible at once in the content panel; scrolling keeps the
/// focused field inside this window.
const FORM_VIEW_ROWS: u16 = 20;

const BANNER: &str = r#"
 KSHEERSAGAR

 TNS
 Self-Assessment

 dairy partner
 field survey
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmCancel,
}

#[derive(Debug, Clone)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let v = value.into();
        Self {
            cursor: v.len(),
            value: v,
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                self.value.insert(self.cursor, c);
                self.cursor = (self.cursor + c.len_utf8()).min(self.value.len());
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 && !self.value.is_empty() {
                    let idx = prev_char_boundary(&self.value, self.cursor);
                    self.value.remove(idx);
                    self.cursor = idx;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.value.len() && !self.value.is_empty() {
                    self.value.remove(self.cursor);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = prev_char_boundary(&self.value, self.cursor);
                true
            }
            KeyCode::Right => {
                self.cursor = next_char_boundary(&self.value, self.cursor);
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.value.len();
                true
            }
            _ => false,
        }
    }
}

fn prev_char_boundary(s: &str, from: usize) -> usize {
    let mut idx = from.saturating_sub(1);
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn next_char_boundary(s: &str, from: usize) -> usize {
    let mut idx = (from + 1).min(s.len());
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[derive(Debug, Clone)]
enum FieldWidget {
    Text(TextInput),
    Date(TextInput),
    Single {
        options: Vec<String>,
        selected: usize,
    },
    Multi {
        options: Vec<String>,
        /// Chosen option indices in selection order.
        chosen: Vec<usize>,
        cursor: usize,
    },
}

#[derive(Debug, Clone)]
struct FormField {
    path: QuestionPath,
    label: String,
    remarks: bool,
    widget: FieldWidget,
}

#[derive(Debug, Clone)]
enum FormRow {
    Heading { depth: usize, label: String },
    Field(usize),
}

/// One wizard page's editable form: the consent block or a section subtree.
struct SectionForm {
    rows: Vec<FormRow>,
    fields: Vec<FormField>,
    scroll: u16,
}

impl SectionForm {
    /// First line of a row in the rendered form (headings take 2 lines,
    /// fields 3). Scrolling and drawing must agree on this arithmetic.
    fn row_line(&self, row_index: usize) -> u16 {
        let mut line = 0u16;
        for row in self.rows.iter().take(row_index) {
            line += match row {
                FormRow::Heading { .. } => 2,
                FormRow::Field(_) => 3,
            };
        }
        line
    }

    fn field_row(&self, field_index: usize) -> Option<usize> {
        self.rows.iter().position(
            |row| matches!(row, FormRow::Field(i) if *i == field_index),
        )
    }

    fn total_lines(&self) -> u16 {
        self.row_line(self.rows.len())
    }

    /// Keep the focused field fully visible inside the fixed view window.
    fn scroll_to_field(&mut self, field_index: usize) {
        let Some(row) = self.field_row(field_index) else {
            return;
        };
        let top = self.row_line(row);
        let bottom = top + 3;
        if top < self.scroll {
            self.scroll = top;
        } else if bottom > self.scroll + FORM_VIEW_ROWS {
            self.scroll = bottom - FORM_VIEW_ROWS;
        }
        self.scroll = self.scroll.min(self.total_lines().saturating_sub(1));
    }
}

struct WizardState {
    session: SurveySession,
    title: String,
    export_dir: PathBuf,
    form: Option<SectionForm>,
    review_scroll: u16,
    focus: FocusTarget,
    modal: Option<Modal>,
    status: Option<String>,
    quit: bool,
}

impl WizardState {
    fn new(session: SurveySession, title: String, export_dir: PathBuf) -> Self {
        let mut state = WizardState {
            session,
            title,
            export_dir,
            form: None,
            review_scroll: 0,
            focus: FocusTarget::Button(ButtonFocus::Next),
            modal: None,
            status: None,
            quit: false,
        };
        state.sync_page();
        state
    }

    /// Rebuild page-local widgets after a step change and surface any
    /// self-heal notice.
    fn sync_page(&mut self) {
        let step = self.session.step();
        if let Some(notice) = self.session.take_notice() {
            self.status = Some(notice);
        }
        self.form = match step {
            Step::Consent => Some(self.build_consent_form()),
            Step::Section(i) => Some(self.build_section_form(i)),
            Step::Review | Step::Confirmation => None,
        };
        self.review_scroll = 0;
        self.focus = match &self.form {
            Some(form) if !form.fields.is_empty() => FocusTarget::Field(0),
            _ => FocusTarget::Button(ButtonFocus::Next),
        };
        // Bind every widget's current value on entry (write-through pass).
        if let Some(form) = self.form.take() {
            for index in 0..form.fields.len() {
                commit_field(&mut self.session, &form.fields[index]);
            }
            self.form = Some(form);
        }
    }

    fn build_consent_form(&mut self) -> SectionForm {
        let yes_no = vec!["Yes".to_string(), "No".to_string()];
        let block: [(&str, bool); 6] = [
            ("Consent to fill the form", true),
            ("Signature of the respondent", false),
            ("Reviewed and confirmed by Route Incharge", true),
            ("Signature of Route In charge", false),
            ("Reviewed and confirmed by Ksheersagar SPOC", true),
            ("Signature of SPOC", false),
        ];

        let mut rows = Vec::new();
        let mut fields = Vec::new();
        for (label, is_radio) in block {
            let path = QuestionPath::root(label).expect("consent labels are valid");
            let stored = self.session.answer(&path);
            let widget = if is_radio {
                let current = render::default_answer(
                    &path,
                    InputKind::SingleChoice,
                    &yes_no,
                    stored,
                    today(),
                );
                let selected = match &current {
                    AnswerValue::One(v) => yes_no.iter().position(|o| o == v).unwrap_or(0),
                    _ => 0,
                };
                FieldWidget::Single {
                    options: yes_no.clone(),
                    selected,
                }
            } else {
                let current = render::default_answer(&path, InputKind::FreeText, &[], stored, today());
                FieldWidget::Text(TextInput::new(current.flatten()))
            };
            rows.push(FormRow::Field(fields.len()));
            fields.push(FormField {
                path,
                label: label.to_string(),
                remarks: false,
                widget,
            });
        }
        SectionForm {
            rows,
            fields,
            scroll: 0,
        }
    }

    fn build_section_form(&mut self, index: usize) -> SectionForm {
        let plan = render::section_plan(self.session.questionnaire(), index)
            .expect("section index comes from the step machine");

        let mut rows = Vec::new();
        let mut fields = Vec::new();
        for item in plan {
            match item {
                FormItem::Heading { depth, label } => {
                    rows.push(FormRow::Heading { depth, label });
                }
                FormItem::Question {
                    path,
                    label,
                    kind,
                    options,
                } => {
                    let current = render::default_answer(
                        &path,
                        kind,
                        &options,
                        self.session.answer(&path),
                        today(),
                    );
                    let widget = match (kind, &current) {
                        (InputKind::FreeText, value) => {
                            FieldWidget::Text(TextInput::new(value.flatten()))
                        }
                        (InputKind::Date, value) => {
                            FieldWidget::Date(TextInput::new(value.flatten()))
                        }
                        (InputKind::SingleChoice, AnswerValue::One(v)) => FieldWidget::Single {
                            selected: options.iter().position(|o| o == v).unwrap_or(0),
                            options,
                        },
                        (InputKind::MultiChoice, AnswerValue::Many(chosen)) => FieldWidget::Multi {
                            chosen: chosen
                                .iter()
                                .filter_map(|c| options.iter().position(|o| o == c))
                                .collect(),
                            options,
                            cursor: 0,
                        },
                        // default_answer always returns the kind's variant.
                        _ => FieldWidget::Text(TextInput::new(current.flatten())),
                    };
                    rows.push(FormRow::Field(fields.len()));
                    fields.push(FormField {
                        path,
                        label,
                        remarks: false,
                        widget,
                    });
                }
                FormItem::Remarks { path, label } => {
                    let current = render::default_remarks(self.session.answer(&path));
                    rows.push(FormRow::Field(fields.len()));
                    fields.push(FormField {
                        path,
                        label,
                        remarks: true,
                        widget: FieldWidget::Text(TextInput::new(current.flatten())),
                    });
                }
            }
        }
        SectionForm {
            rows,
            fields,
            scroll: 0,
        }
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Write one widget's current value into the response store.
fn commit_field(session: &mut SurveySession, field: &FormField) {
    let value = match &field.widget {
        FieldWidget::Text(input) => AnswerValue::Text(input.value.clone()),
        FieldWidget::Date(input) => {
            match crate::utils::validation::parse_iso_date(&input.value) {
                Some(date) => AnswerValue::Date(date),
                // Mid-edit garbage never overwrites the last valid date.
                None => return,
            }
        }
        FieldWidget::Single { options, selected } => {
            AnswerValue::One(options.get(*selected).cloned().unwrap_or_default())
        }
        FieldWidget::Multi { options, chosen, .. } => AnswerValue::Many(
            chosen
                .iter()
                .filter_map(|i| options.get(*i).cloned())
                .collect(),
        ),
    };
    session.set_answer(field.path.clone(), value);
}

fn page_title(state: &mut WizardState) -> String {
    let n = state.session.section_count();
    match state.session.step() {
        Step::Consent => "Step 0: Informed Consent & Authorization".to_string(),
        Step::Section(i) => {
            let label = state
                .session
                .questionnaire()
                .section(i)
                .map(|(l, _)| l.to_string())
                .unwrap_or_default();
            format!("Part {} of {}: {}", i, n, label)
        }
        Step::Review => "Final Review and Submission".to_string(),
        Step::Confirmation => "Submission Complete".to_string(),
    }
}

fn next_label(step: Step, section_count: usize) -> &'static str {
    match step {
        Step::Consent => "Start Survey",
        Step::Section(i) if i == section_count => "Review & Submit",
        Step::Section(_) => "Save and Next",
        Step::Review => "Submit Final",
        Step::Confirmation => "Start New Survey",
    }
}

fn can_go_next(state: &mut WizardState) -> bool {
    match state.session.step() {
        // Submit stays disabled until something non-empty was answered.
        Step::Review => !state.session.responses().is_all_empty(),
        _ => true,
    }
}

fn visible_buttons(step: Step) -> Vec<ButtonFocus> {
    let mut buttons = Vec::new();
    if step.can_go_back() {
        buttons.push(ButtonFocus::Back);
    }
    buttons.push(ButtonFocus::Next);
    buttons.push(ButtonFocus::Cancel);
    buttons
}

// --- Event handling ---

fn handle_key(state: &mut WizardState, code: KeyCode) {
    if state.modal.is_some() {
        handle_modal_key(state, code);
        return;
    }

    match code {
        KeyCode::Esc => {
            state.modal = Some(Modal::ConfirmCancel);
            return;
        }
        KeyCode::Tab | KeyCode::Down => {
            move_focus(state, 1);
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            move_focus(state, -1);
            return;
        }
        _ => {}
    }

    match state.focus {
        FocusTarget::Field(index) => handle_field_key(state, index, code),
        FocusTarget::Button(button) => handle_button_key(state, button, code),
    }
}

fn handle_modal_key(state: &mut WizardState, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            info!("[PHASE: tui] [STEP: cancel] Survey cancelled by respondent");
            state.quit = true;
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.modal = None;
        }
        _ => {}
    }
}

fn handle_field_key(state: &mut WizardState, index: usize, code: KeyCode) {
    if code == KeyCode::Enter {
        move_focus(state, 1);
        return;
    }

    let Some(form) = state.form.as_mut() else {
        return;
    };
    let Some(field) = form.fields.get_mut(index) else {
        return;
    };

    let changed = match &mut field.widget {
        FieldWidget::Text(input) | FieldWidget::Date(input) => input.handle_key(code),
        FieldWidget::Single { options, selected } => match code {
            KeyCode::Left => {
                *selected = selected.checked_sub(1).unwrap_or(options.len() - 1);
                true
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                *selected = (*selected + 1) % options.len();
                true
            }
            _ => false,
        },
        FieldWidget::Multi {
            options,
            chosen,
            cursor,
        } => match code {
            KeyCode::Left => {
                *cursor = cursor.checked_sub(1).unwrap_or(options.len() - 1);
                false
            }
            KeyCode::Right => {
                *cursor = (*cursor + 1) % options.len();
                false
            }
            KeyCode::Char(' ') => {
                let cur = *cursor;
                if let Some(at) = chosen.iter().position(|c| *c == cur) {
                    chosen.remove(at);
                } else {
                    chosen.push(cur);
                }
                true
            }
            _ => false,
        },
    };

    if changed {
        let field = form.fields[index].clone();
        commit_field(&mut state.session, &field);
        state.status = None;
    }
}

fn handle_button_key(state: &mut WizardState, button: ButtonFocus, code: KeyCode) {
    let step = state.session.step();
    match code {
        KeyCode::Left | KeyCode::Right => {
            let buttons = visible_buttons(step);
            let at = buttons.iter().position(|b| *b == button).unwrap_or(0);
            let next = if code == KeyCode::Left {
                at.checked_sub(1).unwrap_or(buttons.len() - 1)
            } else {
                (at + 1) % buttons.len()
            };
            state.focus = FocusTarget::Button(buttons[next]);
        }
        KeyCode::Enter | KeyCode::Char(' ') => activate_button(state, button),
        KeyCode::Char('e') | KeyCode::Char('E') => export_individual(state),
        KeyCode::Char('a') | KeyCode::Char('A') => export_bulk(state),
        _ => {}
    }
}

fn activate_button(state: &mut WizardState, button: ButtonFocus) {
    let step = state.session.step();
    let action = match button {
        ButtonFocus::Cancel => {
            state.modal = Some(Modal::ConfirmCancel);
            return;
        }
        ButtonFocus::Back => Action::Back,
        ButtonFocus::Next => match step {
            Step::Review => {
                if !can_go_next(state) {
                    state.status = Some(
                        "No complete responses were recorded. Go back and fill out the form."
                            .to_string(),
                    );
                    return;
                }
                Action::Submit
            }
            Step::Confirmation => Action::StartNewSurvey,
            _ => Action::Next,
        },
    };

    match state.session.advance(action) {
        Ok(_) => {
            state.status = None;
            state.sync_page();
        }
        Err(err) => {
            // Recoverable: stay on the page, show what to fix.
            state.status = Some(err.to_string());
        }
    }
}

fn export_individual(state: &mut WizardState) {
    if state.session.step() != Step::Confirmation {
        return;
    }
    let Some(record) = state.session.current_submission() else {
        return;
    };
    state.status = Some(match export::write_individual(record, &state.export_dir) {
        Ok(path) => format!("Saved your response to {}", path.display()),
        Err(err) => format!("Could not save your response: {}", err),
    });
}

fn export_bulk(state: &mut WizardState) {
    if state.session.step() != Step::Confirmation {
        return;
    }
    let dest = state.export_dir.join("all_responses_export.csv");
    state.status = Some(
        match export::write_bulk(state.session.table(), &dest) {
            Ok(Some(path)) => format!("Saved all responses to {}", path.display()),
            Ok(None) => "The responses file is not yet available.".to_string(),
            Err(err) => format!("Could not read the responses file: {}", err),
        },
    );
}

fn move_focus(state: &mut WizardState, delta: i32) {
    let step = state.session.step();

    // Review has no fields; vertical keys scroll the snapshot instead.
    if step == Step::Review {
        if delta > 0 {
            state.review_scroll = state.review_scroll.saturating_add(1);
        } else {
            state.review_scroll = state.review_scroll.saturating_sub(1);
        }
        return;
    }

    let field_count = state.form.as_ref().map(|f| f.fields.len()).unwrap_or(0);
    let buttons = visible_buttons(step);
    let total = field_count + buttons.len();
    if total == 0 {
        return;
    }

    let current = match state.focus {
        FocusTarget::Field(i) => i,
        FocusTarget::Button(b) => {
            field_count + buttons.iter().position(|x| *x == b).unwrap_or(0)
        }
    };
    let next = (current as i64 + delta as i64).rem_euclid(total as i64) as usize;

    state.focus = if next < field_count {
        FocusTarget::Field(next)
    } else {
        FocusTarget::Button(buttons[next - field_count])
    };

    if let (FocusTarget::Field(i), Some(form)) = (state.focus, state.form.as_mut()) {
        form.scroll_to_field(i);
    }
}

// --- Drawing ---

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn fit(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let count = text.chars().count();
    if count <= width {
        return text.to_string();
    }
    let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", truncated)
}

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &mut WizardState) {
    let window = centered_window(area, WINDOW_WIDTH, WINDOW_HEIGHT);

    let frame_block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", state.title));
    let inner = frame_block.inner(window);
    f.render_widget(frame_block, window);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(BANNER_WIDTH), Constraint::Min(10)])
        .split(inner);

    let banner = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::RIGHT));
    f.render_widget(banner, columns[0]);

    let content = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(columns[1]);

    let header = Paragraph::new(page_title(state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(header, content[0]);

    match state.session.step() {
        Step::Consent | Step::Section(_) => draw_form(f, content[1], state),
        Step::Review => draw_review(f, content[1], state),
        Step::Confirmation => draw_confirmation(f, content[1], state),
    }

    let status_style = Style::default().fg(Color::Red);
    if let Some(status) = &state.status {
        let line = Paragraph::new(fit(status, content[2].width as usize)).style(status_style);
        f.render_widget(line, content[2]);
    }

    draw_buttons(f, content[3], state);

    if state.modal == Some(Modal::ConfirmCancel) {
        draw_cancel_modal(f, window);
    }
}

fn draw_form(f: &mut ratatui::Frame<'_>, area: Rect, state: &mut WizardState) {
    let focused_field = match state.focus {
        FocusTarget::Field(i) => Some(i),
        _ => None,
    };
    let Some(form) = state.form.as_ref() else {
        return;
    };

    let width = area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for row in &form.rows {
        match row {
            FormRow::Heading { depth, label } => {
                let indent = "  ".repeat(depth.saturating_sub(1));
                lines.push(Line::from(Span::styled(
                    fit(&format!("{}{}", indent, label), width),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(""));
            }
            FormRow::Field(index) => {
                let field = &form.fields[*index];
                let focused = focused_field == Some(*index);
                lines.push(field_label_line(field, focused, width));
                lines.push(field_value_line(field, focused, width));
                lines.push(Line::from(""));
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .scroll((form.scroll, 0))
        .block(Block::default());
    f.render_widget(paragraph, area);
}

fn field_label_line(field: &FormField, focused: bool, width: usize) -> Line<'static> {
    let label = if field.remarks {
        format!("Remarks for {}", field.label)
    } else {
        field.label.clone()
    };
    let style = if focused {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(Span::styled(fit(&label, width), style))
}

fn field_value_line(field: &FormField, focused: bool, width: usize) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };
    let text = match &field.widget {
        FieldWidget::Text(input) => format!("  {}", input.value),
        FieldWidget::Date(input) => {
            let valid = crate::utils::validation::parse_iso_date(&input.value).is_some();
            let marker = if valid { "" } else { "  (expected YYYY-MM-DD)" };
            format!("  {}{}", input.value, marker)
        }
        FieldWidget::Single { options, selected } => {
            format!(
                "  ({}/{}) {}",
                selected + 1,
                options.len(),
                options.get(*selected).map(String::as_str).unwrap_or("")
            )
        }
        FieldWidget::Multi {
            options,
            chosen,
            cursor,
        } => {
            let mark = if chosen.contains(cursor) { "[x]" } else { "[ ]" };
            format!(
                "  {} selected | {} ({}/{}) {}",
                chosen.len(),
                mark,
                cursor + 1,
                options.len(),
                options.get(*cursor).map(String::as_str).unwrap_or("")
            )
        }
    };
    Line::from(Span::styled(fit(&text, width), style))
}

fn draw_review(f: &mut ratatui::Frame<'_>, area: Rect, state: &mut WizardState) {
    let rows = state.session.review_snapshot();
    let width = area.width.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::new();
    if rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "No complete responses were recorded. Please go back and fill out the form.",
            Style::default().fg(Color::Yellow),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("Review your {} responses (Up/Down to scroll):", rows.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        for row in &rows {
            lines.push(Line::from(fit(
                &format!("{}: {}", row.question, row.response),
                width,
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .scroll((state.review_scroll, 0))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_confirmation(f: &mut ratatui::Frame<'_>, area: Rect, state: &mut WizardState) {
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Thank you! Your responses have been submitted successfully.",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if let Some(record) = state.session.current_submission() {
        lines.push(Line::from(format!(
            "Submission id: {}",
            record.submission_id().unwrap_or("?")
        )));
        lines.push(Line::from(format!(
            "Captured at:   {}",
            record.submission_timestamp().unwrap_or("?")
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(format!(
        "Exports are written to {}",
        state.export_dir.display()
    )));
    lines.push(Line::from(""));
    lines.push(Line::from("  [E] Save your individual response (CSV)"));
    lines.push(Line::from("  [A] Save all responses (CSV)"));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &mut WizardState) {
    let step = state.session.step();
    let n = state.session.section_count();
    let focused = match state.focus {
        FocusTarget::Button(b) => Some(b),
        _ => None,
    };

    let mut spans: Vec<Span> = Vec::new();
    for button in visible_buttons(step) {
        let label = match button {
            ButtonFocus::Back => "Back".to_string(),
            ButtonFocus::Next => next_label(step, n).to_string(),
            ButtonFocus::Cancel => "Cancel".to_string(),
        };
        let enabled = button != ButtonFocus::Next || can_go_next(state);
        spans.push(button_text(&label, focused == Some(button), enabled));
        spans.push(Span::raw("  "));
    }

    let row = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    f.render_widget(row, area);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let text = format!("[ {} ]", label);
    let style = if !enabled {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Span::styled(text, style)
}

fn draw_cancel_modal(f: &mut ratatui::Frame<'_>, window: Rect) {
    let modal = centered_window(window, 50, 7);
    f.render_widget(Clear, modal);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Cancel Survey ");
    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from("Discard this survey and exit?"),
        Line::from(""),
        Line::from("   [Y] Yes, exit      [N] Keep going"),
    ])
    .alignment(Alignment::Center)
    .block(block);
    f.render_widget(body, modal);
}

// --- Entry points ---

fn build_session(config: &AppConfig) -> Result<SurveySession> {
    let questionnaire = Arc::new(catalog::builtin()?);
    let schema = Arc::new(Schema::derive(&questionnaire)?);
    let table = ResponseTable::new(config.table_path()?);
    Ok(SurveySession::new(questionnaire, schema, table))
}

pub fn run(config: &AppConfig) -> Result<()> {
    info!("[PHASE: tui] [STEP: start] Starting survey wizard");

    let session = build_session(config)?;
    let export_dir = config.export_dir()?;
    let mut state = WizardState::new(session, config.survey_title.clone(), export_dir);

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &mut state);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut WizardState,
) -> Result<()> {
    // One respondent, strictly synchronous: draw, wait for a key, repeat.
    let tick_rate = Duration::from_millis(100);

    while !state.quit {
        terminal.draw(|f| draw(f.size(), f, state))?;

        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) => handle_key(state, key.code),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}

/// Build a deterministic page state for smoke rendering. Only `smoke(...)`
/// may inject sample values; the real run starts empty.
fn new_smoke_wizard_state(target: &str) -> Result<WizardState> {
    let questionnaire = Arc::new(catalog::builtin()?);
    let schema = Arc::new(Schema::derive(&questionnaire)?);
    let smoke_dir = std::env::temp_dir().join("assessment-wizard-smoke");
    std::fs::create_dir_all(&smoke_dir)?;
    let table = ResponseTable::new(smoke_dir.join("responses.csv"));
    let mut session = SurveySession::new(questionnaire, schema, table);

    let consent = |session: &mut SurveySession| -> Result<()> {
        session.set_answer(
            QuestionPath::root("Consent to fill the form")?,
            AnswerValue::One("Yes".into()),
        );
        session.set_answer(
            QuestionPath::root("Signature of the respondent")?,
            AnswerValue::Text("Smoke Respondent".into()),
        );
        session.advance(Action::Next)?;
        Ok(())
    };

    match target {
        "section" => {
            consent(&mut session)?;
        }
        "review" => {
            consent(&mut session)?;
            let n = session.section_count();
            for _ in 0..n {
                session.advance(Action::Next)?;
            }
        }
        "confirmation" => {
            consent(&mut session)?;
            let n = session.section_count();
            for _ in 0..n {
                session.advance(Action::Next)?;
            }
            session.advance(Action::Submit)?;
        }
        _ => {
            // default: consent
        }
    }

    Ok(WizardState::new(
        session,
        crate::config::DEFAULT_TITLE.to_string(),
        smoke_dir,
    ))
}

/// Non-interactive smoke mode: render a single frame and exit.
/// Target pages: consent|section|review|confirmation
pub fn smoke(target: &str) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );

    let t = target.trim().to_ascii_lowercase();
    let mut state = new_smoke_wizard_state(t.as_str())?;

    // In-memory backend so this runs in CI/tooling without touching the real
    // terminal (no raw mode / alternate screen).
    let backend = TestBackend::new(100, 32);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, &mut state))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_targets_render() {
        for target in ["consent", "section", "review", "confirmation", ""] {
            smoke(target).unwrap_or_else(|e| panic!("smoke '{}' failed: {}", target, e));
        }
    }

    #[test]
    fn text_input_editing() {
        let mut input = TextInput::new("ab");
        input.handle_key(KeyCode::Char('c'));
        assert_eq!(input.value, "abc");
        input.handle_key(KeyCode::Left);
        input.handle_key(KeyCode::Backspace);
        assert_eq!(input.value, "ac");
        input.handle_key(KeyCode::Home);
        input.handle_key(KeyCode::Delete);
        assert_eq!(input.value, "c");
        input.handle_key(KeyCode::End);
        input.handle_key(KeyCode::Char('z'));
        assert_eq!(input.value, "cz");
    }

    #[test]
    fn next_labels_follow_the_step() {
        assert_eq!(next_label(Step::Consent, 6), "Start Survey");
        assert_eq!(next_label(Step::Section(2), 6), "Save and Next");
        assert_eq!(next_label(Step::Section(6), 6), "Review & Submit");
        assert_eq!(next_label(Step::Review, 6), "Submit Final");
        assert_eq!(next_label(Step::Confirmation, 6), "Start New Survey");
    }

    #[test]
    fn smoke_state_edits_write_through_to_the_store() {
        let mut state = new_smoke_wizard_state("consent").unwrap();
        // First field is the consent radio; flip it to "No".
        state.focus = FocusTarget::Field(0);
        handle_key(&mut state, KeyCode::Right);
        assert_eq!(
            state
                .session
                .answer(&QuestionPath::root("Consent to fill the form").unwrap()),
            Some(&AnswerValue::One("No".into()))
        );
        handle_key(&mut state, KeyCode::Right);
        assert_eq!(
            state
                .session
                .answer(&QuestionPath::root("Consent to fill the form").unwrap()),
            Some(&AnswerValue::One("Yes".into()))
        );
    }

    #[test]
    fn refusing_consent_blocks_the_start_button() {
        let mut state = new_smoke_wizard_state("consent").unwrap();
        state.focus = FocusTarget::Field(0);
        handle_key(&mut state, KeyCode::Right); // Yes -> No
        state.focus = FocusTarget::Button(ButtonFocus::Next);
        handle_key(&mut state, KeyCode::Enter);

        assert_eq!(state.session.step(), Step::Consent);
        assert!(state.status.as_deref().unwrap_or("").contains("Consent"));
    }

    #[test]
    fn form_scrolling_follows_focus() {
        let mut state = new_smoke_wizard_state("section").unwrap();
        assert_eq!(state.session.step(), Step::Section(1));
        let field_count = state.form.as_ref().unwrap().fields.len();
        assert!(field_count > 10);

        for _ in 0..field_count - 1 {
            handle_key(&mut state, KeyCode::Down);
        }
        let form = state.form.as_ref().unwrap();
        assert!(form.scroll > 0);
        assert!(form.scroll <= form.total_lines());
    }
}
