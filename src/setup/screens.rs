use crate::setup::fields::{
    FieldKey, FieldValue, BAN_DURATION_OPTIONS, MAX_FAILED_REQUEST_OPTIONS,
};
use crate::setup::navigation::{clamp_selection, NavState};
use crate::setup::state::SetupState;
use crate::setup::steps::{ALL_STEPS, STEP_COUNT};
use crate::submit::RequestState;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, Padding, Paragraph, Row, Table,
};
use ratatui::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepMenuItem {
    pub title: String,
    pub current: bool,
    pub visited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupFieldRow {
    pub field: String,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogViewModel {
    pub title: String,
    pub body: String,
    pub actions: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupViewModel {
    pub step_line: String,
    pub menu: Vec<StepMenuItem>,
    pub rows: Vec<SetupFieldRow>,
    pub selected: usize,
    pub editing: Option<String>,
    pub status_text: String,
    pub hint_text: String,
    pub dialog: Option<DialogViewModel>,
}

pub fn project_setup_view_model(state: &SetupState, nav: &NavState) -> SetupViewModel {
    let step = state.current_step();
    let fields = state.visible_fields(step);
    let rows: Vec<SetupFieldRow> = fields
        .iter()
        .map(|key| {
            let entry = state.fields(step).get(*key);
            SetupFieldRow {
                field: key.label().to_string(),
                value: entry
                    .map(|entry| display_field_value(*key, &entry.value))
                    .unwrap_or_default(),
                error: entry
                    .and_then(|entry| entry.visible_error())
                    .map(str::to_string),
            }
        })
        .collect();
    SetupViewModel {
        step_line: format!(
            "Step {} of {}: {}",
            step.index() + 1,
            STEP_COUNT,
            step.title()
        ),
        menu: ALL_STEPS
            .iter()
            .map(|candidate| StepMenuItem {
                title: candidate.title().to_string(),
                current: *candidate == step,
                visited: state.steps.visited(*candidate),
            })
            .collect(),
        selected: clamp_selection(nav.selected, rows.len()),
        rows,
        editing: nav.editing.clone(),
        status_text: nav.status_text.clone(),
        hint_text: nav.hint_text.clone(),
        dialog: project_dialog(state.request.state()),
    }
}

pub fn project_dialog(request: &RequestState) -> Option<DialogViewModel> {
    match request {
        RequestState::Begin => None,
        RequestState::Request => Some(DialogViewModel {
            title: "Submitting".to_string(),
            body: "Writing the node configuration...".to_string(),
            actions: String::new(),
        }),
        RequestState::Success => Some(DialogViewModel {
            title: "Success".to_string(),
            body: "The node configuration was written.".to_string(),
            actions: "Enter continue".to_string(),
        }),
        RequestState::Error(message) => Some(DialogViewModel {
            title: format!("Error: {message}"),
            body: "The configuration was not written.".to_string(),
            actions: "Enter retry | Esc close".to_string(),
        }),
    }
}

pub fn display_field_value(key: FieldKey, value: &FieldValue) -> String {
    match (key, value) {
        (FieldKey::IsValidator, FieldValue::Flag(true)) => "Validator".to_string(),
        (FieldKey::IsValidator, FieldValue::Flag(false)) => "Full Node".to_string(),
        (FieldKey::AdminDisabled, FieldValue::Flag(true)) => "Disabled".to_string(),
        (FieldKey::AdminDisabled, FieldValue::Flag(false)) => "Enabled".to_string(),
        (FieldKey::Seed, FieldValue::Text(seed)) => mask_secret(seed),
        (FieldKey::MaxFailedRequests, FieldValue::Choice(index)) => MAX_FAILED_REQUEST_OPTIONS
            .get(*index)
            .map(|count| count.to_string())
            .unwrap_or_default(),
        (FieldKey::BanDuration, FieldValue::Choice(index)) => BAN_DURATION_OPTIONS
            .get(*index)
            .map(|option| option.label.to_string())
            .unwrap_or_default(),
        (_, other) => other.display(),
    }
}

/// Keeps the `S` prefix visible so the user can tell a seed was entered.
pub fn mask_secret(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => format!("{first}{}", "*".repeat(chars.count())),
        None => String::new(),
    }
}

pub fn tail_for_display(value: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max_chars {
        return value.to_string();
    }
    chars[chars.len() - max_chars..].iter().collect()
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
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

fn highlight() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

pub(crate) fn draw_setup_ui(frame: &mut Frame<'_>, view_model: &SetupViewModel) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Talos Node Setup",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(view_model.step_line.clone()),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(30)])
        .split(chunks[1]);

    let menu_items: Vec<ListItem> = view_model
        .menu
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let label = format!("{}. {}", idx + 1, item.title);
            let style = if item.current {
                highlight()
            } else if item.visited {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect();
    frame.render_widget(
        List::new(menu_items).block(Block::default().borders(Borders::ALL).title("Steps")),
        body[0],
    );

    let mut table_rows = Vec::with_capacity(view_model.rows.len());
    for (idx, row) in view_model.rows.iter().enumerate() {
        let selected = idx == view_model.selected;
        let value = match (&view_model.editing, selected) {
            (Some(buffer), true) => format!("> {}", tail_for_display(buffer, 60)),
            _ => row.value.clone(),
        };
        let style = if selected { highlight() } else { Style::default() };
        table_rows.push(
            Row::new(vec![Cell::from(row.field.clone()), Cell::from(value)]).style(style),
        );
        if let Some(error) = &row.error {
            table_rows.push(Row::new(vec![
                Cell::from(String::new()),
                Cell::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
            ]));
        }
    }
    let table = Table::new(
        table_rows,
        [Constraint::Percentage(35), Constraint::Percentage(65)],
    )
    .column_spacing(2)
    .block(main_panel_block());
    frame.render_widget(table, body[1]);

    let footer = Paragraph::new(vec![
        Line::from(view_model.hint_text.clone()),
        Line::from(format!("Status: {}", view_model.status_text)),
    ])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, chunks[2]);

    if let Some(dialog) = &view_model.dialog {
        draw_dialog(frame, dialog);
    }
}

fn draw_dialog(frame: &mut Frame<'_>, dialog: &DialogViewModel) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);
    let mut lines = vec![
        Line::from(Span::styled(
            dialog.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(String::new()),
        Line::from(dialog.body.clone()),
    ];
    if !dialog.actions.is_empty() {
        lines.push(Line::from(String::new()));
        lines.push(Line::from(dialog.actions.clone()));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::new(2, 2, 1, 1));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn main_panel_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .padding(Padding::new(3, 3, 1, 1))
}
