use crate::api::Employee;
use crate::query::QueryState;
use crate::ui::components::KeyResult;
use crate::ui::renderfns::truncate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

/// Events emitted by the list that the app handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
  Add,
  Edit(Employee),
  /// Invalidate the list query
  Refresh,
  /// Re-fetch now, superseding an in-flight fetch
  Reload,
  Quit,
}

/// Table of employees backed by the list query
#[derive(Debug, Default)]
pub struct EmployeeListView {
  table_state: TableState,
}

impl EmployeeListView {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn handle_key(&mut self, key: KeyEvent, employees: &[Employee]) -> KeyResult<ListEvent> {
    match key.code {
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        KeyResult::Event(ListEvent::Quit)
      }
      KeyCode::Char('q') => KeyResult::Event(ListEvent::Quit),
      KeyCode::Char('j') | KeyCode::Down => {
        self.table_state.select_next();
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.table_state.select_previous();
        KeyResult::Handled
      }
      KeyCode::Char('a') => KeyResult::Event(ListEvent::Add),
      KeyCode::Char('e') | KeyCode::Enter => {
        ensure_valid_selection(&mut self.table_state, employees.len());
        match self.table_state.selected().and_then(|i| employees.get(i)) {
          Some(employee) => KeyResult::Event(ListEvent::Edit(employee.clone())),
          None => KeyResult::Handled,
        }
      }
      KeyCode::Char('r') => KeyResult::Event(ListEvent::Refresh),
      KeyCode::Char('R') => KeyResult::Event(ListEvent::Reload),
      _ => KeyResult::NotHandled,
    }
  }

  /// Render from the list query. `data` is the last successful list, which
  /// stays visible while a re-fetch is loading.
  pub fn render(
    &mut self,
    frame: &mut Frame,
    area: Rect,
    state: Option<&QueryState<Vec<Employee>>>,
    data: Option<&[Employee]>,
  ) {
    let loading = state.map_or(true, |s| s.is_loading() || matches!(s, QueryState::Idle));

    let title = match (state, data) {
      (Some(s), _) if s.is_error() => " Employees (error) ".to_string(),
      (_, Some(rows)) if loading => format!(" Employees ({}) (refreshing...) ", rows.len()),
      (_, Some(rows)) => format!(" Employees ({}) ", rows.len()),
      _ => " Employees (loading...) ".to_string(),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    // A failed fetch replaces the list with its message
    if let Some(message) = state.and_then(|s| s.error()) {
      let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
          message.to_string(),
          Style::default().fg(Color::Red),
        )),
        Line::raw(""),
        Line::from(Span::styled(
          "Press 'r' to retry.",
          Style::default().fg(Color::DarkGray),
        )),
      ])
      .block(block);
      frame.render_widget(paragraph, area);
      return;
    }

    let rows = match data {
      Some(rows) => rows,
      None => {
        let paragraph = Paragraph::new("Loading")
          .block(block)
          .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
      }
    };

    if rows.is_empty() {
      let paragraph = Paragraph::new("No employees yet. Press 'a' to add one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    ensure_valid_selection(&mut self.table_state, rows.len());

    let header = Row::new(["ID", "Name", "Email", "Age", "Salary", "Role"])
      .style(Style::default().fg(Color::Yellow).bold());

    let table_rows: Vec<Row> = rows.iter().map(employee_row).collect();

    let widths = [
      Constraint::Length(8),
      Constraint::Percentage(25),
      Constraint::Percentage(30),
      Constraint::Length(5),
      Constraint::Length(10),
      Constraint::Min(8),
    ];

    let table = Table::new(table_rows, widths)
      .header(header)
      .block(block)
      .row_highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.table_state);
  }
}

fn employee_row(employee: &Employee) -> Row<'static> {
  let id = employee
    .id
    .as_ref()
    .map(|id| id.to_string())
    .unwrap_or_default();

  Row::new(vec![
    Cell::from(truncate(&id, 8)).style(Style::default().fg(Color::Cyan)),
    Cell::from(employee.name.clone()),
    Cell::from(employee.email.clone()),
    Cell::from(employee.age.to_string()),
    Cell::from(employee.salary.to_string()),
    Cell::from(employee.role.clone().unwrap_or_else(|| "-".to_string()))
      .style(Style::default().fg(Color::DarkGray)),
  ])
}

/// Keep the selection on a row that exists
fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
  } else {
    match state.selected() {
      Some(i) if i < len => {}
      Some(_) => state.select(Some(len - 1)),
      None => state.select(Some(0)),
    }
  }
}
