use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::form::{Field, FormBuffer};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the dialog that the app turns into form intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
  FieldChanged(Field, String),
  Submit,
  Close,
}

/// Add/edit dialog: one text input per field, one focused at a time
#[derive(Debug, Clone, Default)]
pub struct EmployeeDialog {
  inputs: [TextInput; 5],
  focus: usize,
}

impl EmployeeDialog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Fill the inputs from a freshly opened form buffer
  pub fn load(&mut self, buffer: &FormBuffer) {
    for (input, field) in self.inputs.iter_mut().zip(Field::ALL) {
      input.set_value(buffer.get(field));
    }
    self.focus = 0;
  }

  pub fn focused(&self) -> Field {
    Field::ALL[self.focus]
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<DialogEvent> {
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus = (self.focus + 1) % Field::ALL.len();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = (self.focus + Field::ALL.len() - 1) % Field::ALL.len();
        return KeyResult::Handled;
      }
      _ => {}
    }

    let field = self.focused();
    let input = &mut self.inputs[self.focus];
    let before = input.value().to_string();
    match input.handle_key(key) {
      InputResult::Submitted(_) => KeyResult::Event(DialogEvent::Submit),
      InputResult::Cancelled => KeyResult::Event(DialogEvent::Close),
      InputResult::Consumed if input.value() != before => {
        KeyResult::Event(DialogEvent::FieldChanged(field, input.value().to_string()))
      }
      InputResult::Consumed => KeyResult::Handled,
      InputResult::NotHandled => KeyResult::NotHandled,
    }
  }

  /// Render the dialog centered over `area`
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, title: &str, submitting: bool) {
    let width = (area.width.saturating_sub(4)).clamp(20, 60);
    let height = (Field::ALL.len() as u16 + 4).min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", title))
      .title_alignment(Alignment::Center);
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let label_width = Field::ALL.iter().map(|f| f.label().len()).max().unwrap_or(0) + 3;
    let mut lines: Vec<Line> = Field::ALL
      .iter()
      .zip(&self.inputs)
      .enumerate()
      .map(|(i, (field, input))| {
        let marker = if field.is_required() { "*" } else { " " };
        let label = format!("{:<w$}", format!("{}{}:", field.label(), marker), w = label_width);
        let label_style = if i == self.focus {
          Style::default().fg(Color::Cyan).bold()
        } else {
          Style::default().fg(Color::DarkGray)
        };
        Line::from(vec![
          Span::styled(label, label_style),
          Span::raw(input.value().to_string()),
        ])
      })
      .collect();

    lines.push(Line::raw(""));
    let hint = if submitting {
      Line::from(Span::styled(
        "saving...",
        Style::default().fg(Color::Yellow),
      ))
    } else {
      Line::from(vec![
        Span::styled("<enter>", Style::default().fg(Color::Cyan)),
        Span::styled(" save  ", Style::default().fg(Color::DarkGray)),
        Span::styled("<tab>", Style::default().fg(Color::Cyan)),
        Span::styled(" next  ", Style::default().fg(Color::DarkGray)),
        Span::styled("<esc>", Style::default().fg(Color::Cyan)),
        Span::styled(" cancel", Style::default().fg(Color::DarkGray)),
      ])
    };
    lines.push(hint);

    frame.render_widget(Paragraph::new(lines), inner);

    // Cursor on the focused input
    let cursor_x = inner.x + label_width as u16 + self.inputs[self.focus].cursor_position() as u16;
    let cursor_y = inner.y + self.focus as u16;
    if cursor_x < inner.right() && cursor_y < inner.bottom() {
      frame.set_cursor_position((cursor_x, cursor_y));
    }
  }
}
