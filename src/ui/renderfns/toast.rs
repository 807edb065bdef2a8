use crate::notify::{Level, Toasts};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the newest notification, or a key hint when there is none
pub fn draw_toast(frame: &mut Frame, area: Rect, toasts: &Toasts) {
  let line = match toasts.current() {
    Some(toast) => {
      let (icon, color) = match toast.notification.level {
        Level::Success => ("✓", Color::Green),
        Level::Error => ("✗", Color::Red),
      };
      Line::from(vec![
        Span::styled(
          format!(" {} ", toast.at.format("%H:%M:%S")),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{} ", icon), Style::default().fg(color).bold()),
        Span::styled(toast.notification.message.clone(), Style::default().fg(color)),
        Span::styled(older_count(toasts), Style::default().fg(Color::DarkGray)),
      ])
    }
    None => Line::from(Span::styled(
      " j/k:nav  a:add  Enter:edit  r:refresh  R:reload  q:quit",
      Style::default().fg(Color::DarkGray),
    )),
  };

  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Suffix noting earlier toasts still on screen
fn older_count(toasts: &Toasts) -> String {
  match toasts.len() {
    0 | 1 => String::new(),
    n => format!("  (+{} more)", n - 1),
  }
}
