use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with app name, title, endpoint, and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, base_url: &str) {
  let header = Line::from(vec![
    Span::styled(" roster ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", title),
      Style::default().fg(Color::Yellow).bold(),
    ),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", strip_scheme(base_url)),
      Style::default().fg(Color::White),
    ),
    Span::raw("  "),
    // Shortcuts - keys highlighted, descriptions dimmed
    Span::styled("<a>", Style::default().fg(Color::Cyan)),
    Span::styled(" add", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<e>", Style::default().fg(Color::Cyan)),
    Span::styled(" edit", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<r>", Style::default().fg(Color::Cyan)),
    Span::styled(" refresh", Style::default().fg(Color::DarkGray)),
    Span::raw("   "),
    Span::styled("<q>", Style::default().fg(Color::Cyan)),
    Span::styled(" quit", Style::default().fg(Color::DarkGray)),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

fn strip_scheme(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_strip_scheme() {
    assert_eq!(
      strip_scheme("https://hr.example.com/api/employees"),
      "hr.example.com/api/employees"
    );
    assert_eq!(strip_scheme("http://localhost:5000/e"), "localhost:5000/e");
    assert_eq!(strip_scheme("localhost"), "localhost");
  }
}
