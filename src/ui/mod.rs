pub mod components;
pub mod renderfns;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Employee table
      Constraint::Length(1), // Toast line
    ])
    .split(frame.area());

  renderfns::draw_header(frame, chunks[0], app.title(), app.base_url());
  app.render_list(frame, chunks[1]);
  renderfns::draw_toast(frame, chunks[2], app.toasts());

  if app.form().is_open() {
    let title = match app.form().state() {
      crate::form::FormState::OpenEdit(_) => "Update Employee",
      _ => "Add Employee",
    };
    app
      .dialog()
      .render_overlay(frame, chunks[1], title, app.form().is_submitting());
  }
}
