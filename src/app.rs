use crate::api::{Employee, EmployeeClient, EmployeeStore};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::form::{FormIntent, FormSession};
use crate::notify::Toasts;
use crate::query::{Query, QueryClient, EMPLOYEE_DETAILS};
use crate::ui;
use crate::ui::components::{DialogEvent, EmployeeDialog, KeyResult};
use crate::ui::views::{EmployeeListView, ListEvent};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const TICK_RATE: Duration = Duration::from_millis(100);
const TOAST_TTL: Duration = Duration::from_secs(4);

/// Main application state
pub struct App {
  /// Header title
  title: String,

  /// Collection endpoint, for the header
  base_url: String,

  /// Remote store shared by the list query and the form session
  store: Arc<dyn EmployeeStore>,

  /// Query cache; the list reads from it and the form session invalidates it
  queries: QueryClient,

  /// Add/edit dialog session
  form: FormSession,

  dialog: EmployeeDialog,

  list: EmployeeListView,

  toasts: Toasts,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let client = EmployeeClient::new(&config.api)?;
    Ok(Self::with_store(
      config.display_title(),
      config.api.base_url.clone(),
      Arc::new(client),
    ))
  }

  pub fn with_store(title: String, base_url: String, store: Arc<dyn EmployeeStore>) -> Self {
    Self {
      title,
      base_url,
      form: FormSession::new(Arc::clone(&store)),
      store,
      queries: QueryClient::new(),
      dialog: EmployeeDialog::new(),
      list: EmployeeListView::new(),
      toasts: Toasts::new(TOAST_TTL),
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    self.queries.dispose();

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    self.mount_queries();

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  /// First mount of the list query
  fn mount_queries(&mut self) {
    let store = Arc::clone(&self.store);
    self.queries.mount(EMPLOYEE_DETAILS, move || {
      let store = Arc::clone(&store);
      async move { store.list().await.map_err(|e| e.to_string()) }
    });
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Resize => {} // Redraw happens on the next loop iteration
      Event::Tick => {
        self.tick();
      }
    }
  }

  /// Apply finished fetches and writes, expire toasts
  fn tick(&mut self) -> bool {
    let mut changed = self.queries.poll();
    changed |= self.form.tick(&mut self.queries, &mut self.toasts);
    changed |= self.toasts.tick();
    changed
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.form.is_open() {
      match self.dialog.handle_key(key) {
        KeyResult::Event(DialogEvent::FieldChanged(field, value)) => {
          self.apply(FormIntent::FieldChanged(field, value))
        }
        KeyResult::Event(DialogEvent::Submit) => self.apply(FormIntent::SubmitClicked),
        KeyResult::Event(DialogEvent::Close) => self.apply(FormIntent::Close),
        KeyResult::Handled | KeyResult::NotHandled => {}
      }
      return;
    }

    let employees = self.employees().to_vec();
    match self.list.handle_key(key, &employees) {
      KeyResult::Event(ListEvent::Add) => self.apply(FormIntent::AddClicked),
      KeyResult::Event(ListEvent::Edit(employee)) => self.apply(FormIntent::EditClicked(employee)),
      KeyResult::Event(ListEvent::Refresh) => {
        self.queries.invalidate(&EMPLOYEE_DETAILS);
      }
      KeyResult::Event(ListEvent::Reload) => {
        if let Some(query) = self.list_query_mut() {
          debug!(fetches = query.fetch_count(), "hard reload of employee list");
          query.refetch();
        }
      }
      KeyResult::Event(ListEvent::Quit) => self.should_quit = true,
      KeyResult::Handled | KeyResult::NotHandled => {}
    }
  }

  /// Feed an intent to the form session; reload the dialog inputs when it opens
  fn apply(&mut self, intent: FormIntent) {
    let opens = matches!(intent, FormIntent::AddClicked | FormIntent::EditClicked(_));
    self.form.handle(intent, &mut self.toasts);
    if opens {
      self.dialog.load(self.form.buffer());
    }
  }

  fn list_query(&self) -> Option<&Query<Vec<Employee>>> {
    self.queries.query::<Vec<Employee>>(&EMPLOYEE_DETAILS)
  }

  fn list_query_mut(&mut self) -> Option<&mut Query<Vec<Employee>>> {
    self.queries.query_mut::<Vec<Employee>>(&EMPLOYEE_DETAILS)
  }

  /// Rows currently shown, including the previous list while refreshing
  pub fn employees(&self) -> &[Employee] {
    self
      .list_query()
      .and_then(|q| q.data())
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let state = self.queries.state::<Vec<Employee>>(&EMPLOYEE_DETAILS);
    let data = self
      .queries
      .data::<Vec<Employee>>(&EMPLOYEE_DETAILS)
      .map(|v| v.as_slice());
    self.list.render(frame, area, state, data);
  }

  // Accessors for UI rendering
  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn form(&self) -> &FormSession {
    &self.form
  }

  pub fn dialog(&self) -> &EmployeeDialog {
    &self.dialog
  }

  pub fn toasts(&self) -> &Toasts {
    &self.toasts
  }
}
