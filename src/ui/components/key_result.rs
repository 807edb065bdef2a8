/// Outcome of offering a key press to a component.
///
/// Components own their key handling and report back to the app, which turns
/// events into form intents or list actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, nothing for the parent to do
  Handled,
  /// Key was consumed, here's an event for the parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}
