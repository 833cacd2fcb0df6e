// State management module.
// Holds list selection, loading status, and the console log for the tabs.

pub mod console;
pub mod list;

pub use console::{ConsoleLevel, ConsoleMessage, ConsoleState};
pub use list::{LoadingState, SelectableList};
