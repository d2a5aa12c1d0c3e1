//! Output formatting for deliberation results

mod console;

pub use console::ConsoleFormatter;
