// TUI widget modules, one per screen zone.

pub mod form;
pub mod header;
pub mod options;
pub mod progress;
pub mod result;
