mod console;
mod report;

pub use console::ConsoleSink;
pub use report::format_report;
