mod event_log;
mod stack_view;
mod status_bar;

pub use event_log::EventLogWidget;
pub use stack_view::StackViewWidget;
pub use status_bar::StatusBarWidget;
