pub mod agent;
pub mod conditions;
pub mod event;
pub mod governance;
