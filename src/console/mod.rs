pub mod dashboard;
pub mod messages;
pub mod shell;
pub mod table;
