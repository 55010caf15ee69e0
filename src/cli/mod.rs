pub mod commands;
pub mod dashboard;
pub mod handlers;

pub use commands::Cli;
pub use dashboard::Dashboard;
pub use handlers::CommandHandler;
