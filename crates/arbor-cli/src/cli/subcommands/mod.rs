mod logs;

pub use logs::LogsCommands;
