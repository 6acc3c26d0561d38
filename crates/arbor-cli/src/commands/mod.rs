pub mod delete;
pub mod dispatch;
pub mod import;
pub mod logs;
pub mod nodes;
pub mod schema;
pub mod search;
pub mod topics;
pub mod walk;
