/// Database models
///
/// Each model owns its table: the struct mirrors the row, and the
/// associated functions are the only place SQL for that table lives.
///
/// - `user` - accounts, confirmation state, one-shot tokens
/// - `project` - projects and their collaborator roster
/// - `task` - work items inside a project
pub mod project;
pub mod task;
pub mod user;

// Re-export the row types; input and view types keep their module path
pub use project::Project;
pub use task::Task;
pub use user::User;
