pub mod issues;
pub mod projects;
pub mod sprints;
pub mod users;
