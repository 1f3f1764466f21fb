pub mod access;
pub mod context;
pub mod issues_service;
pub mod organizations_service;
pub mod projects_service;
pub mod sprints_service;
pub mod users_service;

pub use context::SessionContext;
pub use issues_service::IssuesService;
pub use organizations_service::OrganizationsService;
pub use projects_service::ProjectsService;
pub use sprints_service::SprintsService;
pub use users_service::UsersService;
