// Sub-modules organized by functional domain
pub mod api;
pub mod issue;
pub mod project;
pub mod sprint;
pub mod user;

pub use api::*;
pub use issue::*;
pub use project::*;
pub use sprint::*;
pub use user::*;
