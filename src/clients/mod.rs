//! External collaborators of the dashboard.
//!
//! Each collaborator is a trait so the dashboard can run against the real API,
//! the in-memory backend in [`memory`], or the scripted mocks in [`mock`].

pub mod data_client;
pub mod error;
pub mod memory;
pub mod mock;
pub mod user_client;
pub mod validation_client;

pub use data_client::{resource_loader, DataSource};
pub use error::ServiceError;
pub use memory::{MemoryDataSource, MemoryUserService, RuleValidator};
pub use mock::{MockDataSource, MockUserService, MockValidator};
pub use user_client::UserService;
pub use validation_client::FieldValidator;
