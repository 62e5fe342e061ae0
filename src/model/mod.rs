//! Plain data records decoded from the data source, plus the cached [`Resource`] union.

pub mod analytics;
pub mod notification;
pub mod post;
pub mod resource;
pub mod user;

pub use analytics::*;
pub use notification::*;
pub use post::*;
pub use resource::*;
pub use user::*;
