//! The dashboard's leaf sections.
//!
//! Each section reads exactly one resource of one user and renders exactly one
//! variant. Mode flags (`can_edit`, `show_analytics`) are resolved before any
//! section is built, so no section ever looks at them.

pub mod analytics;
pub mod notifications;
pub mod posts;
pub mod profile;

pub use analytics::{AnalyticsView, UserAnalytics};
pub use notifications::UserNotifications;
pub use posts::{PostPreview, UserPosts, EXCERPT_CHARS};
pub use profile::{EditableProfile, ProfileView, ReadOnlyProfile};

use crate::clients::{resource_loader, DataSource};
use crate::framework::{Loader, ResourceKey};
use crate::model::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Names a dashboard section, e.g. for [`retry`](crate::lifecycle::DashboardSystem::retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Profile,
    Posts,
    Analytics,
    Notifications,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Profile => "Profile",
            SectionKind::Posts => "Posts",
            SectionKind::Analytics => "Analytics",
            SectionKind::Notifications => "Notifications",
        }
    }

    pub fn resource(self) -> ResourceKind {
        match self {
            SectionKind::Profile => ResourceKind::User,
            SectionKind::Posts => ResourceKind::Posts,
            SectionKind::Analytics => ResourceKind::Analytics,
            SectionKind::Notifications => ResourceKind::Notifications,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// The data source and user every section of one dashboard is bound to.
#[derive(Clone)]
pub struct UserScope {
    source: Arc<dyn DataSource>,
    user_id: String,
}

impl UserScope {
    pub fn new(source: Arc<dyn DataSource>, user_id: impl Into<String>) -> Self {
        Self {
            source,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn key(&self, kind: ResourceKind) -> ResourceKey {
        kind.key(&self.user_id)
    }

    pub fn loader(&self, kind: ResourceKind) -> Loader<Resource> {
        resource_loader(self.source.clone(), kind, self.user_id.clone())
    }
}
