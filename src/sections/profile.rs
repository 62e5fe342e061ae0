//! The two profile variants. The dashboard picks one of them once.

use crate::framework::{FetchError, Loader, ResourceKey, Section};
use crate::model::{Resource, ResourceKind};
use crate::sections::{SectionKind, UserScope};
use serde::Serialize;

/// Rendered profile content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProfileView {
    /// A greeting only.
    ReadOnly { name: String },
    /// The profile with an edit entry point.
    Editable { name: String, bio: String },
}

impl ProfileView {
    pub fn name(&self) -> &str {
        match self {
            ProfileView::ReadOnly { name } | ProfileView::Editable { name, .. } => name,
        }
    }
}

/// Profile for viewers without edit rights.
#[derive(Clone)]
pub struct ReadOnlyProfile(UserScope);

impl ReadOnlyProfile {
    pub fn new(scope: UserScope) -> Self {
        Self(scope)
    }
}

impl Section for ReadOnlyProfile {
    type Value = Resource;
    type Output = ProfileView;

    fn title(&self) -> &'static str {
        SectionKind::Profile.title()
    }

    fn key(&self) -> ResourceKey {
        self.0.key(ResourceKind::User)
    }

    fn loader(&self) -> Loader<Resource> {
        self.0.loader(ResourceKind::User)
    }

    fn render(&self, value: &Resource) -> Result<ProfileView, FetchError> {
        let user = value.as_user()?;
        Ok(ProfileView::ReadOnly {
            name: user.name.clone(),
        })
    }
}

/// Profile for viewers who may edit it.
///
/// The edit form itself is obtained from
/// [`DashboardSystem::open_editor`](crate::lifecycle::DashboardSystem::open_editor).
#[derive(Clone)]
pub struct EditableProfile(UserScope);

impl EditableProfile {
    pub fn new(scope: UserScope) -> Self {
        Self(scope)
    }
}

impl Section for EditableProfile {
    type Value = Resource;
    type Output = ProfileView;

    fn title(&self) -> &'static str {
        SectionKind::Profile.title()
    }

    fn key(&self) -> ResourceKey {
        self.0.key(ResourceKind::User)
    }

    fn loader(&self) -> Loader<Resource> {
        self.0.loader(ResourceKind::User)
    }

    fn render(&self, value: &Resource) -> Result<ProfileView, FetchError> {
        let user = value.as_user()?;
        Ok(ProfileView::Editable {
            name: user.name.clone(),
            bio: user.bio.clone(),
        })
    }
}
