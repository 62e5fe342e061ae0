use crate::framework::{FetchError, Loader, ResourceKey, Section};
use crate::model::{Resource, ResourceKind};
use crate::sections::{SectionKind, UserScope};

/// Notification messages, in the order served.
#[derive(Clone)]
pub struct UserNotifications(UserScope);

impl UserNotifications {
    pub fn new(scope: UserScope) -> Self {
        Self(scope)
    }
}

impl Section for UserNotifications {
    type Value = Resource;
    type Output = Vec<String>;

    fn title(&self) -> &'static str {
        SectionKind::Notifications.title()
    }

    fn key(&self) -> ResourceKey {
        self.0.key(ResourceKind::Notifications)
    }

    fn loader(&self) -> Loader<Resource> {
        self.0.loader(ResourceKind::Notifications)
    }

    fn render(&self, value: &Resource) -> Result<Vec<String>, FetchError> {
        Ok(value
            .as_notifications()?
            .iter()
            .map(|notification| notification.message.clone())
            .collect())
    }
}
