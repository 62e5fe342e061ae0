use crate::framework::{FetchError, Loader, ResourceKey, Section};
use crate::model::{Resource, ResourceKind};
use crate::sections::{SectionKind, UserScope};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalyticsView {
    pub views: u64,
    pub likes: u64,
}

/// View and like counters. Only built when analytics are enabled.
#[derive(Clone)]
pub struct UserAnalytics(UserScope);

impl UserAnalytics {
    pub fn new(scope: UserScope) -> Self {
        Self(scope)
    }
}

impl Section for UserAnalytics {
    type Value = Resource;
    type Output = AnalyticsView;

    fn title(&self) -> &'static str {
        SectionKind::Analytics.title()
    }

    fn key(&self) -> ResourceKey {
        self.0.key(ResourceKind::Analytics)
    }

    fn loader(&self) -> Loader<Resource> {
        self.0.loader(ResourceKind::Analytics)
    }

    fn render(&self, value: &Resource) -> Result<AnalyticsView, FetchError> {
        let analytics = value.as_analytics()?;
        Ok(AnalyticsView {
            views: analytics.views,
            likes: analytics.likes,
        })
    }
}
