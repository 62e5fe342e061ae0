use crate::clients::{
    DataSource, FieldValidator, MemoryDataSource, MemoryUserService, RuleValidator, UserService,
};
use crate::framework::{
    CacheActor, CacheClient, FetchError, FrameworkError, Section, SectionBoundary, SectionView,
};
use crate::lifecycle::DashboardConfig;
use crate::model::Resource;
use crate::profile_form::ProfileEditForm;
use crate::sections::{
    AnalyticsView, EditableProfile, PostPreview, ProfileView, ReadOnlyProfile, SectionKind,
    UserAnalytics, UserNotifications, UserPosts, UserScope,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, instrument};

/// Errors surfaced by [`DashboardSystem`] operations.
///
/// Section failures are never reported here; they stay inside their
/// [`SectionView`].
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Profile is read-only for this dashboard")]
    ReadOnly,

    #[error("{0} section is not shown on this dashboard")]
    Hidden(SectionKind),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Framework(#[from] FrameworkError),

    #[error("Cache task failed: {0}")]
    Shutdown(String),
}

/// The external collaborators a dashboard talks to.
#[derive(Clone)]
pub struct Services {
    pub source: Arc<dyn DataSource>,
    pub validator: Arc<dyn FieldValidator>,
    pub users: Arc<dyn UserService>,
}

impl Services {
    pub fn new(
        source: Arc<dyn DataSource>,
        validator: Arc<dyn FieldValidator>,
        users: Arc<dyn UserService>,
    ) -> Self {
        Self {
            source,
            validator,
            users,
        }
    }

    /// The in-memory backend: updates are visible to later fetches.
    pub fn in_memory(source: Arc<MemoryDataSource>) -> Self {
        Self {
            users: Arc::new(MemoryUserService::new(source.clone())),
            validator: Arc::new(RuleValidator),
            source,
        }
    }
}

/// The profile variant, chosen once from `can_edit`.
#[derive(Clone)]
pub enum ProfileSection {
    ReadOnly(SectionBoundary<ReadOnlyProfile>),
    Editable(SectionBoundary<EditableProfile>),
}

impl ProfileSection {
    async fn render(&self) -> SectionView<ProfileView> {
        match self {
            ProfileSection::ReadOnly(boundary) => boundary.render().await,
            ProfileSection::Editable(boundary) => boundary.render().await,
        }
    }

    async fn resolve(&self) -> SectionView<ProfileView> {
        match self {
            ProfileSection::ReadOnly(boundary) => boundary.resolve().await,
            ProfileSection::Editable(boundary) => boundary.resolve().await,
        }
    }

    async fn retry(&self) -> Result<bool, FrameworkError> {
        match self {
            ProfileSection::ReadOnly(boundary) => boundary.retry().await,
            ProfileSection::Editable(boundary) => boundary.retry().await,
        }
    }
}

/// One rendered frame of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub profile: SectionView<ProfileView>,
    pub posts: SectionView<Vec<PostPreview>>,
    /// `None` when analytics are not shown at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics: Option<SectionView<AnalyticsView>>,
    pub notifications: SectionView<Vec<String>>,
}

impl DashboardView {
    /// Whether no section is still loading.
    pub fn is_settled(&self) -> bool {
        !self.profile.is_loading()
            && !self.posts.is_loading()
            && !self.analytics.as_ref().is_some_and(SectionView::is_loading)
            && !self.notifications.is_loading()
    }
}

/// The resolved section layout. Cheap to clone; every boundary shares one cache.
#[derive(Clone)]
struct Layout {
    profile: ProfileSection,
    posts: SectionBoundary<UserPosts>,
    analytics: Option<SectionBoundary<UserAnalytics>>,
    notifications: SectionBoundary<UserNotifications>,
}

impl Layout {
    fn build(config: &DashboardConfig, scope: UserScope, cache: &CacheClient<Resource>) -> Self {
        let profile = if config.can_edit {
            ProfileSection::Editable(SectionBoundary::new(
                EditableProfile::new(scope.clone()),
                cache.clone(),
            ))
        } else {
            ProfileSection::ReadOnly(SectionBoundary::new(
                ReadOnlyProfile::new(scope.clone()),
                cache.clone(),
            ))
        };
        let analytics = config
            .show_analytics
            .then(|| SectionBoundary::new(UserAnalytics::new(scope.clone()), cache.clone()));

        Self {
            profile,
            posts: SectionBoundary::new(UserPosts::new(scope.clone()), cache.clone()),
            analytics,
            notifications: SectionBoundary::new(UserNotifications::new(scope), cache.clone()),
        }
    }

    async fn render(&self) -> DashboardView {
        let (profile, posts, analytics, notifications) = tokio::join!(
            self.profile.render(),
            self.posts.render(),
            async {
                match &self.analytics {
                    Some(boundary) => Some(boundary.render().await),
                    None => None,
                }
            },
            self.notifications.render()
        );
        DashboardView {
            profile,
            posts,
            analytics,
            notifications,
        }
    }

    async fn resolve(&self) -> DashboardView {
        let (profile, posts, analytics, notifications) = tokio::join!(
            self.profile.resolve(),
            self.posts.resolve(),
            async {
                match &self.analytics {
                    Some(boundary) => Some(boundary.resolve().await),
                    None => None,
                }
            },
            self.notifications.resolve()
        );
        DashboardView {
            profile,
            posts,
            analytics,
            notifications,
        }
    }

    /// Waits for each shown section separately, reporting them as they settle.
    fn settle_each(&self) -> JoinSet<SectionKind> {
        let mut pending = JoinSet::new();

        let profile = self.profile.clone();
        pending.spawn(async move {
            profile.resolve().await;
            SectionKind::Profile
        });
        let posts = self.posts.clone();
        pending.spawn(async move {
            posts.resolve().await;
            SectionKind::Posts
        });
        if let Some(analytics) = self.analytics.clone() {
            pending.spawn(async move {
                analytics.resolve().await;
                SectionKind::Analytics
            });
        }
        let notifications = self.notifications.clone();
        pending.spawn(async move {
            notifications.resolve().await;
            SectionKind::Notifications
        });

        pending
    }
}

/// The composition root of one user dashboard.
///
/// Owns the cache actor and the section layout. The `can_edit` and
/// `show_analytics` flags are consumed here, once, when the layout is built.
///
/// # Example
///
/// ```
/// use section_dashboard::clients::MemoryDataSource;
/// use section_dashboard::lifecycle::{DashboardConfig, DashboardSystem, Services};
/// use section_dashboard::model::{ProfileField, ResourceKind};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MemoryDataSource::new();
/// source.insert(ResourceKind::User, "42", json!({ "id": "42", "name": "Al", "bio": "" }));
/// source.insert(ResourceKind::Posts, "42", json!([]));
/// source.insert(ResourceKind::Notifications, "42", json!([]));
///
/// let config = DashboardConfig::new("42").with_edit(true);
/// let system = DashboardSystem::new(config, Services::in_memory(Arc::new(source)));
///
/// let mut frames = system.watch();
/// while let Some(view) = frames.recv().await {
///     println!("{}", serde_json::to_string(&view)?);
/// }
///
/// let mut editor = system.open_editor().await?;
/// editor.start_edit()?;
/// editor.set_field(ProfileField::Name, "Alice")?;
/// editor.save().await?;
/// assert_eq!(editor.original().name, "Alice");
/// drop(editor);
///
/// system.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct DashboardSystem {
    config: DashboardConfig,
    cache: CacheClient<Resource>,
    layout: Layout,
    validator: Arc<dyn FieldValidator>,
    users: Arc<dyn UserService>,
    handle: JoinHandle<()>,
}

impl DashboardSystem {
    /// Spawns the cache actor and builds the section layout.
    pub fn new(config: DashboardConfig, services: Services) -> Self {
        let (actor, cache) = CacheActor::new(config.cache_buffer.get());
        let handle = tokio::spawn(actor.run());

        let scope = UserScope::new(services.source, config.user_id.clone());
        let layout = Layout::build(&config, scope, &cache);
        info!(
            user_id = %config.user_id,
            can_edit = config.can_edit,
            show_analytics = config.show_analytics,
            "Dashboard ready"
        );

        Self {
            config,
            cache,
            layout,
            validator: services.validator,
            users: services.users,
            handle,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// The current frame. Starts any load that is not already cached or in flight.
    pub async fn render(&self) -> DashboardView {
        self.layout.render().await
    }

    /// Waits until every shown section has settled, then returns the frame.
    pub async fn settle(&self) -> DashboardView {
        self.layout.resolve().await
    }

    /// Streams frames: the current one first, then a new one each time a
    /// section settles, in settlement order.
    ///
    /// The stream ends after the last section settles, or when the receiver
    /// is dropped.
    pub fn watch(&self) -> mpsc::Receiver<DashboardView> {
        let (frames, receiver) = mpsc::channel(4);
        let layout = self.layout.clone();

        tokio::spawn(async move {
            if frames.send(layout.render().await).await.is_err() {
                return;
            }
            let mut pending = layout.settle_each();
            while let Some(settled) = pending.join_next().await {
                if let Ok(section) = settled {
                    debug!(%section, "Section settled");
                }
                if frames.send(layout.render().await).await.is_err() {
                    return;
                }
            }
        });

        receiver
    }

    /// Drops the cached resource behind `section` so its next render refetches.
    #[instrument(skip(self))]
    pub async fn retry(&self, section: SectionKind) -> Result<bool, DashboardError> {
        let removed = match section {
            SectionKind::Profile => self.layout.profile.retry().await?,
            SectionKind::Posts => self.layout.posts.retry().await?,
            SectionKind::Analytics => match &self.layout.analytics {
                Some(boundary) => boundary.retry().await?,
                None => return Err(DashboardError::Hidden(section)),
            },
            SectionKind::Notifications => self.layout.notifications.retry().await?,
        };
        Ok(removed)
    }

    /// Opens an edit form on the resolved user record.
    ///
    /// Only the editable profile variant has one. Waits for the user to load
    /// if needed, and fails with the fetch error if it cannot.
    pub async fn open_editor(&self) -> Result<ProfileEditForm, DashboardError> {
        let ProfileSection::Editable(boundary) = &self.layout.profile else {
            return Err(DashboardError::ReadOnly);
        };
        let resource = self
            .cache
            .read(boundary.key(), boundary.section().loader())
            .await?;
        let user = resource.as_user()?.clone();

        Ok(ProfileEditForm::new(
            user,
            self.validator.clone(),
            self.users.clone(),
            self.cache.clone(),
        ))
    }

    /// Shuts the cache actor down.
    ///
    /// The actor stops once every cache client is gone, including those held
    /// by open edit forms and running [`watch`](Self::watch) streams, so drop
    /// those first.
    pub async fn shutdown(self) -> Result<(), DashboardError> {
        info!("Shutting down dashboard...");
        drop(self.layout);
        drop(self.cache);

        self.handle
            .await
            .map_err(|e| DashboardError::Shutdown(e.to_string()))?;
        info!("Dashboard shut down");
        Ok(())
    }
}
