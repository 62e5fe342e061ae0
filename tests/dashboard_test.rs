use section_dashboard::clients::{MockDataSource, MockUserService, MockValidator};
use section_dashboard::framework::{FetchError, SectionView};
use section_dashboard::lifecycle::{DashboardConfig, DashboardError, DashboardSystem, Services};
use section_dashboard::model::{ProfileField, ResourceKind};
use section_dashboard::sections::{AnalyticsView, ProfileView, SectionKind};
use serde_json::{json, Value};
use std::sync::Arc;

struct Mocks {
    source: MockDataSource,
    validator: MockValidator,
    users: MockUserService,
}

impl Mocks {
    fn new() -> Self {
        Self {
            source: MockDataSource::new(),
            validator: MockValidator::new(),
            users: MockUserService::new(),
        }
    }

    fn services(&self) -> Services {
        Services::new(
            Arc::new(self.source.clone()),
            Arc::new(self.validator.clone()),
            Arc::new(self.users.clone()),
        )
    }

    fn verify(&self) {
        self.source.verify();
        self.validator.verify();
        self.users.verify();
    }
}

fn user_json(name: &str) -> Value {
    json!({ "id": "42", "name": name, "bio": "hello" })
}

fn posts_json() -> Value {
    json!([{ "id": "p1", "title": "First", "content": "x".repeat(150) }])
}

fn analytics_json() -> Value {
    json!({ "views": 120, "likes": 7 })
}

fn notifications_json() -> Value {
    json!([{ "id": "n1", "message": "Welcome" }])
}

/// Profile fails while posts, analytics and notifications succeed: the
/// profile shows its fallback and the other three render real content.
#[tokio::test]
async fn test_profile_failure_is_isolated() {
    let mocks = Mocks::new();
    mocks
        .source
        .expect_fetch(ResourceKind::User, "42")
        .return_err(FetchError::Transport("503".into()));
    mocks
        .source
        .expect_fetch(ResourceKind::Posts, "42")
        .return_ok(posts_json());
    mocks
        .source
        .expect_fetch(ResourceKind::Analytics, "42")
        .return_ok(analytics_json());
    mocks
        .source
        .expect_fetch(ResourceKind::Notifications, "42")
        .return_ok(notifications_json());

    let config = DashboardConfig::new("42").with_analytics(true);
    let system = DashboardSystem::new(config, mocks.services());
    let view = system.settle().await;

    assert!(matches!(
        view.profile,
        SectionView::Unavailable { title: "Profile", .. }
    ));
    let posts = view.posts.ready().expect("posts should render");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].excerpt.len(), 100);
    assert_eq!(
        view.analytics.as_ref().and_then(SectionView::ready),
        Some(&AnalyticsView {
            views: 120,
            likes: 7
        })
    );
    assert_eq!(
        view.notifications.ready(),
        Some(&vec!["Welcome".to_string()])
    );
    assert!(view.is_settled());

    mocks.verify();
    system.shutdown().await.unwrap();
}

/// With analytics off, the section does not exist and nothing is fetched for it.
#[tokio::test]
async fn test_analytics_hidden_when_flag_off() {
    let mocks = Mocks::new();
    mocks
        .source
        .expect_fetch(ResourceKind::User, "42")
        .return_ok(user_json("Al"));
    mocks
        .source
        .expect_fetch(ResourceKind::Posts, "42")
        .return_ok(posts_json());
    mocks
        .source
        .expect_fetch(ResourceKind::Notifications, "42")
        .return_ok(notifications_json());

    let system = DashboardSystem::new(DashboardConfig::new("42"), mocks.services());
    let view = system.settle().await;

    assert!(view.analytics.is_none());
    assert_eq!(
        view.profile.ready(),
        Some(&ProfileView::ReadOnly { name: "Al".into() })
    );
    assert!(matches!(
        system.retry(SectionKind::Analytics).await,
        Err(DashboardError::Hidden(SectionKind::Analytics))
    ));
    let rendered = serde_json::to_value(&view).unwrap();
    assert!(rendered.get("analytics").is_none());

    mocks.verify();
}

#[tokio::test]
async fn test_read_only_profile_has_no_editor() {
    let mocks = Mocks::new();
    let system = DashboardSystem::new(DashboardConfig::new("42"), mocks.services());

    assert!(matches!(
        system.open_editor().await,
        Err(DashboardError::ReadOnly)
    ));
    mocks.verify();
}

/// Frames arrive as sections settle, in settlement order, not issuance order.
#[tokio::test]
async fn test_watch_emits_frame_per_settlement() {
    let mocks = Mocks::new();
    let user = mocks.source.expect_fetch(ResourceKind::User, "42").defer();
    let posts = mocks.source.expect_fetch(ResourceKind::Posts, "42").defer();
    let analytics = mocks
        .source
        .expect_fetch(ResourceKind::Analytics, "42")
        .defer();
    let notifications = mocks
        .source
        .expect_fetch(ResourceKind::Notifications, "42")
        .defer();

    let config = DashboardConfig::new("42").with_analytics(true);
    let system = DashboardSystem::new(config, mocks.services());
    let mut frames = system.watch();

    let first = frames.recv().await.unwrap();
    assert!(first.profile.is_loading());
    assert!(first.posts.is_loading());
    assert!(first.notifications.is_loading());

    notifications.resolve_ok(notifications_json());
    let second = frames.recv().await.unwrap();
    assert!(second.notifications.ready().is_some());
    assert!(second.profile.is_loading());
    assert!(second.posts.is_loading());

    user.resolve_err(FetchError::NotFound("user/42".into()));
    let third = frames.recv().await.unwrap();
    assert!(third.profile.is_unavailable());
    assert!(third.posts.is_loading());

    posts.resolve_ok(posts_json());
    analytics.resolve_ok(analytics_json());
    let fourth = frames.recv().await.unwrap();
    assert!(fourth.posts.ready().is_some());
    let fifth = frames.recv().await.unwrap();
    assert!(fifth.is_settled());
    assert!(frames.recv().await.is_none());

    mocks.verify();
}

/// A failed section can be retried on its own.
#[tokio::test]
async fn test_retry_refetches_failed_section() {
    let mocks = Mocks::new();
    mocks
        .source
        .expect_fetch(ResourceKind::User, "42")
        .return_err(FetchError::Transport("timeout".into()));
    mocks
        .source
        .expect_fetch(ResourceKind::User, "42")
        .return_ok(user_json("Al"));
    mocks
        .source
        .expect_fetch(ResourceKind::Posts, "42")
        .return_ok(posts_json());
    mocks
        .source
        .expect_fetch(ResourceKind::Notifications, "42")
        .return_ok(notifications_json());

    let system = DashboardSystem::new(DashboardConfig::new("42"), mocks.services());
    assert!(system.settle().await.profile.is_unavailable());

    assert!(system.retry(SectionKind::Profile).await.unwrap());
    let view = system.settle().await;

    assert_eq!(view.profile.ready().map(ProfileView::name), Some("Al"));
    assert_eq!(mocks.source.fetch_count(ResourceKind::Posts, "42"), 1);
    mocks.verify();
}

/// Edit, validate and save through the dashboard; the next render refetches
/// the user and shows the saved name.
#[tokio::test]
async fn test_edit_flow_refreshes_profile() {
    let mocks = Mocks::new();
    mocks
        .source
        .expect_fetch(ResourceKind::User, "42")
        .return_ok(user_json("Al"));
    mocks
        .source
        .expect_fetch(ResourceKind::User, "42")
        .return_ok(user_json("Alice"));
    mocks
        .source
        .expect_fetch(ResourceKind::Posts, "42")
        .return_ok(posts_json());
    mocks
        .source
        .expect_fetch(ResourceKind::Notifications, "42")
        .return_ok(notifications_json());
    mocks
        .validator
        .expect_validate(ProfileField::Name)
        .return_ok(true);
    mocks.users.expect_update("42").return_ok(None);

    let config = DashboardConfig::new("42").with_edit(true);
    let system = DashboardSystem::new(config, mocks.services());
    let before = system.settle().await;
    assert_eq!(
        before.profile.ready(),
        Some(&ProfileView::Editable {
            name: "Al".into(),
            bio: "hello".into()
        })
    );

    let mut editor = system.open_editor().await.unwrap();
    editor.start_edit().unwrap();
    editor.set_field(ProfileField::Name, "Alice").unwrap();
    assert!(editor.blur(ProfileField::Name).await.unwrap());
    editor.save().await.unwrap();
    assert_eq!(editor.original().name, "Alice");
    drop(editor);

    let after = system.settle().await;
    assert_eq!(after.profile.ready().map(ProfileView::name), Some("Alice"));
    assert_eq!(mocks.source.fetch_count(ResourceKind::User, "42"), 2);

    mocks.verify();
    system.shutdown().await.unwrap();
}
