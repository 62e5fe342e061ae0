use crate::framework::{FetchError, Loader, ResourceKey, Section};
use crate::model::{Post, Resource, ResourceKind};
use crate::sections::{SectionKind, UserScope};
use serde::Serialize;

/// Post content shown in the list is cut to this many characters.
pub const EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostPreview {
    pub id: String,
    pub title: String,
    pub excerpt: String,
}

impl From<&Post> for PostPreview {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: post.content.chars().take(EXCERPT_CHARS).collect(),
        }
    }
}

/// The user's posts, as previews.
#[derive(Clone)]
pub struct UserPosts(UserScope);

impl UserPosts {
    pub fn new(scope: UserScope) -> Self {
        Self(scope)
    }
}

impl Section for UserPosts {
    type Value = Resource;
    type Output = Vec<PostPreview>;

    fn title(&self) -> &'static str {
        SectionKind::Posts.title()
    }

    fn key(&self) -> ResourceKey {
        self.0.key(ResourceKind::Posts)
    }

    fn loader(&self) -> Loader<Resource> {
        self.0.loader(ResourceKind::Posts)
    }

    fn render(&self, value: &Resource) -> Result<Vec<PostPreview>, FetchError> {
        Ok(value.as_posts()?.iter().map(PostPreview::from).collect())
    }
}
