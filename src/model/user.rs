use serde::{Deserialize, Serialize};

/// A user record as returned by the data source.
///
/// Only the fields the dashboard reads are kept. Anything else in the payload
/// is ignored when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
}

impl User {
    /// Creates a new User instance.
    pub fn new(id: impl Into<String>, name: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bio: bio.into(),
        }
    }

    /// Returns a copy of this user with the draft's editable fields applied.
    pub fn with_draft(&self, draft: &ProfileDraft) -> Self {
        Self {
            id: self.id.clone(),
            name: draft.name.clone(),
            bio: draft.bio.clone(),
        }
    }
}

/// The editable fields of a user profile.
///
/// This is both the in-progress draft of the edit form and the payload sent
/// to the update service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub bio: String,
}

impl From<&User> for ProfileDraft {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            bio: user.bio.clone(),
        }
    }
}

/// One editable field of [`ProfileDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileField {
    Name,
    Bio,
}

impl ProfileField {
    pub fn as_str(self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Bio => "bio",
        }
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ProfileDraft {
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Bio => &self.bio,
        }
    }

    /// Replaces one field, leaving the other untouched.
    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        match field {
            ProfileField::Name => self.name = value.into(),
            ProfileField::Bio => self.bio = value.into(),
        }
    }
}
