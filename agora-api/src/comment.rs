use crate::{Error, PostId, Time, UserId, VoteTally};

/// Opaque comment identifier, as handed out by the backend
#[derive(
    Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> CommentId {
        CommentId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One comment row, flat, linked to its parent by id
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// `None` for a top-level comment
    pub parent_comment_id: Option<CommentId>,
    pub user_id: Option<UserId>,

    pub body: String,
    #[serde(flatten)]
    pub votes: VoteTally,

    /// Depth as stored by the backend at creation time
    #[serde(default)]
    pub depth: u32,

    pub created_at: Time,

    #[serde(default)]
    pub is_deleted: bool,

    // Joined display fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Comment {
    pub fn stub(id: &str, parent: Option<&str>, created_at: Time) -> Comment {
        Comment {
            id: CommentId::new(id),
            post_id: PostId::stub(),
            parent_comment_id: parent.map(CommentId::new),
            user_id: None,
            body: String::new(),
            votes: VoteTally::default(),
            depth: 0,
            created_at,
            is_deleted: false,
            username: None,
        }
    }

    // See comments on other `validate` functions throughout agora-api
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.0.is_empty() {
            return Err(Error::EmptyId);
        }
        if let Some(parent) = &self.parent_comment_id {
            if parent.0.is_empty() {
                return Err(Error::EmptyId);
            }
            crate::validate_string(&parent.0)?;
        }
        crate::validate_string(&self.id.0)?;
        crate::validate_string(&self.body)?;
        crate::validate_optional_string(&self.username)?;
        Ok(())
    }
}
