use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod comment;
pub use comment::{Comment, CommentId};

mod error;
pub use error::Error;

mod post;
pub use post::{CommunityId, Post, PostId};

mod user;
pub use user::{User, UserId};

mod vote;
pub use vote::{VoteTally, VoteType};

/// Everything the backend returned for one screen, as stored on disk by
/// `agora-ctl` and `generate-test-data`
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Dump {
    #[serde(default)]
    pub posts: Vec<Post>,

    /// Comments in ascending `created_at` order, as the backend returns them
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Dump {
    pub fn validate(&self) -> Result<(), Error> {
        for p in &self.posts {
            p.validate()?;
        }
        for c in &self.comments {
            c.validate()?;
        }
        Ok(())
    }

    /// Comments of `post`, keeping the backend order
    pub fn comments_for(&self, post: &PostId) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|c| c.post_id == *post)
            .cloned()
            .collect()
    }
}

// The `validate` functions of this crate check rows coming from the backend
// before they reach the ranking and threading code. Postgres text columns
// cannot hold null bytes, so a row containing one did not come from there.
pub(crate) fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}

pub(crate) fn validate_optional_string(s: &Option<String>) -> Result<(), Error> {
    match s {
        None => Ok(()),
        Some(s) => validate_string(s),
    }
}
