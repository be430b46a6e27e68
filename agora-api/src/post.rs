use uuid::Uuid;

use crate::{Error, Time, UserId, VoteTally, STUB_UUID};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct PostId(pub Uuid);

impl PostId {
    pub fn stub() -> PostId {
        PostId(STUB_UUID)
    }
}

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommunityId(pub i64);

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: Option<UserId>,
    pub community_id: CommunityId,

    pub title: String,
    pub body: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,

    /// Promoted posts are never ranked, they get spliced into the first page
    pub is_promoted: bool,

    #[serde(flatten)]
    pub votes: VoteTally,
    #[serde(default)]
    pub comments_count: u32,
    #[serde(default)]
    pub view_count: u32,

    pub created_at: Time,

    /// Score as last computed, either by the backend view or by an optimistic
    /// local update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_score: Option<f64>,

    // Joined display fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Post {
    pub fn stub() -> Post {
        Post {
            id: PostId::stub(),
            user_id: None,
            community_id: CommunityId(0),
            title: String::new(),
            body: None,
            image_url: None,
            is_promoted: false,
            votes: VoteTally::default(),
            comments_count: 0,
            view_count: 0,
            created_at: Time::default(),
            hot_score: None,
            community_name: None,
            username: None,
        }
    }

    // See comments on other `validate` functions throughout agora-api
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.title)?;
        crate::validate_optional_string(&self.body)?;
        crate::validate_optional_string(&self.image_url)?;
        crate::validate_optional_string(&self.community_name)?;
        crate::validate_optional_string(&self.username)?;
        Ok(())
    }
}
