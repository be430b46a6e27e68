mod comment;
pub use comment::{Comment, CommentTree, Iter, DELETED_AUTHOR};

pub mod feed;
pub use feed::{Feed, FeedPage, PageRange, POSTS_PER_PAGE};

mod hot;
pub use hot::{
    compute_hot_score, HotExt, HotScore, TallyExt, DECAY_SECONDS, REFERENCE_EPOCH,
    ROUNDING_DIGITS,
};

mod vote;
pub use vote::{VoteExt, VoteTransition};

pub mod api {
    pub use agora_api::*;
}

pub mod prelude {
    pub use crate::{HotExt, TallyExt, VoteExt};
}
