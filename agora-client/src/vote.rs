use crate::api::{VoteTally, VoteType};

/// What pressing a vote button does, given the vote the user already has
///
/// Pressing the same button again takes the vote back, pressing the other
/// one switches it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VoteTransition {
    /// Vote the user holds afterwards
    pub new_vote: Option<VoteType>,
    pub upvotes_delta: i32,
    pub downvotes_delta: i32,
}

impl VoteTransition {
    pub fn apply(existing: Option<VoteType>, pressed: VoteType) -> VoteTransition {
        use VoteType::*;
        let (new_vote, upvotes_delta, downvotes_delta) = match (existing, pressed) {
            (None, Up) => (Some(Up), 1, 0),
            (Some(Up), Up) => (None, -1, 0),
            (Some(Down), Up) => (Some(Up), 1, -1),
            (None, Down) => (Some(Down), 0, 1),
            (Some(Down), Down) => (None, 0, -1),
            (Some(Up), Down) => (Some(Down), -1, 1),
        };
        VoteTransition {
            new_vote,
            upvotes_delta,
            downvotes_delta,
        }
    }
}

pub trait VoteExt {
    /// Tally after `t`, never going below zero even when the local state was
    /// stale
    fn apply(&self, t: &VoteTransition) -> VoteTally;
}

impl VoteExt for VoteTally {
    fn apply(&self, t: &VoteTransition) -> VoteTally {
        VoteTally {
            upvotes: self.upvotes.saturating_add_signed(t.upvotes_delta),
            downvotes: self.downvotes.saturating_add_signed(t.downvotes_delta),
        }
    }
}
