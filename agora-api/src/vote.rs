use crate::Error;

/// Vote counters of a post or comment
///
/// Only ever mutated through votes, at most one per (user, post) pair, which
/// the backend enforces.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VoteTally {
    #[serde(rename = "upvotes_count")]
    pub upvotes: u32,

    #[serde(rename = "downvotes_count")]
    pub downvotes: u32,
}

impl VoteTally {
    pub fn new(upvotes: u32, downvotes: u32) -> VoteTally {
        VoteTally { upvotes, downvotes }
    }

    /// Net score, upvotes minus downvotes
    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum VoteType {
    Up,
    Down,
}

impl TryFrom<i8> for VoteType {
    type Error = Error;

    fn try_from(v: i8) -> Result<VoteType, Error> {
        match v {
            1 => Ok(VoteType::Up),
            -1 => Ok(VoteType::Down),
            v => Err(Error::InvalidVoteType(v)),
        }
    }
}

impl From<VoteType> for i8 {
    fn from(v: VoteType) -> i8 {
        match v {
            VoteType::Up => 1,
            VoteType::Down => -1,
        }
    }
}
