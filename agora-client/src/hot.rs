use std::{cmp::Ordering, fmt};

use crate::api::{Comment, Post, Time, VoteTally};

/// Origin of the seconds term, 2005-12-08T07:46:43Z
///
/// Scores persisted by the backend were computed against this exact value,
/// changing it makes local and stored scores incomparable.
pub const REFERENCE_EPOCH: i64 = 1134028003;

/// Every DECAY_SECONDS of age is worth one order of magnitude of net score
pub const DECAY_SECONDS: f64 = 45000.0;

/// Scores are rounded to this many decimal digits
pub const ROUNDING_DIGITS: i32 = 7;

/// Ranking key of a post, higher is hotter
#[derive(Clone, Copy, Debug)]
pub struct HotScore(pub f64);

impl HotScore {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for HotScore {
    fn eq(&self, other: &HotScore) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HotScore {}

impl PartialOrd for HotScore {
    fn partial_cmp(&self, other: &HotScore) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HotScore {
    fn cmp(&self, other: &HotScore) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for HotScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.7}", self.0)
    }
}

/// Computes the hot score of something with this tally, created at `created_at`
///
/// There is no dependency on the current time: recency comes from the seconds
/// elapsed between `REFERENCE_EPOCH` and `created_at`, so newer posts start
/// higher and older posts never decay further once scored.
pub fn compute_hot_score(upvotes: u32, downvotes: u32, created_at: Time) -> HotScore {
    let score = i64::from(upvotes) - i64::from(downvotes);
    let sign = score.signum() as f64;
    let order = (score.unsigned_abs().max(1) as f64).log10();
    // timestamp() floors towards negative infinity, nanoseconds are always positive
    let seconds = (created_at.timestamp() - REFERENCE_EPOCH) as f64;
    HotScore(round_digits(order + sign * seconds / DECAY_SECONDS))
}

fn round_digits(v: f64) -> f64 {
    let factor = 10f64.powi(ROUNDING_DIGITS);
    (v * factor).round() / factor
}

pub trait HotExt {
    /// Hot score from the current tally, ignoring any stored score
    fn hot_score(&self) -> HotScore;
}

impl HotExt for Post {
    fn hot_score(&self) -> HotScore {
        self.votes.hot_score_at(self.created_at)
    }
}

impl HotExt for Comment {
    fn hot_score(&self) -> HotScore {
        self.votes.hot_score_at(self.created_at)
    }
}

pub trait TallyExt {
    fn hot_score_at(&self, created_at: Time) -> HotScore;
}

impl TallyExt for VoteTally {
    fn hot_score_at(&self, created_at: Time) -> HotScore {
        compute_hot_score(self.upvotes, self.downvotes, created_at)
    }
}
