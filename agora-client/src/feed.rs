use std::{borrow::Borrow, cmp::Reverse, ops::RangeInclusive, sync::Arc};

use rand::Rng;

use crate::{
    api::{CommunityId, Post, PostId, VoteType},
    HotExt, VoteExt, VoteTransition,
};

pub const POSTS_PER_PAGE: usize = 25;

/// At most this many promoted posts are shown, all on the first page
pub const MAX_PROMOTED: usize = 2;

/// Where the first promoted post may land among the first page's posts
pub const FIRST_PROMOTED_SLOTS: RangeInclusive<usize> = 3..=6;

/// Where the second promoted post may land, counted after the first was placed
pub const SECOND_PROMOTED_SLOTS: RangeInclusive<usize> = 10..=15;

/// Inclusive row range to request from the backend for one page
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRange {
    pub from: usize,
    pub to: usize,
}

impl PageRange {
    pub fn for_offset(offset: usize) -> PageRange {
        PageRange {
            from: offset,
            to: offset + POSTS_PER_PAGE - 1,
        }
    }
}

/// One page worth of backend results
#[derive(Clone, Debug, PartialEq)]
pub struct FeedPage {
    pub offset: usize,

    /// Non-promoted posts, hottest first
    pub regular: Vec<Post>,

    /// Promoted posts, newest first
    pub promoted: Vec<Post>,
}

impl FeedPage {
    /// Picks the page at `offset` out of locally held posts, the same way the
    /// backend's ranked view answers a page query
    ///
    /// An empty `communities` means every community.
    pub fn select(posts: &[Post], offset: usize, communities: &[CommunityId]) -> FeedPage {
        let mut regular = posts
            .iter()
            .filter(|p| !p.is_promoted)
            .filter(|p| communities.is_empty() || communities.contains(&p.community_id))
            .cloned()
            .collect::<Vec<_>>();
        rank_by_hot(&mut regular);
        let regular = regular
            .into_iter()
            .skip(offset)
            .take(POSTS_PER_PAGE)
            .collect();

        let mut promoted = posts
            .iter()
            .filter(|p| p.is_promoted)
            .cloned()
            .collect::<Vec<_>>();
        promoted.sort_by_key(|p| Reverse(p.created_at));
        promoted.truncate(MAX_PROMOTED);

        FeedPage {
            offset,
            regular,
            promoted,
        }
    }
}

/// Sorts hottest first, by the score of the current tally
///
/// Ties go to the newer post, then to the post id, so the order is stable
/// across refreshes.
pub fn rank_by_hot<P: Borrow<Post>>(posts: &mut [P]) {
    posts.sort_unstable_by_key(|p| {
        let p: &Post = p.borrow();
        (Reverse(p.hot_score()), Reverse(p.created_at), p.id)
    })
}

/// Splices promoted posts into the first page
///
/// Later pages are returned untouched. Slots past the end of the page append.
pub fn merge_promoted<R: Rng + ?Sized>(
    regular: Vec<Post>,
    promoted: Vec<Post>,
    offset: usize,
    rng: &mut R,
) -> Vec<Post> {
    let mut posts = regular;
    if offset != 0 {
        return posts;
    }
    for (promo, slots) in promoted
        .into_iter()
        .zip([FIRST_PROMOTED_SLOTS, SECOND_PROMOTED_SLOTS])
    {
        let at = rng.gen_range(slots).min(posts.len());
        posts.insert(at, promo);
    }
    posts
}

/// Posts as currently displayed, with paging state
#[derive(Clone, Debug, PartialEq)]
pub struct Feed {
    pub posts: Vec<Arc<Post>>,

    /// Offset of the next page to fetch
    pub offset: usize,

    /// False once the backend returned a short page
    pub has_more: bool,
}

impl Default for Feed {
    fn default() -> Feed {
        Feed::new()
    }
}

impl Feed {
    pub fn new() -> Feed {
        Feed {
            posts: Vec::new(),
            offset: 0,
            has_more: true,
        }
    }

    /// Range to request next, from the top when refreshing
    pub fn next_range(&self, refresh: bool) -> PageRange {
        PageRange::for_offset(if refresh { 0 } else { self.offset })
    }

    pub fn apply_page<R: Rng + ?Sized>(&mut self, page: FeedPage, refresh: bool, rng: &mut R) {
        self.has_more = page.regular.len() == POSTS_PER_PAGE;
        self.offset = page.offset + POSTS_PER_PAGE;
        let posts = merge_promoted(page.regular, page.promoted, page.offset, rng);
        tracing::debug!(
            offset = page.offset,
            num_posts = posts.len(),
            refresh,
            has_more = self.has_more,
            "applying feed page"
        );
        if refresh {
            self.posts.clear();
        }
        self.posts.extend(posts.into_iter().map(Arc::new));
    }

    pub fn get(&self, id: &PostId) -> Option<&Arc<Post>> {
        self.posts.iter().find(|p| p.id == *id)
    }

    /// Optimistically applies a vote press on a loaded post
    ///
    /// Returns the transition to send to the backend, or `None` if the post
    /// is not in this feed.
    pub fn apply_vote(
        &mut self,
        id: &PostId,
        existing: Option<VoteType>,
        pressed: VoteType,
    ) -> Option<VoteTransition> {
        let post = self.posts.iter_mut().find(|p| p.id == *id)?;
        let t = VoteTransition::apply(existing, pressed);
        let post = Arc::make_mut(post);
        post.votes = post.votes.apply(&t);
        post.hot_score = Some(post.hot_score().value());
        Some(t)
    }

    /// Re-sorts the ranked posts after local score changes, promoted posts
    /// keep their slots
    pub fn rerank(&mut self) {
        let slots = self
            .posts
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_promoted)
            .map(|(i, _)| i)
            .collect::<Vec<_>>();
        let mut ranked = slots
            .iter()
            .map(|&i| self.posts[i].clone())
            .collect::<Vec<_>>();
        rank_by_hot(&mut ranked);
        for (i, p) in slots.into_iter().zip(ranked) {
            self.posts[i] = p;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::api::{Uuid, VoteTally};

    fn post(n: u128, up: u32, down: u32, t: i64) -> Post {
        let mut p = Post::stub();
        p.id = PostId(Uuid::from_u128(n));
        p.title = format!("post {n}");
        p.votes = VoteTally::new(up, down);
        p.created_at = Utc.timestamp_opt(1_700_000_000 + t, 0).unwrap();
        p
    }

    fn promo(n: u128) -> Post {
        let mut p = post(n, 0, 0, n as i64);
        p.is_promoted = true;
        p
    }

    fn titles(posts: &[Arc<Post>]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn page_ranges() {
        assert_eq!(PageRange::for_offset(0), PageRange { from: 0, to: 24 });
        assert_eq!(PageRange::for_offset(25), PageRange { from: 25, to: 49 });
    }

    #[test]
    fn ranks_hottest_first() {
        let mut posts = vec![
            Arc::new(post(1, 1, 0, 0)),
            Arc::new(post(2, 100, 0, 0)),
            Arc::new(post(3, 0, 50, 0)),
            Arc::new(post(4, 1, 0, 180_000)),
        ];
        rank_by_hot(&mut posts);
        assert_eq!(titles(&posts), ["post 4", "post 2", "post 1", "post 3"]);
    }

    #[test]
    fn ties_break_on_date_then_id() {
        let mut posts = vec![
            Arc::new(post(2, 0, 0, 0)),
            Arc::new(post(1, 0, 0, 0)),
            Arc::new(post(3, 0, 0, 10)),
        ];
        rank_by_hot(&mut posts);
        assert_eq!(titles(&posts), ["post 3", "post 1", "post 2"]);
    }

    #[test]
    fn promoted_only_on_first_page() {
        let regular = (0..25).map(|i| post(i, 0, 0, 0)).collect::<Vec<_>>();
        let mut rng = StdRng::seed_from_u64(0);
        let merged = merge_promoted(regular.clone(), vec![promo(100)], 25, &mut rng);
        assert_eq!(merged, regular);
    }

    #[test]
    fn promoted_slots() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let regular = (0..25).map(|i| post(i, 0, 0, 0)).collect::<Vec<_>>();
            let merged = merge_promoted(regular, vec![promo(100), promo(101), promo(102)], 0, &mut rng);
            assert_eq!(merged.len(), 27);
            let first = merged.iter().position(|p| p.id == PostId(Uuid::from_u128(100))).unwrap();
            let second = merged.iter().position(|p| p.id == PostId(Uuid::from_u128(101))).unwrap();
            assert!(FIRST_PROMOTED_SLOTS.contains(&first), "first at {first}");
            assert!(SECOND_PROMOTED_SLOTS.contains(&second), "second at {second}");
            assert!(merged.iter().all(|p| p.id != PostId(Uuid::from_u128(102))));
        }
    }

    #[test]
    fn promoted_slots_clamp_to_short_pages() {
        let mut rng = StdRng::seed_from_u64(7);
        let merged = merge_promoted(vec![post(1, 0, 0, 0)], vec![promo(100), promo(101)], 0, &mut rng);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].id, PostId(Uuid::from_u128(1)));
        assert_eq!(merged[1].id, PostId(Uuid::from_u128(100)));
        assert_eq!(merged[2].id, PostId(Uuid::from_u128(101)));
    }

    #[test]
    fn select_pages_and_filters() {
        let mut posts = (0..30).map(|i| post(i, i as u32, 0, 0)).collect::<Vec<_>>();
        posts.push(promo(100));
        posts.push(promo(101));
        posts.push(promo(102));
        posts[0].community_id = CommunityId(7);

        let first = FeedPage::select(&posts, 0, &[]);
        assert_eq!(first.regular.len(), 25);
        assert_eq!(first.regular[0].id, PostId(Uuid::from_u128(29)));
        assert_eq!(
            first.promoted.iter().map(|p| p.id).collect::<Vec<_>>(),
            [PostId(Uuid::from_u128(102)), PostId(Uuid::from_u128(101))]
        );

        let second = FeedPage::select(&posts, 25, &[]);
        assert_eq!(second.regular.len(), 5);

        let only = FeedPage::select(&posts, 0, &[CommunityId(7)]);
        assert_eq!(only.regular.len(), 1);
        assert_eq!(only.regular[0].id, PostId(Uuid::from_u128(0)));
    }

    #[test]
    fn paging_state() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut posts = (0..30).map(|i| post(i, 0, 0, i as i64)).collect::<Vec<_>>();
        posts.push(promo(100));
        let mut feed = Feed::new();

        let range = feed.next_range(true);
        feed.apply_page(FeedPage::select(&posts, range.from, &[]), true, &mut rng);
        assert_eq!(feed.posts.len(), 26);
        assert_eq!(feed.offset, 25);
        assert!(feed.has_more);

        let range = feed.next_range(false);
        assert_eq!(range.from, 25);
        feed.apply_page(FeedPage::select(&posts, range.from, &[]), false, &mut rng);
        assert_eq!(feed.posts.len(), 31);
        assert_eq!(feed.offset, 50);
        assert!(!feed.has_more);

        feed.apply_page(FeedPage::select(&posts, 0, &[]), true, &mut rng);
        assert_eq!(feed.posts.len(), 26);
        assert_eq!(feed.offset, 25);
    }

    #[test]
    fn optimistic_vote_rescores() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut feed = Feed::new();
        feed.apply_page(
            FeedPage {
                offset: 0,
                regular: vec![post(1, 5, 0, 0), post(2, 4, 0, 0)],
                promoted: Vec::new(),
            },
            true,
            &mut rng,
        );
        let id = PostId(Uuid::from_u128(2));
        let before = feed.clone();

        let t = feed.apply_vote(&id, None, VoteType::Up).unwrap();
        assert_eq!(t.new_vote, Some(VoteType::Up));
        let p = feed.get(&id).unwrap();
        assert_eq!(p.votes, VoteTally::new(5, 0));
        assert_eq!(p.hot_score, Some(p.hot_score().value()));
        // the untouched post is still shared with the old feed
        assert!(Arc::ptr_eq(&feed.posts[0], &before.posts[0]));

        assert!(feed.apply_vote(&PostId::stub(), None, VoteType::Up).is_none());
    }

    #[test]
    fn rerank_keeps_promoted_in_place() {
        let mut feed = Feed {
            posts: vec![
                Arc::new(post(1, 1, 0, 0)),
                Arc::new(promo(100)),
                Arc::new(post(2, 2, 0, 0)),
                Arc::new(post(3, 3, 0, 0)),
            ],
            offset: 25,
            has_more: false,
        };
        feed.rerank();
        assert_eq!(titles(&feed.posts), ["post 3", "post 100", "post 2", "post 1"]);

        feed.apply_vote(&PostId(Uuid::from_u128(1)), None, VoteType::Up);
        feed.apply_vote(&PostId(Uuid::from_u128(1)), Some(VoteType::Up), VoteType::Up);
        feed.apply_vote(&PostId(Uuid::from_u128(3)), None, VoteType::Down);
        feed.rerank();
        assert_eq!(titles(&feed.posts), ["post 2", "post 100", "post 3", "post 1"]);
    }
}
