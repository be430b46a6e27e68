use agora_api::{
    Comment, CommentId, CommunityId, Dump, Post, PostId, Time, User, UserId, VoteTally,
};
use chrono::{Duration, TimeZone, Utc};
use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

const NUM_USERS: usize = 10;
const NUM_COMMUNITIES: i64 = 5;

const NUM_POSTS: usize = 80;
const NUM_PROMOTED: usize = 3;
const POST_TITLE_LEN: usize = 8;
const POST_BODY_LEN: usize = 40;
const MAX_POST_VOTES: u32 = 500;

const NUM_COMMENTS: usize = 600;
const COMMENT_WORD_COUNT: usize = 20;
const MAX_COMMENT_VOTES: u32 = 50;

// Share of comments answering another comment rather than the post
const REPLY_RATIO: f64 = 0.6;
// Share of replies whose parent is then deleted from the dump
const ORPHAN_RATIO: f64 = 0.02;

// Everything happens within the ten days before this
const NOW: i64 = 1_700_000_000;
const SPAN_SECS: i64 = 10 * 24 * 3600;

fn gen_time(rng: &mut impl Rng, after: Time) -> Time {
    let end = Utc.timestamp_opt(NOW, 0).single().expect("NOW is a valid timestamp");
    let span = (end - after).num_seconds().max(1);
    after + Duration::seconds(rng.gen_range(0..span))
}

fn gen_tally(rng: &mut impl Rng, max: u32) -> VoteTally {
    VoteTally::new(rng.gen_range(0..=max), rng.gen_range(0..=max / 4))
}

fn main() {
    let mut rng = rand::thread_rng();
    let start = Utc
        .timestamp_opt(NOW - SPAN_SECS, 0)
        .single()
        .expect("start is a valid timestamp");

    // Generate users
    let users = (0..NUM_USERS)
        .map(|i| User {
            id: UserId(Uuid::new_v4()),
            username: Some(format!("{}{i}", lipsum::lipsum_words(1).to_lowercase())),
        })
        .collect::<Vec<_>>();

    // Generate posts, the last few being promoted
    let mut posts = (0..NUM_POSTS + NUM_PROMOTED)
        .map(|i| {
            let author = users.choose(&mut rng).expect("there are users");
            Post {
                id: PostId(Uuid::new_v4()),
                user_id: Some(author.id),
                community_id: CommunityId(rng.gen_range(1..=NUM_COMMUNITIES)),
                title: lipsum::lipsum_words(POST_TITLE_LEN),
                body: Some(lipsum::lipsum(POST_BODY_LEN)),
                image_url: None,
                is_promoted: i >= NUM_POSTS,
                votes: gen_tally(&mut rng, MAX_POST_VOTES),
                comments_count: 0,
                view_count: rng.gen_range(0..10_000),
                created_at: gen_time(&mut rng, start),
                hot_score: None,
                community_name: None,
                username: author.username.clone(),
            }
        })
        .collect::<Vec<_>>();

    // Generate comments in creation order, replies always after their parent
    let mut comments: Vec<Comment> = Vec::with_capacity(NUM_COMMENTS);
    for i in 0..NUM_COMMENTS {
        let author = users.choose(&mut rng).expect("there are users");
        let parent = match comments.is_empty() || !rng.gen_bool(REPLY_RATIO) {
            true => None,
            false => comments.choose(&mut rng).cloned(),
        };
        let (post_idx, parent_id, depth, after) = match parent {
            Some(p) => {
                let idx = posts
                    .iter()
                    .position(|post| post.id == p.post_id)
                    .expect("parent comment belongs to a generated post");
                (idx, Some(p.id), p.depth + 1, p.created_at)
            }
            None => {
                let idx = rng.gen_range(0..posts.len());
                (idx, None, 0, posts[idx].created_at)
            }
        };
        posts[post_idx].comments_count += 1;
        comments.push(Comment {
            id: CommentId(format!("c{i:04}")),
            post_id: posts[post_idx].id,
            parent_comment_id: parent_id,
            user_id: Some(author.id),
            body: lipsum::lipsum_words(COMMENT_WORD_COUNT),
            votes: gen_tally(&mut rng, MAX_COMMENT_VOTES),
            depth,
            created_at: gen_time(&mut rng, after),
            is_deleted: false,
            username: author.username.clone(),
        });
    }
    comments.sort_by_key(|c| c.created_at);

    // Drop a few replied-to comments, leaving their replies orphaned
    let orphaned_parents = comments
        .iter()
        .filter_map(|c| c.parent_comment_id.clone())
        .filter(|_| rng.gen_bool(ORPHAN_RATIO))
        .collect::<Vec<_>>();
    comments.retain(|c| !orphaned_parents.contains(&c.id));

    // Mark some as deleted but still shown
    for c in comments.iter_mut() {
        if rng.gen_bool(ORPHAN_RATIO) {
            c.is_deleted = true;
        }
    }

    let dump = Dump { posts, comments };
    println!(
        "{}",
        serde_json::to_string_pretty(&dump).expect("serializing test data")
    );
}
