use std::sync::Arc;

use agora_client::{
    api::{Post, Time},
    prelude::*,
    Comment, CommentTree,
};

const DELETED_BODY: &str = "[deleted]";

/// Nested JSON shape of a thread
#[derive(Debug, serde::Serialize)]
pub struct CommentView<'a> {
    pub id: &'a str,
    pub author: &'a str,
    pub body: &'a str,
    pub depth: u32,
    pub score: i64,
    pub orphan: bool,
    pub created_at: Time,
    pub replies: Vec<CommentView<'a>>,
}

impl<'a> From<&'a Comment> for CommentView<'a> {
    fn from(c: &'a Comment) -> CommentView<'a> {
        CommentView {
            id: c.id.as_str(),
            author: c.author_display(),
            body: body(c),
            depth: c.depth,
            score: c.votes.score(),
            orphan: c.is_orphan(),
            created_at: c.created_at,
            replies: c.replies.iter().map(CommentView::from).collect(),
        }
    }
}

fn body(c: &Comment) -> &str {
    if c.is_deleted {
        DELETED_BODY
    } else {
        &c.body
    }
}

pub fn thread_json(tree: &CommentTree) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&tree.roots.iter().map(CommentView::from).collect::<Vec<_>>())
}

pub fn thread_text(tree: &CommentTree) -> String {
    tree.iter()
        .flat_map(|c| {
            let indent = "  ".repeat(c.depth as usize);
            let orphan = if c.is_orphan() {
                " (reply to a missing comment)"
            } else {
                ""
            };
            let header = format!(
                "{indent}- {} by {}, {} points{orphan}\n",
                c.id,
                c.author_display(),
                c.votes.score()
            );
            std::iter::once(header).chain(
                body(c)
                    .lines()
                    .map(move |line| format!("{indent}  {line}\n"))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

pub fn feed_text(posts: &[Arc<Post>], offset: usize) -> String {
    let mut rank = offset;
    posts
        .iter()
        .map(|p| {
            if p.is_promoted {
                return format!("  promoted  {}\n", p.title);
            }
            rank += 1;
            format!(
                "{rank:>3} {:>12} {} ({} points, {} comments)\n",
                p.hot_score().to_string(),
                p.title,
                p.votes.score(),
                p.comments_count
            )
        })
        .collect()
}
