use std::collections::HashMap;

use crate::api::{self, CommentId, PostId, Time, UserId, VoteTally};

/// Shown in place of the author when the account is gone
pub const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,

    /// Parent as declared by the backend row, which may not be where this
    /// comment ended up (see `is_orphan`)
    pub parent_id: Option<CommentId>,
    pub user_id: Option<UserId>,
    pub author: Option<String>,

    pub body: String,
    pub votes: VoteTally,
    pub is_deleted: bool,
    pub created_at: Time,

    /// Distance from the root of the tree this comment is attached in
    pub depth: u32,

    /// Replies in chronological order
    pub replies: Vec<Comment>,
}

impl Comment {
    fn from_row(c: api::Comment, depth: u32) -> Comment {
        Comment {
            id: c.id,
            post_id: c.post_id,
            parent_id: c.parent_comment_id,
            user_id: c.user_id,
            author: c.username,
            body: c.body,
            votes: c.votes,
            is_deleted: c.is_deleted,
            created_at: c.created_at,
            depth,
            replies: Vec::new(),
        }
    }

    fn to_row(&self, attached_to: Option<&CommentId>) -> api::Comment {
        api::Comment {
            id: self.id.clone(),
            post_id: self.post_id,
            parent_comment_id: attached_to.cloned(),
            user_id: self.user_id,
            body: self.body.clone(),
            votes: self.votes,
            depth: self.depth,
            created_at: self.created_at,
            is_deleted: self.is_deleted,
            username: self.author.clone(),
        }
    }

    pub fn author_display(&self) -> &str {
        self.author.as_deref().unwrap_or(DELETED_AUTHOR)
    }

    /// True for a comment that names a parent but was attached as a root
    /// because that parent was not available
    pub fn is_orphan(&self) -> bool {
        self.depth == 0 && self.parent_id.is_some()
    }

    /// Number of comments below this one, at any depth
    pub fn reply_count(&self) -> usize {
        self.replies.iter().map(|r| 1 + r.reply_count()).sum()
    }

    pub fn find_in<'a>(comments: &'a mut [Comment], id: &CommentId) -> Option<&'a mut Comment> {
        for c in comments.iter_mut() {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_in(&mut c.replies, id) {
                return Some(res);
            }
        }
        None
    }

    fn find_ref<'a>(comments: &'a [Comment], id: &CommentId) -> Option<&'a Comment> {
        for c in comments {
            if c.id == *id {
                return Some(c);
            }
            if let Some(res) = Comment::find_ref(&c.replies, id) {
                return Some(res);
            }
        }
        None
    }

    /// Last match in pre-order, the one a rebuild from flat rows would pick
    fn find_last_in<'a>(comments: &'a mut [Comment], id: &CommentId) -> Option<&'a mut Comment> {
        for c in comments.iter_mut().rev() {
            if Comment::find_ref(&c.replies, id).is_some() {
                return Comment::find_last_in(&mut c.replies, id);
            }
            if c.id == *id {
                return Some(c);
            }
        }
        None
    }
}

/// The threaded comments of one post
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommentTree {
    /// Top-level comments in chronological order
    pub roots: Vec<Comment>,
}

impl CommentTree {
    pub fn new() -> CommentTree {
        CommentTree::default()
    }

    /// Threads a flat list of comment rows
    ///
    /// `flat` must already be in ascending `created_at` order, it is not
    /// re-sorted. A comment is attached under the latest comment seen before it
    /// that carries its parent id; when there is none (parent deleted, not
    /// fetched, itself, or only appearing later) it is kept as a root instead of
    /// being dropped. Every row thus ends up exactly once in the tree.
    pub fn build(flat: Vec<api::Comment>) -> CommentTree {
        let n = flat.len();

        // Resolve parents to positions. Parents always come strictly before
        // their children, which rules out cycles.
        let mut seen = HashMap::<&str, usize>::with_capacity(n);
        let mut depths = Vec::with_capacity(n);
        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for (i, c) in flat.iter().enumerate() {
            let parent = c
                .parent_comment_id
                .as_ref()
                .and_then(|p| seen.get(p.as_str()).copied());
            match parent {
                Some(p) => {
                    depths.push(depths[p] + 1);
                    children[p].push(i);
                }
                None => {
                    if let Some(p) = &c.parent_comment_id {
                        tracing::warn!(
                            comment = %c.id,
                            parent = %p,
                            "parent comment not found, attaching as top-level comment"
                        );
                    }
                    depths.push(0);
                    roots.push(i);
                }
            }
            if seen.insert(c.id.as_str(), i).is_some() {
                tracing::warn!(comment = %c.id, "duplicate comment id, replies go to the latest");
            }
        }

        // Assemble bottom-up: children have higher positions than their parent,
        // so they are complete by the time their parent is reached
        let mut nodes = flat
            .into_iter()
            .zip(depths)
            .map(|(c, depth)| Some(Comment::from_row(c, depth)))
            .collect::<Vec<_>>();
        for i in (0..n).rev() {
            let replies = children[i]
                .iter()
                .filter_map(|&c| nodes[c].take())
                .collect::<Vec<_>>();
            if let Some(node) = &mut nodes[i] {
                node.replies = replies;
            }
        }
        let roots = roots
            .into_iter()
            .filter_map(|i| nodes[i].take())
            .collect::<Vec<_>>();

        tracing::debug!(num_comments = n, num_roots = roots.len(), "built comment tree");
        CommentTree { roots }
    }

    /// Adds one freshly created comment without rebuilding the tree
    ///
    /// The comment goes last among its siblings, since it is newer than all of
    /// them. If its parent cannot be found it becomes the last root, the same
    /// way `build` handles it. With duplicate ids it goes under the last one in
    /// pre-order, which is the latest as far as `build` is concerned.
    pub fn insert(&mut self, c: api::Comment) {
        let parent_id = c.parent_comment_id.clone();
        match parent_id
            .as_ref()
            .and_then(|p| Comment::find_last_in(&mut self.roots, p))
        {
            Some(parent) => {
                let depth = parent.depth + 1;
                parent.replies.push(Comment::from_row(c, depth));
            }
            None => {
                if let Some(p) = &parent_id {
                    tracing::warn!(
                        comment = %c.id,
                        parent = %p,
                        "parent comment not found, inserting as top-level comment"
                    );
                }
                self.roots.push(Comment::from_row(c, 0));
            }
        }
    }

    /// By-value version of `insert`, for callers that replace their tree
    pub fn with_comment(mut self, c: api::Comment) -> CommentTree {
        self.insert(c);
        self
    }

    pub fn find(&self, id: &CommentId) -> Option<&Comment> {
        Comment::find_ref(&self.roots, id)
    }

    pub fn find_mut(&mut self, id: &CommentId) -> Option<&mut Comment> {
        Comment::find_in(&mut self.roots, id)
    }

    /// Pre-order walk: each comment, then its replies, then its next sibling
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: vec![self.roots.iter()],
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Back to flat rows, in pre-order, with parent links pointing where each
    /// comment is actually attached
    ///
    /// `CommentTree::build(tree.flatten())` gives back a tree of the same shape.
    pub fn flatten(&self) -> Vec<api::Comment> {
        fn walk(comments: &[Comment], parent: Option<&CommentId>, out: &mut Vec<api::Comment>) {
            for c in comments {
                out.push(c.to_row(parent));
                walk(&c.replies, Some(&c.id), out);
            }
        }
        let mut res = Vec::new();
        walk(&self.roots, None, &mut res);
        res
    }
}

impl From<Vec<api::Comment>> for CommentTree {
    fn from(flat: Vec<api::Comment>) -> CommentTree {
        CommentTree::build(flat)
    }
}

impl<'a> IntoIterator for &'a CommentTree {
    type Item = &'a Comment;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    stack: Vec<std::slice::Iter<'a, Comment>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Comment;

    fn next(&mut self) -> Option<&'a Comment> {
        loop {
            match self.stack.last_mut()?.next() {
                Some(c) => {
                    self.stack.push(c.replies.iter());
                    return Some(c);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
