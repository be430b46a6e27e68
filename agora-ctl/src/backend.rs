use anyhow::Context;
use agora_client::{
    api::{self, CommunityId, Post, PostId},
    FeedPage, PageRange, POSTS_PER_PAGE,
};

/// REST client for the hosted backend's auto-generated table API
pub struct Backend {
    host: String,
    key: String,
    client: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct JoinedUser {
    username: Option<String>,
}

/// A comment row with the author's user row embedded
#[derive(serde::Deserialize)]
struct CommentRow {
    #[serde(flatten)]
    comment: api::Comment,
    users: Option<JoinedUser>,
}

impl From<CommentRow> for api::Comment {
    fn from(row: CommentRow) -> api::Comment {
        let mut c = row.comment;
        if c.username.is_none() {
            c.username = row.users.and_then(|u| u.username);
        }
        c
    }
}

fn ranked_query(range: PageRange, communities: &[CommunityId]) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("select", String::from("*")),
        ("is_promoted", String::from("eq.false")),
        ("order", String::from("hot_score.desc")),
        ("offset", range.from.to_string()),
        ("limit", POSTS_PER_PAGE.to_string()),
    ];
    if !communities.is_empty() {
        let ids = communities
            .iter()
            .map(|c| c.0.to_string())
            .collect::<Vec<_>>();
        query.push(("community_id", format!("in.({})", ids.join(","))));
    }
    query
}

fn api_key() -> anyhow::Result<String> {
    std::env::var("AGORA_API_KEY").context("retrieving AGORA_API_KEY environment variable")
}

impl Backend {
    pub fn new(host: String) -> anyhow::Result<Backend> {
        Ok(Backend {
            host: host.trim_end_matches('/').to_string(),
            key: api_key()?,
            client: reqwest::Client::new(),
        })
    }

    async fn get<R>(&self, table: &str, query: &[(&str, String)]) -> anyhow::Result<R>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        tracing::debug!(table, ?query, "querying backend");
        let resp = self
            .client
            .get(format!("{}/rest/v1/{}", self.host, table))
            .query(query)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await
            .with_context(|| format!("querying table {table}"))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .bytes()
                .await
                .with_context(|| format!("reading error body for table {table}"))?;
            let err = api::Error::parse(&body)
                .with_context(|| format!("backend returned {status} for table {table}"))?;
            return Err(err.into());
        }
        resp.json()
            .await
            .with_context(|| format!("parsing rows of table {table}"))
    }

    /// Comments of `post` in ascending creation order
    pub async fn fetch_comments(&self, post: PostId) -> anyhow::Result<Vec<api::Comment>> {
        let rows: Vec<CommentRow> = self
            .get(
                "comments",
                &[
                    ("select", String::from("*,users!comments_user_id_fkey(username)")),
                    ("post_id", format!("eq.{}", post.0)),
                    ("order", String::from("created_at.asc")),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(api::Comment::from).collect())
    }

    /// Ranked posts for `range` plus, on the first page, the promoted posts
    ///
    /// An empty `communities` means every community.
    pub async fn fetch_page(
        &self,
        range: PageRange,
        communities: &[CommunityId],
    ) -> anyhow::Result<FeedPage> {
        let regular: Vec<Post> = self
            .get("post_hot_scores", &ranked_query(range, communities))
            .await?;
        let promoted: Vec<Post> = match range.from {
            0 => {
                self.get(
                    "posts",
                    &[
                        ("select", String::from("*")),
                        ("is_promoted", String::from("eq.true")),
                        ("order", String::from("created_at.desc")),
                        ("limit", agora_client::feed::MAX_PROMOTED.to_string()),
                    ],
                )
                .await?
            }
            _ => Vec::new(),
        };
        Ok(FeedPage {
            offset: range.from,
            regular,
            promoted,
        })
    }
}
