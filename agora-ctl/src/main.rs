use std::path::{Path, PathBuf};

use agora_client::{
    api::{self, CommunityId, Dump, PostId, Time, Uuid},
    compute_hot_score, CommentTree, Feed, FeedPage, PageRange,
};
use anyhow::{anyhow, Context};
use rand::{rngs::StdRng, SeedableRng};

mod backend;
mod render;

use backend::Backend;

#[derive(structopt::StructOpt)]
struct Opt {
    /// Backend base URL, needs AGORA_API_KEY; without it data comes from --file
    #[structopt(short, long)]
    host: Option<String>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Compute the hot score of a vote tally
    Score {
        #[structopt(long)]
        upvotes: u32,

        #[structopt(long)]
        downvotes: u32,

        /// Creation time, RFC 3339
        #[structopt(long)]
        created_at: Time,
    },

    /// Print the comment thread of a post
    Thread {
        /// Post to show
        #[structopt(long)]
        post_id: Uuid,

        /// JSON dump to read comments from
        #[structopt(short, long, parse(from_os_str))]
        file: Option<PathBuf>,

        /// Print the nested thread as JSON
        #[structopt(long)]
        json: bool,
    },

    /// Print one page of the ranked feed
    Feed {
        /// JSON dump to read posts from
        #[structopt(short, long, parse(from_os_str))]
        file: Option<PathBuf>,

        #[structopt(long, default_value = "0")]
        offset: usize,

        /// Only show posts of these communities
        #[structopt(long)]
        community: Vec<i64>,

        /// Seed for promoted post placement
        #[structopt(long)]
        seed: Option<u64>,
    },
}

fn read_dump(path: &Path) -> anyhow::Result<Dump> {
    let data = std::fs::read(path).with_context(|| format!("reading dump {:?}", path))?;
    let dump: Dump =
        serde_json::from_slice(&data).with_context(|| format!("parsing dump {:?}", path))?;
    dump.validate()
        .with_context(|| format!("validating dump {:?}", path))?;
    Ok(dump)
}

async fn load_comments(
    host: Option<String>,
    post: PostId,
    file: Option<PathBuf>,
) -> anyhow::Result<Vec<api::Comment>> {
    match (host, file) {
        (Some(host), None) => {
            let comments = Backend::new(host)?.fetch_comments(post).await?;
            for c in &comments {
                c.validate()
                    .with_context(|| format!("validating comment {}", c.id))?;
            }
            Ok(comments)
        }
        (None, Some(file)) => Ok(read_dump(&file)?.comments_for(&post)),
        _ => Err(anyhow!("exactly one of --host and --file is needed")),
    }
}

async fn load_page(
    host: Option<String>,
    file: Option<PathBuf>,
    range: PageRange,
    communities: &[CommunityId],
) -> anyhow::Result<FeedPage> {
    match (host, file) {
        (Some(host), None) => Backend::new(host)?.fetch_page(range, communities).await,
        (None, Some(file)) => Ok(FeedPage::select(
            &read_dump(&file)?.posts,
            range.from,
            communities,
        )),
        _ => Err(anyhow!("exactly one of --host and --file is needed")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    match opt.cmd {
        Command::Score {
            upvotes,
            downvotes,
            created_at,
        } => {
            println!("{}", compute_hot_score(upvotes, downvotes, created_at));
        }
        Command::Thread {
            post_id,
            file,
            json,
        } => {
            let comments = load_comments(opt.host, PostId(post_id), file).await?;
            let tree = CommentTree::build(comments);
            if json {
                println!(
                    "{}",
                    render::thread_json(&tree).context("serializing thread")?
                );
            } else {
                print!("{}", render::thread_text(&tree));
            }
        }
        Command::Feed {
            file,
            offset,
            community,
            seed,
        } => {
            let communities = community.into_iter().map(CommunityId).collect::<Vec<_>>();
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let range = PageRange::for_offset(offset);
            let page = load_page(opt.host, file, range, &communities).await?;
            let mut feed = Feed::new();
            feed.apply_page(page, true, &mut rng);
            print!("{}", render::feed_text(&feed.posts, offset));
            if feed.has_more {
                eprintln!("more posts at --offset {}", feed.offset);
            }
        }
    }

    Ok(())
}
