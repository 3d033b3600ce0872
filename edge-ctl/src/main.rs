use std::{io::BufRead, path::PathBuf, sync::Arc};

use anyhow::Context;
use edge_client::{
    api::{Article, AuthToken, CommentId, Thread, UserId, Uuid},
    group_by_day, pretty_hostname, walk, Alert, Alerts, Api, Clipboard, CommentNode, CommentRow,
    ConfirmAction, FeedOrder, Focus, HttpApi, LikeOutcome, LoginInfo, Mutations, Outcome,
    Overlay, OverlayRequest, QueryClient, QueryKey, RenderContext, RowKind, SortMode,
};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, default_value = "http://localhost:3000")]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// List the AMAs
    Amas,

    /// Show the article feed, one group per day
    Feed {
        /// Oldest articles first
        #[structopt(long)]
        earliest: bool,
    },

    /// Show an AMA along with its comments
    Show {
        slug: String,

        /// "top" or "new"
        #[structopt(short, long, default_value = "top")]
        sort: SortMode,
    },

    /// Show the comments of a thread dump, as written by generate-test-data
    Render {
        path: PathBuf,

        #[structopt(short, long, default_value = "top")]
        sort: SortMode,
    },

    /// Like an AMA, or remove your like
    LikeArticle { slug: String },

    /// Like a comment, or remove your like
    LikeComment { slug: String, comment: Uuid },

    /// Ask a question, or answer one with --parent
    Reply {
        slug: String,

        #[structopt(long)]
        parent: Option<Uuid>,

        content: String,
    },

    /// Change the content of one of your comments
    Edit {
        slug: String,
        comment: Uuid,
        content: String,
    },

    /// Delete one of your comments
    Delete {
        slug: String,
        comment: Uuid,

        /// Do not ask for confirmation
        #[structopt(short, long)]
        yes: bool,
    },

    /// Print the link to an AMA
    Share { slug: String },
}

/// Reads EDGE_USER and EDGE_TOKEN, both unset meaning anonymous browsing
fn login_info(host: &str) -> anyhow::Result<Option<LoginInfo>> {
    let (user, token) = match (std::env::var("EDGE_USER"), std::env::var("EDGE_TOKEN")) {
        (Err(_), Err(_)) => return Ok(None),
        (user, token) => (
            user.context("retrieving EDGE_USER environment variable")?,
            token.context("retrieving EDGE_TOKEN environment variable")?,
        ),
    };
    let user = Uuid::try_parse(&user).context("parsing EDGE_USER as a user id")?;
    let token = Uuid::try_parse(&token).context("parsing EDGE_TOKEN as an auth token")?;
    Ok(Some(LoginInfo {
        host: String::from(host),
        user: UserId(user),
        token: AuthToken(token),
    }))
}

/// Presentation collaborators for a terminal
///
/// There is no clipboard to rely on, so copied text is printed instead.
#[derive(Default)]
struct Terminal {
    confirmation: Mutex<Option<(String, ConfirmAction)>>,
}

impl Overlay for Terminal {
    fn show(&self, req: OverlayRequest) {
        match req {
            OverlayRequest::Authentication => {
                eprintln!("You need to sign in: set EDGE_USER and EDGE_TOKEN")
            }
            OverlayRequest::Confirmation {
                heading,
                text,
                confirm_label,
                action,
            } => {
                eprintln!("{heading}\n{text}");
                *self.confirmation.lock() = Some((confirm_label, action));
            }
        }
    }
}

impl Alerts for Terminal {
    fn show_alert(&self, alert: Alert) {
        eprintln!("{}", alert.text);
    }
}

impl Clipboard for Terminal {
    fn copy(&self, text: &str) -> anyhow::Result<()> {
        println!("{text}");
        Ok(())
    }
}

fn ask(label: &str) -> anyhow::Result<bool> {
    eprint!("{label}? [y/N] ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading answer from stdin")?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn print_rows(rows: &[CommentRow]) {
    for r in rows {
        let pad = "    ".repeat(r.depth);
        match &r.kind {
            RowKind::Placeholder { label } => println!("{pad}[{label}]"),
            RowKind::Comment {
                author,
                content,
                updated_at,
                liked,
                is_host,
                is_own,
                ..
            } => {
                let mut tags = Vec::new();
                if *is_host {
                    tags.push("host");
                }
                if *is_own {
                    tags.push("you");
                }
                let tags = match tags.is_empty() {
                    true => String::new(),
                    false => format!(" ({})", tags.join(", ")),
                };
                let likes = match (liked, &r.likes_label) {
                    (true, Some(l)) => format!(" ♥ {l}"),
                    (false, Some(l)) => format!(" ♡ {l}"),
                    (_, None) => String::new(),
                };
                println!(
                    "{pad}{}{tags} · {}{likes} · {}",
                    author.name,
                    updated_at.format("%Y-%m-%d %H:%M"),
                    r.id.0
                );
                for line in content.lines() {
                    println!("{pad}  {line}");
                }
            }
        }
    }
}

fn print_thread(thread: &Thread, sort: SortMode, viewer: Option<UserId>) {
    let a = &thread.article;
    println!("{} ({} likes)", a.title, a.likes);
    if let Some(blurb) = &a.blurb {
        println!("{blurb}");
    }
    println!("{}\n", sort.label());
    let forest = CommentNode::format(&thread.comments, sort);
    let ctx = RenderContext {
        article: a,
        viewer,
        focus: Focus::None,
    };
    print_rows(&walk(&forest, &ctx));
}

async fn fetch_thread(query: &QueryClient, key: &QueryKey) -> anyhow::Result<Thread> {
    let data = query
        .fetch(key.clone())
        .await
        .with_context(|| format!("fetching {key:?}"))?;
    data.as_thread()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("server did not answer {key:?} with a thread"))
}

async fn fetch_articles(query: &QueryClient, key: QueryKey) -> anyhow::Result<Vec<Article>> {
    let data = query
        .fetch(key.clone())
        .await
        .with_context(|| format!("fetching {key:?}"))?;
    data.as_articles()
        .map(|a| a.to_vec())
        .ok_or_else(|| anyhow::anyhow!("server did not answer {key:?} with articles"))
}

fn check_outcome(what: &str, outcome: Outcome) -> anyhow::Result<()> {
    match outcome {
        Outcome::Committed => Ok(()),
        Outcome::AuthenticationRequired => Err(anyhow::anyhow!("{what}: not signed in")),
        Outcome::Failed(e) => Err(e).context(String::from(what)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let http = match login_info(&opt.host)? {
        Some(login) => HttpApi::new(login),
        None => HttpApi::anonymous(opt.host.clone()),
    };
    let session = http.session();
    let api: Arc<dyn Api> = Arc::new(http);
    let query = QueryClient::new(api);
    let term = Arc::new(Terminal::default());
    let mutations = Mutations::new(query.clone(), term.clone(), term.clone(), term.clone());
    tracing::debug!(host=%opt.host, ?session, "starting");

    match opt.cmd {
        Command::Amas => {
            let amas = fetch_articles(&query, QueryKey::Amas).await?;
            for a in amas {
                println!(
                    "{}  {} likes, {} comments  /ama/{}",
                    a.title, a.likes, a.comment_count, a.slug
                );
            }
        }
        Command::Feed { earliest } => {
            let order = match earliest {
                true => FeedOrder::Earliest,
                false => FeedOrder::Latest,
            };
            let articles = fetch_articles(&query, QueryKey::Feed).await?;
            for g in group_by_day(articles, order, chrono::Utc::now()) {
                println!("{}", g.label);
                for a in g.articles {
                    let host = pretty_hostname(&a.source)
                        .unwrap_or_else(|_| String::from("unknown source"));
                    println!("  {}  ({host})", a.title);
                }
            }
        }
        Command::Show { slug, sort } => {
            let thread = fetch_thread(&query, &QueryKey::Ama(slug)).await?;
            print_thread(&thread, sort, session.user());
        }
        Command::Render { path, sort } => {
            let dump = std::fs::read_to_string(&path)
                .with_context(|| format!("reading thread dump {path:?}"))?;
            let thread: Thread = serde_json::from_str(&dump)
                .with_context(|| format!("parsing thread dump {path:?}"))?;
            print_thread(&thread, sort, session.user());
        }
        Command::LikeArticle { slug } => {
            let key = QueryKey::Ama(slug);
            let thread = fetch_thread(&query, &key).await?;
            match mutations
                .like_article(&session, key.clone(), thread.article.id)
                .await
            {
                LikeOutcome::Committed => {
                    let a = fetch_thread(&query, &key).await?.article;
                    let verb = if a.liked { "Liked" } else { "Unliked" };
                    println!("{verb} {} ({} likes)", a.title, a.likes);
                }
                LikeOutcome::AuthenticationRequired => anyhow::bail!("liking: not signed in"),
                LikeOutcome::RolledBack(e) => return Err(e).context("liking article"),
            }
        }
        Command::LikeComment { slug, comment } => {
            let key = QueryKey::Ama(slug);
            fetch_thread(&query, &key).await?;
            match mutations
                .like_comment(&session, key, CommentId(comment))
                .await
            {
                LikeOutcome::Committed => println!("Done"),
                LikeOutcome::AuthenticationRequired => anyhow::bail!("liking: not signed in"),
                LikeOutcome::RolledBack(e) => return Err(e).context("liking comment"),
            }
        }
        Command::Reply {
            slug,
            parent,
            content,
        } => {
            let key = QueryKey::Ama(slug);
            let thread = fetch_thread(&query, &key).await?;
            let outcome = mutations
                .reply(
                    &session,
                    key,
                    thread.article.id,
                    parent.map(CommentId),
                    content,
                )
                .await;
            check_outcome("replying", outcome)?;
        }
        Command::Edit {
            slug,
            comment,
            content,
        } => {
            let key = QueryKey::Ama(slug);
            fetch_thread(&query, &key).await?;
            let outcome = mutations
                .edit(&session, key, CommentId(comment), content)
                .await;
            check_outcome("editing", outcome)?;
        }
        Command::Delete { slug, comment, yes } => {
            let key = QueryKey::Ama(slug);
            fetch_thread(&query, &key).await?;
            if !mutations.request_delete(&session, CommentId(comment)) {
                anyhow::bail!("deleting: not signed in");
            }
            let pending = term.confirmation.lock().take();
            let (label, action) =
                pending.ok_or_else(|| anyhow::anyhow!("no confirmation was requested"))?;
            if yes || ask(&label)? {
                let outcome = mutations.confirm(&session, key, action).await;
                check_outcome("deleting", outcome)?;
            }
        }
        Command::Share { slug } => {
            let url = format!("{}/ama/{slug}", opt.host.trim_end_matches('/'));
            mutations.share(&url)?;
        }
    }

    Ok(())
}
