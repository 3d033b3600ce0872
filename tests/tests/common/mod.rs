#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use edge_client::{
    api::{
        Article, ArticleFormat, ArticleId, AuthToken, Comment, CommentId, Error as ApiError,
        Thread, Time, User, UserId, Uuid,
    },
    Alert, Alerts, Clipboard, Mutations, Overlay, OverlayRequest, QueryClient, QueryKey, Session,
};
use edge_mock_server::{MockApi, MockServer};
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

pub const SLUG: &str = "ask-the-hosts";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn time(secs: i64) -> Time {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
}

pub fn user(n: u128) -> User {
    User {
        id: UserId(Uuid::from_u128(n)),
        name: format!("user{n}"),
        image: None,
    }
}

pub fn cid(n: u128) -> CommentId {
    CommentId(Uuid::from_u128(0x1000 + n))
}

pub fn aid() -> ArticleId {
    ArticleId(Uuid::from_u128(0xa))
}

pub fn key() -> QueryKey {
    QueryKey::Ama(String::from(SLUG))
}

pub fn comment(id: u128, parent: Option<u128>, author: Option<u128>, likes: i64) -> Comment {
    Comment {
        id: cid(id),
        article_id: aid(),
        parent_id: parent.map(cid),
        author: author.map(user),
        content: match author {
            Some(_) => format!("comment {id}"),
            None => String::new(),
        },
        likes,
        liked: false,
        created_at: time(id as i64),
        updated_at: time(id as i64),
    }
}

/// An AMA hosted by user 1, with `likes` anonymous likes
pub fn thread(likes: i64, comments: Vec<Comment>) -> Thread {
    Thread {
        article: Article {
            id: aid(),
            slug: String::from(SLUG),
            title: String::from("Ask the hosts"),
            content: String::from("Anything goes"),
            blurb: None,
            format: ArticleFormat::Default,
            authors: vec![user(1)],
            likes,
            liked: false,
            comment_count: 0,
            created_at: time(0),
            updated_at: time(0),
            source: String::from("https://www.example.org/"),
            live: true,
        },
        comments,
    }
}

#[derive(Default)]
pub struct Recorder {
    pub overlays: Mutex<Vec<OverlayRequest>>,
    pub alerts: Mutex<Vec<Alert>>,
    pub copied: Mutex<Vec<String>>,
}

impl Overlay for Recorder {
    fn show(&self, req: OverlayRequest) {
        self.overlays.lock().push(req);
    }
}

impl Alerts for Recorder {
    fn show_alert(&self, alert: Alert) {
        self.alerts.lock().push(alert);
    }
}

impl Clipboard for Recorder {
    fn copy(&self, text: &str) -> anyhow::Result<()> {
        self.copied.lock().push(String::from(text));
        Ok(())
    }
}

pub struct Client {
    pub session: Session,
    pub api: MockApi,
    pub recorder: Arc<Recorder>,
    pub mutations: Mutations,
}

impl Client {
    pub fn query(&self) -> &QueryClient {
        self.mutations.query()
    }

    pub fn article(&self) -> Article {
        let data = self.query().peek(&key()).expect("thread is not cached");
        data.as_thread().expect("cached data is not a thread").article.clone()
    }

    pub fn comment(&self, id: CommentId) -> Option<Comment> {
        let data = self.query().peek(&key())?;
        let t = data.as_thread()?;
        t.comments.iter().find(|c| c.id == id).cloned()
    }
}

pub struct Harness {
    pub server: Arc<AsyncMutex<MockServer>>,
}

impl Harness {
    pub fn new(thread: Thread) -> Harness {
        init_tracing();
        let mut server = MockServer::new();
        server.admin_load(thread).expect("loading thread");
        // The thread already brought its authors along
        for n in 1..=3 {
            match server.admin_create_user(user(n)) {
                Ok(()) | Err(ApiError::UuidAlreadyUsed(_)) => (),
                Err(e) => panic!("creating user {n}: {e}"),
            }
        }
        Harness {
            server: Arc::new(AsyncMutex::new(server)),
        }
    }

    pub async fn token(&self, who: u128) -> AuthToken {
        self.server
            .lock()
            .await
            .auth(user(who).id)
            .expect("authenticating")
    }

    /// A client signed in as user `who`, or anonymous, with the thread cached
    pub async fn client(&self, who: Option<u128>) -> Client {
        let token = match who {
            Some(n) => Some(self.token(n).await),
            None => None,
        };
        self.client_with(who, MockApi::new(self.server.clone(), token))
            .await
    }

    pub async fn client_with(&self, who: Option<u128>, api: MockApi) -> Client {
        let session = match who {
            Some(n) => Session::Authenticated(user(n).id),
            None => Session::Unauthenticated,
        };
        let recorder = Arc::new(Recorder::default());
        let query = QueryClient::new(Arc::new(api.clone()));
        query.fetch(key()).await.expect("fetching thread");
        let mutations = Mutations::new(query, recorder.clone(), recorder.clone(), recorder.clone());
        Client {
            session,
            api,
            recorder,
            mutations,
        }
    }
}
