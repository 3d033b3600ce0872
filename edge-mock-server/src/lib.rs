use std::collections::{btree_map, BTreeMap, HashSet, VecDeque};

use chrono::Utc;
use edge_client::api::{
    Action, Article, ArticleId, AuthToken, Comment, CommentId, Error, NewComment, Thread, User,
    UserId, Uuid,
};
use tokio::sync::mpsc;

mod remote;
pub use remote::{Gate, MockApi};

/// In-memory stand-in for the real server
///
/// Likes are stored per user, so the `liked` flag of what is returned
/// depends on who asks. Counters seeded through `admin_*` are kept as-is
/// and moved by the likes submitted afterwards.
pub struct MockServer {
    users: BTreeMap<UserId, DbUser>,
    articles: BTreeMap<ArticleId, Article>,
    comments: BTreeMap<CommentId, Comment>,
    article_likes: HashSet<(UserId, ArticleId)>,
    comment_likes: HashSet<(UserId, CommentId)>,

    /// Errors the next submitted actions will fail with, in order
    failures: VecDeque<Error>,
}

#[derive(Debug)]
struct DbUser {
    user: User,
    sessions: HashSet<AuthToken>,
    feeds: Vec<mpsc::UnboundedSender<Action>>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer {
            users: BTreeMap::new(),
            articles: BTreeMap::new(),
            comments: BTreeMap::new(),
            article_likes: HashSet::new(),
            comment_likes: HashSet::new(),
            failures: VecDeque::new(),
        }
    }

    pub fn test_num_users(&self) -> usize {
        self.users.len()
    }

    pub fn admin_create_user(&mut self, u: User) -> Result<(), Error> {
        edge_client::api::validate_string(&u.name)?;
        match self.users.entry(u.id) {
            btree_map::Entry::Occupied(_) => Err(Error::UuidAlreadyUsed(u.id.0)),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(DbUser {
                    user: u,
                    sessions: HashSet::new(),
                    feeds: Vec::new(),
                });
                Ok(())
            }
        }
    }

    pub fn admin_create_article(&mut self, a: Article) -> Result<(), Error> {
        if self.articles.contains_key(&a.id) {
            return Err(Error::UuidAlreadyUsed(a.id.0));
        }
        self.articles.insert(a.id, a);
        Ok(())
    }

    /// Inserts a comment verbatim, including dangling or deleted ones
    pub fn admin_create_comment(&mut self, c: Comment) -> Result<(), Error> {
        if self.comments.contains_key(&c.id) {
            return Err(Error::UuidAlreadyUsed(c.id.0));
        }
        if !self.articles.contains_key(&c.article_id) {
            return Err(Error::NotFound(format!("article {:?}", c.article_id)));
        }
        self.comments.insert(c.id, c);
        Ok(())
    }

    /// Seeds a whole thread, creating the users it mentions
    pub fn admin_load(&mut self, t: Thread) -> Result<(), Error> {
        let authors = t
            .article
            .authors
            .iter()
            .chain(t.comments.iter().filter_map(|c| c.author.as_ref()));
        for u in authors {
            if !self.users.contains_key(&u.id) {
                self.admin_create_user(u.clone())?;
            }
        }
        self.admin_create_article(t.article)?;
        for c in t.comments {
            self.admin_create_comment(c)?;
        }
        Ok(())
    }

    pub fn auth(&mut self, user: UserId) -> Result<AuthToken, Error> {
        let u = self.users.get_mut(&user).ok_or(Error::PermissionDenied)?;
        let tok = AuthToken(Uuid::new_v4());
        u.sessions.insert(tok);
        Ok(tok)
    }

    fn resolve(&self, tok: AuthToken) -> Result<UserId, Error> {
        self.users
            .values()
            .find(|u| u.sessions.contains(&tok))
            .map(|u| u.user.id)
            .ok_or(Error::Unauthenticated)
    }

    fn viewer(&self, tok: Option<AuthToken>) -> Result<Option<UserId>, Error> {
        tok.map(|t| self.resolve(t)).transpose()
    }

    pub fn unauth(&mut self, tok: AuthToken) -> Result<(), Error> {
        let uid = self.resolve(tok)?;
        if let Some(u) = self.users.get_mut(&uid) {
            u.sessions.remove(&tok);
        }
        Ok(())
    }

    pub fn whoami(&self, tok: AuthToken) -> Result<UserId, Error> {
        self.resolve(tok)
    }

    /// Makes the next submitted action fail with `e`, before it is applied
    pub fn fail_next_action(&mut self, e: Error) {
        self.failures.push_back(e);
    }

    fn article_for(&self, a: &Article, viewer: Option<UserId>) -> Article {
        let mut a = a.clone();
        a.liked = viewer.map_or(false, |v| self.article_likes.contains(&(v, a.id)));
        a.comment_count = self
            .comments
            .values()
            .filter(|c| c.article_id == a.id && !c.is_deleted())
            .count() as u64;
        a
    }

    fn articles_for(&self, viewer: Option<UserId>, live_only: bool) -> Vec<Article> {
        let mut res = self
            .articles
            .values()
            .filter(|a| a.live || !live_only)
            .map(|a| self.article_for(a, viewer))
            .collect::<Vec<_>>();
        res.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        res
    }

    pub fn fetch_amas(&self, tok: Option<AuthToken>) -> Result<Vec<Article>, Error> {
        let viewer = self.viewer(tok)?;
        Ok(self.articles_for(viewer, true))
    }

    pub fn fetch_feed(&self, tok: Option<AuthToken>) -> Result<Vec<Article>, Error> {
        let viewer = self.viewer(tok)?;
        Ok(self.articles_for(viewer, false))
    }

    pub fn fetch_thread(&self, tok: Option<AuthToken>, slug: &str) -> Result<Thread, Error> {
        let viewer = self.viewer(tok)?;
        let article = self
            .articles
            .values()
            .find(|a| a.slug == slug)
            .ok_or_else(|| Error::NotFound(format!("ama/{slug}")))?;
        let comments = self
            .comments
            .values()
            .filter(|c| c.article_id == article.id)
            .map(|c| {
                let mut c = c.clone();
                c.liked = viewer.map_or(false, |v| self.comment_likes.contains(&(v, c.id)));
                c
            })
            .collect();
        Ok(Thread {
            article: self.article_for(article, viewer),
            comments,
        })
    }

    fn own_comment(&mut self, user: UserId, id: CommentId) -> Result<&mut Comment, Error> {
        let c = self
            .comments
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("comment {id:?}")))?;
        match &c.author {
            Some(a) if a.id == user => Ok(c),
            _ => Err(Error::PermissionDenied),
        }
    }

    fn new_comment(&mut self, user: UserId, c: NewComment) -> Result<(), Error> {
        if self.comments.contains_key(&c.id) {
            return Err(Error::UuidAlreadyUsed(c.id.0));
        }
        if !self.articles.contains_key(&c.article_id) {
            return Err(Error::NotFound(format!("article {:?}", c.article_id)));
        }
        if let Some(parent) = c.parent_id {
            match self.comments.get(&parent) {
                Some(p) if p.article_id == c.article_id => (),
                _ => return Err(Error::NotFound(format!("comment {parent:?}"))),
            }
        }
        let author = self
            .users
            .get(&user)
            .map(|u| u.user.clone())
            .ok_or(Error::Unauthenticated)?;
        let now = Utc::now();
        self.comments.insert(
            c.id,
            Comment {
                id: c.id,
                article_id: c.article_id,
                parent_id: c.parent_id,
                author: Some(author),
                content: c.content,
                likes: 0,
                liked: false,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    fn apply(&mut self, user: UserId, a: Action) -> Result<(), Error> {
        match a {
            Action::LikeArticle { actor, article } => {
                if actor != user {
                    return Err(Error::PermissionDenied);
                }
                let a = self
                    .articles
                    .get_mut(&article)
                    .ok_or_else(|| Error::NotFound(format!("article {article:?}")))?;
                match self.article_likes.insert((actor, article)) {
                    true => a.likes += 1,
                    false => {
                        self.article_likes.remove(&(actor, article));
                        a.likes -= 1;
                    }
                }
            }
            Action::LikeComment { actor, comment } => {
                if actor != user {
                    return Err(Error::PermissionDenied);
                }
                let c = self
                    .comments
                    .get_mut(&comment)
                    .ok_or_else(|| Error::NotFound(format!("comment {comment:?}")))?;
                match self.comment_likes.insert((actor, comment)) {
                    true => c.likes += 1,
                    false => {
                        self.comment_likes.remove(&(actor, comment));
                        c.likes -= 1;
                    }
                }
            }
            Action::NewComment(c) => self.new_comment(user, c)?,
            Action::EditComment { comment, content } => {
                let c = self.own_comment(user, comment)?;
                c.content = content;
                c.updated_at = Utc::now();
            }
            Action::DeleteComment(comment) => {
                let c = self.own_comment(user, comment)?;
                c.soft_delete();
                c.likes = 0;
                self.comment_likes.retain(|(_, c)| *c != comment);
            }
        }
        Ok(())
    }

    pub async fn submit_action(&mut self, tok: AuthToken, a: Action) -> Result<(), Error> {
        let user = self.resolve(tok)?;
        if let Some(e) = self.failures.pop_front() {
            tracing::debug!(action = a.name(), ?e, "injecting failure");
            return Err(e);
        }
        a.validate()?;
        self.apply(user, a.clone())?;
        self.relay_action(a).await;
        Ok(())
    }

    async fn relay_action(&mut self, a: Action) {
        for u in self.users.values_mut() {
            u.feeds.retain(|f| f.send(a.clone()).is_ok());
        }
    }

    /// Every action successfully submitted from now on, by anyone
    pub async fn action_feed(
        &mut self,
        tok: AuthToken,
    ) -> Result<mpsc::UnboundedReceiver<Action>, Error> {
        let uid = self.resolve(tok)?;
        let (sender, receiver) = mpsc::unbounded_channel();
        if let Some(u) = self.users.get_mut(&uid) {
            u.feeds.push(sender);
        }
        Ok(receiver)
    }
}

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}
