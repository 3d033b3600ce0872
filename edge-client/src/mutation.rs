use std::sync::Arc;

use crate::{
    api::{self, Action, ArticleId, CommentId, NewComment, UserId, Uuid},
    Alert, AlertIcon, Alerts, Clipboard, ConfirmAction, Error, Overlay, OverlayRequest,
    QueryClient, QueryKey, Session, Snapshot,
};

#[derive(Debug)]
pub enum LikeOutcome {
    /// Nothing happened, the user was asked to sign in
    AuthenticationRequired,

    /// The server accepted the toggle
    Committed,

    /// The server refused or could not be reached; the cache was put back
    /// to its state from before the toggle
    RolledBack(Error),
}

#[derive(Debug)]
pub enum Outcome {
    AuthenticationRequired,
    Committed,
    Failed(Error),
}

/// User actions on articles and comments
///
/// Every action settles the query it was given once the server answered,
/// so that the cache reconciles with the server's state.
#[derive(Clone)]
pub struct Mutations {
    query: QueryClient,
    overlay: Arc<dyn Overlay>,
    alerts: Arc<dyn Alerts>,
    clipboard: Arc<dyn Clipboard>,
}

impl Mutations {
    pub fn new(
        query: QueryClient,
        overlay: Arc<dyn Overlay>,
        alerts: Arc<dyn Alerts>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Mutations {
        Mutations {
            query,
            overlay,
            alerts,
            clipboard,
        }
    }

    pub fn query(&self) -> &QueryClient {
        &self.query
    }

    fn actor(&self, session: &Session) -> Option<UserId> {
        let actor = session.user();
        if actor.is_none() {
            self.overlay.show(OverlayRequest::Authentication);
        }
        actor
    }

    /// Toggles the session user's like on an article cached under `key`
    pub async fn like_article(
        &self,
        session: &Session,
        key: QueryKey,
        article: ArticleId,
    ) -> LikeOutcome {
        let actor = match self.actor(session) {
            Some(actor) => actor,
            None => return LikeOutcome::AuthenticationRequired,
        };
        let snapshot = self
            .query
            .optimistic_update(&key, |data| data.toggle_article_like(article));
        self.finish_like(key, snapshot, Action::LikeArticle { actor, article })
            .await
    }

    /// Toggles the session user's like on a comment cached under `key`
    pub async fn like_comment(
        &self,
        session: &Session,
        key: QueryKey,
        comment: CommentId,
    ) -> LikeOutcome {
        let actor = match self.actor(session) {
            Some(actor) => actor,
            None => return LikeOutcome::AuthenticationRequired,
        };
        let snapshot = self
            .query
            .optimistic_update(&key, |data| data.toggle_comment_like(comment));
        self.finish_like(key, snapshot, Action::LikeComment { actor, comment })
            .await
    }

    async fn finish_like(
        &self,
        key: QueryKey,
        snapshot: Option<Snapshot>,
        action: Action,
    ) -> LikeOutcome {
        if snapshot.is_none() {
            tracing::debug!(?key, ?action, "liked resource is not cached, no optimistic update");
        }
        let res = self.query.api().submit_action(action).await;
        let outcome = match res {
            Ok(()) => LikeOutcome::Committed,
            Err(err) => {
                match err.is_rejection() {
                    true => tracing::warn!(?key, ?err, "server rejected like"),
                    false => tracing::warn!(?key, ?err, "failed sending like"),
                }
                if let Some(snapshot) = snapshot {
                    self.query.rollback(snapshot);
                }
                if err.is_unauthenticated() {
                    self.overlay.show(OverlayRequest::Authentication);
                }
                LikeOutcome::RolledBack(err)
            }
        };
        self.query.settle(key).await;
        outcome
    }

    /// Posts a reply to `parent`, or a new question if `parent` is `None`
    pub async fn reply(
        &self,
        session: &Session,
        key: QueryKey,
        article: ArticleId,
        parent: Option<CommentId>,
        content: String,
    ) -> Outcome {
        if self.actor(session).is_none() {
            return Outcome::AuthenticationRequired;
        }
        let comment = NewComment {
            id: CommentId(Uuid::new_v4()),
            article_id: article,
            parent_id: parent,
            content,
        };
        if let Err(e) = comment.validate() {
            return Outcome::Failed(Error::Api(e));
        }
        self.submit(key, Action::NewComment(comment)).await
    }

    /// Replaces the content of one of the session user's comments
    pub async fn edit(
        &self,
        session: &Session,
        key: QueryKey,
        comment: CommentId,
        content: String,
    ) -> Outcome {
        let actor = match self.actor(session) {
            Some(actor) => actor,
            None => return Outcome::AuthenticationRequired,
        };
        if let Err(e) = api::validate_content(&content) {
            return Outcome::Failed(Error::Api(e));
        }
        if !self.may_modify(&key, actor, comment) {
            return Outcome::Failed(Error::Api(api::Error::PermissionDenied));
        }
        self.submit(key, Action::EditComment { comment, content })
            .await
    }

    /// Asks the user to confirm deleting one of their comments
    ///
    /// Returns whether a confirmation was requested. Deletion itself happens
    /// through `confirm`, once the user accepted.
    pub fn request_delete(&self, session: &Session, comment: CommentId) -> bool {
        if self.actor(session).is_none() {
            return false;
        }
        self.overlay.show(OverlayRequest::Confirmation {
            heading: String::from("Deleting your comment"),
            text: String::from(
                "Are you sure you want to delete this comment? This cannot be undone. \
                 Any replies you may have received will remain visible.",
            ),
            confirm_label: String::from("Delete"),
            action: ConfirmAction::DeleteComment(comment),
        });
        true
    }

    pub async fn confirm(&self, session: &Session, key: QueryKey, action: ConfirmAction) -> Outcome {
        let actor = match self.actor(session) {
            Some(actor) => actor,
            None => return Outcome::AuthenticationRequired,
        };
        match action {
            ConfirmAction::DeleteComment(comment) => {
                if !self.may_modify(&key, actor, comment) {
                    return Outcome::Failed(Error::Api(api::Error::PermissionDenied));
                }
                self.submit(key, Action::DeleteComment(comment)).await
            }
        }
    }

    /// Copies `url` to the clipboard and lets the user know
    pub fn share(&self, url: &str) -> anyhow::Result<()> {
        self.clipboard.copy(url)?;
        self.alerts.show_alert(Alert {
            icon: AlertIcon::Share,
            text: String::from("Link copied to clipboard"),
        });
        Ok(())
    }

    // Comments that are not in the cache are left for the server to judge
    fn may_modify(&self, key: &QueryKey, actor: UserId, comment: CommentId) -> bool {
        self.query.with_cache(|cache| {
            let author = cache
                .get(key)
                .and_then(|d| d.as_thread())
                .and_then(|t| t.comments.iter().find(|c| c.id == comment))
                .map(|c| c.author.as_ref().map(|a| a.id));
            match author {
                None => true,
                Some(author) => author == Some(actor),
            }
        })
    }

    async fn submit(&self, key: QueryKey, action: Action) -> Outcome {
        let name = action.name();
        let res = self.query.api().submit_action(action).await;
        let outcome = match res {
            Ok(()) => Outcome::Committed,
            Err(err) => {
                tracing::warn!(?key, ?err, "{name} action failed");
                if err.is_unauthenticated() {
                    self.overlay.show(OverlayRequest::Authentication);
                }
                Outcome::Failed(err)
            }
        };
        self.query.settle(key).await;
        outcome
    }
}
