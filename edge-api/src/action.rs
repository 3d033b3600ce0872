use crate::{ArticleId, CommentId, Error, NewComment, UserId};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub enum Action {
    /// Toggles `actor`'s like on the article
    LikeArticle {
        actor: UserId,
        article: ArticleId,
    },
    /// Toggles `actor`'s like on the comment
    LikeComment {
        actor: UserId,
        comment: CommentId,
    },
    NewComment(NewComment),
    EditComment {
        comment: CommentId,
        content: String,
    },
    DeleteComment(CommentId),
}

impl Action {
    // Only checks what can be checked without a database; permissions are
    // the server's business
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Action::LikeArticle { .. } | Action::LikeComment { .. } => Ok(()),
            Action::NewComment(c) => c.validate(),
            Action::EditComment { content, .. } => crate::validate_content(content),
            Action::DeleteComment(_) => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::LikeArticle { .. } => "like-article",
            Action::LikeComment { .. } => "like-comment",
            Action::NewComment(_) => "new-comment",
            Action::EditComment { .. } => "edit-comment",
            Action::DeleteComment(_) => "delete-comment",
        }
    }
}
