use uuid::Uuid;

use crate::{ArticleId, Error, Time, User};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,

    /// `None` for top-level questions
    pub parent_id: Option<CommentId>,

    /// `None` once the author deleted the comment; the row stays so that
    /// replies keep their place in the thread
    pub author: Option<User>,

    pub content: String,
    pub likes: i64,
    pub liked: bool,
    pub created_at: Time,
    pub updated_at: Time,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.author.is_none()
    }

    /// Flips the liked flag and moves the like counter along with it
    pub fn toggle_like(&mut self) {
        self.liked = !self.liked;
        match self.liked {
            true => self.likes += 1,
            false => self.likes -= 1,
        }
    }

    /// Clears everything that identifies the author, keeping the position
    /// of the comment in its thread
    pub fn soft_delete(&mut self) {
        self.author = None;
        self.content = String::new();
        self.liked = false;
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewComment {
    /// Chosen by the client, so that the comment can be referred to before
    /// the server acknowledged it
    pub id: CommentId,
    pub article_id: ArticleId,
    pub parent_id: Option<CommentId>,
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)
    }
}
