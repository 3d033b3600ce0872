use uuid::Uuid;

use crate::{Comment, Time, User, UserId};

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ArticleId(pub Uuid);

/// How an article is presented in the feed
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArticleFormat {
    #[default]
    Default,
    Featured,
    Highlight,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Article {
    pub id: ArticleId,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub blurb: Option<String>,
    #[serde(default)]
    pub format: ArticleFormat,
    pub authors: Vec<User>,

    pub likes: i64,

    /// Whether the user the article was fetched for likes it
    pub liked: bool,

    pub comment_count: u64,
    pub created_at: Time,
    pub updated_at: Time,

    /// Link to the original content this article is about
    pub source: String,
    pub live: bool,
}

impl Article {
    pub fn is_host(&self, user: &UserId) -> bool {
        self.authors.iter().any(|a| a.id == *user)
    }

    /// Flips the liked flag and moves the like counter along with it
    pub fn toggle_like(&mut self) {
        self.liked = !self.liked;
        match self.liked {
            true => self.likes += 1,
            false => self.likes -= 1,
        }
    }
}

/// An article along with all its comments, in no particular order
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Thread {
    pub article: Article,
    pub comments: Vec<Comment>,
}
