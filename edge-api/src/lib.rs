use chrono::Utc;

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod action;
pub use action::Action;

mod article;
pub use article::{Article, ArticleFormat, ArticleId, Thread};

mod auth;
pub use auth::AuthToken;

mod comment;
pub use comment::{Comment, CommentId, NewComment};

mod error;
pub use error::Error;

mod user;
pub use user::{User, UserId};

/// Upper bound on the length of any user-submitted text, in bytes
pub const MAX_CONTENT_LEN: usize = 10_000;

// Strings are sent verbatim to the database, which rejects null bytes
pub fn validate_string(s: &str) -> Result<(), Error> {
    if s.contains('\0') {
        return Err(Error::NullByteInString(String::from(s)));
    }
    Ok(())
}

pub fn validate_content(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    if s.trim().is_empty() {
        return Err(Error::EmptyContent);
    }
    if s.len() > MAX_CONTENT_LEN {
        return Err(Error::ContentTooLong(s.len()));
    }
    Ok(())
}

/// Turns an article title into the slug used in `/ama/<slug>` links
///
/// Every run of characters that is not ascii-alphanumeric becomes a single
/// dash, and leading or trailing dashes are dropped.
pub fn slugify(title: &str) -> String {
    let mut res = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !res.is_empty() {
                res.push('-');
            }
            pending_dash = false;
            res.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    res
}
