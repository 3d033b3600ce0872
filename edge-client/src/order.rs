use std::{cmp::Reverse, fmt, str::FromStr};

use crate::{
    api::{Article, Comment, Time},
    CommentNode,
};

/// Anything that can be ordered by popularity or recency
pub trait Ranked {
    fn likes(&self) -> i64;
    fn created_at(&self) -> Time;
}

impl Ranked for Comment {
    fn likes(&self) -> i64 {
        self.likes
    }

    fn created_at(&self) -> Time {
        self.created_at
    }
}

impl Ranked for CommentNode {
    fn likes(&self) -> i64 {
        self.comment.likes
    }

    fn created_at(&self) -> Time {
        self.comment.created_at
    }
}

impl Ranked for Article {
    fn likes(&self) -> i64 {
        self.likes
    }

    fn created_at(&self) -> Time {
        self.created_at
    }
}

/// Ordering of the questions and answers of an AMA
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SortMode {
    /// Most liked first
    #[default]
    Top,

    /// Most recent first
    New,
}

impl SortMode {
    pub fn label(&self) -> &'static str {
        match self {
            SortMode::Top => "Top questions",
            SortMode::New => "New questions",
        }
    }

    /// Stable: items that compare equal keep their relative order
    pub fn sort<T: Ranked>(&self, items: &mut [T]) {
        match self {
            SortMode::Top => items.sort_by_key(|i| Reverse(i.likes())),
            SortMode::New => items.sort_by_key(|i| Reverse(i.created_at())),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<SortMode> {
        match s.to_lowercase().as_str() {
            "top" | "top questions" => Ok(SortMode::Top),
            "new" | "new questions" => Ok(SortMode::New),
            _ => Err(anyhow::anyhow!("unknown sort mode {s:?}")),
        }
    }
}
