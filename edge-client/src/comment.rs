use std::collections::{HashMap, HashSet};

use crate::{
    api::{Comment, CommentId},
    SortMode,
};

/// A comment along with the replies to it, as displayed
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub comment: Comment,

    /// Direct replies, ordered by the sort mode the tree was formatted with
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Builds the forest of comments to display out of a flat comment list
    ///
    /// Comments whose parent is not in `comments` are dropped along with
    /// their replies. Deleted comments are only kept when they still have
    /// replies by a live author. If an id appears multiple times, only its
    /// first occurrence is used.
    pub fn format(comments: &[Comment], sort: SortMode) -> Vec<CommentNode> {
        let mut seen = HashSet::with_capacity(comments.len());
        let mut replies: HashMap<Option<CommentId>, Vec<&Comment>> = HashMap::new();
        for c in comments {
            if !seen.insert(c.id) {
                tracing::debug!(comment=?c.id, "ignoring duplicate comment");
                continue;
            }
            replies.entry(c.parent_id).or_default().push(c);
        }

        let res = build_forest(&replies, sort);
        let kept = res.iter().map(|n| n.len()).sum::<usize>();
        if kept != seen.len() {
            tracing::debug!(
                dropped = seen.len() - kept,
                "dropped unreachable or empty deleted comments"
            );
        }
        res
    }

    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    pub fn is_deleted(&self) -> bool {
        self.comment.is_deleted()
    }

    /// Number of comments in this subtree, including this one
    pub fn len(&self) -> usize {
        let mut res = 0;
        let mut todo = vec![self];
        while let Some(n) = todo.pop() {
            res += 1;
            todo.extend(n.children.iter());
        }
        res
    }

    /// Replies whose author did not delete them
    pub fn authored_children(&self) -> impl Iterator<Item = &CommentNode> {
        self.children.iter().filter(|c| !c.is_deleted())
    }

    pub fn find(&self, id: &CommentId) -> Option<&CommentNode> {
        CommentNode::find_in(std::slice::from_ref(self), id)
    }

    pub fn find_in<'a>(forest: &'a [CommentNode], id: &CommentId) -> Option<&'a CommentNode> {
        let mut todo = forest.iter().collect::<Vec<_>>();
        while let Some(n) = todo.pop() {
            if n.comment.id == *id {
                return Some(n);
            }
            todo.extend(n.children.iter());
        }
        None
    }
}

// Reply chains can be arbitrarily deep, so tear them down without recursing
impl Drop for CommentNode {
    fn drop(&mut self) {
        let mut todo = std::mem::take(&mut self.children);
        while let Some(mut n) = todo.pop() {
            todo.append(&mut n.children);
        }
    }
}

fn build_forest(
    replies: &HashMap<Option<CommentId>, Vec<&Comment>>,
    sort: SortMode,
) -> Vec<CommentNode> {
    // Parents come before their replies in `order`, and each reachable
    // comment appears exactly once as ids were deduplicated
    let mut order = Vec::new();
    let mut todo = replies.get(&None).cloned().unwrap_or_default();
    while let Some(c) = todo.pop() {
        order.push(c);
        todo.extend(replies.get(&Some(c.id)).into_iter().flatten());
    }

    let mut built: HashMap<CommentId, CommentNode> = HashMap::with_capacity(order.len());
    for c in order.into_iter().rev() {
        let children = collect_level(Some(c.id), replies, &mut built, sort);
        // Every kept child has a live author somewhere in its subtree, so an
        // empty list here means nothing below this comment is worth showing
        if c.is_deleted() && children.is_empty() {
            continue;
        }
        built.insert(
            c.id,
            CommentNode {
                comment: c.clone(),
                children,
            },
        );
    }
    collect_level(None, replies, &mut built, sort)
}

fn collect_level(
    parent: Option<CommentId>,
    replies: &HashMap<Option<CommentId>, Vec<&Comment>>,
    built: &mut HashMap<CommentId, CommentNode>,
    sort: SortMode,
) -> Vec<CommentNode> {
    let mut res = replies
        .get(&parent)
        .into_iter()
        .flatten()
        .filter_map(|c| built.remove(&c.id))
        .collect::<Vec<_>>();
    sort.sort(&mut res);
    res
}
