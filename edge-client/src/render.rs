use crate::{
    api::{Article, CommentId, Time, User, UserId},
    CommentNode,
};

/// Horizontal offset of replies, in pixels
///
/// Only the first level of replies is indented, deeper replies line up with
/// their parent.
pub const INDENT_STEP: u32 = 42;

/// What the user is currently typing, if anything
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Focus {
    #[default]
    None,
    Replying(CommentId),
    Editing(CommentId),
}

impl Focus {
    pub fn target(&self) -> Option<CommentId> {
        match self {
            Focus::None => None,
            Focus::Replying(id) | Focus::Editing(id) => Some(*id),
        }
    }
}

pub struct RenderContext<'a> {
    pub article: &'a Article,

    /// User of the current session
    pub viewer: Option<UserId>,

    pub focus: Focus,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RowKind {
    Comment {
        author: User,
        content: String,
        updated_at: Time,
        liked: bool,

        /// The author is one of the hosts of the AMA
        is_host: bool,

        /// The author is the viewer, who may thus edit or delete it
        is_own: bool,

        editing: bool,
    },

    /// Stands in for a deleted comment that still has replies
    Placeholder { label: &'static str },
}

/// One line of the comment list, in display order
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentRow {
    pub id: CommentId,
    pub depth: usize,
    pub indent: u32,
    pub kind: RowKind,
    pub has_replies: bool,

    /// Draw the line linking a top-level comment to its replies
    pub connector: bool,

    /// Draw the curve leading into the first reply of a comment
    pub first_reply: bool,

    pub dimmed: bool,
    pub interactive: bool,

    /// Hidden when nobody likes the comment
    pub likes_label: Option<String>,

    pub reply_label: &'static str,
}

/// Flattens a formatted forest into rows, parents before their replies
pub fn walk(forest: &[CommentNode], ctx: &RenderContext<'_>) -> Vec<CommentRow> {
    let mut rows = Vec::new();
    let mut todo = forest.iter().enumerate().rev().map(|(i, n)| (n, 0, i)).collect::<Vec<_>>();
    while let Some((node, depth, index)) = todo.pop() {
        rows.push(row(node, depth, index, ctx));
        todo.extend(
            node.children
                .iter()
                .enumerate()
                .rev()
                .map(|(i, c)| (c, depth + 1, i)),
        );
    }
    rows
}

fn row(node: &CommentNode, depth: usize, index: usize, ctx: &RenderContext<'_>) -> CommentRow {
    let c = &node.comment;
    let focused = ctx.focus.target() == Some(c.id);
    let dimmed = ctx.focus != Focus::None && !focused;
    let indent = match depth {
        0 => 0,
        _ => INDENT_STEP,
    };
    let (kind, has_replies, interactive) = match &c.author {
        None => {
            let label = match c.parent_id {
                Some(_) => "This response was deleted by the author.",
                None => "This question was deleted by the author.",
            };
            (
                RowKind::Placeholder { label },
                !node.children.is_empty(),
                false,
            )
        }
        Some(author) => (
            RowKind::Comment {
                author: author.clone(),
                content: c.content.clone(),
                updated_at: c.updated_at,
                liked: c.liked,
                is_host: ctx.article.is_host(&author.id),
                is_own: ctx.viewer == Some(author.id),
                editing: ctx.focus == Focus::Editing(c.id),
            },
            node.authored_children().next().is_some(),
            !dimmed,
        ),
    };
    CommentRow {
        id: c.id,
        depth,
        indent,
        kind,
        has_replies,
        connector: has_replies && depth == 0,
        first_reply: depth == 1 && index == 0,
        dimmed,
        interactive,
        likes_label: (c.likes > 0).then(|| c.likes.to_string()),
        reply_label: match focused {
            true => "Replying to...",
            false => "Reply",
        },
    }
}
