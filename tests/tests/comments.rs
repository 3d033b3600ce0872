mod common;

use common::*;
use edge_client::{
    api::{Action, Error as ApiError},
    walk, CommentNode, ConfirmAction, Error, Focus, Outcome, OverlayRequest, RenderContext,
    RowKind, SortMode,
};

fn forest(c: &Client, sort: SortMode) -> Vec<CommentNode> {
    let data = c.query().peek(&key()).unwrap();
    CommentNode::format(&data.as_thread().unwrap().comments, sort)
}

#[tokio::test]
async fn three_comment_thread_end_to_end() {
    // A question, a deleted answer to it, and a reply to the deleted answer
    let h = Harness::new(thread(
        0,
        vec![
            comment(1, None, Some(2), 0),
            comment(2, Some(1), None, 0),
            comment(3, Some(2), Some(3), 0),
        ],
    ));
    let c = h.client(None).await;
    let forest = forest(&c, SortMode::Top);
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].id(), cid(1));
    assert_eq!(forest[0].children.len(), 1);
    assert!(forest[0].children[0].is_deleted());
    assert_eq!(forest[0].children[0].children[0].id(), cid(3));

    let article = c.article();
    let rows = walk(
        &forest,
        &RenderContext {
            article: &article,
            viewer: None,
            focus: Focus::None,
        },
    );
    let shape = rows
        .iter()
        .map(|r| (r.id, r.depth, r.indent))
        .collect::<Vec<_>>();
    assert_eq!(
        shape,
        vec![(cid(1), 0, 0), (cid(2), 1, 42), (cid(3), 2, 42)]
    );
    assert_eq!(
        rows[1].kind,
        RowKind::Placeholder {
            label: "This response was deleted by the author."
        }
    );
}

#[tokio::test]
async fn reply_shows_up_in_the_tree_after_settlement() {
    let h = Harness::new(thread(0, vec![comment(1, None, Some(3), 0)]));
    let c = h.client(Some(2)).await;
    let outcome = c
        .mutations
        .reply(
            &c.session,
            key(),
            aid(),
            Some(cid(1)),
            String::from("Good question"),
        )
        .await;
    assert!(matches!(outcome, Outcome::Committed));

    let forest = forest(&c, SortMode::New);
    let reply = &forest[0].children[0];
    assert_eq!(reply.comment.content, "Good question");
    assert_eq!(reply.comment.author, Some(user(2)));
    assert_eq!(c.article().comment_count, 2);
}

#[tokio::test]
async fn edit_replaces_content() {
    let h = Harness::new(thread(0, vec![comment(1, None, Some(2), 0)]));
    let c = h.client(Some(2)).await;
    let outcome = c
        .mutations
        .edit(&c.session, key(), cid(1), String::from("Rephrased"))
        .await;
    assert!(matches!(outcome, Outcome::Committed));
    assert_eq!(c.comment(cid(1)).unwrap().content, "Rephrased");

    let other = h.client(Some(3)).await;
    let outcome = other
        .mutations
        .edit(&other.session, key(), cid(1), String::from("Hijacked"))
        .await;
    assert!(matches!(
        outcome,
        Outcome::Failed(Error::Api(ApiError::PermissionDenied))
    ));
}

#[tokio::test]
async fn deleting_keeps_answered_questions_as_placeholders() {
    let h = Harness::new(thread(
        0,
        vec![
            comment(1, None, Some(2), 0),
            comment(2, Some(1), Some(3), 0),
            comment(3, None, Some(2), 0),
        ],
    ));
    let c = h.client(Some(2)).await;
    let host = h.token(1).await;
    let mut feed = h.server.lock().await.action_feed(host).await.unwrap();

    for id in [cid(1), cid(3)] {
        assert!(c.mutations.request_delete(&c.session, id));
        let action = match c.recorder.overlays.lock().pop() {
            Some(OverlayRequest::Confirmation {
                heading,
                confirm_label,
                action,
                ..
            }) => {
                assert_eq!(heading, "Deleting your comment");
                assert_eq!(confirm_label, "Delete");
                action
            }
            o => panic!("unexpected overlay {o:?}"),
        };
        assert_eq!(action, ConfirmAction::DeleteComment(id));
        let outcome = c.mutations.confirm(&c.session, key(), action).await;
        assert!(matches!(outcome, Outcome::Committed));
        assert_eq!(feed.try_recv().unwrap(), Action::DeleteComment(id));
    }

    let forest = forest(&c, SortMode::Top);
    assert_eq!(forest.len(), 1);
    assert!(forest[0].is_deleted());
    assert_eq!(forest[0].children[0].id(), cid(2));
    assert_eq!(c.article().comment_count, 1);
}

#[tokio::test]
async fn sort_mode_applies_at_every_depth() {
    let h = Harness::new(thread(
        0,
        vec![
            comment(1, None, Some(2), 1),
            comment(2, None, Some(3), 5),
            comment(3, Some(2), Some(2), 0),
            comment(4, Some(2), Some(3), 9),
            comment(5, Some(2), Some(2), 0),
        ],
    ));
    let c = h.client(None).await;

    let top = forest(&c, SortMode::Top);
    assert_eq!(top.iter().map(|n| n.id()).collect::<Vec<_>>(), vec![cid(2), cid(1)]);
    assert_eq!(
        top[0].children.iter().map(|n| n.id()).collect::<Vec<_>>(),
        vec![cid(4), cid(3), cid(5)]
    );

    let new = forest(&c, SortMode::New);
    assert_eq!(new.iter().map(|n| n.id()).collect::<Vec<_>>(), vec![cid(2), cid(1)]);
    assert_eq!(
        new[0].children.iter().map(|n| n.id()).collect::<Vec<_>>(),
        vec![cid(5), cid(4), cid(3)]
    );
}

#[tokio::test]
async fn share_copies_the_link() {
    let h = Harness::new(thread(0, vec![]));
    let c = h.client(None).await;
    c.mutations
        .share(&format!("https://edge.example.org/ama/{SLUG}"))
        .unwrap();
    assert_eq!(
        *c.recorder.copied.lock(),
        vec![format!("https://edge.example.org/ama/{SLUG}")]
    );
    assert_eq!(c.recorder.alerts.lock()[0].text, "Link copied to clipboard");
}
