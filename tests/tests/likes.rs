mod common;

use common::*;
use edge_client::{
    api::{Action, Error as ApiError},
    Error, LikeOutcome, OverlayRequest,
};
use edge_mock_server::{Gate, MockApi};

#[tokio::test]
async fn like_is_visible_before_the_server_answers() {
    let h = Harness::new(thread(5, vec![]));
    let gate = Gate::new();
    let tok = h.token(2).await;
    let c = h
        .client_with(
            Some(2),
            MockApi::new(h.server.clone(), Some(tok)).with_gate(gate.clone()),
        )
        .await;

    let like = c.mutations.like_article(&c.session, key(), aid());
    let inspect = async {
        while gate.waiting() < 1 {
            tokio::task::yield_now().await;
        }
        let a = c.article();
        assert_eq!((a.liked, a.likes), (true, 6));
        gate.release(1);
    };
    let (outcome, ()) = futures::join!(like, inspect);
    assert!(matches!(outcome, LikeOutcome::Committed));

    let a = c.article();
    assert_eq!((a.liked, a.likes), (true, 6));
    let t = h.server.lock().await.fetch_thread(Some(tok), SLUG).unwrap();
    assert_eq!((t.article.liked, t.article.likes), (true, 6));
}

#[tokio::test]
async fn failed_like_restores_the_exact_snapshot() {
    let h = Harness::new(thread(5, vec![comment(1, None, Some(3), 2)]));
    let c = h.client(Some(2)).await;
    let before = c.query().peek(&key());

    h.server
        .lock()
        .await
        .fail_next_action(ApiError::Unknown(String::from("database is down")));
    let outcome = c.mutations.like_article(&c.session, key(), aid()).await;
    match outcome {
        LikeOutcome::RolledBack(Error::Api(ApiError::Unknown(_))) => (),
        o => panic!("unexpected outcome {o:?}"),
    }
    assert_eq!(c.query().peek(&key()), before);
    let a = c.article();
    assert_eq!((a.liked, a.likes), (false, 5));
    assert!(c.recorder.overlays.lock().is_empty());
}

#[tokio::test]
async fn unreachable_server_rolls_back_too() {
    let h = Harness::new(thread(5, vec![comment(1, None, Some(3), 2)]));
    let c = h.client(Some(2)).await;
    c.api.set_offline(true);
    let outcome = c.mutations.like_comment(&c.session, key(), cid(1)).await;
    assert!(matches!(outcome, LikeOutcome::RolledBack(Error::Transport(_))));
    let comment = c.comment(cid(1)).unwrap();
    assert_eq!((comment.liked, comment.likes), (false, 2));

    c.api.set_offline(false);
    let outcome = c.mutations.like_comment(&c.session, key(), cid(1)).await;
    assert!(matches!(outcome, LikeOutcome::Committed));
    let comment = c.comment(cid(1)).unwrap();
    assert_eq!((comment.liked, comment.likes), (true, 3));
}

#[tokio::test]
async fn double_like_before_settlement_ends_where_it_started() {
    let h = Harness::new(thread(5, vec![]));
    let gate = Gate::new();
    let tok = h.token(2).await;
    let c = h
        .client_with(
            Some(2),
            MockApi::new(h.server.clone(), Some(tok)).with_gate(gate.clone()),
        )
        .await;

    let first = c.mutations.like_article(&c.session, key(), aid());
    let second = c.mutations.like_article(&c.session, key(), aid());
    let inspect = async {
        while gate.waiting() < 2 {
            tokio::task::yield_now().await;
        }
        // Both toggles were applied speculatively, on top of each other
        let a = c.article();
        assert_eq!((a.liked, a.likes), (false, 5));
        gate.release(2);
    };
    let (first, second, ()) = futures::join!(first, second, inspect);
    assert!(matches!(first, LikeOutcome::Committed));
    assert!(matches!(second, LikeOutcome::Committed));

    let a = c.article();
    assert_eq!((a.liked, a.likes), (false, 5));
    let t = h.server.lock().await.fetch_thread(Some(tok), SLUG).unwrap();
    assert_eq!((t.article.liked, t.article.likes), (false, 5));
}

#[tokio::test]
async fn anonymous_like_only_asks_to_sign_in() {
    let h = Harness::new(thread(5, vec![]));
    let mut feed = {
        let tok = h.token(1).await;
        h.server.lock().await.action_feed(tok).await.unwrap()
    };
    let c = h.client(None).await;
    let writes = c.query().with_cache(|cache| cache.writes());

    let outcome = c.mutations.like_article(&c.session, key(), aid()).await;
    assert!(matches!(outcome, LikeOutcome::AuthenticationRequired));
    assert_eq!(c.query().with_cache(|cache| cache.writes()), writes);
    assert_eq!(*c.recorder.overlays.lock(), vec![OverlayRequest::Authentication]);
    assert!(feed.try_recv().is_err());
}

#[tokio::test]
async fn expired_session_rolls_back_and_asks_to_sign_in() {
    let h = Harness::new(thread(5, vec![]));
    let tok = h.token(2).await;
    let c = h
        .client_with(Some(2), MockApi::new(h.server.clone(), Some(tok)))
        .await;
    h.server.lock().await.unauth(tok).unwrap();

    let outcome = c.mutations.like_article(&c.session, key(), aid()).await;
    assert!(matches!(outcome, LikeOutcome::RolledBack(ref e) if e.is_unauthenticated()));
    // The refetch failed as well, so the rolled back value stays
    let a = c.article();
    assert_eq!((a.liked, a.likes), (false, 5));
    assert_eq!(*c.recorder.overlays.lock(), vec![OverlayRequest::Authentication]);
}

#[tokio::test]
async fn likes_from_other_users_show_up_after_settlement() {
    let h = Harness::new(thread(0, vec![]));
    let alice = h.client(Some(2)).await;
    let bob = h.client(Some(3)).await;
    let mut feed = {
        let tok = h.token(1).await;
        h.server.lock().await.action_feed(tok).await.unwrap()
    };

    bob.mutations.like_article(&bob.session, key(), aid()).await;
    alice.mutations.like_article(&alice.session, key(), aid()).await;

    let a = alice.article();
    assert_eq!((a.liked, a.likes), (true, 2));
    let b = bob.article();
    assert_eq!((b.liked, b.likes), (true, 1));
    assert_eq!(
        feed.try_recv().unwrap(),
        Action::LikeArticle {
            actor: user(3).id,
            article: aid()
        }
    );
}
