//! Writer verification and publishing flows.

use chrono::{Duration, Utc};

use ultre_core::PostId;
use ultre_integration_tests::{test_app, test_binder};
use ultre_storefront::Action;
use ultre_storefront::dom::Region;
use ultre_storefront::services::blog::EXCERPT_LENGTH;
use ultre_storefront::storage::keys;

#[test]
fn empty_store_renders_the_three_seeded_posts() {
    let (app, _) = test_app();

    let rendered = app.blog().render_posts(Some("all"));
    assert_eq!(rendered.len(), 3);
    assert_eq!(
        rendered[0].title,
        "Style Tips for 2025: Minimalist Streetwear"
    );

    for summary in &rendered {
        assert!(summary.excerpt.chars().count() <= EXCERPT_LENGTH);
        assert!(!summary.excerpt.contains('<'));
    }
}

#[test]
fn writer_verifies_and_publishes_to_the_front_of_the_list() {
    let (binder, delivery) = test_binder();
    let app = binder.app();

    app.blog()
        .request_code("Ada Lovelace", "ada@example.com")
        .expect("code request");
    let code = delivery.last_code();
    assert_eq!(code.len(), 6);

    // Publishing before verification is rejected.
    let err = app
        .blog()
        .publish("Fresh", "ada@example.com", "<p>New</p>")
        .expect_err("unverified writer");
    assert!(matches!(
        err,
        ultre_storefront::services::blog::BlogError::UnverifiedWriter
    ));

    app.blog()
        .verify("ada@example.com", &code)
        .expect("verification");

    let writer = &app.blog().writers()[0];
    assert!(writer.verified);
    assert!(writer.code.is_none());
    assert!(writer.code_sent_at.is_none());

    let post = app
        .blog()
        .publish("Fresh", "ada@example.com", "<p>New</p>")
        .expect("publish");

    let rendered = app.blog().render_posts(None);
    assert_eq!(rendered[0].id, post.id);
    assert_eq!(rendered[0].author, "Ada Lovelace");
    assert!(rendered[0].verified);
    assert_eq!(rendered.len(), 4);
}

#[test]
fn expired_code_fails_and_writer_stays_unverified() {
    let (app, delivery) = test_app();

    app.blog()
        .request_code("Ada", "ada@example.com")
        .expect("code request");

    // Age the outstanding code past the one-hour window.
    let mut writers = app.blog().writers();
    writers[0].code_sent_at = Some(Utc::now() - Duration::hours(2));
    app.store()
        .set(keys::BLOG_WRITERS, &writers)
        .expect("memory write");

    let err = app
        .blog()
        .verify("ada@example.com", &delivery.last_code())
        .expect_err("expired code");
    assert!(matches!(
        err,
        ultre_storefront::services::blog::BlogError::ExpiredCode
    ));
    assert!(!app.blog().writers()[0].verified);

    // A fresh request issues a new redeemable code.
    app.blog()
        .request_code("Ada", "ada@example.com")
        .expect("code request");
    app.blog()
        .verify("ada@example.com", &delivery.last_code())
        .expect("verification");
    assert!(app.blog().writers()[0].verified);
}

#[test]
fn opening_posts_builds_the_reading_history() {
    let (binder, _) = test_binder();
    binder.bootstrap();
    binder.dispatch(Action::SignUp {
        email: "reader@example.com".to_owned(),
        password: "pw".to_owned(),
    });

    let ids: Vec<PostId> = binder
        .app()
        .blog()
        .posts()
        .iter()
        .map(|p| p.id.clone())
        .collect();

    for id in &ids {
        binder.dispatch(Action::OpenBlogPost(id.clone()));
    }
    // Re-opening the first post moves it back to the front.
    binder.dispatch(Action::OpenBlogPost(ids[0].clone()));

    let history = binder.app().document().recently_viewed();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].id, ids[0]);
    assert_eq!(
        binder.app().document().is_visible(Region::InlinePostViewer),
        Some(true)
    );
}

#[test]
fn blog_is_gated_behind_a_session() {
    let (binder, _) = test_binder();
    binder.bootstrap();

    let id = binder.app().blog().posts()[0].id.clone();
    binder.dispatch(Action::OpenBlogPost(id));

    assert!(binder.app().document().open_post().is_none());
    assert_eq!(
        binder.app().document().is_visible(Region::AuthModal),
        Some(true)
    );
    assert!(binder.app().blog().recently_viewed().is_empty());
}
