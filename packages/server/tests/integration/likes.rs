use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

use server::entity::like;
use server::error::AppError;
use server::services::constraints::like_write_error;

use crate::common::{TestApp, routes};

/// A movie with one review by `alice`; returns `(review_id, alice_token)`.
async fn reviewed_movie(app: &TestApp) -> (i32, String) {
    let admin = app.admin_token().await;
    let movie = app.create_movie(&admin, "Inception", &[]).await;
    let alice = app.create_authenticated_user("alice").await;
    let review = app.create_review(&alice, movie, 8).await;
    (review, alice)
}

mod create {
    use super::*;

    #[tokio::test]
    async fn member_can_like_a_review() {
        let app = TestApp::spawn().await;
        let (review, _) = reviewed_movie(&app).await;
        let bob = app.create_authenticated_user("bob").await;

        let res = app
            .post_with_token(routes::LIKES, &json!({"review": review}), &bob)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["review"], review);
        assert_eq!(res.body["user"], "bob");

        let review_res = app.get_without_token(&routes::review(review)).await;
        assert_eq!(review_res.body["like_count"], 1);
    }

    #[tokio::test]
    async fn liking_the_same_review_twice_is_a_duplicate() {
        let app = TestApp::spawn().await;
        let (review, _) = reviewed_movie(&app).await;
        let bob = app.create_authenticated_user("bob").await;
        app.create_like(&bob, review).await;

        let res = app
            .post_with_token(routes::LIKES, &json!({"review": review}), &bob)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_LIKE");

        let review_res = app.get_without_token(&routes::review(review)).await;
        assert_eq!(review_res.body["like_count"], 1);
    }

    #[tokio::test]
    async fn authors_may_like_their_own_review() {
        let app = TestApp::spawn().await;
        let (review, alice) = reviewed_movie(&app).await;

        app.create_like(&alice, review).await;
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_like() {
        let app = TestApp::spawn().await;
        let (review, _) = reviewed_movie(&app).await;

        let res = app
            .post_without_token(routes::LIKES, &json!({"review": review}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn liking_an_unknown_review_is_not_found() {
        let app = TestApp::spawn().await;
        let bob = app.create_authenticated_user("bob").await;

        let res = app
            .post_with_token(routes::LIKES, &json!({"review": 999}), &bob)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn liker_in_the_payload_is_ignored() {
        let app = TestApp::spawn().await;
        let (review, alice) = reviewed_movie(&app).await;
        let alice_id = app.get_with_token(routes::ME, &alice).await.id();
        let bob = app.create_authenticated_user("bob").await;

        let res = app
            .post_with_token(
                routes::LIKES,
                &json!({"review": review, "user": alice_id}),
                &bob,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["user"], "bob");
    }
}

mod unique_index {
    use super::*;

    #[tokio::test]
    async fn duplicate_insert_past_the_precheck_maps_to_duplicate_like() {
        let app = TestApp::spawn().await;
        let (review, _) = reviewed_movie(&app).await;
        let bob = app.create_authenticated_user("bob").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();
        app.create_like(&bob, review).await;

        let err = like::ActiveModel {
            user_id: Set(bob_id),
            review_id: Set(review),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&app.db)
        .await
        .map_err(like_write_error)
        .expect_err("second like for the same pair should hit the unique index");

        assert!(matches!(err, AppError::DuplicateLike), "got {err:?}");
    }

    #[tokio::test]
    async fn concurrent_identical_likes_yield_one_created_and_one_conflict() {
        let app = TestApp::spawn().await;
        let (review, _) = reviewed_movie(&app).await;
        let bob = app.create_authenticated_user("bob").await;
        let body = json!({"review": review});

        let (a, b) = tokio::join!(
            app.post_with_token(routes::LIKES, &body, &bob),
            app.post_with_token(routes::LIKES, &body, &bob),
        );

        let mut statuses = [a.status, b.status];
        statuses.sort_unstable();
        assert_eq!(statuses, [201, 409], "{} / {}", a.text, b.text);
        let conflict = if a.status == 409 { &a } else { &b };
        assert_eq!(conflict.body["code"], "DUPLICATE_LIKE");

        let review_res = app.get_without_token(&routes::review(review)).await;
        assert_eq!(review_res.body["like_count"], 1);
    }
}

mod read {
    use super::*;

    #[tokio::test]
    async fn anonymous_caller_can_list_and_get_likes() {
        let app = TestApp::spawn().await;
        let (review, _) = reviewed_movie(&app).await;
        let bob = app.create_authenticated_user("bob").await;
        let like = app.create_like(&bob, review).await;

        let list = app.get_without_token(routes::LIKES).await;
        assert_eq!(list.status, 200);
        assert_eq!(list.body.as_array().unwrap().len(), 1);

        let res = app.get_without_token(&routes::like(like)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], like);
    }
}

mod update_and_delete {
    use super::*;

    #[tokio::test]
    async fn liker_can_move_a_like_to_another_review() {
        let app = TestApp::spawn().await;
        let (first, _) = reviewed_movie(&app).await;
        let admin = app.admin_token().await;
        let other_movie = app.create_movie(&admin, "Heat", &[]).await;
        let carol = app.create_authenticated_user("carol").await;
        let second = app.create_review(&carol, other_movie, 5).await;
        let bob = app.create_authenticated_user("bob").await;
        let like = app.create_like(&bob, first).await;

        let res = app
            .patch_with_token(&routes::like(like), &json!({"review": second}), &bob)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["review"], second);
    }

    #[tokio::test]
    async fn moving_onto_an_already_liked_review_is_a_duplicate() {
        let app = TestApp::spawn().await;
        let (first, _) = reviewed_movie(&app).await;
        let admin = app.admin_token().await;
        let other_movie = app.create_movie(&admin, "Heat", &[]).await;
        let carol = app.create_authenticated_user("carol").await;
        let second = app.create_review(&carol, other_movie, 5).await;
        let bob = app.create_authenticated_user("bob").await;
        let like = app.create_like(&bob, first).await;
        app.create_like(&bob, second).await;

        let res = app
            .patch_with_token(&routes::like(like), &json!({"review": second}), &bob)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_LIKE");
    }

    #[tokio::test]
    async fn only_the_liker_can_remove_a_like() {
        let app = TestApp::spawn().await;
        let (review, alice) = reviewed_movie(&app).await;
        let admin = app.admin_token().await;
        let bob = app.create_authenticated_user("bob").await;
        let like = app.create_like(&bob, review).await;

        for token in [&alice, &admin] {
            let res = app.delete_with_token(&routes::like(like), token).await;
            assert_eq!(res.status, 403);
            assert_eq!(res.body["code"], "PERMISSION_DENIED");
        }

        let res = app.delete_without_token(&routes::like(like)).await;
        assert_eq!(res.status, 401);

        let res = app.delete_with_token(&routes::like(like), &bob).await;
        assert_eq!(res.status, 204);

        let review_res = app.get_without_token(&routes::review(review)).await;
        assert_eq!(review_res.body["like_count"], 0);
    }
}
