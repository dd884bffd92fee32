use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

use server::entity::review;
use server::error::AppError;
use server::services::constraints::review_write_error;

use crate::common::{TestApp, routes};

mod create {
    use super::*;

    #[tokio::test]
    async fn member_can_review_a_movie() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(
                routes::REVIEWS,
                &json!({"movie": movie, "rating": 8, "comment": "Loved it"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["movie"], movie);
        assert_eq!(res.body["rating"], 8);
        assert_eq!(res.body["comment"], "Loved it");
        assert_eq!(res.body["user"], "alice");
        assert_eq!(res.body["like_count"], 0);
    }

    #[tokio::test]
    async fn second_review_of_the_same_movie_is_a_duplicate() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        app.create_review(&token, movie, 8).await;

        let res = app
            .post_with_token(routes::REVIEWS, &json!({"movie": movie, "rating": 3}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_REVIEW");

        let list = app.get_without_token(&routes::reviews_of(movie)).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn different_users_may_review_the_same_movie() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let bob = app.create_authenticated_user("bob").await;

        app.create_review(&alice, movie, 8).await;
        app.create_review(&bob, movie, 2).await;

        let list = app.get_without_token(&routes::reviews_of(movie)).await;
        assert_eq!(list.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ratings_outside_one_to_ten_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;

        for rating in [0, 11, -3, 4_294_967_306_i64, -4_294_967_296_i64] {
            let res = app
                .post_with_token(
                    routes::REVIEWS,
                    &json!({"movie": movie, "rating": rating}),
                    &token,
                )
                .await;

            assert_eq!(res.status, 400, "rating {rating} should be rejected");
            assert_eq!(res.body["code"], "INVALID_RATING");
        }
    }

    #[tokio::test]
    async fn boundary_ratings_are_accepted() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let bob = app.create_authenticated_user("bob").await;

        app.create_review(&alice, movie, 1).await;
        app.create_review(&bob, movie, 10).await;
    }

    #[tokio::test]
    async fn anonymous_caller_cannot_review() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;

        let res = app
            .post_without_token(routes::REVIEWS, &json!({"movie": movie, "rating": 8}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn author_in_the_payload_is_ignored() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let bob = app.create_authenticated_user("bob").await;
        let bob_id = app.get_with_token(routes::ME, &bob).await.id();

        let res = app
            .post_with_token(
                routes::REVIEWS,
                &json!({"movie": movie, "rating": 8, "user": bob_id}),
                &alice,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["user"], "alice");
        assert_ne!(res.body["user_id"], bob_id);
    }

    #[tokio::test]
    async fn reviewing_an_unknown_movie_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice").await;

        let res = app
            .post_with_token(routes::REVIEWS, &json!({"movie": 999, "rating": 8}), &token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod unique_index {
    use super::*;

    #[tokio::test]
    async fn duplicate_insert_past_the_precheck_maps_to_duplicate_review() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        let alice_id = app.get_with_token(routes::ME, &token).await.id();
        app.create_review(&token, movie, 8).await;

        let now = chrono::Utc::now();
        let err = review::ActiveModel {
            user_id: Set(alice_id),
            movie_id: Set(movie),
            rating: Set(3),
            comment: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&app.db)
        .await
        .map_err(review_write_error)
        .expect_err("second review for the same pair should hit the unique index");

        assert!(matches!(err, AppError::DuplicateReview), "got {err:?}");
    }

    #[tokio::test]
    async fn concurrent_identical_reviews_yield_one_created_and_one_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        let body = json!({"movie": movie, "rating": 8});

        let (a, b) = tokio::join!(
            app.post_with_token(routes::REVIEWS, &body, &token),
            app.post_with_token(routes::REVIEWS, &body, &token),
        );

        let mut statuses = [a.status, b.status];
        statuses.sort_unstable();
        assert_eq!(statuses, [201, 409], "{} / {}", a.text, b.text);
        let conflict = if a.status == 409 { &a } else { &b };
        assert_eq!(conflict.body["code"], "DUPLICATE_REVIEW");

        let list = app.get_without_token(&routes::reviews_of(movie)).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn author_can_change_rating_and_clear_comment() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        let review = app.create_review(&token, movie, 8).await;

        let res = app
            .patch_with_token(
                &routes::review(review),
                &json!({"rating": 9, "comment": null}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["rating"], 9);
        assert!(res.body["comment"].is_null());

        let movie_res = app.get_without_token(&routes::movie(movie)).await;
        assert_eq!(movie_res.body["average_rating"], 9.0);
    }

    #[tokio::test]
    async fn omitted_fields_are_left_alone() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        let review = app.create_review(&token, movie, 8).await;

        let res = app
            .patch_with_token(&routes::review(review), &json!({"rating": 5}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["comment"], "Worth watching");
    }

    #[tokio::test]
    async fn non_author_cannot_update() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let bob = app.create_authenticated_user("bob").await;
        let review = app.create_review(&alice, movie, 8).await;

        let res = app
            .patch_with_token(&routes::review(review), &json!({"rating": 1}), &bob)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn admin_has_no_override_on_someone_elses_review() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let review = app.create_review(&alice, movie, 8).await;

        let res = app
            .patch_with_token(&routes::review(review), &json!({"rating": 1}), &admin)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn anonymous_update_is_unauthorized() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let review = app.create_review(&alice, movie, 8).await;

        let res = app
            .patch_without_token(&routes::review(review), &json!({"rating": 1}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn out_of_range_rating_on_update_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        let review = app.create_review(&token, movie, 8).await;

        let res = app
            .patch_with_token(&routes::review(review), &json!({"rating": 11}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_RATING");

        let res = app
            .patch_with_token(
                &routes::review(review),
                &json!({"rating": 4_294_967_306_i64}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "INVALID_RATING");

        let unchanged = app.get_without_token(&routes::review(review)).await;
        assert_eq!(unchanged.body["rating"], 8);
    }

    #[tokio::test]
    async fn moving_onto_an_already_reviewed_movie_is_a_duplicate() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let first = app.create_movie(&admin, "Inception", &[]).await;
        let second = app.create_movie(&admin, "Heat", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        let review = app.create_review(&token, first, 8).await;
        app.create_review(&token, second, 6).await;

        let res = app
            .patch_with_token(&routes::review(review), &json!({"movie": second}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "DUPLICATE_REVIEW");
    }

    #[tokio::test]
    async fn resubmitting_the_same_movie_is_not_a_duplicate() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let token = app.create_authenticated_user("alice").await;
        let review = app.create_review(&token, movie, 8).await;

        let res = app
            .patch_with_token(
                &routes::review(review),
                &json!({"movie": movie, "rating": 7}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["rating"], 7);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn author_can_delete_and_likes_go_with_it() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let bob = app.create_authenticated_user("bob").await;
        let review = app.create_review(&alice, movie, 8).await;
        let like = app.create_like(&bob, review).await;

        let res = app.delete_with_token(&routes::review(review), &alice).await;
        assert_eq!(res.status, 204);

        assert_eq!(app.get_without_token(&routes::review(review)).await.status, 404);
        assert_eq!(app.get_without_token(&routes::like(like)).await.status, 404);

        let movie_res = app.get_without_token(&routes::movie(movie)).await;
        assert_eq!(movie_res.body["review_count"], 0);
        assert!(movie_res.body["average_rating"].is_null());
    }

    #[tokio::test]
    async fn non_author_cannot_delete() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let movie = app.create_movie(&admin, "Inception", &[]).await;
        let alice = app.create_authenticated_user("alice").await;
        let bob = app.create_authenticated_user("bob").await;
        let review = app.create_review(&alice, movie, 8).await;

        let res = app.delete_with_token(&routes::review(review), &bob).await;
        assert_eq!(res.status, 403);

        let res = app.delete_with_token(&routes::review(review), &admin).await;
        assert_eq!(res.status, 403);

        assert_eq!(app.get_without_token(&routes::review(review)).await.status, 200);
    }

    #[tokio::test]
    async fn deleting_an_unknown_review_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice").await;

        let res = app.delete_with_token(&routes::review(999), &token).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
