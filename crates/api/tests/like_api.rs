//! HTTP-level integration tests for the like toggle.

mod common;

use axum::http::StatusCode;
use common::{create_blueprint, create_user, location, post_form, token_for};
use blueprints_db::repositories::LikeRepo;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_toggle_like_twice(pool: PgPool) {
    let owner = create_user(&pool, "owner").await;
    let fan = create_user(&pool, "fan").await;
    let bp = create_blueprint(&pool, owner.id, "Smelter", &[]).await;
    let app = common::build_test_app(pool.clone());
    let token = token_for(fan.id);
    let uri = format!("/blueprints/{}/like", bp.id);

    let response = post_form(app.clone(), &uri, &[], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/");
    assert!(LikeRepo::find(&pool, fan.id, bp.id).await.unwrap().is_some());
    assert_eq!(common::like_count(&pool, bp.id).await, 1);

    let response = post_form(app, &uri, &[], Some(&token)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(LikeRepo::find(&pool, fan.id, bp.id).await.unwrap().is_none());
    assert_eq!(common::like_count(&pool, bp.id).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_may_like_own_blueprint(pool: PgPool) {
    let owner = create_user(&pool, "owner").await;
    let bp = create_blueprint(&pool, owner.id, "Smelter", &[]).await;
    let app = common::build_test_app(pool.clone());

    let response = post_form(
        app,
        &format!("/blueprints/{}/like", bp.id),
        &[],
        Some(&token_for(owner.id)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(LikeRepo::find(&pool, owner.id, bp.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_like_missing_blueprint_is_404(pool: PgPool) {
    let user = create_user(&pool, "fan").await;
    let app = common::build_test_app(pool);

    let response = post_form(app, "/blueprints/999999/like", &[], Some(&token_for(user.id))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anonymous_cannot_like(pool: PgPool) {
    let owner = create_user(&pool, "owner").await;
    let bp = create_blueprint(&pool, owner.id, "Smelter", &[]).await;
    let app = common::build_test_app(pool.clone());

    let response = post_form(app, &format!("/blueprints/{}/like", bp.id), &[], None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(common::like_count(&pool, bp.id).await, 0);
}
