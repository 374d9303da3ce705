//! Integration tests for the blueprint index: filters, their precedence and
//! pagination.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_blueprint, create_user, get, get_auth, token_for};
use blueprints_db::repositories::LikeRepo;
use sqlx::PgPool;

/// Titles of the blueprints on an index response page.
fn titles(json: &serde_json::Value) -> Vec<String> {
    json["data"]["blueprints"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

/// Two authors, three blueprints, one like:
///
/// - alice: "Smelter" [Tag1], "Main bus" [Tag2]
/// - bob:   "Train station" [Tag1, Rail]; liked by alice
async fn seed(pool: &PgPool) -> (i64, i64) {
    let alice = create_user(pool, "alice").await;
    let bob = create_user(pool, "bob").await;

    create_blueprint(pool, alice.id, "Smelter", &["Tag1"]).await;
    create_blueprint(pool, alice.id, "Main bus", &["Tag2"]).await;
    let station = create_blueprint(pool, bob.id, "Train station", &["Tag1", "Rail"]).await;
    LikeRepo::toggle(pool, alice.id, station.id).await.unwrap();

    (alice.id, bob.id)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_index_lists_everything_newest_first(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(titles(&json), vec!["Train station", "Main bus", "Smelter"]);
    assert_eq!(json["data"]["blueprints"]["total"], 3);
    assert_eq!(json["data"]["liked_blueprints"], serde_json::json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tag_filter(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app.clone(), "/?tag=Tag1").await).await;
    assert_eq!(titles(&json), vec!["Train station", "Smelter"]);

    // Exact, case-sensitive match.
    let json = body_json(get(app, "/?tag=tag1").await).await;
    assert!(titles(&json).is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_username_filter(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app, "/?username=alice").await).await;
    assert_eq!(titles(&json), vec!["Main bus", "Smelter"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_query_searches_title_author_and_tags(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app.clone(), "/?query=SMELT").await).await;
    assert_eq!(titles(&json), vec!["Smelter"]);

    let json = body_json(get(app.clone(), "/?query=bo").await).await;
    assert_eq!(titles(&json), vec!["Train station"]);

    // Matches both a tag and the title of the same blueprint only once.
    let json = body_json(get(app, "/?query=rail").await).await;
    assert_eq!(titles(&json), vec!["Train station"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_liked_filter_for_authenticated_viewer(pool: PgPool) {
    let (alice, _) = seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get_auth(app, "/?liked=true", &token_for(alice)).await).await;
    assert_eq!(titles(&json), vec!["Train station"]);
    assert_eq!(json["data"]["liked_blueprints"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_liked_is_ignored_for_anonymous_viewer(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    // Falls through to the next filter in line.
    let json = body_json(get(app.clone(), "/?liked=true&username=bob").await).await;
    assert_eq!(titles(&json), vec!["Train station"]);

    let json = body_json(get(app, "/?liked=true").await).await;
    assert_eq!(titles(&json).len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filter_precedence(pool: PgPool) {
    let (alice, _) = seed(&pool).await;
    let app = common::build_test_app(pool);
    let token = token_for(alice);

    // tag beats everything else.
    let json = body_json(
        get_auth(
            app.clone(),
            "/?tag=Tag2&liked=true&username=bob&query=station",
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(titles(&json), vec!["Main bus"]);

    // liked beats username and query.
    let json = body_json(
        get_auth(app.clone(), "/?liked=true&username=alice&query=smelter", &token).await,
    )
    .await;
    assert_eq!(titles(&json), vec!["Train station"]);

    // username beats query.
    let json = body_json(get(app, "/?username=bob&query=smelter").await).await;
    assert_eq!(titles(&json), vec!["Train station"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pagination(pool: PgPool) {
    let user = create_user(&pool, "prolific").await;
    for i in 0..10 {
        create_blueprint(&pool, user.id, &format!("Blueprint {i}"), &[]).await;
    }
    let app = common::build_test_app(pool);

    let json = body_json(get(app.clone(), "/").await).await;
    assert_eq!(titles(&json).len(), 8);
    assert_eq!(titles(&json)[0], "Blueprint 9");
    assert_eq!(json["data"]["blueprints"]["num_pages"], 2);
    assert_eq!(json["data"]["blueprints"]["has_next"], true);

    let json = body_json(get(app.clone(), "/?page=2").await).await;
    assert_eq!(titles(&json), vec!["Blueprint 1", "Blueprint 0"]);
    assert_eq!(json["data"]["blueprints"]["has_previous"], true);

    let response = get(app.clone(), "/?page=3").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/?page=0").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_index_first_page_exists(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(titles(&json).is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_blank_page_is_first_page(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/?query=smelt&page=").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(titles(&json), vec!["Smelter"]);
    assert_eq!(json["data"]["blueprints"]["page"], 1);

    let response = get(app, "/?page=").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tag_and_author_are_not_trimmed(pool: PgPool) {
    seed(&pool).await;
    let app = common::build_test_app(pool);

    let json = body_json(get(app.clone(), "/?tag=%20Tag1").await).await;
    assert!(titles(&json).is_empty());

    let json = body_json(get(app, "/?username=alice%20").await).await;
    assert!(titles(&json).is_empty());
}
