//! Integration tests for the shopping cart and list download

mod common;

use axum::http::StatusCode;
use common::{parse, TestApp};
use serde_json::json;

#[tokio::test]
#[ignore = "requires database"]
async fn test_download_aggregates_amounts() {
    let app = TestApp::new().await;
    let author = app.create_test_user().await;
    let shopper = app.create_test_user().await;
    let sugar = app.create_ingredient("sugar", "g").await;
    let lemon = app.create_ingredient("lemon", "pcs").await;

    let lemonade = app.create_recipe(&author, "Lemonade", &[(sugar, 100), (lemon, 3)]).await;
    let curd = app.create_recipe(&author, "Lemon curd", &[(sugar, 50), (lemon, 2)]).await;

    for id in [lemonade, curd] {
        let (status, _) = app
            .post_auth(&format!("/api/recipes/{}/shopping_cart/", id), &shopper.token, &json!({}))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = app.get_auth(&format!("/api/recipes/{}/", curd), &shopper.token).await;
    assert_eq!(parse(&body)["is_in_shopping_cart"], true);

    let (status, text) = app
        .get_auth("/api/recipes/download_shopping_cart/", &shopper.token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Shopping list (compiled: "));
    assert!(lines.iter().any(|l| l.starts_with("1. Lemon ") && l.ends_with(" - 5 pcs")));
    assert!(lines.iter().any(|l| l.starts_with("2. Sugar ") && l.ends_with(" - 150 g")));
    assert!(lines.contains(&"For the following recipes:"));
    assert!(lines.contains(&"- Lemonade"));
    assert!(lines.contains(&"- Lemon curd"));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_download_csv_and_empty_cart() {
    let app = TestApp::new().await;
    let author = app.create_test_user().await;
    let shopper = app.create_test_user().await;
    let oats = app.create_ingredient("oats", "g").await;
    let id = app.create_recipe(&author, "Granola", &[(oats, 80)]).await;

    let (_, text) = app
        .get_auth("/api/recipes/download_shopping_cart/", &shopper.token)
        .await;
    assert_eq!(text, "Shopping list is empty.");

    app.post_auth(&format!("/api/recipes/{}/shopping_cart/", id), &shopper.token, &json!({}))
        .await;

    let (status, csv) = app
        .get_auth("/api/recipes/download_shopping_cart/?format=csv", &shopper.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut rows = csv.lines();
    assert_eq!(rows.next(), Some("name,amount,measurement_unit"));
    let row = rows.next().unwrap();
    assert!(row.starts_with("Oats ") && row.ends_with(",80,g"));

    let (status, _) = app
        .get_auth("/api/recipes/download_shopping_cart/?format=pdf", &shopper.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_cart_add_remove() {
    let app = TestApp::new().await;
    let author = app.create_test_user().await;
    let shopper = app.create_test_user().await;
    let beans = app.create_ingredient("beans", "g").await;
    let id = app.create_recipe(&author, "Chili", &[(beans, 400)]).await;
    let path = format!("/api/recipes/{}/shopping_cart/", id);

    let (status, _) = app.post_auth(&path, &shopper.token, &json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post_auth(&path, &shopper.token, &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .get_auth(&format!("/api/recipes/?is_in_shopping_cart=1&author={}", author.id), &shopper.token)
        .await;
    assert_eq!(parse(&body)["count"], 1);

    let (status, _) = app.delete_auth(&path, &shopper.token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.delete_auth(&path, &shopper.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
