pub mod create;
pub mod get;
pub mod list;

use crate::AppState;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

pub const PATH: &str = "/recipes";

/// Returns the router for /recipes endpoints
pub fn router() -> Router<AppState> {
    Router::new()
        .route(PATH, get(list::list_recipes).post(create::create_recipe))
        .route("/recipes/{id}", get(get::get_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_recipes, get::get_recipe, create::create_recipe),
    components(schemas(
        crate::types::CreateRecipeRequest,
        crate::types::RecipeListItem,
        crate::types::RecipeDetail,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use crate::db::{create_pool, DbOptions, IN_MEMORY};
    use crate::service::RecipeService;
    use crate::store::RecipeStore;
    use axum::body::Body;
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let pool = create_pool(
            IN_MEMORY,
            &DbOptions {
                pool_size: 1,
                busy_timeout_ms: 1_000,
            },
        )
        .unwrap();
        crate::build_router(
            Arc::new(RecipeService::new(RecipeStore::new(pool))),
            false,
        )
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &Value) -> Request<Body> {
        post_raw(body.to_string())
    }

    fn post_raw(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/recipes")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    fn recipe(name: &str, cooking_time: i64) -> Value {
        json!({
            "name": name,
            "cooking_time": cooking_time,
            "ingredients": "яйца, молоко",
            "description": "Быстрый завтрак.",
        })
    }

    async fn create(app: &Router, body: &Value) -> i64 {
        let (status, _, created) = send(app, post_json(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        created["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_list_empty_at_start() {
        let app = test_app();
        let (status, _, body) = send(&app, get("/recipes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_create_echoes_stored_values() {
        let app = test_app();
        let request = json!({
            "name": "Борщ",
            "cooking_time": 90,
            "ingredients": "свекла, капуста",
            "description": "...",
        });

        let (status, headers, body) = send(&app, post_json(&request)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Борщ");
        assert_eq!(body["cooking_time"], 90);
        assert_eq!(body["ingredients"], "свекла, капуста");
        assert_eq!(body["description"], "...");
        assert!(body.get("views").is_none());

        let id = body["id"].as_i64().unwrap();
        assert_eq!(headers[header::LOCATION], format!("/recipes/{id}").as_str());

        let (_, _, list) = send(&app, get("/recipes")).await;
        assert_eq!(
            list,
            json!([{ "id": id, "name": "Борщ", "views": 0, "cooking_time": 90 }])
        );
    }

    #[tokio::test]
    async fn test_list_orders_equal_views_by_cooking_time() {
        let app = test_app();
        for (name, cooking_time) in [("Пицца", 30), ("Салат Цезарь", 20), ("Омлет", 10)] {
            create(&app, &recipe(name, cooking_time)).await;
        }

        let (status, _, list) = send(&app, get("/recipes")).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Омлет", "Салат Цезарь", "Пицца"]);
    }

    #[tokio::test]
    async fn test_detail_fetch_counts_views() {
        let app = test_app();
        let viewed = create(&app, &recipe("Пицца", 30)).await;
        create(&app, &recipe("Омлет", 10)).await;

        for _ in 0..2 {
            let (status, _, body) = send(&app, get(&format!("/recipes/{viewed}"))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["name"], "Пицца");
            assert_eq!(body["cooking_time"], 30);
            assert!(body.get("views").is_none());
        }

        let (_, _, list) = send(&app, get("/recipes")).await;
        assert_eq!(list[0]["id"], viewed);
        assert_eq!(list[0]["views"], 2);
        assert_eq!(list[1]["views"], 0);
    }

    #[tokio::test]
    async fn test_detail_unknown_id_is_not_found() {
        let app = test_app();
        let id = create(&app, &recipe("Омлет", 10)).await;

        let (status, _, body) = send(&app, get(&format!("/recipes/{}", id + 1))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Recipe not found" }));

        let (_, _, list) = send(&app, get("/recipes")).await;
        assert_eq!(list[0]["views"], 0);
    }

    #[tokio::test]
    async fn test_detail_unknown_64_bit_id_is_not_found() {
        let app = test_app();
        create(&app, &recipe("Омлет", 10)).await;

        let (status, _, body) = send(&app, get("/recipes/3000000000")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Recipe not found" }));
    }

    #[tokio::test]
    async fn test_create_accepts_cooking_time_beyond_32_bits() {
        let app = test_app();
        let cooking_time = 3_000_000_000_i64;

        let id = create(&app, &recipe("Долгое рагу", cooking_time)).await;

        let (status, _, body) = send(&app, get(&format!("/recipes/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cooking_time"], cooking_time);

        let (_, _, list) = send(&app, get("/recipes")).await;
        assert_eq!(
            list,
            json!([{ "id": id, "name": "Долгое рагу", "views": 1, "cooking_time": cooking_time }])
        );
    }

    #[tokio::test]
    async fn test_detail_non_integer_id_is_rejected() {
        let app = test_app();
        let (status, _, body) = send(&app, get("/recipes/borscht")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "id");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_fields() {
        let app = test_app();

        let (status, _, body) = send(&app, post_json(&recipe("", 0))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["details"][0]["field"], "name");
        assert_eq!(body["details"][1]["field"], "cooking_time");

        let long_name = "x".repeat(256);
        let (status, _, _) = send(&app, post_json(&recipe(&long_name, 10))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _, _) = send(&app, post_json(&recipe("Омлет", -1))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, _, list) = send(&app, get("/recipes")).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_bodies() {
        let app = test_app();

        let missing_description = json!({
            "name": "Омлет",
            "cooking_time": 10,
            "ingredients": "яйца",
        });
        let (status, _, body) = send(&app, post_json(&missing_description)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "body");

        let fractional_time = json!({
            "name": "Омлет",
            "cooking_time": 10.5,
            "ingredients": "яйца",
            "description": "",
        });
        let (status, _, _) = send(&app, post_json(&fractional_time)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let quoted_time = json!({
            "name": "Омлет",
            "cooking_time": "10",
            "ingredients": "яйца",
            "description": "",
        });
        let (status, _, body) = send(&app, post_json(&quoted_time)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"][0]["field"], "body");

        let (status, _, _) = send(&app, post_raw("{not json")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let no_content_type = Request::builder()
            .method("POST")
            .uri("/recipes")
            .body(Body::from(recipe("Омлет", 10).to_string()))
            .unwrap();
        let (status, _, _) = send(&app, no_content_type).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_accepts_empty_text_and_ignores_views() {
        let app = test_app();
        let request = json!({
            "name": "Вода",
            "cooking_time": 1,
            "ingredients": "",
            "description": "",
            "views": 100,
        });

        let (status, _, body) = send(&app, post_json(&request)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["ingredients"], "");

        let (_, _, list) = send(&app, get("/recipes")).await;
        assert_eq!(list[0]["views"], 0);
    }
}
