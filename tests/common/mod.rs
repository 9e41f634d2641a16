#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode},
    routing::get,
};
use querycrate::{
    ApiError, ListResource, ListResults, MemoryCollection, Populate, QueryConfig, Relation,
    get_one_handler, list_handler, scoped_list,
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct Collections {
    pub bootcamps: Arc<MemoryCollection>,
    pub courses: Arc<MemoryCollection>,
    pub reviews: Arc<MemoryCollection>,
}

/// Five bootcamps created one day apart (b1 oldest), six courses and two
/// reviews, with `courses` and `bootcamp` relations registered.
pub fn seeded_collections() -> Collections {
    let bootcamps = Arc::new(MemoryCollection::new("bootcamps").with_unique("name"));
    let courses = Arc::new(MemoryCollection::new("courses"));
    let reviews = Arc::new(MemoryCollection::new("reviews"));

    bootcamps
        .relate("courses", Relation::reverse(&courses, "bootcamp"))
        .unwrap();
    courses
        .relate("bootcamp", Relation::reference(&bootcamps, "bootcamp"))
        .unwrap();
    reviews
        .relate("bootcamp", Relation::reference(&bootcamps, "bootcamp"))
        .unwrap();

    bootcamps
        .insert_many(vec![
            json!({"_id": "b1", "name": "Devworks Bootcamp", "description": "Full stack in Boston",
                   "averageCost": 10000, "housing": true, "careers": ["Web Development", "UI/UX", "Business"],
                   "location": {"state": "MA"}, "createdAt": "2024-01-01T00:00:00.000Z"}),
            json!({"_id": "b2", "name": "ModernTech Bootcamp", "description": "Rockstar developers",
                   "averageCost": 8000, "housing": false, "careers": ["Web Development", "Mobile Development"],
                   "location": {"state": "VT"}, "createdAt": "2024-01-02T00:00:00.000Z"}),
            json!({"_id": "b3", "name": "Codemasters", "description": "Excel at coding",
                   "averageCost": 12000, "housing": false, "careers": ["Data Science", "Business"],
                   "location": {"state": "VT"}, "createdAt": "2024-01-03T00:00:00.000Z"}),
            json!({"_id": "b4", "name": "Devcentral Bootcamp", "description": "Become a great developer",
                   "averageCost": 9000, "housing": true, "careers": ["Mobile Development", "Data Science"],
                   "location": {"state": "RI"}, "createdAt": "2024-01-04T00:00:00.000Z"}),
            json!({"_id": "b5", "name": "Zero to Dev", "description": "Evenings and weekends",
                   "averageCost": 5000, "housing": false, "careers": ["Web Development"],
                   "location": {"state": "NY"}, "createdAt": "2024-01-05T00:00:00.000Z"}),
        ])
        .unwrap();

    courses
        .insert_many(vec![
            json!({"_id": "c1", "title": "Front End Web Development", "tuition": 8000, "bootcamp": "b1",
                   "createdAt": "2024-02-01T00:00:00.000Z"}),
            json!({"_id": "c2", "title": "Full Stack Web Development", "tuition": 10000, "bootcamp": "b1",
                   "createdAt": "2024-02-02T00:00:00.000Z"}),
            json!({"_id": "c3", "title": "Full Stack Web Dev", "tuition": 12000, "bootcamp": "b2",
                   "createdAt": "2024-02-03T00:00:00.000Z"}),
            json!({"_id": "c4", "title": "UI/UX", "tuition": 10000, "bootcamp": "b2",
                   "createdAt": "2024-02-04T00:00:00.000Z"}),
            json!({"_id": "c5", "title": "Data Science Program", "tuition": 12000, "bootcamp": "b3",
                   "createdAt": "2024-02-05T00:00:00.000Z"}),
            json!({"_id": "c6", "title": "Mobile Development", "tuition": 11000, "bootcamp": "b4",
                   "createdAt": "2024-02-06T00:00:00.000Z"}),
        ])
        .unwrap();

    reviews
        .insert_many(vec![
            json!({"_id": "r1", "title": "Learned a ton!", "rating": 8, "bootcamp": "b1",
                   "createdAt": "2024-03-01T00:00:00.000Z"}),
            json!({"_id": "r2", "title": "Not that great", "rating": 4, "bootcamp": "b3",
                   "createdAt": "2024-03-02T00:00:00.000Z"}),
        ])
        .unwrap();

    Collections {
        bootcamps,
        courses,
        reviews,
    }
}

async fn bootcamp_children(
    State(children): State<ListResource>,
    Path(id): Path<String>,
) -> Result<Json<ListResults>, ApiError> {
    Ok(Json(scoped_list(children.collection.as_ref(), "bootcamp", &id).await?))
}

pub fn setup_test_app(config: QueryConfig) -> Router {
    let collections = seeded_collections();
    let summary = || Populate::new("bootcamp").select("name,description");
    let courses = ListResource::new(collections.courses)
        .with_populate(summary())
        .with_config(config.clone());

    let api = Router::new()
        .route("/bootcamps", get(list_handler))
        .route("/bootcamps/{id}", get(get_one_handler))
        .with_state(
            ListResource::new(collections.bootcamps)
                .with_populate("courses")
                .with_config(config.clone()),
        )
        .merge(
            Router::new()
                .route("/courses", get(list_handler))
                .route("/courses/{id}", get(get_one_handler))
                .route("/bootcamps/{id}/courses", get(bootcamp_children))
                .with_state(courses),
        )
        .merge(
            Router::new()
                .route("/reviews", get(list_handler))
                .route("/reviews/{id}", get(get_one_handler))
                .route("/bootcamps/{id}/reviews", get(bootcamp_children))
                .with_state(
                    ListResource::new(collections.reviews)
                        .with_populate(summary())
                        .with_config(config),
                ),
        );

    Router::new().nest("/api/v1", api)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, serde_json::from_slice(&body).unwrap())
}

pub fn ids(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|doc| doc["_id"].as_str().unwrap())
        .collect()
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    db.execute_unprepared(
        r#"CREATE TABLE courses (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            minimumSkill TEXT NOT NULL,
            tuition INTEGER NOT NULL,
            weeks INTEGER NOT NULL,
            createdAt TEXT NOT NULL
        )"#,
    )
    .await?;

    db.execute_unprepared(
        r"INSERT INTO courses (id, title, minimumSkill, tuition, weeks, createdAt) VALUES
            (1, 'Front End Web Development', 'beginner', 8000, 8, '2024-02-01T00:00:00.000Z'),
            (2, 'Full Stack Web Development', 'intermediate', 10000, 12, '2024-02-02T00:00:00.000Z'),
            (3, 'Full Stack Web Dev', 'intermediate', 12000, 12, '2024-02-03T00:00:00.000Z'),
            (4, 'UI/UX', 'intermediate', 10000, 12, '2024-02-04T00:00:00.000Z'),
            (5, 'Data Science Program', 'advanced', 12000, 10, '2024-02-05T00:00:00.000Z')",
    )
    .await?;

    Ok(db)
}
