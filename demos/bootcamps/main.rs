//! Bootcamp directory API over seeded in-memory collections.
//!
//! ```bash
//! cargo run --example bootcamps
//! curl -g 'http://localhost:5000/api/v1/bootcamps?careers[in]=Business&select=name,careers&sort=name'
//! curl -g 'http://localhost:5000/api/v1/courses?tuition[lte]=10000&page=2&limit=2'
//! ```
//!
//! `PORT` sets the listening port (default 5000); `RUST_LOG` the log filter.
//! `QUERYCRATE_DEFAULT_LIMIT`, `QUERYCRATE_MAX_LIMIT` and
//! `QUERYCRATE_COUNT_MODE` tune pagination.

mod seed;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use querycrate::{
    ApiError, ListResource, ListResults, MemoryCollection, Populate, QueryConfig, Relation,
    get_one_handler, list_handler, scoped_list,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

/// Courses or reviews of one bootcamp.
async fn bootcamp_children(
    State(children): State<ListResource>,
    Path(bootcamp_id): Path<String>,
) -> Result<Json<ListResults>, ApiError> {
    Ok(Json(
        scoped_list(children.collection.as_ref(), "bootcamp", &bootcamp_id).await?,
    ))
}

fn resource_router(path: &str, resource: ListResource) -> Router {
    Router::new()
        .route(path, get(list_handler))
        .route(&format!("{path}/{{id}}"), get(get_one_handler))
        .with_state(resource)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("querycrate=debug,tower_http=info")),
        )
        .init();

    let bootcamps = Arc::new(
        MemoryCollection::new("bootcamps")
            .with_unique("name")
            .with_required("name"),
    );
    let courses = Arc::new(MemoryCollection::new("courses").with_required("title"));
    let reviews = Arc::new(MemoryCollection::new("reviews").with_required("title"));
    let users = Arc::new(MemoryCollection::new("users").with_unique("email"));

    bootcamps.relate("courses", Relation::reverse(&courses, "bootcamp"))?;
    courses.relate("bootcamp", Relation::reference(&bootcamps, "bootcamp"))?;
    reviews.relate("bootcamp", Relation::reference(&bootcamps, "bootcamp"))?;

    bootcamps.insert_many(seed::bootcamps())?;
    courses.insert_many(seed::courses())?;
    reviews.insert_many(seed::reviews())?;
    users.insert_many(seed::users())?;
    tracing::info!(
        bootcamps = bootcamps.len(),
        courses = courses.len(),
        reviews = reviews.len(),
        users = users.len(),
        "Seeded collections"
    );

    let config = QueryConfig::from_env();
    let bootcamp_summary = || Populate::new("bootcamp").select("name,description");

    let courses_resource = ListResource::new(courses)
        .with_populate(bootcamp_summary())
        .with_config(config.clone());

    let reviews_resource = ListResource::new(reviews)
        .with_populate(bootcamp_summary())
        .with_config(config.clone());

    let api = Router::new()
        .merge(resource_router(
            "/bootcamps",
            ListResource::new(bootcamps)
                .with_populate("courses")
                .with_config(config.clone()),
        ))
        .merge(resource_router("/courses", courses_resource.clone()))
        .merge(
            Router::new()
                .route("/bootcamps/{id}/courses", get(bootcamp_children))
                .with_state(courses_resource),
        )
        .merge(resource_router("/reviews", reviews_resource.clone()))
        .merge(
            Router::new()
                .route("/bootcamps/{id}/reviews", get(bootcamp_children))
                .with_state(reviews_resource),
        )
        .merge(resource_router(
            "/users",
            ListResource::new(users).with_config(config),
        ));

    let app = Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .unwrap_or(5000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
