use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{FromRequestParts, Path, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::config::QueryConfig;
use crate::core::{Collection, FindQuery, Populate};
use crate::errors::ApiError;
use crate::filtering::{FilterExpression, RawQuery, calculate_content_range};
use crate::models::{AdvancedResults, ItemResult, ListResults};
use crate::operations::advanced_results;

impl<S> FromRequestParts<S> for RawQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or_default())?)
    }
}

/// Router state for one paginated resource.
///
/// ```rust,ignore
/// let bootcamps = ListResource::new(bootcamps).with_populate(Populate::new("courses"));
/// let app = Router::new()
///     .route("/bootcamps", get(list_handler))
///     .with_state(bootcamps);
/// ```
#[derive(Clone)]
pub struct ListResource {
    pub collection: Arc<dyn Collection>,
    pub populate: Option<Populate>,
    pub config: QueryConfig,
}

impl ListResource {
    #[must_use]
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self {
            collection,
            populate: None,
            config: QueryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_populate(mut self, populate: impl Into<Populate>) -> Self {
        self.populate = Some(populate.into());
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    async fn results(&self, raw: &RawQuery) -> Result<AdvancedResults, ApiError> {
        Ok(advanced_results(
            self.collection.as_ref(),
            raw,
            self.populate.as_ref(),
            &self.config,
        )
        .await?)
    }
}

/// Middleware that runs the list query and stores the [`AdvancedResults`]
/// in the request extensions for the next handler.
///
/// Use with `axum::middleware::from_fn_with_state`; pair it with
/// [`respond_with_advanced_results`] or any handler taking
/// `Extension<AdvancedResults>`. On failure the request stops here with
/// the error envelope.
///
/// # Errors
///
/// Any [`ApiError`] raised while translating or running the query.
pub async fn advanced_results_middleware(
    State(resource): State<ListResource>,
    raw: RawQuery,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let results = resource.results(&raw).await?;
    request.extensions_mut().insert(results);
    Ok(next.run(request).await)
}

/// Send the results attached by [`advanced_results_middleware`].
pub async fn respond_with_advanced_results(
    Extension(results): Extension<AdvancedResults>,
) -> Json<AdvancedResults> {
    Json(results)
}

/// List handler: the [`AdvancedResults`] body plus a `Content-Range` header.
///
/// # Errors
///
/// Any [`ApiError`] raised while translating or running the query.
pub async fn list_handler(
    State(resource): State<ListResource>,
    raw: RawQuery,
) -> Result<(HeaderMap, Json<AdvancedResults>), ApiError> {
    let results = resource.results(&raw).await?;
    let headers = calculate_content_range(
        results.window.skip,
        u64::try_from(results.count).unwrap_or(u64::MAX),
        results.total,
        resource.collection.name(),
    );
    Ok((headers, Json(results)))
}

/// Fetch one document of the resource by id, with the resource's
/// relation expanded as in its listing.
///
/// # Errors
///
/// 404 when no document has this id.
pub async fn get_one_handler(
    State(resource): State<ListResource>,
    Path(id): Path<String>,
) -> Result<Json<ItemResult>, ApiError> {
    let document = resource
        .collection
        .find_by_id_with(&id, resource.populate.as_ref())
        .await?;
    Ok(Json(ItemResult::new(document)))
}

/// Every document whose `field` equals `id`, unpaginated.
///
/// Answers nested listings such as `/bootcamps/{id}/courses`.
///
/// # Errors
///
/// Any [`ApiError`] raised by the collection.
pub async fn scoped_list(
    collection: &dyn Collection,
    field: &str,
    id: &str,
) -> Result<ListResults, ApiError> {
    let query = FindQuery::new(FilterExpression::equals(field, id));
    let data = collection.find(&query).await?;
    tracing::debug!(collection = collection.name(), field, id, count = data.len(), "Scoped list");
    Ok(ListResults::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryCollection;
    use axum::{Router, body::Body, http::StatusCode, middleware, routing::get};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn courses() -> Arc<MemoryCollection> {
        let courses = MemoryCollection::new("courses");
        for (i, tuition) in [8000, 10000, 12000, 6000, 9000].into_iter().enumerate() {
            courses
                .insert(json!({
                    "_id": format!("c{i}"),
                    "title": format!("Course {i}"),
                    "tuition": tuition,
                    "bootcamp": if i % 2 == 0 { "b1" } else { "b2" },
                    "createdAt": format!("2024-01-0{}T00:00:00.000Z", i + 1),
                }))
                .unwrap();
        }
        Arc::new(courses)
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_handler_sets_content_range() {
        let app = Router::new()
            .route("/courses", get(list_handler))
            .with_state(ListResource::new(courses()));

        let (status, headers, body) = call(app, "/courses?limit=2&page=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["Content-Range"], "courses 2-3/5");
        assert_eq!(body["count"], 2);
        assert_eq!(body["pagination"], json!({"next": {"page": 3, "limit": 2}, "prev": {"page": 1, "limit": 2}}));
    }

    #[tokio::test]
    async fn test_middleware_attaches_results() {
        let resource = ListResource::new(courses());
        let app = Router::new()
            .route("/courses", get(respond_with_advanced_results))
            .route_layer(middleware::from_fn_with_state(
                resource.clone(),
                advanced_results_middleware,
            ))
            .with_state(resource);

        let (status, _, body) = call(app, "/courses?tuition%5Bgte%5D=9000&sort=tuition&select=tuition").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!([
                {"_id": "c4", "tuition": 9000},
                {"_id": "c1", "tuition": 10000},
                {"_id": "c2", "tuition": 12000},
            ])
        );
    }

    #[tokio::test]
    async fn test_middleware_short_circuits_on_bad_filter() {
        let resource = ListResource::new(courses());
        let app = Router::new()
            .route("/courses", get(respond_with_advanced_results))
            .route_layer(middleware::from_fn_with_state(
                resource.clone(),
                advanced_results_middleware,
            ))
            .with_state(resource);

        let (status, _, body) = call(app, "/courses?tuition%5Bgt%5D=1&tuition%5Bregex%5D=x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_get_one_handler() {
        let app = Router::new()
            .route("/courses/{id}", get(get_one_handler))
            .with_state(ListResource::new(courses()));

        let (status, _, body) = call(app.clone(), "/courses/c3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tuition"], 6000);

        let (status, _, body) = call(app, "/courses/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_scoped_list() {
        let courses = courses();
        let results = scoped_list(courses.as_ref(), "bootcamp", "b2").await.unwrap();
        assert_eq!(results.count, 2);
        assert!(results.data.iter().all(|doc| doc["bootcamp"] == "b2"));
    }
}
