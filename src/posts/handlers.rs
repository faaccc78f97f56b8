use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};

use super::{
    dto::{CreatePostRequest, CreatedPostResponse},
    repo_types::{NewPost, PostSummary},
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/get/blog", get(list_posts))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/post/blog", post(create_post))
}

#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<PostSummary>>, ApiError> {
    let posts = state.cache.get(state.posts.as_ref()).await?;
    Ok(Json(posts.as_ref().clone()))
}

#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(author): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<CreatedPostResponse>, ApiError> {
    let id = state
        .posts
        .create(NewPost {
            title: &payload.title,
            content: &payload.content,
            author: &author,
        })
        .await?;
    info!(%id, %author, "post created");

    // the post is saved; a failed rebuild leaves the cache empty for the next read
    if let Err(e) = state.cache.refresh(state.posts.as_ref()).await {
        error!(error = %format!("{e:#}"), %id, "post cache rebuild failed");
    }

    Ok(Json(CreatedPostResponse {
        id,
        message: "Blog saved successfully",
    }))
}
