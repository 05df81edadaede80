// SPDX-License-Identifier: MIT

//! Registry-driven request dispatch and endpoint handlers.
//!
//! Each request moves through the same gates: schema validation (400 with
//! the violated fields), authentication where the registry requires it
//! (401), then the handler, whose domain errors already carry their status.
//! Routes are generated from the registry, one POST per entry under
//! `/api/{endpointName}`.

use crate::error::{AppError, Result};
use crate::models::{new_id, Comment, Edge, EdgeKind, Media, Post, User};
use crate::registry::{self, Endpoint, EndpointSpec};
use crate::services::{feed, TokenService};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Build one POST route per registry entry.
pub fn routes() -> Router<Arc<AppState>> {
    let mut router = Router::new();
    for spec in registry::REGISTRY {
        let path = format!("/api/{}", spec.endpoint.name());
        router = router.route(
            &path,
            post(move |state: State<Arc<AppState>>, body: Json<Value>| {
                dispatch(spec, state, body)
            }),
        );
    }
    router
}

/// Per-request state machine: validate, authenticate, handle, respond.
async fn dispatch(
    spec: &'static EndpointSpec,
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    spec.query.validate(&body).map_err(AppError::Validation)?;

    let auth_user = if spec.requires_auth {
        Some(authenticate(&state, &body).await?)
    } else {
        None
    };

    let response = match spec.endpoint {
        Endpoint::CreateAccount => respond(create_account(&state, parse(body)?).await?),
        Endpoint::SignIn => respond(sign_in(&state, parse(body)?).await?),
        Endpoint::CreatePost => {
            let user = auth_user.ok_or(AppError::Unauthorized)?;
            respond(create_post(&state, user, parse(body)?).await?)
        }
        Endpoint::GetPost => respond(get_post(&state, parse(body)?).await?),
        Endpoint::GetUser => respond(get_user(&state, parse(body)?).await?),
        Endpoint::GetFeed => respond(get_feed(&state, parse(body)?).await?),
        Endpoint::CreateComment => {
            let user = auth_user.ok_or(AppError::Unauthorized)?;
            respond(create_comment(&state, user, parse(body)?).await?)
        }
        Endpoint::GetComments => respond(get_comments(&state, parse(body)?).await?),
        Endpoint::CreateEdge => {
            let user = auth_user.ok_or(AppError::Unauthorized)?;
            respond(create_edge(&state, user, parse(body)?).await?)
        }
        Endpoint::UpdateUser => {
            let user = auth_user.ok_or(AppError::Unauthorized)?;
            respond(update_user(&state, user, parse(body)?).await?)
        }
    }?;

    Ok(Json(response))
}

/// Resolve the `token` body field to a user, or fail with 401.
async fn authenticate(state: &AppState, body: &Value) -> Result<User> {
    let token = body
        .get("token")
        .and_then(Value::as_str)
        .ok_or(AppError::Unauthorized)?;

    let db = state.db.clone();
    let user = state
        .tokens
        .validate(token, move |id| async move { db.find_user_by_id(&id).await })
        .await?;

    Ok(user)
}

/// Deserialize the already schema-validated body into a request type.
fn parse<T: serde::de::DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn respond<T: Serialize>(value: T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.into()))
}

/// Response carrying only a generated id.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: String,
}

// ─── createAccount ───────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountRequest {
    username: String,
    password: String,
    display_name: String,
    email: String,
}

async fn create_account(state: &AppState, req: CreateAccountRequest) -> Result<IdResponse> {
    if state
        .db
        .find_user_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "username '{}' is already taken",
            req.username
        )));
    }

    // Fresh accounts get an empty placeholder picture so the profile always
    // has something to render.
    let placeholder = Media {
        id: new_id(),
        data: Vec::new(),
        mime_type: "image/png".to_string(),
    };
    state.db.create_media(&placeholder).await?;

    let user = User {
        id: new_id(),
        username: req.username,
        display_name: req.display_name,
        password: req.password,
        email: req.email,
        profile_background: None,
        profile_picture: Some(placeholder.id),
        last_token_reset: TokenService::now(),
    };
    state.db.create_user(&user).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Account created");

    Ok(IdResponse { id: user.id })
}

// ─── signIn ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct SignInRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub id: String,
    pub token: String,
}

async fn sign_in(state: &AppState, req: SignInRequest) -> Result<SignInResponse> {
    let user = state
        .db
        .find_user_by_credentials(&req.username, &req.password)
        .await?
        .ok_or_else(|| AppError::BadRequest("invalid username or password".to_string()))?;

    // One clock read for both the reset epoch and the new token's issue
    // time, so the token we hand back is never already stale.
    let now = TokenService::now();
    state.db.set_last_token_reset(&user.id, now).await?;
    let token = state.tokens.issue_at(&user.id, now)?;

    tracing::info!(user_id = %user.id, "Signed in; previous tokens revoked");

    Ok(SignInResponse { id: user.id, token })
}

// ─── createPost ──────────────────────────────────────────────

#[derive(Deserialize)]
struct CreatePostRequest {
    description: String,
    media: String,
    expires: Option<i64>,
}

async fn create_post(state: &AppState, user: User, req: CreatePostRequest) -> Result<IdResponse> {
    let post = Post {
        id: new_id(),
        author: user.id,
        media: req.media,
        created: chrono::Utc::now().timestamp_millis(),
        expires: req.expires,
        description: req.description,
    };
    state.db.create_post(&post).await?;

    tracing::debug!(post_id = %post.id, author = %post.author, "Post created");

    Ok(IdResponse { id: post.id })
}

// ─── getPost / getUser ───────────────────────────────────────

#[derive(Deserialize)]
struct ByIdRequest {
    id: String,
}

async fn get_post(state: &AppState, req: ByIdRequest) -> Result<Post> {
    state
        .db
        .find_post_by_id(&req.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {} does not exist", req.id)))
}

async fn get_user(state: &AppState, req: ByIdRequest) -> Result<User> {
    // Unlike getPost, a missing user is a 400 here. The asymmetry is part of
    // the public contract and clients depend on it.
    state
        .db
        .find_user_by_id(&req.id)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("user {} does not exist", req.id)))
}

// ─── getFeed ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct FeedRequest {
    author: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub posts: Vec<Post>,
}

async fn get_feed(state: &AppState, req: FeedRequest) -> Result<FeedResponse> {
    let authors = req.author.ok_or_else(|| {
        AppError::BadRequest("at least one filter is required (author)".to_string())
    })?;

    let posts = state.db.find_posts_by_authors(&authors).await?;
    let posts = feed::assemble(posts);

    tracing::debug!(authors = authors.len(), posts = posts.len(), "Feed assembled");

    Ok(FeedResponse { posts })
}

// ─── createComment / getComments ─────────────────────────────

#[derive(Deserialize)]
struct CreateCommentRequest {
    text: String,
    parent: String,
}

async fn create_comment(
    state: &AppState,
    user: User,
    req: CreateCommentRequest,
) -> Result<IdResponse> {
    if state.db.find_post_by_id(&req.parent).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "post {} does not exist",
            req.parent
        )));
    }

    let comment = Comment {
        id: new_id(),
        text: req.text,
        author: user.id,
        parent: req.parent,
    };
    state.db.create_comment(&comment).await?;

    Ok(IdResponse { id: comment.id })
}

#[derive(Deserialize)]
struct GetCommentsRequest {
    parent: String,
}

#[derive(Debug, Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<Comment>,
}

async fn get_comments(state: &AppState, req: GetCommentsRequest) -> Result<CommentsResponse> {
    if state.db.find_post_by_id(&req.parent).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "post {} does not exist",
            req.parent
        )));
    }

    let comments = state.db.find_comments_by_parent(&req.parent).await?;
    Ok(CommentsResponse { comments })
}

// ─── createEdge ──────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateEdgeRequest {
    target: String,
    kind: EdgeKind,
}

async fn create_edge(state: &AppState, user: User, req: CreateEdgeRequest) -> Result<IdResponse> {
    if state.db.find_user_by_id(&req.target).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "user {} does not exist",
            req.target
        )));
    }

    // Repeated follow/like edges between the same pair are stored as-is.
    let edge = Edge {
        id: new_id(),
        source: user.id,
        target: req.target,
        kind: req.kind,
    };
    state.db.create_edge(&edge).await?;

    Ok(IdResponse { id: edge.id })
}

// ─── updateUser ──────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    display_name: Option<String>,
    email: Option<String>,
    profile_background: Option<String>,
    profile_picture: Option<String>,
}

async fn update_user(state: &AppState, user: User, req: UpdateUserRequest) -> Result<User> {
    state
        .db
        .update_user_profile(
            &user.id,
            req.display_name.as_deref(),
            req.email.as_deref(),
            req.profile_background.as_deref(),
            req.profile_picture.as_deref(),
        )
        .await?;

    state
        .db
        .find_user_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} does not exist", user.id)))
}
