// SPDX-License-Identifier: MIT

//! Chat and messaging routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Chat, Message};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", post(create_chat))
        .route("/chats", get(list_chats))
        .route("/chats/{chat_id}/messages", post(send_message))
        .route("/chats/{chat_id}/messages", get(list_messages))
}

#[derive(Deserialize)]
pub struct CreateChatRequest {
    pub members: Vec<u64>,
}

/// Create a chat. The caller is always a member.
async fn create_chat(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<Chat>)> {
    let mut members = payload.members;
    if !members.contains(&auth.user_id) {
        members.push(auth.user_id);
    }
    members.sort_unstable();
    members.dedup();

    if members.len() < 2 {
        return Err(AppError::Validation(
            "A chat needs at least two members".to_string(),
        ));
    }

    let chat = Chat {
        chat_id: state.db.next_sequence("chats").await?,
        members,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    state.db.insert_chat(&chat).await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

/// List the caller's chats.
async fn list_chats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Chat>>> {
    Ok(Json(state.db.chats_for_member(auth.user_id).await?))
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

/// Look up a chat and check the caller belongs to it.
async fn member_chat(state: &AppState, chat_id: u64, user_id: u64) -> Result<Chat> {
    let chat = state
        .db
        .get_chat(chat_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Chat {} not found", chat_id)))?;

    if !chat.members.contains(&user_id) {
        return Err(AppError::Unauthorized);
    }
    Ok(chat)
}

/// Send a message to a chat the caller belongs to.
async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<u64>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    member_chat(&state, chat_id, auth.user_id).await?;

    let message = Message {
        message_id: state.db.next_sequence("messages").await?,
        chat_id,
        sender_id: auth.user_id,
        text: payload.text,
        image: payload.image,
        document: payload.document,
        audio: payload.audio,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    if !message.has_content() {
        return Err(AppError::Validation(
            "A message needs text or an attachment".to_string(),
        ));
    }

    state.db.insert_message(&message).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// List messages in a chat, oldest first.
async fn list_messages(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(chat_id): Path<u64>,
) -> Result<Json<Vec<Message>>> {
    member_chat(&state, chat_id, auth.user_id).await?;
    Ok(Json(state.db.messages_for_chat(chat_id).await?))
}
