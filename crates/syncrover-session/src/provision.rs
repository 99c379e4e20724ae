//! Room provisioning client.
//!
//! One call against the external room service: `create_room() -> RoomId`.
//! A failed or malformed response surfaces as [`RoverError::Provisioning`]
//! and the caller aborts — no room, no navigation, no retry.

use serde::Deserialize;
use syncrover_core::{RoomId, RoverError};
use tracing::info;

// MARK: - Wire types

#[derive(Debug, Deserialize)]
struct CreateRoomResponse {
    data: CreateRoomData,
}

#[derive(Debug, Deserialize)]
struct CreateRoomData {
    #[serde(rename = "roomId")]
    room_id: String,
}

// MARK: - RoomClient

pub struct RoomClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RoomClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn create_room(&self) -> Result<RoomId, RoverError> {
        let url = format!("{}/rooms/create-room", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({ "title": "SyncRover Room" }))
            .send()
            .await
            .map_err(provisioning_err)?
            .error_for_status()
            .map_err(provisioning_err)?;

        let body: CreateRoomResponse = response.json().await.map_err(provisioning_err)?;
        if body.data.room_id.is_empty() {
            return Err(RoverError::Provisioning {
                reason: "service returned an empty room id".into(),
            });
        }
        info!("Provisioned room {}", body.data.room_id);
        Ok(RoomId::new(body.data.room_id))
    }
}

fn provisioning_err(e: impl std::fmt::Display) -> RoverError {
    RoverError::Provisioning { reason: e.to_string() }
}
