use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use meethub_config::MediaSettings;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use super::{EgressInfo, MediaError, MediaResult, MediaServer, ParticipantInfo};

/// Lifetime of server-to-server API tokens.
const SERVER_TOKEN_TTL_SECS: i64 = 600;

/// HTTP client for a LiveKit-compatible media server (Twirp JSON API).
pub struct LiveKitClient {
    settings: MediaSettings,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ServerClaims<'a> {
    iss: &'a str,
    nbf: i64,
    exp: i64,
    video: ServerGrant,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerGrant {
    room_list: bool,
    room_admin: bool,
    room_record: bool,
}

#[derive(Serialize)]
struct ListRoomsRequest<'a> {
    names: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ListRoomsResponse {
    #[serde(default)]
    rooms: Vec<RoomWire>,
}

#[derive(Deserialize)]
struct RoomWire {
    #[allow(dead_code)]
    name: String,
}

#[derive(Serialize)]
struct ListParticipantsRequest<'a> {
    room: &'a str,
}

#[derive(Deserialize)]
struct ListParticipantsResponse {
    #[serde(default)]
    participants: Vec<ParticipantWire>,
}

#[derive(Deserialize)]
struct ParticipantWire {
    identity: String,
    #[serde(default)]
    name: String,
}

#[derive(Serialize)]
struct DeleteRoomRequest<'a> {
    room: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListEgressRequest<'a> {
    room_name: &'a str,
    active: bool,
}

#[derive(Deserialize)]
struct ListEgressResponse {
    #[serde(default)]
    items: Vec<EgressWire>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EgressWire {
    egress_id: String,
    #[serde(default)]
    room_name: String,
    /// Epoch nanoseconds; the server encodes int64 as a JSON string.
    #[serde(default, deserialize_with = "de_i64_lenient")]
    updated_at: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StopEgressRequest<'a> {
    egress_id: &'a str,
}

/// Twirp encodes int64 as a decimal string; accept a bare number too.
fn de_i64_lenient<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("int64 out of range")),
        Value::String(s) => s
            .parse()
            .map_err(|_| serde::de::Error::custom("invalid int64 string")),
        Value::Null => Ok(0),
        other => Err(serde::de::Error::custom(format!(
            "unexpected int64 encoding: {other}"
        ))),
    }
}

impl LiveKitClient {
    pub fn new(settings: MediaSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    fn server_token(&self) -> MediaResult<String> {
        let now = Utc::now().timestamp();
        let claims = ServerClaims {
            iss: &self.settings.api_key,
            nbf: now - 10,
            exp: now + SERVER_TOKEN_TTL_SECS,
            video: ServerGrant {
                room_list: true,
                room_admin: true,
                room_record: true,
            },
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.api_secret.as_bytes()),
        )?)
    }

    async fn twirp<Req, Resp>(&self, service: &str, method: &str, req: &Req) -> MediaResult<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!(
            "{}/twirp/{service}/{method}",
            self.settings.url.trim_end_matches('/')
        );
        let resp = self
            .client
            .post(url)
            .bearer_auth(self.server_token()?)
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(MediaError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl MediaServer for LiveKitClient {
    async fn room_exists(&self, room_id: &str) -> MediaResult<bool> {
        let resp: ListRoomsResponse = self
            .twirp(
                "livekit.RoomService",
                "ListRooms",
                &ListRoomsRequest {
                    names: vec![room_id],
                },
            )
            .await?;
        Ok(!resp.rooms.is_empty())
    }

    async fn list_participants(&self, room_id: &str) -> MediaResult<Vec<ParticipantInfo>> {
        let result: MediaResult<ListParticipantsResponse> = self
            .twirp(
                "livekit.RoomService",
                "ListParticipants",
                &ListParticipantsRequest { room: room_id },
            )
            .await;
        match result {
            Ok(resp) => Ok(resp
                .participants
                .into_iter()
                .map(|p| ParticipantInfo {
                    identity: p.identity,
                    name: p.name,
                })
                .collect()),
            // A vanished room has no participants.
            Err(MediaError::Api { status: 404, .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn list_egresses(&self, room_id: &str) -> MediaResult<Vec<EgressInfo>> {
        let resp: ListEgressResponse = self
            .twirp(
                "livekit.Egress",
                "ListEgress",
                &ListEgressRequest {
                    room_name: room_id,
                    active: true,
                },
            )
            .await?;
        Ok(resp
            .items
            .into_iter()
            .map(|e| EgressInfo {
                egress_id: e.egress_id,
                room_id: if e.room_name.is_empty() {
                    room_id.to_string()
                } else {
                    e.room_name
                },
                updated_at_ms: e.updated_at / 1_000_000,
            })
            .collect())
    }

    async fn stop_egress(&self, egress_id: &str) -> MediaResult<()> {
        let result: MediaResult<Value> = self
            .twirp(
                "livekit.Egress",
                "StopEgress",
                &StopEgressRequest { egress_id },
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            // Already gone: stopping is idempotent.
            Err(MediaError::Api { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn delete_room(&self, room_id: &str) -> MediaResult<()> {
        let result: MediaResult<Value> = self
            .twirp(
                "livekit.RoomService",
                "DeleteRoom",
                &DeleteRoomRequest { room: room_id },
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(MediaError::Api { status: 404, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
