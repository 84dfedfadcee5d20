use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use meethub_config::MediaSettings;
use serde::{Deserialize, Serialize};

use super::MediaResult;

/// Issues participant access tokens for joining a room on the media
/// server.
pub struct AccessTokenIssuer {
    settings: MediaSettings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub sub: String,
    pub nbf: i64,
    pub exp: i64,
    pub name: String,
    pub video: RoomGrant,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomGrant {
    pub room_join: bool,
    pub room: String,
    pub can_publish: bool,
    pub can_subscribe: bool,
}

impl AccessTokenIssuer {
    pub fn new(settings: MediaSettings) -> Self {
        Self { settings }
    }

    pub fn issue(
        &self,
        room_id: &str,
        identity: &str,
        display_name: &str,
        can_publish: bool,
    ) -> MediaResult<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            iss: self.settings.api_key.clone(),
            sub: identity.to_string(),
            nbf: now - 10,
            exp: now + self.settings.access_token_ttl_secs as i64,
            name: display_name.to_string(),
            video: RoomGrant {
                room_join: true,
                room: room_id.to_string(),
                can_publish,
                can_subscribe: true,
            },
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.api_secret.as_bytes()),
        )?)
    }
}
