// Shapes of the records read from the Immich API. Only the fields the
// planners need are decoded; everything else in the payload is ignored.

use crate::generators::eq_ignore_case;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Album membership role. Anything the server reports outside this set is
/// read back as `Viewer` so it can never leak into a generated body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Viewer,
    Editor,
}

impl Role {
    /// Map a loosely typed role string onto the closed set.
    pub fn normalize(raw: &str) -> Role {
        match raw {
            "editor" => Role::Editor,
            "viewer" => Role::Viewer,
            other => {
                tracing::warn!(role = other, "unrecognized album role, using viewer");
                Role::Viewer
            }
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Role::normalize(&raw),
            Value::Null => Role::default(),
            other => {
                tracing::warn!(role = %other, "non-string album role, using viewer");
                Role::Viewer
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumUser {
    pub user: User,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub album_name: String,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub album_users: Vec<AlbumUser>,
    /// Only populated by the album detail endpoint.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Album {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.album_users.iter().any(|member| member.user.id == user_id)
    }

    /// First membership whose email matches, ignoring case.
    pub fn member_by_email(&self, email: &str) -> Option<&AlbumUser> {
        self.album_users
            .iter()
            .find(|member| eq_ignore_case(&member.user.email, email))
    }
}

/// `{albumUsers: [{role, userId}]}` for `PUT /api/albums/{id}/users`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddUsersBody<'a> {
    pub album_users: Vec<MemberGrant<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberGrant<'a> {
    pub role: Role,
    pub user_id: &'a str,
}

/// `{albumName}` for `PATCH /api/albums/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameBody<'a> {
    pub album_name: &'a str,
}

/// `{ids: [...]}` for bulk asset membership changes.
#[derive(Debug, Serialize)]
pub struct AssetIdsBody<'a> {
    pub ids: &'a [String],
}

/// `{page, personIds}` for `POST /api/search/metadata`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadataBody<'a> {
    pub page: &'a str,
    pub person_ids: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
pub struct SearchMetadataResponse {
    pub assets: AssetPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPage {
    #[serde(default)]
    pub items: Vec<Asset>,
    pub next_page: Option<String>,
}
