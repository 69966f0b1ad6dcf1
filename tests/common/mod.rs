//! In-memory stand-in for the Immich endpoints the planner talks to.
//! It keeps real state, so plans can be applied, reverted and generated
//! again against it.

#![allow(dead_code)]

use immich_planner::api::{ApiClient, RawResponse, Transport};
use reqwest::blocking::Request;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

pub const BASE_URL: &str = "http://immich.test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeAlbum {
    pub name: String,
    /// (user id, role) in insertion order.
    pub members: Vec<(String, String)>,
    pub assets: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    /// Path plus query string.
    pub target: String,
    pub body: Option<String>,
    pub json_content_type: bool,
}

#[derive(Default)]
struct State {
    users: Vec<FakeUser>,
    albums: BTreeMap<String, FakeAlbum>,
    person_pages: BTreeMap<String, Vec<Vec<String>>>,
}

#[derive(Default)]
pub struct FakeImmich {
    state: RefCell<State>,
    calls: RefCell<Vec<Call>>,
    fail_on: RefCell<Option<(Method, String)>>,
}

impl FakeImmich {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(self, id: &str, email: &str, name: &str) -> Self {
        self.state.borrow_mut().users.push(FakeUser {
            id: id.into(),
            email: email.into(),
            name: name.into(),
        });
        self
    }

    pub fn album(self, id: &str, name: &str) -> Self {
        self.state.borrow_mut().albums.insert(
            id.into(),
            FakeAlbum {
                name: name.into(),
                members: Vec::new(),
                assets: BTreeSet::new(),
            },
        );
        self
    }

    pub fn member(self, album: &str, user: &str, role: &str) -> Self {
        if let Some(a) = self.state.borrow_mut().albums.get_mut(album) {
            a.members.push((user.into(), role.into()));
        }
        self
    }

    pub fn assets(self, album: &str, ids: &[&str]) -> Self {
        if let Some(a) = self.state.borrow_mut().albums.get_mut(album) {
            a.assets.extend(ids.iter().map(|id| id.to_string()));
        }
        self
    }

    pub fn person(self, person: &str, pages: &[&[&str]]) -> Self {
        let pages = pages
            .iter()
            .map(|page| page.iter().map(|id| id.to_string()).collect())
            .collect();
        self.state.borrow_mut().person_pages.insert(person.into(), pages);
        self
    }

    /// Answer `method target` with a 500 from now on.
    pub fn fail_on(&self, method: Method, target: &str) {
        *self.fail_on.borrow_mut() = Some((method, target.to_owned()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Current album state, with members sorted for comparison.
    pub fn albums(&self) -> BTreeMap<String, FakeAlbum> {
        let mut albums = self.state.borrow().albums.clone();
        for album in albums.values_mut() {
            album.members.sort();
        }
        albums
    }

    fn album_json(&self, state: &State, id: &str, album: &FakeAlbum, with_assets: bool) -> Value {
        let members: Vec<Value> = album
            .members
            .iter()
            .map(|(user_id, role)| {
                let user = state.users.iter().find(|u| &u.id == user_id);
                json!({
                    "user": {
                        "id": user_id,
                        "email": user.map(|u| u.email.as_str()).unwrap_or(""),
                        "name": user.map(|u| u.name.as_str()).unwrap_or(""),
                    },
                    "role": role,
                })
            })
            .collect();
        let mut value = json!({
            "id": id,
            "albumName": album.name,
            "shared": !album.members.is_empty(),
            "albumUsers": members,
            "assetCount": album.assets.len(),
        });
        if with_assets {
            value["assets"] = album.assets.iter().map(|a| json!({ "id": a })).collect();
        }
        value
    }

    fn route(&self, method: &Method, path: &str, query: &BTreeMap<String, String>, body: Option<&Value>) -> (StatusCode, Value) {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let mut state = self.state.borrow_mut();

        match (method.as_str(), segments.as_slice()) {
            ("GET", ["api", "users"]) => {
                let users: Vec<Value> = state
                    .users
                    .iter()
                    .map(|u| json!({ "id": u.id, "email": u.email, "name": u.name }))
                    .collect();
                (StatusCode::OK, Value::Array(users))
            }
            ("GET", ["api", "albums"]) => {
                let shared_only = query.get("shared").map(String::as_str) == Some("true");
                let asset = query.get("assetId");
                let albums: Vec<Value> = state
                    .albums
                    .iter()
                    .filter(|(_, a)| !shared_only || !a.members.is_empty())
                    .filter(|(_, a)| asset.map_or(true, |id| a.assets.contains(id)))
                    .map(|(id, a)| self.album_json(&state, id, a, false))
                    .collect();
                (StatusCode::OK, Value::Array(albums))
            }
            ("GET", ["api", "albums", id]) => match state.albums.get(*id) {
                Some(album) => {
                    let with_assets = query.get("withoutAssets").map(String::as_str) == Some("false");
                    (StatusCode::OK, self.album_json(&state, id, album, with_assets))
                }
                None => not_found(),
            },
            ("PATCH", ["api", "albums", id]) => {
                let Some(album) = state.albums.get_mut(*id) else {
                    return not_found();
                };
                let Some(name) = body.and_then(|b| b["albumName"].as_str()) else {
                    return bad_request("albumName is required");
                };
                album.name = name.to_owned();
                (StatusCode::OK, json!({ "id": id, "albumName": name }))
            }
            ("PUT", ["api", "albums", id, "users"]) => {
                let Some(album) = state.albums.get_mut(*id) else {
                    return not_found();
                };
                let grants = body
                    .and_then(|b| b["albumUsers"].as_array())
                    .cloned()
                    .unwrap_or_default();
                for grant in grants {
                    let user_id = grant["userId"].as_str().unwrap_or_default().to_owned();
                    if album.members.iter().any(|(id, _)| *id == user_id) {
                        return bad_request("User already added");
                    }
                    let role = grant["role"].as_str().unwrap_or("viewer").to_owned();
                    album.members.push((user_id, role));
                }
                (StatusCode::OK, json!({ "id": id }))
            }
            ("DELETE", ["api", "albums", id, "user", user_id]) => {
                let Some(album) = state.albums.get_mut(*id) else {
                    return not_found();
                };
                let before = album.members.len();
                album.members.retain(|(member, _)| member != user_id);
                if album.members.len() == before {
                    return bad_request("Album not shared with user");
                }
                (StatusCode::NO_CONTENT, Value::Null)
            }
            (verb @ ("PUT" | "DELETE"), ["api", "albums", id, "assets"]) => {
                let Some(album) = state.albums.get_mut(*id) else {
                    return not_found();
                };
                let ids: Vec<String> = body
                    .and_then(|b| b["ids"].as_array())
                    .map(|ids| ids.iter().filter_map(|v| v.as_str().map(str::to_owned)).collect())
                    .unwrap_or_default();
                let results: Vec<Value> = ids
                    .iter()
                    .map(|asset| {
                        let success = if verb == "PUT" {
                            album.assets.insert(asset.clone())
                        } else {
                            album.assets.remove(asset)
                        };
                        json!({ "id": asset, "success": success })
                    })
                    .collect();
                (StatusCode::OK, Value::Array(results))
            }
            ("POST", ["api", "search", "metadata"]) => {
                let person = body
                    .and_then(|b| b["personIds"][0].as_str())
                    .unwrap_or_default();
                let page: usize = body
                    .and_then(|b| b["page"].as_str())
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(1);
                let pages = state.person_pages.get(person).cloned().unwrap_or_default();
                let items: Vec<Value> = pages
                    .get(page - 1)
                    .map(|ids| ids.iter().map(|id| json!({ "id": id })).collect())
                    .unwrap_or_default();
                let next = (page < pages.len()).then(|| (page + 1).to_string());
                (
                    StatusCode::OK,
                    json!({ "assets": { "items": items, "nextPage": next } }),
                )
            }
            _ => not_found(),
        }
    }
}

fn not_found() -> (StatusCode, Value) {
    (StatusCode::NOT_FOUND, json!({ "message": "Not found" }))
}

fn bad_request(message: &str) -> (StatusCode, Value) {
    (StatusCode::BAD_REQUEST, json!({ "message": message }))
}

impl Transport for FakeImmich {
    fn send(&self, request: Request) -> reqwest::Result<RawResponse> {
        let url = request.url();
        let path = url.path().to_owned();
        let target = match url.query() {
            Some(q) => format!("{path}?{q}"),
            None => path.clone(),
        };
        let query: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        let raw_body = request
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned());
        let body: Option<Value> = raw_body.as_deref().and_then(|b| serde_json::from_str(b).ok());

        self.calls.borrow_mut().push(Call {
            method: request.method().clone(),
            target: target.clone(),
            body: raw_body,
            json_content_type: request
                .headers()
                .get(CONTENT_TYPE)
                .is_some_and(|v| v == "application/json"),
        });

        if let Some((method, failing)) = self.fail_on.borrow().as_ref() {
            if method == request.method() && *failing == target {
                return Ok(RawResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: r#"{"message":"boom"}"#.into(),
                });
            }
        }

        let (status, value) = self.route(request.method(), &path, &query, body.as_ref());
        let body = if value.is_null() { String::new() } else { value.to_string() };
        Ok(RawResponse { status, body })
    }
}

pub fn client(fake: FakeImmich) -> ApiClient<FakeImmich> {
    ApiClient::with_transport(fake, BASE_URL, "test-key")
}

/// The vacation/work fixture used by several generator tests.
pub fn vacation_server() -> FakeImmich {
    FakeImmich::new()
        .user("user123", "test@example.com", "Test User")
        .user("user456", "other@example.com", "Other User")
        .album("1", "vacation photos")
        .album("2", "work photos")
        .album("3", "vacation memories")
        .member("3", "user123", "viewer")
}
