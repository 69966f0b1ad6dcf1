// Plan generators. Each one reads the current state of the server,
// compares it with the state the user asked for and emits one operation
// per change still needed. Entities already in the target state are
// skipped, so generating again after an apply yields nothing to do.
//
// The lookups and request builders shared between generators live here.

pub mod add_person;
pub mod add_user;
pub mod clear_shared;
pub mod replace;
pub mod smart;

pub use add_person::AddPerson;
pub use add_user::AddUser;
pub use clear_shared::ClearShared;
pub use replace::Replace;
pub use smart::Smart;

use crate::api::{ApiClient, Transport};
use crate::error::PlanError;
use crate::plan::{Body, Plan, Request};
use crate::types::{AddUsersBody, Album, AssetIdsBody, MemberGrant, RenameBody, Role, User};
use anyhow::{Context, Result};
use reqwest::Method;

/// Anything that can compute a plan from the server's current state.
pub trait Generator {
    fn generate(&self) -> Result<Plan>;
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

/// Collect every item of a paginated listing, starting at `first`. Each
/// call to `fetch` receives the cursor of the page to load; the loop stops
/// as soon as a page comes back without a next cursor.
pub fn paginate<T, F>(first: &str, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(&str) -> Result<Page<T>>,
{
    let mut items = Vec::new();
    let mut cursor = first.to_owned();
    loop {
        let page = fetch(&cursor)?;
        items.extend(page.items);
        match page.next {
            Some(next) => cursor = next,
            None => return Ok(items),
        }
    }
}

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whole-string comparison with Unicode case folding.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

pub(crate) fn list_users<T: Transport>(client: &ApiClient<T>) -> Result<Vec<User>> {
    client.get("/api/users").context("getting users")
}

/// The first user whose email matches, ignoring case.
pub(crate) fn find_user_by_email<T: Transport>(client: &ApiClient<T>, email: &str) -> Result<User> {
    list_users(client)?
        .into_iter()
        .find(|user| eq_ignore_case(&user.email, email))
        .ok_or_else(|| PlanError::UserNotFound(email.to_owned()).into())
}

/// `GET /api/albums` with an optional query string such as `?shared=true`.
pub(crate) fn list_albums<T: Transport>(client: &ApiClient<T>, query: &str) -> Result<Vec<Album>> {
    client
        .get(&format!("/api/albums{query}"))
        .with_context(|| format!("getting albums{query}"))
}

pub(crate) fn get_album<T: Transport>(client: &ApiClient<T>, album_id: &str) -> Result<Album> {
    client
        .get(&format!("/api/albums/{album_id}"))
        .with_context(|| format!("getting album {album_id}"))
}

/// Album detail including its asset list.
pub(crate) fn get_album_with_assets<T: Transport>(client: &ApiClient<T>, album_id: &str) -> Result<Album> {
    client
        .get(&format!("/api/albums/{album_id}?withoutAssets=false"))
        .with_context(|| format!("getting assets of album {album_id}"))
}

fn body<B: serde::Serialize>(payload: &B) -> Result<Body> {
    Body::from_value(payload).context("encoding request body")
}

pub(crate) fn rename_request(album_id: &str, name: &str) -> Result<Request> {
    Ok(Request::new(
        Method::PATCH,
        format!("/api/albums/{album_id}"),
        Some(body(&RenameBody { album_name: name })?),
    ))
}

pub(crate) fn add_member_request(album_id: &str, user_id: &str, role: Role) -> Result<Request> {
    let grant = AddUsersBody {
        album_users: vec![MemberGrant { role, user_id }],
    };
    Ok(Request::new(
        Method::PUT,
        format!("/api/albums/{album_id}/users"),
        Some(body(&grant)?),
    ))
}

/// Member removal carries no body at all.
pub(crate) fn remove_member_request(album_id: &str, user_id: &str) -> Request {
    Request::new(Method::DELETE, format!("/api/albums/{album_id}/user/{user_id}"), None)
}

pub(crate) fn add_assets_request(album_id: &str, ids: &[String]) -> Result<Request> {
    Ok(Request::new(
        Method::PUT,
        format!("/api/albums/{album_id}/assets"),
        Some(body(&AssetIdsBody { ids })?),
    ))
}

pub(crate) fn remove_assets_request(album_id: &str, ids: &[String]) -> Result<Request> {
    Ok(Request::new(
        Method::DELETE,
        format!("/api/albums/{album_id}/assets"),
        Some(body(&AssetIdsBody { ids })?),
    ))
}
