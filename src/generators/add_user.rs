use super::{add_member_request, contains_ignore_case, find_user_by_email, list_albums, remove_member_request, Generator};
use crate::api::{ApiClient, Transport};
use crate::error::PlanError;
use crate::plan::{Operation, Plan};
use crate::types::Role;
use anyhow::Result;

/// Shares every album whose name contains a search term with a user, as
/// a viewer. Fails when nothing needs to change.
pub struct AddUser<'a, T> {
    client: &'a ApiClient<T>,
    search_term: String,
    email: String,
}

impl<'a, T: Transport> AddUser<'a, T> {
    pub fn new(client: &'a ApiClient<T>, search_term: &str, email: &str) -> Self {
        AddUser {
            client,
            search_term: search_term.to_owned(),
            email: email.to_owned(),
        }
    }
}

impl<T: Transport> Generator for AddUser<'_, T> {
    fn generate(&self) -> Result<Plan> {
        let albums: Vec<_> = list_albums(self.client, "")?
            .into_iter()
            .filter(|album| contains_ignore_case(&album.album_name, &self.search_term))
            .collect();
        if albums.is_empty() {
            return Err(PlanError::NoMatchingAlbums(self.search_term.clone()).into());
        }

        let user = find_user_by_email(self.client, &self.email)?;

        let mut operations = Vec::new();
        for album in &albums {
            if album.has_member(&user.id) {
                tracing::debug!(album = %album.id, user = %user.id, "already a member");
                continue;
            }
            operations.push(Operation::new(
                add_member_request(&album.id, &user.id, Role::Viewer)?,
                remove_member_request(&album.id, &user.id),
            ));
        }

        if operations.is_empty() {
            return Err(PlanError::NoChangesNeeded(
                "user is already in all matching albums".into(),
            )
            .into());
        }
        tracing::info!(operations = operations.len(), "add-user plan ready");
        Ok(Plan::new(operations))
    }
}
