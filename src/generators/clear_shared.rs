use super::{add_member_request, list_albums, remove_member_request, Generator};
use crate::api::{ApiClient, Transport};
use crate::error::PlanError;
use crate::plan::{Operation, Plan};
use anyhow::Result;

/// Removes a user from every shared album they belong to. Reverting adds
/// them back with the role they held before.
pub struct ClearShared<'a, T> {
    client: &'a ApiClient<T>,
    email: String,
}

impl<'a, T: Transport> ClearShared<'a, T> {
    pub fn new(client: &'a ApiClient<T>, email: &str) -> Self {
        ClearShared {
            client,
            email: email.to_owned(),
        }
    }
}

impl<T: Transport> Generator for ClearShared<'_, T> {
    fn generate(&self) -> Result<Plan> {
        let mut operations = Vec::new();
        for album in list_albums(self.client, "?shared=true")? {
            let Some(member) = album.member_by_email(&self.email) else {
                continue;
            };
            operations.push(Operation::new(
                remove_member_request(&album.id, &member.user.id),
                add_member_request(&album.id, &member.user.id, member.role)?,
            ));
        }

        if operations.is_empty() {
            return Err(PlanError::NoSharedAlbums(self.email.clone()).into());
        }
        tracing::info!(operations = operations.len(), "clear-shared plan ready");
        Ok(Plan::new(operations))
    }
}
