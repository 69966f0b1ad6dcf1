use super::{list_albums, rename_request, Generator};
use crate::api::{ApiClient, Transport};
use crate::error::PlanError;
use crate::plan::{Operation, Plan};
use anyhow::Result;

/// Replaces every occurrence of `before` with `after` in album names.
/// Matching is case sensitive. An empty plan is a valid outcome.
pub struct Replace<'a, T> {
    client: &'a ApiClient<T>,
    before: String,
    after: String,
}

impl<'a, T: Transport> Replace<'a, T> {
    pub fn new(client: &'a ApiClient<T>, before: &str, after: &str) -> Self {
        Replace {
            client,
            before: before.to_owned(),
            after: after.to_owned(),
        }
    }
}

impl<T: Transport> Generator for Replace<'_, T> {
    fn generate(&self) -> Result<Plan> {
        if self.before.is_empty() {
            return Err(PlanError::EmptySearchText.into());
        }

        let mut operations = Vec::new();
        for album in list_albums(self.client, "")? {
            if !album.album_name.contains(&self.before) {
                continue;
            }
            let renamed = album.album_name.replace(&self.before, &self.after);
            if renamed == album.album_name {
                tracing::debug!(album = %album.id, "name unchanged, skipping");
                continue;
            }
            operations.push(Operation::new(
                rename_request(&album.id, &renamed)?,
                rename_request(&album.id, &album.album_name)?,
            ));
        }

        tracing::info!(operations = operations.len(), "rename plan ready");
        Ok(Plan::new(operations))
    }
}
