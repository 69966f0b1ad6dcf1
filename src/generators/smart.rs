use super::{add_assets_request, find_user_by_email, get_album_with_assets, list_albums, remove_assets_request, Generator};
use crate::api::{ApiClient, Transport};
use crate::error::PlanError;
use crate::plan::{Operation, Plan};
use anyhow::{Context, Result};
use std::collections::BTreeSet;

/// Keeps the "All <name>" album of a user in sync with the union of every
/// other album shared with them. The aggregation album must already exist.
/// An empty plan means the album is up to date.
pub struct Smart<'a, T> {
    client: &'a ApiClient<T>,
    email: String,
}

/// Name of the aggregation album for a user's display name.
pub fn aggregation_album_name(display_name: &str) -> String {
    format!("All {display_name}")
}

impl<'a, T: Transport> Smart<'a, T> {
    pub fn new(client: &'a ApiClient<T>, email: &str) -> Self {
        Smart {
            client,
            email: email.to_owned(),
        }
    }

    fn asset_ids(&self, album_id: &str) -> Result<BTreeSet<String>> {
        let album = get_album_with_assets(self.client, album_id)?;
        Ok(album.assets.into_iter().map(|asset| asset.id).collect())
    }
}

impl<T: Transport> Generator for Smart<'_, T> {
    fn generate(&self) -> Result<Plan> {
        let user = find_user_by_email(self.client, &self.email).context("finding user by email")?;
        let target_name = aggregation_album_name(&user.name);

        let albums = list_albums(self.client, "")?;
        let target = albums
            .iter()
            .find(|album| album.album_name == target_name)
            .ok_or_else(|| PlanError::SmartAlbumMissing(target_name.clone()))?;

        let mut wanted = BTreeSet::new();
        for album in albums
            .iter()
            .filter(|album| album.id != target.id && album.has_member(&user.id))
        {
            wanted.extend(self.asset_ids(&album.id)?);
        }
        let current = self.asset_ids(&target.id)?;

        let extras: Vec<String> = current.difference(&wanted).cloned().collect();
        let missing: Vec<String> = wanted.difference(&current).cloned().collect();
        tracing::debug!(
            album = %target.id,
            extras = extras.len(),
            missing = missing.len(),
            "compared aggregation album"
        );

        let mut operations = Vec::new();
        if !extras.is_empty() {
            operations.push(Operation::new(
                remove_assets_request(&target.id, &extras)?,
                add_assets_request(&target.id, &extras)?,
            ));
        }
        if !missing.is_empty() {
            operations.push(Operation::new(
                add_assets_request(&target.id, &missing)?,
                remove_assets_request(&target.id, &missing)?,
            ));
        }

        tracing::info!(operations = operations.len(), "smart album plan ready");
        Ok(Plan::new(operations))
    }
}
