use super::{add_member_request, find_user_by_email, get_album, paginate, remove_member_request, Generator, Page};
use crate::api::{ApiClient, Transport};
use crate::error::PlanError;
use crate::plan::{Operation, Plan};
use crate::types::{Album, Role, SearchMetadataBody, SearchMetadataResponse};
use anyhow::{Context, Result};
use reqwest::Method;
use std::collections::BTreeSet;

/// Shares every album holding a photo of a recognized person with a user.
/// Fails when nothing needs to change.
pub struct AddPerson<'a, T> {
    client: &'a ApiClient<T>,
    person_id: String,
    email: String,
}

impl<'a, T: Transport> AddPerson<'a, T> {
    pub fn new(client: &'a ApiClient<T>, person_id: &str, email: &str) -> Self {
        AddPerson {
            client,
            person_id: person_id.to_owned(),
            email: email.to_owned(),
        }
    }

    /// Every asset id tagged with the person, across all search pages.
    fn person_assets(&self) -> Result<Vec<String>> {
        paginate("1", |page| {
            let search = SearchMetadataBody {
                page,
                person_ids: [self.person_id.as_str()],
            };
            let response: SearchMetadataResponse = self
                .client
                .send_json(Method::POST, "/api/search/metadata", &search)
                .with_context(|| format!("searching metadata for person {} (page {page})", self.person_id))?;
            Ok(Page {
                items: response.assets.items.into_iter().map(|asset| asset.id).collect(),
                next: response.assets.next_page,
            })
        })
    }

    /// Union of the albums containing any of `asset_ids`, one lookup per asset.
    fn albums_containing(&self, asset_ids: &[String]) -> Result<BTreeSet<String>> {
        let mut album_ids = BTreeSet::new();
        for asset_id in asset_ids {
            let albums: Vec<Album> = self
                .client
                .get(&format!("/api/albums?assetId={asset_id}"))
                .with_context(|| format!("getting albums for asset {asset_id}"))?;
            album_ids.extend(albums.into_iter().map(|album| album.id));
        }
        Ok(album_ids)
    }
}

impl<T: Transport> Generator for AddPerson<'_, T> {
    fn generate(&self) -> Result<Plan> {
        let asset_ids = self.person_assets().context("getting assets for person")?;
        if asset_ids.is_empty() {
            return Err(PlanError::NoAssetsForPerson(self.person_id.clone()).into());
        }

        let album_ids = self.albums_containing(&asset_ids).context("getting album IDs")?;
        if album_ids.is_empty() {
            return Err(PlanError::NoAlbumsForPerson(self.person_id.clone()).into());
        }
        tracing::debug!(assets = asset_ids.len(), albums = album_ids.len(), "resolved person albums");

        let user = find_user_by_email(self.client, &self.email)?;

        let mut operations = Vec::new();
        for album_id in &album_ids {
            let album = get_album(self.client, album_id)?;
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
                "user is already in all albums containing assets for this person".into(),
            )
            .into());
        }
        tracing::info!(operations = operations.len(), "add-person plan ready");
        Ok(Plan::new(operations))
    }
}
