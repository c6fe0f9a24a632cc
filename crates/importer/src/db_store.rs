//! Postgres-backed implementation of the content store interfaces.

use async_trait::async_trait;
use serde_json::Value;
use stanza_core::blueprint::{default_user_blueprint, Blueprint};
use stanza_core::import::Destination;
use stanza_core::slug::slugify;
use stanza_core::tree::{EntryRef, TreePlacement};
use stanza_db::models::content::{CreateEntry, CreateTerm, CreateUser};
use stanza_db::repositories::{CollectionRepo, EntryRepo, TaxonomyRepo, TermRepo, UserRepo};
use stanza_db::DbPool;

use crate::store::{BlueprintProvider, ContentStore, Payload, RecordHandle, StoreError};

/// Content store backed by the platform's own Postgres tables.
#[derive(Clone)]
pub struct DbContentStore {
    pool: DbPool,
}

impl DbContentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn write_entry(
        &self,
        collection: &str,
        payload: &Payload,
    ) -> Result<RecordHandle, StoreError> {
        // The collection must exist; imports never create destinations.
        CollectionRepo::find_by_handle(&self.pool, collection)
            .await?
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let slug = derive_key(payload, "slug", "title")
            .ok_or_else(|| StoreError::Rejected("row produced no slug or title".to_string()))?;
        let parent_slug = payload
            .get("parent")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let entry = EntryRepo::upsert(
            &self.pool,
            &CreateEntry {
                collection_handle: collection.to_string(),
                slug,
                parent_slug,
                data: Value::Object(payload.clone()),
            },
        )
        .await?;

        Ok(RecordHandle {
            id: entry.id,
            key: entry.slug,
        })
    }

    async fn write_term(
        &self,
        taxonomy: &str,
        payload: &Payload,
    ) -> Result<RecordHandle, StoreError> {
        TaxonomyRepo::find_by_handle(&self.pool, taxonomy)
            .await?
            .ok_or_else(|| StoreError::UnknownTaxonomy(taxonomy.to_string()))?;

        let slug = derive_key(payload, "slug", "title")
            .ok_or_else(|| StoreError::Rejected("row produced no slug or title".to_string()))?;

        let term = TermRepo::upsert(
            &self.pool,
            &CreateTerm {
                taxonomy_handle: taxonomy.to_string(),
                slug,
                data: Value::Object(payload.clone()),
            },
        )
        .await?;

        Ok(RecordHandle {
            id: term.id,
            key: term.slug,
        })
    }

    async fn write_user(&self, payload: &Payload) -> Result<RecordHandle, StoreError> {
        let email = payload
            .get("email")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::Rejected("row produced no email".to_string()))?;
        let name = payload.get("name").and_then(Value::as_str).map(String::from);

        let user = UserRepo::upsert(
            &self.pool,
            &CreateUser {
                email: email.to_string(),
                name,
                data: Value::Object(payload.clone()),
            },
        )
        .await?;

        Ok(RecordHandle {
            id: user.id,
            key: user.email,
        })
    }
}

#[async_trait]
impl BlueprintProvider for DbContentStore {
    async fn blueprint(&self, destination: &Destination) -> Result<Blueprint, StoreError> {
        match destination {
            Destination::Entries { collection } => {
                let row = CollectionRepo::find_by_handle(&self.pool, collection)
                    .await?
                    .ok_or_else(|| StoreError::UnknownCollection(collection.clone()))?;
                parse_blueprint(row.blueprint, "collection", collection)
            }
            Destination::Terms { taxonomy } => {
                let row = TaxonomyRepo::find_by_handle(&self.pool, taxonomy)
                    .await?
                    .ok_or_else(|| StoreError::UnknownTaxonomy(taxonomy.clone()))?;
                parse_blueprint(row.blueprint, "taxonomy", taxonomy)
            }
            Destination::Users => Ok(default_user_blueprint()),
        }
    }
}

#[async_trait]
impl ContentStore for DbContentStore {
    async fn write(
        &self,
        destination: &Destination,
        payload: &Payload,
    ) -> Result<RecordHandle, StoreError> {
        match destination {
            Destination::Entries { collection } => self.write_entry(collection, payload).await,
            Destination::Terms { taxonomy } => self.write_term(taxonomy, payload).await,
            Destination::Users => self.write_user(payload).await,
        }
    }

    async fn collection_tree_rows(&self, collection: &str) -> Result<Vec<EntryRef>, StoreError> {
        let rows = EntryRepo::tree_rows(&self.pool, collection).await?;
        Ok(rows
            .into_iter()
            .map(|row| EntryRef {
                id: row.id,
                slug: row.slug,
                parent: row.parent_slug,
                sort_order: row.sort_order,
            })
            .collect())
    }

    async fn persist_tree(
        &self,
        collection: &str,
        placements: &[TreePlacement],
    ) -> Result<(), StoreError> {
        let _ = collection;
        EntryRepo::apply_placements(&self.pool, placements).await?;
        Ok(())
    }
}

/// Take the record key from `key_field`, falling back to slugifying
/// `fallback_field`.
fn derive_key(payload: &Payload, key_field: &str, fallback_field: &str) -> Option<String> {
    if let Some(slug) = payload.get(key_field).and_then(Value::as_str) {
        if !slug.is_empty() {
            return Some(slug.to_string());
        }
    }
    payload
        .get(fallback_field)
        .and_then(Value::as_str)
        .map(slugify)
        .filter(|s| !s.is_empty())
}

fn parse_blueprint(raw: Value, kind: &str, handle: &str) -> Result<Blueprint, StoreError> {
    serde_json::from_value(raw)
        .map_err(|e| StoreError::Rejected(format!("{kind} '{handle}' has an invalid blueprint: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
