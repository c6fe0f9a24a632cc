//! Repositories for the destination content stores.
//!
//! Entry/term/user writes are upserts on their natural keys so that
//! re-running an import converges instead of erroring on rows it already
//! created.

use sqlx::PgPool;
use stanza_core::tree::TreePlacement;
use stanza_core::types::DbId;

use crate::models::content::{
    Collection, CreateCollection, CreateEntry, CreateTerm, CreateUser, Entry, EntryTreeRow, Taxonomy,
    Term, User,
};

/// Column list for `collections`.
const COLLECTION_COLUMNS: &str =
    "id, handle, title, structured, blueprint, created_at, updated_at";

/// Column list for `entries`.
const ENTRY_COLUMNS: &str =
    "id, collection_handle, slug, parent_slug, data, sort_order, depth, created_at, updated_at";

/// Column list for `taxonomies`.
const TAXONOMY_COLUMNS: &str = "id, handle, title, blueprint, created_at, updated_at";

/// Column list for `terms`.
const TERM_COLUMNS: &str = "id, taxonomy_handle, slug, data, created_at, updated_at";

/// Column list for `users`.
const USER_COLUMNS: &str = "id, email, name, data, created_at, updated_at";

// ── CollectionRepo ───────────────────────────────────────────────────

pub struct CollectionRepo;

impl CollectionRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateCollection,
    ) -> Result<Collection, sqlx::Error> {
        let sql = format!(
            "INSERT INTO collections (handle, title, structured, blueprint) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLLECTION_COLUMNS}"
        );
        sqlx::query_as::<_, Collection>(&sql)
            .bind(&input.handle)
            .bind(&input.title)
            .bind(input.structured)
            .bind(&input.blueprint)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_handle(
        pool: &PgPool,
        handle: &str,
    ) -> Result<Option<Collection>, sqlx::Error> {
        let sql = format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE handle = $1");
        sqlx::query_as::<_, Collection>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await
    }
}

// ── EntryRepo ────────────────────────────────────────────────────────

pub struct EntryRepo;

impl EntryRepo {
    /// Insert or update an entry by (collection, slug).
    pub async fn upsert(pool: &PgPool, input: &CreateEntry) -> Result<Entry, sqlx::Error> {
        let sql = format!(
            "INSERT INTO entries (collection_handle, slug, parent_slug, data) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_entries_collection_slug \
             DO UPDATE SET parent_slug = EXCLUDED.parent_slug, \
                           data = EXCLUDED.data, \
                           updated_at = NOW() \
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, Entry>(&sql)
            .bind(&input.collection_handle)
            .bind(&input.slug)
            .bind(&input.parent_slug)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }

    /// The tree-relevant slice of every entry in a collection.
    pub async fn tree_rows(
        pool: &PgPool,
        collection_handle: &str,
    ) -> Result<Vec<EntryTreeRow>, sqlx::Error> {
        sqlx::query_as::<_, EntryTreeRow>(
            "SELECT id, slug, parent_slug, sort_order FROM entries \
             WHERE collection_handle = $1 ORDER BY sort_order, slug",
        )
        .bind(collection_handle)
        .fetch_all(pool)
        .await
    }

    /// Persist computed tree placements.
    pub async fn apply_placements(
        pool: &PgPool,
        placements: &[TreePlacement],
    ) -> Result<(), sqlx::Error> {
        for placement in placements {
            sqlx::query(
                "UPDATE entries SET sort_order = $2, depth = $3, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(placement.id)
            .bind(placement.sort_order)
            .bind(placement.depth)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Entry>, sqlx::Error> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = $1");
        sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

// ── TaxonomyRepo ─────────────────────────────────────────────────────

pub struct TaxonomyRepo;

impl TaxonomyRepo {
    pub async fn find_by_handle(
        pool: &PgPool,
        handle: &str,
    ) -> Result<Option<Taxonomy>, sqlx::Error> {
        let sql = format!("SELECT {TAXONOMY_COLUMNS} FROM taxonomies WHERE handle = $1");
        sqlx::query_as::<_, Taxonomy>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await
    }
}

// ── TermRepo ─────────────────────────────────────────────────────────

pub struct TermRepo;

impl TermRepo {
    /// Insert or update a term by (taxonomy, slug).
    pub async fn upsert(pool: &PgPool, input: &CreateTerm) -> Result<Term, sqlx::Error> {
        let sql = format!(
            "INSERT INTO terms (taxonomy_handle, slug, data) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_terms_taxonomy_slug \
             DO UPDATE SET data = EXCLUDED.data, updated_at = NOW() \
             RETURNING {TERM_COLUMNS}"
        );
        sqlx::query_as::<_, Term>(&sql)
            .bind(&input.taxonomy_handle)
            .bind(&input.slug)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }
}

// ── UserRepo ─────────────────────────────────────────────────────────

pub struct UserRepo;

impl UserRepo {
    /// Insert or update a user by email.
    pub async fn upsert(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (email, name, data) \
             VALUES ($1, $2, $3) \
             ON CONFLICT ON CONSTRAINT uq_users_email \
             DO UPDATE SET name = EXCLUDED.name, data = EXCLUDED.data, updated_at = NOW() \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.data)
            .fetch_one(pool)
            .await
    }
}
