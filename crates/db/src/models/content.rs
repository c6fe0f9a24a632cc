//! Models for the destination content stores (collections/entries,
//! taxonomies/terms, users).

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stanza_core::types::{DbId, Timestamp};

// ── Collections ──────────────────────────────────────────────────────

/// A row from the `collections` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Collection {
    pub id: DbId,
    pub handle: String,
    pub title: String,
    pub structured: bool,
    pub blueprint: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a collection.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCollection {
    pub handle: String,
    pub title: String,
    pub structured: bool,
    pub blueprint: serde_json::Value,
}

// ── Entries ──────────────────────────────────────────────────────────

/// A row from the `entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Entry {
    pub id: DbId,
    pub collection_handle: String,
    pub slug: String,
    pub parent_slug: Option<String>,
    pub data: serde_json::Value,
    pub sort_order: i32,
    pub depth: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntry {
    pub collection_handle: String,
    pub slug: String,
    pub parent_slug: Option<String>,
    pub data: serde_json::Value,
}

/// The slice of an entry the tree rebuild reads.
#[derive(Debug, Clone, FromRow)]
pub struct EntryTreeRow {
    pub id: DbId,
    pub slug: String,
    pub parent_slug: Option<String>,
    pub sort_order: i32,
}

// ── Taxonomies & terms ───────────────────────────────────────────────

/// A row from the `taxonomies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Taxonomy {
    pub id: DbId,
    pub handle: String,
    pub title: String,
    pub blueprint: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `terms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Term {
    pub id: DbId,
    pub taxonomy_handle: String,
    pub slug: String,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a term.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTerm {
    pub taxonomy_handle: String,
    pub slug: String,
    pub data: serde_json::Value,
}

// ── Users ────────────────────────────────────────────────────────────

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub name: Option<String>,
    pub data: serde_json::Value,
}
