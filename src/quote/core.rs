//! Defines the core data models and database queries for quotes.

use rusqlite::{Connection, Row, Transaction as SqlTransaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, user::UserID};

use super::material::NewMaterialItem;

// ============================================================================
// MODELS
// ============================================================================

/// The fixed catalog of service categories a quote can be filed under.
///
/// The chosen label is stored on the quote as a snapshot string, so renaming
/// a catalog entry later must not alter quotes that already exist.
pub const CATEGORIES: [&str; 5] = [
    "Serviços de Pintura",
    "Serviços Elétricos",
    "Serviços Hidráulicos",
    "Serviços de Piso",
    "Serviços Gerais",
];

/// A price estimate ("orçamento") authored by a provider for a client.
///
/// Quotes are read-only after creation. To create a new `Quote` together
/// with its material items, use [create_quote_with_materials].
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// The ID of the quote.
    pub id: Uuid,
    /// The ID of the user who created the quote.
    pub owner_id: UserID,
    /// The category label chosen at creation time, if any.
    pub category_name: Option<String>,
    /// A free-text description of the service being quoted. May be empty.
    pub service_description: String,
    /// The price charged for labor, in cents. `None` when no price was given.
    pub labor_value_cents: Option<i64>,
    /// Whether the material list section applies to this quote.
    pub needs_material: bool,
    /// When the quote was created.
    pub created_at: OffsetDateTime,
}

/// The fields needed to create a new [Quote].
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuote {
    /// The ID of the user creating the quote.
    pub owner_id: UserID,
    /// The category label, already validated against [CATEGORIES].
    pub category_name: Option<String>,
    /// A free-text description of the service. May be empty.
    pub service_description: String,
    /// The labor price in cents, already normalized from the form input.
    pub labor_value_cents: Option<i64>,
    /// Whether the material list section applies.
    pub needs_material: bool,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new quote and its material items in a single transaction.
///
/// Each material item is assigned its positional index as `sort_order`, so
/// the display order matches the order of `materials`. Either the quote and
/// all of its items are inserted, or nothing is.
///
/// # Errors
/// This function will return a:
/// - [Error::SqlError] if `new_quote.owner_id` does not refer to a profile row,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_quote_with_materials(
    new_quote: NewQuote,
    materials: &[NewMaterialItem],
    connection: &Connection,
) -> Result<Quote, Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Immediate)?;

    let id = Uuid::new_v4();
    let created_at = OffsetDateTime::now_utc();

    transaction.execute(
        "INSERT INTO quote
            (id, owner_id, category_name, service_description, labor_value_cents,
            needs_material, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            id.to_string(),
            new_quote.owner_id.as_i64(),
            &new_quote.category_name,
            &new_quote.service_description,
            new_quote.labor_value_cents,
            new_quote.needs_material,
            created_at,
        ),
    )?;

    {
        let mut insert_material = transaction.prepare(
            "INSERT INTO quote_material_item (quote_id, description, quantity, sort_order)
            VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (sort_order, material) in materials.iter().enumerate() {
            insert_material.execute((
                id.to_string(),
                &material.description,
                &material.quantity,
                sort_order as i64,
            ))?;
        }
    }

    transaction.commit()?;

    Ok(Quote {
        id,
        owner_id: new_quote.owner_id,
        category_name: new_quote.category_name,
        service_description: new_quote.service_description,
        labor_value_cents: new_quote.labor_value_cents,
        needs_material: new_quote.needs_material,
        created_at,
    })
}

/// Retrieve the quote with `id` owned by `owner_id`.
///
/// The owner is part of the query predicate, so a quote belonging to another
/// user yields [Error::NotFound] just like an ID with no row at all.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no quote with `id` owned by `owner_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_quote(id: Uuid, owner_id: UserID, connection: &Connection) -> Result<Quote, Error> {
    let quote = connection
        .prepare(
            "SELECT id, owner_id, category_name, service_description, labor_value_cents,
                needs_material, created_at
            FROM quote
            WHERE id = ?1 AND owner_id = ?2",
        )?
        .query_row((id.to_string(), owner_id.as_i64()), map_row_to_quote)?;

    Ok(quote)
}

/// Retrieve all quotes owned by `owner_id`, most recently created first.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn get_quotes_for_owner(
    owner_id: UserID,
    connection: &Connection,
) -> Result<Vec<Quote>, Error> {
    connection
        .prepare(
            "SELECT id, owner_id, category_name, service_description, labor_value_cents,
                needs_material, created_at
            FROM quote
            WHERE owner_id = ?1
            ORDER BY created_at DESC",
        )?
        .query_map([owner_id.as_i64()], map_row_to_quote)?
        .map(|maybe_quote| maybe_quote.map_err(|error| error.into()))
        .collect()
}

/// Create the quote table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_quote_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS quote (
                id TEXT PRIMARY KEY,
                owner_id INTEGER NOT NULL REFERENCES profile(user_id),
                category_name TEXT,
                service_description TEXT NOT NULL,
                labor_value_cents INTEGER
                    CHECK (labor_value_cents IS NULL OR labor_value_cents >= 0),
                needs_material INTEGER NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Covers the owner-scoped list query and its sort order.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_quote_owner_created ON quote(owner_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a [Quote].
pub(crate) fn map_row_to_quote(row: &Row) -> Result<Quote, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let id = Uuid::parse_str(&raw_id).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let owner_id = UserID::new(row.get(1)?);
    let category_name = row.get(2)?;
    let service_description = row.get(3)?;
    let labor_value_cents = row.get(4)?;
    let needs_material = row.get(5)?;
    let created_at = row.get(6)?;

    Ok(Quote {
        id,
        owner_id,
        category_name,
        service_description,
        labor_value_cents,
        needs_material,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
