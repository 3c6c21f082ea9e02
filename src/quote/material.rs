//! Material line items attached to a quote.

use rusqlite::{Connection, Row};
use uuid::Uuid;

use crate::Error;

/// A material needed for the quoted service, e.g. "Tinta acrílica — 2 latas".
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialItem {
    /// The ID of the material item.
    pub id: i64,
    /// The ID of the quote this item belongs to.
    pub quote_id: Uuid,
    /// What the material is.
    pub description: String,
    /// A free-text quantity, e.g. "2 latas". Intentionally not numeric.
    pub quantity: Option<String>,
    /// The display position among the quote's materials, starting at zero.
    pub sort_order: i64,
}

/// A material item as collected from the quote form, before it has a row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMaterialItem {
    /// What the material is.
    pub description: String,
    /// A free-text quantity, e.g. "2 latas".
    pub quantity: Option<String>,
}

/// Retrieve the material items for the quote with `quote_id` in display order.
///
/// Returns an empty list when the quote has no materials or does not exist.
///
/// # Errors
/// This function will return an [Error::SqlError] if there is some SQL error.
pub fn get_material_items(
    quote_id: Uuid,
    connection: &Connection,
) -> Result<Vec<MaterialItem>, Error> {
    connection
        .prepare(
            "SELECT id, quote_id, description, quantity, sort_order
            FROM quote_material_item
            WHERE quote_id = ?1
            ORDER BY sort_order ASC",
        )?
        .query_map([quote_id.to_string()], map_row_to_material_item)?
        .map(|maybe_item| maybe_item.map_err(|error| error.into()))
        .collect()
}

/// Create the material item table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_material_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS quote_material_item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                quote_id TEXT NOT NULL REFERENCES quote(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                quantity TEXT,
                sort_order INTEGER NOT NULL,
                UNIQUE(quote_id, sort_order)
                )",
        (),
    )?;

    Ok(())
}

fn map_row_to_material_item(row: &Row) -> Result<MaterialItem, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_quote_id: String = row.get(1)?;
    let quote_id = Uuid::parse_str(&raw_quote_id).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(error))
    })?;
    let description = row.get(2)?;
    let quantity = row.get(3)?;
    let sort_order = row.get(4)?;

    Ok(MaterialItem {
        id,
        quote_id,
        description,
        quantity,
        sort_order,
    })
}

#[cfg(test)]
mod material_tests {
    use rusqlite::Connection;
    use uuid::Uuid;

    use crate::{
        PasswordHash,
        db::initialize,
        profile::upsert_profile,
        quote::{
            NewMaterialItem, core::NewQuote, create_quote_with_materials, get_material_items,
        },
        user::create_user,
    };

    #[test]
    fn get_material_items_returns_empty_list_for_unknown_quote() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let items = get_material_items(Uuid::new_v4(), &conn).unwrap();

        assert!(items.is_empty());
    }

    #[test]
    fn get_material_items_scopes_by_quote() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "maria@example.com",
            PasswordHash::new_unchecked("hash"),
            &conn,
        )
        .unwrap();
        upsert_profile(user.id, "maria", &conn).unwrap();

        let new_quote = NewQuote {
            owner_id: user.id,
            category_name: None,
            service_description: String::new(),
            labor_value_cents: None,
            needs_material: true,
        };
        let first = create_quote_with_materials(
            new_quote.clone(),
            &[NewMaterialItem {
                description: "Tinta".to_owned(),
                quantity: None,
            }],
            &conn,
        )
        .unwrap();
        create_quote_with_materials(
            new_quote,
            &[NewMaterialItem {
                description: "Fio 2,5mm".to_owned(),
                quantity: Some("50m".to_owned()),
            }],
            &conn,
        )
        .unwrap();

        let items = get_material_items(first.id, &conn).unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "Tinta");
        assert_eq!(items[0].quote_id, first.id);
    }
}
