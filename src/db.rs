//! Database initialization for the application's tables.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    profile::create_profile_table,
    quote::{create_material_item_table, create_quote_table},
    user::create_user_table,
};

/// Create the application's tables if they do not exist.
///
/// The tables are created in a single exclusive transaction so that a
/// partially initialized schema is never left behind.
///
/// # Errors
///
/// Returns an [Error::SqlError] if any of the table creation queries fail.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_profile_table(&transaction)?;
    create_quote_table(&transaction)?;
    create_material_item_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
