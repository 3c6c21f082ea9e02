//! The quote owner's profile record.
//!
//! Quotes reference the profile table rather than the user table directly,
//! so the save path upserts a minimal profile row before inserting a quote.
//! The upsert is idempotent and keyed by the user ID.

use rusqlite::Connection;

use crate::{Error, user::UserID};

pub(crate) fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS profile (
            user_id INTEGER PRIMARY KEY REFERENCES user(id),
            display_name TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert or update the profile row for `user_id`.
///
/// Calling this twice with the same user ID leaves exactly one row.
///
/// # Errors
///
/// Returns an [Error::SqlError] if the query fails, e.g. when `user_id` does
/// not reference a registered user.
pub fn upsert_profile(
    user_id: UserID,
    display_name: &str,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO profile (user_id, display_name) VALUES (?1, ?2)
        ON CONFLICT(user_id) DO UPDATE SET display_name = excluded.display_name",
        (user_id.as_i64(), display_name),
    )?;

    Ok(())
}

/// Derive a display name from the local part of an email address.
///
/// "maria@example.com" becomes "maria". Falls back to "Prestador" when the
/// email has no local part.
pub fn display_name_from_email(email: &str) -> String {
    match email.split('@').next() {
        Some(local_part) if !local_part.is_empty() => local_part.to_owned(),
        _ => "Prestador".to_owned(),
    }
}

#[cfg(test)]
mod profile_tests {
    use rusqlite::Connection;

    use crate::{
        db::initialize,
        profile::{display_name_from_email, upsert_profile},
        user::{UserID, create_user},
        PasswordHash,
    };

    fn get_test_connection() -> (Connection, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user("maria@example.com", PasswordHash::new_unchecked("x"), &conn)
            .expect("could not create test user");

        (conn, user.id)
    }

    fn count_profiles(connection: &Connection) -> i64 {
        connection
            .query_row("SELECT COUNT(*) FROM profile", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn upsert_twice_leaves_one_row() {
        let (conn, user_id) = get_test_connection();

        upsert_profile(user_id, "maria", &conn).unwrap();
        upsert_profile(user_id, "maria", &conn).unwrap();

        assert_eq!(count_profiles(&conn), 1);
    }

    #[test]
    fn upsert_updates_display_name() {
        let (conn, user_id) = get_test_connection();

        upsert_profile(user_id, "maria", &conn).unwrap();
        upsert_profile(user_id, "Maria Souza", &conn).unwrap();

        let display_name: String = conn
            .query_row(
                "SELECT display_name FROM profile WHERE user_id = ?1",
                [user_id.as_i64()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(display_name, "Maria Souza");
        assert_eq!(count_profiles(&conn), 1);
    }

    #[test]
    fn display_name_uses_email_local_part() {
        assert_eq!(display_name_from_email("maria@example.com"), "maria");
        assert_eq!(display_name_from_email(""), "Prestador");
    }
}
