//! Defines the endpoint for creating a new quote.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since it collects repeated fields, such as the
// material rows, into a Vec.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    profile::{display_name_from_email, upsert_profile},
    quote::{NewMaterialItem, core::NewQuote, create_quote_with_materials, parse_money_to_cents},
    user::{UserID, get_user_by_id},
};

use super::core::CATEGORIES;

/// The state needed to create a quote.
#[derive(Debug, Clone)]
pub struct CreateQuoteState {
    /// The database connection for managing quotes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateQuoteState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a quote.
#[derive(Debug, Deserialize)]
pub struct QuoteForm {
    /// The chosen category label. An empty string means no category.
    #[serde(default)]
    pub category: String,
    /// Free-text description of the service.
    #[serde(default)]
    pub description: String,
    /// The labor price as typed, e.g. "2.850,00".
    #[serde(default)]
    pub labor_value: String,
    /// Whether the material list applies.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set.
    pub needs_material: Option<String>,
    /// The description column of the material rows, in display order.
    #[serde(default)]
    pub material_description: Vec<String>,
    /// The quantity column of the material rows, in display order.
    #[serde(default)]
    pub material_quantity: Vec<String>,
}

/// Normalize the chosen category against the catalog.
///
/// An empty selection is allowed and means "no category".
fn validate_category(category: &str) -> Result<Option<String>, Error> {
    let category = category.trim();

    if category.is_empty() {
        return Ok(None);
    }

    if CATEGORIES.contains(&category) {
        Ok(Some(category.to_owned()))
    } else {
        Err(Error::InvalidCategory(category.to_owned()))
    }
}

/// Pair up the material columns, dropping rows left blank in the form.
fn collect_materials(descriptions: &[String], quantities: &[String]) -> Vec<NewMaterialItem> {
    descriptions
        .iter()
        .enumerate()
        .filter_map(|(row, description)| {
            let description = description.trim();

            if description.is_empty() {
                return None;
            }

            let quantity = quantities
                .get(row)
                .map(|quantity| quantity.trim())
                .filter(|quantity| !quantity.is_empty())
                .map(|quantity| quantity.to_owned());

            Some(NewMaterialItem {
                description: description.to_owned(),
                quantity,
            })
        })
        .collect()
}

/// A route handler for creating a new quote, redirects to the quote list on success.
///
/// The owner's profile row is upserted first since the quote row's foreign
/// key depends on it, then the quote and its material items are written in a
/// single transaction.
pub async fn create_quote_endpoint(
    State(state): State<CreateQuoteState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<QuoteForm>,
) -> Response {
    let category_name = match validate_category(&form.category) {
        Ok(category_name) => category_name,
        Err(error) => return error.into_alert_response(),
    };

    let labor_value_cents = match parse_money_to_cents(&form.labor_value) {
        Ok(labor_value_cents) => labor_value_cents,
        Err(error) => return error.into_alert_response(),
    };

    let needs_material = form.needs_material.is_some();
    let materials = if needs_material {
        collect_materials(&form.material_description, &form.material_quantity)
    } else {
        Vec::new()
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    // The quote table references profile, which is created lazily on first save.
    let profile_result = get_user_by_id(user_id, &connection).and_then(|user| {
        upsert_profile(user_id, &display_name_from_email(&user.email), &connection)
    });
    if let Err(error) = profile_result {
        tracing::error!("Failed to upsert the profile before saving a quote: {error}");
        return error.into_alert_response();
    }

    let new_quote = NewQuote {
        owner_id: user_id,
        category_name,
        service_description: form.description.trim().to_owned(),
        labor_value_cents,
        needs_material,
    };

    if let Err(error) = create_quote_with_materials(new_quote, &materials, &connection) {
        tracing::error!("Failed to create a quote: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::QUOTES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::State,
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        db::initialize,
        endpoints,
        quote::{
            create_quote_endpoint,
            create_quote_endpoint::{CreateQuoteState, QuoteForm},
            get_material_items, get_quotes_for_owner,
        },
        user::{UserID, create_user},
    };

    fn get_test_state() -> (CreateQuoteState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "maria@example.com",
            PasswordHash::new_unchecked("hash"),
            &conn,
        )
        .unwrap();

        let state = CreateQuoteState {
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user.id)
    }

    fn quote_form() -> QuoteForm {
        QuoteForm {
            category: "Serviços de Pintura".to_owned(),
            description: "Pintura de sala".to_owned(),
            labor_value: "2.850,00".to_owned(),
            needs_material: None,
            material_description: Vec::new(),
            material_quantity: Vec::new(),
        }
    }

    #[tokio::test]
    async fn creates_quote_and_redirects_to_list() {
        let (state, user_id) = get_test_state();

        let response = create_quote_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(quote_form()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::QUOTES_VIEW
        );

        let connection = state.db_connection.lock().unwrap();
        let quotes = get_quotes_for_owner(user_id, &connection).unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].labor_value_cents, Some(285_000));
        assert_eq!(quotes[0].category_name.as_deref(), Some("Serviços de Pintura"));
    }

    #[tokio::test]
    async fn creates_profile_row_on_first_save() {
        let (state, user_id) = get_test_state();

        create_quote_endpoint(State(state.clone()), Extension(user_id), Form(quote_form())).await;

        let connection = state.db_connection.lock().unwrap();
        let display_name: String = connection
            .query_row(
                "SELECT display_name FROM profile WHERE user_id = ?1",
                [user_id.as_i64()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(display_name, "maria");
    }

    #[tokio::test]
    async fn skips_blank_material_rows() {
        let (state, user_id) = get_test_state();
        let form = QuoteForm {
            needs_material: Some("on".to_owned()),
            material_description: vec![
                "Tinta acrílica".to_owned(),
                "".to_owned(),
                "Rolo de espuma".to_owned(),
            ],
            material_quantity: vec!["2 latas".to_owned(), "".to_owned(), "".to_owned()],
            ..quote_form()
        };

        create_quote_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        let quote = get_quotes_for_owner(user_id, &connection)
            .unwrap()
            .remove(0);
        let materials = get_material_items(quote.id, &connection).unwrap();

        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].description, "Tinta acrílica");
        assert_eq!(materials[0].quantity.as_deref(), Some("2 latas"));
        assert_eq!(materials[1].description, "Rolo de espuma");
        assert_eq!(materials[1].quantity, None);
    }

    #[tokio::test]
    async fn ignores_materials_when_flag_is_off() {
        let (state, user_id) = get_test_state();
        let form = QuoteForm {
            needs_material: None,
            material_description: vec!["Tinta acrílica".to_owned()],
            material_quantity: vec!["2 latas".to_owned()],
            ..quote_form()
        };

        create_quote_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        let quote = get_quotes_for_owner(user_id, &connection)
            .unwrap()
            .remove(0);
        let materials = get_material_items(quote.id, &connection).unwrap();

        assert!(!quote.needs_material);
        assert!(materials.is_empty());
    }

    #[tokio::test]
    async fn rejects_invalid_price() {
        let (state, user_id) = get_test_state();
        let form = QuoteForm {
            labor_value: "abc".to_owned(),
            ..quote_form()
        };

        let response = create_quote_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        let quotes = get_quotes_for_owner(user_id, &connection).unwrap();
        assert!(quotes.is_empty(), "an invalid price should not create a quote");
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let (state, user_id) = get_test_state();
        let form = QuoteForm {
            category: "Serviços de Jardinagem".to_owned(),
            ..quote_form()
        };

        let response = create_quote_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_category_means_no_category() {
        let (state, user_id) = get_test_state();
        let form = QuoteForm {
            category: "".to_owned(),
            ..quote_form()
        };

        create_quote_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        let quotes = get_quotes_for_owner(user_id, &connection).unwrap();
        assert_eq!(quotes[0].category_name, None);
    }
}
