//! The detail page for a single quote.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::UtcOffset;
use uuid::Uuid;

use crate::{
    AppState, Error, endpoints,
    html::{BUTTON_SECONDARY_STYLE, CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    quote::{
        MaterialItem, Quote, format_brl_from_cents, format_date, get_material_items, get_quote,
        list_page::NO_CATEGORY_LABEL,
    },
    timezone::get_local_offset,
    user::UserID,
};

/// The notice shown when a quote needs materials but none were listed.
pub(crate) const NO_MATERIALS_NOTICE: &str = "Nenhum material informado.";

fn material_list(materials: &[MaterialItem]) -> Markup {
    html!(
        h2 class="text-lg font-semibold mt-4" { "Materiais" }

        @if materials.is_empty() {
            p class="text-gray-500 dark:text-gray-400" { (NO_MATERIALS_NOTICE) }
        } @else {
            ul class="list-disc list-inside text-gray-700 dark:text-gray-300"
            {
                @for material in materials {
                    li
                    {
                        @match &material.quantity {
                            Some(quantity) => { (material.description) " — " (quantity) },
                            None => { (material.description) },
                        }
                    }
                }
            }
        }
    )
}

fn quote_detail_view(
    quote: &Quote,
    materials: Option<&[MaterialItem]>,
    local_offset: UtcOffset,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::QUOTES_VIEW).into_html();
    let document_url = endpoints::format_endpoint(endpoints::QUOTE_DOCUMENT, quote.id);
    let title = quote.category_name.as_deref().unwrap_or(NO_CATEGORY_LABEL);

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class=(CARD_STYLE)
            {
                h1 class="text-xl font-bold" { (title) }

                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Criado em " (format_date(quote.created_at, local_offset))
                }

                @if !quote.service_description.is_empty() {
                    p class="mt-2 text-gray-700 dark:text-gray-300"
                    {
                        (quote.service_description)
                    }
                }

                p class="mt-4"
                {
                    span class="font-semibold" { "Valor mão de obra: " }
                    (format_brl_from_cents(quote.labor_value_cents))
                }

                @if let Some(materials) = materials {
                    (material_list(materials))
                }

                div class="flex gap-4 mt-6"
                {
                    a
                        href=(document_url)
                        target="_blank"
                        class=(LINK_STYLE)
                    {
                        "Gerar PDF"
                    }

                    // Sharing is not built yet, the button is a placeholder.
                    button disabled class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Enviar WhatsApp (em breve)"
                    }
                }
            }
        }
    );

    base(title, &content)
}

/// The state needed for the quote detail page.
#[derive(Debug, Clone)]
pub struct QuoteDetailPageState {
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// The database connection for fetching the quote and its materials.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for QuoteDetailPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the quote detail page.
///
/// A malformed ID, an unknown ID, or an ID owned by another user all render
/// the not-found page. The owner check is part of the database query, so
/// other users' quotes are indistinguishable from missing ones.
pub async fn get_quote_detail_page(
    State(state): State<QuoteDetailPageState>,
    Extension(user_id): Extension<UserID>,
    Path(quote_id): Path<String>,
) -> Result<Response, Error> {
    let quote_id = Uuid::parse_str(&quote_id).map_err(|_| Error::NotFound)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let quote = get_quote(quote_id, user_id, &connection)?;

    let materials = if quote.needs_material {
        Some(
            get_material_items(quote.id, &connection)
                .inspect_err(|error| tracing::error!("Failed to retrieve materials: {error}"))?,
        )
    } else {
        None
    };

    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);

    Ok(quote_detail_view(&quote, materials.as_deref(), local_offset).into_response())
}
