//! The quote list page, the landing page of the authenticated area.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base,
    },
    navigation::NavBar,
    quote::{Quote, format_brl_from_cents, format_date, get_quotes_for_owner},
    timezone::get_local_offset,
    user::UserID,
};

use time::UtcOffset;

/// The label shown when a quote was filed without a category.
pub(crate) const NO_CATEGORY_LABEL: &str = "Sem categoria";

/// How many grapheme clusters of the description to show in the list before
/// cutting it off.
const DESCRIPTION_PREVIEW_LENGTH: usize = 90;

/// Shorten `description` to at most [DESCRIPTION_PREVIEW_LENGTH] graphemes,
/// appending an ellipsis when text was cut off.
///
/// Truncation counts grapheme clusters rather than bytes so accented text
/// is never split mid-character.
fn truncate_description(description: &str) -> String {
    let mut graphemes = description.graphemes(true);
    let preview: String = graphemes.by_ref().take(DESCRIPTION_PREVIEW_LENGTH).collect();

    if graphemes.next().is_some() {
        format!("{preview}…")
    } else {
        preview
    }
}

fn quotes_view(quotes: &[Quote], local_offset: UtcOffset) -> Markup {
    let new_quote_route = endpoints::NEW_QUOTE_VIEW;
    let nav_bar = NavBar::new(endpoints::QUOTES_VIEW).into_html();

    let table_row = |quote: &Quote| {
        let detail_url = endpoints::format_endpoint(endpoints::QUOTE_DETAIL_VIEW, quote.id);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(detail_url) class=(LINK_STYLE)
                    {
                        (quote.category_name.as_deref().unwrap_or(NO_CATEGORY_LABEL))
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (truncate_description(&quote.service_description))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_date(quote.created_at, local_offset))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_brl_from_cents(quote.labor_value_cents))
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="relative"
            {
                div class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Orçamentos" }

                    a href=(new_quote_route) class=(LINK_STYLE)
                    {
                        "Novo orçamento"
                    }
                }

                div class="dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Categoria"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Descrição"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Criado em"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Valor mão de obra"
                                }
                            }
                        }

                        tbody
                        {
                            @for quote in quotes {
                                (table_row(quote))
                            }

                            @if quotes.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "Nenhum orçamento ainda. "
                                        a href=(new_quote_route) class=(LINK_STYLE)
                                        {
                                            "Crie o seu primeiro orçamento"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Orçamentos", &content)
}

/// The state needed for the quote list page.
#[derive(Debug, Clone)]
pub struct QuotesPageState {
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// The database connection for fetching quotes.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for QuotesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the quote list page.
pub async fn get_quotes_page(
    State(state): State<QuotesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let quotes = get_quotes_for_owner(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve quotes: {error}"))?;

    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);

    Ok(quotes_view(&quotes, local_offset).into_response())
}

#[cfg(test)]
mod quotes_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        PasswordHash,
        db::initialize,
        endpoints,
        profile::upsert_profile,
        quote::{
            core::NewQuote, create_quote_with_materials,
            list_page::{NO_CATEGORY_LABEL, QuotesPageState, get_quotes_page},
        },
        test_utils::{assert_valid_html, parse_html_document},
        user::{UserID, create_user},
    };

    fn get_test_state() -> (QuotesPageState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let user = create_user(
            "maria@example.com",
            PasswordHash::new_unchecked("hash"),
            &conn,
        )
        .unwrap();
        upsert_profile(user.id, "maria", &conn).unwrap();

        let state = QuotesPageState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(conn)),
        };

        (state, user.id)
    }

    fn new_quote(owner_id: UserID) -> NewQuote {
        NewQuote {
            owner_id,
            category_name: Some("Serviços Elétricos".to_owned()),
            service_description: "Troca de disjuntores".to_owned(),
            labor_value_cents: Some(45_000),
            needs_material: false,
        }
    }

    #[tokio::test]
    async fn empty_state_shows_call_to_action() {
        let (state, user_id) = get_test_state();

        let response = get_quotes_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let body = document.html();
        assert!(
            body.contains("Nenhum orçamento ainda."),
            "empty list should show a call to action"
        );
    }

    #[tokio::test]
    async fn rows_link_to_detail_view() {
        let (state, user_id) = get_test_state();
        let quote = {
            let connection = state.db_connection.lock().unwrap();
            create_quote_with_materials(new_quote(user_id), &[], &connection).unwrap()
        };

        let response = get_quotes_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let detail_url = endpoints::format_endpoint(endpoints::QUOTE_DETAIL_VIEW, quote.id);
        let selector = Selector::parse("tbody a[href]").unwrap();
        let hrefs: Vec<_> = document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .collect();

        assert_eq!(hrefs, vec![detail_url.as_str()]);
    }

    #[tokio::test]
    async fn row_shows_formatted_price_and_fallback_category() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_quote_with_materials(
                NewQuote {
                    category_name: None,
                    ..new_quote(user_id)
                },
                &[],
                &connection,
            )
            .unwrap();
        }

        let response = get_quotes_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let body = document.html();

        assert!(body.contains(NO_CATEGORY_LABEL));
        assert!(body.contains("R$ 450,00"));
    }

    #[tokio::test]
    async fn long_description_is_truncated_with_ellipsis() {
        let (state, user_id) = get_test_state();
        let long_description = "ã".repeat(120);
        {
            let connection = state.db_connection.lock().unwrap();
            create_quote_with_materials(
                NewQuote {
                    service_description: long_description,
                    ..new_quote(user_id)
                },
                &[],
                &connection,
            )
            .unwrap();
        }

        let response = get_quotes_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let body = document.html();
        let preview = format!("{}…", "ã".repeat(90));

        assert!(body.contains(&preview), "description should be cut at 90 characters");
        assert!(!body.contains(&"ã".repeat(91)));
    }
}
