//! The printable quote document endpoint.
//!
//! Serves a complete, self-contained HTML document for a single quote so the
//! provider can print it or save it as a file from the browser. True PDF
//! generation is a deferred feature; the endpoint deliberately serves HTML
//! with an inline content-disposition instead.
//!
//! Unlike the page routes, this endpoint does its own session check and
//! reports failures as JSON, since it is opened outside the htmx-driven UI.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rusqlite::Connection;
use serde_json::json;
use time::UtcOffset;
use uuid::{Uuid, Variant};

use crate::{
    AppState, Error,
    auth::get_token_from_cookies,
    quote::{
        MaterialItem, Quote, format_brl_from_cents, format_date, get_material_items, get_quote,
    },
    timezone::get_local_offset,
};

/// The stylesheet embedded in the generated document.
///
/// The document must render standalone, so no external resources are
/// referenced. The print rules strip the page chrome for "save as PDF".
const DOCUMENT_STYLE: &str = "\
    :root{\
      --bg:#f3f4f6;\
      --paper:#ffffff;\
      --text:#111827;\
      --muted:#6b7280;\
      --line:#e5e7eb;\
      --brand:#111827;\
    }\
    *{box-sizing:border-box}\
    body{\
      margin:0;\
      background:var(--bg);\
      font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Arial;\
      color:var(--text);\
      padding:24px;\
    }\
    .page{\
      max-width: 820px;\
      margin: 0 auto;\
      background:var(--paper);\
      border:1px solid var(--line);\
      border-radius:14px;\
      box-shadow: 0 10px 30px rgba(0,0,0,.06);\
      overflow:hidden;\
    }\
    .header{\
      padding:22px 24px;\
      border-bottom:1px solid var(--line);\
      display:flex;\
      justify-content:space-between;\
      gap:16px;\
      align-items:flex-start;\
    }\
    .brand{\
      font-weight:800;\
      letter-spacing:.2px;\
      font-size:18px;\
      color:var(--brand);\
      line-height:1.2;\
    }\
    .meta{\
      text-align:right;\
      font-size:12px;\
      color:var(--muted);\
      line-height:1.6;\
      white-space:nowrap;\
    }\
    .content{\
      padding:24px;\
      display:grid;\
      gap:18px;\
    }\
    .card{\
      border:1px solid var(--line);\
      border-radius:12px;\
      padding:16px;\
    }\
    .title{\
      margin:0;\
      font-size:18px;\
      font-weight:800;\
    }\
    .subtitle{\
      margin-top:6px;\
      font-size:13px;\
      color:var(--muted);\
    }\
    .row{\
      margin-top:12px;\
      display:flex;\
      justify-content:space-between;\
      gap:12px;\
      align-items:flex-start;\
    }\
    .label{\
      font-size:12px;\
      color:var(--muted);\
      margin-bottom:4px;\
    }\
    .value{\
      font-size:14px;\
      font-weight:700;\
      color:var(--text);\
      white-space:nowrap;\
    }\
    .desc{\
      margin-top:10px;\
      font-size:13px;\
      color:#374151;\
      white-space:pre-wrap;\
      line-height:1.5;\
    }\
    table{\
      width:100%;\
      border-collapse:collapse;\
      margin-top:10px;\
      font-size:13px;\
    }\
    th, td{\
      padding:10px 8px;\
      border-bottom:1px solid var(--line);\
      text-align:left;\
      vertical-align:top;\
    }\
    th{\
      font-size:12px;\
      color:var(--muted);\
      font-weight:700;\
    }\
    .total{\
      display:flex;\
      justify-content:space-between;\
      align-items:center;\
      padding:14px 16px;\
      border:1px solid var(--line);\
      border-radius:12px;\
      background:#fafafa;\
      margin-top:4px;\
    }\
    .total strong{font-size:16px}\
    .footer{\
      padding:18px 24px;\
      border-top:1px solid var(--line);\
      color:var(--muted);\
      font-size:12px;\
      display:flex;\
      justify-content:space-between;\
      gap:12px;\
      flex-wrap:wrap;\
    }\
    @media print{\
      body{background:#fff; padding:0}\
      .page{box-shadow:none; border:none; border-radius:0}\
    }";

/// Check that `raw_id` is a canonical UUID: versions 1 through 5 with the
/// RFC 4122 variant bits.
///
/// This runs before any database access so malformed IDs never reach a query.
fn parse_document_id(raw_id: &str) -> Option<Uuid> {
    // `Uuid::try_parse` also accepts braced and unhyphenated forms, which are
    // not valid document IDs.
    if raw_id.len() != 36 {
        return None;
    }

    let id = Uuid::try_parse(raw_id).ok()?;

    if !(1..=5).contains(&id.get_version_num()) {
        return None;
    }

    if id.get_variant() != Variant::RFC4122 {
        return None;
    }

    Some(id)
}

fn material_rows(materials: &[MaterialItem]) -> Markup {
    html!(
        @if materials.is_empty() {
            tr
            {
                td colspan="2" style="color:#6b7280" { "Nenhum material informado." }
            }
        } @else {
            @for material in materials {
                tr
                {
                    td { (material.description) }
                    td style="text-align:right; color:#111827"
                    {
                        (material.quantity.as_deref().unwrap_or("—"))
                    }
                }
            }
        }
    )
}

/// Render the full document. All user-supplied text passes through maud,
/// which escapes it; only the static stylesheet is embedded pre-escaped.
fn document_view(quote: &Quote, materials: &[MaterialItem], local_offset: UtcOffset) -> Markup {
    let title = quote.category_name.as_deref().unwrap_or("Orçamento");
    let description = quote.service_description.trim();
    let value = format_brl_from_cents(quote.labor_value_cents);
    let created_at = format_date(quote.created_at, local_offset);

    html!(
        (DOCTYPE)
        html lang="pt-BR"
        {
            head
            {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Orçamento" }
                style { (PreEscaped(DOCUMENT_STYLE)) }
            }

            body
            {
                div class="page"
                {
                    div class="header"
                    {
                        div
                        {
                            div class="brand" { "Orçamento de Serviços" }
                            div class="subtitle" { "Gerado pelo sistema" }
                        }
                        div class="meta"
                        {
                            div { strong { "ID: " } (quote.id) }
                            div { strong { "Data: " } (created_at) }
                        }
                    }

                    div class="content"
                    {
                        div class="card"
                        {
                            h1 class="title" { (title) }
                            div class="subtitle" { "Categoria do serviço" }

                            @if !description.is_empty() {
                                div class="desc" { (description) }
                            }

                            div class="row"
                            {
                                div
                                {
                                    div class="label" { "Valor mão de obra" }
                                    div class="value" { (value) }
                                }
                                div style="text-align:right"
                                {
                                    div class="label" { "Materiais" }
                                    div class="value"
                                    {
                                        @if quote.needs_material { "Necessita" }
                                        @else { "Não informado" }
                                    }
                                }
                            }
                        }

                        div class="card"
                        {
                            div class="label" style="font-weight:700; color:var(--text)"
                            {
                                "Materiais necessários"
                            }
                            table
                            {
                                thead
                                {
                                    tr
                                    {
                                        th { "Item" }
                                        th style="text-align:right" { "Qtd (opcional)" }
                                    }
                                }
                                tbody
                                {
                                    (material_rows(materials))
                                }
                            }
                        }

                        div class="total"
                        {
                            span style="color:var(--muted); font-size:12px"
                            {
                                "Total (mão de obra)"
                            }
                            strong { (value) }
                        }
                    }

                    div class="footer"
                    {
                        div
                        {
                            "Observação: materiais podem ser fornecidos pelo cliente \
                            ou pelo prestador conforme combinado."
                        }
                        div { "Assinatura: __________________________" }
                    }
                }
            }
        }
    )
}

/// The state needed to serve the quote document.
#[derive(Debug, Clone)]
pub struct QuoteDocumentState {
    /// The key to be used for decrypting the auth cookie.
    pub cookie_key: Key,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// The database connection for fetching the quote and its materials.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for QuoteDocumentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<QuoteDocumentState> for Key {
    fn from_ref(state: &QuoteDocumentState) -> Self {
        state.cookie_key.clone()
    }
}

/// Route handler for the printable quote document.
///
/// Responses:
/// - 400 with a JSON diagnostic if the ID is not a canonical UUID,
/// - 401 with a JSON error if there is no valid session,
/// - 404 with a JSON error if the quote does not exist or belongs to someone else,
/// - 200 with a self-contained HTML document otherwise.
pub async fn get_quote_document(
    State(state): State<QuoteDocumentState>,
    jar: PrivateCookieJar,
    Path(quote_id): Path<String>,
) -> Response {
    let Some(quote_id) = parse_document_id(&quote_id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid id",
                "details": format!("path=/quotes/{quote_id}/document"),
            })),
        )
            .into_response();
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            )
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    let quote = match get_quote(quote_id, user_id, &connection) {
        Ok(quote) => quote,
        Err(Error::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "quote not found",
                    "details": "no row",
                })),
            )
                .into_response();
        }
        Err(error) => {
            tracing::error!("Failed to retrieve the quote for a document: {error}");
            return error.into_response();
        }
    };

    // The materials are always fetched so a quote flagged as needing
    // materials with none listed still renders the explicit empty row.
    let materials = match get_material_items(quote.id, &connection) {
        Ok(materials) => materials,
        Err(error) => {
            tracing::error!("Failed to retrieve materials for a document: {error}");
            return error.into_response();
        }
    };
    drop(connection);

    let local_offset = get_local_offset(&state.local_timezone).unwrap_or(UtcOffset::UTC);
    let document = document_view(&quote, &materials, local_offset);

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/html; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("inline; filename=\"quote-{quote_id}.html\""),
            ),
        ],
        document.into_string(),
    )
        .into_response()
}
