//! The page with the form for creating a new quote.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    quote::CATEGORIES,
};

fn material_row() -> Markup {
    html!(
        div class="material-row flex gap-2"
        {
            input
                type="text"
                name="material_description"
                placeholder="Material, ex.: Tinta acrílica"
                class=(FORM_TEXT_INPUT_STYLE);

            input
                type="text"
                name="material_quantity"
                placeholder="Quantidade, ex.: 2 latas"
                class=(FORM_TEXT_INPUT_STYLE);

            button
                type="button"
                aria-label="Remover material"
                "hx-on:click"="this.closest('.material-row').remove()"
                class="px-3 text-gray-500 hover:text-gray-900 dark:hover:text-white"
            {
                "✕"
            }
        }
    )
}

/// Renders a blank material row for the new quote form.
///
/// The form appends the fragment to its material list via htmx, so the number
/// of rows is not fixed at page render time.
pub async fn get_material_row() -> Response {
    material_row().into_response()
}

fn new_quote_form() -> Markup {
    html!(
        form
            hx-post=(endpoints::QUOTES_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Categoria" }

                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Sem categoria" }

                    @for category in CATEGORIES {
                        option value=(category) { (category) }
                    }
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Descrição do serviço" }

                textarea
                    name="description"
                    id="description"
                    rows="4"
                    placeholder="Descreva o serviço a ser feito"
                    class=(FORM_TEXT_INPUT_STYLE) {}
            }

            div
            {
                label for="labor-value" class=(FORM_LABEL_STYLE) { "Valor mão de obra (R$)" }

                input
                    type="text"
                    name="labor_value"
                    id="labor-value"
                    inputmode="decimal"
                    placeholder="Ex.: 2.850,00"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="needs_material"
                    id="needs-material"
                    tabindex="0"
                    class="rounded-xs";

                label for="needs-material" class=(FORM_LABEL_STYLE)
                {
                    "Precisa de material"
                }
            }

            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Materiais" }

                div id="material-rows" class="space-y-2"
                {
                    (material_row())
                }

                button
                    type="button"
                    hx-get=(endpoints::NEW_QUOTE_MATERIAL_ROW)
                    hx-target="#material-rows"
                    hx-swap="beforeend"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Adicionar material"
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Salvar orçamento"
            }
        }
    )
}

/// Renders the page for creating a quote.
pub async fn get_new_quote_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_QUOTE_VIEW).into_html();

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Novo orçamento" }

            (new_quote_form())
        }
    );

    base("Novo orçamento", &content).into_response()
}

#[cfg(test)]
mod new_quote_page_tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::{
        endpoints,
        quote::{CATEGORIES, get_material_row, get_new_quote_page},
        test_utils::{assert_valid_html, parse_html_document},
    };

    #[tokio::test]
    async fn renders_form_with_expected_fields() {
        let response = get_new_quote_page().await;
        assert_eq!(response.status(), StatusCode::OK);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form_selector = Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::QUOTES_API));

        for selector_string in [
            "select[name=category]",
            "textarea[name=description]",
            "input[name=labor_value]",
            "input[type=checkbox][name=needs_material]",
        ] {
            let selector = Selector::parse(selector_string).unwrap();
            assert_eq!(
                form.select(&selector).count(),
                1,
                "want exactly 1 element matching {selector_string}"
            );
        }
    }

    #[tokio::test]
    async fn category_select_offers_the_full_catalog() {
        let response = get_new_quote_page().await;
        let document = parse_html_document(response).await;

        let option_selector = Selector::parse("select[name=category] option").unwrap();
        let values: Vec<_> = document
            .select(&option_selector)
            .filter_map(|option| option.value().attr("value"))
            .collect();

        assert_eq!(values.len(), CATEGORIES.len() + 1);
        assert_eq!(values[0], "");
        for category in CATEGORIES {
            assert!(values.contains(&category), "missing category {category}");
        }
    }

    #[tokio::test]
    async fn material_rows_come_in_description_quantity_pairs() {
        let response = get_new_quote_page().await;
        let document = parse_html_document(response).await;

        let description_selector = Selector::parse("input[name=material_description]").unwrap();
        let quantity_selector = Selector::parse("input[name=material_quantity]").unwrap();

        let description_count = document.select(&description_selector).count();
        let quantity_count = document.select(&quantity_selector).count();

        assert!(description_count > 0);
        assert_eq!(description_count, quantity_count);
    }

    #[tokio::test]
    async fn form_has_button_that_appends_material_rows() {
        let response = get_new_quote_page().await;
        let document = parse_html_document(response).await;

        let button_selector = Selector::parse(&format!(
            "button[hx-get=\"{}\"]",
            endpoints::NEW_QUOTE_MATERIAL_ROW
        ))
        .unwrap();
        let buttons = document.select(&button_selector).collect::<Vec<_>>();
        assert_eq!(buttons.len(), 1);

        let button = buttons.first().unwrap().value();
        assert_eq!(button.attr("hx-target"), Some("#material-rows"));
        assert_eq!(button.attr("hx-swap"), Some("beforeend"));

        let target_selector = Selector::parse("#material-rows").unwrap();
        assert_eq!(document.select(&target_selector).count(), 1);
    }

    #[tokio::test]
    async fn material_row_fragment_contains_paired_inputs() {
        let response = get_material_row().await;
        assert_eq!(response.status(), StatusCode::OK);

        let fragment = parse_html_document(response).await;

        let description_selector = Selector::parse("input[name=material_description]").unwrap();
        let quantity_selector = Selector::parse("input[name=material_quantity]").unwrap();
        assert_eq!(fragment.select(&description_selector).count(), 1);
        assert_eq!(fragment.select(&quantity_selector).count(), 1);

        let remove_selector = Selector::parse("button[type=button]").unwrap();
        assert_eq!(fragment.select(&remove_selector).count(), 1);
    }
}
