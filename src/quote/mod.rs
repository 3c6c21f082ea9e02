//! Quote management for the application.
//!
//! This module contains everything related to quotes ("orçamentos"):
//! - The `Quote` and `MaterialItem` models and the fixed category catalog
//! - Database functions for storing and querying quotes and their materials
//! - View handlers for the quote list, detail, and creation pages
//! - The printable quote document endpoint

mod core;
mod create_quote_endpoint;
mod detail_page;
mod document;
mod list_page;
mod material;
mod money;
mod new_quote_page;

pub use core::{
    CATEGORIES, Quote, create_quote_table, create_quote_with_materials, get_quote,
    get_quotes_for_owner,
};
pub use create_quote_endpoint::create_quote_endpoint;
pub use detail_page::get_quote_detail_page;
pub use document::get_quote_document;
pub use list_page::get_quotes_page;
pub use material::{MaterialItem, NewMaterialItem, create_material_item_table, get_material_items};
pub use money::{format_brl_from_cents, format_date, parse_money_to_cents};
pub use new_quote_page::{get_material_row, get_new_quote_page};
