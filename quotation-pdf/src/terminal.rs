// quotation-pdf: terminal tables for the interactive session

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::quotation::QuotationState;
use crate::summary::{format_money, FinancialSummary};

pub const EMPTY_STATE: &str = "No items added yet. Use `add <name> <price> <quantity>`.";

pub fn plain_table<S: AsRef<str>>(headers: &[S]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| h.as_ref()).collect::<Vec<_>>());
    table
}

pub fn align_columns(table: &mut Table, columns: &[usize], alignment: CellAlignment) {
    for &index in columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(alignment);
        }
    }
}

/// The live items table, or the empty-state hint when there is nothing to show.
pub fn items_table(state: &QuotationState, symbol: &str) -> String {
    if state.is_empty() {
        return EMPTY_STATE.to_string();
    }
    let price_header = format!("Price ({})", symbol);
    let subtotal_header = format!("Subtotal ({})", symbol);
    let mut table = plain_table(&[
        "ID",
        "Product Name",
        price_header.as_str(),
        "Quantity",
        subtotal_header.as_str(),
    ]);
    for item in state.items() {
        table.add_row(vec![
            Cell::new(item.id()).fg(Color::DarkGrey),
            Cell::new(item.product_name()),
            Cell::new(format_money(symbol, item.unit_price())),
            Cell::new(item.quantity()),
            Cell::new(format_money(symbol, item.subtotal())),
        ]);
    }
    align_columns(&mut table, &[0, 2, 3, 4], CellAlignment::Right);
    table.to_string()
}

pub fn totals_panel(summary: &FinancialSummary, symbol: &str) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(format_money(symbol, summary.total)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Discount ({}%)", summary.discount)),
        Cell::new(format_money(symbol, summary.discount_amount)),
    ]);
    table.add_row(vec![
        Cell::new("Final").add_attribute(Attribute::Bold),
        Cell::new(format_money(symbol, summary.final_total))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ]);
    align_columns(&mut table, &[1], CellAlignment::Right);
    table.to_string()
}
