// quotation-pdf: printable quotation view

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use comfy_table::CellAlignment;
use uuid::Uuid;

use crate::config::BusinessIdentity;
use crate::quotation::QuotationState;
use crate::summary::{format_money, FinancialSummary};
use crate::terminal;

// ============================================================================
// Quote Metadata
// ============================================================================

/// Identity of one issued quotation. Generated once per preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMeta {
    pub quote_number: String,
    pub issue_date: NaiveDate,
}

impl QuoteMeta {
    pub fn generate<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self {
            quote_number: format!("Q-{}-{}", now.format("%Y%m%d"), generate_short_id()),
            issue_date: now.date_naive(),
        }
    }

    pub fn now() -> Self {
        Self::generate(&Local::now())
    }
}

fn generate_short_id() -> String {
    let uuid = Uuid::new_v4();
    let hex = format!("{:x}", uuid);
    hex[..8].to_uppercase()
}

pub fn format_date_display(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

// ============================================================================
// Document View
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub product_name: String,
    pub unit_price: String,
    pub quantity: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsBlock {
    pub subtotal: String,
    pub discount_label: String,
    pub discount_amount: String,
    pub total: String,
}

/// Everything printed on the quotation, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    pub business: BusinessIdentity,
    pub quote_number: String,
    pub issue_date: String,
    pub bill_to: Option<String>,
    pub columns: [String; 4],
    pub rows: Vec<ItemRow>,
    pub totals: TotalsBlock,
    pub thanks: String,
    pub contact_note: String,
}

pub fn render_quotation_view(
    state: &QuotationState,
    summary: &FinancialSummary,
    business: &BusinessIdentity,
    meta: &QuoteMeta,
) -> DocumentView {
    let symbol = business.currency_symbol.as_str();

    let rows = state
        .items()
        .iter()
        .map(|item| ItemRow {
            product_name: item.product_name().to_string(),
            unit_price: format_money(symbol, item.unit_price()),
            quantity: item.quantity().to_string(),
            subtotal: format_money(symbol, item.subtotal()),
        })
        .collect();

    let totals = TotalsBlock {
        subtotal: format_money(symbol, summary.total),
        discount_label: format!("Discount ({}%):", summary.discount),
        discount_amount: format!("-{}", format_money(symbol, summary.discount_amount)),
        total: format_money(symbol, summary.final_total),
    };

    DocumentView {
        business: business.clone(),
        quote_number: meta.quote_number.clone(),
        issue_date: format_date_display(&meta.issue_date),
        bill_to: state.bill_to().map(str::to_string),
        columns: [
            "Product Name".to_string(),
            format!("Price ({})", symbol),
            "Quantity".to_string(),
            format!("Subtotal ({})", symbol),
        ],
        rows,
        totals,
        thanks: "Thank you for your business!".to_string(),
        contact_note: format!(
            "If you have any questions about this quotation, please contact us at {}",
            business.email
        ),
    }
}

impl fmt::Display for DocumentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.business.name)?;
        writeln!(f, "{}", self.business.tagline)?;
        writeln!(f, "{}", self.business.address)?;
        writeln!(f, "{}", self.business.contact_line())?;
        writeln!(f)?;
        writeln!(f, "QUOTATION")?;
        writeln!(f, "Date: {}", self.issue_date)?;
        writeln!(f, "Quote #: {}", self.quote_number)?;
        if let Some(client) = &self.bill_to {
            writeln!(f)?;
            writeln!(f, "Bill To:")?;
            writeln!(f, "  {}", client)?;
        }
        writeln!(f)?;

        let mut table = terminal::plain_table(&self.columns);
        for row in &self.rows {
            table.add_row(vec![
                row.product_name.as_str(),
                row.unit_price.as_str(),
                row.quantity.as_str(),
                row.subtotal.as_str(),
            ]);
        }
        terminal::align_columns(&mut table, &[1, 2, 3], CellAlignment::Right);
        writeln!(f, "{}", table)?;
        writeln!(f)?;

        let lines = [
            ("Subtotal:", self.totals.subtotal.as_str()),
            (self.totals.discount_label.as_str(), self.totals.discount_amount.as_str()),
            ("Total:", self.totals.total.as_str()),
        ];
        for (label, value) in lines {
            writeln!(f, "{:>40} {:>16}", label, value)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.thanks)?;
        write!(f, "{}", self.contact_note)
    }
}
