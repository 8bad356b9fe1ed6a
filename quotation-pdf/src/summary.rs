// quotation-pdf: financial summary

use rust_decimal::{Decimal, RoundingStrategy};

use crate::quotation::{Discount, QuotationState};

/// Totals derived from the current quotation. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancialSummary {
    pub total: Decimal,
    pub discount: Discount,
    pub discount_amount: Decimal,
    pub final_total: Decimal,
}

impl FinancialSummary {
    pub fn from_state(state: &QuotationState) -> Self {
        let total: Decimal = state.items().iter().map(|item| item.subtotal()).sum();
        let discount = state.discount();
        let discount_amount = total * discount.fraction();
        Self {
            total,
            discount,
            discount_amount,
            final_total: total - discount_amount,
        }
    }
}

/// Round for display only: two places, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with the currency symbol, e.g. `₹1200.00`.
pub fn format_money(symbol: &str, value: Decimal) -> String {
    format!("{}{:.2}", symbol, round_money(value))
}
