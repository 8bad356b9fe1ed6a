// quotation-pdf: quotation state and item management

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Validation
// ============================================================================

/// Rejected line item input. Nothing is added when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Product name is required")]
    EmptyProductName,
    #[error("Price must be a number greater than zero (got \"{0}\")")]
    InvalidPrice(String),
    #[error("Quantity must be a whole number greater than zero (got \"{0}\")")]
    InvalidQuantity(String),
    #[error("Amount is too large for this quotation")]
    AmountTooLarge,
}

/// Plain decimal notation: an optional sign, ASCII digits and at most one `.`.
/// Digit separators, exponents and unit suffixes such as `%` are not numbers.
fn parse_plain_number(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let plain = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit());
    if !plain {
        return None;
    }
    let value = Decimal::from_str(unsigned).ok()?;
    Some(if s.starts_with('-') { -value } else { value })
}

fn parse_price(raw: &str) -> Result<Decimal, ValidationError> {
    match parse_plain_number(raw) {
        Some(price) if price > Decimal::ZERO => Ok(price),
        _ => Err(ValidationError::InvalidPrice(raw.to_string())),
    }
}

fn parse_quantity(raw: &str) -> Result<u32, ValidationError> {
    parse_plain_number(raw)
        .filter(|quantity| *quantity > Decimal::ZERO && quantity.fract().is_zero())
        .and_then(|quantity| quantity.to_u32())
        .ok_or_else(|| ValidationError::InvalidQuantity(raw.to_string()))
}

// ============================================================================
// Line Items
// ============================================================================

/// Identifier of a line item, unique within one quotation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ItemId)
    }
}

/// One product entry. The subtotal is fixed when the item is created.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    id: ItemId,
    product_name: String,
    unit_price: Decimal,
    quantity: u32,
    subtotal: Decimal,
}

impl LineItem {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

// ============================================================================
// Discount
// ============================================================================

/// Discount percentage, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Discount(Decimal);

impl Discount {
    pub fn new(percent: Decimal) -> Self {
        Self(percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Parse raw field input. Anything that is not a number counts as no discount.
    pub fn parse(raw: &str) -> Self {
        parse_plain_number(raw).map(Self::new).unwrap_or_default()
    }

    pub fn percent(self) -> Decimal {
        self.0
    }

    /// The discount as a fraction of the total, `0..=1`.
    pub fn fraction(self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

// ============================================================================
// Quotation State
// ============================================================================

/// Everything the user has entered for one quotation.
#[derive(Debug, Clone, Default)]
pub struct QuotationState {
    items: Vec<LineItem>,
    client_name: String,
    discount: Discount,
    next_id: u64,
}

impl QuotationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// Client name for the "Bill To" block, if one was entered.
    pub fn bill_to(&self) -> Option<&str> {
        let name = self.client_name.trim();
        (!name.is_empty()).then_some(name)
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Export is only offered once there is something to quote.
    pub fn can_export(&self) -> bool {
        !self.items.is_empty()
    }

    /// Validate form input and append a new line item.
    ///
    /// Price and quantity are plain decimals: an optional sign, digits and at
    /// most one `.`, surrounded by optional whitespace. `1_000`, `1e3` and `10%`
    /// are rejected. The price must be above zero. The quantity must be a whole
    /// number above zero, so `3` and `3.0` are accepted and `1.5` is not.
    pub fn add_item(
        &mut self,
        product_name: &str,
        unit_price_raw: &str,
        quantity_raw: &str,
    ) -> Result<LineItem, ValidationError> {
        let product_name = product_name.trim();
        if product_name.is_empty() {
            return Err(ValidationError::EmptyProductName);
        }
        let unit_price = parse_price(unit_price_raw)?;
        let quantity = parse_quantity(quantity_raw)?;

        let subtotal = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or(ValidationError::AmountTooLarge)?;
        // Keep the running total representable so the summary never overflows.
        self.items
            .iter()
            .try_fold(subtotal, |acc, item| acc.checked_add(item.subtotal))
            .ok_or(ValidationError::AmountTooLarge)?;

        self.next_id += 1;
        let item = LineItem {
            id: ItemId(self.next_id),
            product_name: product_name.to_string(),
            unit_price,
            quantity,
            subtotal,
        };
        info!(id = %item.id, product = %item.product_name, %subtotal, "Item added");
        self.items.push(item.clone());
        Ok(item)
    }

    /// Remove an item by id. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: ItemId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id == id);
        match index {
            Some(index) => {
                let removed = self.items.remove(index);
                info!(id = %id, product = %removed.product_name, "Item removed");
                Some(removed)
            }
            None => {
                debug!(id = %id, "Remove ignored, no such item");
                None
            }
        }
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        self.client_name = name.into();
        debug!(client = %self.client_name, "Client name updated");
    }

    /// Store discount field input, clamped to `0..=100`.
    pub fn set_discount(&mut self, raw: &str) -> Discount {
        self.discount = Discount::parse(raw);
        debug!(raw, discount = %self.discount, "Discount updated");
        self.discount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_add_item_computes_subtotal_and_appends() {
        let mut state = QuotationState::new();
        state.add_item("Sofa", "1200", "2").unwrap();
        let item = state.add_item("  Lamp  ", "49.99", "3").unwrap();

        assert_eq!(state.items().len(), 2);
        assert_eq!(state.items()[1], item);
        assert_eq!(item.product_name(), "Lamp");
        assert_eq!(item.unit_price(), dec("49.99"));
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.subtotal(), dec("149.97"));
    }

    #[test]
    fn test_item_ids_are_unique_and_increasing() {
        let mut state = QuotationState::new();
        let a = state.add_item("A", "1", "1").unwrap().id();
        let b = state.add_item("B", "1", "1").unwrap().id();
        state.remove_item(b);
        let c = state.add_item("C", "1", "1").unwrap().id();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_invalid_items_leave_state_unchanged() {
        let mut state = QuotationState::new();
        state.add_item("Sofa", "1200", "2").unwrap();

        let cases = [
            ("", "10", "1", ValidationError::EmptyProductName),
            ("   ", "10", "1", ValidationError::EmptyProductName),
            ("Chair", "0", "1", ValidationError::InvalidPrice("0".into())),
            ("Chair", "-3", "1", ValidationError::InvalidPrice("-3".into())),
            ("Chair", "abc", "1", ValidationError::InvalidPrice("abc".into())),
            ("Chair", "", "1", ValidationError::InvalidPrice("".into())),
            ("Chair", "10", "0", ValidationError::InvalidQuantity("0".into())),
            ("Chair", "10", "-1", ValidationError::InvalidQuantity("-1".into())),
            ("Chair", "10", "two", ValidationError::InvalidQuantity("two".into())),
            ("Chair", "10", "1.5", ValidationError::InvalidQuantity("1.5".into())),
            ("Chair", "1_000", "1", ValidationError::InvalidPrice("1_000".into())),
            ("Chair", "1e3", "1", ValidationError::InvalidPrice("1e3".into())),
            ("Chair", "10%", "1", ValidationError::InvalidPrice("10%".into())),
            ("Chair", ".", "1", ValidationError::InvalidPrice(".".into())),
            ("Chair", "10", "1_0", ValidationError::InvalidQuantity("1_0".into())),
            ("Chair", "10", "2e0", ValidationError::InvalidQuantity("2e0".into())),
        ];

        for (name, price, quantity, expected) in cases {
            let err = state.add_item(name, price, quantity).unwrap_err();
            assert_eq!(err, expected, "input ({name:?}, {price:?}, {quantity:?})");
            assert_eq!(state.items().len(), 1);
        }
    }

    #[test]
    fn test_whole_decimal_quantity_is_accepted() {
        let mut state = QuotationState::new();
        let item = state.add_item("Stool", " +1500.50 ", "3.0").unwrap();
        assert_eq!(item.quantity(), 3);
        assert_eq!(item.subtotal(), dec("4501.50"));
        assert_eq!(state.add_item("Rug", "0.5", "2").unwrap().subtotal(), dec("1.0"));
    }

    #[test]
    fn test_remove_item_keeps_order_of_the_rest() {
        let mut state = QuotationState::new();
        let a = state.add_item("A", "1", "1").unwrap().id();
        let b = state.add_item("B", "2", "1").unwrap().id();
        let c = state.add_item("C", "3", "1").unwrap().id();

        let removed = state.remove_item(b).unwrap();
        assert_eq!(removed.product_name(), "B");
        let ids: Vec<ItemId> = state.items().iter().map(LineItem::id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_remove_unknown_item_is_noop() {
        let mut state = QuotationState::new();
        state.add_item("A", "1", "1").unwrap();
        assert!(state.remove_item(ItemId(999)).is_none());
        assert_eq!(state.items().len(), 1);
    }

    #[test]
    fn test_discount_clamping() {
        let mut state = QuotationState::new();
        assert_eq!(state.set_discount("150").percent(), dec("100"));
        assert_eq!(state.set_discount("-5").percent(), Decimal::ZERO);
        assert_eq!(state.set_discount("abc").percent(), Decimal::ZERO);
        assert_eq!(state.set_discount("").percent(), Decimal::ZERO);
        assert_eq!(state.set_discount(" 12.5 ").percent(), dec("12.5"));
        assert_eq!(state.discount().to_string(), "12.5");
    }

    #[test]
    fn test_discount_rejects_non_plain_numbers() {
        assert_eq!(Discount::parse("1_000").percent(), Decimal::ZERO);
        assert_eq!(Discount::parse("10%").percent(), Decimal::ZERO);
        assert_eq!(Discount::parse("1e1").percent(), Decimal::ZERO);
        assert_eq!(Discount::parse("+15").percent(), dec("15"));
    }

    #[test]
    fn test_discount_display_drops_trailing_zeros() {
        assert_eq!(Discount::parse("10.00").to_string(), "10");
        assert_eq!(Discount::parse("0").to_string(), "0");
        assert_eq!(Discount::parse("10").fraction(), dec("0.1"));
    }

    #[test]
    fn test_export_enabled_only_with_items() {
        let mut state = QuotationState::new();
        assert!(!state.can_export());
        let id = state.add_item("A", "1", "1").unwrap().id();
        assert!(state.can_export());
        state.remove_item(id);
        assert!(!state.can_export());
    }

    #[test]
    fn test_bill_to_ignores_blank_names() {
        let mut state = QuotationState::new();
        assert_eq!(state.bill_to(), None);
        state.set_client_name("   ");
        assert_eq!(state.bill_to(), None);
        state.set_client_name(" Acme Corp ");
        assert_eq!(state.bill_to(), Some("Acme Corp"));
        assert_eq!(state.client_name(), " Acme Corp ");
    }

    #[test]
    fn test_oversized_amounts_are_rejected() {
        let mut state = QuotationState::new();
        let huge = Decimal::MAX.to_string();
        assert_eq!(
            state.add_item("Gold", &huge, "2"),
            Err(ValidationError::AmountTooLarge)
        );
        assert!(state.is_empty());
    }
}
