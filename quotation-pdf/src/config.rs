// quotation-pdf: configuration and input files

use std::path::Path;

use ::image::DynamicImage;
use serde::Deserialize;

use crate::error::QuoteError;

// ============================================================================
// Business Identity
// ============================================================================

/// The business issuing the quotation, shown in the document header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BusinessIdentity {
    pub name: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub currency_symbol: String,
}

impl Default for BusinessIdentity {
    fn default() -> Self {
        Self {
            name: "Elevate Edge Interiors".to_string(),
            tagline: "LET'S DESIGN YOUR DREAM SPACE TOGETHER.".to_string(),
            address: "Jubilee Hills, Hyderabad - 500033, Telangana".to_string(),
            phone: "+91 89197 94276".to_string(),
            email: "studioelevateedge@gmail.com".to_string(),
            currency_symbol: "₹".to_string(),
        }
    }
}

impl BusinessIdentity {
    /// Up to two initials for the logo monogram, e.g. "EE".
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .filter(|c| c.is_alphanumeric())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn contact_line(&self) -> String {
        format!("Phone: {} | Email: {}", self.phone, self.email)
    }
}

pub fn load_business(path: Option<&Path>) -> Result<BusinessIdentity, QuoteError> {
    match path {
        Some(p) => {
            let content = std::fs::read_to_string(p)
                .map_err(|e| QuoteError::ConfigError(format!("{}: {}", p.display(), e)))?;
            serde_json::from_str(&content)
                .map_err(|e| QuoteError::ConfigError(format!("Invalid JSON: {}", e)))
        }
        None => Ok(BusinessIdentity::default()),
    }
}

// ============================================================================
// Item Input
// ============================================================================

/// Raw line item fields, validated later by `QuotationState::add_item`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInput {
    pub product_name: String,
    pub price: String,
    pub quantity: String,
}

/// Items file entry. Numbers may be written as JSON numbers or strings.
#[derive(Debug, Deserialize)]
struct ItemEntry {
    #[serde(alias = "productName", alias = "product_name")]
    name: String,
    price: RawField,
    quantity: RawField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(serde_json::Number),
    Text(String),
}

impl RawField {
    fn into_raw(self) -> String {
        match self {
            RawField::Number(n) => n.to_string(),
            RawField::Text(s) => s,
        }
    }
}

pub fn load_items(path: &Path) -> Result<Vec<ItemInput>, QuoteError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| QuoteError::ItemsError(format!("{}: {}", path.display(), e)))?;
    parse_items_json(&content)
}

pub fn parse_items_json(content: &str) -> Result<Vec<ItemInput>, QuoteError> {
    let entries: Vec<ItemEntry> = serde_json::from_str(content)
        .map_err(|e| QuoteError::ItemsError(format!("Invalid JSON: {}", e)))?;
    Ok(entries
        .into_iter()
        .map(|e| ItemInput {
            product_name: e.name,
            price: e.price.into_raw(),
            quantity: e.quantity.into_raw(),
        })
        .collect())
}

/// Parse a `name:price:quantity` item flag. The name may itself contain colons.
pub fn parse_item_spec(spec: &str) -> Result<ItemInput, QuoteError> {
    let mut parts = spec.rsplitn(3, ':');
    let quantity = parts.next();
    let price = parts.next();
    let name = parts.next();
    match (name, price, quantity) {
        (Some(name), Some(price), Some(quantity)) => Ok(ItemInput {
            product_name: name.to_string(),
            price: price.to_string(),
            quantity: quantity.to_string(),
        }),
        _ => Err(QuoteError::ItemsError(format!(
            "expected NAME:PRICE:QUANTITY, got \"{}\"",
            spec
        ))),
    }
}

// ============================================================================
// Logo
// ============================================================================

pub fn load_logo(path: Option<&Path>) -> Result<Option<DynamicImage>, QuoteError> {
    match path {
        Some(p) => {
            let image_bytes = std::fs::read(p)
                .map_err(|e| QuoteError::ImageError(format!("{}: {}", p.display(), e)))?;
            let img = ::image::load_from_memory(&image_bytes)
                .map_err(|e| QuoteError::ImageError(format!("Failed to decode logo: {}", e)))?;
            Ok(Some(img))
        }
        None => Ok(None),
    }
}
