//! # Cart Types
//!
//! Request-scoped cart input. Field names match the storefront's wire
//! format (`selectedSize`, `selectedRam`).

use serde::{Deserialize, Serialize};

/// One item in a client's cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier reference
    pub id: String,

    /// Quantity (positive)
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Storage-size variant selector (e.g., "128GB")
    #[serde(rename = "selectedSize", default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,

    /// Memory-size variant selector (e.g., "16GB")
    #[serde(rename = "selectedRam", default, skip_serializing_if = "Option::is_none")]
    pub selected_ram: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    pub fn new(id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
            selected_size: None,
            selected_ram: None,
        }
    }

    /// Builder: set storage-size selector
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = Some(size.into());
        self
    }

    /// Builder: set memory-size selector
    pub fn with_ram(mut self, ram: impl Into<String>) -> Self {
        self.selected_ram = Some(ram.into());
        self
    }
}
