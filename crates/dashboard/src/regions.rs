//! Display regions and the surface they live on.

use std::collections::HashMap;

/// One of the four stat regions on the dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    TotalProducts,
    TotalItems,
    TotalValue,
    LowStock,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::TotalProducts,
        Region::TotalItems,
        Region::TotalValue,
        Region::LowStock,
    ];

    /// Element id of the region in the page.
    pub fn element_id(&self) -> &'static str {
        match self {
            Region::TotalProducts => "total-products",
            Region::TotalItems => "total-items",
            Region::TotalValue => "total-value",
            Region::LowStock => "low-stock",
        }
    }
}

impl core::fmt::Display for Region {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.element_id())
    }
}

/// Something that holds addressable text regions (the page DOM, or a map in tests).
///
/// The loader only ever writes regions; it never reads their content.
pub trait DisplaySurface {
    fn has_region(&self, region: Region) -> bool;

    fn set_text(&mut self, region: Region, text: &str);
}

/// Map-backed surface for native use and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySurface {
    regions: HashMap<&'static str, String>,
    writes: usize,
}

impl InMemorySurface {
    /// A surface with all four regions showing `placeholder`.
    pub fn with_all_regions(placeholder: &str) -> Self {
        Self::with_regions(&Region::ALL, placeholder)
    }

    pub fn with_regions(regions: &[Region], placeholder: &str) -> Self {
        Self {
            regions: regions
                .iter()
                .map(|r| (r.element_id(), placeholder.to_string()))
                .collect(),
            writes: 0,
        }
    }

    pub fn text(&self, region: Region) -> Option<&str> {
        self.regions.get(region.element_id()).map(String::as_str)
    }

    /// Number of `set_text` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DisplaySurface for InMemorySurface {
    fn has_region(&self, region: Region) -> bool {
        self.regions.contains_key(region.element_id())
    }

    fn set_text(&mut self, region: Region, text: &str) {
        self.writes += 1;
        if let Some(slot) = self.regions.get_mut(region.element_id()) {
            *slot = text.to_string();
        }
    }
}
