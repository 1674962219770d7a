//! Catalog enums: product category, clothing type, sizes, and per-size stock.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Men,
    Women,
    Unisex,
    Kids,
}

impl Category {
    /// The lowercase wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
            Self::Unisex => "unisex",
            Self::Kids => "kids",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "men" => Ok(Self::Men),
            "women" => Ok(Self::Women),
            "unisex" => Ok(Self::Unisex),
            "kids" => Ok(Self::Kids),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

/// Clothing type within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClothingType {
    Shirt,
    Pants,
    Shoes,
    Accessories,
    Jackets,
    Hoodies,
}

impl ClothingType {
    /// The lowercase wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shirt => "shirt",
            Self::Pants => "pants",
            Self::Shoes => "shoes",
            Self::Accessories => "accessories",
            Self::Jackets => "jackets",
            Self::Hoodies => "hoodies",
        }
    }
}

impl std::fmt::Display for ClothingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClothingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shirt" => Ok(Self::Shirt),
            "pants" => Ok(Self::Pants),
            "shoes" => Ok(Self::Shoes),
            "accessories" => Ok(Self::Accessories),
            "jackets" => Ok(Self::Jackets),
            "hoodies" => Ok(Self::Hoodies),
            _ => Err(format!("invalid clothing type: {s}")),
        }
    }
}

/// A recognized size label. Cart line items are keyed by (product, size).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "xs")]
    Xs,
    #[serde(rename = "s")]
    S,
    #[serde(rename = "m")]
    M,
    #[serde(rename = "l")]
    L,
    #[serde(rename = "xl")]
    Xl,
    #[serde(rename = "2xl")]
    Xxl,
}

impl Size {
    /// All recognized sizes, in ascending order.
    pub const ALL: [Self; 6] = [Self::Xs, Self::S, Self::M, Self::L, Self::Xl, Self::Xxl];

    /// The lowercase wire/database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::S => "s",
            Self::M => "m",
            Self::L => "l",
            Self::Xl => "xl",
            Self::Xxl => "2xl",
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xs" => Ok(Self::Xs),
            "s" => Ok(Self::S),
            "m" => Ok(Self::M),
            "l" => Ok(Self::L),
            "xl" => Ok(Self::Xl),
            "2xl" => Ok(Self::Xxl),
            _ => Err(format!("invalid size: {s}")),
        }
    }
}

/// Validation errors for a per-size stock map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeStockError {
    #[error("missing size key: {0}")]
    MissingSize(Size),
    #[error("negative stock count for size {0}: {1}")]
    NegativeCount(Size, i64),
}

/// Per-size stock counts.
///
/// Invariant: every recognized size key is present with a count >= 0.
/// Serializes as a flat map, e.g. `{"xs":0,"s":4,"m":10,...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SizeStock(BTreeMap<Size, u32>);

impl SizeStock {
    /// A stock map with zero count for every size.
    #[must_use]
    pub fn empty() -> Self {
        Self(Size::ALL.iter().map(|s| (*s, 0)).collect())
    }

    /// Build from a complete size -> count map.
    ///
    /// # Errors
    ///
    /// Returns `SizeStockError::MissingSize` if any of the six recognized
    /// keys is absent.
    pub fn new(counts: BTreeMap<Size, u32>) -> Result<Self, SizeStockError> {
        for size in Size::ALL {
            if !counts.contains_key(&size) {
                return Err(SizeStockError::MissingSize(size));
            }
        }
        Ok(Self(counts))
    }

    /// Stock count for one size.
    #[must_use]
    pub fn count(&self, size: Size) -> u32 {
        self.0.get(&size).copied().unwrap_or(0)
    }

    /// Total units across all sizes.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().map(|&c| u64::from(c)).sum()
    }
}

impl<'de> Deserialize<'de> for SizeStock {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Counts arrive as signed numbers from JSON; reject negatives
        // rather than silently wrapping.
        let raw = BTreeMap::<Size, i64>::deserialize(deserializer)?;

        let mut counts = BTreeMap::new();
        for (size, n) in raw {
            let count = u32::try_from(n)
                .map_err(|_| serde::de::Error::custom(SizeStockError::NegativeCount(size, n)))?;
            counts.insert(size, count);
        }
        Self::new(counts).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn enums_roundtrip_their_wire_form() {
        for category in [Category::Men, Category::Women, Category::Unisex, Category::Kids] {
            assert_eq!(Category::from_str(category.as_str()).unwrap(), category);
        }
        for size in Size::ALL {
            assert_eq!(Size::from_str(size.as_str()).unwrap(), size);
        }
        assert_eq!(
            ClothingType::from_str("hoodies").unwrap(),
            ClothingType::Hoodies
        );
    }

    #[test]
    fn two_xl_uses_numeric_label() {
        assert_eq!(Size::Xxl.as_str(), "2xl");
        assert_eq!(serde_json::to_string(&Size::Xxl).unwrap(), "\"2xl\"");
    }

    #[test]
    fn unknown_size_is_rejected() {
        assert!(Size::from_str("xxl").is_err());
        assert!(Size::from_str("M").is_err());
    }

    #[test]
    fn size_stock_requires_all_six_keys() {
        let json = r#"{"xs":0,"s":1,"m":2,"l":3,"xl":4}"#;
        let err = serde_json::from_str::<SizeStock>(json).unwrap_err();
        assert!(err.to_string().contains("missing size key"));
    }

    #[test]
    fn size_stock_rejects_negative_counts() {
        let json = r#"{"xs":0,"s":-1,"m":2,"l":3,"xl":4,"2xl":5}"#;
        assert!(serde_json::from_str::<SizeStock>(json).is_err());
    }

    #[test]
    fn size_stock_roundtrips() {
        let json = r#"{"xs":0,"s":4,"m":10,"l":2,"xl":0,"2xl":1}"#;
        let stock: SizeStock = serde_json::from_str(json).unwrap();
        assert_eq!(stock.count(Size::M), 10);
        assert_eq!(stock.total(), 17);
        let back = serde_json::to_string(&stock).unwrap();
        let reparsed: SizeStock = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed, stock);
    }
}
