use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned primary key of a persisted product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(Self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: String,
    /// Digits and dots only; kept as text, never parsed.
    pub price: String,
    pub description: String,
    pub category: String,
    /// Empty, or a `data:` URI.
    #[serde(default)]
    pub image: String,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            price: price.into(),
            description: description.into(),
            category: category.into(),
            image: image.into(),
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Price => &self.price,
            Field::Description => &self.description,
            Field::Category => &self.category,
            Field::Image => &self.image,
        }
    }

    pub(crate) fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Price => &mut self.price,
            Field::Description => &mut self.description,
            Field::Category => &mut self.category,
            Field::Image => &mut self.image,
        }
    }
}

/// The editable fields of a product. `id` is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Price,
    Description,
    Category,
    Image,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Price,
        Field::Description,
        Field::Category,
        Field::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Description => "description",
            Field::Category => "category",
            Field::Image => "image",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partial update: only the `Some` fields are written over the stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

impl ProductPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: Field, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match field {
            Field::Name => self.name = value,
            Field::Price => self.price = value,
            Field::Description => self.description = value,
            Field::Category => self.category = value,
            Field::Image => self.image = value,
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.image.is_none()
    }

    pub fn apply(&self, product: &mut Product) {
        let fields = [
            (Field::Name, &self.name),
            (Field::Price, &self.price),
            (Field::Description, &self.description),
            (Field::Category, &self.category),
            (Field::Image, &self.image),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *product.field_mut(field) = value.clone();
            }
        }
    }
}

impl From<Product> for ProductPatch {
    fn from(product: Product) -> Self {
        Self {
            name: Some(product.name),
            price: Some(product.price),
            description: Some(product.description),
            category: Some(product.category),
            image: Some(product.image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> Product {
        Product::new("Bag", "10", "d", "c", "")
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut product = bag().with_id(ProductId::new(1));
        ProductPatch::new()
            .set(Field::Price, "12.5")
            .apply(&mut product);

        assert_eq!(product.price, "12.5");
        assert_eq!(product.name, "Bag");
        assert_eq!(product.description, "d");
        assert_eq!(product.category, "c");
        assert_eq!(product.id, Some(ProductId::new(1)));
    }

    #[test]
    fn full_patch_replaces_every_field_but_id() {
        let mut product = bag().with_id(ProductId::new(7));
        let replacement = Product::new("Hat", "3", "warm", "clothes", "data:image/png;base64,AA==");
        ProductPatch::from(replacement.clone()).apply(&mut product);

        assert_eq!(product, replacement.with_id(ProductId::new(7)));
    }

    #[test]
    fn empty_patch_reports_empty() {
        assert!(ProductPatch::new().is_empty());
        assert!(!ProductPatch::new().set(Field::Image, "").is_empty());
    }

    #[test]
    fn id_is_omitted_from_json_when_absent() {
        let json = serde_json::to_value(bag()).unwrap();
        assert!(json.get("id").is_none());

        let json = serde_json::to_value(bag().with_id(ProductId::new(3))).unwrap();
        assert_eq!(json["id"], 3);
    }

    #[test]
    fn product_id_parses_with_optional_hash() {
        assert_eq!("#12".parse::<ProductId>().unwrap(), ProductId::new(12));
        assert_eq!(" 4 ".parse::<ProductId>().unwrap(), ProductId::new(4));
        assert!("abc".parse::<ProductId>().is_err());
    }
}
