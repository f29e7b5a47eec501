//! # Product Form
//!
//! Transient edit state for exactly one product: either a new one (create mode) or a copy
//! of an existing one (edit mode). Nothing here touches the store. Submitting produces a
//! [`FormEvent`] which the catalog controller turns into a store mutation.
//!
//! ## Field Rules
//!
//! - Text fields are stored verbatim.
//! - `price` is sanitized on every update: anything that is not an ASCII digit or `.` is
//!   dropped. The result may still be empty or contain several dots.
//! - `image` is only ever set from a completed file read (a data URI) or cleared.
//!
//! ## Image Reads
//!
//! Reading a file is asynchronous. Each selection gets a generation number and only the
//! read belonging to the newest selection is applied, so a slow read of an older file can
//! never overwrite a newer choice.

use crate::error::ImageError;
use crate::image::read_image;
use crate::model::{Field, Product, ProductId};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keep only ASCII digits and dots.
pub fn sanitize_price(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ProductId),
}

/// The single outward event a form produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Created(Product),
    Edited { id: ProductId, product: Product },
}

#[derive(Debug, Clone)]
pub struct ProductForm {
    mode: FormMode,
    draft: Product,
    image_generation: u64,
}

impl ProductForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            draft: Product::default(),
            image_generation: 0,
        }
    }

    /// Start editing a copy of `product`. A product without id can only be created.
    pub fn edit(product: &Product) -> Self {
        let mode = match product.id {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };
        let mut draft = product.clone();
        draft.id = None;
        Self {
            mode,
            draft,
            image_generation: 0,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn values(&self) -> &Product {
        &self.draft
    }

    pub fn get(&self, field: Field) -> &str {
        self.draft.field(field)
    }

    /// Apply one keystroke-level update to a text field.
    ///
    /// `Field::Image` cannot be typed into and is ignored here; use
    /// [`begin_image_read`](Self::begin_image_read) or [`clear_image`](Self::clear_image).
    pub fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::Image => debug!("Ignoring typed value for image field"),
            Field::Price => self.draft.price = sanitize_price(value),
            _ => *self.draft.field_mut(field) = value.to_string(),
        }
    }

    pub fn set_name(&mut self, value: &str) {
        self.set(Field::Name, value);
    }

    pub fn set_price(&mut self, value: &str) {
        self.set(Field::Price, value);
    }

    pub fn set_description(&mut self, value: &str) {
        self.set(Field::Description, value);
    }

    pub fn set_category(&mut self, value: &str) {
        self.set(Field::Category, value);
    }

    /// Register a new file selection. Any read still in flight for an earlier selection
    /// becomes stale.
    pub fn begin_image_read(&mut self, path: impl Into<PathBuf>) -> PendingImage {
        self.image_generation += 1;
        PendingImage {
            generation: self.image_generation,
            path: path.into(),
        }
    }

    /// Apply a completed read. Returns false, leaving the field untouched, when the read
    /// belongs to a superseded selection.
    pub fn apply_image(&mut self, loaded: LoadedImage) -> bool {
        if loaded.generation != self.image_generation {
            debug!(
                stale = loaded.generation,
                current = self.image_generation,
                "Discarding stale image read"
            );
            return false;
        }
        self.draft.image = loaded.data_uri;
        true
    }

    pub fn clear_image(&mut self) {
        // Also invalidates any pending read.
        self.image_generation += 1;
        self.draft.image.clear();
    }

    /// Required fields that are still empty, in form order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.draft.field(*f).is_empty())
            .collect()
    }

    /// Finish editing. Required fields are the UI's job and are not re-checked.
    pub fn submit(self) -> FormEvent {
        match self.mode {
            FormMode::Create => FormEvent::Created(self.draft),
            FormMode::Edit(id) => FormEvent::Edited {
                id,
                product: self.draft.with_id(id),
            },
        }
    }
}

/// A file selection whose read has not completed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingImage {
    generation: u64,
    path: PathBuf,
}

impl PendingImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(self, max_bytes: u64) -> Result<LoadedImage, ImageError> {
        let data_uri = read_image(&self.path, max_bytes).await?;
        Ok(LoadedImage {
            generation: self.generation,
            data_uri,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    generation: u64,
    data_uri: String,
}

impl LoadedImage {
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }
}
