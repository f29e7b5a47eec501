//! # Catalog Controller
//!
//! Keeps the in-memory product list in step with the record store and owns the
//! create/edit form lifecycle.
//!
//! ## Mirror Rule
//!
//! The list is only changed after the store confirms a mutation, and only by the exact
//! change the store made. A failed operation is logged, reported as an error message, and
//! leaves the list as the last known-good state. Nothing is retried; callers may simply
//! repeat the action or [`reload`](Catalog::reload).
//!
//! ## Form Lifecycle
//!
//! ```text
//! Closed ──open_create / open_edit──▶ Open ──submit / close──▶ Closed
//! ```
//!
//! Opening while already open replaces the form being edited. Closing discards the
//! transient state without touching the store.
//!
//! ## Addressing
//!
//! Products are addressed by [`ProductId`], never by list position, so the mirror's
//! order cannot cause an edit or delete to hit the wrong record.

use crate::error::{StoreError, StoreResult};
use crate::form::{FormEvent, FormMode, ProductForm};
use crate::model::{Product, ProductId, ProductPatch};
use crate::outcome::{CmdMessage, CmdResult};
use crate::store::RecordStore;
use std::future::Future;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Open(FormMode),
}

/// Restricts which mirrored products are shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact category, compared case-insensitively.
    pub category: Option<String>,
    /// Substring of name, description or category, case-insensitive.
    pub search: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = [&product.name, &product.description, &product.category]
                .iter()
                .any(|text| text.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}

pub struct Catalog<S: RecordStore> {
    store: Option<S>,
    products: Vec<Product>,
    form: Option<ProductForm>,
}

impl<S: RecordStore> Catalog<S> {
    /// Open the store and load every product.
    ///
    /// Never fails: an open or read error is logged and the catalog starts empty.
    pub async fn start<F>(open: F) -> Self
    where
        F: Future<Output = StoreResult<S>>,
    {
        let mut catalog = Self {
            store: None,
            products: Vec::new(),
            form: None,
        };

        match open.await {
            Ok(store) => {
                catalog.store = Some(store);
                if let Err(e) = catalog.load().await {
                    error!(error = %e, "Error reading products");
                }
            }
            Err(e) => error!(error = %e, "Database error"),
        }

        catalog
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    /// False when the store could not be opened.
    pub fn is_ready(&self) -> bool {
        self.store.is_some()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == Some(id))
    }

    pub fn filtered(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    async fn load(&mut self) -> StoreResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        self.products = store.read_all().await?;
        debug!(count = self.products.len(), "Catalog loaded");
        Ok(())
    }

    /// Re-read the whole list from the store.
    pub async fn reload(&mut self) -> CmdResult {
        if self.store.is_none() {
            return unavailable();
        }
        match self.load().await {
            Ok(()) => CmdResult::default().with_message(CmdMessage::info(format!(
                "Loaded {} products",
                self.products.len()
            ))),
            Err(e) => {
                error!(error = %e, "Error reading products");
                CmdResult::default().with_message(CmdMessage::error(e.to_string()))
            }
        }
    }

    // --- Form lifecycle ---

    pub fn modal(&self) -> ModalState {
        match &self.form {
            Some(form) => ModalState::Open(form.mode()),
            None => ModalState::Closed,
        }
    }

    pub fn open_create(&mut self) -> &mut ProductForm {
        self.open(ProductForm::create())
    }

    /// Open the form on a copy of a mirrored product. Returns None, leaving the
    /// modal as it was, when no product has that id.
    pub fn open_edit(&mut self, id: ProductId) -> Option<&mut ProductForm> {
        let Some(product) = self.get(id) else {
            warn!(%id, "Cannot edit unknown product");
            return None;
        };
        let form = ProductForm::edit(product);
        Some(self.open(form))
    }

    fn open(&mut self, form: ProductForm) -> &mut ProductForm {
        if self.form.is_some() {
            debug!("Form already open, replacing edit target");
        }
        self.form.insert(form)
    }

    pub fn form_mut(&mut self) -> Option<&mut ProductForm> {
        self.form.as_mut()
    }

    /// Discard the open form, if any.
    pub fn close(&mut self) {
        self.form = None;
    }

    /// Submit the open form and close it, whatever the store says.
    pub async fn submit(&mut self) -> CmdResult {
        let Some(form) = self.form.take() else {
            return CmdResult::default().with_message(CmdMessage::warning("No product form is open"));
        };
        self.handle(form.submit()).await
    }

    /// Route a form event to the store and reconcile the mirror.
    pub async fn handle(&mut self, event: FormEvent) -> CmdResult {
        match event {
            FormEvent::Created(product) => self.add(product).await,
            FormEvent::Edited { id, product } => self.edit(id, product).await,
        }
    }

    async fn add(&mut self, product: Product) -> CmdResult {
        let Some(store) = &self.store else {
            return unavailable();
        };

        let mut result = CmdResult::default();
        match store.create(&product).await {
            Ok(id) => {
                let saved = product.with_id(id);
                result.add_message(CmdMessage::success(format!(
                    "Product added (#{}): {}",
                    id, saved.name
                )));
                self.products.push(saved.clone());
                result.affected_products.push(saved);
            }
            Err(e) => {
                error!(error = %e, name = %product.name, "Error adding product");
                result.add_message(CmdMessage::error(e.to_string()));
            }
        }
        result
    }

    async fn edit(&mut self, id: ProductId, product: Product) -> CmdResult {
        let Some(store) = &self.store else {
            return unavailable();
        };

        let mut result = CmdResult::default();
        match store.update(id, &ProductPatch::from(product)).await {
            Ok(updated) => {
                result.add_message(CmdMessage::success(format!(
                    "Product updated (#{}): {}",
                    id, updated.name
                )));
                match self.products.iter().position(|p| p.id == Some(id)) {
                    Some(pos) => self.products[pos] = updated.clone(),
                    None => {
                        warn!(%id, "Updated product was not mirrored, appending");
                        self.products.push(updated.clone());
                    }
                }
                result.affected_products.push(updated);
            }
            Err(StoreError::NotFound(_)) => {
                error!(%id, "Product not found");
                result.add_message(CmdMessage::error(format!("Product not found: #{}", id)));
            }
            Err(e) => {
                error!(%id, error = %e, "Error updating product");
                result.add_message(CmdMessage::error(e.to_string()));
            }
        }
        result
    }

    /// Delete by id. Unknown ids succeed without changes.
    pub async fn delete(&mut self, id: ProductId) -> CmdResult {
        let Some(store) = &self.store else {
            return unavailable();
        };

        let mut result = CmdResult::default();
        if let Err(e) = store.delete(id).await {
            error!(%id, error = %e, "Error deleting product");
            result.add_message(CmdMessage::error(e.to_string()));
            return result;
        }

        match self.products.iter().position(|p| p.id == Some(id)) {
            Some(pos) => {
                let removed = self.products.remove(pos);
                result.add_message(CmdMessage::success(format!(
                    "Product deleted (#{}): {}",
                    id, removed.name
                )));
                result.affected_products.push(removed);
            }
            None => {
                result.add_message(CmdMessage::info(format!("No product #{}, nothing to delete", id)));
            }
        }
        result
    }
}

fn unavailable() -> CmdResult {
    error!("Product store is not open");
    CmdResult::default().with_message(CmdMessage::error(
        "Product store is not available; nothing was saved",
    ))
}
