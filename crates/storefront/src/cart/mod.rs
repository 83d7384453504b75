//! Cart store.
//!
//! [`CartStore`] is the single source of truth for the shopper's cart. It is
//! constructed once per [`AppState`](crate::state::AppState) and shared by
//! cloning the handle. State lives in a `tokio::sync::watch` channel, so any
//! surface can [`subscribe`](CartStore::subscribe) and observe every change.
//!
//! # Persistence
//!
//! Every change to the lines or the checkout URL is written to local storage
//! under [`CART_STORAGE_KEY`] before the mutating call returns. Write
//! failures are logged and otherwise ignored; the in-memory state stays
//! authoritative.
//!
//! # Checkout
//!
//! [`CartStore::create_checkout`] hands the lines to a [`CheckoutGateway`]
//! and stores the returned hosted checkout URL. At most one checkout request
//! is in flight per store; the result is discarded if the lines changed
//! while the request was running.

mod line;

pub use line::resolve_line;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use raiz_core::{Cart, CartLine, Price, VariantId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;

use crate::error::add_breadcrumb;
use crate::shopify::{Checkout, CheckoutLineInput, ShopifyError};
use crate::storage::{KeyValueStore, StorageError, load_json, save_json};

/// Storage key of the persisted cart snapshot.
pub const CART_STORAGE_KEY: &str = "shopify-cart";

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Checkout requested for a cart with no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The platform failed to create a checkout session.
    #[error("checkout failed: {0}")]
    Checkout(#[from] ShopifyError),

    /// The lines changed while the checkout session was being created.
    #[error("cart changed while the checkout was being created")]
    CartChanged,

    /// The chosen variant cannot be bought right now.
    #[error("variant {0} is not available for sale")]
    VariantUnavailable(VariantId),

    /// A line was requested with a quantity of zero.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// Result of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// A session was created and its URL stored on the cart.
    Created(Checkout),
    /// Another checkout request for this cart is still running; nothing was
    /// sent to the platform.
    AlreadyInFlight,
}

/// Creates hosted checkout sessions on the commerce platform.
pub trait CheckoutGateway: Send + Sync {
    /// Open a checkout session for the given lines.
    fn create_checkout(
        &self,
        lines: &[CheckoutLineInput],
    ) -> impl Future<Output = Result<Checkout, ShopifyError>> + Send;
}

/// Observable cart state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    /// Line items.
    pub cart: Cart,
    /// Whether the cart drawer is shown. Not persisted.
    pub is_open: bool,
    /// Whether a checkout request is in flight. Not persisted.
    pub is_loading: bool,
    /// Hosted checkout URL matching the current lines, once created.
    pub checkout_url: Option<String>,
    /// Incremented on every line change.
    pub revision: u64,
}

impl CartState {
    /// Line items in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Sum of snapshot price times quantity.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price()
    }
}

/// On-disk cart snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCart {
    #[serde(default)]
    lines: Vec<CartLine>,
    #[serde(default)]
    checkout_url: Option<String>,
    saved_at: Option<DateTime<Utc>>,
}

// =============================================================================
// CartStore
// =============================================================================

/// Shared handle to the cart.
///
/// Cloning is cheap; all clones observe and mutate the same cart.
pub struct CartStore<G> {
    inner: Arc<CartStoreInner<G>>,
}

impl<G> Clone for CartStore<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CartStoreInner<G> {
    state: watch::Sender<CartState>,
    storage: Arc<dyn KeyValueStore>,
    gateway: G,
    checkout_in_flight: AtomicBool,
}

impl<G: CheckoutGateway> CartStore<G> {
    /// Build a store from whatever snapshot `storage` holds.
    ///
    /// Stored lines are replayed through [`Cart::add_line`], so duplicate
    /// variants are merged and zero quantities dropped. An unreadable
    /// snapshot is logged and the cart starts empty.
    pub fn restore(storage: Arc<dyn KeyValueStore>, gateway: G) -> Self {
        let initial = match load_json::<PersistedCart>(storage.as_ref(), CART_STORAGE_KEY) {
            Ok(Some(saved)) => {
                let cart = Cart::from_lines(saved.lines);
                tracing::debug!(
                    lines = cart.lines().len(),
                    saved_at = ?saved.saved_at,
                    "Restored cart"
                );
                let checkout_url = saved.checkout_url.filter(|_| !cart.is_empty());
                CartState {
                    cart,
                    checkout_url,
                    ..CartState::default()
                }
            }
            Ok(None) => CartState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cart snapshot");
                CartState::default()
            }
        };

        let (state, _) = watch::channel(initial);
        Self {
            inner: Arc::new(CartStoreInner {
                state,
                storage,
                gateway,
                checkout_in_flight: AtomicBool::new(false),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Observe every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.inner.state.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.inner.state.borrow().clone()
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.inner.state.borrow().lines().to_vec()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.inner.state.borrow().total_items()
    }

    /// Sum of snapshot price times quantity.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.inner.state.borrow().total_price()
    }

    /// Checkout URL for the current lines, if one was created.
    #[must_use]
    pub fn checkout_url(&self) -> Option<String> {
        self.inner.state.borrow().checkout_url.clone()
    }

    /// Whether a checkout request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    /// Whether the cart drawer is shown.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.state.borrow().is_open
    }

    // =========================================================================
    // Line mutations
    // =========================================================================

    /// Add a line, merging with an existing line for the same variant.
    #[instrument(skip(self, line), fields(variant_id = %line.variant_id, quantity = line.quantity))]
    pub fn add_item(&self, line: CartLine) {
        let variant_id = line.variant_id.clone();
        if self.mutate_lines(|cart| cart.add_line(line)) {
            add_breadcrumb("cart", "Added item", Some(&[("variant_id", variant_id.as_str())]));
        }
    }

    /// Set a line's quantity; zero or less removes the line.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub fn update_quantity(&self, variant_id: &VariantId, quantity: i64) {
        if self.mutate_lines(|cart| cart.update_quantity(variant_id, quantity)) {
            let quantity = quantity.to_string();
            add_breadcrumb(
                "cart",
                "Updated quantity",
                Some(&[("variant_id", variant_id.as_str()), ("quantity", quantity.as_str())]),
            );
        }
    }

    /// Remove a line if present.
    #[instrument(skip(self), fields(variant_id = %variant_id))]
    pub fn remove_item(&self, variant_id: &VariantId) {
        if self.mutate_lines(|cart| cart.remove_line(variant_id)) {
            add_breadcrumb("cart", "Removed item", Some(&[("variant_id", variant_id.as_str())]));
        }
    }

    /// Remove every line and forget the checkout URL.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let changed = self.inner.state.send_if_modified(|state| {
            let changed = state.cart.clear() || state.checkout_url.is_some();
            if changed {
                state.revision += 1;
                state.checkout_url = None;
                self.persist(state);
            }
            changed
        });
        if changed {
            add_breadcrumb("cart", "Cleared cart", None);
        }
    }

    /// Apply a line change; on change bump the revision, drop the stale
    /// checkout URL and persist.
    fn mutate_lines(&self, f: impl FnOnce(&mut Cart) -> bool) -> bool {
        self.inner.state.send_if_modified(|state| {
            let changed = f(&mut state.cart);
            if changed {
                state.revision += 1;
                state.checkout_url = None;
                // Written under the channel lock so snapshots land in mutation order
                self.persist(state);
            }
            changed
        })
    }

    fn persist(&self, state: &CartState) {
        let snapshot = PersistedCart {
            lines: state.cart.lines().to_vec(),
            checkout_url: state.checkout_url.clone(),
            saved_at: Some(Utc::now()),
        };
        if let Err(e) = save_json(self.inner.storage.as_ref(), CART_STORAGE_KEY, &snapshot) {
            log_storage_failure(&e);
        }
    }

    // =========================================================================
    // UI flags
    // =========================================================================

    /// Show or hide the cart drawer.
    pub fn set_open(&self, open: bool) {
        self.inner.state.send_if_modified(|state| {
            let changed = state.is_open != open;
            state.is_open = open;
            changed
        });
    }

    /// Flip the cart drawer visibility.
    pub fn toggle_open(&self) {
        self.inner.state.send_modify(|state| state.is_open = !state.is_open);
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Create a hosted checkout session for the current lines.
    ///
    /// While the request runs [`is_loading`](Self::is_loading) is true. A
    /// call made while another is running returns
    /// [`CheckoutOutcome::AlreadyInFlight`] without contacting the platform.
    /// Dropping the returned future releases the in-flight slot.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyCart`] if there are no lines
    /// - [`CartError::Checkout`] if the platform request fails; lines are
    ///   unchanged and the call can be retried
    /// - [`CartError::CartChanged`] if the lines changed before the session
    ///   came back; the session is discarded
    #[instrument(skip(self))]
    pub async fn create_checkout(&self) -> Result<CheckoutOutcome, CartError> {
        let Some(_guard) = InFlightGuard::acquire(&self.inner) else {
            tracing::debug!("Checkout already in flight");
            return Ok(CheckoutOutcome::AlreadyInFlight);
        };

        let (inputs, revision) = {
            let state = self.inner.state.borrow();
            if state.cart.is_empty() {
                return Err(CartError::EmptyCart);
            }
            let inputs: Vec<CheckoutLineInput> = state
                .lines()
                .iter()
                .map(|line| CheckoutLineInput {
                    variant_id: line.variant_id.clone(),
                    quantity: line.quantity,
                })
                .collect();
            (inputs, state.revision)
        };

        self.inner.state.send_modify(|state| state.is_loading = true);
        add_breadcrumb("checkout", "Creating checkout", None);

        let checkout = match self.inner.gateway.create_checkout(&inputs).await {
            Ok(checkout) => checkout,
            Err(e) => {
                tracing::warn!(error = %e, "Checkout creation failed");
                return Err(CartError::Checkout(e));
            }
        };

        let applied = self.inner.state.send_if_modified(|state| {
            if state.revision != revision {
                return false;
            }
            state.checkout_url = Some(checkout.checkout_url.clone());
            state.is_loading = false;
            self.persist(state);
            true
        });

        if !applied {
            tracing::info!("Cart changed during checkout, discarding session");
            return Err(CartError::CartChanged);
        }

        tracing::info!(checkout_id = %checkout.id, "Checkout created");
        Ok(CheckoutOutcome::Created(checkout))
    }
}

fn log_storage_failure(error: &StorageError) {
    tracing::warn!(error = %error, key = CART_STORAGE_KEY, "Failed to persist cart");
}

/// Holds the store's single checkout slot; releasing it clears the loading
/// flag.
struct InFlightGuard<'a, G> {
    inner: &'a CartStoreInner<G>,
}

impl<'a, G> InFlightGuard<'a, G> {
    fn acquire(inner: &'a CartStoreInner<G>) -> Option<Self> {
        inner
            .checkout_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { inner })
    }
}

impl<G> Drop for InFlightGuard<'_, G> {
    fn drop(&mut self) {
        self.inner.state.send_if_modified(|state| {
            let was_loading = state.is_loading;
            state.is_loading = false;
            was_loading
        });
        self.inner.checkout_in_flight.store(false, Ordering::Release);
    }
}
