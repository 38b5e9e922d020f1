//! # Shopper
//!
//! A concurrent actor that pulls the items on its shopping list out of the
//! store's stock into a private cart, then asks for a place in a checkout
//! line.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shopper Phases                                  │
//! │                                                                         │
//! │  NotStarted ──start_shopper──┬── Admitted ─────────────┐                │
//! │                              │                         ▼                │
//! │                              ├── Waiting ──▶ WaitingToEnter ──released──▶ Shopping
//! │                              │                   │                      │
//! │                              │                turned away               │
//! │                              ▼                   ▼                      │
//! │                         RejectedEntry ◀──────────┘                      │
//! │                              │                                          │
//! │                              └──visit ends──▶ Done (entry_refused)      │
//! │                                                                         │
//! │  Shopping ──▶ AwaitingCheckout ──register serves──▶ Done (receipt)      │
//! │                      │                                                  │
//! │                      └──checkout refused──▶ restock cart ──▶ Done       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking
//! The shopper's own state lock is never held while calling into the store
//! or the ledger. Registers lock the shopper's state while settling a
//! checkout, so holding it across a store call could deadlock against a
//! service pass.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use grocer_core::{fold_by_name, Cart, Item, Receipt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::lock;
use crate::store::{Admission, Store};

static NEXT_SHOPPER_ID: AtomicU64 = AtomicU64::new(0);

// =============================================================================
// Shopper Id & Phase
// =============================================================================

/// Stable shopper identity, assigned once and monotonically at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShopperId(u64);

impl ShopperId {
    fn next() -> Self {
        ShopperId(NEXT_SHOPPER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShopperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shopper-{}", self.0)
    }
}

/// Where a shopper is in its visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopperPhase {
    NotStarted,
    /// Parked in the store's waiting room, thread suspended.
    WaitingToEnter,
    Shopping,
    /// Handed to a register, receipt not issued yet.
    AwaitingCheckout,
    /// Refused entry (or turned away from the waiting room); about to leave.
    RejectedEntry,
    /// Visit over, with or without a receipt. Terminal.
    Done,
}

impl ShopperPhase {
    pub fn is_finished(&self) -> bool {
        matches!(self, ShopperPhase::Done)
    }
}

impl fmt::Display for ShopperPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShopperPhase::NotStarted => write!(f, "not_started"),
            ShopperPhase::WaitingToEnter => write!(f, "waiting_to_enter"),
            ShopperPhase::Shopping => write!(f, "shopping"),
            ShopperPhase::AwaitingCheckout => write!(f, "awaiting_checkout"),
            ShopperPhase::RejectedEntry => write!(f, "rejected_entry"),
            ShopperPhase::Done => write!(f, "done"),
        }
    }
}

/// Entry gate a waiting shopper blocks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Pending,
    Admitted,
    TurnedAway,
}

#[derive(Debug)]
struct ShopperState {
    /// Remaining desire per item name.
    shopping_list: BTreeMap<String, Item>,
    cart: Cart,
    receipt: Option<Receipt>,
    phase: ShopperPhase,
    /// The last visit never got past the door.
    entry_refused: bool,
}

// =============================================================================
// Shopper
// =============================================================================

/// A shopper. Always handled as `Arc<Shopper>` once it starts shopping,
/// since the store and a register may hold it at the same time.
pub struct Shopper {
    id: ShopperId,
    /// Willing to sit in the waiting room while the store is closed.
    waits: bool,
    store: Option<Arc<Store>>,
    state: Mutex<ShopperState>,
    /// Cleared by the store during shutdown; polled before every take.
    may_continue: AtomicBool,
    gate: Mutex<Gate>,
    gate_signal: Condvar,
}

impl Shopper {
    /// A shopper that gives up if the store is closed.
    pub fn new(store: Arc<Store>, items: impl IntoIterator<Item = Item>) -> Self {
        Self::build(Some(store), items, false)
    }

    /// A shopper that waits in line for the store to open.
    pub fn waiting(store: Arc<Store>, items: impl IntoIterator<Item = Item>) -> Self {
        Self::build(Some(store), items, true)
    }

    /// A shopper with no store. `shop` does nothing.
    pub fn detached(items: impl IntoIterator<Item = Item>) -> Self {
        Self::build(None, items, false)
    }

    fn build(store: Option<Arc<Store>>, items: impl IntoIterator<Item = Item>, waits: bool) -> Self {
        Shopper {
            id: ShopperId::next(),
            waits,
            store,
            state: Mutex::new(ShopperState {
                shopping_list: fold_by_name(items),
                cart: Cart::new(),
                receipt: None,
                phase: ShopperPhase::NotStarted,
                entry_refused: false,
            }),
            may_continue: AtomicBool::new(true),
            gate: Mutex::new(Gate::Pending),
            gate_signal: Condvar::new(),
        }
    }

    pub fn id(&self) -> ShopperId {
        self.id
    }

    pub fn waits(&self) -> bool {
        self.waits
    }

    // =========================================================================
    // The Visit
    // =========================================================================

    /// Runs the whole visit on the calling thread: enter, take items, check
    /// out. Blocks while the shopper sits in the waiting room.
    pub fn shop(self: &Arc<Self>) {
        let Some(store) = self.store.clone() else {
            debug!(shopper = %self.id, "No store attached, nothing to do");
            return;
        };

        if !self.do_shopping(&store) {
            self.set_phase(ShopperPhase::Done);
            return;
        }
        self.check_out(&store);
    }

    /// Enters the store and fills the cart. Returns `false` if the shopper
    /// never got in.
    fn do_shopping(self: &Arc<Self>, store: &Store) -> bool {
        *lock::lock(&self.gate) = Gate::Pending;
        self.may_continue.store(true, Ordering::SeqCst);
        lock::lock(&self.state).entry_refused = false;

        match store.start_shopper(self) {
            Admission::Admitted => {}
            Admission::Waiting => {
                self.set_phase(ShopperPhase::WaitingToEnter);
                if !self.wait_for_entry() {
                    debug!(shopper = %self.id, "Turned away while waiting");
                    self.refuse_entry();
                    return false;
                }
            }
            Admission::Rejected => {
                debug!(shopper = %self.id, "Entry refused");
                self.refuse_entry();
                return false;
            }
        }
        self.set_phase(ShopperPhase::Shopping);

        let wanted: Vec<(String, i64)> = lock::lock(&self.state)
            .shopping_list
            .values()
            .filter(|item| item.quantity() > 0)
            .map(|item| (item.name().to_string(), item.quantity()))
            .collect();

        for (name, quantity) in wanted {
            if !self.may_continue.load(Ordering::SeqCst) {
                info!(shopper = %self.id, "Stopped mid-list");
                break;
            }

            let granted = match store.take_item(&name, quantity) {
                Ok(Some(granted)) => granted,
                // absent items stay on the list; errors are logged by the ledger
                Ok(None) | Err(_) => continue,
            };
            if granted.quantity() <= 0 {
                continue;
            }

            let mut state = lock::lock(&self.state);
            if let Some(entry) = state.shopping_list.get_mut(&name) {
                match Item::try_merge(entry, &granted.negated()) {
                    Ok(remaining) => *entry = remaining,
                    Err(err) => {
                        error!(shopper = %self.id, error = %err, "Could not reduce shopping list")
                    }
                }
            }
            state.cart.add(granted);
        }
        true
    }

    fn check_out(self: &Arc<Self>, store: &Store) {
        self.set_phase(ShopperPhase::AwaitingCheckout);
        if store.start_shopper_checkout(self) {
            return;
        }

        let items = lock::lock(&self.state).cart.items();
        warn!(shopper = %self.id, entries = items.len(), "Checkout refused, restocking cart");
        for item in &items {
            if let Err(err) = store.add_item(item.clone()) {
                warn!(shopper = %self.id, item = %item.name(), error = %err, "Restock failed");
            }
        }

        let mut state = lock::lock(&self.state);
        for item in items {
            let restored = match state.shopping_list.get(item.name()) {
                Some(entry) => match Item::try_merge(entry, &item) {
                    Ok(restored) => restored,
                    Err(err) => {
                        error!(shopper = %self.id, error = %err, "Could not restore shopping list");
                        continue;
                    }
                },
                None => item,
            };
            state
                .shopping_list
                .insert(restored.name().to_string(), restored);
        }
        state.cart.clear();
        state.phase = ShopperPhase::Done;
    }

    /// Asks the shopper to stop taking items. Cooperative: it is seen before
    /// the next take, never in the middle of one.
    pub fn stop_shopping(&self) {
        self.may_continue.store(false, Ordering::SeqCst);
    }

    /// Whether the shopper will attempt its next take.
    pub fn may_continue(&self) -> bool {
        self.may_continue.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Entry Gate
    // =========================================================================

    /// Lets the shopper in. Wakes it if it is waiting.
    pub(crate) fn allow_shop(&self) {
        self.open_gate(Gate::Admitted);
    }

    /// Sends a waiting shopper home.
    pub(crate) fn turn_away(&self) {
        self.open_gate(Gate::TurnedAway);
    }

    fn open_gate(&self, outcome: Gate) {
        *lock::lock(&self.gate) = outcome;
        self.gate_signal.notify_all();
    }

    /// Blocks until the store admits or turns away this shopper.
    fn wait_for_entry(&self) -> bool {
        debug!(shopper = %self.id, "Waiting for the store to open");
        let mut gate = lock::lock(&self.gate);
        while *gate == Gate::Pending {
            gate = self
                .gate_signal
                .wait(gate)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
        *gate == Gate::Admitted
    }

    // =========================================================================
    // Checkout Hooks (used by Register)
    // =========================================================================

    /// Clears the cart, attaches the receipt, and ends the visit.
    pub(crate) fn settle(&self, receipt: Receipt) {
        let mut state = lock::lock(&self.state);
        state.cart.clear();
        state.receipt = Some(receipt);
        state.phase = ShopperPhase::Done;
    }

    #[cfg(test)]
    pub(crate) fn put_in_cart(&self, item: Item) {
        lock::lock(&self.state).cart.add(item);
    }

    fn set_phase(&self, phase: ShopperPhase) {
        lock::lock(&self.state).phase = phase;
    }

    fn refuse_entry(&self) {
        let mut state = lock::lock(&self.state);
        state.entry_refused = true;
        state.phase = ShopperPhase::RejectedEntry;
    }

    // =========================================================================
    // Accessors
    // =========================================================================
    //
    // Meant for when the shopper is idle. Mid-visit they return a consistent
    // copy of one instant, which may be stale immediately.

    /// Remaining desire, sorted by item name.
    pub fn shopping_list(&self) -> Vec<Item> {
        lock::lock(&self.state).shopping_list.values().cloned().collect()
    }

    /// Cart contents in the order they were taken.
    pub fn cart(&self) -> Vec<Item> {
        lock::lock(&self.state).cart.items()
    }

    pub fn receipt(&self) -> Option<Receipt> {
        lock::lock(&self.state).receipt.clone()
    }

    pub fn phase(&self) -> ShopperPhase {
        lock::lock(&self.state).phase
    }

    /// Whether the last visit ended at the door: refused outright, or
    /// turned away from the waiting room.
    pub fn entry_refused(&self) -> bool {
        lock::lock(&self.state).entry_refused
    }
}

impl fmt::Debug for Shopper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the store holds shoppers, so printing it here would recurse
        f.debug_struct("Shopper")
            .field("id", &self.id)
            .field("waits", &self.waits)
            .field("has_store", &self.store.is_some())
            .field("phase", &self.state.try_lock().ok().map(|state| state.phase))
            .finish()
    }
}

impl PartialEq for Shopper {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shopper {}

impl std::hash::Hash for Shopper {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreSettings;
    use crate::register::Register;
    use grocer_core::Money;
    use std::thread;
    use std::time::Duration;

    fn milk(qty: i64) -> Item {
        Item::new("Milk", Money::from_cents(299), qty, "Gallon")
    }

    fn open_store() -> Arc<Store> {
        let store = Arc::new(Store::new(StoreSettings {
            grace_period_ms: 10,
            ..StoreSettings::default()
        }));
        store.open();
        store
    }

    #[test]
    fn test_shopping_list_folds_repeats() {
        let shopper = Shopper::detached(vec![milk(1), milk(2)]);
        assert_eq!(shopper.shopping_list(), vec![milk(3)]);
        assert_eq!(shopper.phase(), ShopperPhase::NotStarted);
    }

    #[test]
    fn test_detached_shop_is_noop() {
        let shopper = Arc::new(Shopper::detached(vec![milk(1)]));
        shopper.shop();
        assert_eq!(shopper.phase(), ShopperPhase::NotStarted);
        assert_eq!(shopper.shopping_list(), vec![milk(1)]);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Shopper::detached(Vec::new());
        let b = Shopper::detached(Vec::new());
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejected_when_closed_and_not_waiting() {
        let store = Arc::new(Store::default());
        store.add_item(milk(3)).unwrap();

        let shopper = Arc::new(Shopper::new(store.clone(), vec![milk(1)]));
        shopper.shop();

        assert_eq!(shopper.phase(), ShopperPhase::Done);
        assert!(shopper.entry_refused());
        assert!(shopper.receipt().is_none());
        assert_eq!(shopper.shopping_list(), vec![milk(1)]);
        assert_eq!(store.query_item("Milk"), Some(milk(3)));
    }

    #[test]
    fn test_full_visit_with_register() {
        let store = open_store();
        store.add_item(milk(3)).unwrap();
        store.add_register(Arc::new(Register::new()));

        let shopper = Arc::new(Shopper::new(store.clone(), vec![milk(2)]));
        shopper.shop();
        assert_eq!(shopper.phase(), ShopperPhase::AwaitingCheckout);
        assert_eq!(shopper.shopping_list(), vec![milk(0)]);

        store.service_tick();
        assert_eq!(shopper.phase(), ShopperPhase::Done);
        assert!(!shopper.entry_refused());
        assert!(shopper.cart().is_empty());
        assert_eq!(shopper.receipt().unwrap().line_count(), 1);
        assert_eq!(store.query_item("Milk"), Some(milk(1)));
    }

    #[test]
    fn test_refused_checkout_restocks_and_restores_list() {
        let store = open_store();
        store.add_item(milk(3)).unwrap();

        let shopper = Arc::new(Shopper::new(store.clone(), vec![milk(2)]));
        shopper.shop();

        assert_eq!(shopper.phase(), ShopperPhase::Done);
        assert!(shopper.receipt().is_none());
        assert!(shopper.cart().is_empty());
        assert_eq!(shopper.shopping_list(), vec![milk(2)]);
        assert_eq!(store.query_item("Milk"), Some(milk(3)));
    }

    #[test]
    fn test_refused_checkout_restores_huge_list_exactly() {
        let store = open_store();
        store.add_item(milk(3)).unwrap();

        let shopper = Arc::new(Shopper::new(store.clone(), vec![milk(i64::MAX)]));
        shopper.shop();

        assert_eq!(shopper.shopping_list(), vec![milk(i64::MAX)]);
        assert_eq!(store.query_item("Milk"), Some(milk(3)));
    }

    #[test]
    fn test_only_done_is_finished() {
        assert!(ShopperPhase::Done.is_finished());
        assert!(!ShopperPhase::RejectedEntry.is_finished());
        assert!(!ShopperPhase::AwaitingCheckout.is_finished());
    }

    #[test]
    fn test_stop_shopping_clears_flag() {
        let store = open_store();
        store.add_item(milk(3)).unwrap();

        let shopper = Arc::new(Shopper::new(store.clone(), vec![milk(1)]));
        // admission resets the flag, so stop from the store side once inside
        assert_eq!(store.start_shopper(&shopper), Admission::Admitted);
        shopper.stop_shopping();
        assert!(!shopper.may_continue());
    }

    #[test]
    fn test_waiting_shopper_blocks_until_released() {
        let store = Arc::new(Store::new(StoreSettings {
            grace_period_ms: 10,
            ..StoreSettings::default()
        }));
        store.add_item(milk(3)).unwrap();
        store.add_register(Arc::new(Register::new()));

        let shopper = Arc::new(Shopper::waiting(store.clone(), vec![milk(1)]));
        let handle = {
            let shopper = shopper.clone();
            thread::spawn(move || shopper.shop())
        };

        while shopper.phase() != ShopperPhase::WaitingToEnter {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(store.query_item("Milk"), Some(milk(3)));

        store.open();
        let report = store.service_tick();
        assert_eq!(report.released, 1);
        handle.join().unwrap();

        assert_eq!(shopper.phase(), ShopperPhase::AwaitingCheckout);
        assert_eq!(shopper.cart(), vec![milk(1)]);
        store.service_tick();
        assert!(shopper.receipt().is_some());
        assert_eq!(store.query_item("Milk"), Some(milk(2)));
    }
}
