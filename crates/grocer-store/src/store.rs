//! # Store Orchestrator
//!
//! Owns the inventory ledger and the register pool, decides who may enter,
//! hands shoppers to registers, and runs the phased shutdown.
//!
//! ## Store Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               Store                                     │
//! │                                                                         │
//! │  phase: AtomicU8 ── Closed │ Open │ Closing │ DrainingShoppers │ ...    │
//! │                                                                         │
//! │  ┌────────────────┐   ┌─────────────────┐   ┌────────────────────────┐ │
//! │  │  Waiting room  │   │  Mid-shop set   │   │  Register pool         │ │
//! │  │  Mutex<Deque>  │──▶│  Mutex<HashMap> │──▶│  RwLock<BTreeMap>      │ │
//! │  │  (closed, will │   │  (admitted,     │   │  first register gets   │ │
//! │  │   wait)        │   │   taking items) │   │  every checkout        │ │
//! │  └────────────────┘   └────────┬────────┘   └────────────────────────┘ │
//! │                                │                                        │
//! │                                ▼                                        │
//! │                    ┌─────────────────────┐                              │
//! │                    │  InventoryLedger    │                              │
//! │                    └─────────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shutdown Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Closing            no new entrants                                 │
//! │  2. DrainingShoppers   stop every mid-shop shopper, sleep grace period │
//! │                        turn away the waiting room                      │
//! │  3. DrainingRegisters  checkout + register admission off               │
//! │                        WRITE lock: remove and drain every register     │
//! │  4. Closed             waiting room stays shut until the next open()   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A shopper still taking items when the grace period ends will find
//! checkout refused and restock its own cart. That is accepted: the grace
//! period is a heuristic, not a guarantee.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use grocer_core::Item;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::StoreSettings;
use crate::error::StoreResult;
use crate::ledger::InventoryLedger;
use crate::lock;
use crate::register::{Register, RegisterId};
use crate::shopper::{Shopper, ShopperId};

// =============================================================================
// Phase
// =============================================================================

/// Lifecycle phase of the store. Moves forward only, one owner at a time:
/// `Closed → Open → Closing → DrainingShoppers → DrainingRegisters → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StorePhase {
    Closed = 0,
    Open = 1,
    Closing = 2,
    DrainingShoppers = 3,
    DrainingRegisters = 4,
}

impl StorePhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => StorePhase::Open,
            2 => StorePhase::Closing,
            3 => StorePhase::DrainingShoppers,
            4 => StorePhase::DrainingRegisters,
            _ => StorePhase::Closed,
        }
    }

    /// New shoppers are admitted straight in.
    pub fn is_open(&self) -> bool {
        matches!(self, StorePhase::Open)
    }

    /// Open, or somewhere in the shutdown sequence.
    pub fn is_running(&self) -> bool {
        !matches!(self, StorePhase::Closed)
    }

    /// Shoppers may still join a register line.
    pub fn checkout_allowed(&self) -> bool {
        !matches!(self, StorePhase::DrainingRegisters)
    }

    /// Registers may still join the pool.
    pub fn register_admission_allowed(&self) -> bool {
        !matches!(self, StorePhase::DrainingRegisters)
    }
}

impl fmt::Display for StorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorePhase::Closed => write!(f, "closed"),
            StorePhase::Open => write!(f, "open"),
            StorePhase::Closing => write!(f, "closing"),
            StorePhase::DrainingShoppers => write!(f, "draining_shoppers"),
            StorePhase::DrainingRegisters => write!(f, "draining_registers"),
        }
    }
}

/// Answer to a shopper asking to come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Admission {
    /// In the store and cleared to shop.
    Admitted,
    /// Parked in the waiting room until the store opens.
    Waiting,
    /// Not coming in.
    Rejected,
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome of one service pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Shoppers let in from the waiting room.
    pub released: usize,
    /// Shoppers served, at most one per register.
    pub checked_out: usize,
}

/// Outcome of a shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownReport {
    /// Mid-shop shoppers told to stop taking items.
    pub stopped_shoppers: usize,
    /// Waiting-room shoppers sent home.
    pub turned_away: usize,
    pub registers_drained: usize,
    /// Shoppers served while draining the register lines.
    pub receipts_issued: usize,
}

/// Outcome of [`Store::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub tick: TickReport,
    pub shutdown: ShutdownReport,
}

// =============================================================================
// Store
// =============================================================================

/// The store orchestrator. Share it as `Arc<Store>`.
#[derive(Debug)]
pub struct Store {
    name: String,
    phase: AtomicU8,
    /// Set for the whole shutdown and after it; cleared by `open`. A closed
    /// store that has shut down has nobody left to release a waiting room.
    shut_down: AtomicBool,
    ledger: InventoryLedger,
    registers: RwLock<BTreeMap<RegisterId, Arc<Register>>>,
    waiting_room: Mutex<VecDeque<Arc<Shopper>>>,
    /// `None` means unbounded.
    waiting_room_capacity: Option<usize>,
    mid_shop: Mutex<HashMap<ShopperId, Arc<Shopper>>>,
    /// Line limit for registers created by [`Store::open_register`].
    register_line_limit: usize,
    grace_period: Duration,
}

impl Store {
    /// Creates a closed store with empty shelves and no registers.
    pub fn new(settings: StoreSettings) -> Self {
        Store {
            name: settings.name.clone(),
            phase: AtomicU8::new(StorePhase::Closed as u8),
            shut_down: AtomicBool::new(false),
            ledger: InventoryLedger::new(),
            registers: RwLock::new(BTreeMap::new()),
            waiting_room: Mutex::new(VecDeque::new()),
            waiting_room_capacity: (settings.waiting_room_capacity > 0)
                .then_some(settings.waiting_room_capacity),
            mid_shop: Mutex::new(HashMap::new()),
            register_line_limit: settings.register_line_limit,
            grace_period: settings.grace_period(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // =========================================================================
    // Phase
    // =========================================================================

    pub fn phase(&self) -> StorePhase {
        StorePhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    fn set_phase(&self, phase: StorePhase) {
        let previous = StorePhase::from_u8(self.phase.swap(phase as u8, Ordering::SeqCst));
        info!(store = %self.name, from = %previous, to = %phase, "Store phase changed");
    }

    pub fn is_open(&self) -> bool {
        self.phase().is_open()
    }

    pub fn is_running(&self) -> bool {
        self.phase().is_running()
    }

    /// A shutdown has started and the store has not been reopened since.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Opens the doors and starts a fresh session.
    ///
    /// Returns `false` (and changes nothing) while a shutdown is in progress.
    pub fn open(&self) -> bool {
        match self.phase() {
            StorePhase::Closed | StorePhase::Open => {
                let mut mid_shop = lock::lock(&self.mid_shop);
                mid_shop.clear();
                self.shut_down.store(false, Ordering::SeqCst);
                self.set_phase(StorePhase::Open);
                drop(mid_shop);
                true
            }
            phase => {
                warn!(store = %self.name, %phase, "Cannot open during shutdown");
                false
            }
        }
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// The ledger. Shoppers never see the stock map itself.
    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn add_item(&self, item: Item) -> StoreResult<Item> {
        self.ledger.add(item)
    }

    pub fn query_item(&self, name: &str) -> Option<Item> {
        self.ledger.query(name)
    }

    pub fn take_item(&self, name: &str, requested: i64) -> StoreResult<Option<Item>> {
        self.ledger.take(name, requested)
    }

    // =========================================================================
    // Register Pool
    // =========================================================================

    /// Adds a register to the pool.
    ///
    /// Returns `false` once the store is draining registers, or if this
    /// register is already in the pool.
    pub fn add_register(&self, register: Arc<Register>) -> bool {
        let mut registers = lock::write(&self.registers);
        if !self.phase().register_admission_allowed() {
            warn!(register = %register.id(), "Register admission closed");
            return false;
        }
        if registers.contains_key(&register.id()) {
            return false;
        }
        info!(register = %register.id(), "Register added");
        registers.insert(register.id(), register);
        true
    }

    /// Creates a register with the configured line limit and adds it.
    pub fn open_register(&self) -> Option<RegisterId> {
        let register = Arc::new(Register::with_line_limit(self.register_line_limit));
        let id = register.id();
        self.add_register(register).then_some(id)
    }

    /// Takes a register out of the pool and serves everyone in its line
    /// before returning it.
    pub fn remove_register(&self, id: RegisterId) -> Option<Arc<Register>> {
        let removed = lock::write(&self.registers).remove(&id)?;
        let served = removed.checkout_all_remaining();
        info!(register = %id, served, "Register removed");
        Some(removed)
    }

    pub fn register_count(&self) -> usize {
        lock::read(&self.registers).len()
    }

    pub fn register_ids(&self) -> Vec<RegisterId> {
        lock::read(&self.registers).keys().copied().collect()
    }

    // =========================================================================
    // Shoppers
    // =========================================================================

    /// Decides whether a shopper may come in.
    ///
    /// ## Rules
    /// - Open → recorded as mid-shop and signalled to proceed
    /// - Closed (never opened, or not yet) and the shopper waits → offered
    ///   to the waiting room (`Waiting`, or `Rejected` if the room is full)
    /// - Otherwise, including during or after a shutdown → `Rejected`
    pub fn start_shopper(&self, shopper: &Arc<Shopper>) -> Admission {
        let mut mid_shop = lock::lock(&self.mid_shop);
        match self.phase() {
            StorePhase::Open => {
                mid_shop.insert(shopper.id(), shopper.clone());
                drop(mid_shop);
                shopper.allow_shop();
                debug!(shopper = %shopper.id(), "Shopper admitted");
                Admission::Admitted
            }
            StorePhase::Closed if shopper.waits() && !self.is_shut_down() => {
                let mut room = lock::lock(&self.waiting_room);
                if self.waiting_room_capacity.is_some_and(|cap| room.len() >= cap) {
                    debug!(shopper = %shopper.id(), "Waiting room full");
                    return Admission::Rejected;
                }
                room.push_back(shopper.clone());
                debug!(shopper = %shopper.id(), waiting = room.len(), "Shopper waiting to enter");
                Admission::Waiting
            }
            _ => Admission::Rejected,
        }
    }

    /// Puts a shopper in line at the first register.
    ///
    /// Returns `false` if there is no register or checkout is closed; the
    /// shopper restocks its own cart in that case. Either way the shopper
    /// leaves the mid-shop set.
    pub fn start_shopper_checkout(&self, shopper: &Arc<Shopper>) -> bool {
        let assigned = {
            let registers = lock::read(&self.registers);
            if !self.phase().checkout_allowed() {
                false
            } else {
                registers
                    .values()
                    .next()
                    .is_some_and(|register| register.enqueue(shopper.clone()))
            }
        };
        lock::lock(&self.mid_shop).remove(&shopper.id());

        if !assigned {
            debug!(shopper = %shopper.id(), phase = %self.phase(), "Checkout refused");
        }
        assigned
    }

    /// Shoppers admitted and not yet at checkout.
    pub fn mid_shop_count(&self) -> usize {
        lock::lock(&self.mid_shop).len()
    }

    pub fn waiting_count(&self) -> usize {
        lock::lock(&self.waiting_room).len()
    }

    // =========================================================================
    // Service & Shutdown
    // =========================================================================

    /// One service pass.
    ///
    /// 1. If open, let everyone in the waiting room in
    /// 2. Under the pool READ lock, serve one shopper per register
    pub fn service_tick(&self) -> TickReport {
        let released = if self.is_open() {
            self.release_waiting_room()
        } else {
            0
        };

        let checked_out = lock::read(&self.registers)
            .values()
            .filter(|register| register.checkout_next().is_some())
            .count();

        if released > 0 || checked_out > 0 {
            debug!(released, checked_out, "Service tick");
        }
        TickReport {
            released,
            checked_out,
        }
    }

    fn release_waiting_room(&self) -> usize {
        let waiting: Vec<Arc<Shopper>> = lock::lock(&self.waiting_room).drain(..).collect();
        for shopper in &waiting {
            lock::lock(&self.mid_shop).insert(shopper.id(), shopper.clone());
            shopper.allow_shop();
        }
        waiting.len()
    }

    /// Shuts the store down in a fixed order and leaves it `Closed`.
    ///
    /// Every shopper that made it into a register line before register
    /// draining starts gets a receipt.
    pub fn shutdown(&self) -> ShutdownReport {
        let mut report = ShutdownReport::default();
        {
            // under the admission lock, so no waiter slips in unseen
            let _mid_shop = lock::lock(&self.mid_shop);
            self.shut_down.store(true, Ordering::SeqCst);
            self.set_phase(StorePhase::Closing);
        }

        let in_flight: Vec<Arc<Shopper>> = lock::lock(&self.mid_shop).values().cloned().collect();
        self.set_phase(StorePhase::DrainingShoppers);
        if !in_flight.is_empty() {
            for shopper in &in_flight {
                shopper.stop_shopping();
            }
            report.stopped_shoppers = in_flight.len();
            info!(
                stopped = in_flight.len(),
                grace_ms = self.grace_period.as_millis() as u64,
                "Waiting for in-flight shoppers"
            );
            thread::sleep(self.grace_period);
        }

        let waiting: Vec<Arc<Shopper>> = lock::lock(&self.waiting_room).drain(..).collect();
        for shopper in &waiting {
            warn!(shopper = %shopper.id(), "Turned away from waiting room");
            shopper.turn_away();
        }
        report.turned_away = waiting.len();

        self.set_phase(StorePhase::DrainingRegisters);
        {
            let mut registers = lock::write(&self.registers);
            for (id, register) in std::mem::take(&mut *registers) {
                let served = register.checkout_all_remaining();
                info!(register = %id, served, "Register removed");
                report.registers_drained += 1;
                report.receipts_issued += served;
            }
        }

        self.set_phase(StorePhase::Closed);
        info!(
            store = %self.name,
            stopped = report.stopped_shoppers,
            turned_away = report.turned_away,
            receipts = report.receipts_issued,
            "Store shut down"
        );
        report
    }

    /// A single service pass followed by a full shutdown.
    pub fn run(&self) -> RunReport {
        let tick = self.service_tick();
        let shutdown = self.shutdown();
        RunReport { tick, shutdown }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreSettings::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_core::Money;

    fn quick_store() -> Store {
        Store::new(StoreSettings {
            grace_period_ms: 5,
            ..StoreSettings::default()
        })
    }

    fn milk(qty: i64) -> Item {
        Item::new("Milk", Money::from_cents(299), qty, "Gallon")
    }

    #[test]
    fn test_phase_predicates() {
        assert!(StorePhase::Open.is_open());
        assert!(!StorePhase::Closing.is_open());

        assert!(!StorePhase::Closed.is_running());
        assert!(StorePhase::DrainingRegisters.is_running());

        assert!(StorePhase::DrainingShoppers.checkout_allowed());
        assert!(!StorePhase::DrainingRegisters.checkout_allowed());
        assert!(!StorePhase::DrainingRegisters.register_admission_allowed());
    }

    #[test]
    fn test_phase_round_trips_through_u8() {
        for phase in [
            StorePhase::Closed,
            StorePhase::Open,
            StorePhase::Closing,
            StorePhase::DrainingShoppers,
            StorePhase::DrainingRegisters,
        ] {
            assert_eq!(StorePhase::from_u8(phase as u8), phase);
        }
    }

    #[test]
    fn test_new_store_is_closed() {
        let store = quick_store();
        assert_eq!(store.phase(), StorePhase::Closed);
        assert!(store.open());
        assert!(store.is_open());
    }

    #[test]
    fn test_admission_rules() {
        let store = Arc::new(quick_store());
        let walk_in = Arc::new(Shopper::new(store.clone(), Vec::new()));
        let patient = Arc::new(Shopper::waiting(store.clone(), Vec::new()));

        assert_eq!(store.start_shopper(&walk_in), Admission::Rejected);
        assert_eq!(store.start_shopper(&patient), Admission::Waiting);
        assert_eq!(store.waiting_count(), 1);

        store.open();
        assert_eq!(store.start_shopper(&walk_in), Admission::Admitted);
        assert_eq!(store.mid_shop_count(), 1);
    }

    #[test]
    fn test_bounded_waiting_room() {
        let store = Arc::new(Store::new(StoreSettings {
            waiting_room_capacity: 1,
            ..StoreSettings::default()
        }));
        let first = Arc::new(Shopper::waiting(store.clone(), Vec::new()));
        let second = Arc::new(Shopper::waiting(store.clone(), Vec::new()));

        assert_eq!(store.start_shopper(&first), Admission::Waiting);
        assert_eq!(store.start_shopper(&second), Admission::Rejected);
    }

    #[test]
    fn test_tick_releases_waiting_room_only_when_open() {
        let store = Arc::new(quick_store());
        let patient = Arc::new(Shopper::waiting(store.clone(), Vec::new()));
        store.start_shopper(&patient);

        assert_eq!(store.service_tick().released, 0);
        store.open();
        assert_eq!(store.service_tick().released, 1);
        assert_eq!(store.waiting_count(), 0);
        assert_eq!(store.mid_shop_count(), 1);
    }

    #[test]
    fn test_checkout_goes_to_first_register() {
        let store = Arc::new(quick_store());
        store.open();
        let first = Arc::new(Register::new());
        let second = Arc::new(Register::new());
        assert!(store.add_register(second.clone()));
        assert!(store.add_register(first.clone()));
        assert!(!store.add_register(first.clone()));

        let shopper = Arc::new(Shopper::new(store.clone(), Vec::new()));
        store.start_shopper(&shopper);
        assert!(store.start_shopper_checkout(&shopper));

        // lowest id wins regardless of insertion order
        let (low, high) = if first.id() < second.id() {
            (first, second)
        } else {
            (second, first)
        };
        assert_eq!(low.waiting_count(), 1);
        assert_eq!(high.waiting_count(), 0);
        assert_eq!(store.mid_shop_count(), 0);
    }

    #[test]
    fn test_checkout_without_registers_is_refused() {
        let store = Arc::new(quick_store());
        store.open();
        let shopper = Arc::new(Shopper::new(store.clone(), Vec::new()));
        store.start_shopper(&shopper);

        assert!(!store.start_shopper_checkout(&shopper));
        assert_eq!(store.mid_shop_count(), 0);
    }

    #[test]
    fn test_remove_register_drains_line() {
        let store = Arc::new(quick_store());
        store.open();
        let id = store.open_register().unwrap();

        let shopper = Arc::new(Shopper::new(store.clone(), Vec::new()));
        store.start_shopper(&shopper);
        assert!(store.start_shopper_checkout(&shopper));

        let removed = store.remove_register(id).unwrap();
        assert_eq!(removed.waiting_count(), 0);
        assert!(shopper.receipt().is_some());
        assert_eq!(store.register_count(), 0);
        assert!(store.remove_register(id).is_none());
    }

    #[test]
    fn test_shutdown_sequence() {
        let store = Arc::new(quick_store());
        store.add_item(milk(3)).unwrap();
        store.open();
        store.open_register();
        store.open_register();

        let queued = Arc::new(Shopper::new(store.clone(), Vec::new()));
        store.start_shopper(&queued);
        store.start_shopper_checkout(&queued);

        let lingering = Arc::new(Shopper::new(store.clone(), Vec::new()));
        store.start_shopper(&lingering);

        let report = store.shutdown();
        assert_eq!(report.stopped_shoppers, 1);
        assert!(!lingering.may_continue());
        assert_eq!(report.registers_drained, 2);
        assert_eq!(report.receipts_issued, 1);
        assert!(queued.receipt().is_some());

        assert_eq!(store.phase(), StorePhase::Closed);
        assert_eq!(store.register_count(), 0);
        assert!(!store.start_shopper_checkout(&lingering));
    }

    #[test]
    fn test_shutdown_turns_away_waiting_room() {
        let store = Arc::new(quick_store());
        let patient = Arc::new(Shopper::waiting(store.clone(), Vec::new()));
        store.start_shopper(&patient);

        let report = store.shutdown();
        assert_eq!(report.turned_away, 1);
        assert_eq!(store.waiting_count(), 0);
    }

    #[test]
    fn test_run_is_tick_then_shutdown() {
        let store = Arc::new(quick_store());
        store.open();
        store.open_register();

        let shopper = Arc::new(Shopper::new(store.clone(), Vec::new()));
        store.start_shopper(&shopper);
        store.start_shopper_checkout(&shopper);

        let report = store.run();
        assert_eq!(report.tick.checked_out, 1);
        assert_eq!(report.shutdown.receipts_issued, 0);
        assert_eq!(store.phase(), StorePhase::Closed);
    }

    #[test]
    fn test_reopen_after_shutdown() {
        let store = quick_store();
        store.open();
        store.shutdown();
        assert!(store.is_shut_down());
        assert!(store.open());
        assert!(!store.is_shut_down());
        assert!(store.open_register().is_some());
    }

    #[test]
    fn test_waiting_room_shut_after_shutdown() {
        let store = Arc::new(quick_store());
        store.open();
        store.shutdown();
        assert_eq!(store.phase(), StorePhase::Closed);

        let patient = Arc::new(Shopper::waiting(store.clone(), Vec::new()));
        assert_eq!(store.start_shopper(&patient), Admission::Rejected);
        assert_eq!(store.waiting_count(), 0);

        // a fresh store that was never opened still lets waiters queue
        let fresh = Arc::new(quick_store());
        let early = Arc::new(Shopper::waiting(fresh.clone(), Vec::new()));
        assert!(!fresh.is_shut_down());
        assert_eq!(fresh.start_shopper(&early), Admission::Waiting);
    }
}
