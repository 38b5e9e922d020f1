//! # Register
//!
//! A FIFO checkout line plus the logic that turns a shopper's cart into a
//! receipt.
//!
//! ## Line Handoff
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Register #0                                    │
//! │                                                                         │
//! │  Shopper threads (many producers)        Store service pass (1 consumer)│
//! │                                                                         │
//! │  S3 ──enqueue──┐                                                        │
//! │  S7 ──enqueue──┼──▶ [ S1 | S2 | S3 | S7 ] ──checkout_next──▶ S1 gets    │
//! │                │      head          tail                      Receipt   │
//! │                │                                                        │
//! │  (line_limit reached → enqueue returns false)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `checkout_next` never blocks waiting for a shopper; it only serves
//! shoppers already in line.

use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use grocer_core::{Item, Receipt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::lock;
use crate::shopper::Shopper;

static NEXT_REGISTER_ID: AtomicU64 = AtomicU64::new(0);

// =============================================================================
// Register Id
// =============================================================================

/// Stable register identity, assigned once and monotonically at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterId(u64);

impl RegisterId {
    fn next() -> Self {
        RegisterId(NEXT_REGISTER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "register-{}", self.0)
    }
}

// =============================================================================
// Register
// =============================================================================

/// A checkout register. Equality and hashing are by id alone.
#[derive(Debug)]
pub struct Register {
    id: RegisterId,
    /// `None` means the line is unbounded.
    line_limit: Option<usize>,
    line: Mutex<VecDeque<Arc<Shopper>>>,
}

impl Register {
    /// Creates a register with an unbounded line.
    pub fn new() -> Self {
        Self::with_line_limit(0)
    }

    /// Creates a register whose line holds at most `limit` shoppers.
    /// A limit of 0 means unbounded.
    pub fn with_line_limit(limit: usize) -> Self {
        Register {
            id: RegisterId::next(),
            line_limit: (limit > 0).then_some(limit),
            line: Mutex::new(VecDeque::new()),
        }
    }

    pub fn id(&self) -> RegisterId {
        self.id
    }

    /// Puts a shopper at the back of the line.
    ///
    /// Returns `false` only when the line is bounded and full.
    pub fn enqueue(&self, shopper: Arc<Shopper>) -> bool {
        let mut line = lock::lock(&self.line);
        if self.line_limit.is_some_and(|limit| line.len() >= limit) {
            debug!(register = %self.id, shopper = %shopper.id(), "Checkout line full");
            return false;
        }
        debug!(register = %self.id, shopper = %shopper.id(), position = line.len(), "Shopper joined line");
        line.push_back(shopper);
        true
    }

    /// Serves the shopper at the head of the line, if any.
    ///
    /// ## Steps
    /// 1. Pop the head (FIFO, no reordering)
    /// 2. Snapshot its cart, dropping non-positive entries
    /// 3. Build a receipt from what is left
    /// 4. Clear the cart and hand the receipt to the shopper
    ///
    /// Returns the id of the shopper served, or `None` if the line was empty.
    pub fn checkout_next(&self) -> Option<crate::shopper::ShopperId> {
        // the line lock is released before touching the shopper
        let shopper = lock::lock(&self.line).pop_front()?;

        let items: Vec<Item> = shopper
            .cart()
            .into_iter()
            .filter(|item| item.quantity() > 0)
            .collect();
        let receipt = Receipt::from_items(items);

        debug!(
            register = %self.id,
            shopper = %shopper.id(),
            lines = receipt.line_count(),
            total = %receipt.total(),
            "Checked out shopper"
        );
        shopper.settle(receipt);
        Some(shopper.id())
    }

    /// Serves every shopper still in line. Returns how many were served.
    ///
    /// Used when a register leaves service so nobody in line is abandoned.
    pub fn checkout_all_remaining(&self) -> usize {
        let mut served = 0;
        while self.checkout_next().is_some() {
            served += 1;
        }
        if served > 0 {
            info!(register = %self.id, served, "Drained checkout line");
        }
        served
    }

    /// Shoppers currently waiting. Informational only: it can change the
    /// moment after it is read.
    pub fn waiting_count(&self) -> usize {
        lock::lock(&self.line).len()
    }

    /// Free places in line, or `None` when unbounded.
    pub fn remaining_capacity(&self) -> Option<usize> {
        self.line_limit
            .map(|limit| limit.saturating_sub(self.waiting_count()))
    }
}

impl Default for Register {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Register {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Register {}

impl Hash for Register {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
