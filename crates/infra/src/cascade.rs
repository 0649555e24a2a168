//! Cascading deletion workflow.
//!
//! Dependent rows are removed before the row they reference so the
//! composition graph never holds a dangling reference. The steps run
//! sequentially against a store with no multi-call transactions: a failure
//! mid-cascade leaves prior steps' effects in place (no compensation), and
//! the report names the step that broke. Each step is a delete-by-filter,
//! so retrying a partially-failed deletion converges.

use serde::{Deserialize, Serialize};

/// One step of the product-deletion cascade, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    Variations,
    OrderLines,
    PackagingLinks,
    Product,
}

impl CascadeStep {
    pub fn describe(self) -> &'static str {
        match self {
            CascadeStep::Variations => "deleting variations",
            CascadeStep::OrderLines => "deleting historical order lines",
            CascadeStep::PackagingLinks => "deleting packaging links",
            CascadeStep::Product => "deleting the product row",
        }
    }
}

/// Deletion workflow state.
///
/// `Requested → Confirmed → Cascading → Committed | Failed`. Confirmation
/// is a caller acknowledgment; nothing is written before it. Any step error
/// short-circuits to `Failed` with already-removed dependents left removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionState {
    Requested,
    Confirmed,
    Cascading,
    Committed,
    Failed { step: CascadeStep, message: String },
}

impl DeletionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeletionState::Committed | DeletionState::Failed { .. })
    }
}

/// Outcome of a product deletion, including how many dependent rows each
/// cascade step removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeReport {
    pub state: DeletionState,
    pub removed_variations: usize,
    pub removed_order_lines: usize,
    pub removed_packaging_links: usize,
}

impl CascadeReport {
    /// A request that has not been acknowledged yet; nothing was removed.
    pub fn requested() -> Self {
        Self {
            state: DeletionState::Requested,
            removed_variations: 0,
            removed_order_lines: 0,
            removed_packaging_links: 0,
        }
    }
}

/// Tracks the deletion state machine and refuses illegal transitions.
#[derive(Debug)]
pub struct DeletionWorkflow {
    state: DeletionState,
}

impl DeletionWorkflow {
    pub fn request() -> Self {
        Self {
            state: DeletionState::Requested,
        }
    }

    pub fn state(&self) -> &DeletionState {
        &self.state
    }

    /// Caller acknowledgment: `Requested → Confirmed`.
    pub fn confirm(&mut self) {
        if self.state == DeletionState::Requested {
            self.state = DeletionState::Confirmed;
        }
    }

    /// First write is about to happen: `Confirmed → Cascading`.
    pub fn begin_cascade(&mut self) {
        if self.state == DeletionState::Confirmed {
            self.state = DeletionState::Cascading;
        }
    }

    /// All steps done: `Cascading → Committed`.
    pub fn commit(&mut self) {
        if self.state == DeletionState::Cascading {
            self.state = DeletionState::Committed;
        }
    }

    /// Any step error short-circuits; terminal states stay put.
    pub fn fail(&mut self, step: CascadeStep, message: impl Into<String>) {
        if !self.state.is_terminal() {
            self.state = DeletionState::Failed {
                step,
                message: message.into(),
            };
        }
    }
}
