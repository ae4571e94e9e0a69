//! Configuration for einsum operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::fallback::DEFAULT_PARALLEL_THRESHOLD;
use crate::notation::{EinsumNotation, Label};
use crate::pattern::OperationKind;

/// Configuration options for einsum execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EinsumConfig {
    /// Evaluate every einsum with the loop engine, ignoring classification.
    pub force_fallback: bool,
    /// Whether to consult backend kernels before the built-in ones.
    pub use_overrides: bool,
    /// Output cell count from which the loop engine runs on the rayon pool.
    pub parallel_threshold: usize,
}

impl Default for EinsumConfig {
    fn default() -> Self {
        Self {
            force_fallback: false,
            use_overrides: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EinsumConfig {
    /// Creates a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loop evaluation of everything, no backend kernels: the reference
    /// result to check kernels against.
    pub fn reference() -> Self {
        Self {
            force_fallback: true,
            use_overrides: false,
            ..Self::default()
        }
    }

    /// Enables or disables forced loop evaluation.
    pub fn with_force_fallback(mut self, enabled: bool) -> Self {
        self.force_fallback = enabled;
        self
    }

    /// Enables or disables backend kernels.
    pub fn with_overrides(mut self, enabled: bool) -> Self {
        self.use_overrides = enabled;
        self
    }

    /// Sets the parallel reduction threshold.
    pub fn with_parallel_threshold(mut self, cells: usize) -> Self {
        self.parallel_threshold = cells;
        self
    }
}

static LOOPS_ALLOWED: AtomicBool = AtomicBool::new(true);

/// Process-wide switch: with `false`, every einsum falling back to loop
/// evaluation is logged at error level. Results are unaffected.
pub fn allow_loops(allowed: bool) {
    LOOPS_ALLOWED.store(allowed, Ordering::Relaxed);
}

/// Returns the current [`allow_loops`] setting.
pub fn loops_allowed() -> bool {
    LOOPS_ALLOWED.load(Ordering::Relaxed)
}

/// One classification decision, as seen by the dispatch observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// The notation, rendered like `ij,jk->ik`.
    pub notation: String,
    /// The rule that evaluates it.
    pub kind: OperationKind,
}

/// Sink receiving every dispatch decision.
pub type DispatchObserver = Box<dyn Fn(&DispatchRecord) + Send + Sync>;

static OBSERVER: RwLock<Option<DispatchObserver>> = RwLock::new(None);

/// Installs (or with `None`, removes) the process-wide dispatch observer.
///
/// Returns the previously installed observer.
pub fn set_dispatch_observer(observer: Option<DispatchObserver>) -> Option<DispatchObserver> {
    let mut slot = OBSERVER.write().unwrap_or_else(PoisonError::into_inner);
    core::mem::replace(&mut *slot, observer)
}

/// Logs the decision and forwards it to the observer.
pub(crate) fn record_dispatch<L: Label>(notation: &EinsumNotation<L>, kind: OperationKind) {
    log::debug!("einsum `{}` dispatched to {}", notation, kind);

    if kind == OperationKind::Fallback && !loops_allowed() {
        log::error!("einsum `{}` uses loop evaluation while loops are disallowed", notation);
    }

    let slot = OBSERVER.read().unwrap_or_else(PoisonError::into_inner);
    if let Some(observer) = slot.as_ref() {
        observer(&DispatchRecord {
            notation: notation.to_string(),
            kind,
        });
    }
}
