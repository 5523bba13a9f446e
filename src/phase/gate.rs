use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Phase, PhaseError};

/// Admits one phase at a time.
#[derive(Debug, Default)]
pub struct PhaseGate {
    running: Mutex<Option<Phase>>,
}

/// Holds the gate until dropped.
#[derive(Debug)]
pub struct PhaseGuard<'a> {
    gate: &'a PhaseGate,
}

impl PhaseGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Phase>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the gate for `phase`, or report the phase already holding it.
    pub fn try_enter(&self, phase: Phase) -> Result<PhaseGuard<'_>, PhaseError> {
        let mut running = self.lock();
        if let Some(current) = *running {
            return Err(PhaseError::AlreadyRunning {
                requested: phase,
                running: current,
            });
        }
        *running = Some(phase);
        Ok(PhaseGuard { gate: self })
    }

    /// The phase currently holding the gate.
    pub fn current(&self) -> Option<Phase> {
        *self.lock()
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.gate.lock() = None;
    }
}
