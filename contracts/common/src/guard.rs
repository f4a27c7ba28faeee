//! Reentrancy Guard
//!
//! Per-entity execution lock. Every public mutating operation of the vault
//! and of an auction enters the guard first; a nested entry while the
//! entity is mid-operation is rejected with [`BomhError::Reentrancy`].
//!
//! [`atomic_call`] wraps an operation so that a failure anywhere inside it
//! restores the entity, the token bank and the event log.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::bank::TokenBank;
use crate::context::CallContext;
use crate::errors::{BomhError, BomhResult};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize,
    BorshDeserialize,
)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock
    pub fn enter(&mut self) -> BomhResult<()> {
        if self.entered {
            return Err(BomhError::Reentrancy);
        }
        self.entered = true;
        Ok(())
    }

    /// Release the lock
    pub fn exit(&mut self) {
        self.entered = false;
    }

    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

/// Entities that carry their own execution lock
pub trait Guarded: Clone {
    fn guard_mut(&mut self) -> &mut ReentrancyGuard;
}

/// Run `op` as one all-or-nothing call on `entity`.
///
/// The guard is held for the duration of `op`. On error the entity is put
/// back to its pre-call clone, the bank to its checkpoint, and events
/// emitted by `op` are dropped.
pub fn atomic_call<E, T, F>(
    entity: &mut E,
    bank: &mut TokenBank,
    ctx: &mut CallContext,
    op: F,
) -> BomhResult<T>
where
    E: Guarded,
    F: FnOnce(&mut E, &mut TokenBank, &mut CallContext) -> BomhResult<T>,
{
    let saved = entity.clone();
    entity.guard_mut().enter()?;
    let checkpoint = bank.checkpoint();
    let events_len = ctx.events.len();

    match op(entity, bank, ctx) {
        Ok(value) => {
            entity.guard_mut().exit();
            Ok(value)
        }
        Err(err) => {
            *entity = saved;
            bank.restore(checkpoint);
            ctx.events.truncate(events_len);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::BomhEvent;

    #[derive(Debug, Clone, Default)]
    struct Counter {
        value: u64,
        guard: ReentrancyGuard,
    }

    impl Guarded for Counter {
        fn guard_mut(&mut self) -> &mut ReentrancyGuard {
            &mut self.guard
        }
    }

    fn burned_event() -> BomhEvent {
        BomhEvent::RiskCoinBurned {
            amount: 1,
            new_total_supply: 0,
            timestamp: 0,
        }
    }

    #[test]
    fn test_nested_entry_rejected() {
        let mut guard = ReentrancyGuard::new();
        guard.enter().unwrap();
        assert_eq!(guard.enter(), Err(BomhError::Reentrancy));
        assert!(guard.is_entered());

        guard.exit();
        assert!(guard.enter().is_ok());
    }

    #[test]
    fn test_atomic_call_commits_on_success() {
        let mut counter = Counter::default();
        let mut bank = TokenBank::new();
        let mut ctx = CallContext::new([1u8; 32], 0);

        let out = atomic_call(&mut counter, &mut bank, &mut ctx, |c, _, ctx| {
            c.value += 5;
            ctx.events.emit(burned_event());
            Ok(c.value)
        });

        assert_eq!(out, Ok(5));
        assert_eq!(counter.value, 5);
        assert!(!counter.guard.is_entered());
        assert_eq!(ctx.events.len(), 1);
    }

    #[test]
    fn test_atomic_call_rolls_back_on_error() {
        let mut counter = Counter { value: 3, ..Default::default() };
        let mut bank = TokenBank::new();
        let mut ctx = CallContext::new([1u8; 32], 0);

        let out: BomhResult<()> = atomic_call(&mut counter, &mut bank, &mut ctx, |c, _, ctx| {
            c.value = 100;
            ctx.events.emit(burned_event());
            Err(BomhError::Overflow)
        });

        assert_eq!(out, Err(BomhError::Overflow));
        assert_eq!(counter.value, 3);
        assert!(!counter.guard.is_entered());
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn test_atomic_call_rejects_reentry() {
        let mut counter = Counter::default();
        counter.guard.enter().unwrap();
        let mut bank = TokenBank::new();
        let mut ctx = CallContext::new([1u8; 32], 0);

        let out = atomic_call(&mut counter, &mut bank, &mut ctx, |c, _, _| {
            c.value += 1;
            Ok(())
        });

        assert_eq!(out, Err(BomhError::Reentrancy));
        assert_eq!(counter.value, 0);
    }
}
