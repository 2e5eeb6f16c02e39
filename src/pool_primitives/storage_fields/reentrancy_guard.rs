use crate::errors::PoolError;

/// Call-scope lock around the money-moving messages.
///
/// Purchases, claims and withdrawals hand control to foreign code through
/// PSP22 calls and native transfers. A nested call into a guarded message
/// finds the flag set and fails with `ReentrantCall`. The flag is only
/// cleared on the success path; an error reverts the whole call, flag
/// included.
#[derive(Debug)]
#[pendzl::storage_item]
pub struct ReentrancyGuardStorage {
    #[lazy]
    entered: bool,
}

impl ReentrancyGuardStorage {
    pub fn new() -> Self {
        ReentrancyGuardStorage {
            entered: Default::default(),
        }
    }

    pub fn enter(&mut self) -> Result<(), PoolError> {
        if self.entered.get().unwrap_or(false) {
            return Err(PoolError::ReentrantCall);
        }
        self.entered.set(&true);
        Ok(())
    }

    pub fn exit(&mut self) {
        self.entered.set(&false);
    }
}

impl Default for ReentrancyGuardStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ink::test]
    fn nested_enter_is_rejected() {
        let mut guard = ReentrancyGuardStorage::new();
        assert_eq!(guard.enter(), Ok(()));
        assert_eq!(guard.enter(), Err(PoolError::ReentrantCall));
    }

    #[ink::test]
    fn exit_reopens_the_guard() {
        let mut guard = ReentrancyGuardStorage::new();
        guard.enter().unwrap();
        guard.exit();
        assert_eq!(guard.enter(), Ok(()));
    }
}
