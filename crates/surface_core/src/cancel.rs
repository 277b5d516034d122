use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CalcError, CalcResult};

/// Cooperative cancellation flag shared between a caller and a running scan.
///
/// Grid scans poll the token once per row, so cancellation latency is one row
/// of oracle evaluations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> CalcResult<()> {
        if self.is_cancelled() {
            Err(CalcError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;
    use crate::error::CalcError;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(token.check().is_ok());
        handle.cancel();
        assert_eq!(token.check(), Err(CalcError::Cancelled));
    }
}
