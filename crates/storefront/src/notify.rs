//! User-facing notices for cart operations that did not go through.
//!
//! Cart operations never fail towards their caller. When one is refused, the
//! store hands a [`Notice`] to its [`Notifier`] and leaves the cart as it was.
//! A UI shows the notice as a toast; the server also returns it in the JSON
//! response.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::cart::{CartOperation, CartOutcome};

/// A message for the user about a refused cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Adding one more unit would exceed the available stock.
    AddOutOfStock,
    /// Adding failed for any other reason (lookup, persistence).
    AddFailed,
    /// The product to remove is not in the cart, or persisting failed.
    RemoveFailed,
    /// The product to update is not in the cart.
    UpdateFailed,
    /// The requested amount exceeds the stock, or the stock lookup failed.
    UpdateOutOfStock,
}

impl Notice {
    /// The notice to show for an operation outcome, if any.
    ///
    /// Successful and no-op outcomes produce no notice.
    #[must_use]
    pub const fn for_outcome(operation: CartOperation, outcome: &CartOutcome) -> Option<Self> {
        match (operation, outcome) {
            (_, CartOutcome::Updated(_) | CartOutcome::Unchanged) => None,
            (CartOperation::Add, CartOutcome::OutOfStock) => Some(Self::AddOutOfStock),
            (CartOperation::Add, CartOutcome::NotFound | CartOutcome::Failed(_)) => {
                Some(Self::AddFailed)
            }
            (CartOperation::Remove, _) => Some(Self::RemoveFailed),
            (CartOperation::Update, CartOutcome::NotFound) => Some(Self::UpdateFailed),
            (CartOperation::Update, CartOutcome::OutOfStock | CartOutcome::Failed(_)) => {
                Some(Self::UpdateOutOfStock)
            }
        }
    }

    /// Message shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::AddOutOfStock | Self::UpdateOutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Error adding product",
            Self::RemoveFailed => "Error removing product",
            Self::UpdateFailed => "Error changing product quantity",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Fire-and-forget sink for notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs notices as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = ?notice, "{}", notice.message());
    }
}

/// Keeps every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return the notices received so far.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

#[cfg(test)]
mod tests {
    use rocketshoes_core::Cart;

    use super::*;

    #[test]
    fn test_no_notice_for_success_or_noop() {
        let updated = CartOutcome::Updated(Cart::new());
        for op in [CartOperation::Add, CartOperation::Remove, CartOperation::Update] {
            assert_eq!(Notice::for_outcome(op, &updated), None);
            assert_eq!(Notice::for_outcome(op, &CartOutcome::Unchanged), None);
        }
    }

    #[test]
    fn test_notice_mapping() {
        let failed = CartOutcome::Failed("timeout".to_string());
        assert_eq!(
            Notice::for_outcome(CartOperation::Add, &CartOutcome::OutOfStock),
            Some(Notice::AddOutOfStock)
        );
        assert_eq!(
            Notice::for_outcome(CartOperation::Add, &failed),
            Some(Notice::AddFailed)
        );
        assert_eq!(
            Notice::for_outcome(CartOperation::Remove, &CartOutcome::NotFound),
            Some(Notice::RemoveFailed)
        );
        assert_eq!(
            Notice::for_outcome(CartOperation::Update, &CartOutcome::NotFound),
            Some(Notice::UpdateFailed)
        );
        // Stock lookup failures while updating read as out of stock
        assert_eq!(
            Notice::for_outcome(CartOperation::Update, &failed),
            Some(Notice::UpdateOutOfStock)
        );
    }

    #[test]
    fn test_recording_notifier_take() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::AddFailed);
        notifier.notify(Notice::RemoveFailed);
        assert_eq!(notifier.take(), vec![Notice::AddFailed, Notice::RemoveFailed]);
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_notice_serializes_snake_case() {
        let json = serde_json::to_string(&Notice::AddOutOfStock).unwrap_or_default();
        assert_eq!(json, "\"add_out_of_stock\"");
    }
}
