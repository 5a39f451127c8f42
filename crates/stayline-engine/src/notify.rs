//! # Notification Collaborator
//!
//! Fire-and-forget booking notifications.
//!
//! Delivery mechanics (email, SMS, push) are an external collaborator and
//! out of scope; the engine only knows this trait. Sends happen AFTER the
//! booking transaction commits, and a failed send is logged with `warn!`,
//! never propagated - a broken mail relay must not roll back a booking.

use tracing::info;

use stayline_core::{Booking, Customer};

/// Errors a notification backend may report. Logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("recipient rejected: {0}")]
    Rejected(String),
}

/// The outbound notification seam.
pub trait NotificationSender: Send + Sync {
    /// Notifies a customer that their booking was created.
    fn booking_created(&self, customer: &Customer, booking: &Booking) -> Result<(), NotifyError>;
}

/// Default sender: writes a structured log line and succeeds.
///
/// Useful for development and tests; production wires a real backend.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl NotificationSender for LogNotifier {
    fn booking_created(&self, customer: &Customer, booking: &Booking) -> Result<(), NotifyError> {
        info!(
            customer = %customer.email,
            booking_code = %booking.code,
            check_in = %booking.check_in,
            "Booking created notification"
        );
        Ok(())
    }
}
