//! Payment settlement: the single operation both providers converge on.
//!
//! Barion's polled state check and Stripe's webhook used to be two
//! independent code paths that each patched the order and decremented stock.
//! They now both call [`SettlementService::settle`], which owns the
//! status-check-and-transition, so a late Barion poll racing a Stripe
//! webhook (or a webhook delivered twice) can never decrement stock twice.
//!
//! Settlement is deliberately forgiving after the status transition: stock
//! patches and emails are best-effort. The payment already happened; nothing
//! downstream may turn it back into a failure.

use futures::future::join_all;
use thiserror::Error;
use tracing::instrument;

use wellcomp_core::{OrderId, OrderStatus, stock_deductions};

use crate::sanity::{SanityClient, SanityError};
use crate::services::resend::ResendClient;

/// Which provider confirmed the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentProvider {
    Barion,
    Stripe,
}

impl PaymentProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Barion => "barion",
            Self::Stripe => "stripe",
        }
    }
}

/// Outcome of a settlement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// The order transitioned to paid; stock was decremented and emails sent.
    Settled,
    /// The order was already paid; nothing was done (idempotent no-op).
    AlreadySettled,
}

/// Errors that prevent settlement from starting.
///
/// Failures after the status transition (stock patches, email) are logged
/// and swallowed, never surfaced here.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// The order could not be read or its status patched.
    #[error("Sanity error: {0}")]
    Sanity(#[from] SanityError),

    /// No order document exists for the given ID.
    #[error("Order not found: {0}")]
    OrderNotFound(String),
}

/// Confirms payments and settles orders.
#[derive(Clone)]
pub struct SettlementService {
    sanity: SanityClient,
    resend: ResendClient,
}

impl SettlementService {
    #[must_use]
    pub const fn new(sanity: SanityClient, resend: ResendClient) -> Self {
        Self { sanity, resend }
    }

    /// Confirm a payment and settle the order, exactly once.
    ///
    /// Re-fetches the order and checks its status before doing anything:
    /// an already-paid order returns [`SettlementOutcome::AlreadySettled`]
    /// without touching stock. Otherwise the order is marked `FIZETVE` with
    /// the confirming payment reference, stock is decremented per distinct
    /// product slug, and the confirmation emails go out.
    ///
    /// # Errors
    ///
    /// Returns an error only if the order cannot be read, does not exist, or
    /// the status patch itself fails. Later side-effect failures are logged.
    #[instrument(skip(self), fields(order_id = %order_id, provider = provider.as_str()))]
    pub async fn settle(
        &self,
        order_id: &OrderId,
        provider: PaymentProvider,
        payment_ref: &str,
    ) -> Result<SettlementOutcome, SettlementError> {
        let order = self
            .sanity
            .get_order(order_id)
            .await?
            .ok_or_else(|| SettlementError::OrderNotFound(order_id.to_string()))?;

        if let Some(outcome) = short_circuit(order.status) {
            tracing::info!("Order already settled, skipping");
            return Ok(outcome);
        }

        self.sanity
            .mark_order_paid(order_id, provider.as_str(), payment_ref)
            .await?;
        tracing::info!(order_number = %order.order_number, "Order marked paid");

        // Best-effort from here on: the payment is confirmed, stock and
        // email failures must not undo that.
        let deductions = stock_deductions(&order.lines);
        let results = join_all(
            deductions
                .iter()
                .map(|(slug, quantity)| self.sanity.decrement_stock(slug, *quantity)),
        )
        .await;

        for ((slug, _), result) in deductions.iter().zip(results) {
            if let Err(e) = result {
                tracing::error!(slug = %slug, "Stock decrement failed: {e}");
            }
        }

        self.resend.send_order_confirmation(&order).await;

        Ok(SettlementOutcome::Settled)
    }
}

/// The idempotency gate: an order that already reached a paid status never
/// settles again, no matter which provider asks or how many times.
const fn short_circuit(status: OrderStatus) -> Option<SettlementOutcome> {
    if status.is_paid() {
        Some(SettlementOutcome::AlreadySettled)
    } else {
        None
    }
}
