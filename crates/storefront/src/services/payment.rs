//! Simulated payment gateway.
//!
//! There is no real processor behind this: a charge waits the configured
//! delay, then is declined with the configured probability.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use shopfront_core::{OrderId, PaymentMethod};

use crate::config::PaymentConfig;

/// Length of the random suffix of a transaction ID.
const TRANSACTION_SUFFIX_LEN: usize = 9;

/// Errors returned by the gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment failed. Please try again.")]
    Declined,
}

/// A successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub method: PaymentMethod,
}

/// Simulated payment gateway.
#[derive(Debug, Clone, Copy)]
pub struct PaymentGateway {
    config: PaymentConfig,
}

impl PaymentGateway {
    #[must_use]
    pub const fn new(config: PaymentConfig) -> Self {
        Self { config }
    }

    /// Charge an order.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Declined` when the simulated processor declines.
    #[instrument(skip(self))]
    pub async fn charge(
        &self,
        order_id: OrderId,
        method: PaymentMethod,
    ) -> Result<PaymentReceipt, PaymentError> {
        tokio::time::sleep(self.config.simulated_delay).await;

        if rand::random::<f64>() < self.config.failure_rate {
            tracing::warn!("Simulated payment declined");
            return Err(PaymentError::Declined);
        }

        let receipt = PaymentReceipt {
            transaction_id: transaction_id(),
            method,
        };
        tracing::info!(transaction_id = %receipt.transaction_id, "Payment captured");
        Ok(receipt)
    }
}

/// Generate `txn_<unix-millis>_<9 lowercase base36 chars>`.
#[must_use]
pub fn transaction_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut rng = rand::rng();
    let suffix: String = (0..TRANSACTION_SUFFIX_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect();

    format!("txn_{millis}_{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn gateway(failure_rate: f64) -> PaymentGateway {
        PaymentGateway::new(PaymentConfig {
            simulated_delay: Duration::ZERO,
            failure_rate,
        })
    }

    #[test]
    fn test_transaction_id_format() {
        let id = transaction_id();
        let mut parts = id.split('_');
        assert_eq!(parts.next(), Some("txn"));

        let millis = parts.next().unwrap();
        assert!(!millis.is_empty());
        assert!(millis.chars().all(|c| c.is_ascii_digit()));

        let suffix = parts.next().unwrap();
        assert_eq!(suffix.len(), TRANSACTION_SUFFIX_LEN);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );

        assert_eq!(parts.next(), None);
    }

    #[tokio::test]
    async fn test_charge_succeeds_when_never_failing() {
        for _ in 0..20 {
            let receipt = gateway(0.0)
                .charge(OrderId::new(1), PaymentMethod::Paypal)
                .await
                .unwrap();
            assert_eq!(receipt.method, PaymentMethod::Paypal);
            assert!(receipt.transaction_id.starts_with("txn_"));
        }
    }

    #[tokio::test]
    async fn test_charge_declines_when_always_failing() {
        for _ in 0..20 {
            let result = gateway(1.0)
                .charge(OrderId::new(1), PaymentMethod::CreditCard)
                .await;
            assert!(matches!(result, Err(PaymentError::Declined)));
        }
    }

    #[test]
    fn test_declined_message() {
        assert_eq!(
            PaymentError::Declined.to_string(),
            "Payment failed. Please try again."
        );
    }
}
