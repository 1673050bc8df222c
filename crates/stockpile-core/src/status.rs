//! # Status State Machines
//!
//! Sales orders and expected returns move through fixed lifecycles. Each
//! lifecycle is an enum with a total `allowed_transitions` function, so the
//! CLI only offers moves the API will accept and bad requests never leave
//! the process.
//!
//! ## Sales Order Lifecycle
//! ```text
//!   pending ──► dispatch ──► expected ──► delivered ──► returned
//!      │           │             │                        ▲
//!      ▼           ▼             └────────────────────────┤
//!  cancelled   cancelled                                  │
//!                                  expected_return ───────┘
//! ```
//!
//! ## Expected Return Lifecycle
//! ```text
//!   pending ──► in_transit ──► received
//!      │            │
//!      ▼            ▼
//!  cancelled    cancelled
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Sales Status
// =============================================================================

/// Lifecycle state of a sales order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesStatus {
    Pending,
    #[serde(alias = "dispatched", alias = "shipped")]
    Dispatch,
    Expected,
    Delivered,
    ExpectedReturn,
    Returned,
    Cancelled,
}

impl SalesStatus {
    pub const ALL: [SalesStatus; 7] = [
        SalesStatus::Pending,
        SalesStatus::Dispatch,
        SalesStatus::Expected,
        SalesStatus::Delivered,
        SalesStatus::ExpectedReturn,
        SalesStatus::Returned,
        SalesStatus::Cancelled,
    ];

    /// States reachable from `self` in one step.
    pub fn allowed_transitions(self) -> &'static [SalesStatus] {
        use SalesStatus::*;
        match self {
            Pending => &[Dispatch, Cancelled],
            Dispatch => &[Expected, Cancelled],
            Expected => &[Delivered, Returned],
            Delivered => &[Returned],
            ExpectedReturn => &[Returned],
            Returned | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: SalesStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Whether the order counts towards revenue.
    pub fn is_revenue_eligible(self) -> bool {
        !matches!(
            self,
            SalesStatus::Cancelled | SalesStatus::Returned | SalesStatus::ExpectedReturn
        )
    }

    /// Whether the order counts towards the return rate.
    pub fn is_return(self) -> bool {
        matches!(self, SalesStatus::Returned | SalesStatus::ExpectedReturn)
    }

    /// Moving to `returned` from `delivered` restores warehouse stock server-side.
    pub fn restores_stock(self, next: SalesStatus) -> bool {
        self == SalesStatus::Delivered && next == SalesStatus::Returned
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SalesStatus::Pending => "pending",
            SalesStatus::Dispatch => "dispatch",
            SalesStatus::Expected => "expected",
            SalesStatus::Delivered => "delivered",
            SalesStatus::ExpectedReturn => "expected_return",
            SalesStatus::Returned => "returned",
            SalesStatus::Cancelled => "cancelled",
        }
    }

    /// Checks a move against the table.
    pub fn transition(self, next: SalesStatus) -> Result<SalesStatus, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                entity: "sales order",
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

impl fmt::Display for SalesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SalesStatus::Pending),
            "dispatch" | "dispatched" | "shipped" => Ok(SalesStatus::Dispatch),
            "expected" => Ok(SalesStatus::Expected),
            "delivered" => Ok(SalesStatus::Delivered),
            "expected_return" | "expected-return" => Ok(SalesStatus::ExpectedReturn),
            "returned" => Ok(SalesStatus::Returned),
            "cancelled" | "canceled" => Ok(SalesStatus::Cancelled),
            other => Err(format!("unknown sales status '{other}'")),
        }
    }
}

// =============================================================================
// Return Status
// =============================================================================

/// Lifecycle state of an expected return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Pending,
    InTransit,
    Received,
    Cancelled,
}

impl ReturnStatus {
    pub const ALL: [ReturnStatus; 4] = [
        ReturnStatus::Pending,
        ReturnStatus::InTransit,
        ReturnStatus::Received,
        ReturnStatus::Cancelled,
    ];

    pub fn allowed_transitions(self) -> &'static [ReturnStatus] {
        use ReturnStatus::*;
        match self {
            Pending => &[InTransit, Cancelled],
            InTransit => &[Received, Cancelled],
            Received | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: ReturnStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnStatus::Pending => "pending",
            ReturnStatus::InTransit => "in_transit",
            ReturnStatus::Received => "received",
            ReturnStatus::Cancelled => "cancelled",
        }
    }

    /// Checks a move against the table and builds the update body.
    ///
    /// A move to `received` stamps `now` as the actual return date; every
    /// other move clears it.
    pub fn transition(
        self,
        next: ReturnStatus,
        now: DateTime<Utc>,
    ) -> Result<ReturnStatusUpdate, CoreError> {
        if !self.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                entity: "expected return",
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        Ok(ReturnStatusUpdate {
            status: next,
            actual_return_date: (next == ReturnStatus::Received).then_some(now),
        })
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReturnStatus::Pending),
            "in_transit" | "in-transit" => Ok(ReturnStatus::InTransit),
            "received" => Ok(ReturnStatus::Received),
            "cancelled" | "canceled" => Ok(ReturnStatus::Cancelled),
            other => Err(format!("unknown return status '{other}'")),
        }
    }
}

// =============================================================================
// Update Bodies
// =============================================================================

/// Body of `PATCH /sales/:id/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesStatusUpdate {
    pub status: SalesStatus,
}

/// Body of `PATCH /expected-returns/:id/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStatusUpdate {
    pub status: ReturnStatus,
    pub actual_return_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sales_transition_table() {
        use SalesStatus::*;
        assert_eq!(Pending.allowed_transitions(), &[Dispatch, Cancelled]);
        assert_eq!(Dispatch.allowed_transitions(), &[Expected, Cancelled]);
        assert_eq!(Expected.allowed_transitions(), &[Delivered, Returned]);
        assert_eq!(Delivered.allowed_transitions(), &[Returned]);
        assert_eq!(ExpectedReturn.allowed_transitions(), &[Returned]);
        assert!(Returned.is_terminal());
        assert!(Cancelled.is_terminal());
    }

    #[test]
    fn test_every_transition_target_is_a_known_state() {
        for state in SalesStatus::ALL {
            for next in state.allowed_transitions() {
                assert_ne!(*next, state);
                assert!(SalesStatus::ALL.contains(next));
            }
        }
        for state in ReturnStatus::ALL {
            for next in state.allowed_transitions() {
                assert_ne!(*next, state);
            }
        }
    }

    #[test]
    fn test_sales_invalid_transition_rejected() {
        let err = SalesStatus::Delivered
            .transition(SalesStatus::Dispatch)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot move sales order from delivered to dispatch"
        );
        assert_eq!(
            SalesStatus::Expected.transition(SalesStatus::Delivered).unwrap(),
            SalesStatus::Delivered
        );
    }

    #[test]
    fn test_restores_stock_only_from_delivered() {
        assert!(SalesStatus::Delivered.restores_stock(SalesStatus::Returned));
        assert!(!SalesStatus::Expected.restores_stock(SalesStatus::Returned));
    }

    #[test]
    fn test_sales_status_aliases() {
        for raw in ["\"dispatch\"", "\"dispatched\"", "\"shipped\""] {
            let status: SalesStatus = serde_json::from_str(raw).unwrap();
            assert_eq!(status, SalesStatus::Dispatch);
        }
        assert_eq!(
            serde_json::to_string(&SalesStatus::ExpectedReturn).unwrap(),
            "\"expected_return\""
        );
        assert_eq!("Shipped".parse::<SalesStatus>(), Ok(SalesStatus::Dispatch));
        assert!("lost".parse::<SalesStatus>().is_err());
    }

    #[test]
    fn test_return_transition_table() {
        use ReturnStatus::*;
        assert_eq!(Pending.allowed_transitions(), &[InTransit, Cancelled]);
        assert_eq!(InTransit.allowed_transitions(), &[Received, Cancelled]);
        assert!(Received.allowed_transitions().is_empty());
        assert!(Cancelled.allowed_transitions().is_empty());
    }

    #[test]
    fn test_received_carries_actual_return_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap();

        let update = ReturnStatus::InTransit
            .transition(ReturnStatus::Received, now)
            .unwrap();
        assert_eq!(update.actual_return_date, Some(now));

        let update = ReturnStatus::Pending
            .transition(ReturnStatus::InTransit, now)
            .unwrap();
        assert_eq!(update.actual_return_date, None);

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["status"], "in_transit");
        assert!(json["actualReturnDate"].is_null());

        assert!(ReturnStatus::Pending
            .transition(ReturnStatus::Received, now)
            .is_err());
    }
}
