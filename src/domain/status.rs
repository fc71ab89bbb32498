use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::errors::DomainError;

/// Delivery lifecycle of a single order item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Pending,
    Shipped,
    Delivered,
    Disputing,
    Resolved,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "PENDING",
            ItemStatus::Shipped => "SHIPPED",
            ItemStatus::Delivered => "DELIVERED",
            ItemStatus::Disputing => "DISPUTING",
            ItemStatus::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ItemStatus::Pending),
            "SHIPPED" => Ok(ItemStatus::Shipped),
            "DELIVERED" => Ok(ItemStatus::Delivered),
            "DISPUTING" => Ok(ItemStatus::Disputing),
            "RESOLVED" => Ok(ItemStatus::Resolved),
            other => Err(DomainError::Internal(format!("unknown item status '{other}'"))),
        }
    }
}

/// Order-level status aggregated from the statuses of its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Shipped,
    Delivered,
    Completed,
    Incomplete,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Shipped => "SHIPPED",
            OverallStatus::Delivered => "DELIVERED",
            OverallStatus::Completed => "COMPLETED",
            OverallStatus::Incomplete => "INCOMPLETE",
        }
    }

    /// Derives the order status from its item statuses.
    ///
    /// All shipped gives `Shipped`, all delivered gives `Delivered`, and a
    /// settled mix of delivered and resolved items gives `Completed`. Anything
    /// still pending, in transit alongside other states, or under dispute is
    /// `Incomplete`.
    pub fn aggregate<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = ItemStatus>,
    {
        let mut any = false;
        let mut all_shipped = true;
        let mut all_delivered = true;
        let mut all_settled = true;
        for status in statuses {
            any = true;
            all_shipped &= status == ItemStatus::Shipped;
            all_delivered &= status == ItemStatus::Delivered;
            all_settled &= matches!(status, ItemStatus::Delivered | ItemStatus::Resolved);
        }
        if !any {
            OverallStatus::Incomplete
        } else if all_shipped {
            OverallStatus::Shipped
        } else if all_delivered {
            OverallStatus::Delivered
        } else if all_settled {
            OverallStatus::Completed
        } else {
            OverallStatus::Incomplete
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverallStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHIPPED" => Ok(OverallStatus::Shipped),
            "DELIVERED" => Ok(OverallStatus::Delivered),
            "COMPLETED" => Ok(OverallStatus::Completed),
            "INCOMPLETE" => Ok(OverallStatus::Incomplete),
            other => Err(DomainError::Internal(format!(
                "unknown overall status '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ItemStatus::*;

    #[test]
    fn all_shipped_is_shipped() {
        assert_eq!(
            OverallStatus::aggregate([Shipped, Shipped]),
            OverallStatus::Shipped
        );
    }

    #[test]
    fn all_delivered_is_delivered() {
        assert_eq!(
            OverallStatus::aggregate([Delivered]),
            OverallStatus::Delivered
        );
        assert_eq!(
            OverallStatus::aggregate([Delivered, Delivered]),
            OverallStatus::Delivered
        );
    }

    #[test]
    fn settled_mix_is_completed() {
        assert_eq!(
            OverallStatus::aggregate([Delivered, Resolved]),
            OverallStatus::Completed
        );
        assert_eq!(
            OverallStatus::aggregate([Resolved]),
            OverallStatus::Completed
        );
    }

    #[test]
    fn anything_open_is_incomplete() {
        assert_eq!(
            OverallStatus::aggregate([Pending]),
            OverallStatus::Incomplete
        );
        assert_eq!(
            OverallStatus::aggregate([Shipped, Delivered]),
            OverallStatus::Incomplete
        );
        assert_eq!(
            OverallStatus::aggregate([Delivered, Disputing]),
            OverallStatus::Incomplete
        );
        assert_eq!(
            OverallStatus::aggregate(Vec::<ItemStatus>::new()),
            OverallStatus::Incomplete
        );
    }

    #[test]
    fn item_status_parses_stored_names() {
        for status in [Pending, Shipped, Delivered, Disputing, Resolved] {
            assert_eq!(status.as_str().parse::<ItemStatus>().unwrap(), status);
        }
        assert!("LOST".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn item_status_serializes_screaming_case() {
        let json = serde_json::to_string(&Disputing).unwrap();
        assert_eq!(json, "\"DISPUTING\"");
    }
}
