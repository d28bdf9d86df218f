//! Query filters for listing endpoints.
//!
//! Filters only ever add parameters to a query. Unset fields are left out,
//! so the API applies its own defaults.
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Sort order for list results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    #[default]
    Asc,
    /// Newest first
    Desc,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a subscriber within a form or tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberState {
    /// Currently subscribed
    Active,
    /// Unsubscribed
    Cancelled,
}

impl SubscriberState {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Field subscriber lists can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Time of unsubscription
    CancelledAt,
}

impl SortField {
    const fn as_str(self) -> &'static str {
        match self {
            Self::CancelledAt => "cancelled_at",
        }
    }
}

/// Filters for the form and tag subscription listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriptionFilter {
    /// Sort order of the subscriptions
    pub sort_order: Option<SortOrder>,
    /// Only list subscriptions in this state
    pub subscriber_state: Option<SubscriberState>,
}

impl SubscriptionFilter {
    /// Filter by subscriber state
    #[must_use]
    pub const fn state(mut self, state: SubscriberState) -> Self {
        self.subscriber_state = Some(state);
        self
    }

    /// Set the sort order
    #[must_use]
    pub const fn order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Query parameters for this filter
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(order) = self.sort_order {
            query.push(("sort_order".to_string(), order.as_str().to_string()));
        }
        if let Some(state) = self.subscriber_state {
            query.push(("subscriber_state".to_string(), state.as_str().to_string()));
        }
        query
    }
}

/// Filters for the subscriber listing.
///
/// Dates use the `yyyy-mm-dd` format. The sort order always ends up in the
/// query, ascending unless set otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberFilter {
    /// Sort order of the subscribers
    pub sort_order: SortOrder,
    /// Only subscribers added on or after this date
    pub from: Option<String>,
    /// Only subscribers added on or before this date
    pub to: Option<String>,
    /// Only subscribers updated after this date
    pub updated_from: Option<String>,
    /// Only subscribers updated before this date
    pub updated_to: Option<String>,
    /// Field to sort by instead of creation time
    pub sort_field: Option<SortField>,
}

impl SubscriberFilter {
    /// Query parameters for this filter
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![(
            "sort_order".to_string(),
            self.sort_order.as_str().to_string(),
        )];

        let dates = [
            ("from", &self.from),
            ("to", &self.to),
            ("updated_from", &self.updated_from),
            ("updated_to", &self.updated_to),
        ];
        for (key, value) in dates {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push((key.to_string(), value.to_string()));
            }
        }

        if let Some(field) = self.sort_field {
            query.push(("sort_field".to_string(), field.as_str().to_string()));
        }
        query
    }
}
