//! # Handler groups
//!
//! Routes each inbound message through ordered groups of (predicate, action) routes. Groups run in
//! ascending group number and are independent: within a group only the first matching route runs,
//! but every group gets its own pass, so a logging group sees every message whatever earlier groups did.
//! Action errors and panics are contained here and reduced to log lines.

mod predicate;

pub use predicate::Predicate;

use async_trait::async_trait;
use futures::FutureExt;
use gatebot_core::{HandlerError, InboundMessage, Result};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Work done for a message once its route matched.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(&self, message: &InboundMessage) -> Result<()>;
}

struct Route {
    predicate: Predicate,
    action: Arc<dyn Action>,
}

/// What one group did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// No route in the group matched.
    NoMatch,
    /// Route at `route` (registration index) ran to completion.
    Handled { route: usize },
    /// Route at `route` matched but its action failed; the error was logged.
    Failed { route: usize, error: String },
}

/// Per-message report: one entry per registered group, in ascending group order.
pub type DispatchReport = Vec<(i32, GroupOutcome)>;

/// Ordered handler groups for one session. Built once by the runner, then shared read-only.
#[derive(Clone, Default)]
pub struct Dispatcher {
    groups: BTreeMap<i32, Vec<Arc<Route>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with no groups.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route to `group`. Routes within a group are tried in registration order.
    pub fn add_handler(mut self, group: i32, predicate: Predicate, action: Arc<dyn Action>) -> Self {
        self.groups
            .entry(group)
            .or_default()
            .push(Arc::new(Route { predicate, action }));
        self
    }

    /// Registered group numbers, ascending.
    pub fn groups(&self) -> Vec<i32> {
        self.groups.keys().copied().collect()
    }

    /// Runs every group for `message`. Never fails: action errors and panics end up in the report.
    #[instrument(skip(self, message), fields(message_id = message.id, chat_id = message.chat_id))]
    pub async fn dispatch(&self, message: &InboundMessage) -> DispatchReport {
        let mut report = Vec::with_capacity(self.groups.len());

        for (&group, routes) in &self.groups {
            let matched = routes
                .iter()
                .enumerate()
                .find(|(_, route)| route.predicate.matches(message));

            let outcome = match matched {
                None => {
                    debug!(group, "step: no route matched");
                    GroupOutcome::NoMatch
                }
                Some((index, route)) => {
                    let action_name = std::any::type_name_of_val(route.action.as_ref());
                    info!(
                        group,
                        route = index,
                        action = %action_name,
                        user_id = message.sender.id,
                        "step: action running"
                    );
                    match run_contained(route.action.as_ref(), message).await {
                        Ok(()) => GroupOutcome::Handled { route: index },
                        Err(e) => {
                            error!(
                                group,
                                route = index,
                                action = %action_name,
                                error = %e,
                                "Action failed"
                            );
                            GroupOutcome::Failed {
                                route: index,
                                error: e.to_string(),
                            }
                        }
                    }
                }
            };
            report.push((group, outcome));
        }

        report
    }
}

async fn run_contained(action: &dyn Action, message: &InboundMessage) -> Result<()> {
    match AssertUnwindSafe(action.run(message)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(HandlerError::Panicked(detail).into())
        }
    }
}

// Integration tests live in tests/handler_groups_test.rs
