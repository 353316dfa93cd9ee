//! Orders changed namespaces by subscription priority.
//!
//! Fetches run in this order, so same-cycle updates land lowest priority
//! first. Unsubscribed namespaces are dropped; duplicates keep the last entry.

use std::collections::HashMap;

use crate::notification::ChangeNotification;

#[must_use]
pub fn order_notifications(
    subscribed: &[String],
    changes: Vec<ChangeNotification>,
) -> Vec<ChangeNotification> {
    let mut by_namespace: HashMap<String, ChangeNotification> = changes
        .into_iter()
        .map(|n| (n.namespace_name.clone(), n))
        .collect();

    subscribed
        .iter()
        .filter_map(|namespace| by_namespace.remove(namespace))
        .collect()
}
