//! Summary figures over the ticket table.

use serde::Serialize;

use super::{Priority, TicketStatus, TicketTable};

/// Count of tickets in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: TicketStatus,
    pub count: usize,
}

/// Count of tickets at one priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: usize,
}

/// Status distribution and priority breakdown.
///
/// Every status and priority appears, zero-filled, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketStats {
    pub total: usize,
    pub open: usize,
    pub by_status: Vec<StatusCount>,
    pub by_priority: Vec<PriorityCount>,
}

impl TicketStats {
    pub fn from_table(table: &TicketTable) -> Self {
        let by_status: Vec<StatusCount> = TicketStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: table.iter().filter(|r| r.status == *status).count(),
            })
            .collect();

        let by_priority = Priority::ALL
            .iter()
            .map(|priority| PriorityCount {
                priority: *priority,
                count: table.iter().filter(|r| r.priority == *priority).count(),
            })
            .collect();

        let open = by_status
            .iter()
            .find(|c| c.status == TicketStatus::Open)
            .map(|c| c.count)
            .unwrap_or(0);

        Self {
            total: table.len(),
            open,
            by_status,
            by_priority,
        }
    }
}
