//! Shared identifiers, task model, and the fixed café menu.

/// Name of a café queue (also the prefix of its task ids).
pub type QueueId = String;
/// Simulated time and work, measured in minutes.
pub type Minutes = u64;

/// Drinks served and the minutes of work each one needs.
pub const MENU: [(&str, Minutes); 7] = [
    ("americano", 2),
    ("latte", 3),
    ("cappuccino", 3),
    ("mocha", 4),
    ("tea", 1),
    ("macchiato", 2),
    ("hot_chocolate", 4),
];

/// A single drink order waiting in (or being served from) a queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    /// `<queue_id>-NNN`, unique within its queue.
    pub id: String,
    /// Minutes of work still owed.
    pub remaining: Minutes,
}

impl Task {
    /// Construct a task with the provided id and remaining work.
    pub fn new(id: impl Into<String>, remaining: Minutes) -> Self {
        Self {
            id: id.into(),
            remaining,
        }
    }
}

/// Format the id for the `seq`-th order placed on `queue_id`.
pub fn task_id(queue_id: &str, seq: u64) -> String {
    format!("{queue_id}-{seq:03}")
}
