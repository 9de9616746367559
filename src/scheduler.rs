//! Round-robin scheduler over named bounded queues with a simulated clock.
//!
//! Every handler returns the log lines it produced; customer-facing notices
//! are buffered separately and drained with [`Scheduler::take_notices`].

use std::collections::{BTreeMap, HashMap};

use crate::error::SchedulerError;
use crate::log_dev;
use crate::task_queue::BoundedQueue;
use crate::types::{MENU, Minutes, QueueId, Task, task_id};

const NOTICE_UNKNOWN_ITEM: &str = "Sorry, we don't serve that.";
const NOTICE_FULL: &str = "Sorry, we're at capacity.";

/// Per-queue bookkeeping kept next to the queue itself.
struct Lane {
    queue: BoundedQueue<Task>,
    next_seq: u64,
    skip_pending: bool,
}

/// Outcome of servicing one queue for a single turn.
enum TurnOutcome {
    Skipped,
    Idle,
    Worked { task: String, remaining: Minutes },
    Finished { task: String },
}

pub struct Scheduler {
    time: Minutes,
    order: Vec<QueueId>,
    lanes: HashMap<QueueId, Lane>,
    cursor: usize,
    menu: BTreeMap<String, Minutes>,
    notices: Vec<String>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create a scheduler at time 0 with no queues and the fixed menu.
    pub fn new() -> Self {
        Self {
            time: 0,
            order: Vec::new(),
            lanes: HashMap::new(),
            cursor: 0,
            menu: MENU
                .iter()
                .map(|(name, minutes)| (name.to_string(), *minutes))
                .collect(),
            notices: Vec::new(),
        }
    }

    pub fn time(&self) -> Minutes {
        self.time
    }

    /// Queue ids in creation (and rotation) order.
    pub fn queue_ids(&self) -> &[QueueId] {
        &self.order
    }

    /// Copy of the menu; callers cannot reach the scheduler's own table.
    pub fn menu(&self) -> BTreeMap<String, Minutes> {
        self.menu.clone()
    }

    /// The queue the next turn will visit.
    pub fn next_queue(&self) -> Option<&str> {
        self.order.get(self.cursor).map(String::as_str)
    }

    /// Drain the customer-facing messages produced since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn create_queue(
        &mut self,
        queue_id: &str,
        capacity: i64,
    ) -> Result<Vec<String>, SchedulerError> {
        if !self.lanes.contains_key(queue_id) {
            let queue = BoundedQueue::new(capacity)?;
            self.lanes.insert(
                queue_id.to_string(),
                Lane {
                    queue,
                    next_seq: 1,
                    skip_pending: false,
                },
            );
            self.order.push(queue_id.to_string());
            log_dev!("[CREATE] queue={queue_id} capacity={capacity}");
        } else {
            log_dev!("[CREATE] queue={queue_id} already exists, keeping it");
        }
        Ok(vec![format!(
            "time={} event=create queue={queue_id}",
            self.time
        )])
    }

    pub fn enqueue(&mut self, queue_id: &str, item: &str) -> Vec<String> {
        let Some(&burst) = self.menu.get(item) else {
            self.notices.push(NOTICE_UNKNOWN_ITEM.to_string());
            return vec![format!(
                "time={} event=reject queue={queue_id} reason=unknown_item",
                self.time
            )];
        };
        let Some(lane) = self.lanes.get_mut(queue_id) else {
            return vec![format!("time={} event=error reason=unknown_queue", self.time)];
        };

        // The id is reserved only once the task is actually queued.
        let id = task_id(queue_id, lane.next_seq);
        if lane.queue.enqueue(Task::new(id.clone(), burst)).is_err() {
            self.notices.push(NOTICE_FULL.to_string());
            return vec![format!(
                "time={} event=reject queue={queue_id} task={id} reason=full",
                self.time
            )];
        }
        lane.next_seq += 1;
        vec![format!(
            "time={} event=enqueue queue={queue_id} task={id} remaining={burst}",
            self.time
        )]
    }

    pub fn mark_skip(&mut self, queue_id: &str) -> Vec<String> {
        match self.lanes.get_mut(queue_id) {
            Some(lane) => {
                lane.skip_pending = true;
                vec![format!("time={} event=skip queue={queue_id}", self.time)]
            }
            None => vec![format!("time={} event=error reason=unknown_queue", self.time)],
        }
    }

    /// Run `steps` turns, or until every queue is drained with no skip pending.
    ///
    /// A display snapshot follows every turn. Without `steps` a workload that
    /// keeps refilling would never drain; the scheduler itself never refills,
    /// so with a positive quantum the loop always ends.
    pub fn run(&mut self, quantum: i64, steps: Option<i64>) -> Result<Vec<String>, SchedulerError> {
        let queue_count = self.order.len();
        if queue_count == 0 {
            return Ok(Vec::new());
        }
        if let Some(steps) = steps {
            if steps < 1 || steps > queue_count as i64 {
                return Ok(vec![format!(
                    "time={} event=error reason=invalid_steps",
                    self.time
                )]);
            }
        }
        if quantum <= 0 {
            return Err(SchedulerError::NonPositiveQuantum(quantum));
        }
        let quantum = quantum as Minutes;

        let mut logs = Vec::new();
        let mut turns = 0i64;
        loop {
            self.turn(quantum, &mut logs);
            turns += 1;
            let done = match steps {
                Some(steps) => turns >= steps,
                None => self.is_idle(),
            };
            if done {
                break;
            }
        }
        log_dev!("[RUN] quantum={quantum} turns={turns} time={}", self.time);
        Ok(logs)
    }

    /// Read-only snapshot of the clock, rotation, menu, and every queue.
    pub fn display(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.order.len() + 2);
        lines.push(format!(
            "display time={} next={}",
            self.time,
            self.next_queue().unwrap_or("none")
        ));
        let menu = self
            .menu
            .iter()
            .map(|(name, minutes)| format!("{name}:{minutes}"))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(format!("display menu=[{menu}]"));

        for queue_id in &self.order {
            let lane = &self.lanes[queue_id];
            let skip = if lane.skip_pending { " [ skip]" } else { "" };
            let tasks = lane
                .queue
                .iter()
                .map(|task| format!("{}:{}", task.id, task.remaining))
                .collect::<Vec<_>>()
                .join(",");
            lines.push(format!(
                "display {queue_id} [{}/{}]{skip} -> [{tasks}]",
                lane.queue.len(),
                lane.queue.capacity()
            ));
        }
        lines
    }

    fn turn(&mut self, quantum: Minutes, logs: &mut Vec<String>) {
        let queue_id = self.order[self.cursor].clone();
        logs.push(format!("time={} event=run queue={queue_id}", self.time));

        match self.service(&queue_id, quantum) {
            TurnOutcome::Skipped => log_dev!("[TURN] queue={queue_id} skipped"),
            TurnOutcome::Idle => {}
            TurnOutcome::Worked { task, remaining } => logs.push(format!(
                "time={} event=work queue={queue_id} task={task} remaining={remaining}",
                self.time
            )),
            TurnOutcome::Finished { task } => logs.push(format!(
                "time={} event=finish queue={queue_id} task={task}",
                self.time
            )),
        }

        self.cursor = (self.cursor + 1) % self.order.len();
        logs.extend(self.display());
    }

    fn service(&mut self, queue_id: &str, quantum: Minutes) -> TurnOutcome {
        let Some(lane) = self.lanes.get_mut(queue_id) else {
            return TurnOutcome::Idle;
        };
        // A pending skip wins even over a non-empty queue.
        if lane.skip_pending {
            lane.skip_pending = false;
            return TurnOutcome::Skipped;
        }
        let Some(task) = lane.queue.front_mut() else {
            return TurnOutcome::Idle;
        };

        // Work happens on the head in place; it only leaves the queue when drained.
        let slice = task.remaining.min(quantum);
        task.remaining -= slice;
        let (id, remaining) = (task.id.clone(), task.remaining);
        self.time += slice;
        if remaining == 0 {
            lane.queue.dequeue();
            return TurnOutcome::Finished { task: id };
        }
        lane.queue.rotate();
        TurnOutcome::Worked {
            task: id,
            remaining,
        }
    }

    fn is_idle(&self) -> bool {
        self.lanes
            .values()
            .all(|lane| lane.queue.is_empty() && !lane.skip_pending)
    }
}
