//! Demo, benchmark, and stress-test runners for the café scheduler.

use std::io;
use std::time::Instant;

use crate::cli;
use crate::log_dev;
use crate::scheduler::Scheduler;

const DEMO_SCRIPT: &str = "\
# two counters, one short on space
CREATE Mobile 3
CREATE WalkIns 1
ENQ Mobile latte
ENQ Mobile tea
ENQ WalkIns mocha
ENQ WalkIns americano
ENQ Mobile espresso
SKIP Mobile
DISPLAY
RUN 2 2
RUN 2
";

const CSV_HEADER: &str =
    "queues,tasks_per_queue,quantum,total_tasks,turns,finished,sim_minutes,elapsed_ms,turns_per_s,cpu_user_s,cpu_sys_s";

/// Best-effort CPU user/system time snapshot (seconds) on Unix platforms.
#[cfg(unix)]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    // SAFETY: rusage is plain data; getrusage only writes into it.
    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
    if rc != 0 {
        return None;
    }
    let user = usage.ru_utime.tv_sec as f64 + (usage.ru_utime.tv_usec as f64 / 1_000_000.0);
    let sys = usage.ru_stime.tv_sec as f64 + (usage.ru_stime.tv_usec as f64 / 1_000_000.0);
    Some((user, sys))
}

/// Stub on non-Unix platforms.
#[cfg(not(unix))]
fn cpu_times_seconds() -> Option<(f64, f64)> {
    None
}

/// Aggregated metrics from a single drain of a synthetic workload.
struct BenchResult {
    queues: usize,
    tasks_per_queue: usize,
    quantum: u64,
    total_tasks: usize,
    turns: usize,
    finished: usize,
    sim_minutes: u64,
    elapsed_ms: f64,
    turns_per_s: f64,
    cpu_user_s: Option<f64>,
    cpu_sys_s: Option<f64>,
}

impl BenchResult {
    fn csv_row(&self) -> String {
        let cpu = |value: Option<f64>| {
            value
                .map(|v| format!("{v:.4}"))
                .unwrap_or_else(|| "NA".to_string())
        };
        format!(
            "{},{},{},{},{},{},{},{:.2},{:.2},{},{}",
            self.queues,
            self.tasks_per_queue,
            self.quantum,
            self.total_tasks,
            self.turns,
            self.finished,
            self.sim_minutes,
            self.elapsed_ms,
            self.turns_per_s,
            cpu(self.cpu_user_s),
            cpu(self.cpu_sys_s)
        )
    }
}

fn benchmark_once(queues: usize, tasks_per_queue: usize, quantum: u64) -> BenchResult {
    debug_assert!(queues > 0, "queues must be > 0");
    debug_assert!(quantum > 0, "quantum must be > 0");
    let mut scheduler = Scheduler::new();
    let items: Vec<String> = scheduler.menu().into_keys().collect();
    let mut total_tasks = 0usize;
    for q in 0..queues {
        let queue_id = format!("Q{q}");
        let created = scheduler.create_queue(&queue_id, tasks_per_queue as i64);
        debug_assert!(created.is_ok(), "bench capacity is never negative");
        for n in 0..tasks_per_queue {
            // Walk the menu so queues carry a mix of burst lengths.
            let item = &items[(q + n) % items.len()];
            let logs = scheduler.enqueue(&queue_id, item);
            if logs.iter().any(|line| line.contains("event=enqueue")) {
                total_tasks += 1;
            }
        }
    }
    debug_assert_eq!(scheduler.queue_ids().len(), queues);
    log_dev!("[BENCH] loaded queues={queues} tasks={total_tasks}");

    let cpu_start = cpu_times_seconds();
    let start = Instant::now();
    let logs = scheduler
        .run(quantum as i64, None)
        .unwrap_or_default();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let turns = logs.iter().filter(|line| line.contains(" event=run ")).count();
    let finished = logs
        .iter()
        .filter(|line| line.contains(" event=finish "))
        .count();
    let turns_per_s = if elapsed_ms > 0.0 {
        turns as f64 / (elapsed_ms / 1000.0)
    } else {
        0.0
    };
    let (cpu_user_s, cpu_sys_s) = match (cpu_start, cpu_times_seconds()) {
        (Some((user_start, sys_start)), Some((user_end, sys_end))) => {
            (Some(user_end - user_start), Some(sys_end - sys_start))
        }
        _ => (None, None),
    };

    BenchResult {
        queues,
        tasks_per_queue,
        quantum,
        total_tasks,
        turns,
        finished,
        sim_minutes: scheduler.time(),
        elapsed_ms,
        turns_per_s,
        cpu_user_s,
        cpu_sys_s,
    }
}

/// Replay the built-in script through the interactive dispatcher.
pub fn run_demo() -> io::Result<()> {
    log_dev!("[DEMO] start");
    let stdout = io::stdout();
    cli::run_session(DEMO_SCRIPT.as_bytes(), stdout.lock())
}

/// Run a single benchmark with optional parameter overrides.
pub fn run_benchmark(queues: Option<usize>, tasks_per_queue: Option<usize>, quantum: Option<u64>) {
    let queues = queues.unwrap_or(4);
    let tasks_per_queue = tasks_per_queue.unwrap_or(25);
    let quantum = quantum.unwrap_or(2);
    if queues == 0 {
        eprintln!("benchmark error: queues must be > 0");
        return;
    }
    if quantum == 0 {
        eprintln!("benchmark error: quantum must be > 0");
        return;
    }
    let result = benchmark_once(queues, tasks_per_queue, quantum);
    println!("{CSV_HEADER}");
    println!("{}", result.csv_row());
    if result.finished != result.total_tasks {
        eprintln!(
            "# violation,unfinished_tasks,{}",
            result.total_tasks - result.finished
        );
    }
}

/// Sweep multiple benchmark configurations and print CSV output.
pub fn run_stress(
    queue_sets: Option<Vec<usize>>,
    task_sets: Option<Vec<usize>>,
    quantum_sets: Option<Vec<u64>>,
) {
    let queue_sets = queue_sets.unwrap_or_else(|| vec![1, 2, 4, 8]);
    let task_sets = task_sets.unwrap_or_else(|| vec![10, 50]);
    let mut quantum_sets = quantum_sets.unwrap_or_else(|| vec![1, 2, 4]);
    if queue_sets.iter().any(|&queues| queues == 0) {
        eprintln!("stress error: queue_sets must be > 0");
        return;
    }
    if quantum_sets.iter().any(|&quantum| quantum == 0) {
        let before = quantum_sets.len();
        quantum_sets.retain(|&quantum| quantum > 0);
        eprintln!(
            "stress warning: ignored {} quantum set(s) <= 0",
            before - quantum_sets.len()
        );
        if quantum_sets.is_empty() {
            eprintln!("stress error: quantum must be > 0");
            return;
        }
    }

    println!("{CSV_HEADER}");
    for queues in queue_sets {
        for tasks_per_queue in task_sets.iter().copied() {
            for quantum in quantum_sets.iter().copied() {
                let result = benchmark_once(queues, tasks_per_queue, quantum);
                println!("{}", result.csv_row());
                if result.finished != result.total_tasks {
                    eprintln!(
                        "# violation,unfinished_tasks,{}",
                        result.total_tasks - result.finished
                    );
                }
            }
        }
    }
}
