mod cli;
mod error;
mod logging;
mod scheduler;
mod sim;
mod task_queue;
mod types;

use std::io;

fn parse_list<T: std::str::FromStr>(arg: &str) -> Option<Vec<T>> {
    if arg == "-" {
        return None;
    }
    let mut values = Vec::new();
    for part in arg.split(',') {
        if part.trim().is_empty() {
            return None;
        }
        let value = part.trim().parse::<T>().ok()?;
        values.push(value);
    }
    Some(values)
}

fn print_usage(program: &str) {
    println!("Cafe round-robin scheduler");
    println!("Usage:");
    println!("  {program} (interactive session on stdin)");
    println!("  {program} demo");
    println!("  {program} bench [queues] [tasks_per_queue] [quantum]");
    println!("  {program} stress [queue_sets] [task_sets] [quantum_sets]");
    println!("  {program} --help");
    println!();
    println!("Session commands: CREATE <queue> <capacity> | ENQ <queue> <item> | SKIP <queue>");
    println!("                  RUN <quantum> [steps] | DISPLAY; a blank line ends the session.");
    println!("Sets are comma-separated lists (e.g., 1,2,4). Use \"-\" to keep a default set.");
    println!("Defaults:");
    println!("  bench  queues=4 tasks_per_queue=25 quantum=2");
    println!("  stress queues=1,2,4,8 tasks_per_queue=10,50 quantum=1,2,4");
}

fn exit_with_usage(program: &str, message: &str) -> ! {
    eprintln!("{message}");
    print_usage(program);
    std::process::exit(2);
}

fn exit_on_io(result: io::Result<()>) {
    if let Err(err) = result {
        eprintln!("io error: {err}");
        std::process::exit(1);
    }
}

/// Parse an optional positional set; `-` keeps the default.
fn stress_set<T: std::str::FromStr>(program: &str, name: &str, arg: Option<String>) -> Option<Vec<T>> {
    let arg = arg?;
    if arg == "-" {
        return None;
    }
    match parse_list(&arg) {
        Some(values) => Some(values),
        None => exit_with_usage(program, &format!("stress: invalid {name} value: {arg}")),
    }
}

fn bench_arg<T: std::str::FromStr>(program: &str, name: &str, arg: Option<String>) -> Option<T> {
    let arg = arg?;
    match arg.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => exit_with_usage(program, &format!("bench: invalid {name} value: {arg}")),
    }
}

fn main() {
    let program = std::env::args()
        .next()
        .unwrap_or_else(|| "cafe_rr".to_string());
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("bench") => {
            let queues = bench_arg(&program, "queues", args.next());
            let tasks_per_queue = bench_arg(&program, "tasks_per_queue", args.next());
            let quantum = bench_arg(&program, "quantum", args.next());
            if let Some(extra) = args.next() {
                exit_with_usage(&program, &format!("bench: unexpected argument: {extra}"));
            }
            sim::run_benchmark(queues, tasks_per_queue, quantum);
        }
        Some("stress") => {
            let queue_sets = stress_set(&program, "queue_sets", args.next());
            let task_sets = stress_set(&program, "task_sets", args.next());
            let quantum_sets = stress_set(&program, "quantum_sets", args.next());
            if let Some(extra) = args.next() {
                exit_with_usage(&program, &format!("stress: unexpected argument: {extra}"));
            }
            sim::run_stress(queue_sets, task_sets, quantum_sets);
        }
        Some("demo") => exit_on_io(sim::run_demo()),
        Some("--help") | Some("-h") | Some("help") => print_usage(&program),
        Some(other) => {
            exit_with_usage(&program, &format!("unknown command: {other}"));
        }
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            exit_on_io(cli::run_session(stdin.lock(), stdout.lock()));
        }
    }
}
