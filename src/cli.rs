//! Line-oriented command reader that drives a [`Scheduler`] session.

use std::io::{self, BufRead, Write};
use std::num::IntErrorKind;

use crate::log_dev;
use crate::scheduler::Scheduler;

pub const FAREWELL: &str = "Break time!";

/// One parsed café command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create { queue: String, capacity: i64 },
    Enqueue { queue: String, item: String },
    Skip { queue: String },
    Run { quantum: i64, steps: Option<i64> },
    Display,
}

/// Rejections decided before the scheduler is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    BadArgs,
    UnknownCommand,
}

impl CommandError {
    /// Log line for the error; time is `?` because no state was read.
    pub fn log_line(self) -> String {
        let reason = match self {
            CommandError::BadArgs => "bad_args",
            CommandError::UnknownCommand => "unknown_command",
        };
        format!("time=? event=error reason={reason}")
    }
}

/// Split a line into an upper-cased command and its raw arguments.
///
/// Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Option<(String, Vec<String>)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let mut tokens = trimmed.split_whitespace();
    let command = tokens.next()?.to_uppercase();
    Some((command, tokens.map(str::to_string).collect()))
}

/// Integers outside `i64` saturate so range checks, not parsing, reject them.
fn parse_int(arg: &str) -> Result<i64, CommandError> {
    match arg.parse::<i64>() {
        Ok(value) => Ok(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(CommandError::BadArgs),
        },
    }
}

impl Command {
    /// Validate arity and numeric arguments for a parsed command.
    pub fn from_parts(command: &str, args: &[String]) -> Result<Self, CommandError> {
        match (command, args) {
            ("CREATE", [queue, capacity]) => Ok(Command::Create {
                queue: queue.clone(),
                capacity: parse_int(capacity)?,
            }),
            ("ENQ", [queue, item]) => Ok(Command::Enqueue {
                queue: queue.clone(),
                item: item.clone(),
            }),
            ("SKIP", [queue]) => Ok(Command::Skip {
                queue: queue.clone(),
            }),
            ("RUN", [quantum]) => Ok(Command::Run {
                quantum: parse_int(quantum)?,
                steps: None,
            }),
            ("RUN", [quantum, steps]) => Ok(Command::Run {
                quantum: parse_int(quantum)?,
                steps: Some(parse_int(steps)?),
            }),
            ("DISPLAY", []) => Ok(Command::Display),
            ("CREATE" | "ENQ" | "SKIP" | "RUN" | "DISPLAY", _) => Err(CommandError::BadArgs),
            _ => Err(CommandError::UnknownCommand),
        }
    }
}

/// Apply a command and collect everything to print: notices first, then logs.
pub fn execute(scheduler: &mut Scheduler, command: Command) -> Vec<String> {
    let result = match command {
        Command::Create { queue, capacity } => scheduler.create_queue(&queue, capacity),
        Command::Enqueue { queue, item } => Ok(scheduler.enqueue(&queue, &item)),
        Command::Skip { queue } => Ok(scheduler.mark_skip(&queue)),
        Command::Run { quantum, steps } => scheduler.run(quantum, steps),
        Command::Display => Ok(scheduler.display()),
    };
    let logs = result.unwrap_or_else(|err| {
        log_dev!("[CLI] domain error: {err}");
        vec![format!(
            "time={} event=error reason={}",
            scheduler.time(),
            err.reason()
        )]
    });
    let mut out = scheduler.take_notices();
    out.extend(logs);
    out
}

/// Read commands until a blank line or end of input, echoing every result.
pub fn run_session<R: BufRead, W: Write>(input: R, mut output: W) -> io::Result<()> {
    let mut scheduler = Scheduler::new();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        let Some((command, args)) = parse_command(&line) else {
            continue;
        };
        let lines = match Command::from_parts(&command, &args) {
            Ok(command) => execute(&mut scheduler, command),
            Err(err) => vec![err.log_line()],
        };
        for line in lines {
            writeln!(output, "{line}")?;
        }
    }
    writeln!(output, "{FAREWELL}")?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        let mut out = Vec::new();
        run_session(input.as_bytes(), &mut out).expect("session io");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn parser_skips_blank_and_comment() {
        assert_eq!(parse_command("   \n"), None);
        assert_eq!(parse_command("# this is a comment"), None);
        assert_eq!(parse_command("   # indented comment"), None);
        assert_eq!(
            parse_command("enq Mobile latte"),
            Some((
                "ENQ".to_string(),
                vec!["Mobile".to_string(), "latte".to_string()]
            ))
        );
    }

    #[test]
    fn arity_and_integer_checks() {
        let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            Command::from_parts("CREATE", &args(&["only_one_arg"])),
            Err(CommandError::BadArgs)
        );
        assert_eq!(
            Command::from_parts("CREATE", &args(&["Q", "not_an_int"])),
            Err(CommandError::BadArgs)
        );
        assert_eq!(
            Command::from_parts("SKIP", &args(&["too", "many", "args"])),
            Err(CommandError::BadArgs)
        );
        assert_eq!(Command::from_parts("RUN", &[]), Err(CommandError::BadArgs));
        assert_eq!(
            Command::from_parts("RUN", &args(&["1", "2", "3"])),
            Err(CommandError::BadArgs)
        );
        assert_eq!(
            Command::from_parts("RUN", &args(&["2", "1"])),
            Ok(Command::Run {
                quantum: 2,
                steps: Some(1)
            })
        );
        assert_eq!(
            Command::from_parts("FLIP", &args(&["something"])),
            Err(CommandError::UnknownCommand)
        );
    }

    #[test]
    fn session_prints_logs_display_and_farewell() {
        let out = session("CREATE Mobile 2\nENQ Mobile latte\nRUN 1\n\nCREATE Late 1\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "time=0 event=create queue=Mobile");
        assert_eq!(
            lines[1],
            "time=0 event=enqueue queue=Mobile task=Mobile-001 remaining=3"
        );
        assert_eq!(lines[2], "time=0 event=run queue=Mobile");
        assert_eq!(
            lines[3],
            "time=1 event=work queue=Mobile task=Mobile-001 remaining=2"
        );
        assert_eq!(lines[4], "display time=1 next=Mobile");
        assert_eq!(lines.last(), Some(&FAREWELL));
        // Nothing after the blank line is processed.
        assert!(!out.contains("queue=Late"));
    }

    #[test]
    fn notices_precede_reject_lines() {
        let out = session("CREATE Z 0\nENQ Z latte\nENQ Z espresso\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "time=0 event=create queue=Z",
                "Sorry, we're at capacity.",
                "time=0 event=reject queue=Z task=Z-001 reason=full",
                "Sorry, we don't serve that.",
                "time=0 event=reject queue=Z reason=unknown_item",
                FAREWELL,
            ]
        );
    }

    #[test]
    fn dispatcher_errors_use_placeholder_time() {
        let out = session("# comment\nFLIP x\nENQ only_one\nRUN not_int\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "time=? event=error reason=unknown_command",
                "time=? event=error reason=bad_args",
                "time=? event=error reason=bad_args",
                FAREWELL,
            ]
        );
    }

    #[test]
    fn domain_errors_are_reported_with_time() {
        let out = session("CREATE Bad -1\nCREATE Q 1\nRUN 0\n");
        assert!(out.contains("time=0 event=error reason=invalid_capacity"));
        assert!(out.contains("time=0 event=error reason=invalid_quantum"));
        assert!(!out.contains("queue=Bad"));
    }

    #[test]
    fn out_of_range_integers_saturate() {
        let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            Command::from_parts("RUN", &args(&["1", "99999999999999999999"])),
            Ok(Command::Run {
                quantum: 1,
                steps: Some(i64::MAX)
            })
        );
        assert_eq!(
            Command::from_parts("RUN", &args(&["-99999999999999999999"])),
            Ok(Command::Run {
                quantum: i64::MIN,
                steps: None
            })
        );
        assert_eq!(
            Command::from_parts("RUN", &args(&["1", "9x"])),
            Err(CommandError::BadArgs)
        );
    }

    #[test]
    fn oversized_values_reach_scheduler_checks() {
        let out = session(
            "CREATE Q 9223372036854775807
CREATE Big 99999999999999999999
CREATE Q 1
RUN 1 99999999999999999999
",
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "time=0 event=error reason=invalid_capacity",
                "time=0 event=error reason=invalid_capacity",
                "time=0 event=create queue=Q",
                "time=0 event=error reason=invalid_steps",
                FAREWELL,
            ]
        );
    }

    #[test]
    fn display_command_prints_snapshot() {
        let out = session("create A 1\ndisplay\n");
        assert!(out.contains("display time=0 next=A"));
        assert!(out.contains("display A [0/1] -> []"));
    }
}
