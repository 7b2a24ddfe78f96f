use crate::process::Process;
use crate::schedulers::{CpuTime, Scheduler};
use std::io::{self, Write};

/// Means of the per-process metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Averages {
    pub waiting_time: f64,
    pub turnaround_time: f64,
    /// Over the processes that were dispatched at least once.
    pub response_time: f64,
}

impl Averages {
    pub fn of(processes: &[Process]) -> Averages {
        let n = processes.len().max(1) as f64;
        let responses: Vec<u64> = processes
            .iter()
            .filter_map(|p| p.metrics().response_time)
            .collect();

        Averages {
            waiting_time: processes
                .iter()
                .fold(0.0, |acc, p| acc + p.metrics().waiting_time as f64)
                / n,
            turnaround_time: processes
                .iter()
                .fold(0.0, |acc, p| acc + p.metrics().turnaround_time as f64)
                / n,
            response_time: responses.iter().sum::<u64>() as f64
                / responses.len().max(1) as f64,
        }
    }
}

pub fn write_summary<W: Write>(
    out: &mut W,
    name: &str,
    cpu: CpuTime,
    processes: &[Process],
) -> io::Result<()> {
    writeln!(out, "Scheduler: {}", name)?;
    writeln!(out, "CPU Utilization: {:.2}%", cpu.utilization())?;

    writeln!(out, "Proc\tTw\tTt\tTr")?;
    for p in processes {
        let m = p.metrics();
        let response = match m.response_time {
            Some(r) => r.to_string(),
            None => "-".to_string(),
        };
        writeln!(
            out,
            "P{}\t{}\t{}\t{}",
            p.id() + 1,
            m.waiting_time,
            m.turnaround_time,
            response
        )?;
    }

    let avg = Averages::of(processes);
    writeln!(
        out,
        "Avg\t{:.2}\t{:.2}\t{:.2}",
        avg.waiting_time, avg.turnaround_time, avg.response_time
    )
}

pub fn print_summary(scheduler: &dyn Scheduler) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_summary(
        &mut out,
        scheduler.name(),
        scheduler.cpu_time(),
        scheduler.processes(),
    )
}
