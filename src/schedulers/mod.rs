use crate::process::Process;
use anyhow::{bail, Context};
use regex::Regex;
use std::str::FromStr;

mod fcfs;
mod mlfq;

pub use fcfs::Fcfs;
pub use mlfq::{Mlfq, MlfqConfig};

/// CPU occupancy counters of one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTime {
    pub total: u64,
    pub busy: u64,
}

impl CpuTime {
    pub fn idle(&self) -> u64 {
        self.total - self.busy
    }

    /// Busy share of all ticks, in percent.
    pub fn utilization(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.busy as f64 / self.total as f64 * 100.0
    }

    pub(crate) fn record(&mut self, busy: bool) {
        self.total += 1;
        if busy {
            self.busy += 1;
        }
    }
}

/// A scheduling policy driving a fixed set of processes one tick at a time.
///
/// Implementors make every scheduling decision for a tick first, then advance
/// each process once (in id order), reacting to its `TickEvent` immediately.
pub trait Scheduler {
    fn name(&self) -> &'static str;

    /// Simulates one time unit. Returns `true` once every process is done.
    fn tick(&mut self) -> bool;

    fn processes(&self) -> &[Process];

    fn cpu_time(&self) -> CpuTime;

    fn is_finished(&self) -> bool {
        self.processes().iter().all(Process::is_done)
    }

    fn run(&mut self) {
        while !self.tick() {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fcfs,
    Mlfq(MlfqConfig),
}

impl FromStr for Policy {
    type Err = anyhow::Error;

    /// Accepts `F`, `M` or `M<q0>:<q1>`.
    fn from_str(spec: &str) -> anyhow::Result<Policy> {
        let re = Regex::new(r"^(F|M(?:(\d+):(\d+))?)$").expect("valid scheduler pattern");
        let caps = match re.captures(spec) {
            Some(caps) => caps,
            None => bail!(
                "Invalid scheduler specification: {}. Must be one of F, M or M<num>:<num>",
                spec
            ),
        };

        if &caps[1] == "F" {
            return Ok(Policy::Fcfs);
        }
        let mut config = MlfqConfig::default();
        if let (Some(q0), Some(q1)) = (caps.get(2), caps.get(3)) {
            for (slot, q) in config.quanta.iter_mut().zip([q0, q1]) {
                *slot = q
                    .as_str()
                    .parse()
                    .with_context(|| format!("quantum {} out of range", q.as_str()))?;
                if *slot == 0 {
                    bail!("quantum must be positive in {}", spec);
                }
            }
        }
        Ok(Policy::Mlfq(config))
    }
}

// Schedulers index the process table by pid.
fn check_ids(processes: &[Process]) {
    for (idx, p) in processes.iter().enumerate() {
        assert_eq!(p.id(), idx, "process table out of order");
    }
}

/// Builds the scheduler for `policy` over `processes`.
pub fn build(policy: Policy, processes: Vec<Process>) -> Box<dyn Scheduler> {
    match policy {
        Policy::Fcfs => Box::new(Fcfs::new(processes)),
        Policy::Mlfq(config) => Box::new(Mlfq::new(processes, config)),
    }
}
