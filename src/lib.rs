//! Discrete-time CPU scheduling simulator.
//!
//! A fixed set of processes alternate between CPU bursts and I/O waits while a
//! [`Scheduler`](schedulers::Scheduler) decides, tick by tick, which one holds
//! the single CPU. Two policies are provided: FCFS and a three-level MLFQ.

pub mod process;
pub mod queues;
pub mod report;
pub mod schedulers;
pub mod workload;

pub use process::{Metrics, Mode, Pid, Process, TickEvent};
pub use schedulers::{CpuTime, Fcfs, Mlfq, MlfqConfig, Policy, Scheduler};
