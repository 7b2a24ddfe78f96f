use super::{CpuTime, Scheduler};
use crate::process::{Pid, Process, TickEvent};
use crate::queues::ReadyQueue;
use log::trace;

/// Non-preemptive first-come-first-served scheduler.
pub struct Fcfs {
    processes: Vec<Process>,
    queue: ReadyQueue,
    cpu: Option<Pid>,
    cpu_time: CpuTime,
    done: usize,
}

impl Fcfs {
    pub fn new(processes: Vec<Process>) -> Self {
        assert!(!processes.is_empty(), "no processes to schedule");
        super::check_ids(&processes);
        let queue = processes.iter().map(Process::id).collect();
        Fcfs {
            processes,
            queue,
            cpu: None,
            cpu_time: CpuTime::default(),
            done: 0,
        }
    }

    /// Process currently holding the CPU.
    pub fn running(&self) -> Option<Pid> {
        self.cpu
    }

    fn process_ready(&mut self, pid: Pid) {
        self.queue.push(pid);
    }

    fn process_done(&mut self, pid: Pid) {
        assert_eq!(self.cpu, Some(pid), "P{} finished off the CPU", pid);
        self.done += 1;
        self.cpu = None;
    }

    fn process_io(&mut self, pid: Pid) {
        assert_eq!(self.cpu, Some(pid), "P{} blocked off the CPU", pid);
        self.cpu = None;
    }
}

impl Scheduler for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn tick(&mut self) -> bool {
        if self.done == self.processes.len() {
            return true;
        }
        let now = self.cpu_time.total;

        if self.cpu.is_none() {
            if let Some(pid) = self.queue.pop() {
                trace!("{}: P{} dispatched", now, pid);
                self.processes[pid].schedule_on_cpu();
                self.cpu = Some(pid);
            }
        }
        self.cpu_time.record(self.cpu.is_some());

        for pid in 0..self.processes.len() {
            match self.processes[pid].tick() {
                TickEvent::BecameReady => {
                    trace!("{}: P{} ready", now, pid);
                    self.process_ready(pid);
                }
                TickEvent::WentToIo => {
                    trace!("{}: P{} waits for I/O", now, pid);
                    self.process_io(pid);
                }
                TickEvent::Finished => {
                    trace!("{}: P{} done", now, pid);
                    self.process_done(pid);
                }
                TickEvent::Unchanged | TickEvent::AlreadyDone => {}
            }
        }

        self.done == self.processes.len()
    }

    fn processes(&self) -> &[Process] {
        &self.processes
    }

    fn cpu_time(&self) -> CpuTime {
        self.cpu_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fcfs(workload: &[&[u32]]) -> Fcfs {
        let procs = workload
            .iter()
            .enumerate()
            .map(|(id, times)| Process::new(id, times))
            .collect();
        Fcfs::new(procs)
    }

    #[test]
    fn first_process_dispatched_on_first_tick() {
        let mut s = fcfs(&[&[2], &[2]]);
        assert_eq!(s.running(), None);
        s.tick();
        assert_eq!(s.running(), Some(0));
        assert_eq!(s.processes()[0].metrics().response_time, Some(0));
    }

    #[test]
    fn io_return_joins_tail() {
        // P0 blocks for longer than P1, so P1 comes back first
        let mut s = fcfs(&[&[1, 5, 1], &[1, 1, 1]]);
        s.run();

        let p0 = s.processes()[0].metrics();
        let p1 = s.processes()[1].metrics();
        assert_eq!(p1.turnaround_time, 4);
        assert_eq!(p1.waiting_time, 1);
        assert_eq!(p1.response_time, Some(1));
        assert_eq!(p0.turnaround_time, 7);
        assert_eq!(p0.waiting_time, 0);
        assert_eq!(s.cpu_time(), CpuTime { total: 7, busy: 4 });
    }

    #[test]
    fn tick_after_completion_is_noop() {
        let mut s = fcfs(&[&[1]]);
        assert!(s.tick());
        assert!(s.tick());
        assert_eq!(s.cpu_time().total, 1);
    }

    #[test]
    #[should_panic(expected = "no processes")]
    fn empty_workload_panics() {
        Fcfs::new(Vec::new());
    }
}
