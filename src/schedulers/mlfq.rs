use super::{CpuTime, Scheduler};
use crate::process::{Pid, Process, TickEvent};
use crate::queues::{ReadyQueue, RoundRobinQueue};
use log::{debug, trace};

/// Number of priority levels. Every level but the last is round-robin.
const LEVELS: usize = 3;
const LOWEST: usize = LEVELS - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MlfqConfig {
    /// Quantum of each round-robin level, highest priority first.
    pub quanta: [u32; LOWEST],
}

impl Default for MlfqConfig {
    fn default() -> Self {
        MlfqConfig { quanta: [5, 10] }
    }
}

/// Multilevel feedback queue: two round-robin levels over a FCFS level.
///
/// Processes start at level 0 and are demoted one level each time they use
/// up a quantum. They are never promoted. A ready process on a higher level
/// preempts whatever runs on a lower one at the start of the next tick.
pub struct Mlfq {
    processes: Vec<Process>,
    rr_queues: [RoundRobinQueue; LOWEST],
    fcfs_queue: ReadyQueue,
    priorities: Vec<usize>,
    cpu: Option<Pid>,
    cpu_time: CpuTime,
    done: usize,
}

impl Mlfq {
    pub fn new(processes: Vec<Process>, config: MlfqConfig) -> Self {
        assert!(!processes.is_empty(), "no processes to schedule");
        super::check_ids(&processes);
        let all = processes.iter().map(Process::id).collect();
        let [q0, q1] = config.quanta;
        Mlfq {
            priorities: vec![0; processes.len()],
            processes,
            rr_queues: [
                RoundRobinQueue::with_members(all, q0),
                RoundRobinQueue::new(q1),
            ],
            fcfs_queue: ReadyQueue::new(),
            cpu: None,
            cpu_time: CpuTime::default(),
            done: 0,
        }
    }

    /// Process currently holding the CPU.
    pub fn running(&self) -> Option<Pid> {
        self.cpu
    }

    /// Current level of `pid`, 0 being the highest.
    pub fn priority(&self, pid: Pid) -> usize {
        self.priorities[pid]
    }

    pub fn rr_queue(&self, level: usize) -> &RoundRobinQueue {
        &self.rr_queues[level]
    }

    pub fn fcfs_queue(&self) -> &ReadyQueue {
        &self.fcfs_queue
    }

    fn schedule(&mut self, pid: Pid, now: u64) {
        trace!("{}: P{} dispatched from level {}", now, pid, self.priorities[pid]);
        self.processes[pid].schedule_on_cpu();
        self.cpu = Some(pid);
    }

    fn preempt(&mut self, pid: Pid, now: u64) {
        debug!("{}: P{} preempted at level {}", now, pid, self.priorities[pid]);
        self.processes[pid].deschedule_from_cpu();
        match self.priorities[pid] {
            LOWEST => self.fcfs_queue.push(pid),
            level => self.rr_queues[level].deactivate(),
        }
        self.cpu = None;
    }

    fn demote(&mut self, pid: Pid, now: u64) {
        assert_eq!(self.cpu, Some(pid), "P{} demoted off the CPU", pid);
        self.priorities[pid] += 1;
        let level = self.priorities[pid];
        debug!("{}: P{} demoted to level {}", now, pid, level);
        if level == LOWEST {
            self.fcfs_queue.push(pid);
        } else {
            self.rr_queues[level].add_process(pid);
        }
        self.processes[pid].deschedule_from_cpu();
        self.cpu = None;
    }

    // Decides who runs this tick, strictly by level.
    fn dispatch(&mut self, now: u64) {
        if self.cpu.map_or(true, |pid| self.priorities[pid] > 0)
            && self.rr_queues[0].activate(&self.processes)
        {
            if let Some(prev) = self.cpu {
                self.preempt(prev, now);
            }
            // Level 1 may have picked a runner that never got the CPU.
            self.rr_queues[1].deactivate();
            let next = self.rr_queues[0]
                .running()
                .expect("active level 0 without a runner");
            self.schedule(next, now);
        }

        if self.cpu.map_or(true, |pid| self.priorities[pid] > 1)
            && self.rr_queues[1].activate(&self.processes)
        {
            if let Some(prev) = self.cpu {
                self.preempt(prev, now);
            }
            let next = self.rr_queues[1]
                .running()
                .expect("active level 1 without a runner");
            self.schedule(next, now);
        }

        if self.cpu.is_none() {
            if let Some(pid) = self.fcfs_queue.pop() {
                self.schedule(pid, now);
            }
        }
    }

    fn process_ready(&mut self, pid: Pid) {
        match self.priorities[pid] {
            LOWEST => self.fcfs_queue.push(pid),
            // round-robin members keep their slot while blocked
            level => debug_assert!(self.rr_queues[level].contains(pid)),
        }
    }

    fn process_done(&mut self, pid: Pid) {
        assert_eq!(self.cpu, Some(pid), "P{} finished off the CPU", pid);
        self.done += 1;
        self.cpu = None;

        let level = self.priorities[pid];
        if level < LOWEST {
            self.rr_queues[level].process_done(pid, &self.processes);
        }
    }

    fn process_io(&mut self, pid: Pid) {
        assert_eq!(self.cpu, Some(pid), "P{} blocked off the CPU", pid);
        self.cpu = None;

        let level = self.priorities[pid];
        if level < LOWEST {
            self.rr_queues[level].process_io(pid, &self.processes);
        }
    }
}

impl Scheduler for Mlfq {
    fn name(&self) -> &'static str {
        "MLFQ"
    }

    fn tick(&mut self) -> bool {
        if self.done == self.processes.len() {
            return true;
        }
        let now = self.cpu_time.total;

        self.dispatch(now);
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

        // Quantum bookkeeping runs after every process has advanced.
        for level in 0..LOWEST {
            if !self.rr_queues[level].tick(&self.processes) {
                let pid = self.rr_queues[level]
                    .last_removed()
                    .expect("expired quantum without an evicted process");
                self.demote(pid, now);
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

    fn mlfq(workload: &[&[u32]]) -> Mlfq {
        let procs = workload
            .iter()
            .enumerate()
            .map(|(id, times)| Process::new(id, times))
            .collect();
        Mlfq::new(procs, MlfqConfig::default())
    }

    #[test]
    fn starts_everyone_at_level_zero() {
        let s = mlfq(&[&[1], &[1], &[1]]);
        assert_eq!(s.rr_queue(0).members(), &[0, 1, 2]);
        assert_eq!(s.rr_queue(0).quantum(), 5);
        assert_eq!(s.rr_queue(1).quantum(), 10);
        assert!(s.rr_queue(1).is_empty());
        assert!((0..3).all(|pid| s.priority(pid) == 0));
    }

    #[test]
    fn long_burst_demoted_once() {
        let mut s = mlfq(&[&[12]]);
        for _ in 0..5 {
            s.tick();
        }
        assert_eq!(s.priority(0), 1);
        assert_eq!(s.running(), None);
        assert_eq!(s.rr_queue(1).members(), &[0]);

        s.run();
        let m = s.processes()[0].metrics();
        assert_eq!(s.priority(0), 1);
        assert_eq!(m.turnaround_time, 12);
        assert_eq!(m.waiting_time, 0);
        assert_eq!(s.cpu_time(), CpuTime { total: 12, busy: 12 });
    }

    #[test]
    fn falls_through_to_fcfs_level() {
        let mut s = mlfq(&[&[20]]);
        for _ in 0..15 {
            s.tick();
        }
        assert_eq!(s.priority(0), LOWEST);
        assert_eq!(s.fcfs_queue().len(), 1);
        assert_eq!(s.processes()[0].remaining_burst(), Some(5));

        s.run();
        assert_eq!(s.cpu_time().total, 20);
        assert!(s.fcfs_queue().is_empty());
    }

    #[test]
    fn io_return_keeps_level() {
        let mut s = mlfq(&[&[7, 2, 1]]);
        s.run();
        assert_eq!(s.priority(0), 1);
        let m = s.processes()[0].metrics();
        assert_eq!(m.turnaround_time, 10);
        assert_eq!(m.io_time, 2);
        assert_eq!(m.cpu_time, 8);
        assert_eq!(s.cpu_time(), CpuTime { total: 10, busy: 8 });
    }

    #[test]
    fn runner_leaving_for_io_hands_over_within_level() {
        let mut s = mlfq(&[&[1, 3, 1], &[2]]);
        s.tick();
        assert_eq!(s.running(), None);
        assert_eq!(s.rr_queue(0).running(), Some(1));

        s.tick();
        assert_eq!(s.running(), Some(1));
        assert_eq!(s.processes()[1].metrics().response_time, Some(1));
    }

    #[test]
    fn level_zero_takeover_deactivates_level_one() {
        // P0 and P1 sink to level 1, P2 stays at level 0
        let mut s = mlfq(&[&[7, 1, 1], &[8], &[2, 2, 2]]);
        for _ in 0..14 {
            s.tick();
        }
        // P0 blocked on this tick, so level 1 picked P1 without dispatching it
        assert_eq!(s.priority(0), 1);
        assert_eq!(s.priority(1), 1);
        assert_eq!(s.running(), None);
        assert!(s.rr_queue(1).is_active());
        assert_eq!(s.rr_queue(1).running(), Some(1));

        s.tick();
        assert_eq!(s.running(), Some(2));
        assert!(!s.rr_queue(1).is_active());
        assert_eq!(s.rr_queue(1).running(), None);
        assert_eq!(s.processes()[1].mode(), crate::process::Mode::Ready);
    }
}
