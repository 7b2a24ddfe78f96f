use crate::process::{Mode, Pid, Process};
use log::trace;
use std::collections::VecDeque;

/// Plain first-come-first-served queue of process ids.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    queue: VecDeque<Pid>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        ReadyQueue {
            queue: VecDeque::new(),
        }
    }

    pub fn push(&mut self, pid: Pid) {
        self.queue.push_back(pid);
    }

    pub fn pop(&mut self) -> Option<Pid> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.queue.contains(&pid)
    }
}

impl FromIterator<Pid> for ReadyQueue {
    fn from_iter<I: IntoIterator<Item = Pid>>(iter: I) -> Self {
        ReadyQueue {
            queue: iter.into_iter().collect(),
        }
    }
}

/// Round-robin queue for one MLFQ level.
///
/// Members stay in the queue while they wait for I/O; they only leave when
/// they finish or exhaust a quantum. Being active means the queue owns the CPU
/// and `running` is the member it hands to the scheduler.
#[derive(Debug)]
pub struct RoundRobinQueue {
    members: Vec<Pid>,
    cursor: usize,
    quantum: u32,
    elapsed: u32,
    active: bool,
    running: Option<Pid>,
    last_removed: Option<Pid>,
}

impl RoundRobinQueue {
    pub fn new(quantum: u32) -> Self {
        Self::with_members(Vec::new(), quantum)
    }

    pub fn with_members(members: Vec<Pid>, quantum: u32) -> Self {
        assert!(quantum > 0, "quantum must be positive");
        RoundRobinQueue {
            members,
            cursor: 0,
            quantum,
            elapsed: 0,
            active: false,
            running: None,
            last_removed: None,
        }
    }

    pub fn quantum(&self) -> u32 {
        self.quantum
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.members.contains(&pid)
    }

    pub fn members(&self) -> &[Pid] {
        &self.members
    }

    /// Member currently selected to hold the CPU.
    pub fn running(&self) -> Option<Pid> {
        self.running
    }

    /// Member evicted by the last quantum expiry.
    pub fn last_removed(&self) -> Option<Pid> {
        self.last_removed
    }

    pub fn add_process(&mut self, pid: Pid) {
        self.members.push(pid);
    }

    /// Scans circularly from the cursor for a ready member. If one full
    /// rotation finds nothing the queue goes inactive.
    pub fn find_next_ready(&mut self, procs: &[Process]) {
        if !self.active {
            return;
        }
        assert!(!self.members.is_empty(), "active round-robin queue is empty");

        for _ in 0..self.members.len() {
            let pid = self.members[self.cursor];
            if procs[pid].mode() == Mode::Ready {
                self.running = Some(pid);
                return;
            }
            self.cursor = (self.cursor + 1) % self.members.len();
        }

        self.deactivate();
    }

    /// Tries to take the CPU. Returns whether the queue is now active.
    pub fn activate(&mut self, procs: &[Process]) -> bool {
        if self.members.is_empty() {
            return false;
        }
        if self.active {
            return true;
        }
        self.active = true;
        self.find_next_ready(procs);
        self.active
    }

    /// Gives up the CPU. The slot counter is kept so a preempted member
    /// resumes the rest of its slot.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.running = None;
    }

    /// The running member left for I/O; it keeps its place in the rotation.
    pub fn process_io(&mut self, pid: Pid, procs: &[Process]) {
        assert_eq!(self.running, Some(pid), "P{} is not the queue's runner", pid);
        self.elapsed = 0;
        self.find_next_ready(procs);
    }

    /// The running member finished and leaves the queue.
    pub fn process_done(&mut self, pid: Pid, procs: &[Process]) {
        assert_eq!(self.running, Some(pid), "P{} is not the queue's runner", pid);
        self.elapsed = 0;
        self.remove_at_cursor();
        self.find_next_ready(procs);
    }

    /// Charges one tick to the runner's slot. Returns `false` when the quantum
    /// expired; the evicted member is then available from `last_removed`.
    ///
    /// The slot starts as soon as a runner is picked, even mid-tick, but a
    /// runner is only evicted on a tick it actually spent on the CPU.
    pub fn tick(&mut self, procs: &[Process]) -> bool {
        if !self.active {
            return true;
        }
        let pid = self
            .running
            .expect("active round-robin queue without a runner");

        self.elapsed += 1;
        if self.elapsed < self.quantum || procs[pid].mode() != Mode::Running {
            return true;
        }

        self.elapsed = 0;
        let evicted = self.remove_at_cursor();
        trace!("quantum {} expired for P{}", self.quantum, evicted);
        self.last_removed = Some(evicted);
        self.find_next_ready(procs);
        false
    }

    fn remove_at_cursor(&mut self) -> Pid {
        let pid = self.members.remove(self.cursor);
        debug_assert_eq!(self.running, Some(pid));
        self.running = None;
        if self.cursor == self.members.len() {
            self.cursor = 0;
        }
        if self.members.is_empty() {
            self.active = false;
        }
        pid
    }
}
