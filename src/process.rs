/// Index of a process in the scheduler's process table.
pub type Pid = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Ready,
    Running,
    WaitingIo,
    Done,
}

/// What happened to a process during a single tick.
///
/// The owning scheduler interprets the event right after ticking the process,
/// before any other process advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// No mode change.
    Unchanged,
    /// I/O completed, the process wants the CPU again.
    BecameReady,
    /// Burst completed and the process now waits for I/O.
    WentToIo,
    /// Last burst completed.
    Finished,
    /// The process was already done; nothing was counted.
    AlreadyDone,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Ticks spent in `Ready`.
    pub waiting_time: u64,
    /// Ticks spent in any mode other than `Done`.
    pub turnaround_time: u64,
    /// Turnaround time at the first dispatch.
    pub response_time: Option<u64>,
    /// Ticks spent in `Running`.
    pub cpu_time: u64,
    /// Ticks spent in `WaitingIo`.
    pub io_time: u64,
}

#[derive(Debug, Clone)]
pub struct Process {
    id: Pid,
    bursts: Vec<u32>,
    io: Vec<u32>,
    burst_idx: usize,
    io_idx: usize,
    mode: Mode,
    metrics: Metrics,
}

impl Process {
    /// Builds a process from an interleaved `burst, io, burst, ...` sequence.
    pub fn new(id: Pid, times: &[u32]) -> Process {
        assert!(!times.is_empty(), "P{}: empty workload", id);
        assert!(
            times.iter().all(|&t| t > 0),
            "P{}: durations must be positive",
            id
        );

        Process {
            id,
            bursts: times.iter().step_by(2).copied().collect(),
            io: times.iter().skip(1).step_by(2).copied().collect(),
            burst_idx: 0,
            io_idx: 0,
            mode: Mode::Ready,
            metrics: Metrics::default(),
        }
    }

    pub fn id(&self) -> Pid {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn is_done(&self) -> bool {
        self.mode == Mode::Done
    }

    pub fn burst_count(&self) -> usize {
        self.bursts.len()
    }

    /// Ticks left in the current burst, `None` once every burst has run.
    pub fn remaining_burst(&self) -> Option<u32> {
        self.bursts.get(self.burst_idx).copied()
    }

    /// Advances the process by one time unit.
    pub fn tick(&mut self) -> TickEvent {
        if self.mode == Mode::Done {
            return TickEvent::AlreadyDone;
        }

        self.metrics.turnaround_time += 1;
        match self.mode {
            Mode::Ready => {
                self.metrics.waiting_time += 1;
                TickEvent::Unchanged
            }
            Mode::Running => {
                self.metrics.cpu_time += 1;
                let left = &mut self.bursts[self.burst_idx];
                *left -= 1;
                if *left > 0 {
                    return TickEvent::Unchanged;
                }

                self.burst_idx += 1;
                if self.burst_idx == self.bursts.len() {
                    self.mode = Mode::Done;
                    TickEvent::Finished
                } else {
                    self.mode = Mode::WaitingIo;
                    TickEvent::WentToIo
                }
            }
            Mode::WaitingIo => {
                self.metrics.io_time += 1;
                let left = &mut self.io[self.io_idx];
                *left -= 1;
                if *left > 0 {
                    return TickEvent::Unchanged;
                }

                self.io_idx += 1;
                self.mode = Mode::Ready;
                TickEvent::BecameReady
            }
            Mode::Done => unreachable!(),
        }
    }

    pub fn schedule_on_cpu(&mut self) {
        assert_eq!(
            self.mode,
            Mode::Ready,
            "P{}: scheduled while not ready",
            self.id
        );
        self.mode = Mode::Running;
        if self.metrics.response_time.is_none() {
            self.metrics.response_time = Some(self.metrics.turnaround_time);
        }
    }

    /// Takes the process off the CPU without touching its counters (preemption).
    pub fn deschedule_from_cpu(&mut self) {
        assert_eq!(
            self.mode,
            Mode::Running,
            "P{}: descheduled while not running",
            self.id
        );
        self.mode = Mode::Ready;
    }
}
