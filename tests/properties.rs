use cpusched::schedulers::{self, MlfqConfig, Policy};
use cpusched::workload::{self, Workload};
use cpusched::Mode;
use proptest::prelude::*;

const MAX_TICKS: u64 = 100_000;

fn workloads() -> impl Strategy<Value = Workload> {
    prop::collection::vec(prop::collection::vec(1u32..15, 1..8), 1..6)
}

fn check_run(policy: Policy, workload: &Workload) -> Result<(), TestCaseError> {
    let mut s = schedulers::build(policy, workload::processes(workload));
    let mut responses: Vec<Option<u64>> = vec![None; workload.len()];

    loop {
        let wants_cpu = s
            .processes()
            .iter()
            .any(|p| matches!(p.mode(), Mode::Ready | Mode::Running));
        let busy_before = s.cpu_time().busy;

        let finished = s.tick();

        let cpu = s.cpu_time();
        prop_assert!(cpu.total <= MAX_TICKS, "simulation did not terminate");
        prop_assert_eq!(cpu.total, cpu.busy + cpu.idle());
        // the CPU idles only when nobody could use it
        prop_assert_eq!(cpu.busy - busy_before, u64::from(wants_cpu));

        let running = s
            .processes()
            .iter()
            .filter(|p| p.mode() == Mode::Running)
            .count();
        prop_assert!(running <= 1);

        for (p, seen) in s.processes().iter().zip(responses.iter_mut()) {
            let m = p.metrics();
            prop_assert_eq!(
                m.turnaround_time,
                m.waiting_time + m.cpu_time + m.io_time
            );
            if let Some(first) = *seen {
                prop_assert_eq!(m.response_time, Some(first), "response time changed");
            }
            *seen = m.response_time;
        }

        if finished {
            break;
        }
    }

    let cpu = s.cpu_time();
    let cpu_ticks: u64 = s.processes().iter().map(|p| p.metrics().cpu_time).sum();
    prop_assert_eq!(cpu_ticks, cpu.busy);
    for p in s.processes() {
        let m = p.metrics();
        prop_assert!(p.is_done());
        let response = m.response_time.unwrap_or(u64::MAX);
        prop_assert!(response <= m.turnaround_time);
    }

    // further ticks change nothing
    let before: Vec<_> = s.processes().iter().map(|p| *p.metrics()).collect();
    prop_assert!(s.tick());
    let after: Vec<_> = s.processes().iter().map(|p| *p.metrics()).collect();
    prop_assert_eq!(before, after);
    prop_assert_eq!(s.cpu_time(), cpu);
    Ok(())
}

proptest! {
    #[test]
    fn fcfs_invariants(workload in workloads()) {
        check_run(Policy::Fcfs, &workload)?;
    }

    #[test]
    fn mlfq_invariants(workload in workloads(), q0 in 1u32..6, q1 in 1u32..12) {
        check_run(Policy::Mlfq(MlfqConfig { quanta: [q0, q1] }), &workload)?;
    }

    #[test]
    fn total_cpu_work_matches_bursts(workload in workloads()) {
        let bursts: u64 = workload
            .iter()
            .flat_map(|times| times.iter().step_by(2))
            .map(|&t| u64::from(t))
            .sum();
        for policy in [Policy::Fcfs, Policy::Mlfq(MlfqConfig::default())] {
            let mut s = schedulers::build(policy, workload::processes(&workload));
            s.run();
            prop_assert_eq!(s.cpu_time().busy, bursts);
        }
    }
}
