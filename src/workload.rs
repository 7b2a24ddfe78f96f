use crate::process::Process;
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Interleaved `burst, io, burst, ...` durations, one entry per process.
pub type Workload = Vec<Vec<u32>>;

/// The eight-process table the simulator runs when no file is given.
pub fn builtin() -> Workload {
    vec![
        vec![5, 27, 3, 31, 5, 43, 4, 18, 6, 22, 4, 26, 3, 24, 4],
        vec![4, 48, 5, 44, 7, 42, 12, 37, 9, 76, 4, 41, 9, 31, 7, 43, 8],
        vec![8, 33, 12, 41, 18, 65, 14, 21, 4, 61, 15, 18, 14, 26, 5, 31, 6],
        vec![3, 35, 4, 41, 5, 45, 3, 51, 4, 61, 5, 54, 6, 82, 5, 77, 3],
        vec![16, 24, 17, 21, 5, 36, 16, 26, 7, 31, 13, 28, 11, 21, 6, 13, 3, 11, 4],
        vec![11, 22, 4, 8, 5, 10, 6, 12, 7, 14, 9, 18, 12, 24, 15, 30, 8],
        vec![14, 46, 17, 41, 11, 42, 15, 21, 4, 32, 7, 19, 16, 33, 10],
        vec![4, 14, 5, 33, 6, 51, 14, 73, 16, 87, 6],
    ]
}

/// Reads a workload file: one process per line, `#` comments and blank lines
/// skipped.
pub fn read_input_file(filename: &Path) -> Result<Workload> {
    let file = File::open(filename)
        .with_context(|| format!("Failed to open file: {}", filename.display()))?;
    parse(BufReader::new(file)).with_context(|| format!("in {}", filename.display()))
}

pub fn parse<R: BufRead>(reader: R) -> Result<Workload> {
    let mut workload = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let times = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<u32>()
                    .with_context(|| format!("line {}: bad duration {:?}", idx + 1, tok))
            })
            .collect::<Result<Vec<u32>>>()?;
        if times.contains(&0) {
            bail!("line {}: durations must be positive", idx + 1);
        }
        workload.push(times);
    }

    if workload.is_empty() {
        bail!("workload has no processes");
    }
    Ok(workload)
}

/// Builds the process table, ids following workload order.
pub fn processes(workload: &Workload) -> Vec<Process> {
    workload
        .iter()
        .enumerate()
        .map(|(id, times)| Process::new(id, times))
        .collect()
}
