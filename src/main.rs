use anyhow::{Context, Result};
use clap::{App, Arg};
use cpusched::report::print_summary;
use cpusched::schedulers::{self, Policy};
use cpusched::workload;
use log::{info, LevelFilter};
use std::path::PathBuf;

struct Args {
    policy: Policy,
    inputfile: Option<PathBuf>,
    verbose: bool,
}

fn valid_schedspec(value: &str) -> Result<(), String> {
    value
        .parse::<Policy>()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

fn parse_args() -> Result<Args> {
    let matches = App::new("cpusched")
        .about("CPU scheduling simulator")
        .arg(
            Arg::with_name("schedspec")
                .short('s')
                .long("schedspec")
                .required(true)
                .takes_value(true)
                .validator(valid_schedspec)
                .help("Scheduler specification (F, M or M<q0>:<q1>)"),
        )
        .arg(
            Arg::with_name("v_flag")
                .short('v')
                .required(false)
                .takes_value(false)
                .help("Trace every scheduling decision"),
        )
        .arg(
            Arg::with_name("inputfile")
                .required(false)
                .index(1)
                .help("Workload file (defaults to the built-in table)"),
        )
        .get_matches();

    let policy = matches
        .value_of("schedspec")
        .context("missing scheduler specification")?
        .parse::<Policy>()?;

    Ok(Args {
        policy,
        inputfile: matches.value_of("inputfile").map(PathBuf::from),
        verbose: matches.is_present("v_flag"),
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Trace);
    }
    logger.format_timestamp(None).init();

    let workload = match &args.inputfile {
        Some(path) => workload::read_input_file(path)?,
        None => workload::builtin(),
    };
    info!("{} processes, policy {:?}", workload.len(), args.policy);

    let mut scheduler = schedulers::build(args.policy, workload::processes(&workload));
    scheduler.run();

    print_summary(scheduler.as_ref()).context("Failed to write summary")?;
    Ok(())
}
