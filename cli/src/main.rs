use std::{fs::File, io::Read, path::PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use core_sched::{
    bundle::schedule_static,
    exec::{Env, ExecPool},
    issue::schedule_dynamic,
    prog::Program,
    sched::{AvailabilityPolicy, Schedule},
};

#[cfg(feature = "stat")]
use core_sched::stat::{SchedStatBuilder, Stats};

#[cfg(feature = "stat")]
use terminal_size::terminal_size;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// bundle at compile time (single forward pass, never stalls)
    Static(StaticArgs),
    /// issue at run time (rescan every cycle, detects deadlock)
    Dynamic(DynamicArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// File path to input program
    #[arg(short, long)]
    input: PathBuf,
    /// Parse the input as JSON instead of the line format
    #[arg(long)]
    json: bool,
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
    /// Execute the schedule on a worker pool after printing it
    #[arg(long)]
    execute: bool,
    /// Worker pool size
    #[arg(long, default_value_t = 3)]
    workers: usize,
    /// Seed value for execution, as name=value (repeatable)
    #[arg(long = "seed", value_parser = parse_seed)]
    seeds: Vec<(String, i64)>,
}

#[derive(Args, Debug)]
struct StaticArgs {
    #[command(flatten)]
    delegate: CommonArgs,
    /// Only satisfied instructions make their destination available
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct DynamicArgs {
    #[command(flatten)]
    delegate: CommonArgs,
}

fn parse_seed(s: &str) -> Result<(String, i64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, found `{s}`"))?;
    let value = value
        .parse()
        .map_err(|e| format!("bad value for `{name}`: {e}"))?;
    Ok((name.to_owned(), value))
}

fn main() -> Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Static(StaticArgs { delegate, strict }) => {
            init_logger(delegate.verbose);
            let program = read_program(&delegate)?;
            let policy = if strict {
                AvailabilityPolicy::Strict
            } else {
                AvailabilityPolicy::Permissive
            };
            #[cfg(feature = "stat")]
            let mut stat_builder = SchedStatBuilder::new();
            let schedule = schedule_static(&program.instrs, &program.ready_set(), policy);
            #[cfg(feature = "stat")]
            output_stat(&mut stat_builder, &schedule);
            print!("{schedule}");
            maybe_execute(&delegate, &schedule)
        }
        Command::Dynamic(DynamicArgs { delegate }) => {
            init_logger(delegate.verbose);
            let program = read_program(&delegate)?;
            #[cfg(feature = "stat")]
            let mut stat_builder = SchedStatBuilder::new();
            let ready_set = program.ready_set();
            let schedule = match schedule_dynamic(program.instrs, ready_set) {
                Ok(s) => s,
                Err(e) => {
                    print!("{}", e.completed);
                    for instr in &e.stuck {
                        println!("stuck: {instr}");
                    }
                    return Err(e.into());
                }
            };
            #[cfg(feature = "stat")]
            output_stat(&mut stat_builder, &schedule);
            print!("{schedule}");
            maybe_execute(&delegate, &schedule)
        }
    }
}

fn init_logger(verbose: bool) {
    if verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }
}

fn read_program(common: &CommonArgs) -> Result<Program> {
    let mut buf = String::new();
    let mut file = File::open(&common.input)?;
    file.read_to_string(&mut buf)?;
    let program = if common.json {
        Program::from_json(&buf)?
    } else {
        Program::from_text(&buf)?
    };
    log::info!(
        "parsed program: {} instruction(s), {} ready value(s)",
        program.instrs.len(),
        program.ready.len()
    );
    Ok(program)
}

fn maybe_execute(common: &CommonArgs, schedule: &Schedule) -> Result<()> {
    if !common.execute {
        return Ok(());
    }
    let pool = ExecPool::new(common.workers)?;
    let mut env: Env = common.seeds.iter().cloned().collect();
    log::info!(
        "executing {} cycle(s) on {} worker(s)",
        schedule.num_cycles(),
        common.workers
    );
    for (i, report) in pool.run(schedule, &mut env).iter().enumerate() {
        println!("exec cycle {}: {report}", i + 1);
    }
    Ok(())
}

#[cfg(feature = "stat")]
fn output_stat(builder: &mut SchedStatBuilder, schedule: &Schedule) {
    builder.record(schedule);
    builder.stop_timer();
    let mut stats = Stats::default();
    stats.push(Box::new(builder.finish()));
    let max_width = get_terminal_width().unwrap_or(120) as usize;
    log::info!("statistics:\n{}", stats.view(max_width));
}

#[cfg(feature = "stat")]
fn get_terminal_width() -> Option<u16> {
    terminal_size().map(|(w, _)| w.0.saturating_sub(20))
}
