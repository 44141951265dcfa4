use anyhow::{Context, Result, bail};
use rr_model::{
    Sim, SimConfig, Workload,
    core::{ConsoleObserver, NullObserver, ObserverConfig},
    sim::{Prompter, RandomWorkload},
};
use std::{fs::File, io, io::BufReader};

const USAGE: &str = "usage: rr_model [WORKLOAD.json] [--random N] [--seed S] \
                     [--memory KB] [--quantum MS] [--no-color] [--compact] [--json]";

#[derive(Debug, Default)]
struct Args {
    workload: Option<String>,
    random: Option<usize>,
    seed: u64,
    memory_kb: Option<u64>,
    quantum_ms: Option<u64>,
    no_color: bool,
    compact: bool,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |flag: &str| {
            it.next()
                .with_context(|| format!("{flag} needs a value\n{USAGE}"))
        };
        match arg.as_str() {
            "--random" => args.random = Some(value("--random")?.parse()?),
            "--seed" => args.seed = value("--seed")?.parse()?,
            "--memory" => args.memory_kb = Some(value("--memory")?.parse()?),
            "--quantum" => args.quantum_ms = Some(value("--quantum")?.parse()?),
            "--no-color" => args.no_color = true,
            "--compact" => args.compact = true,
            "--json" => args.json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown flag {flag}\n{USAGE}"),
            path => args.workload = Some(path.to_owned()),
        }
    }
    Ok(args)
}

/// Reads the workload from a file, the generator or the terminal. `--memory`
/// and `--quantum` override whatever the source provided.
fn load_workload(args: &Args) -> Result<Workload> {
    let mut workload = if let Some(path) = &args.workload {
        let file = File::open(path).with_context(|| format!("opening {path}"))?;
        Workload::from_json(BufReader::new(file))
            .with_context(|| format!("reading workload {path}"))?
    } else if let Some(count) = args.random {
        // Sizes are drawn against this pool, so it must already hold the override.
        let config = SimConfig {
            total_memory_kb: args.memory_kb.unwrap_or(128),
            quantum_ms: args.quantum_ms.unwrap_or(3),
        };
        let shape = RandomWorkload {
            count,
            ..RandomWorkload::default()
        };
        shape
            .generate(config, args.seed)
            .context("generating random workload")?
    } else {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        prompter
            .collect_workload()
            .context("reading processes from the terminal")?
    };

    workload.override_config(args.memory_kb, args.quantum_ms);
    Ok(workload)
}

fn print_processes(sim: &Sim) {
    println!("\n====== PROCESSES ======");
    for p in sim.processes() {
        println!(
            "ID: {:<8}  Name: {:<10}  Size={:>4}KB  CPU={:>5}ms  Arrival={:>5}ms",
            p.id(),
            p.name(),
            p.size_kb(),
            p.cpu_total_ms(),
            p.arrival_ms()
        );
    }
    let config = sim.config();
    println!(
        "Memory={}KB  Quantum={}ms\n",
        config.total_memory_kb, config.quantum_ms
    );
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args()?;
    let workload = load_workload(&args)?;
    let sim = Sim::new(&workload).context("workload rejected before simulation")?;

    if args.json {
        let summary = sim.run(NullObserver)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_processes(&sim);
    let observer = ConsoleObserver::new(
        io::stdout(),
        ObserverConfig {
            color: !args.no_color,
            spacer: !args.compact,
        },
    );
    let summary = match sim.run(observer) {
        Ok(summary) => summary,
        Err(err) if err.is_internal() => {
            log::error!("simulation aborted: {err}");
            return Err(err).context("internal consistency failure");
        }
        Err(err) => return Err(err.into()),
    };
    println!("{summary}");
    Ok(())
}
