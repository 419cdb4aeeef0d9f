// Reduce a table to the variables that are correlated (or anti-correlated)
// with at least one other variable.

use std::{error::Error, thread, time::Instant};

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use corrsum::{Dataset, Engine, NameMask, Threshold, Topology, report::render_matrix, summarize};

mod args;
mod filter;
mod table;

use args::Args;
use filter::name_mask;
use table::{load_dataset, save_output, write_reduced};

fn build_mask(args: &Args, dataset: &Dataset) -> Result<Option<NameMask>, Box<dyn Error>> {
    let Some(pattern) = &args.pattern else {
        return Ok(None);
    };
    let mask = name_mask(pattern, args.ignore_case, args.multi_line, dataset.names())?;
    info!(
        "Pattern '{}' matches {} of {} variables.",
        pattern,
        mask.matched(),
        mask.len()
    );
    Ok(Some(mask))
}

fn resolve_topology(args: &Args) -> Result<Topology, Box<dyn Error>> {
    let cores = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let threads = match args.threads {
        Some(threads) => threads,
        None => (cores / args.workers.max(1)).max(1),
    };

    if args.engine == Engine::Serial {
        // The serial engine runs on the global pool.
        if let Some(threads) = args.threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()
                .map_err(|e| format!("Failed to set thread pool: {}", e))?;
            info!("Using {} threads.", threads);
        } else {
            info!("Using all available CPU cores.");
        }
    } else {
        info!("Using {} workers x {} threads.", args.workers, threads);
    }

    Ok(Topology::new(args.workers, threads)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();

    // Configuration errors surface before any data is read.
    let threshold = Threshold::resolve(args.mode()?, args.range())?;
    let topology = resolve_topology(&args)?;

    // Data loading
    let load_start = Instant::now();
    info!("Reading file: {}", args.input.display());
    let dataset = load_dataset(&args.input, args.transpose)?;
    let load_duration = load_start.elapsed();
    if args.time {
        info!(
            "Data loaded in {:.3} seconds.",
            load_duration.as_secs_f64()
        );
    }
    info!(
        "Matrix dimensions: {} observations x {} variables",
        dataset.observation_count(),
        dataset.variable_count()
    );

    let mask = build_mask(&args, &dataset)?;

    // Correlation and reduction
    let calc_start = Instant::now();
    info!(
        "Computing Pearson correlations ({} mode, interval [{}, {}])...",
        threshold.mode(),
        threshold.lower(),
        threshold.upper()
    );
    let summary = summarize(&dataset, &threshold, mask.as_ref(), args.engine, topology)?;
    let calc_duration = calc_start.elapsed();
    if args.time {
        info!(
            "Correlations calculated and reduced in {:.3} seconds.",
            calc_duration.as_secs_f64()
        );
    }
    info!(
        "Keeping {} of {} variables.",
        summary.retention.kept_count(),
        dataset.variable_count()
    );

    if args.print_matrix {
        print!("{}", render_matrix(&summary.matrix, dataset.names()));
    }

    // Output writing
    let output_start = Instant::now();
    let mut csv_buf = Vec::<u8>::new();
    write_reduced(&mut csv_buf, &dataset, &summary.retention)?;
    save_output(&args.output, &csv_buf)?;
    let output_duration = output_start.elapsed();
    info!("Output written to {}", args.output.display());

    if args.time {
        let total_duration = load_duration + calc_duration + output_duration;
        info!("Data loading:            {:8.3} seconds", load_duration.as_secs_f64());
        info!("Correlation calculation: {:8.3} seconds", calc_duration.as_secs_f64());
        info!("Output writing:          {:8.3} seconds", output_duration.as_secs_f64());
        info!("Total time:              {:8.3} seconds", total_duration.as_secs_f64());
    }

    Ok(())
}
