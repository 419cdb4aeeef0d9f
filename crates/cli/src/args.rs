use std::path::PathBuf;

use clap::Parser;
use corrsum::{ConfigError, Engine, ThresholdMode};

#[derive(Parser, Debug)]
#[command(name = "corrsum")]
#[command(
    about = "Drop every variable that is not correlated (or anti-correlated) with at least one other"
)]
pub struct Args {
    /// Input table (.csv, .csv.gz or .tar.gz).
    pub input: PathBuf,

    /// Regular expression on variable names. Only matching variables can
    /// trigger retention of themselves and their partners.
    pub pattern: Option<String>,

    /// Correlation mode, optionally with an interval LOW:HIGH (default 0.75:1).
    #[arg(long = "cc", value_name = "LOW:HIGH", num_args = 0..=1, value_parser = parse_range)]
    pub correlation: Option<Option<(f64, f64)>>,

    /// Anti-correlation mode, optionally with an interval (default -1:-0.75).
    /// Negative bounds must be attached: `--ac=-0.9:-0.6`.
    #[arg(long = "ac", value_name = "LOW:HIGH", num_args = 0..=1, value_parser = parse_range)]
    pub anti_correlation: Option<Option<(f64, f64)>>,

    /// Output file (.csv or .csv.gz).
    #[arg(short, long, value_parser = parse_output)]
    pub output: PathBuf,

    /// Print the correlation matrix to stdout.
    #[arg(short = 'm', long)]
    pub print_matrix: bool,

    /// Each input row is a variable instead of an observation.
    #[arg(short, long)]
    pub transpose: bool,

    /// Case-insensitive name matching.
    #[arg(short, long)]
    pub ignore_case: bool,

    /// `^` and `$` match at line breaks inside names.
    #[arg(short = 'n', long)]
    pub multi_line: bool,

    /// Serial or distributed engine.
    #[arg(long, default_value = "distributed")]
    pub engine: Engine,

    /// Number of workers for the distributed engine.
    #[arg(short, long, default_value_t = 1)]
    pub workers: usize,

    /// Threads per worker (default: all available cores split across workers).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Report load, compute and write timings.
    #[arg(long)]
    pub time: bool,
}

impl Args {
    pub fn mode(&self) -> Result<ThresholdMode, ConfigError> {
        ThresholdMode::from_flags(self.correlation.is_some(), self.anti_correlation.is_some())
    }

    /// Interval given inline to whichever mode flag was used.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.correlation.flatten().or(self.anti_correlation.flatten())
    }
}

pub fn parse_range(value: &str) -> Result<(f64, f64), String> {
    let (low, high) = value
        .split_once(':')
        .ok_or_else(|| format!("expected LOW:HIGH, got '{}'", value))?;
    let low: f64 = low
        .trim()
        .parse()
        .map_err(|_| format!("invalid lower bound '{}'", low))?;
    let high: f64 = high
        .trim()
        .parse()
        .map_err(|_| format!("invalid upper bound '{}'", high))?;
    Ok((low, high))
}

fn parse_output(value: &str) -> Result<PathBuf, String> {
    if value.ends_with(".csv") || value.ends_with(".csv.gz") {
        Ok(PathBuf::from(value))
    } else {
        Err(format!(
            "output file must end in .csv or .csv.gz, got '{}'",
            value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_parsing() {
        assert_eq!(parse_range("0.5:0.9"), Ok((0.5, 0.9)));
        assert_eq!(parse_range("-1:-0.8"), Ok((-1.0, -0.8)));
        assert!(parse_range("0.5").is_err());
        assert!(parse_range("a:0.9").is_err());
    }

    #[test]
    fn parses_full_command_line() {
        let args = Args::try_parse_from([
            "corrsum", "data.csv", "^BR", "--ac=-0.9:-0.6", "-o", "out.csv", "-m", "-t", "-i",
            "--engine", "serial", "-w", "4", "--threads", "2",
        ])
        .expect("valid arguments");
        assert_eq!(args.mode(), Ok(ThresholdMode::AntiCorrelation));
        assert_eq!(args.range(), Some((-0.9, -0.6)));
        assert_eq!(args.pattern.as_deref(), Some("^BR"));
        assert_eq!(args.engine, Engine::Serial);
        assert_eq!(args.workers, 4);
        assert_eq!(args.threads, Some(2));
        assert!(args.print_matrix && args.transpose && args.ignore_case);
    }

    #[test]
    fn interval_follows_mode_flag() {
        let args =
            Args::try_parse_from(["corrsum", "data.csv", "--cc", "0.5:0.9", "-o", "out.csv"])
                .expect("valid arguments");
        assert_eq!(args.mode(), Ok(ThresholdMode::Correlation));
        assert_eq!(args.range(), Some((0.5, 0.9)));
        assert_eq!(args.pattern, None);
    }

    #[test]
    fn mode_flag_without_interval_uses_default() {
        let args = Args::try_parse_from(["corrsum", "data.csv", "--cc", "-o", "out.csv", "^A"])
            .expect("valid arguments");
        assert_eq!(args.mode(), Ok(ThresholdMode::Correlation));
        assert_eq!(args.range(), None);
        assert_eq!(args.pattern.as_deref(), Some("^A"));
        assert_eq!(args.output, PathBuf::from("out.csv"));

        let args = Args::try_parse_from(["corrsum", "data.csv", "--ac", "-o", "out.csv"])
            .expect("valid arguments");
        assert_eq!(args.mode(), Ok(ThresholdMode::AntiCorrelation));
        assert_eq!(args.range(), None);
    }

    #[test]
    fn both_modes_are_rejected() {
        let args = Args::try_parse_from(["corrsum", "data.csv", "--cc", "--ac", "-o", "out.csv"])
            .expect("parses");
        assert_eq!(args.mode(), Err(ConfigError::ConflictingModes));
    }

    #[test]
    fn detached_negative_interval_is_an_error() {
        assert!(
            Args::try_parse_from(["corrsum", "data.csv", "--ac", "-0.9:-0.6", "-o", "out.csv"])
                .is_err()
        );
    }

    #[test]
    fn output_must_be_csv() {
        assert!(Args::try_parse_from(["corrsum", "data.csv", "--cc", "-o", "out.txt"]).is_err());
        assert!(Args::try_parse_from(["corrsum", "data.csv", "--cc"]).is_err());
    }
}
