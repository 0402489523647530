use clap::Parser;

use std::{io, path::PathBuf, process::ExitCode};

use vgsales::{Config, InputMissing, SvgRenderer, DEFAULT_PATH, DEFAULT_YEAR};

#[derive(Parser)]
#[command(version, about)]
/// Reports video game sales by platform, genre, publisher, region, and the
/// best-selling titles of a given year, and draws charts of the results.
struct Args {
    /// CSV file of sales data
    #[arg(default_value = DEFAULT_PATH)]
    path: PathBuf,
    /// Year for the best-selling titles report
    #[arg(short, long, env = "VGSALES_YEAR", default_value_t = DEFAULT_YEAR)]
    year: i32,
    /// Directory to write chart files to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
    /// Print reports only, without drawing charts
    #[arg(long)]
    no_charts: bool,
}

/// Returns the one-line message printed for a failed run.
fn error_line(e: &anyhow::Error) -> String {
    match e.downcast_ref::<InputMissing>() {
        Some(missing) => format!("Error: {missing}"),
        None => format!("An error occurred: {e:#}"),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let config = Config {
        path: args.path,
        year: args.year,
        charts: !args.no_charts,
    };
    let mut renderer = SvgRenderer::new(args.out_dir);
    let result = vgsales::run(&config, &mut io::stdout().lock(), &mut renderer);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", error_line(&e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_line_fn_gives_fixed_message_for_missing_input() {
        let err = anyhow::Error::from(InputMissing("vgsales.csv".into()));
        assert_eq!(error_line(&err), "Error: 'vgsales.csv' not found.");
    }

    #[test]
    fn error_line_fn_includes_cause_for_unreadable_input() {
        let err = vgsales::Dataset::from_path("testdata/bad_number.csv").unwrap_err();
        let line = error_line(&err);
        assert!(line.starts_with("An error occurred: testdata/bad_number.csv"), "{line}");
        assert!(line.contains("bad sales figure \"abc\""), "{line}");
    }
}
