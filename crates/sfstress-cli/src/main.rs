use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use sfstress::{execute, FileStore, PlacementMode, RunConfig};

const DEFAULT_FILE: &str = "disk.img";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config: RunConfig,
    path: PathBuf,
    show_help: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config: RunConfig::default(),
            path: PathBuf::from(DEFAULT_FILE),
            show_help: false,
        }
    }
}

fn main() {
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();

    let exit_code = run(std::env::args_os(), &mut stdout, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run<I, W, E>(args: I, out: &mut W, err: &mut E) -> i32
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let options = match parse_args(args) {
        Ok(options) => options,
        Err(message) => {
            let _ = writeln!(err, "error: {message}");
            let _ = write_usage(err);
            return 2;
        }
    };

    if options.show_help {
        if write_usage(out).is_err() {
            return 1;
        }
        return 0;
    }

    init_subscriber(options.config.verbose);

    if let Err(error) = options.config.validate() {
        let _ = writeln!(err, "error: {error}");
        return error.exit_code();
    }

    let _ = writeln!(out, "Create file: {}", options.path.display());
    let mut store = match FileStore::create(&options.path, options.config.file_size) {
        Ok(store) => store,
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            return error.exit_code();
        }
    };

    match execute(&options.config, &mut store) {
        Ok(outcome) => {
            let _ = writeln!(out, "Verified {} blocks", outcome.report.blocks_verified);
            if outcome.report.mismatches != 0 {
                let _ = writeln!(
                    out,
                    "{} blocks failed checksum verification",
                    outcome.report.mismatches
                );
            }
            if outcome.report.read_failures != 0 {
                let _ = writeln!(
                    out,
                    "{} blocks could not be read",
                    outcome.report.read_failures
                );
            }
            0
        }
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            error.exit_code()
        }
    }
}

/// Install the log subscriber once; `-v` lowers the default level to show
/// per-operation events. `RUST_LOG` still wins when set.
fn init_subscriber(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_args<I>(args: I) -> Result<CliOptions, String>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let _argv0 = iter.next();

    let mut options = CliOptions::default();

    while let Some(argument) = iter.next() {
        let arg = argument.to_string_lossy();
        let arg_str = arg.as_ref();

        match arg_str {
            "-h" | "--help" => options.show_help = true,
            "-v" | "--verbose" => options.config.verbose = true,
            "--blocksize" => {
                options.config.block_size =
                    parse_usize_option(&next_value(&mut iter, arg_str)?, arg_str)?;
            }
            "--blocks" => {
                options.config.block_count =
                    parse_u64_option(&next_value(&mut iter, arg_str)?, arg_str)?;
            }
            "--sync" => {
                options.config.sync_interval =
                    parse_u64_option(&next_value(&mut iter, arg_str)?, arg_str)?;
            }
            "--mode" => {
                options.config.mode = next_value(&mut iter, arg_str)?
                    .parse::<PlacementMode>()
                    .map_err(|error| error.to_string())?;
            }
            "--stream-min" => {
                options.config.stream_min =
                    parse_u64_option(&next_value(&mut iter, arg_str)?, arg_str)?;
            }
            "--stream-max" => {
                options.config.stream_max =
                    parse_u64_option(&next_value(&mut iter, arg_str)?, arg_str)?;
            }
            "--file" => {
                options.path = PathBuf::from(next_value(&mut iter, arg_str)?);
            }
            "--size" => {
                options.config.file_size =
                    parse_u64_option(&next_value(&mut iter, arg_str)?, arg_str)?;
            }
            "--seed" => {
                options.config.seed =
                    parse_u64_option(&next_value(&mut iter, arg_str)?, arg_str)?;
            }
            other => return Err(format!("unrecognized argument `{other}`")),
        }
    }

    Ok(options)
}

fn next_value<I>(iter: &mut I, flag: &str) -> Result<String, String>
where
    I: Iterator<Item = OsString>,
{
    iter.next()
        .map(|value| value.to_string_lossy().into_owned())
        .ok_or_else(|| format!("missing value for `{flag}`"))
}

fn parse_u64_option(value: &str, flag: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("invalid integer `{value}` for `{flag}`"))
}

fn parse_usize_option(value: &str, flag: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| format!("invalid integer `{value}` for `{flag}`"))
}

fn write_usage(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "usage: sfstress [options]")?;
    writeln!(out)?;
    writeln!(
        out,
        "Creates a large sparse file, writes checksum-tagged blocks under a"
    )?;
    writeln!(
        out,
        "placement policy, then scans the whole file and verifies every block."
    )?;
    writeln!(out)?;
    writeln!(out, "options:")?;
    writeln!(out, "  --blocksize <bytes>   size of blocks to write [4096]")?;
    writeln!(out, "  --blocks <n>          number of blocks to write [1000]")?;
    writeln!(out, "  --sync <n>            flush every n blocks; 0 disables [0]")?;
    writeln!(out, "  --mode <mode>         seq, rand, or stream [rand]")?;
    writeln!(out, "  --stream-min <n>      minimum blocks per stream run [5]")?;
    writeln!(out, "  --stream-max <n>      maximum blocks per stream run [30]")?;
    writeln!(out, "  --file <path>         backing file path [disk.img]")?;
    writeln!(out, "  --size <bytes>        sparse file size [30 GiB]")?;
    writeln!(out, "  --seed <n>            random number generator seed [42]")?;
    writeln!(out, "  -v, --verbose         log per-operation events")?;
    writeln!(out, "  -h, --help            show this help")?;
    Ok(())
}
