// src/main.rs
//
// squeezehtml — command line front end for the minifier
//
// - Reads INPUT (a path, or `-` for stdin), minifies it, writes OUTPUT.
// - OUTPUT defaults to overwriting INPUT; stdout when INPUT is `-`.
// - `--root DIR` is recorded as the process root; relative paths resolve
//   against it.
// - Logging goes to stderr. RUST_LOG wins over -v.

use clap::{ArgAction, Parser};
use squeezehtml::{Error, env, minify};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI flags
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory relative INPUT/OUTPUT paths are resolved against
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Input file, or `-` for stdin
    input: PathBuf,

    /// Output file, or `-` for stdout (default: overwrite input)
    output: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    env::init(cli.root.clone())?;

    run(&cli, env::root_dir(), &mut io::stdin().lock(), &mut io::stdout().lock())
}

/// Read, minify and write one document. `-` paths use `stdin`/`stdout`.
fn run(
    cli: &Cli,
    root: Option<&Path>,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
) -> Result<(), Error> {
    let src = read_input(&cli.input, root, stdin)?;
    let out = minify(&src);
    info!(
        input = src.len(),
        output = out.len(),
        saved = src.len().saturating_sub(out.len()),
        "minified {}",
        cli.input.display()
    );

    let out_path = cli.output.as_ref().unwrap_or(&cli.input);
    write_output(out_path, root, &out, stdout)
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(path: &Path, root: Option<&Path>, stdin: &mut dyn Read) -> Result<String, Error> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if is_stdio(path) {
        let mut buf = String::new();
        stdin.read_to_string(&mut buf).map_err(io_err)?;
        return Ok(buf);
    }
    fs::read_to_string(env::resolve_against(root, path)).map_err(io_err)
}

fn write_output(
    path: &Path,
    root: Option<&Path>,
    out: &str,
    stdout: &mut dyn Write,
) -> Result<(), Error> {
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    if is_stdio(path) {
        return stdout
            .write_all(out.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(io_err);
    }
    fs::write(env::resolve_against(root, path), out).map_err(io_err)
}
