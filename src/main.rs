use std::io::{self, Read};

use clap::Parser as ClapParser;
use treek::cli::{self, CliError, RunOptions, RunResult};

#[derive(ClapParser)]
#[command(name = "treek")]
#[command(about = "Treek - query ECMAScript ASTs with path expressions")]
#[command(version)]
struct Cli {
    /// The selector to run, e.g. "//FunctionDeclaration/:id/:name"
    query: String,

    /// Path to an ESTree JSON file (reads from stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Pretty-print the result array
    #[arg(short, long)]
    pretty: bool,

    /// Only validate the selector syntax, don't execute
    #[arg(long)]
    syntax_only: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let input = match cli.input {
        Some(path) => Some(std::fs::read_to_string(path).map_err(CliError::Io)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Some(buffer)
        }
        None => None,
    };

    let options = RunOptions {
        query: cli.query,
        input,
        pretty: cli.pretty,
        syntax_only: cli.syntax_only,
    };

    match cli::execute(&options)? {
        RunResult::SyntaxValid => println!("Syntax is valid"),
        RunResult::Success(json) => println!("{}", json),
    }
    Ok(())
}
