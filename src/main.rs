//! Command-line driver: maps files (or REPL lines) through the
//! scan → parse → resolve → interpret pipeline and error state to process
//! exit codes (65 for syntax/resolve diagnostics, 70 for runtime errors).

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rlox::ast::Stmt;
use rlox::ast_printer::AstPrinter;
use rlox::error::LoxError;
use rlox::interpreter::Interpreter;
use rlox::parser::Parser;
use rlox::resolver::Resolver;
use rlox::scanner::Scanner;
use rlox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Emit the token stream as JSON instead of the plain listing
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints the AST of each statement
    Parse { filename: PathBuf },

    /// Runs a file as a Lox program, or starts a REPL when no file is given
    Run { filename: Option<PathBuf> },
}

/// How one source unit (file or REPL line) ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Ok,
    SyntaxError,
    RuntimeError,
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: &PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module path and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'rlox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rlox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Scan a source unit, reporting lexical diagnostics to stderr.
/// Returns the tokens plus whether any diagnostic occurred.
fn scan(source: &[u8]) -> (Vec<Token>, bool) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut had_error = false;

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),

            Err(e) => {
                eprintln!("{}", e);
                had_error = true;
            }
        }
    }

    (tokens, had_error)
}

/// Run one complete source unit against `interpreter`.  All diagnostics go
/// to stderr; evaluation is suppressed if any scan/parse/resolve diagnostic
/// occurred.
fn run(interpreter: &mut Interpreter, source: &[u8]) -> RunOutcome {
    let (tokens, mut had_error) = scan(source);

    let (statements, diagnostics): (Vec<Stmt>, Vec<LoxError>) = Parser::new(&tokens).parse();

    for diagnostic in &diagnostics {
        eprintln!("{}", diagnostic);
        had_error = true;
    }

    if had_error {
        return RunOutcome::SyntaxError;
    }

    if let Err(e) = Resolver::new(interpreter).resolve(&statements) {
        eprintln!("{}", e);
        return RunOutcome::SyntaxError;
    }

    match interpreter.interpret(&statements) {
        Ok(()) => RunOutcome::Ok,

        Err(e) => {
            debug!("Runtime debug: {}", e);

            eprintln!("{}", e);
            RunOutcome::RuntimeError
        }
    }
}

/// Interactive prompt: one statement (or more) per line, against a single
/// persistent interpreter.  Diagnostics and runtime errors are reported and
/// the session continues; EOF ends it.
fn run_prompt() -> Result<()> {
    let mut interpreter = Interpreter::new();

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();

        let bytes = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        if bytes == 0 {
            info!("REPL reached EOF");
            break;
        }

        // Outcome deliberately ignored: the session survives both syntax
        // and runtime errors with its globals intact.
        let _ = run(&mut interpreter, line.as_bytes());
    }

    Ok(())
}

fn run_file(filename: &PathBuf) -> Result<ExitCode> {
    let buf = read_file(filename)?;

    let mut interpreter = Interpreter::new();

    Ok(match run(&mut interpreter, &buf) {
        RunOutcome::Ok => ExitCode::SUCCESS,
        RunOutcome::SyntaxError => ExitCode::from(65),
        RunOutcome::RuntimeError => ExitCode::from(70),
    })
}

fn main() -> Result<ExitCode> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");

            let buf = read_file(&filename)?;
            let (tokens, had_error) = scan(&buf);

            if json {
                let rendered =
                    serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?;

                println!("{}", rendered);
            } else {
                for token in &tokens {
                    println!("{}", token);
                }
            }

            if had_error {
                debug!("Tokenization failed, exiting with code 65");

                return Ok(ExitCode::from(65));
            }

            info!("Tokenization completed successfully");
        }

        Commands::Parse { filename } => {
            info!("Running Parse subcommand");

            let buf = read_file(&filename)?;
            let (tokens, mut had_error) = scan(&buf);

            let (statements, diagnostics) = Parser::new(&tokens).parse();

            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
                had_error = true;
            }

            if had_error {
                return Ok(ExitCode::from(65));
            }

            for stmt in &statements {
                println!("{}", AstPrinter::print_stmt(stmt));
            }

            info!("Parse subcommand completed");
        }

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand on {:?}", filename);

                return run_file(&filename);
            }

            None => {
                info!("No filepath provided, starting REPL");

                run_prompt()?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
