mod debug_report;

use saes_router::Router;
use std::io::{self, BufRead, IsTerminal, Write};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "SAES_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_logging();

    let mut router = Router::new();
    if config.trace {
        debug_report::print_load(router.load_report(), router.rule_count(), config.color);
    }

    if let Some(input) = &config.input {
        println!("{}", turn(&mut router, input, &config));
        return;
    }

    if let Err(err) = repl(&mut router, &config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

struct CliConfig {
    input: Option<String>,
    trace: bool,
    color: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn repl(router: &mut Router, config: &CliConfig) -> io::Result<()> {
    let interactive = io::stdin().is_terminal();
    if interactive {
        println!("Asistente SAES. Escribe 'exit' o 'quit' para terminar.");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        if interactive {
            let status = router.status();
            write!(stdout, "[{}] > ", status.state)?;
            stdout.flush()?;
        }

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let command = line.trim();
        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            break;
        }

        writeln!(stdout, "{}", turn(router, &line, config))?;
    }

    Ok(())
}

fn turn(router: &mut Router, input: &str, config: &CliConfig) -> String {
    if !config.trace {
        return router.step(input);
    }
    let report = router.step_verbose(input);
    debug_report::print_step(&report, config.color);
    report.reply
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut trace = false;
    let mut color = io::stderr().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("saes {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--trace" => trace = true,
            "--color" => color = true,
            "--no-color" => color = false,
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            _ if arg.starts_with("--input=") => {
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(arg.trim_start_matches("--input=").to_string());
            }
            _ => {
                return Err(format!("error: unknown option '{arg}'\n\n{}", help_text()));
            }
        }
    }

    Ok(CliConfig { input, trace, color })
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "saes {version}

Console front end for the SAES student assistant.

Usage:
  saes [OPTIONS]                 Read one turn per line from stdin.
  saes [OPTIONS] --input <text>  Route a single turn and exit.

Options:
  -i, --input <text>  Route a single turn and exit.
  --trace             Print a routing report (stderr) after every turn.
  --color             Force ANSI color in the routing report.
  --no-color          Disable ANSI color in the routing report.
  -h, --help          Show this help message.
  -V, --version       Print version information.

The session ends on EOF or when a line is exactly 'exit' or 'quit'.
Logging goes to stderr; set {log_env} (e.g. {log_env}=saes_router=debug) to
change the filter. Default: warn.

Exit codes:
  0  Success.
  1  I/O error.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV
    )
}
