//! # paramfig demo application
//!
//! A sample CLI tool that showcases how to bind functions to a paramfig tree.
//! This is **not** a real app; it exists purely to demonstrate and manually
//! verify paramfig's features.
//!
//! ## Running
//!
//! ```sh
//! cd demos/paramfig_demo
//! cargo run --example paramfig_demo -- show
//! cargo run --example paramfig_demo -- serve --port 9000 a.txt b.txt
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                 | How to exercise it                                                          |
//! |-------------------------|-----------------------------------------------------------------------------|
//! | Config file (cwd)       | Run from this directory so `paramfig-demo.yaml` is found                    |
//! | Env var override        | `PARAMFIG_DEMO__SERVER__PORT=9999 cargo run --example paramfig_demo -- show` |
//! | Defaults in `--help`    | `cargo run --example paramfig_demo -- serve --help`                          |
//! | String coercion         | `serve --workers 8 --tags "a b"` arrives as an int and a list                |
//! | Write-back              | `serve --port 9000` then look at the printed tree                           |
//! | Discarded keywords      | `RUST_LOG=paramfig=debug cargo run --example paramfig_demo -- serve`         |

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use paramfig::{
    Binder, Callable, Config, Function, Invocation, Param, ParamfigError, SearchPath, Signature,
    cli,
};

/// paramfig demo: a sample CLI app for showcasing parameter binding.
#[derive(Parser, Debug)]
#[command(name = "paramfig-demo")]
struct Cli {
    /// Print the whole tree after running the command.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the loaded configuration.
    Show,
    /// Run the pretend server. Options come from the `server` section.
    Serve {
        /// Options for `serve` (see `serve --help`).
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn serve_signature() -> Result<Signature, ParamfigError> {
    Signature::new(vec![
        Param::with_default("host", "0.0.0.0"),
        Param::with_default("port", 80),
        Param::with_default("workers", 1),
        Param::var_positional("files"),
    ])
}

fn serve(inv: &Invocation) -> Result<(), ParamfigError> {
    let field = |name: &str| inv.get(name).map(ToString::to_string).unwrap_or_default();
    println!(
        "serving on {}:{} with {} workers",
        field("host"),
        field("port"),
        field("workers")
    );
    for file in &inv.args {
        println!("  file {file}");
    }
    for (key, value) in &inv.kwargs {
        println!("  extra {key}={value}");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), ParamfigError> {
    let tree = Config::builder()
        .app_name("paramfig-demo")
        .env_prefix("PARAMFIG_DEMO")
        .search_paths(vec![
            SearchPath::Platform,
            SearchPath::Home(".paramfig-demo"),
            SearchPath::Cwd,
        ])
        .load()?
        .into_shared();

    match cli.command {
        Commands::Show => print!("{}", tree.borrow()),
        Commands::Serve { args } => {
            let bound = Binder::for_section(&tree, "server")?
                .bind(Function::new("serve", serve_signature()?, serve))?;
            let signature = bound.signature();
            let matches = cli::command_for("serve", &signature)
                .no_binary_name(true)
                .get_matches_from(args);
            bound.call(cli::arguments_from_matches(&signature, &matches)?)?;
        }
    }

    if cli.verbose {
        println!("{}", tree.borrow());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("paramfig-demo: {e}");
        std::process::exit(1);
    }
}
