//! # dust-build CLI Entry Point
//!
//! Parses the command line with clap and routes to the build or test path.
//! The builder flags themselves (`-j4`, `-O2`, `--clean`, ...) are passed
//! through verbatim and parsed by [`BuildConfiguration::from_tokens`].

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::Level;

use dust_builder::build;
use dust_builder::config::{BuildConfiguration, Mode, host_cores};
use dust_builder::layout::ProjectLayout;
use dust_builder::logging;
use dust_builder::toolchain::{self, Toolchain};
use dust_builder::ui;

#[derive(Parser)]
#[command(name = "dust-build")]
#[command(about = "Builds and tests the Dust programming language", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Log toolchain invocations and cleanup (overridden by DUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and link the executable (default)
    Build {
        /// Builder flags: -j<N>, -core<N>, -O<0-3>, --clean, --package, --package-dist, --package-clean
        #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
        flags: Vec<String>,
    },
    /// Build the test binary, run it and report the results
    Test {
        /// Builder flags: -j<N>, -O<0-3>
        #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
        flags: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(if cli.verbose { Level::DEBUG } else { Level::WARN });

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "x".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(Commands::Build { flags }) => build_command(&root, &flags),
        Some(Commands::Test { flags }) => test_command(&root, &flags),
        None => build_command(&root, &[]),
    }
}

fn build_command(root: &Path, flags: &[String]) -> Result<()> {
    let config = BuildConfiguration::from_tokens(flags)?;
    let layout = ProjectLayout::load(root)?;

    match config.mode() {
        Mode::Clean => build::clean(&layout),
        Mode::PackageClean => build::clean_packaging(&layout),
        Mode::Package { dist_only } => {
            let what = if dist_only { "Archiving" } else { "Packaging" };
            println!(
                "{} {} {} is not supported by this builder; nothing was built.",
                "!".yellow(),
                what,
                layout.display_name()
            );
            Ok(())
        }
        Mode::Build => {
            layout.validate_build()?;
            let toolchain = toolchain::detect_toolchain(&layout)?;
            print_banner(&config, &layout, &toolchain);

            let elapsed = build::compile(&config, &layout, &toolchain)?;
            ui::done(&format!(
                "{} successfully built in {:.1} secs ({} ms)",
                layout.display_name(),
                elapsed.as_secs_f64(),
                elapsed.as_millis()
            ));
            Ok(())
        }
    }
}

fn test_command(root: &Path, flags: &[String]) -> Result<()> {
    let config = BuildConfiguration::from_tokens(flags)?;
    if config.mode() != Mode::Build {
        tracing::warn!("mode flags have no effect on the test run");
    }
    let layout = ProjectLayout::load(root)?;
    layout.validate_tests()?;
    let toolchain = toolchain::detect_toolchain(&layout)?;

    println!("{} Running tests...", "🧪".magenta());
    let run = build::run_tests(&config, &layout, &toolchain)?;
    build::print_report(&run);
    Ok(())
}

fn print_banner(config: &BuildConfiguration, layout: &ProjectLayout, toolchain: &Toolchain) {
    let name = layout.display_name();
    println!("Welcome to the {} builder\n", name);
    println!("Configured settings");
    println!(
        " - Compiler process(es): {}",
        config.workers.to_string().yellow()
    );
    println!(
        " - Optimization level  : {} ({})\n",
        config.optimization.get().to_string().yellow(),
        config.optimization.description()
    );

    let cores = host_cores();
    if config.workers > cores {
        ui::warning(&format!(
            "given process count ({}) exceeds your machine's core count ({})\n",
            config.workers, cores
        ));
    }

    println!("Starting building {}", name);
    ui::info(&format!(
        "Start time: {}",
        chrono::Local::now().format("%H:%M:%S %d.%m.%Y")
    ));
    ui::info(&format!(
        "Platform: {} ({})",
        std::env::consts::OS,
        std::env::consts::ARCH
    ));
    ui::info(&format!("Machine: {}", ui::machine_word_size()));
    ui::info(&format!(
        "Compiler: {} ({})\n",
        toolchain.cc.display(),
        toolchain.version
    ));
}
