use std::process;

use autoproject_cli::AutoProjectCli;
use autoproject_cli::OutputFormat;
use autoproject_core::AutoProject;
use autoproject_core::AutoProjectConfig;
use autoproject_core::AutoProjectError;
use autoproject_core::Extraction;
use autoproject_core::ProjectOptions;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = AutoProjectCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	match run(&args) {
		Ok(extraction) => print_extraction(&extraction, args.format),
		Err(AutoProjectError::NothingExtracted { path }) => {
			eprintln!(
				"{} no source files were extracted from {path}",
				colored!("warning:", yellow)
			);
			process::exit(1);
		}
		Err(e) => {
			let report: miette::Report = e.into();
			eprintln!("{report:?}");
			process::exit(2);
		}
	}
}

/// Logs go to stderr, filtered by `RUST_LOG` when it is set.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.init();
}

fn run(args: &AutoProjectCli) -> Result<Extraction, AutoProjectError> {
	let config = match &args.config {
		Some(path) => Some(AutoProjectConfig::load_file(path)?),
		None => None,
	};
	let options = ProjectOptions {
		output_dir: args.output_dir.clone(),
		config,
	};

	let project = AutoProject::open_with_options(&args.file, options)?;
	tracing::debug!(name = project.name(), "opened document");
	project.create_project(args.overwrite)
}

fn print_extraction(extraction: &Extraction, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"project": extraction.name,
				"root": extraction.root.display().to_string(),
				"files": extraction.files,
				"snippets": extraction.snippets,
				"libraries": extraction.libraries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			println!(
				"{}",
				colored!("Successfully extracted the following source files:", bold)
			);
			for file in &extraction.files {
				println!("{file}");
			}
		}
	}
}
