use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Turn the code blocks of a markdown document into a buildable CMake project.",
	long_about = "autoproject reads a markdown document and writes every code block that is \
	              captioned with a source file name (for example `main.cpp` on the line above \
	              the block) into its own file.\n\nThe files are placed in `<name>/src`, where \
	              `<name>` is the document's file stem, together with generated CMakeLists.txt \
	              files. Recognized `#include` lines add the matching find_package calls and \
	              link libraries.\n\nQuick start:\n  autoproject hello.md\n  cd hello/build \
	              && cmake .. && make"
)]
pub struct AutoProjectCli {
	/// Markdown document to extract. Must have the `.md` extension.
	pub file: PathBuf,

	/// Reuse the project directory if it already exists.
	#[arg(long, short, default_value_t = false)]
	pub overwrite: bool,

	/// Directory in which the project directory is created.
	#[arg(long)]
	pub output_dir: Option<PathBuf>,

	/// Config file to use instead of discovering `autoproject.toml` next to
	/// the document.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Output format for the extraction report.
	#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
	pub format: OutputFormat,

	/// Enable verbose output.
	#[arg(long, short, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable list of the extracted files.
	Text,
	/// JSON object with the project name, root directory, files and the
	/// detected CMake dependencies.
	Json,
}
