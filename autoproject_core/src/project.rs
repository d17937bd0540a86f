//! Project materialization: drives the [`Scanner`] over the input document,
//! writes one file per block and emits the CMake build files.

use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::AutoProjectError;
use crate::AutoProjectResult;
use crate::config::AutoProjectConfig;
use crate::rules::RuleTable;
use crate::scanner::Action;
use crate::scanner::ScanState;
use crate::scanner::Scanner;
use crate::scanner::is_plain_filename;

/// Extension (without the dot) required of input documents.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Name of the generated build files.
pub const CMAKE_LISTS: &str = "CMakeLists.txt";

/// Everything collected while scanning a document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Artifacts {
	/// Names of the block files that were materialized.
	pub files: BTreeSet<String>,
	/// Distinct CMake snippets from matched dependency rules.
	pub snippets: BTreeSet<String>,
	/// Distinct link library references from matched dependency rules.
	pub libraries: BTreeSet<String>,
}

/// Options for [`AutoProject::open_with_options`].
#[derive(Debug, Default, Clone)]
pub struct ProjectOptions {
	/// Parent directory of the project root. Defaults to the current
	/// directory.
	pub output_dir: Option<PathBuf>,
	/// Configuration to use. When `None`, a config file next to the input
	/// document is discovered, falling back to the defaults.
	pub config: Option<AutoProjectConfig>,
}

/// The outcome of a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
	/// Project name, taken from the input file stem.
	pub name: String,
	/// Root directory of the generated project.
	pub root: PathBuf,
	/// Materialized block file names, sorted.
	pub files: Vec<String>,
	/// CMake snippets from matched dependency rules, sorted.
	pub snippets: Vec<String>,
	pub libraries: Vec<String>,
}

impl fmt::Display for Extraction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Successfully extracted the following source files:")?;
		for file in &self.files {
			writeln!(f, "{file}")?;
		}
		Ok(())
	}
}

/// Where the generated project lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
	/// Project name, taken from the input file stem.
	pub name: String,
	pub root: PathBuf,
	/// `<root>/src`, holding the block files and the sources build file.
	pub src_dir: PathBuf,
}

impl ProjectLayout {
	pub fn new(output_dir: &Path, name: impl Into<String>) -> Self {
		let name = name.into();
		let root = output_dir.join(&name);
		let src_dir = root.join("src");
		Self {
			name,
			root,
			src_dir,
		}
	}

	pub fn build_dir(&self) -> PathBuf {
		self.root.join("build")
	}

	/// Create `<root>/src` and `<root>/build`. Fails before touching the
	/// filesystem when the root exists and `overwrite` is off.
	pub fn make_tree(&self, overwrite: bool) -> AutoProjectResult<()> {
		if self.root.exists() && !overwrite {
			return Err(AutoProjectError::AlreadyExists {
				path: self.root.display().to_string(),
			});
		}

		for dir in [self.src_dir.clone(), self.build_dir()] {
			std::fs::create_dir_all(&dir).map_err(|source| {
				AutoProjectError::CreateDirectory {
					path: dir.display().to_string(),
					source,
				}
			})?;
		}
		info!(root = %self.root.display(), "created project tree");

		Ok(())
	}

	fn write_src_level(&self, config: &AutoProjectConfig, artifacts: &Artifacts) -> AutoProjectResult<()> {
		let content = render_src_cmake(&self.name, config, artifacts);
		std::fs::write(self.src_dir.join(CMAKE_LISTS), content)?;
		Ok(())
	}

	fn write_top_level(&self, config: &AutoProjectConfig) -> AutoProjectResult<()> {
		let content = render_root_cmake(&self.name, config);
		std::fs::write(self.root.join(CMAKE_LISTS), content)?;
		Ok(())
	}
}

/// A markdown document ready to be turned into a CMake project.
#[derive(Debug)]
pub struct AutoProject {
	input: PathBuf,
	layout: ProjectLayout,
	reader: BufReader<File>,
	config: AutoProjectConfig,
	rules: RuleTable,
}

impl AutoProject {
	/// Open `path` using the default options.
	pub fn open(path: impl AsRef<Path>) -> AutoProjectResult<Self> {
		Self::open_with_options(path, ProjectOptions::default())
	}

	/// Validate and open the input document. Nothing is written to disk
	/// here.
	pub fn open_with_options(path: impl AsRef<Path>, options: ProjectOptions) -> AutoProjectResult<Self> {
		let input = path.as_ref().to_path_buf();

		if input.extension().and_then(|ext| ext.to_str()) != Some(MARKDOWN_EXTENSION) {
			return Err(AutoProjectError::FileExtension {
				path: input.display().to_string(),
			});
		}

		let file = File::open(&input).map_err(|source| AutoProjectError::InputOpen {
			path: input.display().to_string(),
			source,
		})?;

		let name = input
			.file_stem()
			.map(|stem| stem.to_string_lossy().into_owned())
			.unwrap_or_default();

		let config = match options.config {
			Some(config) => config,
			None => {
				let dir = input.parent().unwrap_or_else(|| Path::new(""));
				AutoProjectConfig::load(dir)?.unwrap_or_default()
			}
		};
		let rules = config.rule_table()?;
		let layout = ProjectLayout::new(&options.output_dir.unwrap_or_default(), name);

		Ok(Self {
			input,
			layout,
			reader: BufReader::new(file),
			config,
			rules,
		})
	}

	pub fn name(&self) -> &str {
		&self.layout.name
	}

	pub fn layout(&self) -> &ProjectLayout {
		&self.layout
	}

	/// Scan the document and write the project tree.
	///
	/// The tree is only created once the first block opens. When no block
	/// is materialized the result is [`AutoProjectError::NothingExtracted`]
	/// and no build files are written.
	#[tracing::instrument(skip_all, fields(input = %self.input.display()))]
	pub fn create_project(self, overwrite: bool) -> AutoProjectResult<Extraction> {
		let Self {
			input,
			layout,
			mut reader,
			config,
			rules,
		} = self;

		let mut scanner = Scanner::new(config.scan_options());
		let mut materializer = Materializer {
			layout: &layout,
			rules: &rules,
			overwrite,
			tree_created: false,
			current: None,
			artifacts: Artifacts::default(),
		};

		let mut buf = Vec::new();
		loop {
			buf.clear();
			if reader.read_until(b'\n', &mut buf)? == 0 {
				break;
			}
			let raw = trim_line_ending(&buf);
			let line = String::from_utf8_lossy(raw);
			let verbatim = scanner.state() == ScanState::InDelimitedBlock;

			match scanner.step(&line) {
				Some(Action::Write(_)) if verbatim => materializer.write_verbatim(&line, raw)?,
				Some(action) => materializer.apply(&mut scanner, action)?,
				None => {}
			}
		}
		if let Some(action) = scanner.finish() {
			materializer.apply(&mut scanner, action)?;
		}

		let artifacts = materializer.into_artifacts();
		if artifacts.files.is_empty() {
			return Err(AutoProjectError::NothingExtracted {
				path: input.display().to_string(),
			});
		}

		layout.write_src_level(&config, &artifacts)?;
		layout.write_top_level(&config)?;
		let copy = layout
			.src_dir
			.join(format!("{}.{MARKDOWN_EXTENSION}", layout.name));
		std::fs::copy(&input, &copy)?;
		info!(root = %layout.root.display(), files = artifacts.files.len(), "project created");

		Ok(Extraction {
			name: layout.name,
			root: layout.root,
			files: artifacts.files.into_iter().collect(),
			snippets: artifacts.snippets.into_iter().collect(),
			libraries: artifacts.libraries.into_iter().collect(),
		})
	}
}

/// The line without its `\n` or `\r\n` terminator.
fn trim_line_ending(line: &[u8]) -> &[u8] {
	let line = line.strip_suffix(b"\n").unwrap_or(line);
	line.strip_suffix(b"\r").unwrap_or(line)
}

/// Render the sources-level `CMakeLists.txt`.
pub fn render_src_cmake(name: &str, config: &AutoProjectConfig, artifacts: &Artifacts) -> String {
	let mut out = format!(
		"cmake_minimum_required(VERSION {})\nset(EXECUTABLE_NAME \"{name}\")\n",
		config.cmake_version
	);
	for snippet in &artifacts.snippets {
		out.push_str(snippet);
		out.push('\n');
	}

	out.push_str("add_executable(${EXECUTABLE_NAME}");
	for file in &artifacts.files {
		out.push(' ');
		out.push_str(file);
	}
	out.push_str(")\ntarget_link_libraries(${EXECUTABLE_NAME}");
	for library in &artifacts.libraries {
		out.push(' ');
		out.push_str(library);
	}
	out.push_str(")\n");

	out
}

/// Render the root `CMakeLists.txt`.
pub fn render_root_cmake(name: &str, config: &AutoProjectConfig) -> String {
	format!(
		"cmake_minimum_required(VERSION {version})\nproject({name})\nset(CMAKE_CXX_STANDARD \
		 {standard})\nset(CMAKE_CXX_FLAGS \"${{CMAKE_CXX_FLAGS}} {flags}\")\nadd_subdirectory(src)\n",
		version = config.cmake_version,
		standard = config.cxx_standard,
		flags = config.cxx_flags,
	)
}

/// An open block file. Dropping it closes the handle on every path.
struct BlockFile {
	name: String,
	writer: BufWriter<File>,
	lines: usize,
}

impl BlockFile {
	fn create(path: &Path, name: String) -> std::io::Result<Self> {
		let file = File::create(path)?;
		Ok(Self {
			name,
			writer: BufWriter::new(file),
			lines: 0,
		})
	}

	fn write_line(&mut self, line: &str) -> std::io::Result<()> {
		self.lines += 1;
		writeln!(self.writer, "{line}")
	}

	fn write_bytes(&mut self, line: &[u8]) -> std::io::Result<()> {
		self.lines += 1;
		self.writer.write_all(line)?;
		self.writer.write_all(b"\n")
	}

	fn finish(mut self) -> std::io::Result<()> {
		self.writer.flush()?;
		debug!(file = %self.name, lines = self.lines, "closed block");
		Ok(())
	}
}

/// Applies scanner actions to the filesystem during a single pass.
struct Materializer<'a> {
	layout: &'a ProjectLayout,
	rules: &'a RuleTable,
	overwrite: bool,
	tree_created: bool,
	current: Option<BlockFile>,
	artifacts: Artifacts,
}

impl Materializer<'_> {
	fn into_artifacts(self) -> Artifacts {
		self.artifacts
	}

	fn apply(&mut self, scanner: &mut Scanner, action: Action) -> AutoProjectResult<()> {
		match action {
			Action::Open {
				filename,
				kind,
				first_line,
			} => {
				if !self.tree_created {
					self.layout.make_tree(self.overwrite)?;
					self.tree_created = true;
				}

				let Some(mut file) = self.create_block(&filename) else {
					scanner.reject_open();
					return Ok(());
				};
				debug!(file = %filename, ?kind, "opened block");

				if let Some(line) = first_line {
					self.rules.check(&line, &mut self.artifacts);
					file.write_line(&line)?;
				}
				self.artifacts.files.insert(filename);
				self.current = Some(file);
			}
			Action::Write(line) => {
				if let Some(file) = self.current.as_mut() {
					self.rules.check(&line, &mut self.artifacts);
					file.write_line(&line)?;
				}
			}
			Action::Close => {
				if let Some(file) = self.current.take() {
					file.finish()?;
				}
			}
		}

		Ok(())
	}

	/// Write a delimited line as its original bytes. `line` is its decoded
	/// form, used for rule matching.
	fn write_verbatim(&mut self, line: &str, raw: &[u8]) -> AutoProjectResult<()> {
		if let Some(file) = self.current.as_mut() {
			self.rules.check(line, &mut self.artifacts);
			file.write_bytes(raw)?;
		}
		Ok(())
	}

	fn create_block(&self, filename: &str) -> Option<BlockFile> {
		if !is_plain_filename(filename) {
			warn!(file = %filename, "skipping block: not a plain file name");
			return None;
		}

		let path = self.layout.src_dir.join(filename);
		match BlockFile::create(&path, filename.to_string()) {
			Ok(file) => Some(file),
			Err(error) => {
				warn!(file = %path.display(), %error, "skipping block: cannot create file");
				None
			}
		}
	}
}
