//! Line classification and block boundary detection.
//!
//! The [`Scanner`] is a pure state machine: it is fed one line at a time and
//! answers with an optional [`Action`] describing what should happen to the
//! output. It never touches the filesystem, which keeps the boundary rules
//! testable on their own.

use std::borrow::Cow;
use std::path::Component;
use std::path::Path;

/// Column width of one indentation unit. Lines indented at least this far
/// form indented code blocks, and exactly one unit is removed when they are
/// copied to the output.
pub const INDENT_WIDTH: usize = 4;

/// Minimum run of fence characters that makes a delimiter line.
pub const FENCE_LENGTH: usize = 3;

/// Characters accepted as fences. Opening and closing fences do not need to
/// use the same one.
pub const FENCE_CHARS: [char; 2] = ['`', '~'];

/// Name given to blocks that have no filename caption.
pub const DEFAULT_FILENAME: &str = "main.cpp";

/// Extensions (without the leading dot) that make a caption a source file
/// name.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["cpp", "c", "h", "hpp"];

/// Options controlling how captions are recognized.
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Recognized source extensions, without the leading dot.
	pub extensions: Vec<String>,
	/// Filename for un-captioned blocks.
	pub default_filename: String,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			extensions: SOURCE_EXTENSIONS.iter().map(ToString::to_string).collect(),
			default_filename: DEFAULT_FILENAME.to_string(),
		}
	}
}

impl ScanOptions {
	/// Returns true when `name` ends in one of the recognized extensions.
	pub fn is_source_extension(&self, name: &str) -> bool {
		Path::new(name)
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| self.extensions.iter().any(|known| known == ext))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
	Outside,
	InIndentedBlock,
	InDelimitedBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
	/// Lines indented by at least one indentation unit.
	Indented,
	/// Lines between two fence lines, copied verbatim.
	Delimited,
}

/// What the caller should do in response to a scanned line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	/// Open a new block file. Indented blocks start on the line that opened
	/// them, so that line is carried along already stripped of its
	/// indentation unit.
	Open {
		filename: String,
		kind: BlockKind,
		first_line: Option<String>,
	},
	/// Append a line to the open block.
	Write(String),
	/// Close the open block.
	Close,
}

/// Explicit three-state machine over the lines of a markdown document.
#[derive(Debug)]
pub struct Scanner {
	state: ScanState,
	/// The last non-blank, non-underline line seen outside a block.
	caption: Option<String>,
	/// Only the first block of a document may be an un-captioned indented
	/// block.
	first_block: bool,
	options: ScanOptions,
}

impl Default for Scanner {
	fn default() -> Self {
		Self::new(ScanOptions::default())
	}
}

impl Scanner {
	pub fn new(options: ScanOptions) -> Self {
		Self {
			state: ScanState::Outside,
			caption: None,
			first_block: true,
			options,
		}
	}

	pub fn state(&self) -> ScanState {
		self.state
	}

	/// The current caption candidate, if any.
	pub fn caption(&self) -> Option<&str> {
		self.caption.as_deref()
	}

	/// Feed the next line of the document.
	pub fn step(&mut self, raw: &str) -> Option<Action> {
		let line = expand_leading_tabs(raw);

		match self.state {
			ScanState::InIndentedBlock => {
				if is_indented_or_blank(&line) {
					return Some(Action::Write(strip_indent_unit(&line).to_string()));
				}

				// The terminating line may caption the next block directly.
				self.state = ScanState::Outside;
				self.caption = Some(line.into_owned());
				Some(Action::Close)
			}
			ScanState::InDelimitedBlock => {
				if is_delimiter(&line) {
					self.state = ScanState::Outside;
					self.caption = None;
					return Some(Action::Close);
				}

				Some(Action::Write(raw.to_string()))
			}
			ScanState::Outside => self.step_outside(line),
		}
	}

	fn step_outside(&mut self, line: Cow<'_, str>) -> Option<Action> {
		if is_delimiter(&line) {
			let filename = self
				.caption_filename()
				.unwrap_or_else(|| self.options.default_filename.clone());

			return Some(self.open(filename, BlockKind::Delimited, None));
		}

		if is_non_empty_indented(&line) {
			let filename = match self.caption_filename() {
				Some(filename) => filename,
				None if self.first_block => self.options.default_filename.clone(),
				None => return None,
			};
			let first_line = strip_indent_unit(&line).to_string();

			return Some(self.open(filename, BlockKind::Indented, Some(first_line)));
		}

		if !is_empty_or_underline(&line) {
			self.caption = Some(line.into_owned());
		}

		None
	}

	fn open(&mut self, filename: String, kind: BlockKind, first_line: Option<String>) -> Action {
		self.first_block = false;
		self.caption = None;
		self.state = match kind {
			BlockKind::Indented => ScanState::InIndentedBlock,
			BlockKind::Delimited => ScanState::InDelimitedBlock,
		};

		Action::Open {
			filename,
			kind,
			first_line,
		}
	}

	/// Called when the block announced by the last [`Action::Open`] could not
	/// be materialized. Its lines are then treated as ordinary document text.
	pub fn reject_open(&mut self) {
		self.state = ScanState::Outside;
	}

	/// Signal the end of input. Returns [`Action::Close`] when a block is
	/// still open.
	pub fn finish(&mut self) -> Option<Action> {
		if self.state == ScanState::Outside {
			return None;
		}

		self.state = ScanState::Outside;
		Some(Action::Close)
	}

	fn caption_filename(&self) -> Option<String> {
		let caption = self.caption.as_deref()?;
		source_filename(caption, &self.options)
	}
}

/// Returns the bare filename named by a caption line, if the line looks like
/// a source file name once its markdown decoration is removed.
pub fn source_filename(caption: &str, options: &ScanOptions) -> Option<String> {
	let name = trim_decoration(caption);
	options
		.is_source_extension(name)
		.then(|| name.to_string())
}

/// Strip heading markers, emphasis, `<b>` tags, quotes and trailing `-` or
/// `:` from a caption, repeating until nothing more can be removed.
pub fn trim_decoration(line: &str) -> &str {
	let mut current = line;

	loop {
		let next = trim_decoration_once(current);
		if next.len() == current.len() {
			return next;
		}
		current = next;
	}
}

fn trim_decoration_once(line: &str) -> &str {
	let line = line.trim().trim_matches('#').trim();
	let line = line.trim_matches('*').trim();
	let line = line.strip_prefix("<b>").unwrap_or(line);
	let line = line.strip_suffix("</b>").unwrap_or(line).trim();
	let line = line.trim_matches('"').trim();
	line.trim_end_matches(['-', ':']).trim()
}

/// Returns true when `name` is a single plain file name that can safely be
/// joined onto the sources directory.
pub fn is_plain_filename(name: &str) -> bool {
	let mut components = Path::new(name).components();
	matches!(
		(components.next(), components.next()),
		(Some(Component::Normal(_)), None)
	)
}

/// A line starting with a run of at least [`FENCE_LENGTH`] identical fence
/// characters.
pub fn is_delimiter(line: &str) -> bool {
	FENCE_CHARS.iter().any(|&fence| {
		line.chars().take_while(|&c| c == fence).count() >= FENCE_LENGTH
	})
}

fn leading_spaces(line: &str) -> Option<usize> {
	line.find(|c: char| c != ' ')
}

pub fn is_non_empty_indented(line: &str) -> bool {
	leading_spaces(line).is_some_and(|indent| indent >= INDENT_WIDTH)
}

/// Lines made only of spaces count as part of an indented block.
pub fn is_indented_or_blank(line: &str) -> bool {
	leading_spaces(line).is_none_or(|indent| indent >= INDENT_WIDTH)
}

/// Empty lines and `---` style setext underlines never become captions.
pub fn is_empty_or_underline(line: &str) -> bool {
	line.chars().all(|c| c == '-')
}

/// Replace each leading tab with one indentation unit of spaces.
pub fn expand_leading_tabs(line: &str) -> Cow<'_, str> {
	let tabs = line.chars().take_while(|&c| c == '\t').count();
	if tabs == 0 {
		return Cow::Borrowed(line);
	}

	let mut expanded = " ".repeat(tabs * INDENT_WIDTH);
	expanded.push_str(&line[tabs..]);
	Cow::Owned(expanded)
}

/// Remove exactly one indentation unit. Short lines are kept as they are.
pub fn strip_indent_unit(line: &str) -> &str {
	if line.len() < INDENT_WIDTH {
		return line;
	}

	let mut chars = line.chars();
	let skip = if line.starts_with(' ') { INDENT_WIDTH } else { 1 };
	for _ in 0..skip {
		chars.next();
	}
	chars.as_str()
}
