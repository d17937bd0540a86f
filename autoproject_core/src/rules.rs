//! Dependency rules mapping recognized `#include` lines to CMake snippets and
//! link libraries.

use std::sync::LazyLock;

use regex::Regex;

use crate::AutoProjectError;
use crate::AutoProjectResult;
use crate::project::Artifacts;

/// The builtin rule rows as `(pattern, snippet, library)`. Snippets may span
/// several CMake statements. An empty snippet records only the library.
const BUILTIN_RULES: &[(&str, &str, &str)] = &[
	(r"\s*#include\s*<(experimental/)?filesystem>", "", "stdc++fs"),
	(
		r"\s*#include\s*<thread>",
		"find_package(Threads REQUIRED)",
		"${CMAKE_THREAD_LIBS_INIT}",
	),
	(
		r"\s*#include\s*<future>",
		"find_package(Threads REQUIRED)",
		"${CMAKE_THREAD_LIBS_INIT}",
	),
	(
		r"\s*#include\s*<SFML/Graphics.hpp>",
		"find_package(SFML REQUIRED COMPONENTS System Window Graphics)\n\
		 include_directories(${SFML_INCLUDE_DIR})",
		"${SFML_LIBRARIES}",
	),
	(
		r"\s*#include\s*<GL/glew.h>",
		"find_package(GLEW REQUIRED)",
		"${GLEW_LIBRARIES}",
	),
	(
		r"\s*#include\s*<GL/glut.h>",
		"find_package(GLUT REQUIRED)\nfind_package(OpenGL REQUIRED)",
		"${OPENGL_LIBRARIES} ${GLUT_LIBRARIES}",
	),
	(
		r"\s*#include\s*<OpenGL/gl.h>",
		"find_package(OpenGL REQUIRED)",
		"${OPENGL_LIBRARIES}",
	),
	(
		r"\s*#include\s*<SDL2/SDL.h>",
		"find_package(SDL2 REQUIRED)",
		"${SDL2_LIBRARIES}",
	),
	// SDL2_ttf does not ship a CMake package yet.
	(
		r"\s*#include\s*<SDL2/SDL_ttf.h>",
		"find_package(SDL2_ttf REQUIRED)",
		"${SDL2_TTF_LIBRARIES}",
	),
	(
		r"\s*#include\s*<GLFW/glfw3.h>",
		"find_package(glfw3 REQUIRED)",
		"glfw",
	),
	(
		r"\s*#include\s*<boost/regex.hpp>",
		"find_package(Boost REQUIRED COMPONENTS regex)",
		"${Boost_LIBRARIES}",
	),
	(
		r"\s*#include\s*<png.h>",
		"find_package(PNG REQUIRED)",
		"${PNG_LIBRARIES}",
	),
	(
		r"\s*#include\s*<ncurses.h>",
		"find_package(Curses REQUIRED)",
		"${CURSES_LIBRARIES}",
	),
	(
		r"\s*#include\s*<SDL2.SDL.h>",
		"include(FindPkgConfig)\nPKG_SEARCH_MODULE(SDL2 REQUIRED \
		 sdl2)\nINCLUDE_DIRECTORIES(${SDL2_INCLUDE_DIRS})",
		"${SDL2_LIBRARIES}",
	),
	(
		r"\s*#include\s*<QString>",
		"find_package(Qt5Widgets)\nset(CMAKE_AUTOMOC ON)\nset(CMAKE_AUTOUIC \
		 ON)\nset(CMAKE_INCLUDE_CURRENT_DIR ON)",
		"Qt5::Widgets",
	),
	(
		r"\s*#include\s*<openssl/ssl.h>",
		"find_package(OpenSSL REQUIRED)",
		"${OPENSSL_LIBRARIES}",
	),
];

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(|| {
	let rules = BUILTIN_RULES
		.iter()
		.map(|&(pattern, snippet, library)| Rule::new(pattern, snippet, library))
		.collect::<AutoProjectResult<Vec<_>>>()
		.expect("builtin rule patterns are valid");

	RuleTable { rules }
});

/// One `(pattern, snippet, library)` row.
#[derive(Debug, Clone)]
pub struct Rule {
	pattern: Regex,
	snippet: String,
	library: String,
}

impl Rule {
	pub fn new(
		pattern: &str,
		snippet: impl Into<String>,
		library: impl Into<String>,
	) -> AutoProjectResult<Self> {
		let pattern = Regex::new(pattern).map_err(|e| {
			AutoProjectError::InvalidRule {
				pattern: pattern.to_string(),
				reason: e.to_string(),
			}
		})?;

		Ok(Self {
			pattern,
			snippet: snippet.into(),
			library: library.into(),
		})
	}

	pub fn is_match(&self, line: &str) -> bool {
		self.pattern.is_match(line)
	}

	pub fn pattern(&self) -> &str {
		self.pattern.as_str()
	}

	pub fn snippet(&self) -> &str {
		&self.snippet
	}

	pub fn library(&self) -> &str {
		&self.library
	}
}

/// Ordered, immutable table of dependency rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
	rules: Vec<Rule>,
}

impl Default for RuleTable {
	fn default() -> Self {
		Self::builtin().clone()
	}
}

impl RuleTable {
	/// The builtin table, compiled once.
	pub fn builtin() -> &'static Self {
		&BUILTIN
	}

	/// The builtin table followed by `extra` rows.
	pub fn with_rules(extra: impl IntoIterator<Item = Rule>) -> Self {
		let mut table = Self::default();
		table.rules.extend(extra);
		table
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Every rule matching `line`. All rows are tested; one line may match
	/// several of them.
	pub fn matching<'a>(&'a self, line: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
		self.rules.iter().filter(move |rule| rule.is_match(line))
	}

	/// Record the snippets and libraries of all rules matching `line`.
	pub fn check(&self, line: &str, artifacts: &mut Artifacts) {
		for rule in self.matching(line) {
			tracing::debug!(pattern = rule.pattern(), "dependency rule matched");

			if !rule.snippet.is_empty() {
				artifacts.snippets.insert(rule.snippet.clone());
			}
			if !rule.library.is_empty() {
				artifacts.libraries.insert(rule.library.clone());
			}
		}
	}
}
