use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::AutoProjectError;
use crate::AutoProjectResult;
use crate::rules::Rule;
use crate::rules::RuleTable;
use crate::scanner::DEFAULT_FILENAME;
use crate::scanner::SOURCE_EXTENSIONS;
use crate::scanner::ScanOptions;

/// Supported config file locations in discovery order (highest precedence
/// first), relative to the directory holding the input document.
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"autoproject.toml",
	".autoproject.toml",
	".config/autoproject.toml",
];

/// Default `cmake_minimum_required` version.
pub const DEFAULT_CMAKE_VERSION: &str = "3.1";

/// Default `CMAKE_CXX_STANDARD`.
pub const DEFAULT_CXX_STANDARD: u32 = 14;

/// Default warning flags appended to `CMAKE_CXX_FLAGS`.
pub const DEFAULT_CXX_FLAGS: &str = "-Wall -Wextra -pedantic";

/// Configuration loaded from an `autoproject.toml` file.
///
/// ```toml
/// cmake_version = "3.1"
/// cxx_standard = 17
/// cxx_flags = "-Wall -Wextra -pedantic"
/// default_filename = "main.cpp"
/// extensions = ["cc", "cxx"]
///
/// [[rules]]
/// pattern = '\s*#include\s*<zlib.h>'
/// snippet = "find_package(ZLIB REQUIRED)"
/// library = "ZLIB::ZLIB"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AutoProjectConfig {
	/// Version passed to `cmake_minimum_required(VERSION ...)`.
	#[serde(default = "default_cmake_version")]
	pub cmake_version: String,
	#[serde(default = "default_cxx_standard")]
	pub cxx_standard: u32,
	#[serde(default = "default_cxx_flags")]
	pub cxx_flags: String,
	/// Filename used for blocks without a filename caption.
	#[serde(default = "default_filename")]
	pub default_filename: String,
	/// Extra source extensions recognized in captions, on top of `cpp`, `c`,
	/// `h` and `hpp`. A leading dot is optional.
	#[serde(default)]
	pub extensions: Vec<String>,
	/// Extra dependency rules, tested after the builtin ones.
	#[serde(default)]
	pub rules: Vec<RuleConfig>,
}

/// A dependency rule declared in the config file.
#[derive(Debug, Clone, Deserialize, Eq, PartialEq)]
pub struct RuleConfig {
	/// Regular expression searched for in each extracted line.
	pub pattern: String,
	#[serde(default)]
	pub snippet: String,
	#[serde(default)]
	pub library: String,
}

fn default_cmake_version() -> String {
	DEFAULT_CMAKE_VERSION.to_string()
}

fn default_cxx_standard() -> u32 {
	DEFAULT_CXX_STANDARD
}

fn default_cxx_flags() -> String {
	DEFAULT_CXX_FLAGS.to_string()
}

fn default_filename() -> String {
	DEFAULT_FILENAME.to_string()
}

impl Default for AutoProjectConfig {
	fn default() -> Self {
		Self {
			cmake_version: default_cmake_version(),
			cxx_standard: default_cxx_standard(),
			cxx_flags: default_cxx_flags(),
			default_filename: default_filename(),
			extensions: Vec::new(),
			rules: Vec::new(),
		}
	}
}

impl AutoProjectConfig {
	/// Find the first config file candidate that exists in `dir`.
	pub fn resolve_path(dir: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| dir.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config discovered in `dir`. Returns `Ok(None)` when there is
	/// none.
	pub fn load(dir: &Path) -> AutoProjectResult<Option<Self>> {
		let Some(config_path) = Self::resolve_path(dir) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		Self::load_file(&config_path).map(Some)
	}

	/// Load a config from an explicit path.
	pub fn load_file(path: &Path) -> AutoProjectResult<Self> {
		let content = std::fs::read_to_string(path)?;
		Self::parse(&content)
	}

	pub fn parse(content: &str) -> AutoProjectResult<Self> {
		toml::from_str(content).map_err(|e| AutoProjectError::ConfigParse(e.to_string()))
	}

	/// Scanner options derived from this config.
	pub fn scan_options(&self) -> ScanOptions {
		let mut extensions: Vec<String> = SOURCE_EXTENSIONS.iter().map(ToString::to_string).collect();
		for ext in &self.extensions {
			let ext = ext.trim_start_matches('.');
			if !ext.is_empty() && !extensions.iter().any(|known| known == ext) {
				extensions.push(ext.to_string());
			}
		}

		ScanOptions {
			extensions,
			default_filename: self.default_filename.clone(),
		}
	}

	/// The builtin rule table extended with the configured rules.
	pub fn rule_table(&self) -> AutoProjectResult<RuleTable> {
		let extra = self
			.rules
			.iter()
			.map(|rule| Rule::new(&rule.pattern, rule.snippet.as_str(), rule.library.as_str()))
			.collect::<AutoProjectResult<Vec<_>>>()?;

		Ok(RuleTable::with_rules(extra))
	}
}
