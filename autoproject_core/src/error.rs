use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum AutoProjectError {
	#[error(transparent)]
	#[diagnostic(code(autoproject::io_error))]
	Io(#[from] std::io::Error),

	#[error("input file `{path}` must have the `.md` extension")]
	#[diagnostic(
		code(autoproject::file_extension),
		help("rename the document so that it ends with `.md`")
	)]
	FileExtension { path: String },

	#[error("cannot open input file `{path}`")]
	#[diagnostic(code(autoproject::input_open))]
	InputOpen {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("`{path}` already exists: will not overwrite")]
	#[diagnostic(
		code(autoproject::already_exists),
		help("pass `--overwrite` to reuse the existing project directory")
	)]
	AlreadyExists { path: String },

	#[error("cannot create directory `{path}`")]
	#[diagnostic(code(autoproject::create_directory))]
	CreateDirectory {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("no source files were extracted from `{path}`")]
	#[diagnostic(
		code(autoproject::nothing_extracted),
		help(
			"put a filename such as `main.cpp` on the line directly above each fenced or \
			 indented code block"
		)
	)]
	NothingExtracted { path: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(autoproject::config_parse),
		help("check that autoproject.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("invalid dependency rule pattern `{pattern}`: {reason}")]
	#[diagnostic(code(autoproject::invalid_rule))]
	InvalidRule { pattern: String, reason: String },
}

pub type AutoProjectResult<T> = Result<T, AutoProjectError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
