//! `autoproject_core` turns the code blocks of a markdown document into a
//! buildable CMake project. Each captioned code block becomes one source file,
//! and recognized `#include` lines pull the matching `find_package` calls and
//! link libraries into the generated `CMakeLists.txt`.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document
//!   → Scanner (classifies each line, opens and closes blocks)
//!   → Rule table (maps #include lines to CMake snippets and libraries)
//!   → Project materializer (writes block files, CMakeLists.txt, copies the input)
//! ```
//!
//! ## Modules
//!
//! - [`scanner`] — The line-by-line state machine deciding block boundaries
//!   and filename captions.
//! - [`rules`] — The dependency rule table.
//! - [`project`] — Directory tree creation, block files and build file
//!   emission.
//! - [`config`] — Optional `autoproject.toml` overrides.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autoproject_core::AutoProject;
//!
//! let project = AutoProject::open("hello.md").unwrap();
//! let extraction = project.create_project(false).unwrap();
//! print!("{extraction}");
//! ```

pub use config::*;
pub use error::*;
pub use project::*;
pub use rules::*;
pub use scanner::*;

pub mod config;
#[allow(unused_assignments)]
mod error;
pub mod project;
pub mod rules;
pub mod scanner;
