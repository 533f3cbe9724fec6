#![forbid(unsafe_code)]

//! Rule definitions, compilation and registry
//!
//! A rule file is parsed into a [`Definition`], compiled into a [`Check`]
//! holding its prepared regular expressions, and stored in a [`Registry`].
//! The [`resolver`] drives this for whole style directories.

pub mod builtin;
mod check;
pub mod compiler;
pub mod definition;
mod matchers;
pub mod registry;
pub mod resolver;

pub use check::{Check, Matcher, format_message};
pub use compiler::{SCRIPTS_DIR, compile};
pub use definition::{Definition, RuleKind};
pub use registry::Registry;
pub use resolver::{LoadIssue, LoadReport, StyleResolver};
