//! `argbind` matches command line argument vectors against a declared option
//! schema, writing the matched values straight into your variables.
//!
//! The schema is declarative: each variable is bound to a *field* together
//! with the declarations describing it (short/long names, how many argument
//! tokens it consumes, whether it is required, a description, or a positional
//! parameter slot).  Sealing the schema runs a consistency pass over the
//! whole declaration set; the resulting parser is reusable and never
//! inspects your types directly, it only drives the capture handles it was
//! given.
//!
//! Matching follows the common Unix conventions:
//! * `--name` matches a long option; `-name` matches a short option (short
//!   names may be longer than one character).
//! * An option declared with `ArgCount(n)` consumes the next `n` tokens as
//!   its arguments, whatever they look like.
//! * `-xyz` matches the merged short options `-x -y -z`, unless an exact
//!   short name `xyz` exists or merging was disabled.
//! * `--` ends option matching; everything after it is positional.
//!
//! # Usage
//! ```
//! use argbind::{Binder, FieldDeclaration, Scalar, Switch};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut verbose = false;
//! let mut level = String::from("info");
//! let mut input = String::new();
//!
//! let mut binder = Binder::new();
//! binder.bind(
//!     Switch::new(&mut verbose, true),
//!     vec![
//!         FieldDeclaration::ShortName("v".to_string()),
//!         FieldDeclaration::LongName("verbose".to_string()),
//!     ],
//! )?;
//! binder.bind(
//!     Scalar::new(&mut level),
//!     vec![
//!         FieldDeclaration::LongName("level".to_string()),
//!         FieldDeclaration::ArgCount(1),
//!     ],
//! )?;
//! binder.params("1..1")?;
//! binder.bind_param(Scalar::new(&mut input), 0)?;
//!
//! let mut parser = binder.seal()?;
//! parser.parse(["--level", "debug", "-v", "data.txt"])?;
//! drop(parser);
//!
//! assert!(verbose);
//! assert_eq!(level, "debug");
//! assert_eq!(input, "data.txt");
//! # Ok(())
//! # }
//! ```
//!
//! Schema mistakes (duplicate names, annotations on unnamed fields, ..)
//! surface as [`DefinitionError`]s when binding or sealing; mistakes in the
//! argument vector surface as [`UsageError`]s from
//! [`parse`](CliParser::parse), ready to be rendered alongside the
//! [`print_usage`](CliParser::print_usage) listing.
mod api;
mod capture;
mod collection;
mod declaration;
mod errors;
mod matcher;
mod model;
mod printer;
mod registry;

pub use api::{Binder, CliParser};
pub use capture::{
    BoolArg, BoolLiterals, Capturable, Collection, InvalidCapture, InvalidLiterals, Scalar, Switch,
};
pub use collection::Collectable;
pub use declaration::{FieldDeclaration, StructDeclaration};
pub use errors::{DefinitionError, UsageError};
pub use model::Multiplicity;
pub use printer::UsagePrinter;
pub use registry::{FieldId, OptionRegistry};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
