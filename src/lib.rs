//! Compile-once materialization of tabular rows into typed records.
//!
//! A target type describes its fields once through [`Record`]. The first time a
//! row is materialized into that type under a given [`BindingConfiguration`],
//! the column resolver matches fields to columns and the compiler turns the
//! result into a [`Materializer`]. The [`MapperCache`] keeps it, so later rows
//! pay only for coercion and assignment.
//!
//! ```
//! use rowbind::{BindingConfiguration, Field, Mapper, Record, Value, ValueRow};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     id: i32,
//!     name: String,
//!     age: Option<i32>,
//! }
//!
//! impl Record for Person {
//!     fn fields() -> Vec<Field<Self>> {
//!         vec![
//!             Field::new("Id", |p: &mut Person, v| p.id = v),
//!             Field::new("Name", |p: &mut Person, v| p.name = v),
//!             Field::new("Age", |p: &mut Person, v| p.age = v),
//!         ]
//!     }
//! }
//!
//! let row = ValueRow::from_pairs([("ID", Value::Int(1)), ("NAME", Value::from("Ada"))]);
//! let mapper = Mapper::new();
//! let person: Person = mapper.materialize(&row, &BindingConfiguration::default())?;
//! assert_eq!(person, Person { id: 1, name: "Ada".into(), age: None });
//! # Ok::<(), rowbind::MapError>(())
//! ```

pub mod binding;
pub mod cache;
pub mod cli;
pub mod coerce;
pub mod columns;
pub mod compiler;
pub mod data;
pub mod error;
pub mod inspect;
pub mod mapper;
pub mod record;
pub mod resolver;
pub mod row;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

pub use crate::{
    binding::BindingConfiguration,
    cache::MapperCache,
    coerce::{FieldKind, FromValue},
    columns::{ColumnSet, column_names, column_names_with},
    compiler::{Materializer, compile},
    data::Value,
    error::{CoercionError, MapError},
    mapper::Mapper,
    record::{Field, FieldInfo, Record},
    resolver::{FieldMapping, resolve},
    row::{Header, Row, ValueRow},
};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("rowbind", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Parsed command line: {:?}", cli.command);
    match cli.command {
        Commands::Columns(args) => inspect::list_columns(&args),
        Commands::Resolve(args) => inspect::resolve_fields(&args),
    }
}
