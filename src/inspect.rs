//! `columns` and `resolve` command handlers.
//!
//! Both commands read only the header of a CSV file and run it through the same
//! column-set and resolver code the mapper uses at runtime.

use std::{
    io::{self, Write},
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    binding::BindingConfiguration,
    cli::{ColumnsArgs, ResolveArgs},
    coerce::FieldKind,
    columns::{ColumnSet, column_names},
    record::FieldInfo,
    resolver::{FieldMapping, resolve},
    row::{Header, ValueRow},
};

fn read_header(path: &Path, delimiter: Option<u8>) -> Result<Arc<Header>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter.unwrap_or(b','))
        .from_path(path)
        .with_context(|| format!("Opening CSV file {path:?}"))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Reading header row from {path:?}"))?;
    Ok(Arc::new(Header::from_record(headers)))
}

pub fn list_columns(args: &ColumnsArgs) -> Result<()> {
    let header = read_header(&args.input, args.delimiter)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.raw {
        for name in header.names() {
            writeln!(out, "{name}")?;
        }
    } else {
        let row = ValueRow::new(Arc::clone(&header), Vec::new());
        for name in column_names(&row) {
            writeln!(out, "{name}")?;
        }
    }
    info!("Listed {} column(s) from {:?}", header.len(), args.input);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ResolveReport<'a> {
    mapping: &'a FieldMapping,
    unresolved: Vec<&'a str>,
}

fn effective_configuration(args: &ResolveArgs) -> Result<BindingConfiguration> {
    let base = match &args.binding {
        Some(path) => BindingConfiguration::load(path)?,
        None => BindingConfiguration::default(),
    };
    let overrides = args.bind.iter().fold(
        args.ignore.iter().fold(
            BindingConfiguration::new().with_stripping_convention(args.strip_separators),
            |config, field| config.ignore(field.as_str()),
        ),
        |config, (field, column)| config.bind(field.as_str(), column.as_str()),
    );
    Ok(base.merge(overrides))
}

pub fn resolve_fields(args: &ResolveArgs) -> Result<()> {
    let header = read_header(&args.input, args.delimiter)?;
    let config = effective_configuration(args)?;
    let row = ValueRow::new(Arc::clone(&header), Vec::new());
    let columns = ColumnSet::from_row(&row);

    let fields: Vec<&str> = args
        .fields
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .collect();
    let infos = fields
        .iter()
        .map(|name| FieldInfo::new(*name, FieldKind::Primitive));
    let mapping = resolve(&columns, infos, &config);
    let unresolved: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|field| !mapping.contains_field(field))
        .collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        let report = ResolveReport {
            mapping: &mapping,
            unresolved,
        };
        serde_json::to_writer_pretty(&mut out, &report).context("Writing JSON report")?;
        writeln!(out)?;
    } else {
        let width = fields.iter().map(|f| f.len()).max().unwrap_or(0).max(5);
        writeln!(out, "{:<width$}  column", "field")?;
        for field in &fields {
            let column = mapping.column_for(field).unwrap_or("-");
            writeln!(out, "{field:<width$}  {column}")?;
        }
    }
    info!(
        "Resolved {} of {} field(s) against {} column(s)",
        mapping.len(),
        fields.len(),
        columns.len()
    );
    Ok(())
}
