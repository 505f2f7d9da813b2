use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Inspect how tabular rows bind to record fields", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the canonical column names of a CSV file's header
    Columns(ColumnsArgs),
    /// Resolve record fields against a CSV header under a binding configuration
    Resolve(ResolveArgs),
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Input CSV file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Print column names as they appear instead of case-folded
    #[arg(long)]
    pub raw: bool,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Input CSV file whose header supplies the columns
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Comma-separated record field names, in declaration order
    #[arg(short = 'f', long = "fields", value_delimiter = ',', required = true)]
    pub fields: Vec<String>,
    /// YAML binding configuration file
    #[arg(short = 'b', long = "binding")]
    pub binding: Option<PathBuf>,
    /// Match fields against columns with separators removed (UserId ~ USER_ID)
    #[arg(long = "strip-separators")]
    pub strip_separators: bool,
    /// Field to leave unbound (repeatable)
    #[arg(long = "ignore", action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,
    /// Explicit binding of the form `field=column` (repeatable)
    #[arg(long = "bind", value_parser = parse_binding, action = clap::ArgAction::Append)]
    pub bind: Vec<(String, String)>,
    /// Emit the mapping as JSON
    #[arg(long)]
    pub json: bool,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

pub fn parse_binding(value: &str) -> Result<(String, String), String> {
    let (field, column) = value
        .split_once('=')
        .ok_or_else(|| format!("Binding '{value}' must look like field=column"))?;
    let field = field.trim();
    let column = column.trim();
    if field.is_empty() || column.is_empty() {
        return Err(format!("Binding '{value}' has an empty field or column"));
    }
    Ok((field.to_string(), column.to_string()))
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
