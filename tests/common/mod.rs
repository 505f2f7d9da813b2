#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use rowbind::{
    CoercionError, Field, FieldKind, FromValue, Header, Record, Value, ValueRow,
};
use rust_decimal::Decimal;
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub age: Option<i32>,
}

impl Record for Person {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("Id", |p: &mut Person, v| p.id = v),
            Field::new("Name", |p: &mut Person, v| p.name = v),
            Field::new("Age", |p: &mut Person, v| p.age = v),
        ]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    #[default]
    Basic,
    Silver,
    Gold,
}

impl FromValue for Tier {
    const KIND: FieldKind = FieldKind::Primitive;
    const TYPE_NAME: &'static str = "tier";

    fn from_value(value: &Value) -> Result<Self, CoercionError> {
        match value {
            Value::Null => Err(CoercionError::UnexpectedNull {
                expected: Self::TYPE_NAME,
            }),
            Value::Text(raw) => match raw.to_ascii_lowercase().as_str() {
                "basic" => Ok(Tier::Basic),
                "silver" => Ok(Tier::Silver),
                "gold" => Ok(Tier::Gold),
                _ => Err(CoercionError::Unparsable {
                    expected: Self::TYPE_NAME,
                    value: raw.clone(),
                }),
            },
            other => Err(CoercionError::Incompatible {
                expected: Self::TYPE_NAME,
                found: other.type_name(),
            }),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Address {
    pub city: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Account {
    pub user_id: i64,
    pub display_name: Option<String>,
    pub balance: Decimal,
    pub active: bool,
    pub opened_on: Option<NaiveDate>,
    pub tier: Tier,
    pub address: Address,
}

impl Record for Account {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("user_id", |a: &mut Account, v| a.user_id = v),
            Field::new("display_name", |a: &mut Account, v| a.display_name = v),
            Field::new("balance", |a: &mut Account, v| a.balance = v),
            Field::new("active", |a: &mut Account, v| a.active = v),
            Field::new("opened_on", |a: &mut Account, v| a.opened_on = v),
            Field::new("tier", |a: &mut Account, v| a.tier = v),
            Field::composite("address"),
        ]
    }
}

/// Declares `id` twice, which the compiler must reject.
#[derive(Debug, Default)]
pub struct DuplicateId {
    pub id: i32,
}

impl Record for DuplicateId {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("id", |r: &mut DuplicateId, v: i32| r.id = v),
            Field::new("ID", |r: &mut DuplicateId, v: i32| r.id = v),
            Field::new("id", |r: &mut DuplicateId, v: i64| r.id = v as i32),
        ]
    }
}

pub fn person_row(id: Value, name: Value) -> ValueRow {
    ValueRow::from_pairs([("ID", id), ("NAME", name)])
}

pub fn csv_rows(input: &str) -> Vec<ValueRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());
    let header = Arc::new(Header::from_record(reader.headers().expect("headers")));
    reader
        .records()
        .map(|record| ValueRow::from_record(Arc::clone(&header), &record.expect("record")))
        .collect()
}
