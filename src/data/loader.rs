use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::model::{Passenger, PassengerDataset, Pclass, Port, Sex};

/// Column names of the passenger table, in file order.
pub const COLUMNS: [&str; 12] = [
    "PassengerId",
    "Survived",
    "Pclass",
    "Name",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Ticket",
    "Fare",
    "Cabin",
    "Embarked",
];

/// Why the passenger table could not be loaded. Always fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}, column {column}: {reason}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the passenger table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`           – comma-separated with a header row
/// * `.tsv` / `.tab`  – tab-separated with a header row
/// * `.parquet`       – the same columns written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<PassengerDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let open = || {
        File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    match ext.as_str() {
        "csv" => load_delimited(open()?, b','),
        "tsv" | "tab" => load_delimited(open()?, b'\t'),
        "parquet" | "pq" => load_parquet(open()?),
        other => Err(LoadError::UnsupportedExtension(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Raw row shared by both readers
// ---------------------------------------------------------------------------

/// One row as read, before validation.
#[derive(Debug, Deserialize)]
struct RawPassenger {
    #[serde(rename = "PassengerId")]
    id: i64,
    #[serde(rename = "Survived")]
    survived: i64,
    #[serde(rename = "Pclass")]
    pclass: i64,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Sex")]
    sex: String,
    #[serde(rename = "Age")]
    age: Option<f64>,
    #[serde(rename = "SibSp")]
    sib_sp: i64,
    #[serde(rename = "Parch")]
    parch: i64,
    #[serde(rename = "Ticket")]
    ticket: String,
    #[serde(rename = "Fare")]
    fare: Option<f64>,
    #[serde(rename = "Cabin")]
    cabin: Option<String>,
    #[serde(rename = "Embarked")]
    embarked: Option<String>,
}

impl RawPassenger {
    fn validate(self, row: usize) -> Result<Passenger, LoadError> {
        let invalid = |column: &'static str, reason: String| LoadError::InvalidValue {
            row,
            column,
            reason,
        };
        let count = |column: &'static str, v: i64| {
            u32::try_from(v).map_err(|_| invalid(column, format!("{v} is not a valid count")))
        };

        let survived = match self.survived {
            0 => false,
            1 => true,
            v => return Err(invalid("Survived", format!("expected 0 or 1, got {v}"))),
        };
        let pclass = Pclass::from_number(self.pclass)
            .ok_or_else(|| invalid("Pclass", format!("expected 1, 2 or 3, got {}", self.pclass)))?;
        let sex = self
            .sex
            .parse::<Sex>()
            .map_err(|e| invalid("Sex", e.to_string()))?;
        let age = match self.age {
            Some(a) if a.is_nan() => None,
            Some(a) if a < 0.0 || a.is_infinite() => {
                return Err(invalid("Age", format!("{a} is not a valid age")))
            }
            other => other,
        };
        let fare = match self.fare {
            Some(f) if f.is_finite() && f >= 0.0 => f,
            Some(f) => return Err(invalid("Fare", format!("{f} is not a non-negative fare"))),
            None => return Err(invalid("Fare", "missing fare".to_string())),
        };
        let embarked = match non_blank(self.embarked) {
            Some(code) => Some(
                code.parse::<Port>()
                    .map_err(|e| invalid("Embarked", e.to_string()))?,
            ),
            None => None,
        };

        Ok(Passenger {
            id: count("PassengerId", self.id)?,
            survived,
            pclass,
            name: self.name,
            sex,
            age,
            sib_sp: count("SibSp", self.sib_sp)?,
            parch: count("Parch", self.parch)?,
            ticket: self.ticket,
            fare,
            cabin: non_blank(self.cabin),
            embarked,
        })
    }
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Delimited-text loader
// ---------------------------------------------------------------------------

/// Header row with the Kaggle column names, in any order. Empty `Age`,
/// `Cabin` and `Embarked` cells are missing values.
pub fn load_delimited<R: Read>(input: R, delimiter: u8) -> Result<PassengerDataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    if let Some(missing) = COLUMNS.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(LoadError::MissingColumn(*missing));
    }

    let mut passengers = Vec::new();
    for (row_no, result) in reader.deserialize::<RawPassenger>().enumerate() {
        passengers.push(result?.validate(row_no)?);
    }

    log::debug!("parsed {} delimited rows", passengers.len());
    Ok(PassengerDataset::from_passengers(passengers))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Integer columns may be stored as any int width (or bool for `Survived`),
/// numeric ones as float or int; everything is cast before reading. A null
/// `Name` or `Ticket` reads as empty text, the same as an empty CSV cell.
fn load_parquet(file: File) -> Result<PassengerDataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    if let Some(missing) = COLUMNS
        .iter()
        .find(|c| builder.schema().index_of(c).is_err())
    {
        return Err(LoadError::MissingColumn(*missing));
    }
    let reader = builder.build()?;

    let mut passengers = Vec::new();
    for batch in reader {
        let batch = batch?;
        let offset = passengers.len();
        for (i, raw) in parquet_rows(&batch)?.into_iter().enumerate() {
            passengers.push(raw.validate(offset + i)?);
        }
    }

    log::debug!("parsed {} parquet rows", passengers.len());
    Ok(PassengerDataset::from_passengers(passengers))
}

fn column_as(batch: &RecordBatch, name: &'static str, to: &DataType) -> Result<ArrayRef, LoadError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| LoadError::MissingColumn(name))?;
    Ok(cast(batch.column(idx), to)?)
}

fn parquet_rows(batch: &RecordBatch) -> Result<Vec<RawPassenger>, LoadError> {
    let int = |name| column_as(batch, name, &DataType::Int64);
    let float = |name| column_as(batch, name, &DataType::Float64);
    let text = |name| column_as(batch, name, &DataType::Utf8);

    let id = int("PassengerId")?;
    let survived = int("Survived")?;
    let pclass = int("Pclass")?;
    let name = text("Name")?;
    let sex = text("Sex")?;
    let age = float("Age")?;
    let sib_sp = int("SibSp")?;
    let parch = int("Parch")?;
    let ticket = text("Ticket")?;
    let fare = float("Fare")?;
    let cabin = text("Cabin")?;
    let embarked = text("Embarked")?;

    let (id, survived, pclass) = (
        id.as_primitive::<Int64Type>(),
        survived.as_primitive::<Int64Type>(),
        pclass.as_primitive::<Int64Type>(),
    );
    let (sib_sp, parch) = (
        sib_sp.as_primitive::<Int64Type>(),
        parch.as_primitive::<Int64Type>(),
    );
    let (age, fare) = (
        age.as_primitive::<Float64Type>(),
        fare.as_primitive::<Float64Type>(),
    );
    let (name, sex, ticket, cabin, embarked) = (
        name.as_string::<i32>(),
        sex.as_string::<i32>(),
        ticket.as_string::<i32>(),
        cabin.as_string::<i32>(),
        embarked.as_string::<i32>(),
    );

    let mut rows = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let required = |column: &'static str, valid: bool| {
            if valid {
                Ok(())
            } else {
                Err(LoadError::InvalidValue {
                    row,
                    column,
                    reason: "null value".to_string(),
                })
            }
        };
        required("PassengerId", id.is_valid(row))?;
        required("Survived", survived.is_valid(row))?;
        required("Pclass", pclass.is_valid(row))?;
        required("Sex", sex.is_valid(row))?;
        required("SibSp", sib_sp.is_valid(row))?;
        required("Parch", parch.is_valid(row))?;

        rows.push(RawPassenger {
            id: id.value(row),
            survived: survived.value(row),
            pclass: pclass.value(row),
            name: name.is_valid(row).then(|| name.value(row).to_string()).unwrap_or_default(),
            sex: sex.value(row).to_string(),
            age: age.is_valid(row).then(|| age.value(row)),
            sib_sp: sib_sp.value(row),
            parch: parch.value(row),
            ticket: ticket
                .is_valid(row)
                .then(|| ticket.value(row).to_string())
                .unwrap_or_default(),
            fare: fare.is_valid(row).then(|| fare.value(row)),
            cabin: cabin.is_valid(row).then(|| cabin.value(row).to_string()),
            embarked: embarked.is_valid(row).then(|| embarked.value(row).to_string()),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::filter::NumericRange;
    use crate::data::model::DEFAULT_AGE_BOUNDS;

    const SAMPLE: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q
62,1,1,\"Icard, Miss. Amelie\",female,38,0,0,113572,80,B28,
";

    #[test]
    fn parses_kaggle_rows_with_missing_values() {
        let ds = load_delimited(SAMPLE.as_bytes(), b',').unwrap();
        assert_eq!(ds.len(), 4);

        let braund = &ds.passengers[0];
        assert_eq!(braund.last_name(), "Braund");
        assert_eq!(braund.sex, Sex::Male);
        assert_eq!(braund.pclass, Pclass::Third);
        assert_eq!(braund.cabin, None);
        assert_eq!(braund.sib_sp, 1);

        assert_eq!(ds.passengers[1].cabin.as_deref(), Some("C85"));
        assert!(ds.passengers[1].survived);
        assert_eq!(ds.passengers[2].age, None);
        assert_eq!(ds.passengers[3].embarked, None);

        assert_eq!((ds.age_bounds.min(), ds.age_bounds.max()), (22.0, 38.0));
        assert_eq!((ds.fare_bounds.min(), ds.fare_bounds.max()), (7.25, 80.0));
        assert_eq!(ds.ports.len(), 3);
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let header = COLUMNS.join(",");
        let ds = load_delimited(header.as_bytes(), b',').unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let text = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Cabin,Embarked\n";
        let err = load_delimited(text.as_bytes(), b',').unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Fare")));
    }

    #[test]
    fn invalid_values_are_fatal() {
        let header = COLUMNS.join(",");
        let cases = [
            ("1,2,3,\"A, B\",male,22,0,0,T,7.25,,S", "Survived"),
            ("1,0,4,\"A, B\",male,22,0,0,T,7.25,,S", "Pclass"),
            ("1,0,3,\"A, B\",robot,22,0,0,T,7.25,,S", "Sex"),
            ("1,0,3,\"A, B\",male,22,0,0,T,,,S", "Fare"),
            ("1,0,3,\"A, B\",male,22,0,0,T,-1,,S", "Fare"),
            ("1,0,3,\"A, B\",male,22,0,0,T,7.25,,X", "Embarked"),
            ("1,0,3,\"A, B\",male,-4,0,0,T,7.25,,S", "Age"),
            ("1,0,3,\"A, B\",male,inf,0,0,T,7.25,,S", "Age"),
            ("1,0,3,\"A, B\",male,22,0,0,T,inf,,S", "Fare"),
        ];
        for (line, col) in cases {
            let text = format!("{header}\n{line}\n");
            match load_delimited(text.as_bytes(), b',') {
                Err(LoadError::InvalidValue { row, column, .. }) => {
                    assert_eq!(row, 0);
                    assert_eq!(column, col, "line {line}");
                }
                other => panic!("expected invalid {col}, got {other:?}"),
            }
        }

        let text = format!("{header}\n1,0,3,\"A, B\",male,old,0,0,T,7.25,,S\n");
        assert!(matches!(
            load_delimited(text.as_bytes(), b','),
            Err(LoadError::Csv(_))
        ));
    }

    #[test]
    fn nan_age_reads_as_missing() {
        let header = COLUMNS.join(",");
        let text = format!("{header}\n1,0,3,\"A, B\",male,NaN,0,0,T,7.25,,S\n");
        let ds = load_delimited(text.as_bytes(), b',').unwrap();
        assert_eq!(ds.passengers[0].age, None);
        assert_eq!(ds.age_bounds, NumericRange::from_bounds(DEFAULT_AGE_BOUNDS));
    }

    #[test]
    fn dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let tsv = dir.path().join("titanic.tsv");
        let mut f = File::create(&tsv).unwrap();
        f.write_all(COLUMNS.join("\t").as_bytes()).unwrap();
        f.write_all(b"\n3\t1\t3\tHeikkinen, Miss. Laina\tfemale\t26\t0\t0\tSTON/O2. 3101282\t7.925\t\tS\n")
            .unwrap();
        drop(f);
        let ds = load_file(&tsv).unwrap();
        assert_eq!(ds.passengers[0].last_name(), "Heikkinen");

        let xlsx = dir.path().join("titanic.xlsx");
        assert!(matches!(
            load_file(&xlsx),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));

        let absent = dir.path().join("absent.csv");
        assert!(matches!(load_file(&absent), Err(LoadError::Io { .. })));
    }

    #[test]
    fn reads_parquet_with_narrow_ints_and_nulls() {
        let int = |v: Vec<i32>| Arc::new(Int32Array::from(v)) as ArrayRef;
        let text = |v: Vec<Option<&str>>| Arc::new(StringArray::from(v)) as ArrayRef;
        let float = |v: Vec<Option<f64>>| Arc::new(Float64Array::from(v)) as ArrayRef;

        let columns: Vec<(&str, ArrayRef)> = vec![
            ("PassengerId", int(vec![1, 2])),
            ("Survived", int(vec![0, 1])),
            ("Pclass", int(vec![3, 1])),
            ("Name", text(vec![Some("Braund, Mr. Owen Harris"), Some("Cumings, Mrs. John")])),
            ("Sex", text(vec![Some("male"), Some("female")])),
            ("Age", float(vec![None, Some(38.0)])),
            ("SibSp", int(vec![1, 1])),
            ("Parch", int(vec![0, 0])),
            ("Ticket", text(vec![Some("A/5 21171"), Some("PC 17599")])),
            ("Fare", float(vec![Some(7.25), Some(71.2833)])),
            ("Cabin", text(vec![None, Some("C85")])),
            ("Embarked", text(vec![Some("S"), None])),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titanic.parquet");
        write_parquet(&path, columns, true);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.passengers[0].age, None);
        assert_eq!(ds.passengers[0].embarked, Some(Port::S));
        assert_eq!(ds.passengers[1].embarked, None);
        assert_eq!(ds.passengers[1].cabin.as_deref(), Some("C85"));
        assert_eq!(ds.passengers[1].pclass, Pclass::First);
    }

    fn write_parquet(path: &Path, columns: Vec<(&str, ArrayRef)>, with_batch: bool) {
        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|(n, a)| Field::new(*n, a.data_type().clone(), true))
                .collect::<Vec<_>>(),
        ));
        let mut writer =
            ArrowWriter::try_new(File::create(path).unwrap(), schema.clone(), None).unwrap();
        if with_batch {
            let batch =
                RecordBatch::try_new(schema, columns.into_iter().map(|(_, a)| a).collect()).unwrap();
            writer.write(&batch).unwrap();
        }
        writer.close().unwrap();
    }

    #[test]
    fn parquet_without_rows_still_needs_every_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrong.parquet");
        let foo = Arc::new(Int32Array::from(Vec::<i32>::new())) as ArrayRef;
        write_parquet(&path, vec![("Foo", foo)], false);
        assert!(matches!(
            load_file(&path),
            Err(LoadError::MissingColumn("PassengerId"))
        ));
    }

    #[test]
    fn parquet_null_counts_are_fatal() {
        let int = |v: Vec<Option<i32>>| Arc::new(Int32Array::from(v)) as ArrayRef;
        let text = |v: &str| Arc::new(StringArray::from(vec![Some(v)])) as ArrayRef;
        let columns: Vec<(&str, ArrayRef)> = vec![
            ("PassengerId", int(vec![Some(1)])),
            ("Survived", int(vec![Some(0)])),
            ("Pclass", int(vec![Some(3)])),
            ("Name", text("Braund, Mr. Owen Harris")),
            ("Sex", text("male")),
            ("Age", Arc::new(Float64Array::from(vec![Some(22.0)])) as ArrayRef),
            ("SibSp", int(vec![None])),
            ("Parch", int(vec![Some(0)])),
            ("Ticket", text("A/5 21171")),
            ("Fare", Arc::new(Float64Array::from(vec![Some(7.25)])) as ArrayRef),
            ("Cabin", text("")),
            ("Embarked", text("S")),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nulls.parquet");
        write_parquet(&path, columns, true);
        assert!(matches!(
            load_file(&path),
            Err(LoadError::InvalidValue { row: 0, column: "SibSp", .. })
        ));
    }
}
