//! CSV import and export.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::FlakestatResult;

use super::{Table, Value};

impl Table {
    /// Reads a CSV file with a header row.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> FlakestatResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let table = Self::from_csv_reader(file)?;
        tracing::debug!(path = %path.display(), rows = table.len(), "CSV loaded");
        Ok(table)
    }

    /// Reads CSV data with a header row, inferring the type of every cell.
    pub fn from_csv_reader<R: Read>(reader: R) -> FlakestatResult<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = reader.headers()?.clone();
        let mut table = Table::new(headers.iter());

        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(Value::parse).collect())?;
        }

        Ok(table)
    }

    /// Writes the table as CSV with a header row.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> FlakestatResult<()> {
        let file = std::fs::File::create(path)?;
        self.to_csv_writer(file)
    }

    /// Writes the table as CSV to any writer.
    pub fn to_csv_writer<W: Write>(&self, writer: W) -> FlakestatResult<()> {
        let mut writer = WriterBuilder::new().from_writer(writer);
        writer.write_record(self.columns())?;
        for row in self.rows() {
            writer.write_record(row.values().iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = "\
test,runs,flaky,reporting
testA,10,true,TP
testB,3,false,TN
testC,,false,FN
";

    #[test]
    fn test_read_infers_cell_types() {
        let table = Table::from_csv_reader(RESULTS.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["test", "runs", "flaky", "reporting"]);
        assert_eq!(table.len(), 3);

        let first = table.row(0).unwrap();
        assert_eq!(first.get("runs"), Some(&Value::Int(10)));
        assert_eq!(first.get("flaky"), Some(&Value::Bool(true)));
        assert_eq!(table.row(2).unwrap().get("runs"), Some(&Value::Null));
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let data = "a,b\n1,2\n3\n";
        assert!(Table::from_csv_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_write_then_read() {
        let table = Table::from_csv_reader(RESULTS.as_bytes()).unwrap();
        let mut buffer = Vec::new();
        table.to_csv_writer(&mut buffer).unwrap();

        let reread = Table::from_csv_reader(buffer.as_slice()).unwrap();
        assert_eq!(reread, table);
    }

    #[test]
    fn test_padded_labels_are_trimmed() {
        let table = Table::from_csv_reader("test,reporting\ntestA, TP \n".as_bytes()).unwrap();
        assert_eq!(table.row(0).unwrap().get("reporting"), Some(&Value::from("TP")));

        let mut buffer = Vec::new();
        table.to_csv_writer(&mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "test,reporting\ntestA,TP\n");
    }
}
