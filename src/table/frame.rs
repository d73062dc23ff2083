//! Row-oriented table with named columns.

use serde::{Deserialize, Serialize};

use crate::{FlakestatError, FlakestatResult};

use super::Value;

/// Row-oriented dataset with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Borrowed view of a single table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Position of the row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value of the named column, if the column exists.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table
            .column_index(column)
            .map(|i| &self.table.rows[self.index][i])
    }

    /// All values of the row, in column order.
    pub fn values(&self) -> &'a [Value] {
        &self.table.rows[self.index]
    }
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row. The row must have one value per column.
    pub fn push_row(&mut self, values: Vec<Value>) -> FlakestatResult<()> {
        if values.len() != self.columns.len() {
            return Err(FlakestatError::table(format!(
                "row has {} values but table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(values);
        Ok(())
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> FlakestatResult<usize> {
        self.column_index(name)
            .ok_or_else(|| FlakestatError::UnknownColumn(name.to_string()))
    }

    /// Iterates over the rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    /// Row at `index`.
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    /// Applies `f` to every row and collects the results in row order.
    pub fn apply<T, F>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&Row<'_>) -> T,
    {
        self.rows().map(|row| f(&row)).collect()
    }

    /// Values of one column.
    pub fn column(&self, name: &str) -> FlakestatResult<impl Iterator<Item = &Value> + '_> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Numeric values of one column, skipping missing cells.
    pub fn numeric_column(&self, name: &str) -> FlakestatResult<Vec<f64>> {
        let mut out = Vec::with_capacity(self.rows.len());
        for value in self.column(name)? {
            if value.is_missing() {
                continue;
            }
            match value.as_f64() {
                Some(v) => out.push(v),
                None => {
                    return Err(FlakestatError::table(format!(
                        "column '{}' holds non-numeric value '{}'",
                        name, value
                    )))
                }
            }
        }
        Ok(out)
    }

    /// Distinct values of one column, in first-seen order.
    pub fn unique(&self, name: &str) -> FlakestatResult<Vec<Value>> {
        let mut seen: Vec<Value> = Vec::new();
        for value in self.column(name)? {
            if !seen.contains(value) {
                seen.push(value.clone());
            }
        }
        Ok(seen)
    }

    /// Row indices grouped by the distinct values of one column.
    pub fn group_indices(&self, name: &str) -> FlakestatResult<Vec<(Value, Vec<usize>)>> {
        let idx = self.require_column(name)?;
        let mut groups: Vec<(Value, Vec<usize>)> = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            match groups.iter_mut().find(|(key, _)| *key == row[idx]) {
                Some((_, members)) => members.push(i),
                None => groups.push((row[idx].clone(), vec![i])),
            }
        }
        Ok(groups)
    }

    /// Appends the rows of `other`. Both tables must share the same columns,
    /// unless `self` has no columns yet.
    pub fn concat(&mut self, other: Table) -> FlakestatResult<()> {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.columns != other.columns {
            return Err(FlakestatError::table(format!(
                "cannot concatenate tables with columns {:?} and {:?}",
                self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Adds a column holding the same value in every row.
    pub fn with_constant_column(mut self, name: impl Into<String>, value: Value) -> Self {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(value.clone());
        }
        self
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_json_records(&self) -> serde_json::Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned().map(serde_json::Value::from))
                    .collect();
                serde_json::Value::Object(object)
            })
            .collect();
        serde_json::Value::Array(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(["strategy", "runs", "reporting"]);
        table
            .push_row(vec!["rerun".into(), Value::Int(5), "TP".into()])
            .unwrap();
        table
            .push_row(vec!["shuffle".into(), Value::Null, "FN".into()])
            .unwrap();
        table
            .push_row(vec!["rerun".into(), Value::Float(2.5), "TN".into()])
            .unwrap();
        table
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut table = Table::new(["a", "b"]);
        assert!(table.push_row(vec![Value::Int(1)]).is_err());
        assert!(table.push_row(vec![Value::Int(1), Value::Int(2)]).is_ok());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_row_access_by_name() {
        let table = sample();
        let row = table.row(1).unwrap();
        assert_eq!(row.index(), 1);
        assert_eq!(row.get("reporting"), Some(&Value::from("FN")));
        assert_eq!(row.get("missing"), None);
        assert!(table.row(3).is_none());
    }

    #[test]
    fn test_apply_preserves_row_order() {
        let table = sample();
        let labels = table.apply(|row| row.get("reporting").unwrap().to_string());
        assert_eq!(labels, vec!["TP", "FN", "TN"]);
    }

    #[test]
    fn test_numeric_column_skips_missing() {
        let table = sample();
        assert_eq!(table.numeric_column("runs").unwrap(), vec![5.0, 2.5]);
        assert!(table.numeric_column("reporting").is_err());
        assert!(matches!(
            table.numeric_column("nope"),
            Err(FlakestatError::UnknownColumn(_))
        ));
    }

    #[test]
    fn test_unique_and_groups() {
        let table = sample();
        let strategies = table.unique("strategy").unwrap();
        assert_eq!(strategies, vec![Value::from("rerun"), Value::from("shuffle")]);

        let groups = table.group_indices("strategy").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, vec![0, 2]);
        assert_eq!(groups[1].1, vec![1]);
    }

    #[test]
    fn test_concat() {
        let mut acc = Table::default();
        acc.concat(sample()).unwrap();
        acc.concat(sample()).unwrap();
        assert_eq!(acc.len(), 6);

        let other = Table::new(["x"]);
        assert!(acc.concat(other).is_err());
    }

    #[test]
    fn test_constant_column() {
        let table = sample().with_constant_column("project", "lang".into());
        assert_eq!(table.columns().last().map(String::as_str), Some("project"));
        assert!(table.rows().all(|r| r.get("project") == Some(&Value::from("lang"))));
    }

    #[test]
    fn test_json_records() {
        let json = sample().to_json_records();
        assert_eq!(json[0]["strategy"], "rerun");
        assert!(json[1]["runs"].is_null());
        assert_eq!(json[2]["runs"], 2.5);
    }
}
