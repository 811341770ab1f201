//! Data Model Module
//! Dataset wrapper, column roles and typed lap identifiers.

use crate::config::ALL_LAPS_LABEL;
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ColumnKind – load-time type class of a column
// ---------------------------------------------------------------------------

/// Type class of a column, detected once from the inferred dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    /// Strings and every other dtype, compared through their text form.
    Text,
}

impl ColumnKind {
    pub fn from_dtype(dtype: &DataType) -> Self {
        if dtype.is_integer() {
            ColumnKind::Integer
        } else if dtype.is_float() {
            ColumnKind::Float
        } else {
            ColumnKind::Text
        }
    }
}

// ---------------------------------------------------------------------------
// LapValue – a typed lap identifier
// ---------------------------------------------------------------------------

/// A lap identifier in the type its column holds.
#[derive(Debug, Clone, PartialEq)]
pub enum LapValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl LapValue {
    /// Coerce user-entered selector text into the lap column's type.
    ///
    /// When parsing fails the raw text is kept; a text value never equals a
    /// numeric lap, so such a selector matches no rows.
    pub fn coerce(raw: &str, kind: ColumnKind) -> Self {
        let trimmed = raw.trim();
        match kind {
            ColumnKind::Integer => trimmed
                .parse::<i64>()
                .map(LapValue::Integer)
                .unwrap_or_else(|_| LapValue::Text(trimmed.to_string())),
            ColumnKind::Float => trimmed
                .parse::<f64>()
                .map(LapValue::Float)
                .unwrap_or_else(|_| LapValue::Text(trimmed.to_string())),
            ColumnKind::Text => LapValue::Text(trimmed.to_string()),
        }
    }

    /// Whether this value has the representation used by columns of `kind`.
    pub fn matches_kind(&self, kind: ColumnKind) -> bool {
        matches!(
            (self, kind),
            (LapValue::Integer(_), ColumnKind::Integer)
                | (LapValue::Float(_), ColumnKind::Float)
                | (LapValue::Text(_), ColumnKind::Text)
        )
    }
}

// Manual Eq/Ord so lap values can be sorted and deduplicated.

impl Eq for LapValue {}

impl PartialOrd for LapValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LapValue {
    fn cmp(&self, other: &Self) -> Ordering {
        fn rank(v: &LapValue) -> u8 {
            match v {
                LapValue::Integer(_) => 0,
                LapValue::Float(_) => 1,
                LapValue::Text(_) => 2,
            }
        }
        match (self, other) {
            (LapValue::Integer(a), LapValue::Integer(b)) => a.cmp(b),
            (LapValue::Float(a), LapValue::Float(b)) => a.total_cmp(b),
            (LapValue::Text(a), LapValue::Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for LapValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LapValue::Integer(i) => write!(f, "{i}"),
            // Debug keeps the decimal point: 1.0 stays "1.0"
            LapValue::Float(v) => write!(f, "{v:?}"),
            LapValue::Text(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// LapSelector
// ---------------------------------------------------------------------------

/// Which laps to keep: everything, or one lap given as user text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LapSelector {
    #[default]
    All,
    Lap(String),
}

impl LapSelector {
    /// Build a selector from a prompt answer; blank or "All Laps" means all.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_LAPS_LABEL) {
            LapSelector::All
        } else {
            LapSelector::Lap(trimmed.to_string())
        }
    }

    /// Label used in titles: "Lap 3" or "All Laps".
    pub fn label(&self) -> String {
        match self {
            LapSelector::All => ALL_LAPS_LABEL.to_string(),
            LapSelector::Lap(lap) => format!("Lap {}", lap),
        }
    }
}

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// Semantic role a column plays in the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Latitude,
    Longitude,
    PressurePort,
    Lap,
    SecondPressurePort,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Latitude => "Latitude",
            Role::Longitude => "Longitude",
            Role::PressurePort => "Pressure Port",
            Role::Lap => "Lap",
            Role::SecondPressurePort => "Pressure Port 2",
        };
        f.write_str(name)
    }
}

/// Assignment of roles to concrete column names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnRoles {
    pub latitude: String,
    pub longitude: String,
    pub pressure_port: String,
    pub lap: String,
    pub second_port: Option<String>,
}

impl ColumnRoles {
    pub fn new(latitude: &str, longitude: &str, pressure_port: &str, lap: &str) -> Self {
        Self {
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
            pressure_port: pressure_port.to_string(),
            lap: lap.to_string(),
            second_port: None,
        }
    }

    pub fn with_second_port(mut self, column: &str) -> Self {
        self.second_port = Some(column.to_string());
        self
    }

    /// All assigned (role, column) pairs in a fixed order.
    pub fn assignments(&self) -> Vec<(Role, &str)> {
        let mut pairs = vec![
            (Role::Latitude, self.latitude.as_str()),
            (Role::Longitude, self.longitude.as_str()),
            (Role::PressurePort, self.pressure_port.as_str()),
            (Role::Lap, self.lap.as_str()),
        ];
        if let Some(second) = &self.second_port {
            pairs.push((Role::SecondPressurePort, second.as_str()));
        }
        pairs
    }

    /// First role whose column is missing from the dataset, if any.
    pub fn first_missing<'a>(&'a self, dataset: &Dataset) -> Option<(Role, &'a str)> {
        self.assignments()
            .into_iter()
            .find(|(_, column)| !dataset.has_column(column))
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// First rows of a dataset rendered as text for display.
#[derive(Debug, Clone, Default)]
pub struct DataPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A loaded table with the type class of every column recorded at load time.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    kinds: BTreeMap<String, ColumnKind>,
}

impl Dataset {
    pub fn new(df: DataFrame) -> Self {
        let kinds = df
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), ColumnKind::from_dtype(col.dtype())))
            .collect();
        Self { df, kinds }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Column names in file order.
    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.kinds.get(name).copied()
    }

    /// Sorted unique lap values of a column, nulls and NaN skipped.
    pub fn lap_options(&self, column: &str) -> PolarsResult<Vec<LapValue>> {
        let kind = self.column_kind(column).unwrap_or(ColumnKind::Text);
        let mut values: Vec<LapValue> = lap_values(self.df.column(column)?, kind)?
            .into_iter()
            .flatten()
            .collect();
        values.sort();
        values.dedup();
        Ok(values)
    }

    /// Render the first `rows` rows as strings; missing cells become "".
    pub fn preview(&self, rows: usize) -> DataPreview {
        let head = self.df.head(Some(rows));
        let headers = self.columns();
        let rows = (0..head.height())
            .map(|i| {
                head.get_columns()
                    .iter()
                    .map(|col| match col.get(i) {
                        Ok(val) if !val.is_null() => val.to_string().trim_matches('"').to_string(),
                        _ => String::new(),
                    })
                    .collect()
            })
            .collect();
        DataPreview { headers, rows }
    }
}

/// Read a lap column as typed values according to its kind.
pub(crate) fn lap_values(column: &Column, kind: ColumnKind) -> PolarsResult<Vec<Option<LapValue>>> {
    let values = match kind {
        ColumnKind::Integer => {
            let cast = column.cast(&DataType::Int64)?;
            cast.as_materialized_series()
                .i64()?
                .into_iter()
                .map(|v| v.map(LapValue::Integer))
                .collect()
        }
        ColumnKind::Float => {
            let cast = column.cast(&DataType::Float64)?;
            cast.as_materialized_series()
                .f64()?
                .into_iter()
                .map(|v| v.filter(|f| !f.is_nan()).map(LapValue::Float))
                .collect()
        }
        ColumnKind::Text => {
            let cast = column.cast(&DataType::String)?;
            cast.as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map(|s| LapValue::Text(s.trim().to_string())))
                .collect()
        }
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let df = df!(
            "lat" => [40.0, 40.1, 40.2],
            "lon" => [-70.0, -70.1, -70.2],
            "lap" => [2i64, 1, 2],
            "tag" => ["b", "a", "b"]
        )
        .unwrap();
        Dataset::new(df)
    }

    #[test]
    fn column_kinds_detected_at_load() {
        let ds = sample();
        assert_eq!(ds.column_kind("lat"), Some(ColumnKind::Float));
        assert_eq!(ds.column_kind("lap"), Some(ColumnKind::Integer));
        assert_eq!(ds.column_kind("tag"), Some(ColumnKind::Text));
        assert_eq!(ds.column_kind("missing"), None);
    }

    #[test]
    fn selector_coerces_to_column_kind() {
        assert_eq!(LapValue::coerce("3", ColumnKind::Integer), LapValue::Integer(3));
        assert_eq!(LapValue::coerce(" 3 ", ColumnKind::Integer), LapValue::Integer(3));
        assert_eq!(LapValue::coerce("2.5", ColumnKind::Float), LapValue::Float(2.5));
        assert_eq!(LapValue::coerce("1", ColumnKind::Float), LapValue::Float(1.0));
        assert_eq!(
            LapValue::coerce("out", ColumnKind::Text),
            LapValue::Text("out".to_string())
        );
    }

    #[test]
    fn failed_coercion_falls_back_to_raw_text() {
        let value = LapValue::coerce("1.5", ColumnKind::Integer);
        assert_eq!(value, LapValue::Text("1.5".to_string()));
        assert!(!value.matches_kind(ColumnKind::Integer));

        let value = LapValue::coerce("warmup", ColumnKind::Float);
        assert_eq!(value, LapValue::Text("warmup".to_string()));
    }

    #[test]
    fn lap_values_order_within_and_across_kinds() {
        let mut values = vec![
            LapValue::Text("b".into()),
            LapValue::Integer(10),
            LapValue::Float(0.5),
            LapValue::Integer(2),
            LapValue::Text("a".into()),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                LapValue::Integer(2),
                LapValue::Integer(10),
                LapValue::Float(0.5),
                LapValue::Text("a".into()),
                LapValue::Text("b".into()),
            ]
        );
    }

    #[test]
    fn float_laps_display_with_decimal_point() {
        assert_eq!(LapValue::Float(1.0).to_string(), "1.0");
        assert_eq!(LapValue::Float(2.5).to_string(), "2.5");
        assert_eq!(LapValue::Integer(4).to_string(), "4");
    }

    #[test]
    fn lap_options_are_sorted_and_unique() {
        let ds = sample();
        assert_eq!(
            ds.lap_options("lap").unwrap(),
            vec![LapValue::Integer(1), LapValue::Integer(2)]
        );
        assert_eq!(
            ds.lap_options("tag").unwrap(),
            vec![LapValue::Text("a".into()), LapValue::Text("b".into())]
        );
    }

    #[test]
    fn nan_and_padded_laps_in_options() {
        let df = df!(
            "lap" => [1.0, f64::NAN, 2.0],
            "tag" => [" out ", "out", "in"]
        )
        .unwrap();
        let ds = Dataset::new(df);
        assert_eq!(
            ds.lap_options("lap").unwrap(),
            vec![LapValue::Float(1.0), LapValue::Float(2.0)]
        );
        assert_eq!(
            ds.lap_options("tag").unwrap(),
            vec![LapValue::Text("in".into()), LapValue::Text("out".into())]
        );
        assert_eq!(
            LapValue::coerce(" out ", ColumnKind::Text),
            LapValue::Text("out".into())
        );
    }

    #[test]
    fn selector_parse_and_label() {
        assert_eq!(LapSelector::parse(""), LapSelector::All);
        assert_eq!(LapSelector::parse("all laps"), LapSelector::All);
        assert_eq!(LapSelector::parse(" 5 "), LapSelector::Lap("5".to_string()));
        assert_eq!(LapSelector::All.label(), "All Laps");
        assert_eq!(LapSelector::Lap("5".into()).label(), "Lap 5");
    }

    #[test]
    fn missing_role_column_is_reported() {
        let ds = sample();
        let roles = ColumnRoles::new("lat", "lon", "pressure", "lap");
        assert_eq!(
            roles.first_missing(&ds),
            Some((Role::PressurePort, "pressure"))
        );
        let roles = ColumnRoles::new("lat", "lon", "lat", "lap");
        assert_eq!(roles.first_missing(&ds), None);
    }

    #[test]
    fn preview_renders_first_rows() {
        let ds = sample();
        let preview = ds.preview(2);
        assert_eq!(preview.headers, vec!["lat", "lon", "lap", "tag"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1][2], "1");
        assert_eq!(preview.rows[1][3], "a");
    }
}
