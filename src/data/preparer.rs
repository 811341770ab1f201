//! Data Preparer Module
//! Cleans a telemetry table and turns it into centered, plot-ready points.
//!
//! Pipeline, each step a separate function:
//! 1. `coerce_numeric`  - cast coordinate and pressure columns to f64 (bad cells → null)
//! 2. `drop_incomplete` - drop rows missing any required field
//! 3. `filter_lap`      - keep one lap, compared in the lap column's own type
//! 4. `center_coordinates` - subtract the mean position and scale by 1e5

use super::model::{lap_values, ColumnKind, ColumnRoles, Dataset, LapSelector, LapValue, Role};
use polars::prelude::*;
use thiserror::Error;

/// Converts fractional degrees into a plot-friendly magnitude.
pub const COORDINATE_SCALE: f64 = 1e5;

// Internal column names used while the frame is in flight.
const ROW_COL: &str = "__row";
const LAT_COL: &str = "__lat";
const LON_COL: &str = "__lon";
const PORT_COL: &str = "__port";
const SECOND_PORT_COL: &str = "__port2";
const LAP_COL: &str = "__lap";

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("{role} column '{column}' does not exist in the dataset")]
    InvalidRole { role: Role, column: String },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// One retained row, ready for plotting.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPoint {
    /// Index of the source row in the dataset.
    pub row: usize,
    /// Normalized longitude.
    pub x: f64,
    /// Normalized latitude.
    pub y: f64,
    pub value: f64,
    pub second_value: Option<f64>,
    pub lap: LapValue,
}

/// Mean position subtracted during normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCenter {
    pub latitude: f64,
    pub longitude: f64,
}

/// Output of the pipeline together with the inputs that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    pub points: Vec<PreparedPoint>,
    /// `None` when no rows survived filtering.
    pub center: Option<GeoCenter>,
    pub roles: ColumnRoles,
    pub selector: LapSelector,
}

impl PreparedData {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn positions(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Second port readings, when that role was assigned.
    pub fn second_values(&self) -> Option<Vec<f64>> {
        self.roles.second_port.as_ref()?;
        Some(
            self.points
                .iter()
                .map(|p| p.second_value.unwrap_or(f64::NAN))
                .collect(),
        )
    }
}

/// Stateless transform from (dataset, roles, selector) to prepared points.
pub struct DataPreparer;

impl DataPreparer {
    /// Run the full pipeline. The dataset is never modified.
    pub fn prepare(
        dataset: &Dataset,
        roles: &ColumnRoles,
        selector: &LapSelector,
    ) -> Result<PreparedData, PrepareError> {
        if let Some((role, column)) = roles.first_missing(dataset) {
            return Err(PrepareError::InvalidRole {
                role,
                column: column.to_string(),
            });
        }
        let lap_kind = dataset.column_kind(&roles.lap).unwrap_or(ColumnKind::Text);

        let coerced = Self::coerce_numeric(dataset.dataframe().clone().lazy(), roles);
        let complete = Self::drop_incomplete(coerced, roles, lap_kind).collect()?;
        log::debug!(
            "{} of {} rows complete after numeric coercion",
            complete.height(),
            dataset.height()
        );

        let filtered = Self::filter_lap(complete.lazy(), lap_kind, selector).collect()?;
        log::debug!("{} rows kept for {}", filtered.height(), selector.label());

        let rows = row_indices(&filtered)?;
        let longitudes = f64_values(&filtered, LON_COL)?;
        let latitudes = f64_values(&filtered, LAT_COL)?;
        let values = f64_values(&filtered, PORT_COL)?;
        let second_values = match roles.second_port {
            Some(_) => Some(f64_values(&filtered, SECOND_PORT_COL)?),
            None => None,
        };
        let laps = lap_values(filtered.column(LAP_COL)?, lap_kind)?;

        let (xs, ys, center) = Self::center_coordinates(&longitudes, &latitudes);

        let points = (0..filtered.height())
            .filter_map(|i| {
                let lap = laps.get(i).cloned().flatten()?;
                Some(PreparedPoint {
                    row: rows[i],
                    x: xs[i],
                    y: ys[i],
                    value: values[i],
                    second_value: second_values.as_ref().map(|s| s[i]),
                    lap,
                })
            })
            .collect();

        Ok(PreparedData {
            points,
            center,
            roles: roles.clone(),
            selector: selector.clone(),
        })
    }

    /// Step 1: cast latitude, longitude and pressure columns to f64.
    ///
    /// Cells that cannot be parsed become null. The lap column is carried
    /// through unchanged, and a row index is attached.
    pub fn coerce_numeric(lf: LazyFrame, roles: &ColumnRoles) -> LazyFrame {
        let mut exprs = vec![
            col(ROW_COL),
            numeric(&roles.latitude).alias(LAT_COL),
            numeric(&roles.longitude).alias(LON_COL),
            numeric(&roles.pressure_port).alias(PORT_COL),
            col(roles.lap.as_str()).alias(LAP_COL),
        ];
        if let Some(second) = &roles.second_port {
            exprs.push(numeric(second).alias(SECOND_PORT_COL));
        }
        lf.with_row_index(ROW_COL, None).select(exprs)
    }

    /// Step 2: drop rows with a missing coordinate, pressure or lap value.
    ///
    /// Must run on the output of [`Self::coerce_numeric`]. NaN counts as
    /// missing, including in a float lap column.
    pub fn drop_incomplete(lf: LazyFrame, roles: &ColumnRoles, lap_kind: ColumnKind) -> LazyFrame {
        let mut required = vec![LAT_COL, LON_COL, PORT_COL];
        if roles.second_port.is_some() {
            required.push(SECOND_PORT_COL);
        }
        let predicate = required
            .into_iter()
            .map(|name| col(name).is_not_null().and(col(name).is_not_nan()))
            .fold(lap_present(lap_kind), |acc, cond| acc.and(cond));
        lf.filter(predicate)
    }

    /// Step 3: keep only the selected lap.
    ///
    /// The selector is coerced to the lap column's kind first. If that fails
    /// the raw text is compared against numeric laps, which selects nothing.
    pub fn filter_lap(lf: LazyFrame, kind: ColumnKind, selector: &LapSelector) -> LazyFrame {
        let LapSelector::Lap(raw) = selector else {
            return lf;
        };
        let target = LapValue::coerce(raw, kind);
        if !target.matches_kind(kind) {
            log::warn!(
                "Lap '{}' cannot be read as a {:?} lap value; comparing raw text",
                raw,
                kind
            );
        }
        lf.filter(lap_predicate(kind, &target))
    }

    /// Step 4: center coordinates on their mean and scale by [`COORDINATE_SCALE`].
    ///
    /// Returns `(x, y, center)`; the center is `None` for empty input.
    pub fn center_coordinates(
        longitudes: &[f64],
        latitudes: &[f64],
    ) -> (Vec<f64>, Vec<f64>, Option<GeoCenter>) {
        if longitudes.is_empty() || latitudes.is_empty() {
            return (Vec::new(), Vec::new(), None);
        }
        let mean_lon = mean(longitudes);
        let mean_lat = mean(latitudes);

        let xs = longitudes
            .iter()
            .map(|lon| (lon - mean_lon) * COORDINATE_SCALE)
            .collect();
        let ys = latitudes
            .iter()
            .map(|lat| (lat - mean_lat) * COORDINATE_SCALE)
            .collect();

        (
            xs,
            ys,
            Some(GeoCenter {
                latitude: mean_lat,
                longitude: mean_lon,
            }),
        )
    }
}

fn numeric(column: &str) -> Expr {
    col(column).cast(DataType::Float64)
}

fn lap_present(kind: ColumnKind) -> Expr {
    match kind {
        ColumnKind::Float => col(LAP_COL)
            .is_not_null()
            .and(col(LAP_COL).cast(DataType::Float64).is_not_nan()),
        _ => col(LAP_COL).is_not_null(),
    }
}

fn lap_predicate(kind: ColumnKind, target: &LapValue) -> Expr {
    match (kind, target) {
        (ColumnKind::Integer, LapValue::Integer(v)) => {
            col(LAP_COL).cast(DataType::Int64).eq(lit(*v))
        }
        (ColumnKind::Float, LapValue::Float(v)) => {
            col(LAP_COL).cast(DataType::Float64).eq(lit(*v))
        }
        // Stored text laps are compared with surrounding whitespace removed
        (ColumnKind::Text, LapValue::Text(v)) => col(LAP_COL)
            .cast(DataType::String)
            .str()
            .strip_chars(lit(Null {}))
            .eq(lit(v.clone())),
        // Text never equals a stored number
        _ => lit(false),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn row_indices(df: &DataFrame) -> PolarsResult<Vec<usize>> {
    let column = df.column(ROW_COL)?.cast(&DataType::UInt64)?;
    Ok(column
        .as_materialized_series()
        .u64()?
        .into_iter()
        .map(|v| v.unwrap_or_default() as usize)
        .collect())
}
