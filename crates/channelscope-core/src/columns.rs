use polars::prelude::*;

/// Physical microsecond values of a datetime column.
pub fn datetime_micros(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<i64>>> {
    let physical = df.column(name)?.cast(&DataType::Int64)?;
    Ok(physical.i64()?.into_iter().collect())
}

pub fn f64_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

pub fn str_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float64 | DataType::Int64)
}

pub fn datetime_series(name: &str, micros: Vec<Option<i64>>) -> PolarsResult<Series> {
    Series::new(name.into(), micros).cast(&DataType::Datetime(TimeUnit::Microseconds, None))
}
