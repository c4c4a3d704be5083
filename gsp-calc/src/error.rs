use crate::row::RowId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("{name} efficiency must be greater than 0 and at most 100, got {value}")]
    InvalidEfficiency { name: &'static str, value: f64 },
    #[error("planted area must be a non-negative number, got {0}")]
    InvalidArea(f64),
    #[error("coefficient for month {month} must be a finite number, got {value}")]
    InvalidCoefficient { month: usize, value: f64 },
    #[error("row {0} does not exist")]
    NoSuchRow(RowId),
    #[error("the last row cannot be removed")]
    LastRow,
    #[error("a loaded calculation cannot be edited")]
    ReadOnly,
    #[error("no irrigation system selected")]
    MissingSystem,
    #[error("year is required")]
    MissingYear,
    #[error("at least one row needs a crop and a planted area")]
    NoValidRows,
}
