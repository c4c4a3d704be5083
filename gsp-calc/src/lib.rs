//! Irrigation water-demand calculation.
//!
//! A calculation is a table of planting rows (crop + planted area). From it
//! this crate derives each row's share of the planted area and folds the rows
//! into monthly net, farm and gross water demand in hm³.
//!
//! The pipeline is pure: [`allocate::allocate_shares`] followed by
//! [`demand::reduce_demand`]. [`table::PlantingTable`] wraps both and keeps
//! the result current after every edit.

pub mod allocate;
pub mod demand;
pub mod error;
pub mod row;
pub mod saved;
pub mod table;

pub use demand::{CalculationResult, Efficiencies};
pub use error::CalcError;
pub use row::{PlantingRow, RowId};
pub use table::PlantingTable;
