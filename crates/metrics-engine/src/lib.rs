pub mod kpis;
pub mod series;
pub mod table;

pub use kpis::*;
pub use series::*;
pub use table::*;
