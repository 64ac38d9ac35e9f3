mod column;
mod record;
mod table;

pub use column::Column;
pub use record::SalesRecord;
pub use table::{LoadReport, SalesTable};
