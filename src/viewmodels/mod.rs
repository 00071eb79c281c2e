pub mod indicator_viewmodel;
pub mod table_viewmodel;
pub mod update_viewmodel;

pub use indicator_viewmodel::{IndicatorSnapshot, IndicatorViewModel};
pub use table_viewmodel::{TableSnapshot, TableViewModel};
pub use update_viewmodel::UpdateViewModel;
