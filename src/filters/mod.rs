pub mod apply;
pub mod criteria;

pub use apply::{derive_view, filter_documents, matches_criteria, view_summary};
pub use criteria::{SortField, SortOrder, SortState, ViewCriteria};
