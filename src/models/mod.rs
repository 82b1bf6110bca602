pub mod annotation;
pub mod backend;
pub mod dashboard;

pub use annotation::{AnnotationEvent, AnnotationSpec, TimeRange};
pub use dashboard::{
    DashboardDocument, DashboardRecord, DashboardSummary, SavedDashboard, SearchResult, TagTerm,
};
