//! Async storage traits, one per domain concern.
//!
//! `PgStorage` implements all of them; services depend on the traits so they
//! can be exercised against in-memory fakes.

pub mod detection;
pub mod event;
pub mod hierarchy;
pub mod session;
pub mod text_analysis;

pub use detection::DetectionStore;
pub use event::EventStore;
pub use hierarchy::HierarchyStore;
pub use session::SessionStore;
pub use text_analysis::TextAnalysisStore;

/// Every store the services need, behind one object.
pub trait Storage:
    SessionStore + EventStore + DetectionStore + TextAnalysisStore + HierarchyStore
{
}

impl<T> Storage for T where
    T: SessionStore + EventStore + DetectionStore + TextAnalysisStore + HierarchyStore
{
}
