//! Data models for the symws bridge

pub mod dates;
pub mod de;
pub mod holding;
pub mod patron;
pub mod policy;
pub mod title;

// Re-export commonly used types
pub use holding::{Holding, HoldingStatus};
pub use policy::{PickUpLocation, Policies, PolicyCode, PolicyGroup, PolicyKind, PolicyTable};
pub use title::{BoundWithLink, CallGroup, ItemRecord, LinkedTitle, TitleRecord};
