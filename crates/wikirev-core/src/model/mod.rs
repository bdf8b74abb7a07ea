pub mod revision;
pub mod selector;

pub use revision::{RemoteRevision, RevisionDetails, RevisionRecord, TAG_CHANGE_FLAG};
pub use selector::{PageFilter, PageSelector};
