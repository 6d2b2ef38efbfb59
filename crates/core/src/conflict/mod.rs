//! Pull-request conflict detection, resolution, and merge drafting.
//!
//! The conflict subsystem is responsible for:
//! 1. **Detection** -- classifying each proposed change against the current
//!    target branch content.
//! 2. **Resolution** -- picking one side of a conflict and writing it back
//!    into the change set.
//! 3. **Drafting** -- producing a three-way merge draft to edit by hand when
//!    neither side is taken as-is.

pub mod detector;
pub mod merger;
pub mod resolver;

pub use detector::{has_overlapping_changes, Conflict, ConflictDetector, ConflictKind, ConflictResult};
pub use merger::{MergeResult, Merger};
pub use resolver::{ConflictResolver, Resolution, Resolved};
