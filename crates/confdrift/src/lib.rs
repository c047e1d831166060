//! confdrift — reconcile two JSON dialects describing the same cloud
//! resource record, diff them structurally, and render the result as a
//! self-contained HTML report.
//!
//! A resource-history API and a periodic object-store snapshot describe the
//! same logical record in incompatible ways: sub-documents arrive as escaped
//! JSON text (sometimes two or three layers deep), arrays carry no order
//! guarantee, and a handful of fields differ in name or scalar type between
//! the two sources. This crate collapses both shapes into one canonical value
//! tree, computes a diff that ignores those encoding artifacts without
//! missing a real change, and renders the diff hierarchically.
//!
//! The crate is a pure library. Fetching history pages, locating the
//! snapshot object, deciding the comparison window, and delivering the
//! report are the caller's concerns; the three entry points are:
//!
//! ```no_run
//! use confdrift::{diff_batch, normalize, render, Policy};
//!
//! # fn run(raw_snapshot: &[u8], live_items: Vec<serde_json::Value>) -> Result<(), Box<dyn std::error::Error>> {
//! let policy = Policy::default();
//! let snapshot = normalize(raw_snapshot, &policy)?.with_reference("ConfigSnapshot-2024-11-07.json");
//! let batch = diff_batch(live_items, &snapshot, &policy);
//! let report = render(&batch, &policy)?;
//! if report.any_changes {
//!     // hand report.html to the notification layer
//! }
//! # Ok(())
//! # }
//! ```

pub mod canon;
pub mod collate;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod policy;
pub mod record;
pub mod report;
pub mod textdiff;

pub use dialect::{normalize, Snapshot};
pub use diff::{diff_batch, DiffBatch, DiffEntry, DiffNode, DiffedItem};
pub use error::{CollationError, DecodeError, ItemError, NormalizeError, RejectedItem, RenderError};
pub use policy::Policy;
pub use record::{CanonicalRecord, ItemKey};
pub use report::{render, Report};
