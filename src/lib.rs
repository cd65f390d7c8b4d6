//! campusreg is a typed client for a university course catalog and
//! enrollment web API: course search with multi-select filters,
//! favorite/preselect management, a weekly 14-period schedule grid, and
//! the administrative course/account surface.
//!
//! The backend is an external collaborator reached over JSON/HTTP; every
//! response uses the `{success, message?, ...}` envelope and application
//! failures travel inside it (see [`envelope`]). The interesting parts
//! live in [`timeslot`] (structured-first day/period resolution),
//! [`schedule`] (grid projection) and [`filter`] (filter state and query
//! building).

pub mod cache;
pub mod client;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod schedule;
pub mod session;
pub mod timeslot;
pub mod types;

pub use client::{CatalogClient, CatalogConfig};
pub use error::CatalogError;
pub use filter::{FilterCategory, FilterSelection};
pub use schedule::{project, ScheduleCell, ScheduleGrid};
pub use session::{Action, Role, SearchToken, ViewSession};
pub use types::{CourseRecord, EnrollmentRecord, EnrollmentStatus};
