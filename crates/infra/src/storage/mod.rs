//! Filesystem-backed cube store
//!
//! The store manages cube data on disk: download from the catalog
//! webservice, revision bookkeeping, and selection for export. It allows
//! partial updates (only cubes whose remote `stand` moved get a new
//! revision). Every piece of state lives in the filesystem, so no extra
//! database is needed to track cube status, and an interrupted run
//! resumes correctly from what is on disk.
//!
//! A store root has this layout:
//!
//! ```text
//! ./
//!     last_updated                -   plain text file containing date in isoformat
//!     last_exported               -   plain text file containing date in isoformat
//!     logs/                       -   folder for keeping logfiles
//!     11111BJ001/                 -   directory for cube name "11111BJ001"
//!         last_updated            -   plain text file containing date in isoformat
//!         last_exported           -   plain text file containing date in isoformat
//!         current                 -   symbolic link to the latest revision directory
//!         2019-08-07T08:40:20/    -   revision directory for given date (isoformat)
//!             downloaded          -   plain text file containing date in isoformat
//!             exported            -   plain text file containing date in isoformat
//!             meta.json           -   original metadata from webservice
//!             download.json       -   metadata of the download call
//!             data.csv            -   original raw data for this cube
//!         2017-06-07T08:40:20/    -   an older revision...
//!     11111BJ002/                 -   another cube...
//! ```

mod cube;
mod marker;
mod revision;
mod store;

pub use cube::Cube;
pub use revision::CubeRevision;
pub use store::CubeStore;
