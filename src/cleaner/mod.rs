//! Motor para sanear y reescribir paquetes `.docx` (OOXML) en memoria.

mod archive;
mod batch;
mod body;
mod constants;
mod error;
mod fields;
mod files;
mod parts;
mod pipeline;
mod profile;
mod properties;
mod verify;
mod xml;

pub use archive::{Entry, Package, build};
pub use batch::{CleanupEvent, collect_docx_files, run_batch_with_sender};
pub use body::{count_tracked_elements, sanitize_document_body};
pub use constants::{DEFAULT_IDENTITY, DEFAULT_TITLE};
pub use error::{CleanError, ErrorKind, Result};
pub use fields::{MetadataFields, ResolvedFields, TimeSpec, W3cdtf};
pub use files::{FileReport, clean_file, default_output_path};
pub use parts::{PartKind, RetainedSet, classify, is_retained};
pub use pipeline::{CleanOutcome, CleanRequest, DocxCleaner, sanitize, sanitize_and_rewrite};
pub use profile::CleanProfile;
pub use properties::{rewrite_app_properties, rewrite_core_properties};
pub use verify::{VerifyReport, verify_clean};
