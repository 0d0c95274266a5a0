//! Byte buffer primitives shared by the packify encoder and decoder.
//!
//! [`Writer`] appends big-endian scalars to a growable buffer and can
//! back-patch a length slot once the payload after it is known.
//! [`Reader`] walks a borrowed slice with a cursor and never reads past
//! its end; every read returns a [`BufferError`] instead of panicking.

mod error;
mod reader;
mod writer;

pub use error::BufferError;
pub use reader::Reader;
pub use writer::Writer;
