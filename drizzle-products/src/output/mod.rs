//! Output product assembly: layout selection, header preparation and
//! emission of combined or split product files.

pub mod assembler;
pub mod headers;
pub mod spec;

pub use assembler::{EmitOptions, OutputProductAssembler, ProductArrays, DEFAULT_UNITS};
pub use headers::{CHIP_SENTINEL, RESERVED_KEYS, WCS_KEYWORDS};
pub use spec::{ExposureWindow, OutputMode, OutputSpecification};
