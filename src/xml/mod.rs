//! XML reading and writing of node trees

pub mod diagnostics;
pub mod reader;
pub mod writer;

pub use diagnostics::XmlError;
pub use reader::{parse_str, read_file};
pub use writer::{to_string, write_file};
