//! Streaming reader for the `.sou` XML dialect.
//!
//! A `.sou` export is one large XML document whose root holds `<class>`
//! elements (a `<name>` child plus arbitrary body markup), `<comment>`
//! elements (`<class-id>` + `<body>`), and `<methods>` elements
//! (`<class-id>` + one `<body selector="...">` entry per method).

mod parser;

pub use parser::{SouError, SouReader, SouStats, method_names, method_names_from_reader};
