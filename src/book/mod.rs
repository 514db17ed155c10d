//! Market data the matching engine reads: a `BookView` trait plus the default
//! in-memory implementation used when no external feed is wired in.

pub mod simple;
pub mod view;

pub use simple::SimpleBook;
pub use view::{BookType, BookView};
