mod sqlite;
mod tables;

pub use sqlite::Database;

#[cfg(test)]
pub(crate) use tables::test_support;
