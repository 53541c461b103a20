//! Pure catalog query core: filtering, sorting, paging, aggregation and projection over an
//! in-memory catalog snapshot.

pub mod aggregate;
pub mod catalog;
pub mod filter;
pub mod paging;
pub mod projection;
pub mod sort;
