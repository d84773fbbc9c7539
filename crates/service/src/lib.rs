//! Service layer providing product CRUD operations on top of `models`.
//! - Keeps request-shaped concerns (filters, merge-on-update) out of the entity.
//! - Maps model errors onto one `ServiceError` the HTTP layer can match on.

pub mod errors;
pub mod product_service;
#[cfg(test)]
pub mod test_support;
