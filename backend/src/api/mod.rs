//! HTTP route definitions outside GraphQL
//!
//! The catalog API is GraphQL at /graphql; only operational endpoints live here.

pub mod health;
