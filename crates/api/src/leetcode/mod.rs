//! LeetCode GraphQL API access.

pub mod client;

pub use client::{LeetCodeApi, LeetCodeClientError, LeetCodeGraphqlClient};

#[cfg(test)]
pub use client::MockLeetCodeApi;
