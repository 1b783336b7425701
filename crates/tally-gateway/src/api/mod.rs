//! Vote API handlers (`/api/votes`).

pub mod votes;
