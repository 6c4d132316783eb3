// Review queue: accepted records awaiting a recruiter decision.
// Lives outside the extraction core; the only mutable shared state.

pub mod handlers;
pub mod store;
