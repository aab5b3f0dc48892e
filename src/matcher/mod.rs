//! Matcher module - the template-matching worker gateway
//!
//! Talks to an external matching process over a line protocol and returns
//! validated match sets.

mod protocol;
mod worker;

pub use protocol::{parse_response, MatchRequest};
pub use worker::{MatcherWorker, TemplateMatcher};
