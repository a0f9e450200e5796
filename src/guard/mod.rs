pub mod route;
pub mod router_guard;

pub use route::{Access, Route};
pub use router_guard::{authorize, is_allowed, landing_route, navigation, GuardDecision};
