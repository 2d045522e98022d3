// Credit system: access-code registry, per-code credit ledger, and the
// admin issuance handler. Both stores are flat pretty-printed JSON files.

pub mod handlers;
pub mod ledger;
pub mod registry;
pub mod store;

/// Cover letter generations granted to a freshly seen access code.
pub const MAX_GENERATIONS: u32 = 5;
/// Improvement ceiling restored each time a new letter is generated.
pub const MAX_IMPROVEMENTS: u32 = 10;
/// Default generation allotment attached to newly issued codes.
pub const CREDITS_PER_CODE: u32 = 5;
/// Length of generated access codes.
pub const CODE_LENGTH: usize = 8;
/// Well-known administrative code seeded into an empty registry.
pub const BOOTSTRAP_CODE: &str = "ADMIN01";
