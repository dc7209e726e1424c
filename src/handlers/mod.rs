// Two handler tiers: public (no auth) and admin (bearer JWT, enforced
// by the AdminUser extractor on every handler).
pub mod admin;
pub mod public;
