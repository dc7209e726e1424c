// Admin handlers: every function takes an AdminUser extractor, so a
// missing or invalid bearer token is rejected before the body is read.
pub mod content;
pub mod notifications;
pub mod requests;
