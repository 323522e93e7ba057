//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (binary only; capture errors and transactions)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (fills the span field, echoes the header)
//! 4. CORS (the cart UI is served from another origin)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
