pub mod campaign;
pub mod logging;

// Session token persistence (stands in for the browser cookie)
pub mod session;

// Time-windowed anti-duplicate store for verification emails
pub mod dedup;
