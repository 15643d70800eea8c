/// Custom tower middleware
///
/// Session authentication lives in `crickfan_shared::auth::middleware`.

pub mod security;
