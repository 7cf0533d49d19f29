//! Dashboard request DTOs

use serde::Deserialize;

/// Recent activity query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}
