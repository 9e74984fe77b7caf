mod categories;
mod questions;

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::db::pagination::{Pagination, DEFAULT_LIMIT};

pub use categories::category_router;
pub use questions::questions_router;

// limit/page arrive as strings in the query, hence the serde-aux helpers.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    limit: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    page: Option<u32>,
}

impl From<PaginationQuery> for Pagination {
    fn from(query: PaginationQuery) -> Pagination {
        Pagination::new(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(DEFAULT_LIMIT),
        )
    }
}
