pub mod calldtos;
pub mod notificationdtos;
pub mod userdtos;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error::HttpError, utils::pagination::page_bounds};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

#[derive(Serialize, Deserialize, Validate, Debug, Default)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1))]
    pub limit: Option<u32>,
}

impl RequestQueryDto {
    /// `(limit, offset)` for the store, with the limit capped.
    pub fn bounds(&self) -> (i64, i64) {
        page_bounds(self.page, self.limit)
    }
}

pub fn parse_id(raw: &str, field: &str) -> Result<Uuid, HttpError> {
    Uuid::parse_str(raw.trim()).map_err(|_| HttpError::bad_request(format!("Invalid {}", field)))
}
