use crate::client::{ApiRequest, ApiResponse, HtbClient};
use crate::error::Result;

pub fn mark(client: &HtbClient, review_id: u64, helpful: bool) -> Result<ApiResponse> {
    let verdict = if helpful { "helpful" } else { "unhelpful" };
    client.execute(&ApiRequest::post(format!("/review/{verdict}/{review_id}")))
}
