use serde::de::DeserializeOwned;
use crate::models::{ManualMatchRequest, ManualMatchResponse, Problem, ProblemsFilter, RouteDirection, StopRecord, StopSide};
use super::query::{problems_query, DataQuery};

const DATA_API: &str = "/api/data";
const STOP_POPUP_API: &str = "/api/stop_popup";
const MANUAL_MATCH_API: &str = "/api/manual_match";
const OPERATORS_API: &str = "/api/operators";
const ROUTE_STOPS_API: &str = "/api/route_stops";
const PROBLEMS_API: &str = "/api/problems";

/// Absolute URL for an API path. reqwest needs a base, which in the browser
/// is the page origin.
#[must_use]
pub fn api_url(path: &str) -> String {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
            return format!("{origin}{path}");
        }
    }
    format!("http://localhost:8080{path}")
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
    let response = response
        .error_for_status()
        .map_err(|e| format!("Request failed: {e}"))?;
    response
        .json::<T>()
        .await
        .map_err(|e| format!("Failed to deserialize: {e}"))
}

async fn get_json<T: DeserializeOwned>(path: &str, query: &[(&'static str, String)]) -> Result<T, String> {
    let response = reqwest::Client::new()
        .get(api_url(path))
        .query(query)
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    read_json(response).await
}

/// Stop records for the current viewport and filters
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP request fails
/// - The response status is not ok
/// - The response body cannot be deserialized
pub async fn fetch_data(query: &DataQuery) -> Result<Vec<StopRecord>, String> {
    get_json(DATA_API, query.pairs()).await
}

/// Full popup content for one marker, including correlated matches
///
/// # Errors
///
/// Returns an error if the request fails or the body is not a stop record.
pub async fn fetch_stop_popup(stop_id: i64, side: StopSide) -> Result<StopRecord, String> {
    get_json(STOP_POPUP_API, &[
        ("stop_id", stop_id.to_string()),
        ("view_type", side.as_str().to_string()),
    ]).await
}

/// # Errors
///
/// Returns an error if the request fails or the backend rejects the pairing.
pub async fn submit_manual_match(request: &ManualMatchRequest) -> Result<ManualMatchResponse, String> {
    let response = reqwest::Client::new()
        .post(api_url(MANUAL_MATCH_API))
        .json(request)
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;
    read_json(response).await
}

/// Known operator tags for the operator filter
///
/// # Errors
///
/// Returns an error if the request fails or the body is not a string list.
pub async fn fetch_operators() -> Result<Vec<String>, String> {
    get_json(OPERATORS_API, &[]).await
}

/// Stops served by a route, optionally restricted to one direction
///
/// # Errors
///
/// Returns an error if the request fails or the body is not a record list.
pub async fn fetch_route_stops(route_id: &str, direction: RouteDirection) -> Result<Vec<StopRecord>, String> {
    let mut query = vec![("route_id", route_id.to_string())];
    if direction != RouteDirection::Any {
        query.push(("direction_id", direction.as_str().to_string()));
    }
    get_json(ROUTE_STOPS_API, &query).await
}

/// # Errors
///
/// Returns an error if the request fails or the body is not a problem list.
pub async fn fetch_problems(filter: &ProblemsFilter) -> Result<Vec<Problem>, String> {
    get_json(PROBLEMS_API, &problems_query(filter)).await
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_api_url_uses_page_origin() {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .expect("browser origin");
        assert_eq!(api_url(DATA_API), format!("{origin}/api/data"));
    }
}
