use log::debug;
use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;

use crate::error::RouteError;
use crate::geo::GeoPoint;
use crate::routing::{RouteProvider, RouteResponse};

use super::parser::{parse_directions_response, parse_error_response};
use super::response::{OrsDirectionsRequest, OrsDirectionsResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PROFILE: &str = "driving-car";

/// Routes via an OpenRouteService (or compatible) directions endpoint.
pub struct OrsRouteProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl OrsRouteProvider {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self, RouteError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}/v2/directions/{}/geojson", self.endpoint, PROFILE)
    }
}

impl RouteProvider for OrsRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteResponse, RouteError> {
        let body = OrsDirectionsRequest {
            coordinates: [[from.lng, from.lat], [to.lng, to.lat]],
            extra_info: ["waytype"],
            instructions: true,
        };

        let mut request = self.client.post(self.url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, key);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            debug!("ORS returned {}: {}", status, text);
            return Err(parse_error_response(&text));
        }

        let parsed: OrsDirectionsResponse = response.json()?;
        parse_directions_response(parsed)
    }
}
