//! TourAPI (KorService2) client
//!
//! Calls `areaBasedList2` and turns its items into [`CandidatePlace`]s.
//! Items without a title or without coordinates are dropped since every
//! visit has to be shown on a map.

use std::time::Duration;

use async_trait::async_trait;
use itinerary::CandidatePlace;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{PlaceError, PlaceQuery, PlaceSource};
use crate::config::PlacesConfig;

/// TourAPI client
pub struct TourApiClient {
    base_url: String,
    service_key: String,
    mobile_app: String,
    http: Client,
}

impl TourApiClient {
    /// Create a new client from configuration
    ///
    /// Fails before any network traffic when the service key is missing.
    pub fn from_config(config: &PlacesConfig) -> Result<Self, PlaceError> {
        debug!(base_url = %config.base_url, "from_config: called");
        let service_key = config
            .get_service_key()
            .map_err(|e| PlaceError::MissingCredentials(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(PlaceError::Network)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key,
            mobile_app: config.mobile_app.clone(),
            http,
        })
    }

    fn query_params(&self, query: &PlaceQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("serviceKey", self.service_key.clone()),
            ("MobileOS", "ETC".to_string()),
            ("MobileApp", self.mobile_app.clone()),
            ("_type", "json".to_string()),
            ("arrange", "A".to_string()),
            ("areaCode", query.area_code.to_string()),
            ("numOfRows", query.rows.to_string()),
            ("pageNo", "1".to_string()),
        ];
        if let Some(content_type_id) = query.content_type_id {
            params.push(("contentTypeId", content_type_id.to_string()));
        }
        params
    }
}

#[async_trait]
impl PlaceSource for TourApiClient {
    async fn area_based_list(&self, query: PlaceQuery) -> Result<Vec<CandidatePlace>, PlaceError> {
        debug!(?query, "area_based_list: called");
        let url = format!("{}/areaBasedList2", self.base_url);

        let response = self.http.get(&url).query(&self.query_params(&query)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "area_based_list: API error");
            return Err(PlaceError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        // The service answers some errors with a 200 and an XML body
        let text = response.text().await?;
        let payload: Value =
            serde_json::from_str(&text).map_err(|e| PlaceError::Malformed(format!("not JSON: {}", e)))?;

        let places = parse_items(&payload);
        debug!(count = places.len(), "area_based_list: parsed");
        Ok(places)
    }
}

/// Items under `response.body.items.item`, which may be one object or a list
fn parse_items(payload: &Value) -> Vec<CandidatePlace> {
    let items = &payload["response"]["body"]["items"]["item"];
    let items: Vec<&Value> = match items {
        Value::Array(list) => list.iter().collect(),
        Value::Object(_) => vec![items],
        _ => Vec::new(),
    };
    items.into_iter().filter_map(parse_item).collect()
}

fn parse_item(item: &Value) -> Option<CandidatePlace> {
    let title = text_field(item, "title");
    if title.is_empty() {
        return None;
    }

    let latitude = coordinate(item, "mapy");
    let longitude = coordinate(item, "mapx");
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }

    let external_id = Some(text_field(item, "contentid")).filter(|id| !id.is_empty());
    Some(CandidatePlace {
        title,
        address: text_field(item, "addr1"),
        image: text_field(item, "firstimage"),
        latitude,
        longitude,
        external_id,
    })
}

fn text_field(item: &Value, key: &str) -> String {
    match &item[key] {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn coordinate(item: &Value, key: &str) -> f64 {
    match &item[key] {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_items_list() {
        let payload = json!({
            "response": {"body": {"items": {"item": [
                {"title": "감천문화마을", "addr1": "부산광역시 사하구", "firstimage": "http://img/1.jpg",
                 "mapx": "129.0106", "mapy": "35.0975", "contentid": "126"},
                {"title": "", "mapx": "129.0", "mapy": "35.0"},
                {"title": "좌표 없음", "mapx": "0", "mapy": ""},
                {"title": "해운대해수욕장", "mapx": 129.1604, "mapy": 35.1587, "contentid": 2715601}
            ]}}}
        });

        let places = parse_items(&payload);

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].title, "감천문화마을");
        assert_eq!(places[0].address, "부산광역시 사하구");
        assert_eq!(places[0].latitude, 35.0975);
        assert_eq!(places[0].longitude, 129.0106);
        assert_eq!(places[0].external_id.as_deref(), Some("126"));
        assert_eq!(places[1].external_id.as_deref(), Some("2715601"));
        assert_eq!(places[1].image, "");
    }

    #[test]
    fn test_parse_items_single_object() {
        let payload = json!({
            "response": {"body": {"items": {"item":
                {"title": "광안리해수욕장", "mapx": "129.1186", "mapy": "35.1532"}
            }}}
        });
        let places = parse_items(&payload);
        assert_eq!(places.len(), 1);
        assert!(places[0].external_id.is_none());
    }

    #[test]
    fn test_parse_items_empty_body() {
        assert!(parse_items(&json!({"response": {"body": {"items": ""}}})).is_empty());
        assert!(parse_items(&json!({})).is_empty());
    }

    #[test]
    fn test_query_params() {
        let client = TourApiClient {
            base_url: "https://example.test".to_string(),
            service_key: "key".to_string(),
            mobile_app: "PlanMyTrip".to_string(),
            http: Client::new(),
        };
        let params = client.query_params(&PlaceQuery {
            area_code: 6,
            content_type_id: Some(39),
            rows: 25,
        });
        assert!(params.contains(&("areaCode", "6".to_string())));
        assert!(params.contains(&("contentTypeId", "39".to_string())));
        assert!(params.contains(&("numOfRows", "25".to_string())));
        assert!(params.contains(&("_type", "json".to_string())));
    }
}
