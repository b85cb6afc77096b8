use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::quote::{ProviderQuote, QuoteProvider};
use crate::providers::util::with_retry;

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

// YahooQuoteProvider implementation for QuoteProvider
pub struct YahooQuoteProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooQuoteProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("wtrack/0.1").build()?;
        Ok(YahooQuoteProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
    #[serde(alias = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
    #[serde(alias = "previousClose")]
    previous_close: Option<f64>,
    #[serde(alias = "regularMarketVolume")]
    regular_market_volume: Option<f64>,
    #[serde(alias = "longName")]
    long_name: Option<String>,
    #[serde(alias = "shortName")]
    short_name: Option<String>,
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=5d",
            self.base_url, symbol
        );
        debug!("Requesting quote from {}", url);

        let response = with_retry(
            || self.client.get(&url).send(),
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        if let Some(error) = data.chart.error {
            return Err(anyhow!(
                "Quote error for {}: {}",
                symbol,
                error.description.unwrap_or_else(|| "unknown".to_string())
            ));
        }

        let item = data
            .chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No quote data found for symbol: {}", symbol))?;
        let meta = item.meta;

        Ok(ProviderQuote {
            price: meta.regular_market_price,
            change_percent: None,
            volume: meta.regular_market_volume.unwrap_or(0.0).max(0.0) as u64,
            previous_close: meta.previous_close.or(meta.chart_previous_close),
            display_name: meta.long_name.or(meta.short_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 285.5,
                        "chartPreviousClose": 280.0,
                        "regularMarketVolume": 3500000,
                        "longName": "Vanguard Total Stock Market Index Fund ETF",
                        "shortName": "Vanguard Total Stock Market ETF",
                        "currency": "USD"
                    }
                }],
                "error": null
            }
        }"#;

        let mock_server = create_mock_server("VTI", 200, mock_response).await;
        let provider = YahooQuoteProvider::new(&mock_server.uri()).unwrap();

        let quote = provider.fetch_quote("VTI").await.unwrap();
        assert_eq!(quote.price, 285.5);
        assert_eq!(quote.previous_close, Some(280.0));
        assert_eq!(quote.volume, 3_500_000);
        assert_eq!(
            quote.display_name.as_deref(),
            Some("Vanguard Total Stock Market Index Fund ETF")
        );
    }

    #[tokio::test]
    async fn test_minimal_meta() {
        let mock_response = r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 0.5}}]}}"#;
        let mock_server = create_mock_server("SOFI", 200, mock_response).await;
        let provider = YahooQuoteProvider::new(&mock_server.uri()).unwrap();

        let quote = provider.fetch_quote("SOFI").await.unwrap();
        assert_eq!(quote.price, 0.5);
        assert_eq!(quote.volume, 0);
        assert!(quote.previous_close.is_none());
        assert!(quote.display_name.is_none());
    }

    #[tokio::test]
    async fn test_no_quote_result_data() {
        let mock_response = r#"{"chart": {"result": []}}"#;
        let mock_server = create_mock_server("INVALID", 200, mock_response).await;
        let provider = YahooQuoteProvider::new(&mock_server.uri()).unwrap();

        let result = provider.fetch_quote("INVALID").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No quote data found for symbol: INVALID"
        );
    }

    #[tokio::test]
    async fn test_chart_error_is_reported() {
        let mock_response = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        }"#;
        let mock_server = create_mock_server("GONE", 404, mock_response).await;
        let provider = YahooQuoteProvider::new(&mock_server.uri()).unwrap();

        let result = provider.fetch_quote("GONE").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 404 Not Found for symbol: GONE"
        );
    }

    #[tokio::test]
    async fn test_chart_error_with_success_status() {
        let mock_response = r#"{
            "chart": {"result": null, "error": {"description": "Invalid symbol"}}
        }"#;
        let mock_server = create_mock_server("BAD", 200, mock_response).await;
        let provider = YahooQuoteProvider::new(&mock_server.uri()).unwrap();

        let result = provider.fetch_quote("BAD").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Quote error for BAD: Invalid symbol"
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let mock_response = r#"{"charts": {}}"#;
        let mock_server = create_mock_server("VTI", 200, mock_response).await;
        let provider = YahooQuoteProvider::new(&mock_server.uri()).unwrap();

        let result = provider.fetch_quote("VTI").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for VTI")
        );
    }
}
