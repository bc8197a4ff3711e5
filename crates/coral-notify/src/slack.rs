//! Slack incoming-webhook delivery.

use std::time::Duration;

use serde_json::json;
use tracing::{info, warn};

use crate::summary::TradeSummary;

/// Posts trade summaries to a Slack incoming webhook.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook_url,
        }
    }

    /// Deliver a summary. Best-effort: failures are logged and swallowed
    /// so a Slack outage never blocks trading.
    pub async fn send(&self, summary: &TradeSummary) {
        let payload = render_payload(summary);
        match self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!(trades = summary.outcomes.len(), "summary delivered");
            }
            Ok(response) => {
                warn!(status = %response.status(), "slack webhook rejected summary");
            }
            Err(e) => {
                warn!(error = %e, "slack webhook delivery failed");
            }
        }
    }
}

/// Attachment-shaped payload: one field per closed trade, color keyed to
/// the aggregate result.
fn render_payload(summary: &TradeSummary) -> serde_json::Value {
    let color = if summary.total_profit >= rust_decimal::Decimal::ZERO {
        "#36a64f"
    } else {
        "#d00000"
    };
    let fields: Vec<serde_json::Value> = summary
        .outcomes
        .iter()
        .map(|o| {
            json!({
                "title": o.symbol,
                "value": format!(
                    "{} -> {} ({:.2}%)",
                    o.buy_price, o.sell_price, o.profit_percent
                ),
                "short": true,
            })
        })
        .collect();

    json!({
        "attachments": [{
            "color": color,
            "title": format!(
                "{} closed, {} in profit, total {}",
                summary.outcomes.len(),
                summary.wins(),
                summary.total_profit,
            ),
            "fields": fields,
        }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::SymbolOutcome;
    use rust_decimal_macros::dec;

    fn summary() -> TradeSummary {
        TradeSummary {
            outcomes: vec![SymbolOutcome {
                symbol: "BTCUSDT".to_string(),
                buy_price: dec!(100),
                sell_price: dec!(110),
                profit: dec!(20),
                profit_percent: dec!(10),
                holding_secs: 3_600,
            }],
            total_profit: dec!(20),
        }
    }

    #[test]
    fn test_payload_shape() {
        let payload = render_payload(&summary());
        let attachment = &payload["attachments"][0];
        assert_eq!(attachment["color"], "#36a64f");
        assert_eq!(attachment["fields"][0]["title"], "BTCUSDT");
        assert!(attachment["title"]
            .as_str()
            .unwrap()
            .starts_with("1 closed, 1 in profit"));
    }

    #[test]
    fn test_losing_summary_is_red() {
        let mut s = summary();
        s.total_profit = dec!(-5);
        let payload = render_payload(&s);
        assert_eq!(payload["attachments"][0]["color"], "#d00000");
    }
}
