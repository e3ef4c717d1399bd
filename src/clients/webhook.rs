use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use chrono::Utc;
use reqwest::{Client, StatusCode, multipart::Form};
use tracing::{debug, error, info, warn};

use crate::{
    clients::delay::{Delay, TokioDelay},
    config::Config,
    models::{
        dispatch::{DispatchError, DispatchOutcome, DispatchSettings},
        embed::WebhookPayload,
        rate_limit::RateLimitState,
    },
};

pub const PAYLOAD_FIELD: &str = "payload_json";

/// Posts embeds to a Discord-style webhook, honouring its rate-limit headers.
pub struct WebhookDispatcher<D = TokioDelay> {
    http_client: Client,
    webhook_url: String,
    settings: DispatchSettings,
    delay: D,
}

enum Attempt {
    Delivered(RateLimitState),
    RateLimited(RateLimitState),
    Failed(DispatchError),
}

impl WebhookDispatcher<TokioDelay> {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(
            timeout_seconds = config.http_timeout_seconds,
            retry_after_unit = ?config.retry_after_unit,
            "Webhook dispatcher initialized"
        );

        Ok(Self::with_delay(
            http_client,
            &config.webhook_url,
            config.dispatch_settings(),
            TokioDelay,
        ))
    }
}

impl<D: Delay> WebhookDispatcher<D> {
    pub fn with_delay(
        http_client: Client,
        webhook_url: &str,
        settings: DispatchSettings,
        delay: D,
    ) -> Self {
        Self {
            http_client,
            webhook_url: webhook_url.to_string(),
            settings,
            delay,
        }
    }

    /// Sends `payload`, waiting out 429s and resending the same body until the
    /// webhook accepts it, rejects it, or a retry ceiling is hit.
    pub async fn send(&self, payload: &WebhookPayload) -> DispatchOutcome {
        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(e) => return DispatchOutcome::Failed(DispatchError::Encode(e.to_string())),
        };

        let mut retries = 0u32;
        let mut waited = Duration::ZERO;

        loop {
            match self.attempt(&body).await {
                Attempt::Delivered(state) => {
                    if let Some(cooldown) = state.cooldown(Utc::now()) {
                        info!(
                            cooldown_ms = cooldown.as_millis() as u64,
                            "Rate limit quota exhausted, cooling down"
                        );
                        self.delay.wait(cooldown).await;
                    }

                    return if retries == 0 {
                        DispatchOutcome::Delivered
                    } else {
                        info!(retries, "Webhook accepted message after rate limiting");
                        DispatchOutcome::RateLimitedThenDelivered { retries }
                    };
                }
                Attempt::RateLimited(state) => {
                    let Some(retry_after) = state.retry_after else {
                        warn!("Rate limited without a retry-after header, giving up");
                        return DispatchOutcome::Failed(DispatchError::MissingRetryAfter);
                    };

                    if self
                        .settings
                        .max_rate_limit_retries
                        .is_some_and(|max| retries >= max)
                    {
                        warn!(retries, "Rate limit retry ceiling reached");
                        return DispatchOutcome::Failed(DispatchError::RetryLimitExceeded {
                            retries,
                        });
                    }

                    waited = waited.saturating_add(retry_after);
                    if let Some(ceiling) = self.settings.max_total_wait {
                        if waited > ceiling {
                            warn!(
                                waited_ms = waited.as_millis() as u64,
                                ceiling_ms = ceiling.as_millis() as u64,
                                "Rate limit wait ceiling reached"
                            );
                            return DispatchOutcome::Failed(DispatchError::WaitCeilingExceeded {
                                requested: waited,
                                ceiling,
                            });
                        }
                    }

                    retries += 1;
                    warn!(
                        retry_after_ms = retry_after.as_millis() as u64,
                        retries,
                        "Rate limited, retrying after wait"
                    );
                    self.delay.wait(retry_after).await;
                }
                Attempt::Failed(e) => return DispatchOutcome::Failed(e),
            }
        }
    }

    async fn attempt(&self, body: &str) -> Attempt {
        let form = Form::new().text(PAYLOAD_FIELD, body.to_string());

        debug!(url = %self.webhook_url, "Posting webhook message");

        let response = match self
            .http_client
            .post(&self.webhook_url)
            .multipart(form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Error sending webhook");
                return Attempt::Failed(DispatchError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        let state = RateLimitState::from_headers(response.headers(), self.settings.retry_after_unit);

        info!(
            status = status.as_u16(),
            remaining = ?state.remaining,
            reset_at = ?state.reset_at,
            "Webhook responded"
        );

        if status.is_success() {
            return Attempt::Delivered(state);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::RateLimited(state);
        }

        let headers = format!("{:?}", response.headers());
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!(status = status.as_u16(), error = %e, "Failed to read webhook error body");
                return Attempt::Failed(DispatchError::Transport(e.to_string()));
            }
        };

        error!(
            status = status.as_u16(),
            headers = %headers,
            body = %body,
            "Webhook rejected the message"
        );

        Attempt::Failed(DispatchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
