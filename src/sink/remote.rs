//! HTTP collector delivery

use parking_lot::Mutex;
use std::time::Duration;
use ureq::Agent;

use super::{DeliveryError, DeliveryResult};

const USER_AGENT: &str = concat!("netout/", env!("CARGO_PKG_VERSION"));

/// POSTs each record to a collector over one long-lived client
///
/// The agent is held behind a mutex: a request is built and performed as one
/// unit before the next delivery may start.
pub struct RemoteSink {
    url: String,
    agent: Mutex<Agent>,
}

impl RemoteSink {
    pub fn new(url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            url: url.to_string(),
            agent: Mutex::new(agent),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Success means the request completed; the response status is not inspected
    pub fn post(&self, text: &str) -> DeliveryResult {
        if self.url.is_empty() {
            log::debug!("Remote delivery skipped: no post URL configured");
            return Err(DeliveryError::Network("no post URL configured".to_string()));
        }

        let agent = self.agent.lock();
        let result = agent
            .post(self.url.as_str())
            .header("Content-Type", "text/plain")
            .header("User-Agent", USER_AGENT)
            .send(text.as_bytes());

        match result {
            Ok(response) => {
                log::debug!("Delivered {} bytes to {} ({})", text.len(), self.url, response.status());
                Ok(())
            }
            Err(e) => {
                log::debug!("Remote delivery to {} failed: {}", self.url, e);
                Err(DeliveryError::Network(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_is_network_error() {
        let sink = RemoteSink::new("", Duration::from_secs(1));
        for _ in 0..3 {
            assert!(matches!(sink.post("record"), Err(DeliveryError::Network(_))));
        }
    }

    #[test]
    fn test_unreachable_collector_is_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/collect", port);

        let sink = RemoteSink::new(&url, Duration::from_secs(2));
        assert!(matches!(sink.post("record"), Err(DeliveryError::Network(_))));
        assert_eq!(sink.url(), url);
    }

    #[test]
    fn test_malformed_url_is_network_error() {
        let sink = RemoteSink::new("not a url", Duration::from_secs(1));
        assert!(matches!(sink.post("record"), Err(DeliveryError::Network(_))));
    }
}
