// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote sink shipping records to an Elasticsearch index.
//!
//! Records are transformed on the calling thread and queued to a dedicated
//! shipper thread that owns a single-threaded tokio runtime. Each record is
//! sent as one `POST {url}/{index}/_doc` request. Failures are reported to
//! the warning handler; nothing is retried. Every request is bounded by the
//! configured timeout, so dropping the sink waits for the queued records to
//! be shipped or to fail, never indefinitely.

use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde_json::Value;
use std::fmt;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::transform::{LogData, transform};
use super::{Sink, SinkError, WarningHandler};
use crate::config::ConfigError;
use crate::debug_fmt;
use crate::record::FormattedRecord;

/// Default bound on a single shipping request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Target index of shipped records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexPolicy {
    /// Every record goes to this index.
    Explicit(String),
    /// Daily indices named `<prefix>-YYYY.MM.DD`.
    Prefix(String),
}

impl IndexPolicy {
    /// The index for a record stamped at `timestamp`.
    pub fn index_for(&self, timestamp: &DateTime<Utc>) -> String {
        match self {
            IndexPolicy::Explicit(index) => index.clone(),
            IndexPolicy::Prefix(prefix) => format!("{prefix}-{}", timestamp.format("%Y.%m.%d")),
        }
    }
}

impl fmt::Display for IndexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexPolicy::Explicit(index) => write!(f, "index {index}"),
            IndexPolicy::Prefix(prefix) => write!(f, "index prefix {prefix}"),
        }
    }
}

/// Validated remote sink configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    url: Url,
    username: String,
    password: String,
    index: IndexPolicy,
    debug_tag: Option<String>,
    timeout: Duration,
}

impl RemoteConfig {
    /// Endpoint and credentials; the index defaults to the `filebeat-debug` prefix.
    pub fn new(
        url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::invalid_value(super::ES_URL_KEY, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid_value(
                super::ES_URL_KEY,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        Ok(Self {
            url,
            username: username.into(),
            password: password.into(),
            index: IndexPolicy::Prefix(super::DEFAULT_INDEX_PREFIX.to_string()),
            debug_tag: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_index(mut self, index: IndexPolicy) -> Self {
        self.index = index;
        self
    }

    pub fn with_debug_tag(mut self, debug_tag: Option<String>) -> Self {
        self.debug_tag = debug_tag;
        self
    }

    /// Bound on each request, connect included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn index(&self) -> &IndexPolicy {
        &self.index
    }

    pub fn debug_tag(&self) -> Option<&str> {
        self.debug_tag.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn document_url(&self, index: &str) -> String {
        format!("{}/{}/_doc", self.url.as_str().trim_end_matches('/'), index)
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("index", &self.index)
            .field("debug_tag", &self.debug_tag)
            .field("timeout", &self.timeout)
            .finish()
    }
}

struct Shipment {
    index: String,
    document: Value,
}

/// Sink forwarding transformed records to the shipper thread.
pub struct RemoteSink {
    config: RemoteConfig,
    sender: Option<UnboundedSender<Shipment>>,
    shipper: Option<JoinHandle<()>>,
}

impl RemoteSink {
    /// Start the shipper thread and return the sink feeding it.
    pub fn new(config: RemoteConfig, warnings: WarningHandler) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(MAX_CONNECT_TIMEOUT))
            .build()
            .map_err(|e| SinkError::Setup(format!("failed to build HTTP client: {e}")))?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SinkError::Setup(format!("failed to build shipper runtime: {e}")))?;

        let (sender, receiver) = unbounded_channel();
        let shipper_config = config.clone();

        let shipper = thread::Builder::new()
            .name("sorrir-es-shipper".to_string())
            .spawn(move || {
                runtime.block_on(ship(client, shipper_config, receiver, warnings));
            })?;

        Ok(Self {
            config,
            sender: Some(sender),
            shipper: Some(shipper),
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }
}

impl fmt::Debug for RemoteSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSink")
            .field("config", &self.config)
            .finish()
    }
}

impl Sink for RemoteSink {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    fn write(&self, record: &FormattedRecord) -> Result<(), SinkError> {
        let data = LogData::try_from(record)?;
        let document = transform(&data, self.config.debug_tag());
        let index = self.config.index.index_for(&record.timestamp);

        let sender = self.sender.as_ref().ok_or(SinkError::Closed)?;
        sender
            .send(Shipment { index, document })
            .map_err(|_| SinkError::Closed)
    }
}

impl Drop for RemoteSink {
    fn drop(&mut self) {
        // Closing the channel ends the shipper loop once the queue is drained.
        self.sender.take();
        if let Some(shipper) = self.shipper.take() {
            if shipper.join().is_err() {
                debug_fmt!("RemoteSink", "Shipper thread panicked");
            }
        }
    }
}

async fn ship(
    client: Client,
    config: RemoteConfig,
    mut receiver: UnboundedReceiver<Shipment>,
    warnings: WarningHandler,
) {
    while let Some(shipment) = receiver.recv().await {
        let url = config.document_url(&shipment.index);
        let result = client
            .post(&url)
            .basic_auth(&config.username, Some(&config.password))
            .json(&shipment.document)
            .send()
            .await;

        let failure = match result {
            Ok(response) if response.status().is_success() => {
                debug_fmt!("RemoteSink", "Shipped record to {}", shipment.index);
                None
            }
            Ok(response) => Some(format!("server responded with {}", response.status())),
            Err(e) => Some(e.to_string()),
        };

        if let Some(message) = failure {
            warnings(&SinkError::Delivery {
                index: shipment.index,
                message,
            });
        }
    }
}
