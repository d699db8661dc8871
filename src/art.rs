// Card-art resolution: a rate-limited, deduplicating fetch queue.
//
// The tier board wants one art image per distinct card. The upstream
// card-lookup service asks clients to space their requests out, so every
// lookup goes through a single worker task that services requests in FIFO
// order with a fixed delay between network calls. Outcomes (including
// failures) are cached for the life of the process, keyed by lower-cased
// card name; a cache hit never touches the queue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Lookup trait and the production implementation
// ---------------------------------------------------------------------------

/// One outbound art lookup. Implementations return the resolved image URL,
/// or `None` for any failure; the queue treats all failures as a terminal
/// "no art" answer.
#[async_trait]
pub trait ArtLookup: Send + Sync + 'static {
    async fn lookup(&self, card_name: &str) -> Option<String>;
}

/// Looks cards up by fuzzy name against the configured endpoint and pulls
/// the `image_uris.art_crop` field out of the response.
pub struct ScryfallLookup {
    http: reqwest::Client,
    endpoint: String,
}

impl ScryfallLookup {
    pub fn new(endpoint: String) -> Self {
        ScryfallLookup {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl ArtLookup for ScryfallLookup {
    async fn lookup(&self, card_name: &str) -> Option<String> {
        let response = match self
            .http
            .get(&self.endpoint)
            .query(&[("fuzzy", card_name)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("art lookup failed for \"{card_name}\": {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(
                "art lookup for \"{card_name}\" returned status {}",
                response.status()
            );
            return None;
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!("art lookup for \"{card_name}\" returned unreadable body: {e}");
                return None;
            }
        };

        body.get("image_uris")
            .and_then(|uris| uris.get("art_crop"))
            .and_then(|url| url.as_str())
            .map(str::to_string)
    }
}

// ---------------------------------------------------------------------------
// ArtFetcher
// ---------------------------------------------------------------------------

type Cache = Arc<Mutex<HashMap<String, Option<String>>>>;

struct ArtRequest {
    key: String,
    name: String,
    reply: oneshot::Sender<Option<String>>,
}

/// Handle to the art-fetch worker. Cheap to clone; all clones share one
/// cache and one queue.
#[derive(Clone)]
pub struct ArtFetcher {
    cache: Cache,
    tx: mpsc::UnboundedSender<ArtRequest>,
}

impl ArtFetcher {
    /// Spawn the single worker task and return a handle to it.
    pub fn spawn<L: ArtLookup>(lookup: L, delay: Duration) -> ArtFetcher {
        let cache: Cache = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(lookup, Arc::clone(&cache), rx, delay));
        ArtFetcher { cache, tx }
    }

    /// Resolve a card name to its art URL, or `None` if the card has no
    /// art or the lookup failed.
    ///
    /// Cache hits resolve immediately. Misses are queued and serviced in
    /// submission order by the worker; once a name resolves, the answer is
    /// permanent for the session.
    pub async fn resolve(&self, card_name: &str) -> Option<String> {
        let key = card_name.to_lowercase();
        if let Some(cached) = lock_cache(&self.cache).get(&key) {
            return cached.clone();
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = ArtRequest {
            key,
            name: card_name.to_string(),
            reply: reply_tx,
        };
        if self.tx.send(request).is_err() {
            // Worker gone; only happens during shutdown.
            return None;
        }
        reply_rx.await.unwrap_or(None)
    }
}

async fn run_worker<L: ArtLookup>(
    lookup: L,
    cache: Cache,
    mut rx: mpsc::UnboundedReceiver<ArtRequest>,
    delay: Duration,
) {
    while let Some(request) = rx.recv().await {
        // A duplicate for this name may have been queued before an earlier
        // request resolved; collapse it from the cache without a network
        // call (and without burning the inter-request delay).
        let collapsed = lock_cache(&cache).get(&request.key).cloned();
        if let Some(hit) = collapsed {
            let _ = request.reply.send(hit);
            continue;
        }

        debug!("art lookup: {}", request.name);
        let outcome = lookup.lookup(&request.name).await;
        lock_cache(&cache).insert(request.key, outcome.clone());
        // The caller may have gone away; the cache write above is what
        // matters for later requests.
        let _ = request.reply.send(outcome);

        tokio::time::sleep(delay).await;
    }
}

fn lock_cache(cache: &Cache) -> std::sync::MutexGuard<'_, HashMap<String, Option<String>>> {
    // Lock poisoning only occurs if a panic happened while holding the
    // guard; the map itself is still usable.
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
