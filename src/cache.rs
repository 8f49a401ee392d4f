//! TTL-bounded shared cache keyed by question fingerprint.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::dns::DNSMessage;
use crate::logger::Logger;

/// A stable hash over a message's Questions section only. Two messages
/// with identical questions (name, type, class, order) produce equal
/// fingerprints regardless of transaction ID, flags, or answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuestionFingerprint([u8; 32]);

impl QuestionFingerprint {
    pub fn of(msg: &DNSMessage) -> Self {
        use ring::digest::{digest, SHA256};

        // Canonical serialization: for each question, its labels joined
        // by '.', then a NUL, then the numeric type and class. This is
        // deliberately simpler than re-running the wire codec over just
        // the Questions section, while still being a pure function of
        // "same questions, same order".
        let mut canon = Vec::with_capacity(64);
        for q in &msg.questions {
            canon.extend_from_slice(q.name.join(".").as_bytes());
            canon.push(0);
            canon.extend_from_slice(&u16::from(q.qtype).to_be_bytes());
            canon.extend_from_slice(&u16::from(q.qclass).to_be_bytes());
            canon.push(0xff);
        }
        let hash = digest(&SHA256, &canon);
        let mut out = [0u8; 32];
        out.copy_from_slice(hash.as_ref());
        Self(out)
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

struct CacheEntry {
    reply: DNSMessage,
    expires_at: Instant,
}

/// Error returned by [`Cache::store`] when the reply is structurally
/// unfit to cache. Always logged and swallowed by the caller; caching
/// failure never fails the request it was attempting to serve.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("reply has no Questions section, cannot be fingerprinted")]
    NoQuestions,
}

/// Process-wide cache singleton shared by every ingress worker.
///
/// Backed by `dashmap`, which shards its internal map so `get` and
/// `store` on different keys proceed without contending on a single
/// lock; the sweeper only ever holds a single shard's lock for the
/// duration of one delete, never for the whole scan.
pub struct Cache {
    entries: DashMap<QuestionFingerprint, CacheEntry>,
    ttl: Duration,
    enabled: bool,
    logger: Logger,
}

impl Cache {
    pub fn new(ttl: Duration, enabled: bool, logger: Logger) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            enabled,
            logger,
        }
    }

    /// Returns a clone of the cached reply whose fingerprint matches
    /// `msg`'s questions, if any and unexpired. Never errors.
    pub fn get(&self, msg: &DNSMessage) -> Option<DNSMessage> {
        if !self.enabled {
            return None;
        }
        let fp = QuestionFingerprint::of(msg);
        let entry = self.entries.get(&fp)?;
        if entry.expires_at < Instant::now() {
            return None;
        }
        self.logger.debug(&format!("cache hit for {}", fp.to_hex()));
        Some(entry.reply.clone())
    }

    /// Inserts or overwrites the entry keyed by `fingerprint(reply)`
    /// with expiry `now + ttl`. A no-op if the cache is disabled.
    pub fn store(&self, reply: DNSMessage) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        if reply.questions.is_empty() {
            return Err(CacheError::NoQuestions);
        }
        let fp = QuestionFingerprint::of(&reply);
        self.logger.debug(&format!("storing reply for {}", fp.to_hex()));
        self.entries.insert(
            fp,
            CacheEntry {
                reply,
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One pass of the sweep: deletes entries whose `expires_at < now`.
    /// Each deletion takes only that entry's shard lock, never a lock
    /// over the whole map.
    pub fn sweep_once(&self) {
        let now = Instant::now();
        let expired: Vec<QuestionFingerprint> = self
            .entries
            .iter()
            .filter(|entry| entry.expires_at < now)
            .map(|entry| *entry.key())
            .collect();
        for key in expired {
            self.entries.remove(&key);
            self.logger.debug(&format!("cleared expired entry {}", key.to_hex()));
        }
    }

    /// Runs `sweep_once` once per second until `shutdown` fires.
    pub async fn run_sweeper(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) {
        let mut tick = tokio::time::interval(Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = tick.tick() => self.sweep_once(),
                _ = shutdown.recv() => {
                    self.logger.info("sweeper shutting down");
                    return;
                }
            }
        }
    }
}
