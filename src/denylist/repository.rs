//! In-memory storage backing [`super::Service`], the only `Repository`
//! implementation the original's `Repository` interface needed here.

use dashmap::DashMap;

use super::Denied;

#[derive(Default)]
pub struct Repository {
    entries: DashMap<String, Denied>,
}

impl Repository {
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    pub fn add_denied_domain(&self, domain: &str, added_at_unix: u64) {
        self.entries.insert(
            domain.to_string(),
            Denied {
                domain: domain.to_string(),
                added_at_unix,
            },
        );
    }

    pub fn get_denied_domain(&self, domain: &str) -> Option<Denied> {
        self.entries.get(domain).map(|e| e.clone())
    }

    pub fn list_denied_domains(&self) -> Vec<Denied> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }
}
