//! Denylist service stub: present at its interface only. No caller on
//! the request path consults it; it exists so the admin surface has
//! something to expose, grounded on the original's
//! `pkg/domain/denylist/service.go`.

mod repository;

pub use repository::Repository;

use thiserror::Error;

#[derive(Debug, Clone, serde::Serialize)]
pub struct Denied {
    pub domain: String,
    pub added_at_unix: u64,
}

#[derive(Error, Debug)]
pub enum DenylistError {
    #[error("domain must not be empty")]
    EmptyDomain,
}

/// The domain-layer service. Composes a [`Repository`], mirroring the
/// original's `service` struct embedding a `database Repository`.
pub struct Service {
    repository: Repository,
}

impl Service {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn add_denied_domain(&self, domain: &str, added_at_unix: u64) -> Result<(), DenylistError> {
        if domain.is_empty() {
            return Err(DenylistError::EmptyDomain);
        }
        self.repository.add_denied_domain(domain, added_at_unix);
        Ok(())
    }

    pub fn get_denied_domain(&self, domain: &str) -> Option<Denied> {
        self.repository.get_denied_domain(domain)
    }

    pub fn list_denied_domains(&self) -> Vec<Denied> {
        self.repository.list_denied_domains()
    }
}
