//! Client-side record cache.
//!
//! The view layer holds the loaded `Client`/`Work` collections and must
//! re-synchronize them after each mutating repository call. This cache
//! centralizes that merge logic behind an explicit `refresh_*` /
//! `apply_*` contract instead of ad hoc array surgery at every call site.
//!
//! Both collections are kept newest-first, matching the repositories'
//! `created_at DESC` ordering, so a freshly created record is prepended.

use uuid::Uuid;

use crate::models::{Client, UpdateClientRequest, UpdateWorkRequest, Work};

/// In-memory snapshot of the loaded clients and works.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    clients: Vec<Client>,
    works: Vec<Work>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn works(&self) -> &[Work] {
        &self.works
    }

    /// Replace the cached clients with a freshly listed set.
    pub fn refresh_clients(&mut self, clients: Vec<Client>) {
        self.clients = clients;
    }

    /// Replace the cached works with a freshly listed set.
    pub fn refresh_works(&mut self, works: Vec<Work>) {
        self.works = works;
    }

    /// Mirror a successful `ClientRepository::create`.
    pub fn apply_client_created(&mut self, client: Client) {
        self.clients.insert(0, client);
    }

    /// Mirror a successful `ClientRepository::update` by merging the same
    /// partial over the cached record.
    pub fn apply_client_updated(&mut self, id: Uuid, req: &UpdateClientRequest) {
        if let Some(client) = self.clients.iter_mut().find(|c| c.id == id) {
            *client = req.merge_into(client);
        }
    }

    /// Mirror a successful `ClientRepository::delete`. Cached works keep
    /// their (now dangling) reference, matching the non-cascading backend.
    pub fn apply_client_deleted(&mut self, id: Uuid) {
        self.clients.retain(|c| c.id != id);
    }

    /// Mirror a successful `WorkRepository::create`.
    pub fn apply_work_created(&mut self, work: Work) {
        self.works.insert(0, work);
    }

    /// Mirror a successful `WorkRepository::update`.
    pub fn apply_work_updated(&mut self, id: Uuid, req: &UpdateWorkRequest) {
        if let Some(work) = self.works.iter_mut().find(|w| w.id == id) {
            *work = req.merge_into(work);
        }
    }

    /// Mirror a successful `WorkRepository::delete`.
    pub fn apply_work_deleted(&mut self, id: Uuid) {
        self.works.retain(|w| w.id != id);
    }

    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn work(&self, id: Uuid) -> Option<&Work> {
        self.works.iter().find(|w| w.id == id)
    }

    /// Cached works belonging to one client, in cached (newest-first)
    /// order.
    pub fn client_works(&self, client_id: Uuid) -> Vec<&Work> {
        self.works.iter().filter(|w| w.client_id == client_id).collect()
    }
}
