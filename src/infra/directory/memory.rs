//! In-memory tenant directory.

use std::collections::HashMap;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::core::{Application, Queue, TenantDirectory};

/// Applications and queues held in process memory.
///
/// Provisioning belongs to the management surface; the `provision_*` and
/// `upsert_*` helpers exist so hosts and tests can seed records.
#[derive(Default)]
pub struct InMemoryDirectory {
    applications: RwLock<HashMap<Uuid, Application>>,
    queues: RwLock<HashMap<Uuid, Queue>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an application.
    pub fn upsert_application(&self, app: Application) {
        self.applications.write().insert(app.id, app);
    }

    /// Insert or replace a queue.
    pub fn upsert_queue(&self, queue: Queue) {
        self.queues.write().insert(queue.id, queue);
    }

    /// Create an active application with a fresh id.
    pub fn provision_application(
        &self,
        name: &str,
        credential: &str,
        callback_url: &str,
    ) -> Application {
        let app = Application {
            id: Uuid::new_v4(),
            name: name.to_string(),
            credential: credential.to_string(),
            callback_url: callback_url.to_string(),
            is_active: true,
            is_deleted: false,
        };
        self.upsert_application(app.clone());
        app
    }

    /// Create an active queue with a fresh id and default priority.
    pub fn provision_queue(&self, application_id: Uuid, name: &str, release_quota: u32) -> Queue {
        let queue = Queue {
            id: Uuid::new_v4(),
            application_id,
            name: name.to_string(),
            release_quota,
            priority: 1,
            is_active: true,
            is_deleted: false,
        };
        self.upsert_queue(queue.clone());
        queue
    }
}

impl TenantDirectory for InMemoryDirectory {
    fn application_by_credential(&self, credential: &str) -> Option<Application> {
        self.applications
            .read()
            .values()
            .find(|a| a.credential == credential && a.is_active && !a.is_deleted)
            .cloned()
    }

    fn application(&self, id: Uuid) -> Option<Application> {
        self.applications.read().get(&id).cloned()
    }

    fn queue_for_application(&self, application_id: Uuid, queue_id: Uuid) -> Option<Queue> {
        self.queues
            .read()
            .get(&queue_id)
            .filter(|q| q.application_id == application_id && q.is_live())
            .cloned()
    }

    fn active_queues(&self) -> Vec<Queue> {
        let mut queues: Vec<Queue> = self
            .queues
            .read()
            .values()
            .filter(|q| q.is_live())
            .cloned()
            .collect();
        // Higher priority first for hosts that read the order; the engine
        // treats queues independently.
        queues.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        queues
    }
}
