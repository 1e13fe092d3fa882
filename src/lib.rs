pub mod catalog;
pub mod community;
pub mod config;
pub mod error;
pub mod exams;
pub mod models;
pub mod progress;
pub mod remote;
pub mod startup;
pub mod store;
pub mod sync;
pub mod viewer;

use std::sync::Arc;

use tracing::info;

use crate::catalog::CatalogService;
use crate::community::CommunityService;
use crate::error::StoreError;
use crate::exams::ExamService;
use crate::models::sync::SyncOutcome;
use crate::models::user::UserAccount;
use crate::progress::ProgressTracker;
use crate::remote::{Identity, ObjectStore, RemoteMirror, TextGenerator};
use crate::store::LocalStore;
use crate::sync::SyncCoordinator;

/// Everything wired together once at startup, collaborators injected. No
/// component reaches for ambient global state.
pub struct App {
    pub store: Arc<LocalStore>,
    pub sync: Arc<SyncCoordinator>,
    pub tracker: ProgressTracker,
    pub catalog: CatalogService,
    pub community: CommunityService,
    pub exams: ExamService,
}

impl App {
    pub fn new(
        store: Arc<LocalStore>,
        mirror: Arc<dyn RemoteMirror>,
        objects: Arc<dyn ObjectStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let sync = Arc::new(SyncCoordinator::new(Arc::clone(&store), mirror));
        Self {
            tracker: ProgressTracker::new(Arc::clone(&store)),
            catalog: CatalogService::new(Arc::clone(&store), Arc::clone(&sync), objects),
            community: CommunityService::new(Arc::clone(&store)),
            exams: ExamService::new(Arc::clone(&store), generator),
            sync,
            store,
        }
    }

    /// Idempotent first-run seeding: demo catalog, welcome announcement,
    /// and the admin account.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        self.store.seed(&startup::demo_materials()).await?;
        self.store.seed(&[startup::welcome_announcement()]).await?;
        self.store.seed(&[startup::default_admin()]).await?;
        info!("local store seeded");
        Ok(())
    }

    /// Login trigger: make sure a local account exists for the identity,
    /// then push the profile if the network allows it.
    pub async fn on_login(&self, identity: &Identity) -> Result<SyncOutcome, StoreError> {
        let account = match self.store.get::<UserAccount>(&identity.uid).await? {
            Some(account) => account,
            None => {
                let mut account = UserAccount::new(&identity.uid, &identity.email);
                account.name = identity.display_name.clone();
                self.store.upsert(&account).await?;
                info!(uid = %identity.uid, "local account created on first login");
                account
            }
        };
        Ok(self.sync.sync(&account.id).await)
    }
}
