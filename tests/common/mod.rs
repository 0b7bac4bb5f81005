#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use livetakeoff_client::credentials::{
    ACCESS_TOKEN_KEY, CredentialStore, MemoryStore, REFRESH_TOKEN_KEY,
};
use livetakeoff_client::session::{Navigator, Notification, Notifier};
use livetakeoff_client::{ApiClient, ClientConfig, RefreshPolicy};

#[derive(Default)]
pub struct RecordingNavigator {
    pub routes: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn replace_route(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notifications: Mutex<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(base_url: &str, access: Option<&str>, refresh: Option<&str>) -> Self {
        Self::with_policy(base_url, access, refresh, RefreshPolicy::Independent)
    }

    pub fn with_policy(
        base_url: &str,
        access: Option<&str>,
        refresh: Option<&str>,
        policy: RefreshPolicy,
    ) -> Self {
        let store = Arc::new(MemoryStore::with_tokens(access, refresh));
        let navigator = Arc::new(RecordingNavigator::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let config = ClientConfig::new(base_url).with_refresh_policy(policy);
        let client = ApiClient::new(config, store.clone() as Arc<dyn CredentialStore>)
            .unwrap()
            .with_navigator(navigator.clone())
            .with_notifier(notifier.clone());
        Self {
            client,
            store,
            navigator,
            notifier,
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.store.get_item(ACCESS_TOKEN_KEY).await.unwrap()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.store.get_item(REFRESH_TOKEN_KEY).await.unwrap()
    }

    pub fn routes(&self) -> Vec<String> {
        self.navigator.routes.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.notifications.lock().unwrap().clone()
    }
}
