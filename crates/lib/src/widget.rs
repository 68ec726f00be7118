//! The chat widget: one object per session owning the chat, the gate and the reply client.

use crate::avatar::{self, Avatar, Identity};
use crate::chat::{ChatController, ChatView, Outgoing};
use crate::config::{self, Config};
use crate::gate::{self, GateController};
use crate::profile::{Gender, Profile, ProfileStore};
use crate::reply::{ReplyBackend, ReplyClient, ReplyError};
use std::path::Path;

pub struct ChatWidget {
    pub chat: ChatController,
    pub gate: GateController,
    client: ReplyClient,
}

impl ChatWidget {
    pub fn new(store: ProfileStore, client: ReplyClient) -> Self {
        Self {
            chat: ChatController::new(),
            gate: GateController::new(store),
            client,
        }
    }

    /// Build from config: profile file and API base resolved the usual way.
    pub fn from_config(config: &Config, config_path: &Path) -> Self {
        let store = ProfileStore::new(config::resolve_profile_path(config, config_path));
        let client = ReplyClient::new(config::resolve_api_base(config));
        Self::new(store, client)
    }

    pub fn client(&self) -> &ReplyClient {
        &self.client
    }

    /// Startup: a stored profile skips the gate and is greeted; otherwise the gate opens.
    pub fn boot(&mut self) {
        match self.gate.restore().cloned() {
            Some(profile) => {
                log::debug!("widget: restored stored profile");
                self.gate.close();
                self.chat.push_greeting(gate::greeting(&profile));
            }
            None => self.gate.open(),
        }
    }

    pub fn assistant_avatar(&self) -> Avatar {
        avatar::resolve(Identity::Assistant)
    }

    pub fn user_avatar(&self) -> Avatar {
        self.gate.user_avatar()
    }

    pub fn sign_in(&mut self, name: &str, gender: Option<Gender>) -> Option<&Profile> {
        self.gate.submit(name, gender, &mut self.chat)
    }

    pub fn switch_profile(&mut self) {
        self.gate.switch_profile();
    }

    pub fn logout(&mut self, view: &mut dyn ChatView) {
        self.gate.logout(&mut self.chat, view);
    }

    pub fn begin_send(&mut self, text: &str, view: &mut dyn ChatView) -> Option<Outgoing> {
        self.chat.begin_send(text, view)
    }

    pub fn finish_send(
        &mut self,
        id: u64,
        outcome: Result<String, ReplyError>,
        view: &mut dyn ChatView,
    ) {
        self.chat.finish_send(id, outcome, view);
    }

    /// Send through the widget's own reply client.
    pub async fn send(&mut self, text: &str, view: &mut dyn ChatView) -> bool {
        let client = self.client.clone();
        self.send_with(&client, text, view).await
    }

    pub async fn send_with<B: ReplyBackend + ?Sized>(
        &mut self,
        backend: &B,
        text: &str,
        view: &mut dyn ChatView,
    ) -> bool {
        self.chat.send(backend, text, view).await
    }

    pub async fn health(&self) -> Result<serde_json::Value, ReplyError> {
        self.client.health().await
    }
}
