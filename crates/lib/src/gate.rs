//! Login / profile-switch gate.
//!
//! The gate owns the profile store and the active profile. Submitting it persists the profile,
//! hides the gate and greets the user with a local-only bubble.

use crate::avatar::{self, Avatar, Identity};
use crate::chat::{ChatController, ChatView};
use crate::profile::{Gender, Profile, ProfileStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Hidden,
    Visible,
}

/// Greeting appended once after sign-in ("welcome to Yaddoo's majlis, chat with me!").
pub fn greeting(profile: &Profile) -> String {
    format!("أهلًا يا {} في مجلس يَدّوه 👵🏽 — سولف وياي!", profile.name)
}

#[derive(Debug)]
pub struct GateController {
    store: ProfileStore,
    profile: Option<Profile>,
    state: GateState,
    focus_requested: bool,
}

impl GateController {
    /// Starts hidden with no active profile; call `boot` on the widget to read the store.
    pub fn new(store: ProfileStore) -> Self {
        Self {
            store,
            profile: None,
            state: GateState::Hidden,
            focus_requested: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == GateState::Visible
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn user_avatar(&self) -> Avatar {
        avatar::resolve(Identity::User(self.profile.as_ref()))
    }

    /// Show the gate. Focus on the name field is requested for the next frame, once the gate is drawn.
    pub fn open(&mut self) {
        self.state = GateState::Visible;
        self.focus_requested = true;
    }

    pub fn close(&mut self) {
        self.state = GateState::Hidden;
    }

    /// True once after each `open`; the front-end focuses the name field when it sees it.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    /// Read the stored profile into the gate. Used at startup.
    pub(crate) fn restore(&mut self) -> Option<&Profile> {
        self.profile = self.store.load();
        self.profile.as_ref()
    }

    /// Sign in. Needs a non-blank name and a gender; otherwise nothing happens and None is returned.
    pub fn submit(
        &mut self,
        name: &str,
        gender: Option<Gender>,
        chat: &mut ChatController,
    ) -> Option<&Profile> {
        let profile = Profile::new(name, gender?)?;
        self.store.save(&profile);
        log::debug!("gate: signed in ({})", profile.gender);
        self.close();
        chat.push_greeting(greeting(&profile));
        self.profile = Some(profile);
        self.profile.as_ref()
    }

    /// Re-open the gate; the chat stays as it is.
    pub fn switch_profile(&mut self) {
        self.open();
    }

    /// Forget the profile, wipe the chat and ask for a new sign-in.
    pub fn logout(&mut self, chat: &mut ChatController, view: &mut dyn ChatView) {
        self.store.clear();
        self.profile = None;
        chat.clear(view);
        self.open();
    }
}
