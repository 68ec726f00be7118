//! Avatar image and label for each side of the conversation.

use crate::profile::{Gender, Profile};

pub const ASSISTANT_IMAGE: &str = "assets/yaddoo.png";
pub const ASSISTANT_LABEL: &str = "يَدّوه";
pub const MALE_IMAGE: &str = "assets/boy.png";
pub const FEMALE_IMAGE: &str = "assets/girl.png";
/// Label shown for the user before anyone has signed in ("guest").
pub const GUEST_LABEL: &str = "ضيف";

/// Who an avatar is for.
#[derive(Debug, Clone, Copy)]
pub enum Identity<'a> {
    Assistant,
    User(Option<&'a Profile>),
}

/// Image reference plus display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    pub image: &'static str,
    pub label: String,
}

/// Resolve the avatar for an identity. Total: every input maps to some avatar.
pub fn resolve(identity: Identity<'_>) -> Avatar {
    match identity {
        Identity::Assistant => Avatar {
            image: ASSISTANT_IMAGE,
            label: ASSISTANT_LABEL.to_string(),
        },
        Identity::User(profile) => {
            let label = profile
                .map(|p| p.name.trim())
                .filter(|n| !n.is_empty())
                .unwrap_or(GUEST_LABEL)
                .to_string();
            let image = match profile.map(|p| p.gender) {
                Some(Gender::Male) => MALE_IMAGE,
                _ => FEMALE_IMAGE,
            };
            Avatar { image, label }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_is_fixed() {
        let a = resolve(Identity::Assistant);
        assert_eq!(a.image, ASSISTANT_IMAGE);
        assert_eq!(a.label, ASSISTANT_LABEL);
    }

    #[test]
    fn male_profile_gets_boy_asset() {
        let p = Profile::new("Ali", Gender::Male).unwrap();
        let a = resolve(Identity::User(Some(&p)));
        assert_eq!(a.image, MALE_IMAGE);
        assert_eq!(a.label, "Ali");
    }

    #[test]
    fn female_and_unknown_fall_back_to_girl_asset() {
        let p = Profile::new("سارة", Gender::Female).unwrap();
        assert_eq!(resolve(Identity::User(Some(&p))).image, FEMALE_IMAGE);

        let unknown: Profile = serde_json::from_str(r#"{"name":"Sam","gender":"?"}"#).unwrap();
        assert_eq!(resolve(Identity::User(Some(&unknown))).image, FEMALE_IMAGE);
    }

    #[test]
    fn no_profile_is_guest() {
        let a = resolve(Identity::User(None));
        assert_eq!(a.label, GUEST_LABEL);
        assert_eq!(a.image, FEMALE_IMAGE);
    }
}
