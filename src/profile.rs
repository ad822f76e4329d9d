use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::container::Container;

/// Named configuration profile
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub active: bool,
    pub parent: Option<String>,
    pub default: bool,
}

impl Profile {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
            parent: None,
            default: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Known profiles and the active profile list.
///
/// The active list isn't checked against known profiles,
/// any name can be activated.
#[derive(Clone, Debug, Default)]
pub struct ProfileManager {
    profiles: BTreeMap<String, Profile>,
    active: Vec<String>,
}

impl ProfileManager {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
            active: Vec::new(),
        }
    }

    /// Replaces the active list.
    /// The `active` flag of known profiles is updated to reflect it.
    pub fn set_active<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active = names.into_iter().map(Into::into).collect();
        for profile in self.profiles.values_mut() {
            profile.active = self.active.contains(&profile.name);
        }
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|active| active == name)
    }

    #[inline]
    #[must_use]
    pub fn active(&self) -> &[String] {
        &self.active
    }

    /// Adds or replaces a profile with the same name and returns the replaced one
    pub fn add_profile(&mut self, mut profile: Profile) -> Option<Profile> {
        profile.active = self.is_active(&profile.name);
        self.profiles.insert(profile.name.clone(), profile)
    }

    #[inline]
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    #[inline]
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }
}

/// Predicate evaluated against a container
pub trait Condition {
    fn matches(&self, container: &Container) -> bool;
}

/// Condition that holds while the profile is active in the container
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileCondition {
    profile: String,
}

impl ProfileCondition {
    #[inline]
    #[must_use]
    pub fn new(profile: impl Into<String>) -> Self {
        Self { profile: profile.into() }
    }

    #[inline]
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }
}

impl Condition for ProfileCondition {
    #[inline]
    fn matches(&self, container: &Container) -> bool {
        container.is_profile_active(&self.profile)
    }
}
