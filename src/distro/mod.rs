//! Distro templates.
//!
//! A distro is the reusable machine template a host is spawned from: image
//! and provider settings, setup and teardown fragments, the login user, and
//! template variables for setup scripts. The builder only ever mutates an
//! in-memory copy; stored distros are read-only here.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use shell_escape::unix::escape;

use crate::error::{EntityKind, ProvisionError};
use crate::pool::ContainerPoolsConfig;
use crate::provider::Provider;
use crate::settings::{ProviderSettings, SettingsBag, SettingsError};
use crate::store::DistroStore;

mod naming;

pub use naming::NAME_TIME_FORMAT;

/// A template variable available to setup scripts.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Expansion {
    /// Variable name, referenced as `${key}`.
    pub key: String,
    /// Substituted value.
    pub value: String,
}

/// A named, reusable machine template.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Distro {
    /// Unique identifier.
    pub id: String,
    /// Architecture tag, for example `linux_amd64` or `windows_amd64`.
    pub arch: String,
    /// Working directory for tasks.
    pub work_dir: String,
    /// Desired steady-state number of hosts.
    pub pool_size: u32,
    /// Provider that realises hosts of this distro.
    pub provider: Option<Provider>,
    /// Opaque provider settings; decode with [`Distro::decode_settings`].
    #[serde(rename = "settings")]
    pub provider_settings: SettingsBag,
    /// Whether setup runs under `sudo`.
    pub setup_as_sudo: bool,
    /// Shell fragment run when a host is set up.
    pub setup: String,
    /// Shell fragment run before a host is torn down.
    pub teardown: String,
    /// Login user.
    pub user: String,
    /// SSH key reference.
    pub ssh_key: String,
    /// Extra SSH client options.
    pub ssh_options: Vec<String>,
    /// Whether users may spawn hosts of this distro interactively.
    pub spawn_allowed: bool,
    /// Template variables, in declaration order.
    pub expansions: Vec<Expansion>,
    /// Whether the distro is disabled.
    pub disabled: bool,
    /// Container pool this distro backs; empty when none.
    pub container_pool: String,
}

impl Distro {
    /// Fetches a distro from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::NotFound`] when no distro has `id`, or
    /// [`ProvisionError::Persistence`] when the lookup fails.
    pub fn resolve<S>(store: &S, id: &str) -> Result<Self, ProvisionError>
    where
        S: DistroStore + ?Sized,
    {
        store
            .find_distro(id)?
            .ok_or_else(|| ProvisionError::not_found(EntityKind::Distro, id))
    }

    /// Whether hosts of this distro are spawned on demand rather than
    /// registered statically.
    #[must_use]
    pub fn is_ephemeral(&self) -> bool {
        self.provider.is_some_and(Provider::is_spawnable)
    }

    /// Whether the distro targets Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.arch.contains("windows")
    }

    /// File name of the agent binary on this distro's platform.
    #[must_use]
    pub fn binary_name(&self) -> &'static str {
        if self.is_windows() {
            "evergreen.exe"
        } else {
            "evergreen"
        }
    }

    /// Path of the agent binary relative to the build output directory.
    #[must_use]
    pub fn executable_sub_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.arch).join(self.binary_name())
    }

    /// Whether any pool in `pools` runs on hosts of this distro.
    #[must_use]
    pub fn is_parent_of(&self, pools: &ContainerPoolsConfig) -> bool {
        pools.has_parent(&self.id)
    }

    /// Value of the first expansion named `key`.
    #[must_use]
    pub fn expansion(&self, key: &str) -> Option<&str> {
        self.expansions
            .iter()
            .find(|expansion| expansion.key == key)
            .map(|expansion| expansion.value.as_str())
    }

    /// Substitutes `${key}` references in `text`, one expansion at a time in
    /// declaration order. A value may therefore reference expansions declared
    /// after it.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        self.expansions
            .iter()
            .fold(text.to_owned(), |acc, expansion| {
                acc.replace(&format!("${{{}}}", expansion.key), &expansion.value)
            })
    }

    /// Appends a setup fragment that installs `public_key` for the login
    /// user.
    pub fn append_authorized_key(&mut self, public_key: &str) {
        let target = format!("~{}/.ssh/authorized_keys", self.user);
        self.setup.push('\n');
        self.setup.push_str(&append_line_command(public_key, &target));
    }

    /// Decodes the settings bag into the shape `provider` expects.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Decode`] when the bag does not match.
    pub fn decode_settings(&self, provider: Provider) -> Result<ProviderSettings, SettingsError> {
        ProviderSettings::decode(provider, &self.provider_settings)
    }

    /// Writes typed settings back into the bag. Keys the typed shape does not
    /// know are kept.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Encode`] when serialisation fails.
    pub fn store_settings(&mut self, settings: &ProviderSettings) -> Result<(), SettingsError> {
        self.provider_settings.extend(settings.encode()?);
        Ok(())
    }
}

/// Shell command appending `line` to `target` on a line of its own, even
/// when the file does not end in a newline. `target` is emitted verbatim so
/// `~user` paths still expand.
pub(crate) fn append_line_command(line: &str, target: &str) -> String {
    format!("printf '\\n%s\\n' {} >> {target}\n", escape(line.into()))
}

/// An ordered set of distros, as loaded from platform configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DistroGroup(pub Vec<Distro>);

impl DistroGroup {
    /// Identifiers of every distro, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.0.iter().map(|distro| distro.id.as_str()).collect()
    }
}
