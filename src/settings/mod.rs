//! Provider-specific settings carried by a distro.
//!
//! Distros store their settings as an untyped key/value bag so one record
//! shape serves every provider. [`ProviderSettings`] is the typed view: the
//! bag is decoded into the shape the provider expects when it is read and
//! encoded back before it is stored, so shape mismatches surface at that
//! boundary instead of deep inside a provider adapter.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::ProvisionError;
use crate::provider::Provider;

mod ec2;
mod families;

pub use ec2::{Ec2Settings, MountPoint};
pub use families::{
    DockerSettings, GceSettings, OpenstackSettings, StaticHost, StaticSettings, VsphereSettings,
};

/// Untyped settings as persisted on a distro.
pub type SettingsBag = serde_json::Map<String, Value>;

/// Errors raised while converting between a [`SettingsBag`] and typed
/// settings.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SettingsError {
    /// Raised when the bag does not match the provider's settings shape.
    #[error("{provider} settings do not match the expected shape: {message}")]
    Decode {
        /// Provider whose shape was expected.
        provider: Provider,
        /// Underlying deserialisation message.
        message: String,
    },
    /// Raised when typed settings cannot be written back to a bag.
    #[error("failed to encode provider settings: {message}")]
    Encode {
        /// Underlying serialisation message.
        message: String,
    },
}

impl From<SettingsError> for ProvisionError {
    fn from(value: SettingsError) -> Self {
        Self::Configuration(value.to_string())
    }
}

/// Typed settings, one variant per provider family.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderSettings {
    /// Any EC2 flavour.
    Ec2(Ec2Settings),
    /// Google Compute Engine.
    Gce(GceSettings),
    /// Docker and its in-process double.
    Docker(DockerSettings),
    /// `OpenStack` compute.
    Openstack(OpenstackSettings),
    /// `VMware` vSphere.
    Vsphere(VsphereSettings),
    /// Statically registered machines.
    Static(StaticSettings),
    /// Providers that take no settings.
    None,
}

impl ProviderSettings {
    /// Decodes `bag` into the shape `provider` expects. Keys the shape does
    /// not know are ignored; keys it does know must hold the right type.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Decode`] when a known key holds a value of
    /// the wrong shape.
    pub fn decode(provider: Provider, bag: &SettingsBag) -> Result<Self, SettingsError> {
        let settings = match provider {
            Provider::Ec2Auto | Provider::Ec2OnDemand | Provider::Ec2Spot => {
                Self::Ec2(decode_as(provider, bag)?)
            }
            Provider::Gce => Self::Gce(decode_as(provider, bag)?),
            Provider::Docker | Provider::DockerMock => Self::Docker(decode_as(provider, bag)?),
            Provider::Openstack => Self::Openstack(decode_as(provider, bag)?),
            Provider::Vsphere => Self::Vsphere(decode_as(provider, bag)?),
            Provider::Static => Self::Static(decode_as(provider, bag)?),
            Provider::Mock => Self::None,
        };
        Ok(settings)
    }

    /// Encodes the settings back into an untyped bag. Every known field is
    /// written, including empty ones, so stale values never survive.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Encode`] when serialisation fails.
    pub fn encode(&self) -> Result<SettingsBag, SettingsError> {
        match self {
            Self::Ec2(settings) => encode_value(settings),
            Self::Gce(settings) => encode_value(settings),
            Self::Docker(settings) => encode_value(settings),
            Self::Openstack(settings) => encode_value(settings),
            Self::Vsphere(settings) => encode_value(settings),
            Self::Static(settings) => encode_value(settings),
            Self::None => Ok(SettingsBag::new()),
        }
    }
}

pub(crate) fn decode_as<T: DeserializeOwned>(
    provider: Provider,
    bag: &SettingsBag,
) -> Result<T, SettingsError> {
    serde_json::from_value(Value::Object(bag.clone())).map_err(|err| SettingsError::Decode {
        provider,
        message: err.to_string(),
    })
}

pub(crate) fn encode_value<T: Serialize>(settings: &T) -> Result<SettingsBag, SettingsError> {
    match serde_json::to_value(settings) {
        Ok(Value::Object(bag)) => Ok(bag),
        Ok(other) => Err(SettingsError::Encode {
            message: format!("expected an object, got {other}"),
        }),
        Err(err) => Err(SettingsError::Encode {
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests;
