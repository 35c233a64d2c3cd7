//! Instance name generation.

use crate::clock::{Clock, RandomSource};
use crate::provider::Provider;

use super::Distro;

/// Timestamp layout embedded in generated names; sorts lexically.
pub const NAME_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

impl Distro {
    /// Generates an instance name for a host of this distro on `provider`.
    ///
    /// Static hosts are all named `static` and containers get a random
    /// suffix. Other hosts are named after the distro, the current time, and
    /// a random suffix, then trimmed to the provider's identifier rules when
    /// it has any. Trimming can make two names collide; callers rely on the
    /// store rejecting duplicates.
    #[must_use]
    pub fn generate_name<C, R>(&self, provider: Provider, clock: &C, random: &R) -> String
    where
        C: Clock + ?Sized,
        R: RandomSource + ?Sized,
    {
        if provider == Provider::Static {
            return String::from("static");
        }
        if provider.is_container() {
            return format!("container-{}", random.next_int());
        }

        let name = format!(
            "evg-{}-{}-{}",
            self.id,
            clock.now().format(NAME_TIME_FORMAT),
            random.next_int()
        );
        if let Some(constraint) = provider.name_constraint() {
            return constraint.apply(&name);
        }
        name
    }
}
