//! Extraction of `host.create` directives from a task's commands.

use tracing::debug;

use crate::config::SpawnConfig;
use crate::error::ProvisionError;
use crate::request::HostCreationRequest;
use crate::task::CommandConfig;

/// Command name that declares host creation.
pub const CREATE_HOST_COMMAND: &str = "host.create";

/// Decodes and validates every `host.create` directive in `commands`, in
/// declaration order. Other commands are skipped.
///
/// The directives of one task are a single batch, so the first invalid one
/// fails the whole call and nothing is returned for the others.
///
/// # Errors
///
/// Returns [`ProvisionError::Decode`] for the first directive whose
/// parameters do not decode or validate.
pub fn host_create_requests(
    commands: &[CommandConfig],
    config: &SpawnConfig,
) -> Result<Vec<HostCreationRequest>, ProvisionError> {
    commands
        .iter()
        .enumerate()
        .filter(|(_, command)| command.command == CREATE_HOST_COMMAND)
        .map(|(position, command)| -> Result<_, ProvisionError> {
            let mut request = HostCreationRequest::decode(&command.params)?;
            request.validate_and_default(config)?;
            debug!(
                position,
                distro = %request.distro,
                num_hosts = request.num_hosts,
                "decoded host.create directive"
            );
            Ok(request)
        })
        .collect()
}
