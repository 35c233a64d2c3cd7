//! Behavioural scenarios for spawning hosts from `host.create` directives.

mod spawn;
