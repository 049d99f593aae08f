//! Host identity lookups performed once at startup.

use crate::core::{InstanceIdentity, MempushError, Result};

pub mod imds;

pub use imds::ImdsResolver;

/// Resolves the cloud identity of the current host.
#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Fetch region, instance id and instance type.
    async fn resolve(&self) -> Result<InstanceIdentity>;
}

/// Source of the local hostname.
pub trait HostnameSource: Send + Sync {
    /// The name this host reports for itself.
    fn hostname(&self) -> Result<String>;
}

/// Hostname as reported by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHostname;

impl HostnameSource for SystemHostname {
    fn hostname(&self) -> Result<String> {
        hostname::get()?
            .into_string()
            .map_err(|raw| MempushError::Hostname(format!("not valid UTF-8: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_hostname_is_not_empty() {
        let name = SystemHostname.hostname().unwrap();
        assert!(!name.is_empty());
    }
}
