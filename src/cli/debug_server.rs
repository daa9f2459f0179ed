//! Debug receiver CLI logic

use super::{init_logging, load_settings};
use crate::{server::app, utils::version};
use anyhow::Result;

/// Arguments for the debug receiver
#[derive(Debug)]
pub struct DebugServerArgs {
    pub host: String,
    pub port: u16,
    pub verbose: bool,
}

impl Default for DebugServerArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            verbose: false,
        }
    }
}

/// Run the debug receiver until interrupted
pub async fn run_debug_server(args: DebugServerArgs) -> Result<()> {
    let settings = load_settings(None);
    init_logging(&settings, args.verbose);

    let addr = parse_and_bind_address(&args.host, args.port).await?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        "Debug receiver v{} listening on {}",
        version::get_version(),
        addr
    );
    axum::serve(listener, app::create_app()).await?;

    Ok(())
}

/// Parse the host string into a socket address
///
/// `::` falls back to `0.0.0.0` when IPv6 is unavailable.
pub async fn parse_and_bind_address(host: &str, port: u16) -> Result<std::net::SocketAddr> {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V6(ip)) if ip == Ipv6Addr::UNSPECIFIED => {
            let addr = SocketAddr::new(IpAddr::V6(ip), port);
            match tokio::net::TcpListener::bind(addr).await {
                Ok(_) => Ok(addr),
                Err(e) => {
                    tracing::warn!(
                        "Could not listen on [::]:{} (Caused by {}), falling back to 0.0.0.0",
                        port,
                        e
                    );
                    Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port))
                }
            }
        }
        Ok(ip) => Ok(SocketAddr::new(ip, port)),
        Err(_) => anyhow::bail!(
            "Invalid host address: {}. Use an IP address such as 127.0.0.1 or ::",
            host
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_default_args() {
        let args = DebugServerArgs::default();
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 3000);
    }

    #[tokio::test]
    async fn test_parse_ipv4_address() {
        let addr = parse_and_bind_address("127.0.0.1", 0).await.unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_parse_ipv6_any_with_fallback() {
        let addr = parse_and_bind_address("::", 0).await.unwrap();
        assert!(
            addr.ip() == IpAddr::V6(Ipv6Addr::UNSPECIFIED)
                || addr.ip() == IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[tokio::test]
    async fn test_hostname_is_rejected() {
        let err = parse_and_bind_address("localhost", 3000).await.unwrap_err();
        assert!(err.to_string().contains("Invalid host address: localhost"));
    }
}
