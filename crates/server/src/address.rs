//! RPC endpoint addresses and the listeners bound to them

use std::fmt;
use std::io;
use std::net::SocketAddr;
#[cfg(unix)]
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
#[cfg(unix)]
use tokio::net::{UnixListener, UnixStream};
use todo_daemon_core::{Error, Result};

/// Where the RPC endpoint lives: a local socket file or a TCP address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcAddress {
    #[cfg(unix)]
    Unix(PathBuf),
    Tcp(SocketAddr),
}

impl RpcAddress {
    /// Parse a `(network, address)` pair such as `("unix", "/run/x.sock")`
    pub fn parse(network: &str, address: &str) -> Result<Self> {
        match network {
            #[cfg(unix)]
            "unix" => {
                if address.is_empty() {
                    return Err(Error::configuration("socket path cannot be empty"));
                }
                Ok(RpcAddress::Unix(PathBuf::from(address)))
            }
            "tcp" => address.parse().map(RpcAddress::Tcp).map_err(|e| {
                Error::configuration(format!("invalid TCP address '{address}': {e}"))
            }),
            other => Err(Error::configuration(format!(
                "unsupported RPC network '{other}'"
            ))),
        }
    }

    pub fn network(&self) -> &'static str {
        match self {
            #[cfg(unix)]
            RpcAddress::Unix(_) => "unix",
            RpcAddress::Tcp(_) => "tcp",
        }
    }
}

impl fmt::Display for RpcAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(unix)]
            RpcAddress::Unix(path) => write!(f, "unix:{}", path.display()),
            RpcAddress::Tcp(addr) => write!(f, "tcp:{addr}"),
        }
    }
}

/// A bound RPC listener.
///
/// Dropping a Unix listener removes its socket file.
#[derive(Debug)]
pub enum RpcListener {
    #[cfg(unix)]
    Unix { listener: UnixListener, path: PathBuf },
    Tcp(TcpListener),
}

impl RpcListener {
    pub async fn bind(address: &RpcAddress) -> Result<Self> {
        match address {
            #[cfg(unix)]
            RpcAddress::Unix(path) => {
                let listener = UnixListener::bind(path).map_err(|e| {
                    Error::network(address.to_string(), format!("cannot listen: {e}"))
                })?;
                Ok(RpcListener::Unix {
                    listener,
                    path: path.clone(),
                })
            }
            RpcAddress::Tcp(addr) => {
                let listener = TcpListener::bind(addr).await.map_err(|e| {
                    Error::network(address.to_string(), format!("cannot listen: {e}"))
                })?;
                Ok(RpcListener::Tcp(listener))
            }
        }
    }

    /// The address actually bound; for TCP this carries the assigned port
    pub fn local_address(&self) -> Result<RpcAddress> {
        match self {
            #[cfg(unix)]
            RpcListener::Unix { path, .. } => Ok(RpcAddress::Unix(path.clone())),
            RpcListener::Tcp(listener) => listener
                .local_addr()
                .map(RpcAddress::Tcp)
                .map_err(|e| Error::network("tcp", format!("cannot read local address: {e}"))),
        }
    }

    /// Accept the next connection, returning it with a printable peer name
    pub async fn accept(&self) -> io::Result<(RpcStream, String)> {
        match self {
            #[cfg(unix)]
            RpcListener::Unix { listener, path } => {
                let (stream, _) = listener.accept().await?;
                Ok((RpcStream::Unix(stream), path.display().to_string()))
            }
            RpcListener::Tcp(listener) => {
                let (stream, peer) = listener.accept().await?;
                Ok((RpcStream::Tcp(stream), peer.to_string()))
            }
        }
    }
}

impl Drop for RpcListener {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let RpcListener::Unix { path, .. } = self {
            if path.exists() {
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

/// One accepted or dialed RPC connection
#[derive(Debug)]
pub enum RpcStream {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl RpcStream {
    pub async fn connect(address: &RpcAddress) -> Result<Self> {
        let stream = match address {
            #[cfg(unix)]
            RpcAddress::Unix(path) => UnixStream::connect(path).await.map(RpcStream::Unix),
            RpcAddress::Tcp(addr) => TcpStream::connect(addr).await.map(RpcStream::Tcp),
        };
        stream.map_err(|e| Error::network(address.to_string(), format!("cannot connect: {e}")))
    }
}

impl AsyncRead for RpcStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            #[cfg(unix)]
            RpcStream::Unix(s) => Pin::new(s).poll_read(cx, buf),
            RpcStream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for RpcStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            #[cfg(unix)]
            RpcStream::Unix(s) => Pin::new(s).poll_write(cx, buf),
            RpcStream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            #[cfg(unix)]
            RpcStream::Unix(s) => Pin::new(s).poll_flush(cx),
            RpcStream::Tcp(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            #[cfg(unix)]
            RpcStream::Unix(s) => Pin::new(s).poll_shutdown(cx),
            RpcStream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tcp_address() {
        let addr = RpcAddress::parse("tcp", "127.0.0.1:0").unwrap();
        assert_eq!(addr.network(), "tcp");
        assert_eq!(addr.to_string(), "tcp:127.0.0.1:0");
    }

    #[test]
    fn test_parse_rejects_unknown_network() {
        assert!(RpcAddress::parse("udp", "127.0.0.1:0").is_err());
        assert!(RpcAddress::parse("tcp", "not an address").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unix_listener_removes_socket_on_drop() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("rpc.sock");
        let address = RpcAddress::parse("unix", path.to_str().unwrap()).unwrap();

        let listener = RpcListener::bind(&address).await.unwrap();
        assert!(path.exists());
        assert_eq!(listener.local_address().unwrap(), address);

        drop(listener);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_tcp_listener_reports_assigned_port() {
        let address = RpcAddress::parse("tcp", "127.0.0.1:0").unwrap();
        let listener = RpcListener::bind(&address).await.unwrap();

        match listener.local_address().unwrap() {
            RpcAddress::Tcp(addr) => assert_ne!(addr.port(), 0),
            #[cfg(unix)]
            other => panic!("unexpected address {other}"),
        }
    }
}
