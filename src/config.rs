use anyhow::{bail, Context};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8000;

/// Environment variable naming the directory maps are stored under. The
/// server sets it for every CGI program it runs.
pub const ROOT_ENV: &str = "MAPSAVE_ROOT";

/// Directory, relative to the root, holding executable CGI programs.
pub const CGI_DIR: &str = "cgi-bin";

/// Serve the map editor and its CGI programs from a local directory
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ServerArgs {
    /// Address to listen on
    #[clap(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind: IpAddr,
    /// Port to listen on
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Directory to serve, defaults to the current directory
    #[clap(short, long)]
    pub root: Option<PathBuf>,
    /// Only serve static files, never execute programs under cgi-bin
    #[clap(long)]
    pub static_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMode {
    Static,
    Cgi,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub root: PathBuf,
    pub mode: ServerMode,
}

impl ServerConfig {
    pub fn cgi_dir(&self) -> PathBuf {
        self.root.join(CGI_DIR)
    }
}

impl ServerArgs {
    pub fn into_cfg(self) -> anyhow::Result<ServerConfig> {
        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().context("failed to read current directory")?,
        };
        if !root.is_dir() {
            bail!("root {} is not a directory", root.display());
        }
        let root = root
            .canonicalize()
            .with_context(|| format!("failed to resolve root {}", root.display()))?;
        let mode = if self.static_only {
            ServerMode::Static
        } else {
            ServerMode::Cgi
        };
        Ok(ServerConfig {
            addr: SocketAddr::new(self.bind, self.port),
            root,
            mode,
        })
    }
}

/// Root directory for a CGI program: `MAPSAVE_ROOT` when set, otherwise the
/// working directory the server started it in.
pub fn root_from_env() -> anyhow::Result<PathBuf> {
    match std::env::var_os(ROOT_ENV) {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => std::env::current_dir().context("failed to read current directory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_args() {
        let args = ServerArgs::parse_from(["mapsave-server"]);
        assert_eq!(args.port, 8000);
        assert_eq!(args.bind, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert!(args.root.is_none());
        assert!(!args.static_only);
    }

    #[test]
    fn test_into_cfg() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_str().unwrap();
        let args = ServerArgs::parse_from([
            "mapsave-server",
            "--bind",
            "127.0.0.1",
            "-p",
            "9000",
            "--root",
            root,
            "--static-only",
        ]);
        let cfg = args.into_cfg().unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(cfg.root, tmp.path().canonicalize().unwrap());
        assert_eq!(cfg.mode, ServerMode::Static);
        assert_eq!(cfg.cgi_dir(), cfg.root.join("cgi-bin"));
    }

    #[test]
    fn test_missing_root_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        let args = ServerArgs::parse_from(["mapsave-server", "--root", missing.to_str().unwrap()]);
        let err = args.into_cfg().unwrap_err();
        assert!(err.to_string().contains("is not a directory"), "{err}");
    }
}
