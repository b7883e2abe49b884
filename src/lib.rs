pub mod config;
pub mod form;
pub mod maps;
pub mod packed;
pub mod server;

pub struct ErrFmt<'a>(&'a dyn std::error::Error);

impl std::fmt::Display for ErrFmt<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(src) = source {
            f.write_fmt(format_args!(" -> {src}"))?;
            source = src.source();
        }
        Ok(())
    }
}

/// Formats an error followed by each of its sources.
pub fn display_chain(err: &dyn std::error::Error) -> ErrFmt<'_> {
    ErrFmt(err)
}

/// Logs to stderr, `info` and up unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
}
