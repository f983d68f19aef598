/// Subsystem tags attached to every log line

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Resolver,
    Cache,
    Api,
    RateLimit,
    Batch,
    Stats,
    Sns,
    Config,
    System,
}

impl LogTag {
    /// Key used by `--debug-<key>` / `--verbose-<key>` flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::Resolver => "resolver",
            LogTag::Cache => "cache",
            LogTag::Api => "api",
            LogTag::RateLimit => "ratelimit",
            LogTag::Batch => "batch",
            LogTag::Stats => "stats",
            LogTag::Sns => "sns",
            LogTag::Config => "config",
            LogTag::System => "system",
        }
        .to_string()
    }

    pub fn to_plain_string(&self) -> String {
        self.to_debug_key().to_uppercase()
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
