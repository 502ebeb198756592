use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Config key for the bound on purge operations in flight.
pub const MDS_MAX_PURGE_OPS: &str = "mds_max_purge_ops";

/// Config key for the bound on strays (files) being purged at once.
pub const MDS_MAX_PURGE_FILES: &str = "mds_max_purge_files";

/// Selects which of the two purge throttles a run is verifying.
///
/// Whichever throttle is *not* selected gets relaxed for the duration of the run so that the
/// selected one is the only possible bottleneck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThrottleKind {
    /// The `mds_max_purge_ops` throttle.
    Ops,
    /// The `mds_max_purge_files` throttle.
    Files,
}

impl ThrottleKind {
    /// The config key of the limit under test.
    pub fn limit_key(&self) -> &'static str {
        match self {
            ThrottleKind::Ops => MDS_MAX_PURGE_OPS,
            ThrottleKind::Files => MDS_MAX_PURGE_FILES,
        }
    }

    /// The config key of the limit that is relaxed while this kind is under test.
    pub fn relaxed_key(&self) -> &'static str {
        match self {
            ThrottleKind::Ops => MDS_MAX_PURGE_FILES,
            ThrottleKind::Files => MDS_MAX_PURGE_OPS,
        }
    }
}

impl Display for ThrottleKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ThrottleKind::Ops => write!(f, "ops"),
            ThrottleKind::Files => write!(f, "files"),
        }
    }
}

impl FromStr for ThrottleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ops" => Ok(ThrottleKind::Ops),
            "files" => Ok(ThrottleKind::Files),
            other => Err(format!("Unknown throttle kind [{other}], expected `ops` or `files`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxed_key_is_the_other_limit() {
        assert_eq!(MDS_MAX_PURGE_FILES, ThrottleKind::Ops.relaxed_key());
        assert_eq!(MDS_MAX_PURGE_OPS, ThrottleKind::Files.relaxed_key());
        assert_ne!(ThrottleKind::Ops.limit_key(), ThrottleKind::Ops.relaxed_key());
    }

    #[test]
    fn parse_from_display() {
        for kind in [ThrottleKind::Ops, ThrottleKind::Files] {
            assert_eq!(kind, kind.to_string().parse().unwrap());
        }
        assert!("inodes".parse::<ThrottleKind>().is_err());
    }
}
