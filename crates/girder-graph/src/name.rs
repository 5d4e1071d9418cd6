//! ---
//! girder_section: "01-core-functionality"
//! girder_subsection: "module"
//! girder_type: "source"
//! girder_scope: "code"
//! girder_description: "Hierarchical service identifiers."
//! girder_version: "v0.0.0-prealpha"
//! girder_owner: "tbd"
//! ---
use std::fmt;

/// Hierarchical, segment-based identifier for a service node.
///
/// Equality is structural: two names are equal when their segment
/// sequences are equal. Names are unique within one container instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName {
    segments: Vec<String>,
}

impl ServiceName {
    /// Construct a single-segment base name.
    pub fn base<S: Into<String>>(segment: S) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// Derive a child name by appending the given segments.
    pub fn append<I, S>(&self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments = self.segments.clone();
        segments.extend(parts.into_iter().map(Into::into));
        Self { segments }
    }

    /// Parse a dotted path (`"a.b.c"`) into a name.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// The ordered segment sequence.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_extends_segments() {
        let base = ServiceName::base("girder");
        let child = base.append(["naming", "context", "app"]);
        assert_eq!(child.to_string(), "girder.naming.context.app");
        assert_eq!(child.segments().len(), 4);
    }

    #[test]
    fn equality_is_structural() {
        let a = ServiceName::base("girder").append(["server"]);
        let b = ServiceName::parse("girder.server");
        assert_eq!(a, b);
        assert_ne!(a, ServiceName::parse("girder.server.startup"));
    }

    #[test]
    fn parse_skips_empty_segments() {
        let name = ServiceName::parse("girder..server");
        assert_eq!(name.segments(), ["girder", "server"]);
    }
}
