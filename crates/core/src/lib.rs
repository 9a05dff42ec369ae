#![forbid(unsafe_code)]

pub mod index;

pub mod paths {
    use std::fmt;

    /// Location of a node: the ordered name segments from the root.
    ///
    /// The empty path denotes the root container itself. Ordering is
    /// segment-by-segment, so a path sorts directly before its descendants.
    #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct NodePath {
        segments: Vec<String>,
    }

    impl NodePath {
        pub fn root() -> Self {
            Self::default()
        }

        pub fn try_new<I, S>(segments: I) -> Result<Self, PathError>
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
            for (index, segment) in segments.iter().enumerate() {
                validate_segment(segment).map_err(|err| err.at(index))?;
            }
            Ok(Self { segments })
        }

        /// Parses whitespace-separated segments; blank text is the root.
        pub fn parse(value: &str) -> Self {
            Self {
                segments: value.split_whitespace().map(str::to_string).collect(),
            }
        }

        pub fn segments(&self) -> &[String] {
            &self.segments
        }

        pub fn len(&self) -> usize {
            self.segments.len()
        }

        pub fn is_root(&self) -> bool {
            self.segments.is_empty()
        }

        /// Last segment, `None` for the root.
        pub fn name(&self) -> Option<&str> {
            self.segments.last().map(String::as_str)
        }

        /// Path of the enclosing container, `None` for the root.
        pub fn parent(&self) -> Option<NodePath> {
            if self.is_root() {
                return None;
            }
            Some(self.prefix(self.segments.len() - 1))
        }

        pub fn prefix(&self, len: usize) -> NodePath {
            let len = len.min(self.segments.len());
            Self {
                segments: self.segments[..len].to_vec(),
            }
        }

        pub fn child(&self, name: impl Into<String>) -> Result<NodePath, PathError> {
            let name = name.into();
            validate_segment(&name).map_err(|err| err.at(self.segments.len()))?;
            let mut segments = self.segments.clone();
            segments.push(name);
            Ok(Self { segments })
        }

        /// Sibling path: same parent, last segment replaced.
        pub fn with_name(&self, name: impl Into<String>) -> Result<NodePath, PathError> {
            match self.parent() {
                Some(parent) => parent.child(name),
                None => Err(PathError::Root),
            }
        }

        /// True when `ancestor` is this path or one of its ancestors.
        pub fn starts_with(&self, ancestor: &NodePath) -> bool {
            self.segments.starts_with(&ancestor.segments)
        }
    }

    impl fmt::Display for NodePath {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            if self.is_root() {
                return write!(f, "<root>");
            }
            write!(f, "{}", self.segments.join(" -> "))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum PathError {
        EmptySegment { index: usize },
        Root,
    }

    impl PathError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::EmptySegment { .. } => "path segment must not be empty",
                Self::Root => "the root has no name",
            }
        }

        fn at(self, index: usize) -> Self {
            match self {
                Self::EmptySegment { .. } => Self::EmptySegment { index },
                other => other,
            }
        }
    }

    impl fmt::Display for PathError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::EmptySegment { index } => write!(f, "{} (index={index})", self.message()),
                Self::Root => write!(f, "{}", self.message()),
            }
        }
    }

    impl std::error::Error for PathError {}

    pub fn validate_segment(value: &str) -> Result<(), PathError> {
        if value.is_empty() {
            return Err(PathError::EmptySegment { index: 0 });
        }
        Ok(())
    }
}

pub mod model {
    use crate::paths::NodePath;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub enum NodeKind {
        Container,
        Entry,
    }

    impl NodeKind {
        pub fn as_str(self) -> &'static str {
            match self {
                NodeKind::Container => "container",
                NodeKind::Entry => "entry",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "container" => Some(NodeKind::Container),
                "entry" => Some(NodeKind::Entry),
                _ => None,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Node {
        pub path: NodePath,
        pub kind: NodeKind,
        pub value: Option<Vec<u8>>,
    }

    impl Node {
        pub fn container(path: NodePath) -> Self {
            Self {
                path,
                kind: NodeKind::Container,
                value: None,
            }
        }

        pub fn entry(path: NodePath, value: Vec<u8>) -> Self {
            Self {
                path,
                kind: NodeKind::Entry,
                value: Some(value),
            }
        }

        pub fn name(&self) -> &str {
            self.path.name().unwrap_or_default()
        }

        pub fn is_container(&self) -> bool {
            self.kind == NodeKind::Container
        }

        pub fn value(&self) -> Option<&[u8]> {
            self.value.as_deref()
        }
    }
}
