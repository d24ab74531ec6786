use std::fmt;

/// One step in an [`AttrPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// A named object attribute, rendered as `.name`.
    Attribute(String),
    /// A map key, rendered as `[key]`.
    Key(String),
    /// A list or set position, rendered as `[3]`.
    Index(usize),
}

/// Addressable location of a node inside a configuration tree.
///
/// Renders the way operators write it in configuration, e.g.
/// `attribute_contract_fulfillment[subject].source.id`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttrPath {
    steps: Vec<PathStep>,
}

impl AttrPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path consisting of a single top-level attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self { steps: vec![PathStep::Attribute(name.into())] }
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        self.with_step(PathStep::Attribute(name.into()))
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.with_step(PathStep::Key(key.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.with_step(PathStep::Index(index))
    }

    /// Appends every step of `relative` below `self`.
    pub fn join(&self, relative: &AttrPath) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + relative.steps.len());
        steps.extend_from_slice(&self.steps);
        steps.extend_from_slice(&relative.steps);
        Self { steps }
    }

    fn with_step(&self, step: PathStep) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self { steps }
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("(root)");
        }
        for (position, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Attribute(name) if position == 0 => f.write_str(name)?,
                PathStep::Attribute(name) => write!(f, ".{name}")?,
                PathStep::Key(key) => write!(f, "[{key}]")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
