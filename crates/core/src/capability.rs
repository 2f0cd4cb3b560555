//! Capability wrapper for operations a collaborator may not provide yet.

/// Result of calling an optional collaborator operation.
///
/// Some persistence operations (access-grant CRUD, token liveness probes)
/// exist on the interface but have no backing implementation in every
/// deployment. Modeling that as a value lets callers branch on absence
/// instead of catching a runtime "not implemented" failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability<T> {
    /// The operation ran and produced a value.
    Implemented(T),
    /// The backing store does not provide this operation.
    NotImplemented,
}

impl<T> Capability<T> {
    pub fn is_implemented(&self) -> bool {
        matches!(self, Capability::Implemented(_))
    }

    /// The value, if the operation is implemented.
    pub fn implemented(self) -> Option<T> {
        match self {
            Capability::Implemented(v) => Some(v),
            Capability::NotImplemented => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Capability<U> {
        match self {
            Capability::Implemented(v) => Capability::Implemented(f(v)),
            Capability::NotImplemented => Capability::NotImplemented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implemented_maps_through() {
        let c = Capability::Implemented(2).map(|v| v * 2);
        assert_eq!(c, Capability::Implemented(4));
    }

    #[test]
    fn not_implemented_is_sticky() {
        let c: Capability<i32> = Capability::NotImplemented;
        assert_eq!(c.map(|v| v + 1), Capability::NotImplemented);
        let c: Capability<i32> = Capability::NotImplemented;
        assert!(c.implemented().is_none());
    }
}
