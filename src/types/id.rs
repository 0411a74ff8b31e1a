// ABOUTME: Phantom-typed ARNs for compile-time type safety.
// ABOUTME: Prevents accidental swapping of task definition, service, and task ARNs.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum TaskDefinitionMarker {}
pub enum ServiceMarker {}
pub enum TaskMarker {}

/// An Amazon Resource Name tagged with the kind of resource it names.
///
/// ECS hands back opaque ARN strings for every resource. The phantom
/// parameter keeps a task ARN from being passed where a task definition
/// revision is expected.
#[must_use = "ARNs reference remote resources and should not be ignored"]
pub struct Arn<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Arn<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// The trailing resource segment, e.g. `web:42` for a task definition.
    pub fn resource(&self) -> &str {
        self.value
            .rsplit_once('/')
            .map(|(_, tail)| tail)
            .unwrap_or(&self.value)
    }
}

// Manual trait implementations that don't require T to implement the trait.

impl<T> std::fmt::Debug for Arn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Arn").field(&self.value).finish()
    }
}

impl<T> Clone for Arn<T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T> PartialEq for Arn<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Arn<T> {}

impl<T> Hash for Arn<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Arn<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

pub type TaskDefinitionArn = Arn<TaskDefinitionMarker>;
pub type ServiceArn = Arn<ServiceMarker>;
pub type TaskArn = Arn<TaskMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_is_trailing_segment() {
        let arn = TaskDefinitionArn::new("arn:aws:ecs:us-east-1:123456789012:task-definition/web:42");
        assert_eq!(arn.resource(), "web:42");
    }

    #[test]
    fn resource_of_bare_value_is_whole_value() {
        let arn = TaskArn::new("abc123");
        assert_eq!(arn.resource(), "abc123");
    }
}
