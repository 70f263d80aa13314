//! Type-erasure plumbing behind [`Parameter`](super::Parameter)

use std::any::{self, Any, TypeId};

/// Object-safe view over a held value of some concrete type.
pub(crate) trait Placeholder: Send + Sync {
    /// Deep copy into a fresh box.
    fn clone_box(&self) -> Box<dyn Placeholder>;

    /// `TypeId` of the held value (not of the holder).
    fn value_type_id(&self) -> TypeId;

    fn value_type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Holds a value of type `V` and implements [`Placeholder`] for it.
pub(crate) struct Holder<V> {
    value: V,
}

impl<V> Holder<V> {
    pub(crate) fn new(value: V) -> Self {
        Self { value }
    }
}

impl<V> Placeholder for Holder<V>
where
    V: Any + Clone + Send + Sync,
{
    fn clone_box(&self) -> Box<dyn Placeholder> {
        Box::new(Holder::new(self.value.clone()))
    }

    fn value_type_id(&self) -> TypeId {
        TypeId::of::<V>()
    }

    fn value_type_name(&self) -> &'static str {
        any::type_name::<V>()
    }

    fn as_any(&self) -> &dyn Any {
        &self.value
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        &mut self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_reports_value_type() {
        let holder: Box<dyn Placeholder> = Box::new(Holder::new(7u8));
        assert_eq!(holder.value_type_id(), TypeId::of::<u8>());
        assert_eq!(holder.value_type_name(), "u8");
        assert_eq!(holder.as_any().downcast_ref::<u8>(), Some(&7));
    }

    #[test]
    fn test_clone_box_is_deep() {
        let mut original: Box<dyn Placeholder> = Box::new(Holder::new(vec![1, 2]));
        let copy = original.clone_box();

        if let Some(v) = original.as_any_mut().downcast_mut::<Vec<i32>>() {
            v.push(3);
        }

        assert_eq!(copy.as_any().downcast_ref::<Vec<i32>>(), Some(&vec![1, 2]));
    }
}
