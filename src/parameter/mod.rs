//! Generic node parameter
//!
//! A [`Parameter`] holds one value of an arbitrary type chosen at run time.
//! Copies are deep, reads and writes are type-checked, and a parameter can be
//! type-locked so that later assignments must keep the current type.
//!
//! ```
//! use cim_scene_graph::Parameter;
//!
//! let mut p = Parameter::new(5i32);
//! assert_eq!(p.get::<i32>().unwrap(), &5);
//!
//! p.set(3.7f32).unwrap();
//! assert!(p.get::<i32>().is_err());
//!
//! p.set_type_lock(true);
//! assert!(p.set(10i32).is_err());
//! ```

mod holder;

use crate::errors::{Result, SceneGraphError};
use holder::{Holder, Placeholder};
use std::any::{self, Any, TypeId};
use std::fmt;

const EMPTY_TYPE_NAME: &str = "<empty>";

/// A value of arbitrary type with optional type lock
#[derive(Default)]
pub struct Parameter {
    holder: Option<Box<dyn Placeholder>>,
    type_lock: bool,
}

impl Parameter {
    /// Create a parameter holding `value`
    pub fn new<V>(value: V) -> Self
    where
        V: Any + Clone + Send + Sync,
    {
        Self {
            holder: Some(Box::new(Holder::new(value))),
            type_lock: false,
        }
    }

    /// Create a parameter holding nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no value is held
    pub fn is_empty(&self) -> bool {
        self.holder.is_none()
    }

    /// Name of the held type, `"<empty>"` when nothing is held
    pub fn type_name(&self) -> &'static str {
        self.holder
            .as_ref()
            .map_or(EMPTY_TYPE_NAME, |h| h.value_type_name())
    }

    /// Whether the held value is of type `V`
    pub fn is<V: Any>(&self) -> bool {
        self.holder_type_id() == Some(TypeId::of::<V>())
    }

    /// Lock (or unlock) the held type
    pub fn set_type_lock(&mut self, type_lock: bool) {
        self.type_lock = type_lock;
    }

    pub fn is_type_locked(&self) -> bool {
        self.type_lock
    }

    /// Replace the held value
    ///
    /// Fails with [`SceneGraphError::TypeMismatch`] if the parameter is
    /// type-locked and currently holds a value of a different type.
    pub fn set<V>(&mut self, value: V) -> Result<()>
    where
        V: Any + Clone + Send + Sync,
    {
        if self.type_lock {
            if let Some(held) = self.holder_type_id() {
                if held != TypeId::of::<V>() {
                    return Err(self.mismatch(any::type_name::<V>()));
                }
            }
        }
        self.holder = Some(Box::new(Holder::new(value)));
        Ok(())
    }

    /// Copy the value held by `other` into this parameter
    ///
    /// The lock flag of `self` is kept. Under a lock the assignment fails if
    /// both sides hold different types, or if a held value would be replaced
    /// by nothing.
    pub fn assign(&mut self, other: &Parameter) -> Result<()> {
        if self.type_lock {
            match (self.holder_type_id(), other.holder_type_id()) {
                (Some(held), Some(incoming)) if held != incoming => {
                    return Err(self.mismatch(other.type_name()));
                }
                (Some(_), None) => return Err(self.mismatch(EMPTY_TYPE_NAME)),
                _ => {}
            }
        }
        self.holder = other.holder.as_ref().map(|h| h.clone_box());
        Ok(())
    }

    /// Borrow the held value as `V`
    pub fn get<V: Any>(&self) -> Result<&V> {
        self.holder
            .as_ref()
            .and_then(|h| h.as_any().downcast_ref::<V>())
            .ok_or_else(|| self.mismatch(any::type_name::<V>()))
    }

    /// Mutably borrow the held value as `V`
    pub fn get_mut<V: Any>(&mut self) -> Result<&mut V> {
        let found = self.type_name();
        self.holder
            .as_mut()
            .and_then(|h| h.as_any_mut().downcast_mut::<V>())
            .ok_or(SceneGraphError::TypeMismatch {
                expected: any::type_name::<V>(),
                found,
            })
    }

    /// Apply `modifier` to the held value in place
    pub fn modify<V, R, F>(&mut self, modifier: F) -> Result<R>
    where
        V: Any,
        F: FnOnce(&mut V) -> R,
    {
        self.get_mut::<V>().map(modifier)
    }

    /// Borrow the held value as `V` without checking its type
    ///
    /// # Safety
    ///
    /// The parameter must be non-empty and hold a value of exactly type `V`.
    pub unsafe fn get_unchecked<V: Any>(&self) -> &V {
        debug_assert!(self.is::<V>(), "get_unchecked on {}", self.type_name());
        let held = self.holder.as_deref().unwrap_unchecked().as_any();
        &*(held as *const dyn Any as *const V)
    }

    /// Mutably borrow the held value as `V` without checking its type
    ///
    /// # Safety
    ///
    /// The parameter must be non-empty and hold a value of exactly type `V`.
    pub unsafe fn get_unchecked_mut<V: Any>(&mut self) -> &mut V {
        debug_assert!(self.is::<V>(), "get_unchecked_mut on {}", self.type_name());
        let held = self.holder.as_deref_mut().unwrap_unchecked().as_any_mut();
        &mut *(held as *mut dyn Any as *mut V)
    }

    fn holder_type_id(&self) -> Option<TypeId> {
        self.holder.as_ref().map(|h| h.value_type_id())
    }

    fn mismatch(&self, expected: &'static str) -> SceneGraphError {
        SceneGraphError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }
}

impl Clone for Parameter {
    fn clone(&self) -> Self {
        Self {
            holder: self.holder.as_ref().map(|h| h.clone_box()),
            type_lock: self.type_lock,
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("type", &self.type_name())
            .field("type_lock", &self.type_lock)
            .finish()
    }
}
