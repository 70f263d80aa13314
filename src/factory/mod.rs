//! Parameter factories
//!
//! The creator of a scene graph implements [`ParameterFactory`] to tell the
//! graph which parameters each node type starts with. The graph calls it
//! exactly once per node creation, on the creating thread.

use crate::errors::{Result, SceneGraphError};
use crate::parameter::Parameter;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Initial parameters of a node, keyed by parameter name
pub type ParameterSet<K> = HashMap<K, Parameter>;

/// Produces the parameter set of a node from its type
pub trait ParameterFactory<K, T>: Send + Sync {
    /// Produce the set of parameters for a given node type
    fn parameter_set(&self, node_type: &T) -> Result<ParameterSet<K>>;
}

impl<K, T, P> ParameterFactory<K, T> for Box<P>
where
    P: ParameterFactory<K, T> + ?Sized,
{
    fn parameter_set(&self, node_type: &T) -> Result<ParameterSet<K>> {
        (**self).parameter_set(node_type)
    }
}

/// Factory backed by a closure
pub struct FnParameterFactory<F> {
    func: F,
}

impl<F> FnParameterFactory<F> {
    pub fn new<K, T>(func: F) -> Self
    where
        F: Fn(&T) -> Result<ParameterSet<K>> + Send + Sync,
    {
        Self { func }
    }
}

impl<K, T, F> ParameterFactory<K, T> for FnParameterFactory<F>
where
    F: Fn(&T) -> Result<ParameterSet<K>> + Send + Sync,
{
    fn parameter_set(&self, node_type: &T) -> Result<ParameterSet<K>> {
        (self.func)(node_type)
    }
}

/// Factory that hands out copies of per-type parameter templates
///
/// Types without a template get the fallback template if one is set,
/// otherwise creation fails with [`SceneGraphError::Factory`].
#[derive(Debug, Clone)]
pub struct TemplateParameterFactory<K, T>
where
    K: Eq + Hash,
    T: Eq + Hash,
{
    templates: HashMap<T, ParameterSet<K>>,
    fallback: Option<ParameterSet<K>>,
}

impl<K, T> Default for TemplateParameterFactory<K, T>
where
    K: Eq + Hash,
    T: Eq + Hash,
{
    fn default() -> Self {
        Self {
            templates: HashMap::new(),
            fallback: None,
        }
    }
}

impl<K, T> TemplateParameterFactory<K, T>
where
    K: Eq + Hash + Clone,
    T: Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the template for one node type
    pub fn with_template<I>(mut self, node_type: T, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Parameter)>,
    {
        self.templates
            .insert(node_type, params.into_iter().collect());
        self
    }

    /// Template used for node types with no template of their own
    pub fn with_fallback<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Parameter)>,
    {
        self.fallback = Some(params.into_iter().collect());
        self
    }

    /// Whether `node_type` has a dedicated template
    pub fn has_template(&self, node_type: &T) -> bool {
        self.templates.contains_key(node_type)
    }
}

impl<K, T> ParameterFactory<K, T> for TemplateParameterFactory<K, T>
where
    K: Eq + Hash + Clone + Send + Sync,
    T: Eq + Hash + Debug + Send + Sync,
{
    fn parameter_set(&self, node_type: &T) -> Result<ParameterSet<K>> {
        self.templates
            .get(node_type)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| {
                let message = format!("no parameter template for node type {node_type:?}");
                SceneGraphError::Factory(message)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_template() -> Vec<(String, Parameter)> {
        vec![
            ("intensity".to_string(), Parameter::new(1.0f32)),
            ("color".to_string(), Parameter::new([1.0f32, 1.0, 1.0])),
        ]
    }

    #[test]
    fn test_template_factory_returns_copies() {
        let factory =
            TemplateParameterFactory::<String, u32>::new().with_template(1, light_template());

        let mut first = factory.parameter_set(&1).unwrap();
        first
            .get_mut("intensity")
            .unwrap()
            .set(5.0f32)
            .unwrap();

        let second = factory.parameter_set(&1).unwrap();
        assert_eq!(second["intensity"].get::<f32>().unwrap(), &1.0);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn test_template_factory_fallback() {
        let factory = TemplateParameterFactory::<String, u32>::new()
            .with_template(1, light_template())
            .with_fallback([("type".to_string(), Parameter::new(5i32))]);

        assert!(factory.has_template(&1));
        assert!(!factory.has_template(&9));

        let params = factory.parameter_set(&9).unwrap();
        assert_eq!(params["type"].get::<i32>().unwrap(), &5);
    }

    #[test]
    fn test_template_factory_unknown_type() {
        let factory = TemplateParameterFactory::<String, u32>::new();
        assert!(matches!(
            factory.parameter_set(&3),
            Err(SceneGraphError::Factory(_))
        ));
    }

    #[test]
    fn test_fn_factory() {
        let factory = FnParameterFactory::new(|node_type: &u32| {
            let mut params = ParameterSet::new();
            params.insert("type", Parameter::new(*node_type));
            Ok(params)
        });

        let params = ParameterFactory::<&str, u32>::parameter_set(&factory, &7).unwrap();
        assert_eq!(params["type"].get::<u32>().unwrap(), &7);
    }

    #[test]
    fn test_boxed_factory() {
        let factory: Box<dyn ParameterFactory<String, u32>> = Box::new(
            TemplateParameterFactory::new().with_fallback(light_template()),
        );
        assert_eq!(factory.parameter_set(&0).unwrap().len(), 2);
    }
}
