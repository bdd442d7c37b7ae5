//! Explicit parameter stores.
//!
//! Each network component owns a named mapping from parameter name to tensor.
//! Sharing parameters between two invocations means passing the same store
//! into both calls; the tensors are aliased, never copied. This replaces
//! implicit name-scoped variable reuse with a value you can see and test.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use ndarray::ArrayD;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{Error, Result};

/// Aliased handle to a single parameter tensor.
///
/// Interior mutability is needed because batch normalization folds batch
/// statistics into its running statistics during training-mode forward
/// passes. Graph construction is single-threaded, so `Rc<RefCell<_>>` is the
/// whole story.
pub type ParamRef = Rc<RefCell<ArrayD<f32>>>;

/// Named collection of parameter tensors for one network component.
///
/// Parameters are created on first request and returned aliased afterwards.
/// Requesting an existing parameter under a different shape is an error,
/// surfaced immediately.
#[derive(Debug)]
pub struct ParamStore {
    scope: String,
    rng: StdRng,
    entries: BTreeMap<String, ParamRef>,
}

impl ParamStore {
    /// Create an empty store with OS-seeded initialization randomness.
    #[must_use]
    pub fn new(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            rng: StdRng::from_os_rng(),
            entries: BTreeMap::new(),
        }
    }

    /// Create an empty store with a fixed seed for reproducible
    /// initialization.
    #[must_use]
    pub fn with_seed(scope: &str, seed: u64) -> Self {
        Self {
            scope: scope.to_string(),
            rng: StdRng::seed_from_u64(seed),
            entries: BTreeMap::new(),
        }
    }

    /// Scope name this store belongs to.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Fetch a parameter, initializing it on first use.
    ///
    /// The `init` closure receives the store's RNG and runs only when the
    /// parameter does not exist yet. An existing parameter whose shape
    /// disagrees with `shape` yields [`Error::ShapeMismatch`].
    pub fn get_or_init<F>(&mut self, name: &str, shape: &[usize], init: F) -> Result<ParamRef>
    where
        F: FnOnce(&mut StdRng) -> ArrayD<f32>,
    {
        if let Some(param) = self.entries.get(name) {
            let stored = param.borrow().shape().to_vec();
            if stored != shape {
                return Err(Error::ShapeMismatch {
                    name: format!("{}/{}", self.scope, name),
                    requested: shape.to_vec(),
                    stored,
                });
            }
            return Ok(Rc::clone(param));
        }

        let tensor = init(&mut self.rng);
        if tensor.shape() != shape {
            return Err(Error::ShapeMismatch {
                name: format!("{}/{}", self.scope, name),
                requested: shape.to_vec(),
                stored: tensor.shape().to_vec(),
            });
        }
        let param = Rc::new(RefCell::new(tensor));
        self.entries.insert(name.to_string(), Rc::clone(&param));
        Ok(param)
    }

    /// Look up an existing parameter without creating it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ParamRef> {
        self.entries.get(name).map(Rc::clone)
    }

    /// Number of parameter tensors held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no parameters yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of scalar parameters across all tensors.
    #[must_use]
    pub fn num_parameters(&self) -> usize {
        self.entries.values().map(|p| p.borrow().len()).sum()
    }

    /// Names of all stored parameters, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
