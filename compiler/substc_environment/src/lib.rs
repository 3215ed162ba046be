//! Binds the generic parameters of a signature to context types and
//! translates types between their interface and context forms.
//!
//! One [`GenericEnvironment`] is created per generic declaration and shared
//! by every use site instantiating it. Its binding slots fill lazily on first
//! demand and are never overwritten afterwards, which lets any number of
//! threads read them concurrently.

use std::{collections::HashMap, fmt, sync::Arc, thread::ThreadId};

use dashmap::DashMap;
use log::{debug, trace};
use parking_lot::{Mutex, RwLock};
use substc_table::{common_ancestor, Hierarchy, ScopeID};
use substc_term::{
    generic_parameter::{GenericParameterKey, TypeParameter},
    generic_signature::GenericSignature,
    r#type::Type,
};

pub mod config;
pub mod error;
pub mod mapping;
pub mod resolver;
mod substitution;
mod sugar;

pub use config::{Config, ForeignParameterPolicy};
pub use error::Error;
pub use mapping::{map_type_into_context, map_type_out_of_context};
pub use resolver::{Archetypes, Resolver};

/// The binding of every generic parameter of one [`GenericSignature`] to its
/// context type.
///
/// The slot count is fixed at construction and equal to the signature's
/// parameter count. A slot is written at most once, either eagerly with
/// [`GenericEnvironment::bind`] or lazily by the resolver the first time the
/// parameter is mapped into context.
pub struct GenericEnvironment {
    signature: Arc<GenericSignature>,
    resolver: Option<Arc<dyn Resolver>>,
    owning_scope: RwLock<Option<ScopeID>>,

    context_types: Box<[RwLock<Option<Type>>]>,
    member_types: DashMap<Type, Type>,

    resolutions_in_progress: Mutex<HashMap<ThreadId, Vec<Type>>>,
    config: Config,
}

impl fmt::Debug for GenericEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericEnvironment")
            .field("signature", &self.signature)
            .field("has_resolver", &self.resolver.is_some())
            .field("owning_scope", &*self.owning_scope.read())
            .field("context_types", &self.context_types)
            .field("member_types", &self.member_types)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GenericEnvironment {
    /// Creates an environment without a resolver; every parameter must be
    /// bound with [`Self::bind`] before it's mapped into context.
    #[must_use]
    pub fn new(signature: Arc<GenericSignature>, config: Config) -> Self {
        Self::create(signature, None, config)
    }

    /// Creates an environment whose unbound parameters are materialized on
    /// demand by `resolver`.
    #[must_use]
    pub fn with_resolver(
        signature: Arc<GenericSignature>,
        resolver: Arc<dyn Resolver>,
        config: Config,
    ) -> Self {
        Self::create(signature, Some(resolver), config)
    }

    fn create(
        signature: Arc<GenericSignature>,
        resolver: Option<Arc<dyn Resolver>>,
        config: Config,
    ) -> Self {
        let context_types = (0..signature.parameter_count())
            .map(|_| RwLock::new(None))
            .collect();

        Self {
            signature,
            resolver,
            owning_scope: RwLock::new(None),
            context_types,
            member_types: DashMap::new(),
            resolutions_in_progress: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Gets the signature whose parameters this environment binds.
    #[must_use]
    pub fn signature(&self) -> &Arc<GenericSignature> { &self.signature }

    /// Gets the configuration the environment was created with.
    #[must_use]
    pub const fn config(&self) -> &Config { &self.config }

    /// Gets the scope that owns this environment, if any has been set.
    #[must_use]
    pub fn owning_scope(&self) -> Option<ScopeID> { *self.owning_scope.read() }

    fn slot_index(&self, key: GenericParameterKey) -> Result<usize, Error> {
        self.signature.index_of(key).ok_or_else(|| {
            Error::ForeignParameter(TypeParameter::canonical_with(key))
        })
    }

    /// Binds the parameter `key` to `context_type`.
    ///
    /// # Errors
    ///
    /// - [`Error::ForeignParameter`] if the signature doesn't declare `key`.
    /// - [`Error::AlreadyBound`] if the slot is already filled; the stored
    ///   value is kept.
    pub fn bind(
        &self,
        key: GenericParameterKey,
        context_type: Type,
    ) -> Result<(), Error> {
        let index = self.slot_index(key)?;
        let mut slot = self.context_types[index].write();

        if let Some(existing) = &*slot {
            return Err(Error::AlreadyBound {
                parameter: TypeParameter::canonical_with(key),
                existing: existing.clone(),
                new_type: context_type,
            });
        }

        debug!("binding {key} to {context_type}");
        *slot = Some(context_type);

        Ok(())
    }

    /// Gets the context type the parameter `key` is bound to. Never triggers
    /// a resolution, see [`Self::resolve`] for that.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ForeignParameter`] if the signature doesn't declare
    /// `key`.
    pub fn lookup(
        &self,
        key: GenericParameterKey,
    ) -> Result<Option<Type>, Error> {
        let index = self.slot_index(key)?;

        Ok(self.context_types[index].read().clone())
    }

    /// Gets the context type of the parameter `key`, materializing it with
    /// the resolver and storing it if the slot is empty.
    ///
    /// When several threads race to fill the same slot, the first writer
    /// wins and every caller gets the stored value.
    ///
    /// # Errors
    ///
    /// - [`Error::ForeignParameter`] if the signature doesn't declare `key`.
    /// - [`Error::MissingResolver`] if the slot is empty and there's no
    ///   resolver.
    /// - Any error of the resolver.
    pub fn resolve(&self, key: GenericParameterKey) -> Result<Type, Error> {
        let index = self.slot_index(key)?;

        if let Some(context_type) = &*self.context_types[index].read() {
            trace!("{key} is already bound to {context_type}");
            return Ok(context_type.clone());
        }

        let interface_type =
            Type::Parameter(TypeParameter::canonical_with(key));
        let materialized = self.materialize(&interface_type)?;

        let mut slot = self.context_types[index].write();

        Ok(slot.get_or_insert(materialized).clone())
    }

    /// Calls the resolver for `interface_type`, tracking the call on the
    /// current thread so that a resolver requesting its own key is reported
    /// instead of recursing forever.
    fn materialize(&self, interface_type: &Type) -> Result<Type, Error> {
        let Some(resolver) = self.resolver.as_deref() else {
            return Err(Error::MissingResolver {
                interface_type: interface_type.clone(),
            });
        };

        let current_thread_id = std::thread::current().id();

        {
            let mut in_progress = self.resolutions_in_progress.lock();
            let stack = in_progress
                .get(&current_thread_id)
                .map_or(&[][..], Vec::as_slice);
            let limit = self.config.resolution_depth_limit().get();

            if stack.contains(interface_type) {
                return Err(Error::CyclicResolution {
                    interface_type: interface_type.clone(),
                    in_progress: stack.to_vec(),
                });
            }

            if stack.len() >= limit {
                return Err(Error::ResolutionOverflow {
                    interface_type: interface_type.clone(),
                    limit,
                });
            }

            in_progress
                .entry(current_thread_id)
                .or_default()
                .push(interface_type.clone());
        }

        trace!("materializing {interface_type}");
        let result = resolver.materialize(interface_type, self);

        {
            let mut in_progress = self.resolutions_in_progress.lock();

            if let Some(stack) = in_progress.get_mut(&current_thread_id) {
                stack.pop();

                if stack.is_empty() {
                    in_progress.remove(&current_thread_id);
                }
            }
        }

        result
    }

    /// Gets the context type of a dependent member type whose base is
    /// already known to map to a context type, memoizing it.
    fn resolve_member(&self, interface_type: &Type) -> Result<Type, Error> {
        let interface_type = interface_type.canonical();

        if let Some(context_type) = self.member_types.get(&interface_type) {
            trace!("{interface_type} is already bound to {}", *context_type);
            return Ok(context_type.clone());
        }

        let materialized = self.materialize(&interface_type)?;

        Ok(self
            .member_types
            .entry(interface_type)
            .or_insert(materialized)
            .clone())
    }

    /// Records `scope` as the owner of the environment.
    ///
    /// If a different owner is already recorded, the owner becomes the
    /// nearest common ancestor of both, so the final owner doesn't depend on
    /// the order of the calls.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrelatedScopes`] if the two scopes don't share an
    /// ancestor.
    pub fn set_owning_scope(
        &self,
        scope: ScopeID,
        hierarchy: &(impl Hierarchy + ?Sized),
    ) -> Result<(), Error> {
        let mut owning_scope = self.owning_scope.write();

        let merged = match *owning_scope {
            None => scope,
            Some(current) if current == scope => return Ok(()),
            Some(current) => common_ancestor(hierarchy, current, scope)
                .ok_or(Error::UnrelatedScopes { current, scope })?,
        };

        debug!("owning scope of the environment is now {merged:?}");
        *owning_scope = Some(merged);

        Ok(())
    }
}

#[cfg(test)]
mod test;
