use std::{
    collections::BTreeSet,
    num::NonZeroUsize,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Barrier,
    },
};

use proptest::{prop_assert_eq, proptest};
use substc_arena::ID;
use substc_table::{ScopeID, ScopeKind, Table};
use substc_term::{
    generic_parameter::{GenericParameterKey, TypeParameter},
    generic_signature::GenericSignature,
    protocol::ProtocolID,
    r#type::{ContextType, Type},
};

use crate::{Archetypes, Config, Error, GenericEnvironment, Resolver as _};

pub(crate) const SEQUENCE: ProtocolID = ID::new(0);
pub(crate) const HASHABLE: ProtocolID = ID::new(1);

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn t() -> TypeParameter {
    TypeParameter::sugared(GenericParameterKey::new(0, 0), "T")
}

pub(crate) fn u() -> TypeParameter {
    TypeParameter::sugared(GenericParameterKey::new(0, 1), "U")
}

/// A context type displayed as `name` whose back-link is `interface_type`.
pub(crate) fn context(name: &str, interface_type: Type) -> Type {
    Type::Context(ContextType {
        name: name.to_owned(),
        interface_type: Box::new(interface_type),
        conforms_to: BTreeSet::new(),
    })
}

pub(crate) fn signature_of(
    parameters: Vec<TypeParameter>,
) -> GenericSignature {
    GenericSignature::new(parameters, []).unwrap()
}

/// `T` and `U` bound to the context types `Int` and `String`, no resolver.
pub(crate) fn scenario() -> GenericEnvironment {
    let environment = GenericEnvironment::new(
        Arc::new(signature_of(vec![t(), u()])),
        Config::default(),
    );

    environment
        .bind(t().key(), context("Int", Type::parameter(0, 0)))
        .unwrap();
    environment
        .bind(u().key(), context("String", Type::parameter(0, 1)))
        .unwrap();

    environment
}

#[test]
fn slot_count_follows_signature() {
    let environment = GenericEnvironment::new(
        Arc::new(signature_of(vec![t(), u()])),
        Config::default(),
    );

    assert_eq!(environment.lookup(t().key()), Ok(None));
    assert_eq!(environment.lookup(u().key()), Ok(None));
    assert_eq!(
        environment.lookup(GenericParameterKey::new(0, 2)),
        Err(Error::ForeignParameter(TypeParameter::canonical_with(
            GenericParameterKey::new(0, 2)
        )))
    );
}

#[test]
fn double_bind_is_rejected() {
    let environment = scenario();

    assert_eq!(
        environment.bind(t().key(), context("Bool", Type::parameter(0, 0))),
        Err(Error::AlreadyBound {
            parameter: t().canonical(),
            existing: context("Int", Type::parameter(0, 0)),
            new_type: context("Bool", Type::parameter(0, 0)),
        })
    );

    // the first binding survives
    assert_eq!(
        environment.lookup(t().key()),
        Ok(Some(context("Int", Type::parameter(0, 0))))
    );
}

#[test]
fn bind_foreign_parameter_is_rejected() {
    let environment = scenario();
    let foreign = GenericParameterKey::new(1, 0);

    assert_eq!(
        environment.bind(foreign, context("Int", Type::parameter(1, 0))),
        Err(Error::ForeignParameter(TypeParameter::canonical_with(foreign)))
    );
}

#[test]
fn resolve_without_resolver_is_fatal() {
    let environment = GenericEnvironment::new(
        Arc::new(signature_of(vec![t()])),
        Config::default(),
    );

    assert_eq!(
        environment.resolve(t().key()),
        Err(Error::MissingResolver { interface_type: Type::parameter(0, 0) })
    );
}

#[test]
fn lazy_resolution_is_memoized() {
    init_logger();

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let environment = GenericEnvironment::with_resolver(
        Arc::new(signature_of(vec![t()])),
        Arc::new(move |ty: &Type, environment: &GenericEnvironment| {
            counter.fetch_add(1, Ordering::SeqCst);
            Archetypes.materialize(ty, environment)
        }),
        Config::default(),
    );

    assert_eq!(environment.lookup(t().key()), Ok(None));

    let resolved = environment
        .map_type_into_context(&Type::Parameter(t()))
        .unwrap();

    assert_eq!(resolved, context("T", Type::parameter(0, 0)));
    assert_eq!(environment.lookup(t().key()), Ok(Some(resolved.clone())));
    assert_eq!(environment.lookup(t().key()), Ok(Some(resolved.clone())));
    assert_eq!(environment.resolve(t().key()), Ok(resolved));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn self_recursive_resolver_is_detected() {
    let environment = GenericEnvironment::with_resolver(
        Arc::new(signature_of(vec![t()])),
        Arc::new(|ty: &Type, environment: &GenericEnvironment| {
            environment.map_type_into_context(&Type::nominal("Array", vec![
                ty.clone(),
            ]))
        }),
        Config::default(),
    );

    let result = environment.map_type_into_context(&Type::Parameter(t()));

    assert!(matches!(
        result,
        Err(Error::CyclicResolution { interface_type, in_progress })
            if interface_type == Type::parameter(0, 0)
                && in_progress == vec![Type::parameter(0, 0)]
    ));

    // the failed attempt leaves nothing behind
    assert_eq!(environment.lookup(t().key()), Ok(None));
    assert!(environment.resolutions_in_progress.lock().is_empty());
}

#[test]
fn deep_resolution_overflows() {
    let parameters = (0..4)
        .map(|index| {
            TypeParameter::canonical_with(GenericParameterKey::new(0, index))
        })
        .collect::<Vec<_>>();

    // every parameter resolves through the next one
    let environment = GenericEnvironment::with_resolver(
        Arc::new(signature_of(parameters)),
        Arc::new(|ty: &Type, environment: &GenericEnvironment| {
            let key = ty.as_parameter().unwrap().key();

            if key.index == 3 {
                Archetypes.materialize(ty, environment)
            } else {
                environment
                    .map_type_into_context(&Type::parameter(0, key.index + 1))
            }
        }),
        Config::builder()
            .resolution_depth_limit(NonZeroUsize::new(2).unwrap())
            .build(),
    );

    assert_eq!(
        environment.resolve(GenericParameterKey::new(0, 0)),
        Err(Error::ResolutionOverflow {
            interface_type: Type::parameter(0, 2),
            limit: 2,
        })
    );
    assert!(environment.resolutions_in_progress.lock().is_empty());

    // starting deeper in the chain stays within the limit
    assert_eq!(
        environment.resolve(GenericParameterKey::new(0, 2)),
        Ok(context("τ_0_3", Type::parameter(0, 3)))
    );
}

#[test]
fn failed_resolution_leaves_no_stack_behind() {
    let environment = GenericEnvironment::with_resolver(
        Arc::new(signature_of(vec![t(), u()])),
        Arc::new(|ty: &Type, environment: &GenericEnvironment| {
            if ty == &Type::parameter(0, 0) {
                environment.map_type_into_context(&Type::parameter(0, 1))
            } else {
                Archetypes.materialize(ty, environment)
            }
        }),
        Config::builder().resolution_depth_limit(NonZeroUsize::MIN).build(),
    );

    assert_eq!(
        environment.resolve(t().key()),
        Err(Error::ResolutionOverflow {
            interface_type: Type::parameter(0, 1),
            limit: 1,
        })
    );
    assert!(environment.resolutions_in_progress.lock().is_empty());

    // a single level still fits
    assert_eq!(
        environment.resolve(u().key()).map(|ty| ty.to_string()),
        Ok("U".to_owned())
    );
    assert!(environment.resolutions_in_progress.lock().is_empty());
}

#[test]
fn concurrent_resolution_stores_one_value() {
    const THREADS: usize = 8;

    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let counter = calls.clone();
    let environment = Arc::new(GenericEnvironment::with_resolver(
        Arc::new(signature_of(vec![t()])),
        Arc::new(move |ty: &Type, _: &GenericEnvironment| -> Result<_, Error> {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            Ok(context(&format!("T{call}"), ty.clone()))
        }),
        Config::default(),
    ));

    let handles = (0..THREADS)
        .map(|_| {
            let environment = environment.clone();
            let barrier = barrier.clone();

            std::thread::spawn(move || {
                barrier.wait();
                environment.resolve(t().key()).unwrap()
            })
        })
        .collect::<Vec<_>>();

    let results = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect::<Vec<_>>();

    let stored = environment.lookup(t().key()).unwrap().unwrap();

    assert!(calls.load(Ordering::SeqCst) >= 1);
    assert!(results.iter().all(|result| result == &stored));
}

#[test]
fn sugared_parameter_of_canonical_form() {
    let environment = scenario();

    for parameter in [t(), u()] {
        assert_eq!(
            environment.sugared_parameter(&parameter.canonical()),
            Ok(&parameter)
        );
    }

    let foreign = TypeParameter::canonical_with(GenericParameterKey::new(0, 9));
    assert_eq!(
        environment.sugared_parameter(&foreign),
        Err(Error::MissingSugaredParameter(foreign))
    );
}

#[test]
fn sugared_type_keeps_structure() {
    let environment = scenario();
    let canonical = Type::nominal("Dictionary", vec![
        Type::parameter(0, 0).member("Element"),
        Type::parameter(0, 1),
    ]);

    let sugared = environment.sugared_type(&canonical).unwrap();

    assert_eq!(sugared.to_string(), "Dictionary<T.Element, U>");
    assert_eq!(sugared.canonical(), canonical);
}

/// ```text
/// core
/// ├── Array
/// │   ├── map
/// │   └── filter
/// └── Dictionary
/// ```
struct Scopes {
    table: Table,
    core: ScopeID,
    array: ScopeID,
    map: ScopeID,
    filter: ScopeID,
    dictionary: ScopeID,
}

fn scopes() -> Scopes {
    let mut table = Table::new();
    let core = table.add_root("core", ScopeKind::Module);
    let array = table.add_scope("Array", ScopeKind::Type, core).unwrap();
    let map = table.add_scope("map", ScopeKind::Function, array).unwrap();
    let filter =
        table.add_scope("filter", ScopeKind::Function, array).unwrap();
    let dictionary =
        table.add_scope("Dictionary", ScopeKind::Type, core).unwrap();

    Scopes { table, core, array, map, filter, dictionary }
}

#[test]
fn owning_scope_is_set_once_then_merged() {
    let Scopes { table, core, array, map, filter, dictionary } = scopes();
    let environment = scenario();

    assert_eq!(environment.owning_scope(), None);

    environment.set_owning_scope(map, &table).unwrap();
    environment.set_owning_scope(map, &table).unwrap();
    assert_eq!(environment.owning_scope(), Some(map));

    environment.set_owning_scope(filter, &table).unwrap();
    assert_eq!(environment.owning_scope(), Some(array));

    environment.set_owning_scope(dictionary, &table).unwrap();
    assert_eq!(environment.owning_scope(), Some(core));
}

#[test]
fn unrelated_scopes_are_rejected() {
    let Scopes { mut table, map, .. } = scopes();
    let other = table.add_root("std", ScopeKind::Module);

    let environment = scenario();
    environment.set_owning_scope(map, &table).unwrap();

    assert_eq!(
        environment.set_owning_scope(other, &table),
        Err(Error::UnrelatedScopes { current: map, scope: other })
    );
    assert_eq!(environment.owning_scope(), Some(map));
}

proptest! {
    #[test]
    fn owning_scope_merge_is_order_independent(
        first in 0..5usize,
        second in 0..5usize,
    ) {
        let Scopes { table, core, array, map, filter, dictionary } = scopes();
        let all = [core, array, map, filter, dictionary];
        let (first, second) = (all[first], all[second]);

        let forward = scenario();
        forward.set_owning_scope(first, &table).unwrap();
        forward.set_owning_scope(second, &table).unwrap();

        let backward = scenario();
        backward.set_owning_scope(second, &table).unwrap();
        backward.set_owning_scope(first, &table).unwrap();

        prop_assert_eq!(forward.owning_scope(), backward.owning_scope());
        prop_assert_eq!(
            forward.owning_scope(),
            substc_table::common_ancestor(&table, first, second)
        );
    }
}
