use std::{collections::BTreeSet, sync::Arc};

use proptest::{
    collection::vec,
    prelude::{Just, Strategy},
    prop_assert, prop_assert_eq, prop_oneof, proptest,
};
use substc_term::{
    generic_parameter::{GenericParameterKey, TypeParameter},
    generic_signature::GenericSignature,
    r#type::{ContextType, FunctionSignature, Tuple, Type},
    requirement::Requirement,
};

use crate::{
    map_type_into_context, map_type_out_of_context,
    test::{context, init_logger, scenario, t, u, HASHABLE, SEQUENCE},
    Archetypes, Config, Error, GenericEnvironment,
};

fn int() -> Type { context("Int", Type::parameter(0, 0)) }

fn string() -> Type { context("String", Type::parameter(0, 1)) }

fn array(element: Type) -> Type { Type::nominal("Array", vec![element]) }

/// `<T: Sequence, U> where T.Element: Hashable`, resolved on demand.
fn resolving() -> GenericEnvironment {
    let signature = GenericSignature::new(vec![t(), u()], [
        Requirement::conformance(Type::Parameter(t()), SEQUENCE),
        Requirement::conformance(
            Type::Parameter(t()).member("Element"),
            HASHABLE,
        ),
    ])
    .unwrap();

    GenericEnvironment::with_resolver(
        Arc::new(signature),
        Arc::new(Archetypes),
        Config::default(),
    )
}

fn composite(
    leaf: impl Strategy<Value = Type> + 'static,
) -> impl Strategy<Value = Type> {
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(array),
            vec(inner.clone(), 0..3)
                .prop_map(|elements| Type::Tuple(Tuple { elements })),
            (vec(inner.clone(), 0..3), inner).prop_map(
                |(parameters, return_type)| {
                    Type::FunctionSignature(FunctionSignature {
                        parameters,
                        return_type: Box::new(return_type),
                    })
                }
            ),
        ]
    })
}

fn interface_type() -> impl Strategy<Value = Type> {
    composite(prop_oneof![
        Just(Type::parameter(0, 0)),
        Just(Type::parameter(0, 1)),
        Just(Type::nominal("Bool", Vec::new())),
    ])
}

fn contextual_type() -> impl Strategy<Value = Type> {
    composite(prop_oneof![
        Just(int()),
        Just(string()),
        Just(Type::nominal("Bool", Vec::new())),
    ])
}

fn dependent_interface_type() -> impl Strategy<Value = Type> {
    composite(prop_oneof![
        Just(Type::parameter(0, 0)),
        Just(Type::parameter(0, 1)),
        Just(Type::parameter(0, 0).member("Element")),
        Just(Type::parameter(0, 1).member("Index").member("Distance")),
    ])
}

#[test]
fn scenario_maps_both_ways() {
    init_logger();
    let environment = scenario();

    let contextual = environment
        .map_type_into_context(&array(Type::Parameter(t())))
        .unwrap();
    assert_eq!(contextual, array(int()));
    assert_eq!(contextual.to_string(), "Array<Int>");

    let interface = environment.map_type_out_of_context(&contextual).unwrap();
    assert_eq!(interface, array(Type::parameter(0, 0)));
    assert_eq!(
        environment.sugared_type(&interface).unwrap().to_string(),
        "Array<T>"
    );
}

#[test]
fn member_type_without_resolver_becomes_error() {
    let environment = scenario();
    let element = Type::Parameter(t()).member("Element");

    let contextual = environment
        .map_type_into_context(&Type::nominal("Pair", vec![
            element.clone(),
            Type::Parameter(u()),
        ]))
        .unwrap();

    assert_eq!(
        contextual,
        Type::nominal("Pair", vec![Type::error_for(element), string()])
    );
    assert!(contextual.has_error());
}

#[test]
fn member_type_is_materialized_and_memoized() {
    let environment = resolving();
    let element = Type::Parameter(t()).member("Element");

    let first = environment.map_type_into_context(&element).unwrap();

    assert_eq!(
        first,
        Type::Context(ContextType {
            name: "T.Element".to_owned(),
            interface_type: Box::new(Type::parameter(0, 0).member("Element")),
            conforms_to: BTreeSet::from([HASHABLE]),
        })
    );
    assert_eq!(environment.map_type_into_context(&element), Ok(first));
    assert_eq!(environment.member_types.len(), 1);

    // the base was resolved along the way
    assert_eq!(
        environment.lookup(t().key()).unwrap().map(|ty| ty.to_string()),
        Some("T".to_owned())
    );
}

#[test]
fn foreign_parameter_is_left_as_is() {
    let environment = scenario();
    let foreign = Type::nominal("Array", vec![
        Type::parameter(1, 0),
        Type::parameter(1, 0).member("Element"),
    ]);

    assert_eq!(environment.map_type_into_context(&foreign), Ok(foreign));
}

#[test]
fn foreign_single_parameter_becomes_error() {
    let environment = scenario();
    let foreign = TypeParameter::canonical_with(GenericParameterKey::new(1, 0));

    assert_eq!(
        environment.map_parameter_into_context(&foreign),
        Ok(Type::error_for(Type::Parameter(foreign)))
    );
    assert_eq!(environment.map_parameter_into_context(&u()), Ok(string()));
}

#[test]
fn contextual_input_is_rejected() {
    let environment = scenario();
    let mixed = Type::nominal("Pair", vec![int(), Type::Parameter(u())]);

    assert_eq!(
        environment.map_type_into_context(&mixed),
        Err(Error::AlreadyContextual(mixed.clone()))
    );
    assert_eq!(
        environment.map_type_out_of_context(&mixed),
        Err(Error::AlreadyInterface(mixed.clone()))
    );
    assert_eq!(
        map_type_into_context(None, &mixed),
        Err(Error::AlreadyContextual(mixed))
    );
}

#[test]
fn dangling_back_link_is_incomplete() {
    let environment = scenario();
    let nested = context("Outer", int());

    assert!(matches!(
        environment.map_type_out_of_context(&nested),
        Err(Error::IncompleteSubstitution(_))
    ));
}

#[test]
fn absent_environment_substitutes_errors() {
    let element = Type::Parameter(t()).member("Element");
    let ty = Type::nominal("Pair", vec![
        element.clone(),
        Type::nominal("Bool", Vec::new()),
    ]);

    assert_eq!(
        map_type_into_context(None, &ty),
        Ok(Type::nominal("Pair", vec![
            Type::error_for(element),
            Type::nominal("Bool", Vec::new()),
        ]))
    );

    // contextual input has nothing dependent to replace
    assert_eq!(map_type_out_of_context(None, &array(int())), Ok(array(int())));

    let interface = array(Type::Parameter(t()));
    assert_eq!(
        map_type_out_of_context(None, &interface),
        Err(Error::AlreadyInterface(interface))
    );
}

proptest! {
    #[test]
    fn out_of_context_undoes_into_context(ty in interface_type()) {
        let environment = scenario();

        let contextual =
            map_type_into_context(Some(&environment), &ty).unwrap();

        prop_assert_eq!(
            map_type_out_of_context(Some(&environment), &contextual).unwrap(),
            ty
        );
    }

    #[test]
    fn into_context_undoes_out_of_context(ty in contextual_type()) {
        let environment = scenario();

        let interface = environment.map_type_out_of_context(&ty).unwrap();

        prop_assert_eq!(
            environment.map_type_into_context(&interface).unwrap(),
            ty
        );
    }

    #[test]
    fn resolved_members_round_trip(ty in dependent_interface_type()) {
        let environment = resolving();

        let contextual = environment.map_type_into_context(&ty).unwrap();
        prop_assert!(!contextual.has_parameter());

        prop_assert_eq!(
            environment.map_type_out_of_context(&contextual).unwrap(),
            ty
        );
    }
}
