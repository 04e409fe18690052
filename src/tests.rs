use super::*;
use frontend::{NominalDecl, TraitDecl};
use insta::assert_snapshot as snap;
use pretty_assertions::assert_eq;
use smallvec::smallvec;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TestTypeData;

impl TypeData for TestTypeData {
    type Nominal = &'static str;
    type Generic = &'static str;
    type Trait = &'static str;
    type Association = &'static str;
    type Value = &'static str;
    type Context = &'static str;
}

type Ctx = Context<TestTypeData>;
type Table = ConformanceTable<TestTypeData>;

macro_rules! forall {
    () => { Generics::new() };
    ($($gid:literal $(: $($trid:literal)+)?),*) => {{
        let mut forall: Generics<TestTypeData> = Generics::new();
        $(
            #[allow(unused_assignments)]
            #[allow(unused_mut)]
            let mut constrs = vec![];
            $(
                constrs = vec![$($trid),+];
            )?
            forall.insert_with_con($gid, constrs);
        )*
        forall
    }};
}

fn declarations() -> Declarations<TestTypeData> {
    let mut decls = Declarations::new();

    let mut equatable = TraitDecl::new("Equatable");
    equatable.push_requirement("==");
    decls.declare_trait(equatable);

    let mut hashable = TraitDecl::new("Hashable");
    hashable.push_inherited("Equatable");
    hashable.push_requirement("hash");
    decls.declare_trait(hashable);

    let mut container = TraitDecl::new("Container");
    container.push_associated("Item", "Container.Item", vec!["Hashable"]);
    container.push_associated("Index", "Container.Index", vec![]);
    container.push_requirement("count");
    container.push_requirement("isEmpty");
    decls.declare_trait(container);

    decls.declare_nominal(NominalDecl::new("Int", forall!()));
    decls.declare_nominal(NominalDecl::new("String", forall!()));
    decls.declare_nominal(NominalDecl::new("Set", forall!("E": "Hashable")));
    decls.declare_nominal(NominalDecl::new("Pair", forall!("A": "Hashable", "B")));
    decls.declare_nominal(NominalDecl::new("Outer", forall!("U")));
    decls.declare_nominal(NominalDecl::new("Inner", forall!()));
    decls.declare_nominal(NominalDecl::new("Innermost", forall!()));
    decls.declare_nominal(NominalDecl::new("Base", forall!()));
    decls.declare_nominal(NominalDecl::new("Derived", forall!()));

    decls
}

fn equatable(ctx: &mut Ctx, type_: TypeId, witness: &'static str) -> ConformanceId {
    let id = ctx.normal_conformance("Equatable", type_, "main");
    ctx.set_witness(id, "==", WitnessRef::new(witness));
    ctx.complete(id);
    id
}

struct Fixture {
    ctx: Ctx,
    table: Table,

    int: TypeId,
    string: TypeId,
    set_int: TypeId,

    int_hashable: ConformanceId,
    set_container: ConformanceId,
}

/// `Int: Equatable` (#0), `Int: Hashable` (#1), `Set<E>: Container` (#2)
fn fixture() -> Fixture {
    let mut ctx = Context::with_declarations(declarations());
    let mut table = Table::new();

    let int = ctx.types.nominal("Int", &[]);
    let string = ctx.types.nominal("String", &[]);

    let int_equatable = equatable(&mut ctx, int, "Int.==");

    let int_hashable = ctx.normal_conformance("Hashable", int, "main");
    ctx.set_witness(int_hashable, "hash", WitnessRef::new("Int.hash"));
    ctx.set_inherited_conformance(int_hashable, "Equatable", int_equatable);
    ctx.complete(int_hashable);

    let e = ctx.types.archetype("E");
    let set_e = ctx.types.nominal("Set", &[e]);
    let set_container = ctx.normal_conformance("Container", set_e, "Set");
    ctx.set_type_witness(
        set_container,
        "Item",
        Substitution::new("Container.Item", e, smallvec![ConformanceRef::Abstract]),
    );
    ctx.set_type_witness(
        set_container,
        "Index",
        Substitution::new("Container.Index", int, smallvec![]),
    );
    ctx.set_witness(set_container, "count", WitnessRef::new("Set.count"));
    ctx.set_witness(set_container, "isEmpty", WitnessRef::new("Container.isEmpty"));
    ctx.add_default_definition(set_container, "isEmpty");
    ctx.complete(set_container);

    for id in &[int_equatable, int_hashable, set_container] {
        table.implement(&ctx, *id);
    }

    let set_int = ctx.types.nominal("Set", &[int]);

    Fixture {
        ctx,
        table,
        int,
        string,
        set_int,
        int_hashable,
        set_container,
    }
}

impl Fixture {
    fn set_int_container(&mut self) -> ConformanceId {
        match self
            .table
            .lookup_conformance(&mut self.ctx, self.set_int, &"Container")
        {
            Some(ConformanceRef::Concrete(id)) => id,
            other => panic!("Set<Int> should conform to Container, got {:?}", other),
        }
    }
}

struct NoConformances;

impl ConformanceOracle<TestTypeData> for NoConformances {
    fn lookup_conformance(
        &mut self,
        _: &mut Ctx,
        _: TypeId,
        _: &&'static str,
    ) -> Option<ConformanceRef> {
        None
    }
}

#[test]
fn equatable_int_scenario() {
    let mut ctx = Context::with_declarations(declarations());
    let int = ctx.types.nominal("Int", &[]);

    let id = ctx.normal_conformance("Equatable", int, "main");
    assert_eq!(ctx.state(id), ConformanceState::Incomplete);

    ctx.set_witness(id, "==", WitnessRef::new("Int.=="));
    ctx.complete(id);

    assert_eq!(ctx.state(id), ConformanceState::Complete);
    assert_eq!(ctx.witness(id, &"=="), &WitnessRef::new("Int.=="));
    assert_eq!(
        ctx.try_set_witness(id, "==", WitnessRef::new("Int.other")),
        Err(WitnessError::WitnessAlreadySet("=="))
    );
}

#[test]
#[should_panic(expected = "witness for == already known")]
fn set_witness_twice() {
    let mut ctx = Context::with_declarations(declarations());
    let int = ctx.types.nominal("Int", &[]);
    let id = ctx.normal_conformance("Equatable", int, "main");
    ctx.set_witness(id, "==", WitnessRef::new("Int.=="));
    ctx.set_witness(id, "==", WitnessRef::new("Int.=="));
}

#[test]
#[should_panic(expected = "type witness for Index already known")]
fn set_type_witness_twice() {
    let mut ctx = Context::with_declarations(declarations());
    let int = ctx.types.nominal("Int", &[]);
    let id = ctx.normal_conformance("Container", int, "main");
    ctx.set_type_witness(id, "Index", Substitution::new("Container.Index", int, smallvec![]));
    ctx.set_type_witness(id, "Index", Substitution::new("Container.Index", int, smallvec![]));
}

#[test]
#[should_panic(expected = "conformance to Equatable already complete")]
fn set_witness_after_complete() {
    let mut ctx = Context::with_declarations(declarations());
    let string = ctx.types.nominal("String", &[]);
    let id = ctx.normal_conformance("Equatable", string, "main");
    ctx.complete(id);
    ctx.set_witness(id, "==", WitnessRef::new("String.=="));
}

#[test]
fn setters_after_complete() {
    let mut fx = fixture();
    let id = fx.ctx.normal_conformance("Container", fx.string, "main");
    fx.ctx.complete(id);

    assert_eq!(
        fx.ctx.try_set_type_witness(
            id,
            "Index",
            Substitution::new("Container.Index", fx.string, smallvec![])
        ),
        Err(WitnessError::AlreadyComplete("Container"))
    );
    assert_eq!(
        fx.ctx.try_set_witness(id, "count", WitnessRef::new("String.count")),
        Err(WitnessError::AlreadyComplete("Container"))
    );
    assert_eq!(
        fx.ctx.try_set_witness(id, "==", WitnessRef::new("String.==")),
        Err(WitnessError::RequirementInWrongTrait {
            requirement: "==",
            owner: "Equatable",
            expected: "Container",
        })
    );

    // frozen tables still answer queries
    let index = fx.ctx.type_witness(&mut fx.table, fx.set_container, &"Index");
    assert_eq!(fx.ctx.substitution(index).replacement, fx.int);
    assert_eq!(
        fx.ctx.try_witness(fx.set_container, &"count"),
        Some(&WitnessRef::new("Set.count"))
    );
}

#[test]
#[should_panic(expected = "already complete")]
fn complete_twice() {
    let mut ctx = Context::with_declarations(declarations());
    let int = ctx.types.nominal("Int", &[]);
    let id = ctx.normal_conformance("Equatable", int, "main");
    ctx.complete(id);
    ctx.complete(id);
}

#[test]
fn inherited_conformance_after_complete() {
    let mut fx = fixture();
    let string_eq = equatable(&mut fx.ctx, fx.string, "String.==");
    let id = fx.ctx.normal_conformance("Hashable", fx.string, "main");
    fx.ctx.complete(id);

    assert_eq!(
        fx.ctx.try_set_inherited_conformance(id, "Equatable", string_eq),
        Err(WitnessError::AlreadyComplete("Hashable"))
    );
    assert!(fx.ctx.inherited_conformances(id).is_empty());
}

#[test]
#[should_panic(expected = "conformance to Container already complete")]
fn default_definition_after_complete() {
    let mut fx = fixture();
    fx.ctx.add_default_definition(fx.set_container, "count");
}

#[test]
fn type_witness_over_wrong_archetype() {
    let mut fx = fixture();
    let e = fx.ctx.types.archetype("E");
    let id = fx.ctx.normal_conformance("Container", fx.string, "main");

    assert_eq!(
        fx.ctx.try_set_type_witness(
            id,
            "Item",
            Substitution::new("Container.Index", e, smallvec![ConformanceRef::Abstract])
        ),
        Err(WitnessError::ArchetypeMismatch {
            assoc: "Item",
            expected: "Container.Item",
            found: "Container.Index",
        })
    );
    assert_eq!(
        fx.ctx.try_type_witness(&mut fx.table, id, &"Item"),
        Err(SpecializationError::MissingWitness("Item"))
    );
}

#[test]
#[should_panic(expected = "stated over Container.Index, expected Container.Item")]
fn type_witness_over_wrong_archetype_panics() {
    let mut ctx = Context::with_declarations(declarations());
    let int = ctx.types.nominal("Int", &[]);
    let id = ctx.normal_conformance("Container", int, "main");
    ctx.set_type_witness(id, "Item", Substitution::new("Container.Index", int, smallvec![]));
}

#[test]
#[should_panic(expected = "associated type Item belongs to Container, not Equatable")]
fn type_witness_in_wrong_trait() {
    let mut ctx = Context::with_declarations(declarations());
    let int = ctx.types.nominal("Int", &[]);
    let id = ctx.normal_conformance("Equatable", int, "main");
    ctx.set_type_witness(id, "Item", Substitution::new("Container.Item", int, smallvec![]));
}

#[test]
fn witness_preconditions() {
    let mut fx = fixture();
    let int = fx.int;
    let id = fx.ctx.normal_conformance("Equatable", fx.string, "main");

    assert_eq!(
        fx.ctx.try_set_witness(id, "len", WitnessRef::new("String.len")),
        Err(WitnessError::UndeclaredRequirement("len"))
    );
    assert_eq!(
        fx.ctx
            .try_set_type_witness(id, "Count", Substitution::new("Count", int, smallvec![])),
        Err(WitnessError::UndeclaredAssociation("Count"))
    );
    assert_eq!(
        fx.ctx.try_set_inherited_conformance(id, "Hashable", fx.int_hashable),
        Err(WitnessError::NotInherited {
            inherited: "Hashable",
            trait_: "Equatable",
        })
    );

    let spec = fx.set_int_container();
    assert_eq!(
        fx.ctx.try_set_witness(spec, "count", WitnessRef::new("count")),
        Err(WitnessError::NotNormal("specialized"))
    );
}

#[test]
fn inherited_conformances_and_defaults() {
    let mut fx = fixture();

    let inherited = fx.ctx.inherited_conformances(fx.int_hashable);
    assert_eq!(inherited.len(), 1);
    assert_eq!(
        fx.ctx.witness(inherited[&"Equatable"], &"=="),
        &WitnessRef::new("Int.==")
    );

    assert!(fx.ctx.uses_default_definition(fx.set_container, &"isEmpty"));
    assert!(!fx.ctx.uses_default_definition(fx.set_container, &"count"));

    let spec = fx.set_int_container();
    assert!(fx.ctx.uses_default_definition(spec, &"isEmpty"));
    assert!(fx.ctx.inherited_conformances(spec).is_empty());
}

#[test]
fn normal_dispatch() {
    let fx = fixture();
    let ctx = &fx.ctx;
    let id = fx.set_container;

    assert_eq!(ctx.kind(id), ConformanceKind::Normal);
    assert_eq!(ctx.protocol(id), &"Container");
    assert_eq!(ctx.decl_context(id), &"Set");
    assert_eq!(ctx.state(id), ConformanceState::Complete);
    snap!(ctx.types.display(ctx.conforming_type(id)).to_string(), @"Set<E>");
}

#[test]
fn specialized_dispatch() {
    let mut fx = fixture();
    let spec = fx.set_int_container();
    let ctx = &fx.ctx;

    assert_eq!(ctx.kind(spec), ConformanceKind::Specialized);
    assert_eq!(ctx.protocol(spec), &"Container");
    assert_eq!(ctx.decl_context(spec), &"Set");
    assert_eq!(ctx.state(spec), ConformanceState::Complete);
    assert_eq!(ctx.conforming_type(spec), fx.set_int);
    assert!(ctx.generic_params(spec).is_none());

    // value witnesses are handed out unsubstituted
    assert!(std::ptr::eq(
        ctx.witness(spec, &"count"),
        ctx.witness(fx.set_container, &"count")
    ));
}

#[test]
fn specialized_state_follows_generic() {
    let mut ctx = Context::with_declarations(declarations());
    let int = ctx.types.nominal("Int", &[]);
    let e = ctx.types.archetype("E");
    let set_e = ctx.types.nominal("Set", &[e]);
    let set_int = ctx.types.nominal("Set", &[int]);

    let generic = ctx.normal_conformance("Container", set_e, "Set");
    let spec = ctx.specialize(
        generic,
        set_int,
        vec![Substitution::new("E", int, smallvec![])],
    );

    assert_eq!(ctx.state(spec), ConformanceState::Incomplete);
    ctx.complete(generic);
    assert_eq!(ctx.state(spec), ConformanceState::Complete);
}

#[test]
fn inherited_dispatch() {
    let mut fx = fixture();
    let base = fx.ctx.types.nominal("Base", &[]);
    let derived = fx.ctx.types.nominal("Derived", &[]);

    let base_eq = equatable(&mut fx.ctx, base, "Base.==");
    let derived_eq = fx.ctx.inherit(base_eq, derived);
    let ctx = &fx.ctx;

    assert_eq!(ctx.kind(derived_eq), ConformanceKind::Inherited);
    assert_eq!(ctx.protocol(derived_eq), &"Equatable");
    assert_eq!(ctx.decl_context(derived_eq), &"main");
    assert_eq!(ctx.state(derived_eq), ConformanceState::Complete);
    assert_eq!(ctx.conforming_type(derived_eq), derived);
    assert_eq!(ctx.conforming_type(base_eq), base);
    assert_eq!(ctx.witness(derived_eq, &"=="), &WitnessRef::new("Base.=="));
    assert!(ctx.generic_params(derived_eq).is_none());
}

#[test]
fn inherited_type_witness() {
    let mut fx = fixture();
    let e = fx.ctx.types.archetype("E");
    let derived = fx.ctx.types.nominal("Derived", &[]);
    let inherited = fx.ctx.inherit(fx.set_container, derived);

    let sid = fx.ctx.type_witness(&mut fx.table, inherited, &"Item");
    assert_eq!(sid, fx.ctx.type_witness(&mut fx.table, fx.set_container, &"Item"));
    assert_eq!(fx.ctx.substitution(sid).replacement, e);
}

#[test]
fn specialization_is_memoized() {
    let mut fx = fixture();
    let spec = fx.set_int_container();

    let first = fx.ctx.type_witness(&mut fx.table, spec, &"Item");
    let allocated = fx.ctx.substitutions.len();
    let second = fx.ctx.type_witness(&mut fx.table, spec, &"Item");

    assert_eq!(first, second);
    assert_eq!(allocated, fx.ctx.substitutions.len());
}

#[test]
fn unchanged_witness_is_reused() {
    let mut fx = fixture();
    let spec = fx.set_int_container();

    let generic = fx.ctx.type_witness(&mut fx.table, fx.set_container, &"Index");
    let specialized = fx.ctx.type_witness(&mut fx.table, spec, &"Index");

    assert_eq!(generic, specialized);
}

#[test]
fn nested_conformances_are_derived() {
    let mut fx = fixture();
    let spec = fx.set_int_container();

    let sid = fx.ctx.type_witness(&mut fx.table, spec, &"Item");
    let generic = fx.ctx.type_witness(&mut fx.table, fx.set_container, &"Item");
    assert_ne!(sid, generic);

    let sub = fx.ctx.substitution(sid);
    assert_eq!(
        sub,
        &Substitution::new(
            "Container.Item",
            fx.int,
            smallvec![ConformanceRef::Concrete(fx.int_hashable)]
        )
    );
    snap!(sub.display(&fx.ctx.types).to_string(), @"Container.Item := Int [#1]");
}

#[test]
fn strict_substitution_failure() {
    let mut fx = fixture();
    let broken = fx.ctx.specialize(fx.set_container, fx.set_int, vec![]);

    assert_eq!(
        fx.ctx.try_type_witness(&mut fx.table, broken, &"Item"),
        Err(SpecializationError::Subst(SubstError::Unbound("E")))
    );

    // witnesses not mentioning the parameter are unaffected
    let generic = fx.ctx.type_witness(&mut fx.table, fx.set_container, &"Index");
    assert_eq!(
        fx.ctx.try_type_witness(&mut fx.table, broken, &"Index"),
        Ok(generic)
    );
}

#[test]
#[should_panic(expected = "archetype E has no substitution")]
fn strict_substitution_panics() {
    let mut fx = fixture();
    let broken = fx.ctx.specialize(fx.set_container, fx.set_int, vec![]);
    fx.ctx.type_witness(&mut fx.table, broken, &"Item");
}

#[test]
#[should_panic(expected = "improperly checked substitution: String does not conform to Hashable")]
fn unchecked_substitution_panics() {
    let mut fx = fixture();
    let set_string = fx.ctx.types.nominal("Set", &[fx.string]);
    let spec = fx.ctx.specialize(
        fx.set_container,
        set_string,
        vec![Substitution::new("E", fx.string, smallvec![])],
    );
    fx.ctx.type_witness(&mut fx.table, spec, &"Item");
}

#[test]
fn rejected_lookup_is_reported() {
    let mut fx = fixture();
    let spec = fx.ctx.specialize(
        fx.set_container,
        fx.set_int,
        vec![Substitution::new(
            "E",
            fx.int,
            smallvec![ConformanceRef::Concrete(fx.int_hashable)],
        )],
    );

    assert_eq!(
        fx.ctx.try_type_witness(&mut NoConformances, spec, &"Item"),
        Err(SpecializationError::NotConforming {
            type_: "Int".to_string(),
            trait_: "Hashable",
        })
    );
}

#[test]
fn undeclared_archetype_is_reported() {
    let mut fx = fixture();
    let spec = fx.set_int_container();

    // witnesses recorded against declarations that are no longer in scope
    fx.ctx.decls = Declarations::new();

    assert_eq!(
        fx.ctx.try_type_witness(&mut fx.table, spec, &"Item"),
        Err(SpecializationError::UndeclaredArchetype("Container.Item"))
    );
}

#[test]
fn missing_normal_witness() {
    let mut fx = fixture();
    let id = fx.ctx.normal_conformance("Container", fx.string, "main");

    assert_eq!(
        fx.ctx.try_type_witness(&mut fx.table, id, &"Item"),
        Err(SpecializationError::MissingWitness("Item"))
    );
    assert_eq!(fx.ctx.try_witness(id, &"count"), None);
}

#[test]
fn layered_specialization() {
    let mut fx = fixture();
    let int = fx.int;
    let a = fx.ctx.types.archetype("A");
    let b = fx.ctx.types.archetype("B");
    let pair_ab = fx.ctx.types.nominal("Pair", &[a, b]);
    let pair_a_int = fx.ctx.types.nominal("Pair", &[a, int]);
    let pair_int_int = fx.ctx.types.nominal("Pair", &[int, int]);

    let pair = fx.ctx.normal_conformance("Container", pair_ab, "Pair");
    fx.ctx.set_type_witness(
        pair,
        "Item",
        Substitution::new("Container.Item", a, smallvec![ConformanceRef::Abstract]),
    );
    fx.ctx
        .set_type_witness(pair, "Index", Substitution::new("Container.Index", b, smallvec![]));
    fx.ctx.complete(pair);

    let partial = fx.ctx.specialize(
        pair,
        pair_a_int,
        vec![
            Substitution::new("A", a, smallvec![ConformanceRef::Abstract]),
            Substitution::new("B", int, smallvec![]),
        ],
    );
    let full = fx.ctx.specialize(
        partial,
        pair_int_int,
        vec![Substitution::new(
            "A",
            int,
            smallvec![ConformanceRef::Concrete(fx.int_hashable)],
        )],
    );

    let item = fx.ctx.type_witness(&mut fx.table, full, &"Item");
    assert_eq!(fx.ctx.substitution(item).replacement, int);
    assert_eq!(
        fx.ctx.type_witness(&mut fx.table, partial, &"Item"),
        fx.ctx.type_witness(&mut fx.table, pair, &"Item"),
    );

    let index = fx.ctx.type_witness(&mut fx.table, full, &"Index");
    assert_eq!(index, fx.ctx.type_witness(&mut fx.table, partial, &"Index"));
    assert_ne!(index, fx.ctx.type_witness(&mut fx.table, pair, &"Index"));
    assert_eq!(fx.ctx.substitution(index).replacement, int);
}

#[test]
fn generic_params_walk_enclosing_types() {
    let mut ctx = Context::with_declarations(declarations());
    let u = ctx.types.archetype("U");
    let outer = ctx.types.nominal("Outer", &[u]);
    let inner = ctx.types.nested(outer, "Inner", &[]);
    let innermost = ctx.types.nested(inner, "Innermost", &[]);

    snap!(ctx.types.display(innermost).to_string(), @"Outer<U>.Inner.Innermost");

    let id = equatable(&mut ctx, innermost, "Innermost.==");
    let params = ctx.generic_params(id).expect("Outer's parameters");
    assert_eq!(params.gids().cloned().collect::<Vec<_>>(), vec!["U"]);
}

#[test]
fn generic_params_of_plain_types() {
    let fx = fixture();
    assert!(fx.ctx.generic_params(fx.int_hashable).is_none());

    let params = fx.ctx.generic_params(fx.set_container).expect("Set's parameters");
    snap!(params.to_string(), @"E: Hashable");
}

#[test]
fn lookup_specializes_once() {
    let mut fx = fixture();
    let before = fx.ctx.conformance_count();

    let first = fx.set_int_container();
    let second = fx.set_int_container();

    assert_eq!(first, second);
    assert_eq!(before + 1, fx.ctx.conformance_count());

    match fx.ctx.conformance(first) {
        Conformance::Specialized(spec) => {
            assert_eq!(spec.generic_conformance(), fx.set_container);
            assert_eq!(
                spec.substitutions(),
                &[Substitution::new(
                    "E",
                    fx.int,
                    smallvec![ConformanceRef::Concrete(fx.int_hashable)]
                )]
            );
        }
        other => panic!("expected a specialized conformance, got {:?}", other.kind()),
    }

    assert!(format!("{}", fx.ctx).contains("Set<Int>: Container"));
}

#[test]
fn lookup_rejects_unconforming_arguments() {
    let mut fx = fixture();
    let set_string = fx.ctx.types.nominal("Set", &[fx.string]);

    assert_eq!(
        fx.table
            .lookup_conformance(&mut fx.ctx, set_string, &"Container"),
        None
    );
    assert_eq!(
        fx.table.lookup_conformance(&mut fx.ctx, fx.int, &"Container"),
        None
    );
}

#[test]
fn lookup_archetypes() {
    let mut fx = fixture();
    let e = fx.ctx.types.archetype("E");
    let u = fx.ctx.types.archetype("U");

    assert_eq!(
        fx.table.lookup_conformance(&mut fx.ctx, e, &"Equatable"),
        Some(ConformanceRef::Abstract)
    );
    assert_eq!(
        fx.table.lookup_conformance(&mut fx.ctx, u, &"Equatable"),
        None
    );
}

#[test]
fn mapping_apply() {
    let mut fx = fixture();
    let int = fx.int;
    let u = fx.ctx.types.archetype("U");
    let outer = fx.ctx.types.nominal("Outer", &[u]);
    let inner = fx.ctx.types.nested(outer, "Inner", &[]);

    let mut mapping = Mapping::default();
    assert_eq!(mapping.apply(&mut fx.ctx.types, inner, false), Ok(inner));
    assert_eq!(
        mapping.apply(&mut fx.ctx.types, inner, true),
        Err(SubstError::Unbound("U"))
    );

    mapping.assign("U", int);
    let applied = mapping.apply(&mut fx.ctx.types, inner, true).unwrap();
    snap!(fx.ctx.types.display(applied).to_string(), @"Outer<Int>.Inner");
    assert!(!fx.ctx.types.has_archetypes(applied));
    assert!(fx.ctx.types.has_archetypes(inner));
    assert_eq!(applied, mapping.apply(&mut fx.ctx.types, inner, true).unwrap());
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn populated_context_is_shared_for_reads() {
    assert_send_sync::<Ctx>();
    assert_send_sync::<Table>();

    let mut fx = fixture();
    let spec = fx.set_int_container();
    let ctx = std::sync::Arc::new(fx.ctx);

    let readers = (0..4)
        .map(|_| {
            let ctx = std::sync::Arc::clone(&ctx);
            std::thread::spawn(move || {
                (
                    *ctx.protocol(spec),
                    ctx.witness(spec, &"count").decl,
                    ctx.state(spec),
                )
            })
        })
        .collect::<Vec<_>>();

    for reader in readers {
        assert_eq!(
            reader.join().unwrap(),
            ("Container", "Set.count", ConformanceState::Complete)
        );
    }
}
