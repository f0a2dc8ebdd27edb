use proptest::prelude::*;

use rios_expr::{
    CalculationScope, FUNCTIONS, calculation_to_target, expression_to_source, trigger_to_source,
    trigger_to_target,
};

fn squash(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn source_expression() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        "[a-z][a-z0-9]{0,5}".prop_map(|name| format!("[{name}]")),
        "[0-9]{1,3}",
        ("[a-z][a-z0-9]{0,4}", "[a-z][a-z0-9]{0,4}")
            .prop_map(|(table, field)| format!("[{table}][{field}]")),
    ];
    let operators = [
        "+", "-", "*", "/", ">", "<", ">=", "<=", "=", "<>", "and", "or",
    ];
    let functions: Vec<&'static str> = FUNCTIONS.iter().map(|(source, _)| *source).collect();
    leaf.prop_recursive(4, 32, 3, move |inner| {
        prop_oneof![
            (inner.clone(), proptest::sample::select(operators.to_vec()), inner.clone())
                .prop_map(|(left, op, right)| format!("{left} {op} {right}")),
            (
                proptest::sample::select(functions.clone()),
                inner.clone(),
                inner.clone()
            )
                .prop_map(|(name, first, second)| format!("{name}({first}, {second})")),
            (inner.clone(), inner.clone())
                .prop_map(|(base, exponent)| format!("({base})^({exponent})")),
            inner.prop_map(|group| format!("({group})")),
        ]
    })
}

proptest! {
    #[test]
    fn test_forward_then_reverse_restores_source(source in source_expression()) {
        let target = calculation_to_target(&source, &mut CalculationScope::new()).unwrap();
        let back = expression_to_source(&target).unwrap();
        prop_assert_eq!(squash(&back), squash(&source));
    }

    #[test]
    fn test_trigger_round_trip(source in source_expression()) {
        let target = trigger_to_target(&source, &mut CalculationScope::new()).unwrap();
        prop_assert!(target.starts_with("!("));
        let back = trigger_to_source(&target).unwrap();
        prop_assert_eq!(squash(&back), squash(&source));
    }
}

#[test]
fn test_registered_calculation_targets_calculation_scope() {
    let mut scope = CalculationScope::new();
    let first = calculation_to_target("[c1] * 2", &mut scope).unwrap();
    assert_eq!(first, "assessment[\"c1\"] * 2");
    scope.register("c1");
    let second = calculation_to_target("[c1] * 2", &mut scope).unwrap();
    assert_eq!(second, "calculations[\"c1\"] * 2");
    assert!(scope.referenced_as_field("c1"));
}

#[test]
fn test_exponentiation_operands_keep_inner_groups() {
    let target = calculation_to_target("((x))^((y+1))", &mut CalculationScope::new()).unwrap();
    assert_eq!(target, "math.pow((x), (y+1))");
}
