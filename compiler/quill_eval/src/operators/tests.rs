use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn bin(l: impl Into<Obj>, r: impl Into<Obj>, op: BinaryOp) -> Result<Obj, RuntimeError> {
    evaluate_binary(&l.into(), &r.into(), op)
}

#[test]
fn int_arithmetic_stays_int() {
    assert_eq!(bin(7_i64, 2_i64, BinaryOp::Add).unwrap(), Obj::Int(9));
    assert_eq!(bin(7_i64, 2_i64, BinaryOp::Div).unwrap(), Obj::Int(3));
    assert_eq!(bin(-7_i64, 2_i64, BinaryOp::Rem).unwrap(), Obj::Int(-1));
}

#[test]
fn mixed_arithmetic_promotes_to_real() {
    assert!(matches!(bin(1_i64, 0.5, BinaryOp::Add).unwrap(), Obj::Real(r) if r == 1.5));
    assert!(matches!(bin(0.5, 2_i64, BinaryOp::Mul).unwrap(), Obj::Real(r) if r == 1.0));
    assert!(matches!(bin(1_i64, 0.0, BinaryOp::Div).unwrap(), Obj::Real(r) if r.is_infinite()));
}

#[test]
fn integer_division_by_zero_raises() {
    let err = bin(1_i64, 0_i64, BinaryOp::Div).unwrap_err();
    assert_eq!(err.kind, crate::errors::ErrorKind::Arithmetic);
    assert_eq!(err.message, "division by zero");
    assert_eq!(bin(1_i64, 0_i64, BinaryOp::Rem).unwrap_err().message, "modulo by zero");
}

#[test]
fn overflow_is_checked() {
    let err = bin(i64::MAX, 1_i64, BinaryOp::Add).unwrap_err();
    assert_eq!(err.message, "integer overflow in addition");
    assert!(bin(i64::MIN, -1_i64, BinaryOp::Div).is_err());
    assert!(evaluate_unary(&Obj::Int(i64::MIN), UnaryOp::Neg).is_err());
}

#[test]
fn string_concatenation_renders_right_operand() {
    assert_eq!(bin("n=", 3_i64, BinaryOp::Add).unwrap(), Obj::from("n=3"));
    assert_eq!(bin("a", "b", BinaryOp::Lt).unwrap(), Obj::Bool(true));
    assert!(bin("a", 1_i64, BinaryOp::Sub).is_err());
}

#[test]
fn list_plus_list_is_a_new_list() {
    let a = Obj::list(vec![Obj::Int(1)]);
    let b = Obj::list(vec![Obj::Int(2)]);
    let joined = evaluate_binary(&a, &b, BinaryOp::Add).unwrap();
    assert_eq!(joined, Obj::list(vec![Obj::Int(1), Obj::Int(2)]));
    assert_eq!(a, Obj::list(vec![Obj::Int(1)]));
}

#[test]
fn plus_assign_appends_in_place() {
    let list = Obj::list(vec![Obj::Int(1)]);
    plus_assign(&list, &Obj::Int(2)).unwrap().unwrap();
    plus_assign(&list, &Obj::list(vec![Obj::Int(3)])).unwrap().unwrap();
    assert_eq!(list.to_string(), "[1, 2, 3]");
    assert!(plus_assign(&Obj::Int(1), &Obj::Int(2)).is_none());

    list.freeze();
    assert!(plus_assign(&list, &Obj::Int(4)).unwrap().is_err());
}

#[test]
fn ranges() {
    assert_eq!(bin(1_i64, 3_i64, BinaryOp::Range).unwrap().to_string(), "1..3");
    assert_eq!(bin(1_i64, 3_i64, BinaryOp::RangeExclusive).unwrap().to_string(), "1..<3");
}

#[test]
fn unsupported_operation_names_protocol_method() {
    let err = bin(true, false, BinaryOp::Add).unwrap_err();
    assert_eq!(err.message, "operation 'plus' not implemented for Bool");
    let err = evaluate_unary(&Obj::from("s"), UnaryOp::Neg).unwrap_err();
    assert_eq!(err.message, "operation 'unaryMinus' not implemented for String");
}

#[test]
fn equality_is_structural_across_numeric_kinds() {
    assert_eq!(bin(1_i64, 1.0, BinaryOp::Eq).unwrap(), Obj::Bool(true));
    assert_eq!(bin("x", "x", BinaryOp::NotEq).unwrap(), Obj::Bool(false));
}

#[expect(
    clippy::cast_precision_loss,
    reason = "test compares against the same promotion the runtime applies"
)]
fn promoted(n: i64) -> f64 {
    n as f64
}

proptest! {
    #[test]
    fn int_ops_match_checked_i64(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        prop_assert_eq!(bin(a, b, BinaryOp::Add).unwrap(), Obj::Int(a + b));
        prop_assert_eq!(bin(a, b, BinaryOp::Sub).unwrap(), Obj::Int(a - b));
        prop_assert_eq!(bin(a, b, BinaryOp::Mul).unwrap(), Obj::Int(a * b));
        if b != 0 {
            prop_assert_eq!(bin(a, b, BinaryOp::Div).unwrap(), Obj::Int(a / b));
            prop_assert_eq!(bin(a, b, BinaryOp::Rem).unwrap(), Obj::Int(a % b));
        }
    }

    #[test]
    fn mixed_ops_promote(a in -1_000i64..1_000, b in -1_000.0f64..1_000.0) {
        let expected = [
            (BinaryOp::Add, promoted(a) + b),
            (BinaryOp::Sub, promoted(a) - b),
            (BinaryOp::Mul, promoted(a) * b),
            (BinaryOp::Div, promoted(a) / b),
            (BinaryOp::Rem, promoted(a) % b),
        ];
        for (op, want) in expected {
            match bin(a, b, op).unwrap() {
                Obj::Real(got) => prop_assert!(got == want || (got.is_nan() && want.is_nan())),
                other => prop_assert!(false, "expected Real, got {:?}", other),
            }
        }
    }
}
