//! Compile-time integer arithmetic.
//!
//! Operators follow the host language's integer semantics: floor division
//! and modulo round toward negative infinity, and `/` is only accepted when
//! it divides exactly. Overflow is a `RangeError`.

use subscript_core::{SubscriptError, SubscriptResult};
use subscript_parser::ast::{BinOp, UnaryOp};

fn overflow(what: &str) -> SubscriptError {
    SubscriptError::range(format!("integer overflow in {what}"))
}

fn zero_division() -> SubscriptError {
    SubscriptError::range("division by zero")
}

/// Fold a binary operator.
pub(crate) fn binary(op: BinOp, left: i64, right: i64) -> SubscriptResult<i64> {
    match op {
        BinOp::Add => left.checked_add(right).ok_or_else(|| overflow("addition")),
        BinOp::Sub => left.checked_sub(right).ok_or_else(|| overflow("subtraction")),
        BinOp::Mult => left
            .checked_mul(right)
            .ok_or_else(|| overflow("multiplication")),
        BinOp::Div => {
            if right == 0 {
                return Err(zero_division());
            }
            if left.wrapping_rem(right) != 0 {
                return Err(SubscriptError::type_error(format!(
                    "{left} / {right} is not an integer; use // for floor division"
                )));
            }
            left.checked_div(right).ok_or_else(|| overflow("division"))
        }
        BinOp::FloorDiv => floor_div(left, right),
        BinOp::Mod => floor_mod(left, right),
        BinOp::Pow => {
            let exp = u32::try_from(right).map_err(|_| {
                SubscriptError::type_error(format!("negative exponent {right} is not supported"))
            })?;
            left.checked_pow(exp).ok_or_else(|| overflow("exponentiation"))
        }
        BinOp::LShift => {
            let shift = shift_amount(right)?;
            let shifted = left.checked_shl(shift).ok_or_else(|| overflow("left shift"))?;
            if shifted >> shift != left {
                return Err(overflow("left shift"));
            }
            Ok(shifted)
        }
        BinOp::RShift => {
            let shift = shift_amount(right)?;
            Ok(left >> shift.min(63))
        }
        BinOp::BitAnd => Ok(left & right),
        BinOp::BitOr => Ok(left | right),
        BinOp::BitXor => Ok(left ^ right),
    }
}

/// Fold a unary operator.
pub(crate) fn unary(op: UnaryOp, operand: i64) -> SubscriptResult<i64> {
    match op {
        UnaryOp::USub => operand.checked_neg().ok_or_else(|| overflow("negation")),
        UnaryOp::UAdd => Ok(operand),
        UnaryOp::Invert => Ok(!operand),
        UnaryOp::Not => Ok(i64::from(operand == 0)),
    }
}

fn shift_amount(right: i64) -> SubscriptResult<u32> {
    u32::try_from(right).map_err(|_| SubscriptError::range(format!("negative shift count {right}")))
}

fn floor_div(left: i64, right: i64) -> SubscriptResult<i64> {
    if right == 0 {
        return Err(zero_division());
    }
    let quotient = left.checked_div(right).ok_or_else(|| overflow("division"))?;
    if left.wrapping_rem(right) != 0 && ((left < 0) != (right < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn floor_mod(left: i64, right: i64) -> SubscriptResult<i64> {
    if right == 0 {
        return Err(zero_division());
    }
    // `MIN % -1` wraps to 0, which is the exact remainder.
    let remainder = left.wrapping_rem(right);
    if remainder != 0 && ((remainder < 0) != (right < 0)) {
        Ok(remainder + right)
    } else {
        Ok(remainder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operators() {
        assert_eq!(binary(BinOp::Add, 0x4000, 3).unwrap(), 0x4003);
        assert_eq!(binary(BinOp::Sub, 2, 5).unwrap(), -3);
        assert_eq!(binary(BinOp::Mult, 0x10, 0x10).unwrap(), 0x100);
        assert_eq!(binary(BinOp::Pow, 2, 10).unwrap(), 1024);
        assert_eq!(binary(BinOp::LShift, 1, 8).unwrap(), 0x100);
        assert_eq!(binary(BinOp::RShift, 0x100, 4).unwrap(), 0x10);
        assert_eq!(binary(BinOp::BitOr, 0x800, 0x0C).unwrap(), 0x80C);
        assert_eq!(binary(BinOp::BitAnd, 0xFF0, 0x0FF).unwrap(), 0x0F0);
        assert_eq!(binary(BinOp::BitXor, 0b1010, 0b0110).unwrap(), 0b1100);
    }

    #[test]
    fn test_floor_semantics() {
        assert_eq!(binary(BinOp::FloorDiv, 7, 2).unwrap(), 3);
        assert_eq!(binary(BinOp::FloorDiv, -7, 2).unwrap(), -4);
        assert_eq!(binary(BinOp::FloorDiv, 7, -2).unwrap(), -4);
        assert_eq!(binary(BinOp::Mod, -7, 2).unwrap(), 1);
        assert_eq!(binary(BinOp::Mod, 7, -2).unwrap(), -1);
        assert_eq!(binary(BinOp::Mod, 6, 3).unwrap(), 0);
    }

    #[test]
    fn test_true_division_must_be_exact() {
        assert_eq!(binary(BinOp::Div, 8, 2).unwrap(), 4);
        assert_eq!(binary(BinOp::Div, 7, 2).unwrap_err().kind_name(), "TypeError");
        assert_eq!(binary(BinOp::Div, 7, 0).unwrap_err().kind_name(), "RangeError");
        assert_eq!(binary(BinOp::Mod, 7, 0).unwrap_err().kind_name(), "RangeError");
    }

    #[test]
    fn test_overflow_and_bad_operands() {
        assert!(binary(BinOp::Mult, i64::MAX, 2).is_err());
        assert!(binary(BinOp::LShift, 1, 64).is_err());
        assert!(binary(BinOp::LShift, i64::MAX, 1).is_err());
        assert!(binary(BinOp::RShift, 1, -1).is_err());
        assert!(binary(BinOp::Pow, 2, -1).is_err());
        assert!(unary(UnaryOp::USub, i64::MIN).is_err());
    }

    #[test]
    fn test_min_by_negative_one() {
        for op in [BinOp::Div, BinOp::FloorDiv] {
            let err = binary(op, i64::MIN, -1).unwrap_err();
            assert_eq!(err.kind_name(), "RangeError");
        }
        assert_eq!(binary(BinOp::Mod, i64::MIN, -1).unwrap(), 0);
        assert_eq!(binary(BinOp::Div, i64::MIN, 1).unwrap(), i64::MIN);
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::USub, 5).unwrap(), -5);
        assert_eq!(unary(UnaryOp::Invert, 0).unwrap(), -1);
        assert_eq!(unary(UnaryOp::Not, 0).unwrap(), 1);
        assert_eq!(unary(UnaryOp::Not, 9).unwrap(), 0);
        assert_eq!(unary(UnaryOp::UAdd, 9).unwrap(), 9);
    }
}
