//! Condition lowering.
//!
//! A condition is lowered into the current section as a sequence that jumps
//! to a target when the condition holds and falls through otherwise. Each
//! comparison becomes a type-specific compare command followed by `if1`
//! with the comparison's condition code.
//!
//! `and` chains test each term in its own section: the first term lives in
//! the current section and branches onward to a fresh section when true.
//! Every later section ends with a `goto` back to the point right after the
//! first term, so a false term resumes where the chain would have fallen
//! through. `or` terms all branch to the same target.

use crate::command::{CommandArg, Operand};
use crate::compiler::Compiler;
use crate::langtypes::Symbol;
use crate::script::SectionPointer;
use subscript_core::{SubscriptError, SubscriptResult, Value, ValueKind};
use subscript_parser::ast::{BoolOp, CmpOp, Expr, ExprKind, UnaryOp};
use tracing::trace;

/// Condition code tested by `if1` for a comparison operator.
const fn condition_code(op: CmpOp) -> i64 {
    match op {
        CmpOp::Lt => 0,
        CmpOp::Eq => 1,
        CmpOp::Gt => 2,
        CmpOp::LtE => 3,
        CmpOp::GtE => 4,
        CmpOp::NotEq => 5,
    }
}

/// A compare command ready to be built.
#[derive(Debug)]
struct Plan {
    mnemonic: &'static str,
    args: Vec<CommandArg>,
    op: CmpOp,
}

impl<'env> Compiler<'env> {
    /// Lower `test` so that control reaches `target` when it holds, or when
    /// it does not hold if `negate` is set.
    pub(crate) fn lower_condition(
        &mut self,
        test: &Expr,
        target: SectionPointer,
        negate: bool,
    ) -> SubscriptResult<()> {
        match &test.kind {
            ExprKind::UnaryOp {
                op: UnaryOp::Not,
                operand,
            } => self.lower_condition(operand, target, !negate),
            ExprKind::BoolOp { op, values } => {
                let op = match (op, negate) {
                    (BoolOp::And, false) | (BoolOp::Or, true) => BoolOp::And,
                    (BoolOp::Or, false) | (BoolOp::And, true) => BoolOp::Or,
                };
                match op {
                    BoolOp::Or => values
                        .iter()
                        .try_for_each(|term| self.lower_condition(term, target, negate)),
                    BoolOp::And => self.lower_and(values, target, negate),
                }
            }
            ExprKind::Compare {
                left,
                ops,
                comparators,
            } => {
                let ([op], [right]) = (ops.as_slice(), comparators.as_slice()) else {
                    return Err(SubscriptError::unsupported(
                        "chained comparisons are not supported",
                    ));
                };
                let op = if negate { op.negate() } else { *op };
                let left = self.resolve_value(left)?;
                let right = self.resolve_value(right)?;
                self.emit_comparison(&left, op, &right, target)
            }
            _ => {
                let op = if negate { CmpOp::NotEq } else { CmpOp::Eq };
                let value = self.resolve_value(test)?;
                self.emit_comparison(&value, op, &Symbol::Int(1), target)
            }
        }
    }

    fn lower_and(
        &mut self,
        terms: &[Expr],
        target: SectionPointer,
        negate: bool,
    ) -> SubscriptResult<()> {
        let Some((last, rest)) = terms.split_last() else {
            return Ok(());
        };
        let dispatch = self.section;
        let mut fall_through = None;

        for term in rest {
            let next = self.script.add();
            self.lower_condition(term, next.start(), negate)?;
            let resume = match fall_through {
                Some(resume) => {
                    self.emit_goto(resume)?;
                    resume
                }
                None => self.here(dispatch)?,
            };
            fall_through = Some(resume);
            self.section = next;
        }

        self.lower_condition(last, target, negate)?;
        if let Some(resume) = fall_through {
            self.emit_goto(resume)?;
        }
        self.section = dispatch;
        Ok(())
    }

    /// Emit a comparison and the conditional jump to `target`.
    fn emit_comparison(
        &mut self,
        left: &Symbol,
        op: CmpOp,
        right: &Symbol,
        target: SectionPointer,
    ) -> SubscriptResult<()> {
        let plan = match plan_comparison(left, op, right) {
            Err(SubscriptError::TypeError { .. }) => {
                trace!(%left, %right, "retrying comparison with swapped operands");
                plan_comparison(right, op.swap(), left)
            }
            other => other,
        }
        .map_err(|e| match e {
            SubscriptError::TypeError { .. } => SubscriptError::type_error(format!(
                "cannot compare {} {} {}",
                left.describe(),
                op.as_str(),
                right.describe()
            )),
            other => other,
        })?;

        self.emit(plan.mnemonic, plan.args)?;
        self.emit("if1", [condition_code(plan.op).into(), target.into()])
    }
}

/// Choose the compare command for an operand pair in this order.
fn plan_comparison(left: &Symbol, op: CmpOp, right: &Symbol) -> SubscriptResult<Plan> {
    let Symbol::Typed(value) = left else {
        return Err(mismatch());
    };
    let plan = |mnemonic, args: Vec<CommandArg>| Plan { mnemonic, args, op };

    match (value.kind(), right) {
        (ValueKind::Flag, Symbol::Int(expected)) => {
            if op.is_ordering() {
                return Err(SubscriptError::unsupported(format!(
                    "flags support only == and !=, not {}",
                    op.as_str()
                )));
            }
            let op = if *expected == 0 { op.negate() } else { op };
            Ok(Plan {
                mnemonic: "checkflag",
                args: vec![fixed(*value)],
                op,
            })
        }
        (ValueKind::Variable, Symbol::Int(n)) => Ok(plan("compare", vec![fixed(*value), (*n).into()])),
        (ValueKind::HiddenVar, Symbol::Int(n)) => {
            Ok(plan("comparehiddenvar", vec![fixed(*value), (*n).into()]))
        }
        (ValueKind::Bank, Symbol::Int(n)) => {
            Ok(plan("comparebanktobyte", vec![fixed(*value), (*n).into()]))
        }
        (ValueKind::Pointer, Symbol::Int(n)) => {
            Ok(plan("comparefarbytetobyte", vec![fixed(*value), (*n).into()]))
        }
        (kind, Symbol::Typed(other)) => {
            let mnemonic = match (kind, other.kind()) {
                (ValueKind::Variable, ValueKind::Variable) => "comparevars",
                (ValueKind::Bank, ValueKind::Bank) => "comparebanks",
                (ValueKind::Bank, ValueKind::Pointer) => "comparebanktofarbyte",
                (ValueKind::Pointer, ValueKind::Bank) => "comparefarbytetobank",
                (ValueKind::Pointer, ValueKind::Pointer) => "comparefarbytes",
                _ => return Err(mismatch()),
            };
            Ok(plan(mnemonic, vec![fixed(*value), fixed(*other)]))
        }
        _ => Err(mismatch()),
    }
}

fn fixed(value: Value) -> CommandArg {
    Operand::Fixed(value).into()
}

fn mismatch() -> SubscriptError {
    SubscriptError::type_error("unsupported operand types")
}
