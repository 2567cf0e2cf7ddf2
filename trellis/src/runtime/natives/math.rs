// Arithmetic natives. The variadic forms fold over a collection argument;
// a mixed Integer/Float fold promotes to Float, and integer steps are
// overflow-checked.

use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::model::node::{NodeRef, SourceInfo};
use crate::runtime::context::VariableContext;
use crate::runtime::error::{ErrorKind, RuntimeError, RuntimeResult};
use crate::runtime::interpreter::Interpreter;
use crate::runtime::natives::{
    many_values, numeric_of, numeric_value, register, NativeFunction, NativeRegistry, Numeric,
};
use crate::runtime::resolution::ResolutionStacks;

pub fn install(registry: &mut NativeRegistry) {
    register(registry, "plus_Integer_MANY__Integer_1_", Plus);
    register(registry, "plus_Float_MANY__Float_1_", Plus);
    register(registry, "plus_Number_MANY__Number_1_", Plus);
    register(registry, "minus_Integer_MANY__Integer_1_", Minus);
    register(registry, "minus_Float_MANY__Float_1_", Minus);
    register(registry, "minus_Number_MANY__Number_1_", Minus);
    register(registry, "times_Integer_MANY__Integer_1_", Times);
    register(registry, "times_Float_MANY__Float_1_", Times);
    register(registry, "times_Number_MANY__Number_1_", Times);
    register(registry, "divide_Number_1__Number_1__Float_1_", Divide);
    register(registry, "abs_Integer_1__Integer_1_", Abs);
    register(registry, "abs_Float_1__Float_1_", Abs);
    register(registry, "lessThan_Number_1__Number_1__Boolean_1_", LessThan);
    register(
        registry,
        "lessThanEqual_Number_1__Number_1__Boolean_1_",
        LessThanEqual,
    );
}

fn numeric_result(interpreter: &Interpreter, value: Numeric) -> NodeRef {
    let node = match value {
        Numeric::Integer(i) => interpreter.repository().integer(i),
        Numeric::Float(f) => interpreter.repository().float(f),
    };
    interpreter.repository().value_specification(vec![node])
}

fn operands(parameter: &NodeRef, operation: &str) -> RuntimeResult<Vec<Numeric>> {
    many_values(parameter)
        .iter()
        .map(|value| numeric_of(value, operation))
        .collect()
}

fn overflow(operation: &str) -> RuntimeError {
    RuntimeError::new(ErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

fn fold(
    values: Vec<Numeric>,
    empty: i64,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    float_op: impl Fn(f64, f64) -> f64,
    operation: &str,
) -> RuntimeResult<Numeric> {
    let mut iter = values.into_iter();
    let mut acc = match iter.next() {
        Some(first) => first,
        None => return Ok(Numeric::Integer(empty)),
    };
    for next in iter {
        acc = match (acc, next) {
            (Numeric::Integer(a), Numeric::Integer(b)) => {
                Numeric::Integer(int_op(a, b).ok_or_else(|| overflow(operation))?)
            }
            (a, b) => Numeric::Float(float_op(a.as_f64(), b.as_f64())),
        };
    }
    Ok(acc)
}

struct Plus;

impl NativeFunction for Plus {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let result = fold(
            operands(&parameters[0], "plus")?,
            0,
            i64::checked_add,
            |a, b| a + b,
            "plus",
        )?;
        Ok(numeric_result(interpreter, result))
    }
}

/// One operand negates; more subtract left to right.
struct Minus;

impl NativeFunction for Minus {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let values = operands(&parameters[0], "minus")?;
        let result = if values.len() == 1 {
            match values[0] {
                Numeric::Integer(i) => {
                    Numeric::Integer(i.checked_neg().ok_or_else(|| overflow("minus"))?)
                }
                Numeric::Float(f) => Numeric::Float(-f),
            }
        } else {
            fold(values, 0, i64::checked_sub, |a, b| a - b, "minus")?
        };
        Ok(numeric_result(interpreter, result))
    }
}

struct Times;

impl NativeFunction for Times {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let result = fold(
            operands(&parameters[0], "times")?,
            1,
            i64::checked_mul,
            |a, b| a * b,
            "times",
        )?;
        Ok(numeric_result(interpreter, result))
    }
}

/// Division is always Float-valued.
struct Divide;

impl NativeFunction for Divide {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let dividend = numeric_value(&parameters[0], "divide")?;
        let divisor = numeric_value(&parameters[1], "divide")?;
        if divisor.as_f64() == 0.0 {
            return Err(RuntimeError::with_source(
                ErrorKind::DivisionByZero,
                call_site.cloned(),
            ));
        }
        Ok(numeric_result(
            interpreter,
            Numeric::Float(dividend.as_f64() / divisor.as_f64()),
        ))
    }
}

struct Abs;

impl NativeFunction for Abs {
    fn arity(&self) -> RangeInclusive<usize> {
        1..=1
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let result = match numeric_value(&parameters[0], "abs")? {
            Numeric::Integer(i) => {
                Numeric::Integer(i.checked_abs().ok_or_else(|| overflow("abs"))?)
            }
            Numeric::Float(f) => Numeric::Float(f.abs()),
        };
        Ok(numeric_result(interpreter, result))
    }
}

struct LessThan;

impl NativeFunction for LessThan {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let left = numeric_value(&parameters[0], "lessThan")?;
        let right = numeric_value(&parameters[1], "lessThan")?;
        let result = left.as_f64() < right.as_f64();
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}

struct LessThanEqual;

impl NativeFunction for LessThanEqual {
    fn arity(&self) -> RangeInclusive<usize> {
        2..=2
    }

    fn execute(
        &self,
        interpreter: &Interpreter,
        parameters: &[NodeRef],
        _stacks: &mut ResolutionStacks,
        _context: &Arc<VariableContext>,
        _call_site: Option<&SourceInfo>,
    ) -> RuntimeResult<NodeRef> {
        let left = numeric_value(&parameters[0], "lessThanEqual")?;
        let right = numeric_value(&parameters[1], "lessThanEqual")?;
        let result = left.as_f64() <= right.as_f64();
        Ok(interpreter
            .repository()
            .value_specification(vec![interpreter.repository().boolean(result)]))
    }
}
