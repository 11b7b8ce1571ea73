use crate::heap::{Heap, LENGTH_FIELD};
use crate::runtime_error::{runtime_error_at, RuntimeError};
use crate::value::{format_value, values_equal, Value};
use cascade_core::ast::{
    AssignTarget, BinaryOp, Expr, ExprKind, FieldInit, Function, Item, Program, Stmt, UnaryOp,
};
use cascade_core::{Span, TraceFrame};
use std::collections::HashMap;
use std::rc::Rc;

pub fn eval(program: &Program) -> Result<(), RuntimeError> {
    eval_with_output(program)?;
    Ok(())
}

pub fn eval_with_output(program: &Program) -> Result<String, RuntimeError> {
    let mut vm = Vm::new();
    vm.run(program)?;
    Ok(vm.output)
}

pub(crate) struct Vm {
    scopes: Vec<HashMap<String, Value>>,
    pub(crate) heap: Heap,
    output: String,
    trace: Vec<TraceFrame>,
}

impl Vm {
    pub(crate) fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            heap: Heap::new(),
            output: String::new(),
            trace: Vec::new(),
        }
    }

    pub(crate) fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        // Struct schemas and function bindings are hoisted so statements can
        // refer to declarations later in the file.
        for item in &program.items {
            match item {
                Item::Struct(decl) => {
                    let fields = decl
                        .fields
                        .iter()
                        .map(|field| crate::types::FieldSpec {
                            name: field.name.clone(),
                            optional: field.optional,
                        })
                        .collect();
                    self.heap.define_type(&decl.name, fields);
                }
                Item::Function(function) => {
                    self.bind_local(
                        function.name.clone(),
                        Value::Callable(Rc::new(function.clone())),
                    );
                }
                Item::Stmt(_) => {}
            }
        }
        for item in &program.items {
            if let Item::Stmt(stmt) = item {
                match self.eval_stmt(stmt) {
                    // A top-level return stops the program.
                    Ok(Some(_)) => break,
                    Ok(None) => {}
                    Err(err) => return Err(self.with_trace(err)),
                }
            }
        }
        Ok(())
    }

    fn eval_block(&mut self, stmts: &[Stmt]) -> Result<Option<Value>, RuntimeError> {
        for stmt in stmts {
            if let Some(value) = self.eval_stmt(stmt)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Option<Value>, RuntimeError> {
        match stmt {
            Stmt::Let { name, expr, .. } => {
                let value = self.eval_expr(expr)?;
                self.bind_local(name.clone(), value);
                Ok(None)
            }
            Stmt::Assign { target, expr, .. } => {
                self.eval_assign(target, expr)?;
                Ok(None)
            }
            Stmt::If {
                cond,
                then_body,
                else_body,
                ..
            } => {
                let branch = if self.eval_condition(cond)? {
                    then_body
                } else {
                    else_body
                };
                self.push_scope();
                let result = self.eval_block(branch);
                self.pop_scope();
                result
            }
            Stmt::While { cond, body, .. } => {
                while self.eval_condition(cond)? {
                    self.push_scope();
                    let result = self.eval_block(body);
                    self.pop_scope();
                    if let Some(value) = result? {
                        return Ok(Some(value));
                    }
                }
                Ok(None)
            }
            Stmt::Return { expr, .. } => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Ok(Some(value))
            }
            Stmt::Print { expr, .. } => {
                let value = self.eval_expr(expr)?;
                self.output.push_str(&format_value(&value));
                self.output.push('\n');
                Ok(None)
            }
            Stmt::Expr { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(None)
            }
        }
    }

    fn eval_assign(&mut self, target: &AssignTarget, expr: &Expr) -> Result<(), RuntimeError> {
        match target {
            AssignTarget::Ident { name, span } => {
                let value = self.eval_expr(expr)?;
                self.assign_var(name, value, *span)
            }
            AssignTarget::Field { base, field, span } => {
                let value = self.eval_expr(expr)?;
                let base_value = self.eval_expr(base)?;
                let Some(id) = base_value.object_id() else {
                    return Err(runtime_error_at(
                        "E0401",
                        format!(
                            "Field assignment on non-object ({}).",
                            base_value.kind_name()
                        ),
                        *span,
                    ));
                };
                let value = reject_callable_field_value(value, *span)?;
                let mandatory = self
                    .heap
                    .get_object(id)
                    .and_then(|record| record.type_name())
                    .map(|type_name| self.heap.is_field_mandatory(type_name, field))
                    .unwrap_or(false);
                self.heap.set_field(id, field, value, mandatory);
                Ok(())
            }
            AssignTarget::Index { base, index, span } => {
                let value = self.eval_expr(expr)?;
                let index_value = self.eval_expr(index)?;
                let base_value = self.eval_expr(base)?;
                let Some(id) = base_value.object_id() else {
                    return Err(runtime_error_at(
                        "E0401",
                        format!(
                            "Index assignment on non-array ({}).",
                            base_value.kind_name()
                        ),
                        *span,
                    ));
                };
                let Some(record) = self.heap.get_object(id) else {
                    // Dead target: writes are silent no-ops.
                    return Ok(());
                };
                if !record.is_array() {
                    return Err(runtime_error_at(
                        "E0401",
                        "Index assignment on non-array (object).",
                        *span,
                    ));
                }
                let index = array_write_index(&index_value, *span)?;
                let value = reject_callable_field_value(value, *span)?;
                self.heap.set_field(id, &index.to_string(), value, false);
                if index + 1 > self.heap.array_length(id) {
                    self.heap.set_field(
                        id,
                        LENGTH_FIELD,
                        Value::Number((index + 1) as f64),
                        false,
                    );
                }
                Ok(())
            }
        }
    }

    fn eval_condition(&mut self, cond: &Expr) -> Result<bool, RuntimeError> {
        match self.eval_expr(cond)? {
            Value::Bool(value) => Ok(value),
            other => Err(runtime_error_at(
                "E0401",
                format!("Condition must be a boolean, got {}.", other.kind_name()),
                cond.span,
            )),
        }
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match &expr.kind {
            ExprKind::Number(value) => Ok(Value::Number(*value)),
            ExprKind::Bool(value) => Ok(Value::Bool(*value)),
            ExprKind::Str(value) => Ok(Value::Str(Rc::from(value.as_str()))),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Ident(name) => self.lookup(name).cloned().ok_or_else(|| {
                runtime_error_at(
                    "E0400",
                    format!("Undefined variable '{name}'."),
                    expr.span,
                )
            }),
            ExprKind::New { type_name, fields } => {
                if !self.heap.is_type_defined(type_name) {
                    return Err(runtime_error_at(
                        "E0400",
                        format!("Unknown struct type '{type_name}'."),
                        expr.span,
                    ));
                }
                let initial = self.eval_field_inits(fields)?;
                Ok(Value::Object(
                    self.heap.create_object(Some(type_name), initial),
                ))
            }
            ExprKind::ObjectLit(fields) => {
                let initial = self.eval_field_inits(fields)?;
                Ok(Value::Object(self.heap.create_object(None, initial)))
            }
            ExprKind::ArrayLit(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    let value = self.eval_expr(element)?;
                    values.push(reject_callable_field_value(value, element.span)?);
                }
                Ok(Value::Object(self.heap.create_array(values)))
            }
            ExprKind::Field { base, field } => {
                let base_value = self.eval_expr(base)?;
                let Some(id) = base_value.object_id() else {
                    return Err(runtime_error_at(
                        "E0401",
                        format!("Field access on non-object ({}).", base_value.kind_name()),
                        expr.span,
                    ));
                };
                Ok(self.heap.get_field(id, field))
            }
            ExprKind::Index { base, index } => {
                let index_value = self.eval_expr(index)?;
                let base_value = self.eval_expr(base)?;
                let Some(id) = base_value.object_id() else {
                    return Err(runtime_error_at(
                        "E0401",
                        format!("Indexing of non-array ({}).", base_value.kind_name()),
                        expr.span,
                    ));
                };
                let Some(record) = self.heap.get_object(id) else {
                    return Ok(Value::Null);
                };
                if !record.is_array() {
                    return Err(runtime_error_at(
                        "E0401",
                        "Indexing of non-array (object).",
                        expr.span,
                    ));
                }
                // Out-of-range reads yield null; a non-number, negative,
                // or fractional index never names a slot.
                let slot = match index_value {
                    Value::Number(number) if number >= 0.0 && number.fract() == 0.0 => {
                        number as usize
                    }
                    _ => return Ok(Value::Null),
                };
                Ok(self.heap.get_field(id, &slot.to_string()))
            }
            ExprKind::Call { callee, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg)?);
                }
                if let ExprKind::Ident(name) = &callee.kind {
                    if let Some(value) = self.eval_builtin_call(name, &values, expr.span)? {
                        return Ok(value);
                    }
                }
                let callee_value = self.eval_expr(callee)?;
                match callee_value {
                    Value::Callable(function) => self.call_function(function, values, expr.span),
                    other => Err(runtime_error_at(
                        "E0401",
                        format!("Call of non-callable value ({}).", other.kind_name()),
                        callee.span,
                    )),
                }
            }
            ExprKind::Unary { op, expr: operand } => {
                let value = self.eval_expr(operand)?;
                match (op, value) {
                    (UnaryOp::Neg, Value::Number(value)) => Ok(Value::Number(-value)),
                    (UnaryOp::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
                    (_, value) => Err(runtime_error_at(
                        "E0401",
                        format!("Invalid unary operand ({}).", value.kind_name()),
                        expr.span,
                    )),
                }
            }
            ExprKind::Binary { left, op, right } => {
                let left_value = self.eval_expr(left)?;
                if let BinaryOp::AndAnd | BinaryOp::OrOr = op {
                    return self.eval_short_circuit(*op, left_value, right, expr.span);
                }
                let right_value = self.eval_expr(right)?;
                eval_binary(*op, left_value, right_value, expr.span)
            }
        }
    }

    fn eval_field_inits(
        &mut self,
        fields: &[FieldInit],
    ) -> Result<Vec<(String, Value)>, RuntimeError> {
        let mut initial = Vec::with_capacity(fields.len());
        for init in fields {
            let value = self.eval_expr(&init.expr)?;
            let value = reject_callable_field_value(value, init.span)?;
            initial.push((init.name.clone(), value));
        }
        Ok(initial)
    }

    fn eval_short_circuit(
        &mut self,
        op: BinaryOp,
        left: Value,
        right: &Expr,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        match (op, left) {
            (BinaryOp::AndAnd, Value::Bool(false)) => Ok(Value::Bool(false)),
            (BinaryOp::OrOr, Value::Bool(true)) => Ok(Value::Bool(true)),
            (BinaryOp::AndAnd, Value::Bool(true)) | (BinaryOp::OrOr, Value::Bool(false)) => {
                match self.eval_expr(right)? {
                    Value::Bool(value) => Ok(Value::Bool(value)),
                    other => Err(runtime_error_at(
                        "E0401",
                        format!("Logical operand must be a boolean, got {}.", other.kind_name()),
                        right.span,
                    )),
                }
            }
            (_, left) => Err(runtime_error_at(
                "E0401",
                format!("Logical operand must be a boolean, got {}.", left.kind_name()),
                span,
            )),
        }
    }

    fn call_function(
        &mut self,
        function: Rc<Function>,
        args: Vec<Value>,
        span: Span,
    ) -> Result<Value, RuntimeError> {
        if args.len() != function.params.len() {
            return Err(runtime_error_at(
                "E0401",
                format!(
                    "Wrong number of arguments for '{}': expected {}, got {}.",
                    function.name,
                    function.params.len(),
                    args.len()
                ),
                span,
            ));
        }
        let mut param_scope = HashMap::new();
        for (param, arg) in function.params.iter().zip(args) {
            param_scope.insert(param.name.clone(), arg);
        }
        // The body sees the globals and its own parameters, never the
        // caller's locals.
        let globals = self.scopes[0].clone();
        let caller_scopes =
            std::mem::replace(&mut self.scopes, vec![globals, param_scope]);
        self.push_trace(&function);
        let result = self.eval_block(&function.body);
        // Writes the callee made to globals survive the return.
        let globals = std::mem::take(&mut self.scopes[0]);
        self.scopes = caller_scopes;
        self.scopes[0] = globals;
        match result {
            Ok(Some(value)) => {
                self.pop_trace();
                Ok(value)
            }
            Ok(None) => {
                self.pop_trace();
                Ok(Value::Null)
            }
            Err(err) => Err(err),
        }
    }

    fn push_trace(&mut self, function: &Function) {
        self.trace.push(TraceFrame {
            function: function.name.clone(),
            span: function.span,
        });
    }

    fn pop_trace(&mut self) {
        self.trace.pop();
    }

    fn with_trace(&self, mut err: RuntimeError) -> RuntimeError {
        if err.trace.is_empty() {
            err.trace = self.trace.iter().cloned().rev().collect();
        }
        err
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn bind_local(&mut self, name: String, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    fn assign_var(&mut self, name: &str, value: Value, span: Span) -> Result<(), RuntimeError> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(existing) = scope.get_mut(name) {
                *existing = value;
                return Ok(());
            }
        }
        Err(runtime_error_at(
            "E0400",
            format!("Undefined variable '{name}'."),
            span,
        ))
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<&Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(value);
            }
        }
        None
    }
}

fn eval_binary(
    op: BinaryOp,
    left: Value,
    right: Value,
    span: Span,
) -> Result<Value, RuntimeError> {
    match (op, left, right) {
        (BinaryOp::Add, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left + right))
        }
        (BinaryOp::Add, Value::Str(left), Value::Str(right)) => {
            Ok(Value::Str(Rc::from(format!("{left}{right}"))))
        }
        (BinaryOp::Sub, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left - right))
        }
        (BinaryOp::Mul, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left * right))
        }
        // Division by zero follows host float semantics.
        (BinaryOp::Div, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Number(left / right))
        }
        (BinaryOp::EqEq, left, right) => Ok(Value::Bool(values_equal(&left, &right))),
        (BinaryOp::NotEq, left, right) => Ok(Value::Bool(!values_equal(&left, &right))),
        (BinaryOp::Lt, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Bool(left < right))
        }
        (BinaryOp::LtEq, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Bool(left <= right))
        }
        (BinaryOp::Gt, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Bool(left > right))
        }
        (BinaryOp::GtEq, Value::Number(left), Value::Number(right)) => {
            Ok(Value::Bool(left >= right))
        }
        (op, left, right) => Err(runtime_error_at(
            "E0401",
            format!(
                "Invalid operands for {op:?} ({} and {}).",
                left.kind_name(),
                right.kind_name()
            ),
            span,
        )),
    }
}

fn reject_callable_field_value(value: Value, span: Span) -> Result<Value, RuntimeError> {
    if matches!(value, Value::Callable(_)) {
        return Err(runtime_error_at(
            "E0401",
            "Object fields cannot hold functions.",
            span,
        ));
    }
    Ok(value)
}

fn array_write_index(value: &Value, span: Span) -> Result<usize, RuntimeError> {
    match value {
        Value::Number(number) if *number >= 0.0 && number.fract() == 0.0 => Ok(*number as usize),
        other => Err(runtime_error_at(
            "E0401",
            format!(
                "Array index must be a non-negative integer, got {}.",
                other.kind_name()
            ),
            span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectId;
    use cascade_core::{lexer, parser};

    fn run_source(source: &str) -> Vm {
        let tokens = lexer::lex(source).unwrap();
        let program = parser::parse(&tokens).unwrap();
        let mut vm = Vm::new();
        vm.run(&program).unwrap();
        vm
    }

    fn run_error(source: &str) -> RuntimeError {
        let tokens = lexer::lex(source).unwrap();
        let program = parser::parse(&tokens).unwrap();
        let mut vm = Vm::new();
        vm.run(&program).unwrap_err()
    }

    fn output_of(source: &str) -> String {
        let vm = run_source(source);
        vm.output
    }

    fn object_of(vm: &Vm, name: &str) -> ObjectId {
        vm.lookup(name)
            .and_then(|value| value.object_id())
            .unwrap_or_else(|| panic!("variable '{name}' should hold an object id"))
    }

    #[test]
    fn optional_link_survives_child_deletion() {
        let vm = run_source(
            "struct N { mandatory id, optional next, }\n\
             let a = new N { id: 1 }\n\
             let b = new N { id: 2 }\n\
             a.next = b; b.id = null",
        );
        let a = object_of(&vm, "a");
        let b = object_of(&vm, "b");
        assert!(vm.heap.is_live(a));
        assert!(!vm.heap.is_live(b));
        assert!(vm.heap.get_field(a, "next").is_null());
        assert!(vm.heap.back_edges_of(b).is_empty());
    }

    #[test]
    fn variable_rebinding_does_not_touch_the_heap() {
        let vm = run_source(
            "struct N { mandatory head, }\n\
             let a = new N { }\n\
             let b = new N { }\n\
             a.head = b; b = null",
        );
        let a = object_of(&vm, "a");
        assert!(vm.lookup("b").unwrap().is_null());
        let head = vm.heap.get_field(a, "head");
        let head_id = head.object_id().expect("a.head should still reference the object");
        assert!(vm.heap.is_live(head_id));
    }

    #[test]
    fn mandatory_link_cascades_to_parent() {
        let vm = run_source(
            "struct N { mandatory id, mandatory next, }\n\
             let a = new N { id: 1 }\n\
             let b = new N { id: 2 }\n\
             a.next = b; b.id = null",
        );
        let a = object_of(&vm, "a");
        let b = object_of(&vm, "b");
        assert!(!vm.heap.is_live(a));
        assert!(!vm.heap.is_live(b));
        assert_eq!(vm.heap.stats().live_count, 0);
    }

    #[test]
    fn mandatory_cycle_collapses_without_looping() {
        let vm = run_source(
            "struct Pair { mandatory link, }\n\
             let x = new Pair { }\n\
             let y = new Pair { }\n\
             x.link = y; y.link = x;\n\
             x.link = null",
        );
        let x = object_of(&vm, "x");
        let y = object_of(&vm, "y");
        assert!(!vm.heap.is_live(x));
        assert!(!vm.heap.is_live(y));
    }

    #[test]
    fn array_survives_element_cascade() {
        let vm = run_source(
            "struct N { mandatory id, }\n\
             let a = new N { id: 1 }\n\
             let b = new N { id: 2 }\n\
             let arr = [a, b]\n\
             a.id = null",
        );
        let arr = object_of(&vm, "arr");
        let b = object_of(&vm, "b");
        assert!(vm.heap.is_live(arr));
        assert!(vm.heap.get_field(arr, "0").is_null());
        assert!(matches!(vm.heap.get_field(arr, "1"), Value::Object(id) if id == b));
        assert_eq!(vm.heap.array_length(arr), 2);
    }

    #[test]
    fn untyped_literal_has_no_mandatory_fields() {
        let vm = run_source("let o = { x: 1 }\no.x = null");
        let o = object_of(&vm, "o");
        assert!(vm.heap.is_live(o));
        assert!(vm.heap.get_field(o, "x").is_null());
    }

    #[test]
    fn construction_may_omit_mandatory_fields() {
        let vm = run_source("struct N { mandatory id, }\nlet a = new N { }");
        let a = object_of(&vm, "a");
        assert!(vm.heap.is_live(a));
        assert!(vm.heap.get_field(a, "id").is_null());
    }

    #[test]
    fn struct_redefinition_governs_later_writes() {
        let vm = run_source(
            "struct N { mandatory id, }\n\
             struct N { optional id, }\n\
             let a = new N { id: 1 }\n\
             a.id = null",
        );
        let a = object_of(&vm, "a");
        assert!(vm.heap.is_live(a));
    }

    #[test]
    fn index_write_past_end_extends_length() {
        let vm = run_source("let xs = [1]\nxs[4] = 9");
        let xs = object_of(&vm, "xs");
        assert_eq!(vm.heap.array_length(xs), 5);
        assert!(vm.heap.get_field(xs, "2").is_null());
        assert!(matches!(vm.heap.get_field(xs, "4"), Value::Number(n) if n == 9.0));
    }

    #[test]
    fn out_of_range_reads_yield_null() {
        let output = output_of("let xs = [1]\nprint xs[5]\nprint xs[0 - 1]\nprint xs[0.5]");
        assert_eq!(output, "null\nnull\nnull\n");
    }

    #[test]
    fn non_number_index_reads_yield_null() {
        let output = output_of("let xs = [1]\nprint xs[\"a\"]\nprint xs[true]\nprint xs[null]");
        assert_eq!(output, "null\nnull\nnull\n");
    }

    #[test]
    fn non_number_index_writes_are_type_errors() {
        let err = run_error("let xs = [1]\nxs[\"a\"] = 2");
        assert_eq!(err.code, "E0401");
    }

    #[test]
    fn array_length_reads_as_field() {
        let output = output_of("let xs = [1, 2, 3]\nprint xs.length");
        assert_eq!(output, "3\n");
    }

    #[test]
    fn print_formats_each_value_kind() {
        let output = output_of(
            "struct N { mandatory id, }\n\
             let a = new N { id: 1 }\n\
             print a\nprint \"hi\"\nprint null\nprint true\nprint 2.5",
        );
        assert_eq!(output, "[Object#1]\n\"hi\"\nnull\ntrue\n2.5\n");
    }

    #[test]
    fn functions_do_not_see_caller_locals() {
        let err = run_error(
            "fn greet() { print name }\n\
             if (true) { let name = \"hi\" greet() }",
        );
        assert_eq!(err.code, "E0400");
        assert!(err.message.contains("name"));
    }

    #[test]
    fn functions_see_globals_and_global_writes_persist() {
        let output = output_of(
            "let total = 0\n\
             fn bump(n) { total = total + n }\n\
             bump(2) bump(3)\n\
             print total",
        );
        assert_eq!(output, "5\n");
    }

    #[test]
    fn parameters_shadow_globals_without_clobbering_them() {
        let output = output_of(
            "let x = 1\n\
             fn double(x) { return x * 2 }\n\
             print double(4)\nprint x",
        );
        assert_eq!(output, "8\n1\n");
    }

    #[test]
    fn functions_are_first_class_environment_values() {
        let output = output_of(
            "fn add(a, b) { return a + b }\n\
             let op = add\n\
             print op(2, 3)",
        );
        assert_eq!(output, "5\n");
    }

    #[test]
    fn while_loop_builds_list() {
        let output = output_of(
            "let xs = []\nlet i = 0\n\
             while (i < 3) { xs[i] = i * 2 i = i + 1 }\n\
             print xs.length\nprint xs[2]",
        );
        assert_eq!(output, "3\n4\n");
    }

    #[test]
    fn if_else_branches() {
        let output = output_of("let x = 2\nif (x < 1) { print \"lo\" } else { print \"hi\" }");
        assert_eq!(output, "\"hi\"\n");
    }

    #[test]
    fn string_concat_with_plus() {
        let output = output_of("print \"ab\" + \"cd\"");
        assert_eq!(output, "\"abcd\"\n");
    }

    #[test]
    fn equality_compares_object_identity() {
        let output = output_of(
            "let a = { x: 1 }\nlet b = { x: 1 }\nlet c = a\n\
             print a == b\nprint a == c\nprint a != null",
        );
        assert_eq!(output, "false\ntrue\ntrue\n");
    }

    #[test]
    fn division_by_zero_follows_host_semantics() {
        let output = output_of("print 1 / 0");
        assert_eq!(output, "inf\n");
    }

    #[test]
    fn write_through_stale_identifier_is_silent() {
        let vm = run_source(
            "struct N { mandatory id, optional next, }\n\
             let a = new N { id: 1 }\n\
             let b = a\n\
             a.id = null\n\
             b.next = b",
        );
        let a = object_of(&vm, "a");
        assert!(!vm.heap.is_live(a));
    }

    #[test]
    fn undefined_variable_is_reference_error() {
        let err = run_error("print missing");
        assert_eq!(err.code, "E0400");
        assert!(err.span.is_some());
    }

    #[test]
    fn field_access_on_non_object_is_type_error() {
        let err = run_error("let x = 1\nprint x.y");
        assert_eq!(err.code, "E0401");
    }

    #[test]
    fn indexing_non_array_is_type_error() {
        let err = run_error("let o = { x: 1 }\nprint o[0]");
        assert_eq!(err.code, "E0401");
    }

    #[test]
    fn calling_non_callable_is_type_error() {
        let err = run_error("let x = 3\nx(1)");
        assert_eq!(err.code, "E0401");
    }

    #[test]
    fn callable_cannot_be_stored_in_field() {
        let err = run_error("fn f() { return 1 }\nlet o = { x: 1 }\no.x = f");
        assert_eq!(err.code, "E0401");
    }

    #[test]
    fn unknown_struct_type_is_reference_error() {
        let err = run_error("let a = new Missing { }");
        assert_eq!(err.code, "E0400");
    }

    #[test]
    fn non_boolean_condition_is_type_error() {
        let err = run_error("if (1) { print 1 }");
        assert_eq!(err.code, "E0401");
    }

    #[test]
    fn assert_failure_carries_trace() {
        let err = run_error("fn check(v) { assert(v == 1) }\ncheck(2)");
        assert_eq!(err.code, "E0402");
        assert_eq!(err.trace.len(), 1);
        assert_eq!(err.trace[0].function, "check");
    }

    #[test]
    fn assert_passes_on_true() {
        let output = output_of("assert(1 < 2)\nprint \"ok\"");
        assert_eq!(output, "\"ok\"\n");
    }

    #[test]
    fn cascade_through_chain_of_three() {
        let vm = run_source(
            "struct N { mandatory id, mandatory next, }\n\
             let a = new N { id: 1 }\n\
             let b = new N { id: 2 }\n\
             let c = new N { id: 3 }\n\
             a.next = b; b.next = c;\n\
             c.id = null",
        );
        assert_eq!(vm.heap.stats().live_count, 0);
    }

    #[test]
    fn function_without_return_yields_null() {
        let output = output_of("fn noop() { }\nprint noop()");
        assert_eq!(output, "null\n");
    }
}
