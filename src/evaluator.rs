//! Tree-walking evaluator. Owns every process-wide runtime structure: the
//! function registry, the module registry, the base-directory stack, and
//! the loop-iteration-cap stack.
//!
//! Control flow is carried through an explicit [`Flow`] value returned by
//! statement evaluation rather than a global return/break/continue flag.
//! Runtime errors are carried through `Result`'s `Err` arm; there is no
//! separate mutable error-state object to forget to clear, which is what
//! guarantees the "after try, error is cleared" invariant by construction.

use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{BinOp, CaseArm, Expr, Param, Program, Stmt, UnOp};
use crate::config::NetConfig;
use crate::env::Scope;
use crate::error::{
    division_by_zero, function_call, modulo_by_zero, recursion_limit, type_mismatch,
    undefined_variable, MycoError,
};
use crate::library::{self, LibraryContext};
use crate::sandbox::Sandbox;
use crate::value::{ArrayKind, FunctionValue, Value};

const MAX_LOOP_ITERATIONS: u64 = 1_000_000;

#[derive(Debug, Clone)]
enum ModuleKind {
    /// A parsed `.myco` source file, registered under `alias`.
    Script,
    /// A native library namespace (`math`, `text`, `io`, `test`, `http`, `json`).
    Native(String),
}

struct LoopContext {
    iterations: u64,
    line: usize,
}

/// A statement's outcome: either it ran to completion ("normal"), or it is
/// unwinding toward an enclosing loop or function call.
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub struct Interpreter {
    pub globals: Rc<Scope>,
    functions: IndexMap<String, Rc<FunctionValue>>,
    modules: IndexMap<String, ModuleKind>,
    constants: IndexMap<String, Value>,
    base_dirs: Vec<PathBuf>,
    loop_stack: Vec<LoopContext>,
    sandbox: Option<Sandbox>,
    net_config: NetConfig,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new(output: Box<dyn Write>) -> Self {
        Self {
            globals: Scope::root(),
            functions: IndexMap::new(),
            modules: IndexMap::new(),
            constants: IndexMap::new(),
            base_dirs: Vec::new(),
            loop_stack: Vec::new(),
            sandbox: None,
            net_config: NetConfig::default(),
            output,
        }
    }

    pub fn with_sandbox(mut self, sandbox: Sandbox) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    pub fn with_net_config(mut self, net_config: NetConfig) -> Self {
        self.net_config = net_config;
        self
    }

    /// Discard every variable, function, module, and loop context. The base
    /// directory stack is left unset; callers push a fresh one after reset.
    pub fn reset(&mut self) {
        self.globals = Scope::root();
        self.functions.clear();
        self.modules.clear();
        self.constants.clear();
        self.base_dirs.clear();
        self.loop_stack.clear();
    }

    pub fn push_base_dir(&mut self, dir: PathBuf) {
        self.base_dirs.push(dir);
    }

    pub fn pop_base_dir(&mut self) {
        self.base_dirs.pop();
    }

    pub fn current_base_dir(&self) -> PathBuf {
        self.base_dirs
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub(crate) fn register_module(&mut self, alias: &str, kind_native: Option<String>) {
        let kind = match kind_native {
            Some(lib) => ModuleKind::Native(lib),
            None => ModuleKind::Script,
        };
        self.modules.insert(alias.to_string(), kind);
    }

    pub(crate) fn register_qualified_function(
        &mut self,
        alias: &str,
        name: &str,
        params: Vec<Param>,
        body: Vec<Stmt>,
    ) {
        let func = Rc::new(FunctionValue {
            name: Some(name.to_string()),
            params,
            body,
            closure: None,
        });
        self.functions.insert(format!("{alias}.{name}"), func);
    }

    pub(crate) fn define_constant(&mut self, qualified_name: &str, value: Value) {
        self.constants.insert(qualified_name.to_string(), value);
    }

    /// Evaluate an expression at module top level (a `let` constant), in the
    /// global scope, for the module loader's constant registration.
    pub(crate) fn eval_top_level_expr(&mut self, expr: &Expr) -> Result<Value, MycoError> {
        let globals = Rc::clone(&self.globals);
        self.eval_expr(expr, &globals)
    }

    /// Run a full program's top-level statements. Per §7, a live error
    /// outside any `try` is reported once to stderr and execution resumes
    /// at the next top-level statement — recovery is per-statement, not
    /// per-program. Returns `true` if any top-level statement raised an
    /// uncaught error, so the CLI front door can map it to a nonzero exit
    /// code without aborting the run that produced it.
    pub fn run(&mut self, program: &Program) -> bool {
        let globals = Rc::clone(&self.globals);
        let mut had_error = false;
        for stmt in &program.statements {
            match self.eval_stmt(stmt, &globals) {
                Ok(Flow::Return(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    eprintln!("{}", err.ansi_report());
                    had_error = true;
                }
            }
        }
        had_error
    }

    // ---- statements ----

    fn eval_block(&mut self, stmts: &[Stmt], scope: &Rc<Scope>) -> Result<Flow, MycoError> {
        for stmt in stmts {
            match self.eval_stmt(stmt, scope)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_stmt(&mut self, stmt: &Stmt, scope: &Rc<Scope>) -> Result<Flow, MycoError> {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let v = self.eval_expr(value, scope)?;
                scope.define(name, v);
                Ok(Flow::Normal)
            }
            Stmt::Assign { name, value, line } => {
                let v = self.eval_expr(value, scope)?;
                scope.assign(name, v, *line)?;
                Ok(Flow::Normal)
            }
            Stmt::ArrayAssign {
                subject,
                index,
                value,
                line,
            } => self.eval_array_assign(subject, index, value, *line, scope),
            Stmt::ObjectAssign {
                subject,
                property,
                value,
                line,
            } => self.eval_object_assign(subject, property, value, *line, scope),
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                if self.eval_expr(cond, scope)?.is_truthy() {
                    self.eval_block(then_block, &Scope::child(scope))
                } else if let Some(else_block) = else_block {
                    self.eval_block(else_block, &Scope::child(scope))
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While { cond, body, line } => self.eval_while(cond, body, *line, scope),
            Stmt::ForRange {
                var,
                start,
                end,
                step,
                body,
                line,
            } => self.eval_for_range(var, start, end, step.as_ref(), body, *line, scope),
            Stmt::Return { value, .. } => {
                let v = match value {
                    Some(e) => self.eval_expr(e, scope)?,
                    None => Value::None,
                };
                Ok(Flow::Return(v))
            }
            Stmt::Print { args, .. } => self.eval_print(args, scope),
            Stmt::Switch {
                subject,
                cases,
                default,
                ..
            } => self.eval_switch(subject, cases, default.as_deref(), scope),
            Stmt::Try {
                body,
                error_var,
                handler,
                ..
            } => self.eval_try(body, error_var, handler, scope),
            Stmt::FuncDef {
                name, params, body, ..
            } => {
                let func = Rc::new(FunctionValue {
                    name: Some(name.clone()),
                    params: params.clone(),
                    body: body.clone(),
                    closure: None,
                });
                self.functions.insert(name.clone(), func);
                Ok(Flow::Normal)
            }
            Stmt::Use { path, alias, line } => {
                crate::modules::load_module(self, path, alias, *line)?;
                Ok(Flow::Normal)
            }
            Stmt::Break { .. } => Ok(Flow::Break),
            Stmt::Continue { .. } => Ok(Flow::Continue),
            Stmt::ExprStmt { expr, .. } => {
                self.eval_expr(expr, scope)?;
                Ok(Flow::Normal)
            }
            Stmt::Block { body, .. } => self.eval_block(body, &Scope::child(scope)),
        }
    }

    fn eval_print(&mut self, args: &[Expr], scope: &Rc<Scope>) -> Result<Flow, MycoError> {
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            rendered.push(self.eval_expr(arg, scope)?.to_string());
        }
        let _ = writeln!(self.output, "{}", rendered.join(" "));
        Ok(Flow::Normal)
    }

    fn eval_while(
        &mut self,
        cond: &Expr,
        body: &[Stmt],
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        self.loop_stack.push(LoopContext { iterations: 0, line });
        let result = self.run_while_body(cond, body, scope);
        self.loop_stack.pop();
        result
    }

    fn run_while_body(
        &mut self,
        cond: &Expr,
        body: &[Stmt],
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        while self.eval_expr(cond, scope)?.is_truthy() {
            match self.eval_block(body, &Scope::child(scope))? {
                Flow::Break => break,
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Continue | Flow::Normal => {}
            }
            self.bump_loop_counter()?;
        }
        Ok(Flow::Normal)
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_for_range(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &[Stmt],
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        let start_v = self.expect_int(start, scope, line)?;
        let end_v = self.expect_int(end, scope, line)?;
        let step_v = match step {
            Some(e) => self.expect_int(e, scope, line)?,
            None => 1,
        };

        self.loop_stack.push(LoopContext { iterations: 0, line });
        let result = self.run_for_range_body(var, start_v, end_v, step_v, body, scope);
        self.loop_stack.pop();
        result
    }

    fn run_for_range_body(
        &mut self,
        var: &str,
        start: i64,
        end: i64,
        step: i64,
        body: &[Stmt],
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        let mut current = start;
        loop {
            let continues = match step.cmp(&0) {
                std::cmp::Ordering::Greater => current <= end,
                std::cmp::Ordering::Less => current >= end,
                std::cmp::Ordering::Equal => false,
            };
            if !continues {
                break;
            }
            let iter_scope = Scope::child(scope);
            iter_scope.define(var, Value::Int(current));
            match self.eval_block(body, &iter_scope)? {
                Flow::Break => break,
                Flow::Return(v) => return Ok(Flow::Return(v)),
                Flow::Continue | Flow::Normal => {}
            }
            current += step;
            self.bump_loop_counter()?;
        }
        Ok(Flow::Normal)
    }

    fn bump_loop_counter(&mut self) -> Result<(), MycoError> {
        let ctx = self.loop_stack.last_mut().expect("loop context pushed by caller");
        ctx.iterations += 1;
        if ctx.iterations > MAX_LOOP_ITERATIONS {
            return Err(MycoError::new(recursion_limit(), ctx.line));
        }
        Ok(())
    }

    fn expect_int(&mut self, expr: &Expr, scope: &Rc<Scope>, line: usize) -> Result<i64, MycoError> {
        match self.eval_expr(expr, scope)? {
            Value::Int(i) => Ok(i),
            Value::Float(f) => Ok(f as i64),
            _ => Err(MycoError::new(type_mismatch(), line)),
        }
    }

    fn eval_switch(
        &mut self,
        subject: &Expr,
        cases: &[CaseArm],
        default: Option<&[Stmt]>,
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        let subject_v = self.eval_expr(subject, scope)?;
        for case in cases {
            let case_v = self.eval_expr(&case.value, scope)?;
            if subject_v.values_equal(&case_v) {
                return self.eval_block(&case.body, &Scope::child(scope));
            }
        }
        match default {
            Some(body) => self.eval_block(body, &Scope::child(scope)),
            None => Ok(Flow::Normal),
        }
    }

    fn eval_try(
        &mut self,
        body: &[Stmt],
        error_var: &str,
        handler: &[Stmt],
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        let body_scope = Scope::child(scope);
        match self.eval_block(body, &body_scope) {
            Ok(flow) => Ok(flow),
            Err(err) => {
                let catch_scope = Scope::child(scope);
                catch_scope.define(error_var, Value::Str(err.code.description().to_string()));
                self.eval_block(handler, &catch_scope)
            }
        }
    }

    fn eval_array_assign(
        &mut self,
        subject: &Expr,
        index: &Expr,
        value: &Expr,
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        let name = match subject {
            Expr::Ident(name, _) => name.clone(),
            _ => return Err(MycoError::new(type_mismatch(), line)),
        };
        let idx = match self.eval_expr(index, scope)? {
            Value::Int(i) if i >= 0 => i as usize,
            _ => return Err(MycoError::new(type_mismatch(), line)),
        };
        let new_value = self.eval_expr(value, scope)?;
        let current = scope
            .lookup(&name)
            .ok_or_else(|| MycoError::new(undefined_variable(), line))?;
        let (kind, mut items) = match current {
            Value::Array(kind, items) => (kind, items),
            _ => return Err(MycoError::new(type_mismatch(), line)),
        };
        if idx < items.len() {
            items[idx] = new_value;
        } else if idx == items.len() {
            items.push(new_value);
        } else {
            return Err(MycoError::new(type_mismatch(), line));
        }
        scope.assign(&name, Value::Array(kind, items), line)?;
        Ok(Flow::Normal)
    }

    fn eval_object_assign(
        &mut self,
        subject: &Expr,
        property: &str,
        value: &Expr,
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Flow, MycoError> {
        let name = match subject {
            Expr::Ident(name, _) => name.clone(),
            _ => return Err(MycoError::new(type_mismatch(), line)),
        };
        let new_value = self.eval_expr(value, scope)?;
        let existing = scope.lookup(&name);
        let mut map = match existing {
            Some(Value::Object(map)) => map,
            Some(Value::None) | None => IndexMap::new(),
            Some(_) => return Err(MycoError::new(type_mismatch(), line)),
        };
        map.insert(property.to_string(), new_value);
        if scope.is_bound(&name) {
            scope.assign(&name, Value::Object(map), line)?;
        } else {
            scope.define(&name, Value::Object(map));
        }
        Ok(Flow::Normal)
    }

    // ---- expressions ----

    fn eval_expr(&mut self, expr: &Expr, scope: &Rc<Scope>) -> Result<Value, MycoError> {
        match expr {
            Expr::IntLit(v, _) => Ok(Value::Int(*v)),
            Expr::FloatLit(v, _) => Ok(Value::Float(*v)),
            Expr::StrLit(s, _) => Ok(Value::Str(s.clone())),
            Expr::BoolLit(b, _) => Ok(Value::Bool(*b)),
            Expr::Ident(name, line) => scope
                .lookup(name)
                .ok_or_else(|| MycoError::new(undefined_variable(), *line)),
            Expr::Binary {
                op,
                left,
                right,
                line,
            } => self.eval_binary(op, left, right, *line, scope),
            Expr::Unary { op, operand, line } => self.eval_unary(op, operand, *line, scope),
            Expr::Call { callee, args, line } => self.eval_call(callee, args, *line, scope),
            Expr::ArrayLit { items, line: _ } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, scope)?);
                }
                let kind = if values.iter().all(Value::is_string) {
                    ArrayKind::String
                } else {
                    ArrayKind::Number
                };
                Ok(Value::Array(kind, values))
            }
            Expr::ArrayAccess {
                subject,
                index,
                line,
            } => {
                let subject_v = self.eval_expr(subject, scope)?;
                let idx_v = self.eval_expr(index, scope)?;
                match (subject_v, idx_v) {
                    (Value::Array(_, items), Value::Int(i)) if i >= 0 => {
                        Ok(items.get(i as usize).cloned().unwrap_or(Value::None))
                    }
                    (Value::Array(..), _) => Err(MycoError::new(type_mismatch(), *line)),
                    _ => Err(MycoError::new(type_mismatch(), *line)),
                }
            }
            Expr::ObjectAccess {
                subject, property, ..
            } => {
                let subject_v = self.eval_expr(subject, scope)?;
                match subject_v {
                    Value::Object(map) => Ok(map.get(property).cloned().unwrap_or(Value::None)),
                    _ => Ok(Value::None),
                }
            }
            Expr::DotAccess { left, right, line } => self.eval_dot_access(left, right, *line, scope),
            Expr::DotCall {
                left,
                method,
                args,
                line,
            } => self.eval_dot_call(left, method, args, *line, scope),
            Expr::Ternary {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                if self.eval_expr(cond, scope)?.is_truthy() {
                    self.eval_expr(then_branch, scope)
                } else {
                    self.eval_expr(else_branch, scope)
                }
            }
            Expr::Lambda { params, body, .. } => Ok(Value::Function(Rc::new(FunctionValue {
                name: None,
                params: params.clone(),
                body: body.clone(),
                closure: Some(Rc::clone(scope)),
            }))),
        }
    }

    fn eval_binary(
        &mut self,
        op: &BinOp,
        left: &Expr,
        right: &Expr,
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Value, MycoError> {
        // `and`/`or` short-circuit, so the right operand must not be
        // evaluated eagerly.
        if matches!(op, BinOp::And) {
            let l = self.eval_expr(left, scope)?;
            return if !l.is_truthy() {
                Ok(l)
            } else {
                self.eval_expr(right, scope)
            };
        }
        if matches!(op, BinOp::Or) {
            let l = self.eval_expr(left, scope)?;
            return if l.is_truthy() {
                Ok(l)
            } else {
                self.eval_expr(right, scope)
            };
        }

        let l = self.eval_expr(left, scope)?;
        let r = self.eval_expr(right, scope)?;

        match op {
            BinOp::Add => {
                if l.is_string() || r.is_string() {
                    Ok(Value::Str(format!("{}{}", l.to_display_string(), r.to_display_string())))
                } else {
                    numeric_op(&l, &r, line, |a, b| a + b, |a, b| a.checked_add(b))
                }
            }
            BinOp::Sub => numeric_op(&l, &r, line, |a, b| a - b, |a, b| a.checked_sub(b)),
            BinOp::Mul => numeric_op(&l, &r, line, |a, b| a * b, |a, b| a.checked_mul(b)),
            BinOp::Div => {
                let (lf, rf) = (require_f64(&l, line)?, require_f64(&r, line)?);
                if rf == 0.0 {
                    return Err(MycoError::new(division_by_zero(), line));
                }
                Ok(Value::Float(lf / rf))
            }
            BinOp::Mod => {
                let (lf, rf) = (require_f64(&l, line)?, require_f64(&r, line)?);
                if rf == 0.0 {
                    return Err(MycoError::new(modulo_by_zero(), line));
                }
                if matches!(l, Value::Int(_)) && matches!(r, Value::Int(_)) {
                    Ok(Value::Int((lf as i64) % (rf as i64)))
                } else {
                    Ok(Value::Float(lf % rf))
                }
            }
            BinOp::Eq => Ok(Value::Bool(l.values_equal(&r))),
            BinOp::NotEq => Ok(Value::Bool(!l.values_equal(&r))),
            BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                let (lf, rf) = (require_f64(&l, line)?, require_f64(&r, line)?);
                Ok(Value::Bool(match op {
                    BinOp::Lt => lf < rf,
                    BinOp::Gt => lf > rf,
                    BinOp::Le => lf <= rf,
                    BinOp::Ge => lf >= rf,
                    _ => unreachable!(),
                }))
            }
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_unary(
        &mut self,
        op: &UnOp,
        operand: &Expr,
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Value, MycoError> {
        let v = self.eval_expr(operand, scope)?;
        match op {
            UnOp::Not => Ok(Value::Bool(!v.is_truthy())),
            UnOp::Neg => match v {
                Value::Int(i) => Ok(Value::Int(-i)),
                Value::Float(f) => Ok(Value::Float(-f)),
                _ => Err(MycoError::new(type_mismatch(), line)),
            },
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Value, MycoError> {
        if let Expr::Ident(name, _) = callee {
            if let Some(Value::Function(func)) = scope.lookup(name) {
                return self.call_function(&func, args, scope, line);
            }
            if let Some(func) = self.functions.get(name).cloned() {
                return self.call_function(&func, args, scope, line);
            }
            let aliases: Vec<String> = self.modules.keys().cloned().collect();
            for alias in aliases {
                let qualified = format!("{alias}.{name}");
                if let Some(func) = self.functions.get(&qualified).cloned() {
                    return self.call_function(&func, args, scope, line);
                }
            }
            return Err(MycoError::new(function_call(), line));
        }

        match self.eval_expr(callee, scope)? {
            Value::Function(func) => self.call_function(&func, args, scope, line),
            _ => Err(MycoError::new(function_call(), line)),
        }
    }

    fn call_function(
        &mut self,
        func: &Rc<FunctionValue>,
        args: &[Expr],
        caller_scope: &Rc<Scope>,
        line: usize,
    ) -> Result<Value, MycoError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg, caller_scope)?);
        }
        let parent = func.closure.clone().unwrap_or_else(|| Rc::clone(&self.globals));
        let fn_scope = Scope::child(&parent);
        for (i, param) in func.params.iter().enumerate() {
            fn_scope.define(&param.name, values.get(i).cloned().unwrap_or(Value::None));
        }
        let _ = line;
        match self.eval_block(&func.body, &fn_scope)? {
            Flow::Return(v) => Ok(v),
            _ => Ok(Value::None),
        }
    }

    fn eval_dot_access(
        &mut self,
        left: &Expr,
        right: &str,
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Value, MycoError> {
        if let Expr::Ident(alias, _) = left {
            if let Some(kind) = self.modules.get(alias).cloned() {
                return match kind {
                    ModuleKind::Native(_) => Err(MycoError::new(function_call(), line)),
                    ModuleKind::Script => {
                        let qualified = format!("{alias}.{right}");
                        self.constants
                            .get(&qualified)
                            .cloned()
                            .ok_or_else(|| MycoError::new(undefined_variable(), line))
                    }
                };
            }
        }

        match right {
            "length" => match self.eval_expr(left, scope)? {
                Value::Str(s) => Ok(Value::Int(s.len() as i64)),
                _ => Err(MycoError::new(type_mismatch(), line)),
            },
            "upper" | "lower" | "trim" => self.apply_string_mutator(left, right, scope, line),
            _ => match self.eval_expr(left, scope)? {
                Value::Object(map) => Ok(map.get(right).cloned().unwrap_or(Value::None)),
                _ => Err(MycoError::new(type_mismatch(), line)),
            },
        }
    }

    fn apply_string_mutator(
        &mut self,
        left: &Expr,
        method: &str,
        scope: &Rc<Scope>,
        line: usize,
    ) -> Result<Value, MycoError> {
        let transform = |s: &str| -> String {
            match method {
                "upper" => s.to_ascii_uppercase(),
                "lower" => s.to_ascii_lowercase(),
                "trim" => s.trim().to_string(),
                _ => s.to_string(),
            }
        };
        if let Expr::Ident(name, _) = left {
            let current = scope
                .lookup(name)
                .ok_or_else(|| MycoError::new(undefined_variable(), line))?;
            let Value::Str(s) = current else {
                return Err(MycoError::new(type_mismatch(), line));
            };
            let mutated = transform(&s);
            scope.assign(name, Value::Str(mutated.clone()), line)?;
            Ok(Value::Str(mutated))
        } else {
            match self.eval_expr(left, scope)? {
                Value::Str(s) => Ok(Value::Str(transform(&s))),
                _ => Err(MycoError::new(type_mismatch(), line)),
            }
        }
    }

    fn eval_dot_call(
        &mut self,
        left: &Expr,
        method: &str,
        args: &[Expr],
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<Value, MycoError> {
        if let Expr::Ident(alias, _) = left {
            if let Some(kind) = self.modules.get(alias).cloned() {
                return match kind {
                    ModuleKind::Native(lib) => {
                        let mut ctx = EvalLibraryContext {
                            interp: self,
                            scope,
                        };
                        library::dispatch(&lib, method, args, &mut ctx, line)
                    }
                    ModuleKind::Script => {
                        let qualified = format!("{alias}.{method}");
                        match self.functions.get(&qualified).cloned() {
                            Some(func) => self.call_function(&func, args, scope, line),
                            None => Err(MycoError::new(function_call(), line)),
                        }
                    }
                };
            }
        }

        match method {
            "length" => match self.eval_expr(left, scope)? {
                Value::Str(s) => Ok(Value::Int(s.len() as i64)),
                _ => Err(MycoError::new(type_mismatch(), line)),
            },
            "upper" | "lower" | "trim" => self.apply_string_mutator(left, method, scope, line),
            "split" => {
                let sep = self.expect_str_arg(args, 0, line, scope)?;
                match self.eval_expr(left, scope)? {
                    Value::Str(s) => Ok(Value::Array(
                        ArrayKind::String,
                        s.split(sep.as_str()).map(|p| Value::Str(p.to_string())).collect(),
                    )),
                    _ => Err(MycoError::new(type_mismatch(), line)),
                }
            }
            "join" => {
                let sep = self.expect_str_arg(args, 0, line, scope)?;
                match self.eval_expr(left, scope)? {
                    Value::Array(_, items) => {
                        let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                        Ok(Value::Str(parts.join(&sep)))
                    }
                    _ => Err(MycoError::new(type_mismatch(), line)),
                }
            }
            _ => Err(MycoError::new(function_call(), line)),
        }
    }

    fn expect_str_arg(
        &mut self,
        args: &[Expr],
        idx: usize,
        line: usize,
        scope: &Rc<Scope>,
    ) -> Result<String, MycoError> {
        match args.get(idx) {
            Some(e) => match self.eval_expr(e, scope)? {
                Value::Str(s) => Ok(s),
                _ => Err(MycoError::new(type_mismatch(), line)),
            },
            None => Err(MycoError::new(type_mismatch(), line)),
        }
    }
}

struct EvalLibraryContext<'a> {
    interp: &'a mut Interpreter,
    scope: &'a Rc<Scope>,
}

impl LibraryContext for EvalLibraryContext<'_> {
    fn eval_arg(&mut self, expr: &Expr) -> Result<Value, MycoError> {
        self.interp.eval_expr(expr, self.scope)
    }

    fn sandbox(&self) -> Option<&Sandbox> {
        self.interp.sandbox.as_ref()
    }

    fn net_config(&self) -> &NetConfig {
        &self.interp.net_config
    }
}

fn require_f64(v: &Value, line: usize) -> Result<f64, MycoError> {
    v.as_f64().ok_or_else(|| MycoError::new(type_mismatch(), line))
}

fn numeric_op(
    l: &Value,
    r: &Value,
    line: usize,
    float_op: impl Fn(f64, f64) -> f64,
    int_op: impl Fn(i64, i64) -> Option<i64>,
) -> Result<Value, MycoError> {
    match (l, r) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b)
            .map(Value::Int)
            .ok_or_else(|| MycoError::new(type_mismatch(), line)),
        (a, b) if a.is_number() && b.is_number() => {
            Ok(Value::Float(float_op(a.as_f64().unwrap(), b.as_f64().unwrap())))
        }
        _ => Err(MycoError::new(type_mismatch(), line)),
    }
}
