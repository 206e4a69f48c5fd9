//! Source to event-script compiler.
//!
//! The compiler lowers a parsed module statement by statement into a
//! [`Script`]. Lowering always appends to the *current* section; control
//! flow allocates new sections and links them with `if1`/`goto` commands
//! whose targets are deferred [`SectionPointer`]s, so no address is known
//! until the script is serialized.
//!
//! # Control flow
//!
//! An `if` statement lowers its test into the current section (the
//! *dispatch* section), jumping to a fresh section holding the body when the
//! test holds. `elif` tests follow in the same dispatch section and an `else`
//! is reached with a `goto`. Every block that can fall off its end is closed
//! with a `goto` back to the *return-here* point, right after the complete
//! dispatch sequence, where lowering of the following statements continues.

use crate::arith;
use crate::command::{Command, CommandArg};
use crate::environment::Environment;
use crate::imports::{self, ImportKind};
use crate::langtypes::{type_constructor, Content, Symbol, PREDEFINED};
use crate::registry::{Builtin, BuiltinContext, CallArgs, Registry, StateMap};
use crate::script::{Script, SectionId, SectionPointer};
use crate::text::MovementStep;
use rustc_hash::FxHashMap;
use std::fmt;
use subscript_core::{Span, SubscriptError, SubscriptResult, ValueKind};
use subscript_parser::ast::{Alias, AugOp, Expr, ExprKind, Keyword, Module, Stmt, StmtKind};
use tracing::debug;

/// Compilation error with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// The underlying error.
    pub error: SubscriptError,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (0-indexed).
    pub column: u32,
}

impl CompileError {
    fn locate(source: &str, error: SubscriptError, stmt: Option<Span>) -> Self {
        let span = error.span().or(stmt).unwrap_or_else(Span::dummy);
        let (line, column) = span.line_col(source);
        Self {
            error,
            line,
            column,
        }
    }

    /// The user-facing error kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.error.kind_name()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.error)
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

// =============================================================================
// Compiled Script
// =============================================================================

/// The result of a successful compile.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    script: Script,
    symbols: FxHashMap<String, Symbol>,
}

impl CompiledScript {
    /// Debug listing of every section.
    #[must_use]
    pub fn output(&self) -> String {
        self.script.output()
    }

    /// Listing with section sizes and absolute addresses.
    pub fn status(&self) -> SubscriptResult<String> {
        self.script.status()
    }

    /// The final byte stream.
    pub fn bytecode(&self) -> SubscriptResult<Vec<u8>> {
        self.script.bytecode()
    }

    /// Move the script to a new base address.
    pub fn set_base(&mut self, base: u32) {
        self.script.set_base(base);
    }

    /// The current base address.
    #[must_use]
    pub fn base(&self) -> u32 {
        self.script.base()
    }

    /// The section arena.
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// A top-level binding after compilation.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }
}

// =============================================================================
// Compiler
// =============================================================================

/// Front-end state for one compile.
pub struct Compiler<'env> {
    pub(crate) env: &'env Environment,
    pub(crate) registry: Registry,
    pub(crate) script: Script,
    pub(crate) symbols: FxHashMap<String, Symbol>,
    state: StateMap,
    /// Section receiving commands.
    pub(crate) section: SectionId,
    /// Innermost statement being lowered when an error occurred.
    error_span: Option<Span>,
}

impl<'env> Compiler<'env> {
    /// Create a compiler with an empty script at `base`.
    #[must_use]
    pub fn new(env: &'env Environment, registry: Registry, base: u32) -> Self {
        let mut script = Script::new(base);
        let section = script.add();

        let mut symbols = FxHashMap::default();
        for (name, raw) in PREDEFINED {
            if let Ok(var) = Symbol::typed(ValueKind::Variable, i64::from(raw)) {
                symbols.insert(name.to_string(), var);
            }
        }

        Self {
            env,
            registry,
            script,
            symbols,
            state: StateMap::default(),
            section,
            error_span: None,
        }
    }

    /// Compile source text with the standard registry.
    pub fn compile_source(
        source: &str,
        base: u32,
        env: &Environment,
    ) -> CompileResult<CompiledScript> {
        Self::compile_with(source, base, env, Registry::standard())
    }

    /// Compile source text with a caller-supplied registry.
    pub fn compile_with(
        source: &str,
        base: u32,
        env: &Environment,
        registry: Registry,
    ) -> CompileResult<CompiledScript> {
        let module = subscript_parser::parse(source)
            .map_err(|e| CompileError::locate(source, e, None))?;

        let mut compiler = Compiler::new(env, registry, base);
        compiler
            .compile_module(&module)
            .map_err(|e| CompileError::locate(source, e, compiler.error_span))?;

        debug!(
            sections = compiler.script.sections().len(),
            bytes = compiler.script.size(),
            "compile finished"
        );
        Ok(compiler.finish())
    }

    /// Lower every statement of a module.
    pub fn compile_module(&mut self, module: &Module) -> SubscriptResult<()> {
        self.compile_block(&module.body)
    }

    /// Finish compilation.
    #[must_use]
    pub fn finish(self) -> CompiledScript {
        CompiledScript {
            script: self.script,
            symbols: self.symbols,
        }
    }

    pub(crate) fn compile_block(&mut self, body: &[Stmt]) -> SubscriptResult<()> {
        for stmt in body {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> SubscriptResult<()> {
        let result = self.lower_stmt(stmt);
        if result.is_err() && self.error_span.is_none() {
            self.error_span = Some(stmt.span);
        }
        result
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> SubscriptResult<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.lower_expr_stmt(expr),
            StmtKind::Assign { targets, value } => self.lower_assign(targets, value),
            StmtKind::AugAssign { target, op, value } => self.lower_aug_assign(target, *op, value),
            StmtKind::If { test, body, orelse } => self.lower_if(test, body, orelse),
            StmtKind::While { test, body, orelse } => self.lower_while(test, body, orelse),
            StmtKind::FunctionDef {
                name,
                args,
                body,
                decorator_list,
            } => {
                if !args.is_empty() {
                    return Err(SubscriptError::unsupported(format!(
                        "function '{name}' cannot take arguments"
                    )));
                }
                if !decorator_list.is_empty() {
                    return Err(SubscriptError::unsupported(format!(
                        "function '{name}' cannot be decorated"
                    )));
                }
                self.lower_function(name, body)
            }
            StmtKind::Return(value) => match value {
                Some(value) => {
                    let value = self.resolve_value(value)?;
                    self.set_value("LASTRESULT", value)
                }
                None => Ok(()),
            },
            StmtKind::Import(aliases) => self.lower_import(aliases),
            StmtKind::ImportFrom { module, names } => self.lower_import_from(module, names),
            StmtKind::Pass => Ok(()),
        }
    }

    // =========================================================================
    // Emission
    // =========================================================================

    /// Build a command and append it to the current section.
    pub(crate) fn emit(
        &mut self,
        name: &str,
        args: impl IntoIterator<Item = CommandArg>,
    ) -> SubscriptResult<()> {
        let command = Command::create(self.env.instruction_table(), name, args)?;
        self.script.append(self.section, command)
    }

    pub(crate) fn emit_goto(&mut self, target: SectionPointer) -> SubscriptResult<()> {
        self.emit("goto", [target.into()])
    }

    /// Pointer just past the last command of `section`.
    pub(crate) fn here(&self, section: SectionId) -> SubscriptResult<SectionPointer> {
        self.script
            .section(section)
            .map(|s| s.here())
            .ok_or_else(|| SubscriptError::structural(format!("{section} is not part of this script")))
    }

    fn ends_terminal(&self, section: SectionId) -> bool {
        self.script
            .section(section)
            .and_then(|s| s.last())
            .is_some_and(Command::is_terminal)
    }

    /// Lower `body` into `section`, closing it with a `goto` to `return_here`
    /// unless it already ends in a terminal.
    fn lower_block_into(
        &mut self,
        section: SectionId,
        body: &[Stmt],
        return_here: SectionPointer,
    ) -> SubscriptResult<()> {
        self.section = section;
        self.compile_block(body)?;
        if !self.ends_terminal(self.section) {
            self.emit_goto(return_here)?;
        }
        Ok(())
    }

    // =========================================================================
    // Expression statements
    // =========================================================================

    fn lower_expr_stmt(&mut self, expr: &Expr) -> SubscriptResult<()> {
        match &expr.kind {
            ExprKind::Call {
                func,
                args,
                keywords,
            } => self.lower_call(func, args, keywords),
            ExprKind::Name(name) if name == "exit" => self.emit("end", []),
            ExprKind::Name(name) => Err(SubscriptError::unsupported(format!(
                "bare name '{name}' is not a statement"
            ))),
            _ => Err(SubscriptError::unsupported(
                "expression statement has no effect",
            )),
        }
    }

    fn lower_call(&mut self, func: &Expr, args: &[Expr], keywords: &[Keyword]) -> SubscriptResult<()> {
        let (label, builtin) = match &func.kind {
            ExprKind::Name(name) => match self.symbols.get(name) {
                Some(Symbol::Function(command)) => {
                    if !args.is_empty() || !keywords.is_empty() {
                        return Err(SubscriptError::unsupported(format!(
                            "function '{name}' takes no arguments"
                        )));
                    }
                    let command = command.clone();
                    return self.script.append(self.section, command);
                }
                Some(other) if !matches!(other, Symbol::Module(_)) => {
                    return Err(SubscriptError::type_error(format!(
                        "'{name}' is a {} and cannot be called",
                        other.describe()
                    )))
                }
                _ => match self.registry.get(name) {
                    Some(builtin) => (name.clone(), builtin.clone()),
                    None => return Err(SubscriptError::name(name.as_str())),
                },
            },
            ExprKind::Attribute { value, attr } => {
                let builtin = self.module_function(value, attr)?;
                (attr.clone(), builtin)
            }
            _ => {
                return Err(SubscriptError::unsupported(
                    "only named functions can be called",
                ))
            }
        };

        let mut call_args = CallArgs::new(label);
        for arg in args {
            call_args = call_args.arg(self.resolve_value(arg)?);
        }
        for keyword in keywords {
            call_args = call_args.keyword(keyword.arg.clone(), self.resolve_value(&keyword.value)?);
        }

        let expansion = {
            let mut ctx =
                BuiltinContext::new(&mut self.script, self.env, &mut self.state, builtin.name());
            builtin.call(&mut ctx, call_args)?
        };
        let commands = expansion.into_commands(self.env)?;
        self.script.extend(self.section, commands)
    }

    fn module_function(&self, value: &Expr, attr: &str) -> SubscriptResult<Builtin> {
        let Some(name) = value.as_name() else {
            return Err(SubscriptError::unsupported(
                "only functions of imported modules can be called as attributes",
            ));
        };
        match self.symbols.get(name) {
            Some(Symbol::Module(module)) => self
                .registry
                .module(module)
                .and_then(|m| m.get(attr))
                .cloned()
                .ok_or_else(|| SubscriptError::name(format!("{name}.{attr}"))),
            Some(other) => Err(SubscriptError::type_error(format!(
                "'{name}' is a {}, not a module",
                other.describe()
            ))),
            None => Err(SubscriptError::name(name)),
        }
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Resolve an expression used as a value.
    pub(crate) fn resolve_value(&self, expr: &Expr) -> SubscriptResult<Symbol> {
        match &expr.kind {
            ExprKind::Int(n) => Ok(Symbol::Int(*n)),
            ExprKind::Bool(b) => Ok(Symbol::Int(i64::from(*b))),
            ExprKind::None => Err(SubscriptError::type_error(
                "None has no value in an event script",
            )),
            ExprKind::String(text) => Ok(Symbol::content(Content::Text(text.clone()))),
            ExprKind::Bytes(bytes) => Ok(Symbol::content(Content::Raw(bytes.clone()))),
            ExprKind::List(items) => {
                let steps = items
                    .iter()
                    .map(|item| self.movement_step(item))
                    .collect::<SubscriptResult<Vec<_>>>()?;
                Ok(Symbol::content(Content::Movement(steps)))
            }
            ExprKind::Name(name) => self
                .symbols
                .get(name)
                .cloned()
                .ok_or_else(|| SubscriptError::name(name.as_str())),
            ExprKind::Call {
                func,
                args,
                keywords,
            } => self.construct(func, args, keywords),
            ExprKind::BinOp { .. } | ExprKind::UnaryOp { .. } => Ok(Symbol::Int(self.eval_int(expr)?)),
            _ => Err(SubscriptError::type_error(
                "expression cannot be used as a value",
            )),
        }
    }

    fn movement_step(&self, item: &Expr) -> SubscriptResult<MovementStep> {
        match &item.kind {
            ExprKind::String(name) => Ok(MovementStep::Name(name.clone())),
            _ => Ok(MovementStep::Code(self.eval_int(item)?)),
        }
    }

    /// Evaluate an explicit type constructor such as `Flag(0x200)`.
    fn construct(&self, func: &Expr, args: &[Expr], keywords: &[Keyword]) -> SubscriptResult<Symbol> {
        let name = func.as_name().ok_or_else(|| {
            SubscriptError::type_error("only explicit type constructors produce values")
        })?;
        let kind = type_constructor(name)
            .ok_or_else(|| SubscriptError::type_error(format!("'{name}' is not a type")))?;
        if !keywords.is_empty() {
            return Err(SubscriptError::unsupported(format!(
                "{name}() takes no keyword arguments"
            )));
        }
        let [arg] = args else {
            return Err(SubscriptError::unsupported(format!(
                "{name}() takes exactly one argument ({} given)",
                args.len()
            )));
        };
        Symbol::typed(kind, self.eval_int(arg)?)
    }

    /// Evaluate an integer expression.
    pub(crate) fn eval_int(&self, expr: &Expr) -> SubscriptResult<i64> {
        match &expr.kind {
            ExprKind::Int(n) => Ok(*n),
            ExprKind::Bool(b) => Ok(i64::from(*b)),
            ExprKind::Name(name) => match self.symbols.get(name) {
                Some(Symbol::Int(n)) => Ok(*n),
                Some(other) => Err(SubscriptError::type_error(format!(
                    "'{name}' is a {}, not an integer",
                    other.describe()
                ))),
                None => Err(SubscriptError::name(name.as_str())),
            },
            ExprKind::UnaryOp { op, operand } => arith::unary(*op, self.eval_int(operand)?),
            ExprKind::BinOp { left, op, right } => {
                arith::binary(*op, self.eval_int(left)?, self.eval_int(right)?)
            }
            _ => Err(SubscriptError::type_error("expected an integer expression")),
        }
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    fn lower_assign(&mut self, targets: &[Expr], value: &Expr) -> SubscriptResult<()> {
        let [target] = targets else {
            return Err(SubscriptError::unsupported(
                "chained assignment is not supported",
            ));
        };
        let Some(name) = target.as_name() else {
            return Err(SubscriptError::unsupported("only names can be assigned to"));
        };

        let resolved = self.resolve_value(value)?;
        match value.kind {
            ExprKind::Int(_) | ExprKind::Bool(_) | ExprKind::Name(_) => {
                self.set_value(name, resolved)
            }
            _ => {
                self.bind(name, resolved);
                Ok(())
            }
        }
    }

    /// Assign a literal or symbol, writing through typed targets.
    fn set_value(&mut self, name: &str, value: Symbol) -> SubscriptResult<()> {
        let target = match self.symbols.get(name) {
            Some(Symbol::Typed(target)) => *target,
            _ => {
                self.bind(name, value);
                return Ok(());
            }
        };

        match target.kind() {
            ValueKind::Flag => {
                let mnemonic = if value.is_truthy() {
                    "setflag"
                } else {
                    "clearflag"
                };
                self.emit(mnemonic, [target.into()])
            }
            ValueKind::Variable => match value {
                Symbol::Int(n) => self.emit("setvar", [target.into(), n.into()]),
                Symbol::Typed(source) if source.kind() == ValueKind::Variable => {
                    self.emit("copyvar", [target.into(), source.into()])
                }
                other => Err(SubscriptError::type_error(format!(
                    "cannot assign a {} to variable '{name}'",
                    other.describe()
                ))),
            },
            _ => {
                self.bind(name, value);
                Ok(())
            }
        }
    }

    fn bind(&mut self, name: &str, value: Symbol) {
        self.symbols.insert(name.to_string(), value);
    }

    fn lower_aug_assign(&mut self, target: &Expr, op: AugOp, value: &Expr) -> SubscriptResult<()> {
        let Some(name) = target.as_name() else {
            return Err(SubscriptError::unsupported(
                "only names support augmented assignment",
            ));
        };
        let var = match self.symbols.get(name) {
            Some(symbol) => symbol.as_kind(ValueKind::Variable).ok_or_else(|| {
                SubscriptError::type_error(format!(
                    "augmented assignment needs a variable, '{name}' is a {}",
                    symbol.describe()
                ))
            })?,
            None => return Err(SubscriptError::name(name)),
        };
        let mnemonic = match op {
            AugOp::Add => "addvar",
            AugOp::Sub => "subvar",
            other => {
                return Err(SubscriptError::unsupported(format!(
                    "operator '{}' is not supported on variables",
                    other.as_str()
                )))
            }
        };
        let amount = self.eval_int(value).map_err(|e| match e {
            SubscriptError::TypeError { message } => SubscriptError::unsupported(message),
            other => other,
        })?;
        self.emit(mnemonic, [var.into(), amount.into()])
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn lower_if(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> SubscriptResult<()> {
        let dispatch = self.section;
        let mut blocks = Vec::new();
        self.lower_dispatch(test, body, orelse, &mut blocks)?;

        let return_here = self.here(dispatch)?;
        for (section, block) in blocks.into_iter().rev() {
            self.lower_block_into(section, block, return_here)?;
        }
        self.section = dispatch;
        Ok(())
    }

    /// Lower the tests of an `if`/`elif` chain into the current section,
    /// collecting the blocks they lead to.
    fn lower_dispatch<'s>(
        &mut self,
        test: &Expr,
        body: &'s [Stmt],
        orelse: &'s [Stmt],
        blocks: &mut Vec<(SectionId, &'s [Stmt])>,
    ) -> SubscriptResult<()> {
        let taken = self.script.add();
        self.lower_condition(test, taken.start(), false)?;
        blocks.push((taken, body));

        match orelse {
            [] => Ok(()),
            [Stmt {
                kind: StmtKind::If { test, body, orelse },
                ..
            }] => self.lower_dispatch(test, body, orelse, blocks),
            _ => {
                let otherwise = self.script.add();
                self.emit_goto(otherwise.start())?;
                blocks.push((otherwise, orelse));
                Ok(())
            }
        }
    }

    fn lower_while(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> SubscriptResult<()> {
        if !orelse.is_empty() {
            return Err(SubscriptError::unsupported(
                "'else' on a while loop is not supported",
            ));
        }

        let dispatch = self.section;
        let loop_body = self.script.add();
        self.lower_condition(test, loop_body.start(), false)?;
        let return_here = self.here(dispatch)?;

        self.section = loop_body;
        self.compile_block(body)?;
        if !self.ends_terminal(self.section) {
            self.lower_condition(test, loop_body.start(), false)?;
            self.emit_goto(return_here)?;
        }
        self.section = dispatch;
        Ok(())
    }

    fn lower_function(&mut self, name: &str, body: &[Stmt]) -> SubscriptResult<()> {
        let caller = self.section;
        let start = self.script.add();
        self.section = start;
        let lowered = self.compile_block(body);
        let last = self.section;
        self.section = caller;
        lowered?;

        let last_command = self
            .script
            .section(last)
            .and_then(|s| s.last())
            .map(|c| c.name().to_string());
        // Only an explicit `end` leaves without returning. A trailing `goto`
        // comes from a nested conditional and still needs the `return`.
        let entry = start.start();
        let binding = match last_command.as_deref() {
            Some("end") => Command::create(self.env.instruction_table(), "goto", [entry.into()])?,
            Some("return") => Command::create(self.env.instruction_table(), "call", [entry.into()])?,
            _ => {
                let ret = Command::create(self.env.instruction_table(), "return", [])?;
                self.script.append(last, ret)?;
                Command::create(self.env.instruction_table(), "call", [entry.into()])?
            }
        };

        debug!(function = name, section = %start, binding = binding.name(), "function defined");
        self.bind(name, Symbol::Function(binding));
        Ok(())
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn lower_import(&mut self, aliases: &[Alias]) -> SubscriptResult<()> {
        for alias in aliases {
            if let Some(module) = self.registry.module(&alias.name).cloned() {
                for (name, builtin) in module.functions() {
                    self.registry.insert(name, builtin.clone());
                }
                debug!(module = %alias.name, binding = alias.binding(), "native module imported");
                self.bind(alias.binding(), Symbol::Module(alias.name.clone()));
                continue;
            }

            match imports::resolve(self.env.search_path(), &alias.name)? {
                Some((path, ImportKind::RawFile)) => {
                    debug!(path = %path.display(), binding = alias.binding(), "raw file imported");
                    self.bind(alias.binding(), Symbol::content(Content::File(path)));
                }
                Some((path, ImportKind::HostModule)) => {
                    return Err(SubscriptError::import(format!(
                        "\"{}\" is a host-language module with no native counterpart",
                        path.display()
                    )))
                }
                Some((path, ImportKind::Unsupported(what))) => {
                    return Err(SubscriptError::import(format!(
                        "importing {what} files is not supported (\"{}\")",
                        path.display()
                    )))
                }
                None => return Err(unresolved(&alias.name)),
            }
        }
        Ok(())
    }

    fn lower_import_from(&mut self, module: &str, names: &[Alias]) -> SubscriptResult<()> {
        let Some(native) = self.registry.module(module).cloned() else {
            return Err(match imports::resolve(self.env.search_path(), module)? {
                Some((path, _)) => SubscriptError::import(format!(
                    "cannot import names from \"{}\"; only native modules export functions",
                    path.display()
                )),
                None => unresolved(module),
            });
        };

        for alias in names {
            let builtin = native.get(&alias.name).ok_or_else(|| {
                SubscriptError::import(format!(
                    "cannot import name '{}' from '{module}'",
                    alias.name
                ))
            })?;
            debug!(module, function = %alias.name, binding = alias.binding(), "function imported");
            self.registry.insert(alias.binding(), builtin.clone());
        }
        Ok(())
    }
}

fn unresolved(name: &str) -> SubscriptError {
    SubscriptError::import(format!("Import of \"{name}\" unresolved."))
}
