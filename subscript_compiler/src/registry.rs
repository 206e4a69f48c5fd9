//! Built-in function registry.
//!
//! A built-in is a source-level callable that expands into commands. It
//! receives a [`BuiltinContext`] (the script being built, the environment and
//! its own private state) plus the call's arguments, and returns an
//! [`Expansion`]: one command specification, several, or commands it built
//! itself. The registry normalizes every expansion into a list of
//! [`Command`]s.
//!
//! Registries are plain values. [`Registry::standard`] builds the default set;
//! compiles clone the registry they are given, so imports during one compile
//! never leak into another.

use crate::command::{Command, CommandArg};
use crate::environment::Environment;
use crate::langtypes::Symbol;
use crate::script::Script;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use subscript_core::{SubscriptError, SubscriptResult};

/// Private per-function state, keyed by the function's registered name.
pub type StateMap = FxHashMap<String, Box<dyn Any>>;

// =============================================================================
// Expansion
// =============================================================================

/// A command to be built from the instruction table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    name: String,
    args: SmallVec<[CommandArg; 4]>,
}

impl CommandSpec {
    /// Create a specification.
    #[must_use]
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = CommandArg>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// Create a specification without arguments.
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, [])
    }

    /// Build the command.
    pub fn build(self, env: &Environment) -> SubscriptResult<Command> {
        Command::create(env.instruction_table(), &self.name, self.args)
    }
}

/// What a built-in expands into.
#[derive(Debug, Clone)]
pub enum Expansion {
    /// A single command specification.
    One(CommandSpec),
    /// Several command specifications, in order.
    Many(Vec<CommandSpec>),
    /// Commands built by the function itself.
    Built(Vec<Command>),
}

impl Expansion {
    /// Normalize into commands.
    pub fn into_commands(self, env: &Environment) -> SubscriptResult<Vec<Command>> {
        match self {
            Self::One(spec) => Ok(vec![spec.build(env)?]),
            Self::Many(specs) => specs.into_iter().map(|spec| spec.build(env)).collect(),
            Self::Built(commands) => Ok(commands),
        }
    }
}

impl From<CommandSpec> for Expansion {
    fn from(spec: CommandSpec) -> Self {
        Self::One(spec)
    }
}

impl From<Vec<CommandSpec>> for Expansion {
    fn from(specs: Vec<CommandSpec>) -> Self {
        Self::Many(specs)
    }
}

impl From<Command> for Expansion {
    fn from(command: Command) -> Self {
        Self::Built(vec![command])
    }
}

impl From<Vec<Command>> for Expansion {
    fn from(commands: Vec<Command>) -> Self {
        Self::Built(commands)
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// Arguments of one call, as resolved by the front end.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    function: String,
    positional: Vec<Symbol>,
    keywords: Vec<(String, Symbol)>,
}

impl CallArgs {
    /// Arguments for a call to `function`.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            positional: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Add a positional argument.
    #[must_use]
    pub fn arg(mut self, value: Symbol) -> Self {
        self.positional.push(value);
        self
    }

    /// Add a keyword argument.
    #[must_use]
    pub fn keyword(mut self, name: impl Into<String>, value: Symbol) -> Self {
        self.keywords.push((name.into(), value));
        self
    }

    /// Name the call was made under.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Total number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    /// Check whether no arguments were passed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind arguments to parameter names, positionally then by keyword.
    ///
    /// Unfilled parameters are `None`; callers decide which are required.
    pub fn bind<const N: usize>(self, params: [&str; N]) -> SubscriptResult<[Option<Symbol>; N]> {
        if self.positional.len() > N {
            return Err(SubscriptError::type_error(format!(
                "{}() takes at most {} arguments ({} given)",
                self.function,
                N,
                self.positional.len()
            )));
        }

        let mut slots: [Option<Symbol>; N] = std::array::from_fn(|_| None);
        for (slot, value) in slots.iter_mut().zip(self.positional) {
            *slot = Some(value);
        }

        for (name, value) in self.keywords {
            let index = params.iter().position(|p| *p == name).ok_or_else(|| {
                SubscriptError::type_error(format!(
                    "{}() got an unexpected keyword argument '{name}'",
                    self.function
                ))
            })?;
            if slots[index].is_some() {
                return Err(SubscriptError::type_error(format!(
                    "{}() got multiple values for argument '{name}'",
                    self.function
                )));
            }
            slots[index] = Some(value);
        }

        Ok(slots)
    }
}

// =============================================================================
// Context
// =============================================================================

/// What a built-in sees while it runs.
pub struct BuiltinContext<'a> {
    script: &'a mut Script,
    env: &'a Environment,
    state: &'a mut StateMap,
    name: &'a str,
}

impl<'a> BuiltinContext<'a> {
    /// Create a context for the built-in registered as `name`.
    pub fn new(
        script: &'a mut Script,
        env: &'a Environment,
        state: &'a mut StateMap,
        name: &'a str,
    ) -> Self {
        Self {
            script,
            env,
            state,
            name,
        }
    }

    /// The running built-in's registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// The compilation environment.
    #[must_use]
    pub fn env(&self) -> &Environment {
        self.env
    }

    /// The selected game's script language.
    pub fn language(&self) -> SubscriptResult<Option<String>> {
        self.env.language()
    }

    /// Convert an argument for a command, placing content if needed.
    pub fn arg(&mut self, symbol: &Symbol) -> SubscriptResult<CommandArg> {
        symbol.to_arg(self.script, self.env)
    }

    /// Convert a required argument.
    pub fn required(&mut self, slot: Option<Symbol>, param: &str) -> SubscriptResult<CommandArg> {
        match slot {
            Some(symbol) => self.arg(&symbol),
            None => Err(SubscriptError::type_error(format!(
                "{}() missing required argument '{param}'",
                self.name
            ))),
        }
    }

    /// Convert an optional argument, defaulting to an integer.
    pub fn or_int(&mut self, slot: Option<Symbol>, default: i64) -> SubscriptResult<CommandArg> {
        match slot {
            Some(symbol) => self.arg(&symbol),
            None => Ok(CommandArg::Int(default)),
        }
    }

    /// An optional argument's truth value; absent is false.
    #[must_use]
    pub fn truthy(&self, slot: Option<&Symbol>) -> bool {
        slot.is_some_and(Symbol::is_truthy)
    }

    /// Build a command directly.
    pub fn command(
        &self,
        name: &str,
        args: impl IntoIterator<Item = CommandArg>,
    ) -> SubscriptResult<Command> {
        Command::create(self.env.instruction_table(), name, args)
    }

    /// This built-in's private state, created on first access.
    pub fn state<T: Any + Default>(&mut self) -> SubscriptResult<&mut T> {
        let name = self.name;
        self.state
            .entry(name.to_string())
            .or_insert_with(|| Box::new(T::default()))
            .downcast_mut::<T>()
            .ok_or_else(|| {
                SubscriptError::type_error(format!(
                    "private state of {name}() was created with a different type"
                ))
            })
    }
}

// =============================================================================
// Functions and modules
// =============================================================================

/// Signature of a built-in.
pub type BuiltinFn = dyn Fn(&mut BuiltinContext<'_>, CallArgs) -> SubscriptResult<Expansion>;

/// A registered built-in.
#[derive(Clone)]
pub struct Builtin {
    name: Rc<str>,
    func: Rc<BuiltinFn>,
}

impl Builtin {
    /// Wrap a function under its identity `name`.
    pub fn new(
        name: &str,
        func: impl Fn(&mut BuiltinContext<'_>, CallArgs) -> SubscriptResult<Expansion> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name),
            func: Rc::new(func),
        }
    }

    /// The function's identity, kept when it is re-exported under an alias.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the function.
    pub fn call(&self, ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
        (self.func)(ctx, args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// A named group of built-ins that scripts import.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    functions: FxHashMap<String, Builtin>,
}

impl Module {
    /// Create an empty module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: FxHashMap::default(),
        }
    }

    /// Add a function.
    #[must_use]
    pub fn with(
        mut self,
        name: &str,
        func: impl Fn(&mut BuiltinContext<'_>, CallArgs) -> SubscriptResult<Expansion> + 'static,
    ) -> Self {
        self.functions
            .insert(name.to_string(), Builtin::new(name, func));
        self
    }

    /// The module's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a function.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.functions.get(name)
    }

    /// All functions, sorted by name.
    #[must_use]
    pub fn functions(&self) -> Vec<(&str, &Builtin)> {
        let mut functions: Vec<_> = self
            .functions
            .iter()
            .map(|(name, builtin)| (name.as_str(), builtin))
            .collect();
        functions.sort_by_key(|(name, _)| *name);
        functions
    }
}

/// Callable names and importable modules.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    functions: FxHashMap<String, Builtin>,
    modules: FxHashMap<String, Module>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard built-ins and native modules.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        crate::functions::register_standard(&mut registry);
        registry.add_module(crate::functions::special_module());
        registry
    }

    /// Register a function under `name`.
    pub fn register(
        &mut self,
        name: &str,
        func: impl Fn(&mut BuiltinContext<'_>, CallArgs) -> SubscriptResult<Expansion> + 'static,
    ) {
        self.insert(name, Builtin::new(name, func));
    }

    /// Register an existing built-in under `name`.
    pub fn insert(&mut self, name: &str, builtin: Builtin) {
        self.functions.insert(name.to_string(), builtin);
    }

    /// Look up a function.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.functions.get(name)
    }

    /// Check whether a function is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Make a module importable.
    pub fn add_module(&mut self, module: Module) {
        self.modules.insert(module.name.clone(), module);
    }

    /// Look up a module.
    #[must_use]
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subscript_core::ValueKind;

    fn env() -> Environment {
        Environment::with_default_tables().unwrap()
    }

    #[test]
    fn test_bind_positional_and_keyword() {
        let args = CallArgs::new("giveitem")
            .arg(Symbol::Int(13))
            .keyword("fanfare", Symbol::Int(0x13E));
        let [item, quantity, fanfare] = args.bind(["item", "quantity", "fanfare"]).unwrap();
        assert!(matches!(item, Some(Symbol::Int(13))));
        assert!(quantity.is_none());
        assert!(matches!(fanfare, Some(Symbol::Int(0x13E))));
    }

    #[test]
    fn test_bind_errors() {
        let err = CallArgs::new("lock")
            .arg(Symbol::Int(1))
            .arg(Symbol::Int(2))
            .bind(["lockall"])
            .unwrap_err();
        assert!(err.to_string().contains("at most 1"));

        let err = CallArgs::new("lock")
            .keyword("everyone", Symbol::Int(1))
            .bind(["lockall"])
            .unwrap_err();
        assert!(err.to_string().contains("unexpected keyword argument 'everyone'"));

        let err = CallArgs::new("lock")
            .arg(Symbol::Int(1))
            .keyword("lockall", Symbol::Int(1))
            .bind(["lockall"])
            .unwrap_err();
        assert!(err.to_string().contains("multiple values"));
    }

    #[test]
    fn test_expansion_normalization() {
        let env = env();
        let one: Expansion = CommandSpec::bare("lock").into();
        assert_eq!(one.into_commands(&env).unwrap().len(), 1);

        let many: Expansion = vec![
            CommandSpec::new("callstd", [CommandArg::Int(6)]),
            CommandSpec::bare("release"),
        ]
        .into();
        let commands = many.into_commands(&env).unwrap();
        assert_eq!(commands[0].to_string(), "callstd 0x06");
        assert_eq!(commands[1].name(), "release");

        let bad: Expansion = CommandSpec::bare("frobnicate").into();
        assert!(bad.into_commands(&env).is_err());
    }

    #[test]
    fn test_state_persists_per_name() {
        let env = env();
        let mut script = Script::new(0);
        let mut state = StateMap::default();

        for expected in 1..=3u32 {
            let mut ctx = BuiltinContext::new(&mut script, &env, &mut state, "counter");
            let count = ctx.state::<u32>().unwrap();
            *count += 1;
            assert_eq!(*count, expected);
        }

        let mut ctx = BuiltinContext::new(&mut script, &env, &mut state, "other");
        assert_eq!(*ctx.state::<u32>().unwrap(), 0);

        let mut ctx = BuiltinContext::new(&mut script, &env, &mut state, "counter");
        assert!(ctx.state::<String>().is_err());
    }

    #[test]
    fn test_required_and_defaults() {
        let env = env();
        let mut script = Script::new(0);
        let mut state = StateMap::default();
        let mut ctx = BuiltinContext::new(&mut script, &env, &mut state, "battle");

        let err = ctx.required(None, "species").unwrap_err();
        assert!(err.to_string().contains("battle() missing required argument 'species'"));
        assert_eq!(ctx.or_int(None, 70).unwrap(), CommandArg::Int(70));

        let var = Symbol::typed(ValueKind::Variable, 0x4000).unwrap();
        assert_eq!(ctx.or_int(Some(var), 70).unwrap(), CommandArg::Int(0x4000));
        assert!(!ctx.truthy(None));
        assert!(ctx.truthy(Some(&Symbol::Int(1))));
    }

    #[test]
    fn test_alias_keeps_identity() {
        let module = Module::new("tools").with("ping", |_, _| Ok(CommandSpec::bare("nop").into()));
        let mut registry = Registry::new();
        let builtin = module.get("ping").unwrap().clone();
        registry.insert("p", builtin);
        assert_eq!(registry.get("p").unwrap().name(), "ping");
        assert!(!registry.contains("ping"));
    }
}
