//! Standard built-in functions and native modules.
//!
//! | Function                                  | Expands to                                   |
//! |-------------------------------------------|----------------------------------------------|
//! | `lock(lockall)`                           | `lockall` or `lock`                          |
//! | `release(doall)`                          | `releaseall` or `release`                    |
//! | `message(string, keepopen)` / `msgbox`    | `loadpointer 0 string`, `callstd 4` or `6`   |
//! | `question(string)`                        | `loadpointer 0 string`, `callstd 5`          |
//! | `applymovement(overworld, movements)`     | `applymovement`                              |
//! | `givepokemon(species, level=5, item=0)`   | `givepokemon species level item 0 0 0`       |
//! | `giveitem(item, quantity=1, fanfare=0)`   | item/quantity registers, `callstd 0` or `9`  |
//! | `finditem(item, quantity=1)`              | item/quantity registers, `callstd 1`         |
//! | `battle(species, level=70, helditem=0)`   | `setwildbattle`, `dowildbattle`              |
//!
//! The `special` module adds `heal()` and `clear()`.

use crate::command::CommandArg;
use crate::registry::{BuiltinContext, CallArgs, CommandSpec, Expansion, Module, Registry};
use subscript_core::SubscriptResult;

/// Scratch variables the standard routines read their arguments from.
const ITEM_VAR: i64 = 0x8000;
const QUANTITY_VAR: i64 = 0x8001;
const FANFARE_VAR: i64 = 0x8002;

// Standard routine numbers for `callstd`.
const STD_OBTAIN_ITEM: i64 = 0;
const STD_FIND_ITEM: i64 = 1;
const STD_MSG_KEEPOPEN: i64 = 4;
const STD_MSG_YESNO: i64 = 5;
const STD_MSG_NORMAL: i64 = 6;
const STD_OBTAIN_DECORATION: i64 = 7;
const STD_OBTAIN_ITEM_FANFARE: i64 = 9;

/// Register the standard built-ins.
pub fn register_standard(registry: &mut Registry) {
    registry.register("lock", lock);
    registry.register("release", release);
    registry.register("message", message);
    registry.register("msgbox", message);
    registry.register("question", question);
    registry.register("applymovement", applymovement);
    registry.register("givepokemon", givepokemon);
    registry.register("fanfare", fanfare);
    registry.register("waitfanfare", |_, args| bare(args, "waitfanfare"));
    registry.register("closeonkeypress", |_, args| bare(args, "closeonkeypress"));
    registry.register("call", call);
    registry.register("callstd", callstd);
    registry.register("pauseevent", pauseevent);
    registry.register("disappear", disappear);
    registry.register("additem", additem);
    registry.register("giveitem", giveitem);
    registry.register("givedecoration", givedecoration);
    registry.register("finditem", finditem);
    registry.register("battle", battle);
}

/// The `special` module.
#[must_use]
pub fn special_module() -> Module {
    Module::new("special")
        .with("special", special)
        .with("heal", |ctx, args| {
            args.bind([])?;
            special_call(ctx, 0, None)
        })
        .with("clear", |ctx, args| {
            args.bind([])?;
            special_call(ctx, 1, None)
        })
}

fn bare(args: CallArgs, name: &str) -> SubscriptResult<Expansion> {
    args.bind([])?;
    Ok(CommandSpec::bare(name).into())
}

fn lock(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [lockall] = args.bind(["lockall"])?;
    let name = if ctx.truthy(lockall.as_ref()) {
        "lockall"
    } else {
        "lock"
    };
    Ok(CommandSpec::bare(name).into())
}

fn release(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [doall] = args.bind(["doall"])?;
    let name = if ctx.truthy(doall.as_ref()) {
        "releaseall"
    } else {
        "release"
    };
    Ok(CommandSpec::bare(name).into())
}

fn message(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [string, keepopen] = args.bind(["string", "keepopen"])?;
    let std = if ctx.truthy(keepopen.as_ref()) {
        STD_MSG_KEEPOPEN
    } else {
        STD_MSG_NORMAL
    };
    let pointer = ctx.required(string, "string")?;
    Ok(vec![
        CommandSpec::new("loadpointer", [CommandArg::Int(0), pointer]),
        CommandSpec::new("callstd", [CommandArg::Int(std)]),
    ]
    .into())
}

fn question(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [string] = args.bind(["string"])?;
    let pointer = ctx.required(string, "string")?;
    Ok(vec![
        CommandSpec::new("loadpointer", [CommandArg::Int(0), pointer]),
        CommandSpec::new("callstd", [CommandArg::Int(STD_MSG_YESNO)]),
    ]
    .into())
}

fn applymovement(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [overworld, movements] = args.bind(["overworld", "movements"])?;
    let overworld = ctx.required(overworld, "overworld")?;
    let movements = ctx.required(movements, "movements")?;
    Ok(CommandSpec::new("applymovement", [overworld, movements]).into())
}

fn givepokemon(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [species, level, item] = args.bind(["species", "level", "item"])?;
    let species = ctx.required(species, "species")?;
    let level = ctx.or_int(level, 5)?;
    let item = ctx.or_int(item, 0)?;
    Ok(CommandSpec::new(
        "givepokemon",
        [
            species,
            level,
            item,
            CommandArg::Int(0),
            CommandArg::Int(0),
            CommandArg::Int(0),
        ],
    )
    .into())
}

fn fanfare(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [sound] = args.bind(["sound"])?;
    let sound = ctx.required(sound, "sound")?;
    Ok(CommandSpec::new("fanfare", [sound]).into())
}

fn call(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [pointer] = args.bind(["pointer"])?;
    let pointer = ctx.required(pointer, "pointer")?;
    Ok(CommandSpec::new("call", [pointer]).into())
}

fn callstd(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [func] = args.bind(["func"])?;
    let func = ctx.required(func, "func")?;
    Ok(CommandSpec::new("callstd", [func]).into())
}

fn pauseevent(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [delay] = args.bind(["delay"])?;
    let delay = ctx.required(delay, "delay")?;
    Ok(CommandSpec::new("pause", [delay]).into())
}

fn disappear(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [overworld] = args.bind(["overworld"])?;
    let overworld = ctx.required(overworld, "overworld")?;
    Ok(CommandSpec::new("hidesprite", [overworld]).into())
}

fn additem(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [item, quantity] = args.bind(["item", "quantity"])?;
    let item = ctx.required(item, "item")?;
    let quantity = ctx.or_int(quantity, 1)?;
    Ok(CommandSpec::new("additem", [item, quantity]).into())
}

fn load_var(var: i64, value: CommandArg) -> CommandSpec {
    CommandSpec::new("copyvarifnotzero", [CommandArg::Int(var), value])
}

fn callstd_spec(std: i64) -> CommandSpec {
    CommandSpec::new("callstd", [CommandArg::Int(std)])
}

fn giveitem(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [item, quantity, fanfare] = args.bind(["item", "quantity", "fanfare"])?;
    let item = ctx.required(item, "item")?;
    let quantity = ctx.or_int(quantity, 1)?;

    let mut specs = vec![load_var(ITEM_VAR, item), load_var(QUANTITY_VAR, quantity)];
    match fanfare.filter(|f| ctx.truthy(Some(f))) {
        Some(sound) => {
            let sound = ctx.arg(&sound)?;
            specs.push(load_var(FANFARE_VAR, sound));
            specs.push(callstd_spec(STD_OBTAIN_ITEM_FANFARE));
        }
        None => specs.push(callstd_spec(STD_OBTAIN_ITEM)),
    }
    Ok(specs.into())
}

fn givedecoration(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [decoration] = args.bind(["decoration"])?;
    let decoration = ctx.required(decoration, "decoration")?;
    Ok(vec![
        load_var(ITEM_VAR, decoration),
        callstd_spec(STD_OBTAIN_DECORATION),
    ]
    .into())
}

fn finditem(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [item, quantity] = args.bind(["item", "quantity"])?;
    let item = ctx.required(item, "item")?;
    let quantity = ctx.or_int(quantity, 1)?;
    Ok(vec![
        load_var(ITEM_VAR, item),
        load_var(QUANTITY_VAR, quantity),
        callstd_spec(STD_FIND_ITEM),
    ]
    .into())
}

fn battle(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [species, level, helditem] = args.bind(["species", "level", "helditem"])?;
    let species = ctx.required(species, "species")?;
    let level = ctx.or_int(level, 70)?;
    let helditem = ctx.or_int(helditem, 0)?;
    Ok(vec![
        CommandSpec::new("setwildbattle", [species, level, helditem]),
        CommandSpec::bare("dowildbattle"),
    ]
    .into())
}

fn special(ctx: &mut BuiltinContext<'_>, args: CallArgs) -> SubscriptResult<Expansion> {
    let [number, variable] = args.bind(["number", "variable"])?;
    let number = ctx.required(number, "number")?;
    let variable = variable.map(|v| ctx.arg(&v)).transpose()?;
    special_call(ctx, number, variable)
}

fn special_call(
    ctx: &mut BuiltinContext<'_>,
    number: impl Into<CommandArg>,
    variable: Option<CommandArg>,
) -> SubscriptResult<Expansion> {
    let number = number.into();
    let command = match variable {
        Some(variable) => ctx.command("special2", [variable, number])?,
        None => ctx.command("special", [number])?,
    };
    Ok(command.into())
}
