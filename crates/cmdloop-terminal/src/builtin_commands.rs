//! Built-in commands: help, version, exit.

use cmdloop_types::error::{Result, ShellError};

use crate::command::{Category, Command, Context, Outcome};
use crate::flags::FlagSpec;
use crate::registry::CommandRegistry;

/// Category shared by every built-in command.
pub const INTERNAL_CATEGORY: &str = "Internal";

const RULE: &str = "-------------------------------------------------";

/// Register `helpf`, `versionf` and `exitf`, in that order.
pub fn register_builtins(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(help_command()?);
    reg.register(version_command()?);
    reg.register(exit_command()?);
    Ok(())
}

// ---------------------------------------------------------------------------
// helpf
// ---------------------------------------------------------------------------

fn help_command() -> Result<Command> {
    Command::builder("helpf")
        .alias("hf")
        .help("Returns information about all of the commands!")
        .flags(FlagSpec::new().switch("-j"))
        .category(Category::new(INTERNAL_CATEGORY))
        .handler(run_help)
        .build()
}

fn run_help(ctx: &mut Context<'_>) -> Result<Outcome> {
    if let Some(render) = ctx.help_renderer() {
        render(ctx)?;
        return Ok(Outcome::Done);
    }
    if ctx.input().has_flag("-j") {
        let json = serde_json::to_string_pretty(&ctx.registry().list_visible())?;
        ctx.replyln(&json)?;
        return Ok(Outcome::Done);
    }
    let listing = render_listing(ctx.registry());
    ctx.reply(&listing)?;
    Ok(Outcome::Done)
}

/// Default help text for every visible command.
pub fn render_listing(reg: &CommandRegistry) -> String {
    let mut out = format!("{RULE}\nCommands:\n");
    for cmd in reg.list_visible() {
        out.push_str(&format!("   {}:\n", cmd.name().to_uppercase()));
        if !cmd.aliases().is_empty() {
            out.push_str(&format!("      Aliases: {}\n", cmd.aliases().join(", ")));
        }
        out.push_str(&format!(
            "      Category: {}\n",
            cmd.category().name().unwrap_or("none")
        ));
        if let Some(help) = cmd.help() {
            out.push_str(&format!("      Help: {help}\n"));
        }
        if let Some(usage) = cmd.usage() {
            out.push_str(&format!("      Arguments: {usage}\n"));
        }
        let flags = cmd.flags();
        if !flags.no_param_flags().is_empty() {
            out.push_str("      Flags with no parameters:\n");
            for (i, flag) in flags.no_param_flags().iter().enumerate() {
                out.push_str(&format!("         #{}: {flag}\n", i + 1));
            }
        }
        if !flags.param_flags().is_empty() {
            out.push_str("      Flags with parameters:\n");
            for (i, p) in flags.param_flags().iter().enumerate() {
                out.push_str(&format!("         #{}: {} {}\n", i + 1, p.flag, p.placeholder));
            }
        }
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// versionf
// ---------------------------------------------------------------------------

fn version_command() -> Result<Command> {
    Command::builder("versionf")
        .alias("vf")
        .help("Gets the current version of the framework!")
        .category(Category::new(INTERNAL_CATEGORY))
        .handler(|ctx: &mut Context<'_>| {
            let msg = format!(
                "Current version of cmdloop is: {}",
                env!("CARGO_PKG_VERSION")
            );
            ctx.reply_with_border(&msg, '=', msg.len())?;
            Ok(Outcome::Done)
        })
        .build()
}

// ---------------------------------------------------------------------------
// exitf
// ---------------------------------------------------------------------------

/// Timestamp shown in the farewell, e.g. `07/03/2026 09:15:02 PM`.
const EXIT_TIME_FORMAT: &str = "%d/%m/%Y %I:%M:%S %p";

fn exit_command() -> Result<Command> {
    Command::builder("exitf")
        .aliases(["ef", "\\q"])
        .help("Exits the Command Prompt!")
        .flags(FlagSpec::new().param("-s", "[status]"))
        .category(Category::new(INTERNAL_CATEGORY))
        .handler(run_exit)
        .build()
}

fn run_exit(ctx: &mut Context<'_>) -> Result<Outcome> {
    if let Some(msg) = ctx.missing_param_message() {
        ctx.replyln(&msg)?;
        return Ok(Outcome::Done);
    }
    let status = match ctx.param("-s") {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|e| ShellError::Command(format!("invalid exit status '{raw}': {e}")))?,
        None => 0,
    };
    if status != 0 {
        ctx.newline()?;
    }
    let now = chrono::Local::now().format(EXIT_TIME_FORMAT);
    let msg = format!("Exiting command prompt at {now}!");
    ctx.reply_with_border(&msg, '=', msg.len())?;
    Ok(Outcome::Exit { status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::source::QueueSource;
    use cmdloop_types::config::ShellConfig;

    fn setup() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg).unwrap();
        reg
    }

    fn exec(reg: &CommandRegistry, line: &str) -> (Result<Outcome>, String) {
        let cmd = reg.resolve(line.split(' ').next().unwrap()).unwrap();
        let names: Vec<&str> = cmd.invocation_names().collect();
        let input = parse(line, cmd.flags(), &names);
        let config = ShellConfig::default();
        let mut out = Vec::new();
        let mut src = QueueSource::new();
        let result = {
            let mut ctx = Context::new(&input, reg, &config, &mut out, &mut src);
            cmd.run(&mut ctx)
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn builtins_registered_in_order() {
        let reg = setup();
        let names: Vec<&str> = reg.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["helpf", "versionf", "exitf"]);
    }

    #[test]
    fn exit_aliases_resolve() {
        let reg = setup();
        for alias in ["exitf", "ef", "\\q", "EXITF"] {
            assert_eq!(reg.resolve(alias).unwrap().name(), "exitf");
        }
    }

    #[test]
    fn exit_default_status() {
        let reg = setup();
        let (result, out) = exec(&reg, "exitf");
        assert_eq!(result.unwrap(), Outcome::Exit { status: 0 });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].chars().all(|c| c == '='));
        assert_eq!(lines[0].len(), lines[1].len());
        assert_eq!(lines[0], lines[2]);

        let stamp = lines[1]
            .strip_prefix("Exiting command prompt at ")
            .and_then(|rest| rest.strip_suffix('!'))
            .unwrap();
        chrono::NaiveDateTime::parse_from_str(stamp, EXIT_TIME_FORMAT).unwrap();
        assert!(stamp.ends_with("AM") || stamp.ends_with("PM"));
    }

    #[test]
    fn exit_with_status() {
        let reg = setup();
        let (result, out) = exec(&reg, "ef -s 3");
        assert_eq!(result.unwrap(), Outcome::Exit { status: 3 });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "");
        assert!(lines[2].starts_with("Exiting command prompt at "));
    }

    #[test]
    fn exit_missing_status_keeps_running() {
        let reg = setup();
        let (result, out) = exec(&reg, "exitf -s");
        assert_eq!(result.unwrap(), Outcome::Done);
        assert_eq!(out, "You must provide a [status] for the flag -s!\n");
    }

    #[test]
    fn exit_bad_status_is_error() {
        let reg = setup();
        let (result, _) = exec(&reg, "exitf -s abc");
        assert!(matches!(result, Err(ShellError::Command(_))));
    }

    #[test]
    fn version_in_border() {
        let reg = setup();
        let (result, out) = exec(&reg, "vf");
        assert_eq!(result.unwrap(), Outcome::Done);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Current version of cmdloop is: "));
        assert_eq!(lines[0].len(), lines[1].len());
        assert!(lines[0].chars().all(|c| c == '='));
    }

    #[test]
    fn help_lists_visible_commands() {
        let reg = setup();
        let (_, out) = exec(&reg, "helpf");
        assert!(out.starts_with(RULE));
        assert!(out.contains("   HELPF:"));
        assert!(out.contains("   EXITF:"));
        assert!(out.contains("      Aliases: ef, \\q"));
        assert!(out.contains("      Category: Internal"));
        assert!(out.contains("         #1: -s [status]"));
        assert!(out.contains("         #1: -j"));
    }

    #[test]
    fn help_skips_hidden() {
        let mut reg = setup();
        reg.register(
            Command::builder("secret")
                .category(Category::hidden("debug"))
                .handler(|_ctx: &mut Context<'_>| Ok(Outcome::Done))
                .build()
                .unwrap(),
        );
        let listing = render_listing(&reg);
        assert!(!listing.contains("SECRET"));
    }

    #[test]
    fn help_json() {
        let reg = setup();
        let (result, out) = exec(&reg, "hf -j");
        assert_eq!(result.unwrap(), Outcome::Done);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        let names: Vec<&str> = v
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["helpf", "versionf", "exitf"]);
    }

    #[test]
    fn custom_help_renderer() {
        let reg = setup();
        let cmd = reg.resolve("helpf").unwrap();
        let input = parse("helpf", cmd.flags(), &["helpf"]);
        let config = ShellConfig::default();
        let renderer: crate::command::HelpRenderer = Box::new(|ctx: &mut Context<'_>| {
            let count = ctx.registry().len();
            ctx.replyln(&format!("{count} commands"))
        });
        let mut out = Vec::new();
        let mut src = QueueSource::new();
        {
            let mut ctx = Context::new(&input, &reg, &config, &mut out, &mut src)
                .with_help(Some(&renderer));
            cmd.run(&mut ctx).unwrap();
        }
        assert_eq!(String::from_utf8(out).unwrap(), "3 commands\n");
    }
}
